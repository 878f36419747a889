// Implementations of StoryStore. The backend is picked at startup.

pub mod in_memory;
pub mod sqlite_store;
pub mod supabase_store;

pub use in_memory::InMemoryStoryStore;
pub use sqlite_store::SqliteStoryStore;
pub use supabase_store::SupabaseStoryStore;
