use super::story_models::{NewStory, Story, StoryUpdate};
use async_trait::async_trait;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store refused the insert because the user already owns a story.
    #[error("A story already exists for user {0}")]
    Conflict(u64),
    #[error("No story found for user {0}")]
    NotFound(u64),
    /// Transport or backend failure. The message is safe to show to users.
    #[error("{0}")]
    Backend(String),
}

/// Port for persisting stories, keyed by owner.
///
/// Implementations are expected to enforce one story per user on insert
/// (a unique `user_id` column) and report a violation as
/// `StoreError::Conflict`.
#[async_trait]
pub trait StoryStore: Send + Sync {
    async fn find_by_user(&self, user_id: u64) -> Result<Option<Story>, StoreError>;

    async fn insert(&self, story: NewStory) -> Result<Story, StoreError>;

    /// Overwrite title and content, refreshing `updated_at`.
    async fn update_by_user(&self, user_id: u64, update: StoryUpdate) -> Result<Story, StoreError>;

    async fn delete_by_user(&self, user_id: u64) -> Result<(), StoreError>;
}

// Lets the service hold whichever backend was picked at startup.
#[async_trait]
impl StoryStore for Box<dyn StoryStore> {
    async fn find_by_user(&self, user_id: u64) -> Result<Option<Story>, StoreError> {
        (**self).find_by_user(user_id).await
    }

    async fn insert(&self, story: NewStory) -> Result<Story, StoreError> {
        (**self).insert(story).await
    }

    async fn update_by_user(&self, user_id: u64, update: StoryUpdate) -> Result<Story, StoreError> {
        (**self).update_by_user(user_id, update).await
    }

    async fn delete_by_user(&self, user_id: u64) -> Result<(), StoreError> {
        (**self).delete_by_user(user_id).await
    }
}
