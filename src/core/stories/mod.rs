pub mod story_models;
pub mod story_service;
pub mod story_store;

pub use story_models::{
    DeleteChoice, DeletionOutcome, EditOutcome, NewStory, Story, StoryEdit, StoryField,
    StoryUpdate,
};
pub use story_service::{StoryError, StoryService};
pub use story_store::{StoreError, StoryStore};
