// In-memory implementation of StoryStore.
//
// Used by tests and by `STORY_BACKEND=memory` for running the bot without
// a database. Nothing survives a restart.

use crate::core::stories::{NewStory, StoreError, Story, StoryStore, StoryUpdate};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct InMemoryStoryStore {
    /// Maps user_id -> story. The key doubles as the uniqueness constraint.
    stories: DashMap<u64, Story>,
    next_id: AtomicU64,
}

impl InMemoryStoryStore {
    pub fn new() -> Self {
        Self {
            stories: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryStoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoryStore for InMemoryStoryStore {
    async fn find_by_user(&self, user_id: u64) -> Result<Option<Story>, StoreError> {
        Ok(self.stories.get(&user_id).map(|entry| entry.clone()))
    }

    async fn insert(&self, story: NewStory) -> Result<Story, StoreError> {
        match self.stories.entry(story.user_id) {
            Entry::Occupied(_) => Err(StoreError::Conflict(story.user_id)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let stored = Story {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed).to_string(),
                    user_id: story.user_id,
                    username: story.username,
                    title: story.title,
                    content: story.content,
                    created_at: Some(now),
                    updated_at: Some(now),
                };
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn update_by_user(&self, user_id: u64, update: StoryUpdate) -> Result<Story, StoreError> {
        let mut entry = self
            .stories
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound(user_id))?;

        entry.title = update.title;
        entry.content = update.content;
        entry.updated_at = Some(Utc::now());

        Ok(entry.clone())
    }

    async fn delete_by_user(&self, user_id: u64) -> Result<(), StoreError> {
        self.stories.remove(&user_id);
        Ok(())
    }
}
