// Business rules for the RPG story feature.
//
// No Discord types in here. The command layer extracts ids and strings,
// calls the service and decides how to render each outcome.

use super::story_models::{
    DeleteChoice, DeletionOutcome, EditOutcome, NewStory, Story, StoryEdit, StoryField,
    StoryUpdate, MAX_CONTENT_CHARS, MAX_TITLE_CHARS,
};
use super::story_store::{StoreError, StoryStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("Title has {0} characters (max {max})", max = MAX_TITLE_CHARS)]
    TitleTooLong(usize),

    #[error("Content has {0} characters (max {max})", max = MAX_CONTENT_CHARS)]
    ContentTooLong(usize),

    #[error("Edit needs a new title or new content")]
    NothingToEdit,

    #[error("User already has a story")]
    AlreadyExists,

    #[error("User has no story")]
    NotFound,

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl StoryError {
    /// Validation errors are caught before any store call and are the
    /// user's fault, so they are rendered but never logged as failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoryError::TitleTooLong(_) | StoryError::ContentTooLong(_) | StoryError::NothingToEdit
        )
    }
}

impl From<StoreError> for StoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => StoryError::AlreadyExists,
            StoreError::NotFound(_) => StoryError::NotFound,
            other => StoryError::Store(other),
        }
    }
}

pub struct StoryService<S: StoryStore> {
    store: S,
}

impl<S: StoryStore> StoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn validate_title(title: &str) -> Result<(), StoryError> {
        let len = title.chars().count();
        if len > MAX_TITLE_CHARS {
            return Err(StoryError::TitleTooLong(len));
        }
        Ok(())
    }

    pub fn validate_content(content: &str) -> Result<(), StoryError> {
        let len = content.chars().count();
        if len > MAX_CONTENT_CHARS {
            return Err(StoryError::ContentTooLong(len));
        }
        Ok(())
    }

    /// Checks run before creating. Title is checked first.
    pub fn validate_new(title: &str, content: &str) -> Result<(), StoryError> {
        Self::validate_title(title)?;
        Self::validate_content(content)
    }

    /// Checks run before editing: something to change, and within bounds.
    pub fn validate_edit(edit: &StoryEdit) -> Result<(), StoryError> {
        if edit.is_empty() {
            return Err(StoryError::NothingToEdit);
        }
        if let Some(title) = &edit.title {
            Self::validate_title(title)?;
        }
        if let Some(content) = &edit.content {
            Self::validate_content(content)?;
        }
        Ok(())
    }

    /// Create a story for `new_story.user_id`.
    ///
    /// The existence check keeps the common case friendly; the store's
    /// unique constraint catches the concurrent double-submit that slips
    /// past it.
    pub async fn create(&self, new_story: NewStory) -> Result<Story, StoryError> {
        Self::validate_new(&new_story.title, &new_story.content)?;

        if self.store.find_by_user(new_story.user_id).await?.is_some() {
            return Err(StoryError::AlreadyExists);
        }

        Ok(self.store.insert(new_story).await?)
    }

    pub async fn read(&self, user_id: u64) -> Result<Option<Story>, StoryError> {
        Ok(self.store.find_by_user(user_id).await?)
    }

    /// Apply the supplied fields on top of the stored story.
    pub async fn edit(&self, user_id: u64, edit: StoryEdit) -> Result<EditOutcome, StoryError> {
        Self::validate_edit(&edit)?;

        let existing = self
            .store
            .find_by_user(user_id)
            .await?
            .ok_or(StoryError::NotFound)?;

        let mut changed = Vec::new();
        if edit.title.is_some() {
            changed.push(StoryField::Title);
        }
        if edit.content.is_some() {
            changed.push(StoryField::Content);
        }

        let update = StoryUpdate {
            title: edit.title.unwrap_or(existing.title),
            content: edit.content.unwrap_or(existing.content),
        };

        let story = self.store.update_by_user(user_id, update).await?;

        Ok(EditOutcome { story, changed })
    }

    /// Look up the story a delete prompt will ask about.
    pub async fn find_for_deletion(&self, user_id: u64) -> Result<Story, StoryError> {
        self.store
            .find_by_user(user_id)
            .await?
            .ok_or(StoryError::NotFound)
    }

    /// Finish a delete confirmation. `None` means nobody answered in time.
    ///
    /// Only an explicit confirm touches the store.
    pub async fn resolve_deletion(
        &self,
        user_id: u64,
        choice: Option<DeleteChoice>,
    ) -> Result<DeletionOutcome, StoryError> {
        match choice {
            Some(DeleteChoice::Confirm) => {
                self.store.delete_by_user(user_id).await?;
                Ok(DeletionOutcome::Deleted)
            }
            Some(DeleteChoice::Cancel) => Ok(DeletionOutcome::Cancelled),
            None => Ok(DeletionOutcome::TimedOut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store that counts every call.
    #[derive(Default)]
    struct RecordingStore {
        stories: DashMap<u64, Story>,
        calls: AtomicUsize,
        inserts: AtomicUsize,
        /// Pretend another request inserted first.
        reject_inserts: bool,
    }

    impl RecordingStore {
        fn with_story(story: Story) -> Self {
            let store = Self::default();
            store.stories.insert(story.user_id, story);
            store
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StoryStore for RecordingStore {
        async fn find_by_user(&self, user_id: u64) -> Result<Option<Story>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.stories.get(&user_id).map(|s| s.clone()))
        }

        async fn insert(&self, story: NewStory) -> Result<Story, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inserts.fetch_add(1, Ordering::SeqCst);
            if self.reject_inserts {
                return Err(StoreError::Conflict(story.user_id));
            }
            let stored = Story {
                id: format!("story-{}", story.user_id),
                user_id: story.user_id,
                username: story.username,
                title: story.title,
                content: story.content,
                created_at: None,
                updated_at: None,
            };
            self.stories.insert(stored.user_id, stored.clone());
            Ok(stored)
        }

        async fn update_by_user(
            &self,
            user_id: u64,
            update: StoryUpdate,
        ) -> Result<Story, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut entry = self
                .stories
                .get_mut(&user_id)
                .ok_or(StoreError::NotFound(user_id))?;
            entry.title = update.title;
            entry.content = update.content;
            Ok(entry.clone())
        }

        async fn delete_by_user(&self, user_id: u64) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.stories.remove(&user_id);
            Ok(())
        }
    }

    fn story(user_id: u64, title: &str, content: &str) -> Story {
        Story {
            id: "1".to_string(),
            user_id,
            username: "aventureiro".to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn new_story(user_id: u64, title: &str, content: &str) -> NewStory {
        NewStory {
            user_id,
            username: "aventureiro".to_string(),
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn create_accepts_title_at_limit() {
        let service = StoryService::new(RecordingStore::default());

        let created = service
            .create(new_story(1, &"t".repeat(100), "corpo"))
            .await
            .unwrap();

        assert_eq!(created.title.chars().count(), 100);
    }

    #[tokio::test]
    async fn create_rejects_long_title_without_touching_store() {
        let service = StoryService::new(RecordingStore::default());

        let err = service
            .create(new_story(1, &"t".repeat(101), "corpo"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoryError::TitleTooLong(101)));
        assert!(err.is_validation());
        assert_eq!(service.store.calls(), 0);
    }

    #[tokio::test]
    async fn content_bounds_are_inclusive() {
        let service = StoryService::new(RecordingStore::default());

        assert!(service
            .create(new_story(1, "ok", &"c".repeat(4000)))
            .await
            .is_ok());

        let err = service
            .create(new_story(2, "ok", &"c".repeat(4001)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoryError::ContentTooLong(4001)));
    }

    #[test]
    fn length_is_counted_in_characters() {
        // 100 two-byte characters is still a valid title.
        let title = "é".repeat(100);
        assert!(StoryService::<RecordingStore>::validate_title(&title).is_ok());
    }

    #[tokio::test]
    async fn create_refuses_second_story_without_inserting() {
        let service = StoryService::new(RecordingStore::with_story(story(1, "velha", "x")));

        let err = service.create(new_story(1, "nova", "y")).await.unwrap_err();

        assert!(matches!(err, StoryError::AlreadyExists));
        assert_eq!(service.store.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(service.store.stories.get(&1).unwrap().title, "velha");
    }

    #[tokio::test]
    async fn store_conflict_on_insert_reads_as_already_exists() {
        let store = RecordingStore {
            reject_inserts: true,
            ..Default::default()
        };
        let service = StoryService::new(store);

        let err = service.create(new_story(1, "t", "c")).await.unwrap_err();

        assert!(matches!(err, StoryError::AlreadyExists));
    }

    #[tokio::test]
    async fn read_returns_none_for_missing_story() {
        let service = StoryService::new(RecordingStore::default());
        assert!(service.read(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn edit_without_fields_is_rejected_before_store() {
        let service = StoryService::new(RecordingStore::with_story(story(1, "t", "c")));

        let err = service.edit(1, StoryEdit::default()).await.unwrap_err();

        assert!(matches!(err, StoryError::NothingToEdit));
        assert_eq!(service.store.calls(), 0);
    }

    #[tokio::test]
    async fn edit_treats_empty_strings_as_missing() {
        let service = StoryService::new(RecordingStore::with_story(story(1, "t", "c")));
        let edit = StoryEdit::from_options(Some(String::new()), None);

        let err = service.edit(1, edit).await.unwrap_err();

        assert!(matches!(err, StoryError::NothingToEdit));
    }

    #[tokio::test]
    async fn edit_title_only_keeps_content() {
        let service = StoryService::new(RecordingStore::with_story(story(
            1,
            "antigo",
            "era uma vez",
        )));

        let outcome = service
            .edit(
                1,
                StoryEdit {
                    title: Some("novo".to_string()),
                    content: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.changed, vec![StoryField::Title]);
        assert_eq!(outcome.story.title, "novo");
        assert_eq!(outcome.story.content, "era uma vez");
        assert_eq!(service.store.stories.get(&1).unwrap().content, "era uma vez");
    }

    #[tokio::test]
    async fn edit_rejects_long_title_without_store_call() {
        let service = StoryService::new(RecordingStore::with_story(story(1, "t", "c")));

        let err = service
            .edit(
                1,
                StoryEdit {
                    title: Some("t".repeat(101)),
                    content: Some("ok".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoryError::TitleTooLong(101)));
        assert_eq!(service.store.calls(), 0);
    }

    #[tokio::test]
    async fn edit_missing_story_is_not_found() {
        let service = StoryService::new(RecordingStore::default());

        let err = service
            .edit(
                9,
                StoryEdit {
                    title: None,
                    content: Some("novo".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoryError::NotFound));
    }

    #[tokio::test]
    async fn confirm_deletes_the_story() {
        let service = StoryService::new(RecordingStore::with_story(story(1, "t", "c")));

        let outcome = service
            .resolve_deletion(1, Some(DeleteChoice::Confirm))
            .await
            .unwrap();

        assert_eq!(outcome, DeletionOutcome::Deleted);
        assert!(service.read(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cancel_and_timeout_keep_the_story() {
        let service = StoryService::new(RecordingStore::with_story(story(1, "t", "c")));

        let cancelled = service
            .resolve_deletion(1, Some(DeleteChoice::Cancel))
            .await
            .unwrap();
        let timed_out = service.resolve_deletion(1, None).await.unwrap();

        assert_eq!(cancelled, DeletionOutcome::Cancelled);
        assert_eq!(timed_out, DeletionOutcome::TimedOut);
        assert!(service.read(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn find_for_deletion_reports_missing_story() {
        let service = StoryService::new(RecordingStore::default());

        let err = service.find_for_deletion(5).await.unwrap_err();

        assert!(matches!(err, StoryError::NotFound));
    }

    #[test]
    fn backend_errors_keep_their_message() {
        let err = StoryError::from(StoreError::Backend("connection reset".into()));
        assert!(!err.is_validation());
        assert!(err.to_string().contains("connection reset"));
    }
}
