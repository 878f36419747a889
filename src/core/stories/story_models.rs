use chrono::{DateTime, Utc};

/// Longest accepted title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;
/// Longest accepted story body, in characters.
pub const MAX_CONTENT_CHARS: usize = 4000;

/// A user's RPG story. Each user owns at most one.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    /// Store-assigned identifier. Opaque to the bot.
    pub id: String,
    pub user_id: u64,
    /// Display name captured when the story was created.
    pub username: String,
    pub title: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data needed to insert a new story. The store fills in id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStory {
    pub user_id: u64,
    pub username: String,
    pub title: String,
    pub content: String,
}

/// Full replacement values written by an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryUpdate {
    pub title: String,
    pub content: String,
}

/// What the user asked to change. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryEdit {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl StoryEdit {
    /// Build an edit from raw command options. Empty strings count as absent.
    pub fn from_options(title: Option<String>, content: Option<String>) -> Self {
        Self {
            title: title.filter(|t| !t.is_empty()),
            content: content.filter(|c| !c.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryField {
    Title,
    Content,
}

/// Result of a successful edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub story: Story,
    pub changed: Vec<StoryField>,
}

/// Button choice on the delete confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteChoice {
    Confirm,
    Cancel,
}

/// How a delete confirmation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    Cancelled,
    TimedOut,
}
