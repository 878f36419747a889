// SQLite implementation of the StoryStore trait

use crate::core::stories::{NewStory, StoreError, Story, StoryStore, StoryUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

pub struct SqliteStoryStore {
    pool: SqlitePool,
}

impl SqliteStoryStore {
    /// Open (or create) the database file at `database_path`.
    pub async fn new(database_path: &str) -> anyhow::Result<Self> {
        let connection_string = format!("sqlite://{}?mode=rwc", database_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&connection_string)
            .await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and make sure the table exists.
    pub async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        // UNIQUE(user_id) makes a racing second insert fail in the database.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL UNIQUE,
                username TEXT NOT NULL,
                titulo TEXT NOT NULL,
                conteudo TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_story(row: &SqliteRow) -> Story {
        Story {
            id: row.get::<i64, _>("id").to_string(),
            user_id: row.get::<i64, _>("user_id") as u64,
            username: row.get("username"),
            title: row.get("titulo"),
            content: row.get("conteudo"),
            created_at: parse_timestamp(row.get("created_at")),
            updated_at: parse_timestamp(row.get("updated_at")),
        }
    }

    async fn fetch(&self, user_id: u64) -> Result<Option<Story>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, username, titulo, conteudo, created_at, updated_at
            FROM stories
            WHERE user_id = ?
            "#,
        )
        .bind(user_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(row.as_ref().map(Self::row_to_story))
    }
}

fn parse_timestamp(value: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn backend_error(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl StoryStore for SqliteStoryStore {
    async fn find_by_user(&self, user_id: u64) -> Result<Option<Story>, StoreError> {
        self.fetch(user_id).await
    }

    async fn insert(&self, story: NewStory) -> Result<Story, StoreError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO stories (user_id, username, titulo, conteudo, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(story.user_id as i64)
        .bind(&story.username)
        .bind(&story.title)
        .bind(&story.content)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(StoreError::Conflict(story.user_id));
            }
            Err(e) => return Err(backend_error(e)),
        }

        self.fetch(story.user_id)
            .await?
            .ok_or(StoreError::NotFound(story.user_id))
    }

    async fn update_by_user(&self, user_id: u64, update: StoryUpdate) -> Result<Story, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE stories
            SET titulo = ?, conteudo = ?, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.content)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id as i64)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(user_id));
        }

        self.fetch(user_id)
            .await?
            .ok_or(StoreError::NotFound(user_id))
    }

    async fn delete_by_user(&self, user_id: u64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM stories WHERE user_id = ?")
            .bind(user_id as i64)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        Ok(())
    }
}
