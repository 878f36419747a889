// Supabase (PostgREST) implementation of StoryStore.
//
// The remote table is expected to look like:
//
//   create table stories (
//     id uuid primary key default gen_random_uuid(),
//     user_id text not null unique,
//     username text not null,
//     titulo text not null,
//     conteudo text not null,
//     created_at timestamptz not null default now(),
//     updated_at timestamptz not null default now()
//   );
//
// Every call is a single HTTP request. Writes ask for
// `Prefer: return=representation` so the stored row comes back in the same
// round trip.

use crate::core::stories::{NewStory, StoreError, Story, StoryStore, StoryUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

const TABLE: &str = "stories";

/// Postgres error code for a unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Row as PostgREST returns it. User ids are stored as text.
#[derive(Debug, Deserialize)]
struct StoryRow {
    id: String,
    user_id: String,
    username: String,
    titulo: String,
    conteudo: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl StoryRow {
    fn into_story(self) -> Result<Story, StoreError> {
        let user_id = self
            .user_id
            .parse::<u64>()
            .map_err(|_| StoreError::Backend(format!("invalid user_id '{}'", self.user_id)))?;

        Ok(Story {
            id: self.id,
            user_id,
            username: self.username,
            title: self.titulo,
            content: self.conteudo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    user_id: String,
    username: &'a str,
    titulo: &'a str,
    conteudo: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateRow<'a> {
    titulo: &'a str,
    conteudo: &'a str,
    updated_at: DateTime<Utc>,
}

/// PostgREST error body. All fields are optional in practice.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiError {
    code: Option<String>,
    message: Option<String>,
}

pub struct SupabaseStoryStore {
    client: Client,
    rest_url: String,
    api_key: String,
}

impl SupabaseStoryStore {
    /// `project_url` is the project root, e.g. `https://xyz.supabase.co`.
    pub fn new(project_url: &str, api_key: String) -> Self {
        Self {
            client: Client::new(),
            rest_url: format!("{}/rest/v1/{}", project_url.trim_end_matches('/'), TABLE),
            api_key,
        }
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// PostgREST filter selecting the rows of one user.
    fn user_filter(user_id: u64) -> [(&'static str, String); 1] {
        [("user_id", format!("eq.{}", user_id))]
    }

    /// `inserting` names the user of an insert; only then can a 409 or a
    /// unique violation mean "already has a story".
    async fn send(
        &self,
        request: RequestBuilder,
        inserting: Option<u64>,
    ) -> Result<Response, StoreError> {
        let response = self
            .authed(request)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &body, inserting))
    }

    async fn read_rows(response: Response) -> Result<Vec<StoryRow>, StoreError> {
        response
            .json::<Vec<StoryRow>>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

/// Turn a failed PostgREST response into a StoreError.
fn classify_error(status: StatusCode, body: &str, inserting: Option<u64>) -> StoreError {
    let api_error: ApiError = serde_json::from_str(body).unwrap_or_default();

    if let Some(user_id) = inserting {
        if api_error.code.as_deref() == Some(UNIQUE_VIOLATION) || status == StatusCode::CONFLICT {
            return StoreError::Conflict(user_id);
        }
    }

    let message = api_error
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status));
    StoreError::Backend(message)
}

#[async_trait]
impl StoryStore for SupabaseStoryStore {
    async fn find_by_user(&self, user_id: u64) -> Result<Option<Story>, StoreError> {
        let request = self
            .client
            .get(&self.rest_url)
            .query(&[("select", "*".to_string())])
            .query(&Self::user_filter(user_id))
            .query(&[("limit", "1".to_string())]);

        let response = self.send(request, None).await?;
        let rows = Self::read_rows(response).await?;

        rows.into_iter().next().map(StoryRow::into_story).transpose()
    }

    async fn insert(&self, story: NewStory) -> Result<Story, StoreError> {
        let payload = InsertRow {
            user_id: story.user_id.to_string(),
            username: &story.username,
            titulo: &story.title,
            conteudo: &story.content,
        };

        let request = self
            .client
            .post(&self.rest_url)
            .header("Prefer", "return=representation")
            .json(&payload);

        let response = self.send(request, Some(story.user_id)).await?;

        Self::read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no row".to_string()))?
            .into_story()
    }

    async fn update_by_user(&self, user_id: u64, update: StoryUpdate) -> Result<Story, StoreError> {
        let payload = UpdateRow {
            titulo: &update.title,
            conteudo: &update.content,
            updated_at: Utc::now(),
        };

        let request = self
            .client
            .patch(&self.rest_url)
            .query(&Self::user_filter(user_id))
            .header("Prefer", "return=representation")
            .json(&payload);

        let response = self.send(request, None).await?;

        Self::read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound(user_id))?
            .into_story()
    }

    async fn delete_by_user(&self, user_id: u64) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(&self.rest_url)
            .query(&Self::user_filter(user_id));

        self.send(request, None).await?;
        Ok(())
    }
}
