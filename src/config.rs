// Startup configuration, read once from the environment.
//
// `main` calls `dotenv` first, so a local `.env` file works the same as
// real environment variables.

use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_STORY_DB_PATH: &str = "data/stories.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable! Create a .env file with it.")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Where stories are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryBackend {
    Supabase { url: String, api_key: String },
    Sqlite { path: PathBuf },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub discord_token: String,
    /// `None` keeps the bot running; `/ask` then answers with its fallback.
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub system_prompt_file: Option<PathBuf>,
    pub story_backend: StoryBackend,
    /// Register commands in this guild only instead of globally.
    pub dev_guild_id: Option<u64>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let discord_token = require("DISCORD_TOKEN")?;

        let story_backend = match get("STORY_BACKEND")
            .unwrap_or_else(|| "supabase".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "supabase" => StoryBackend::Supabase {
                url: require("SUPABASE_URL")?,
                api_key: require("SUPABASE_KEY")?,
            },
            "sqlite" => StoryBackend::Sqlite {
                path: get("STORY_DB_PATH")
                    .unwrap_or_else(|| DEFAULT_STORY_DB_PATH.to_string())
                    .into(),
            },
            "memory" => StoryBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORY_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let dev_guild_id = match get("DISCORD_DEV_GUILD_ID") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "DISCORD_DEV_GUILD_ID",
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(Self {
            discord_token,
            groq_api_key: get("GROQ_API_KEY"),
            groq_model: get("GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            system_prompt_file: get("ASK_SYSTEM_PROMPT_FILE").map(PathBuf::from),
            story_backend,
            dev_guild_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn missing_token_is_fatal() {
        assert_eq!(
            config_from(&[("STORY_BACKEND", "memory")]),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        );
    }

    #[test]
    fn blank_token_counts_as_missing() {
        assert_eq!(
            config_from(&[("DISCORD_TOKEN", "   "), ("STORY_BACKEND", "memory")]),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        );
    }

    #[test]
    fn defaults_to_supabase_and_requires_its_settings() {
        assert_eq!(
            config_from(&[("DISCORD_TOKEN", "t")]),
            Err(ConfigError::Missing("SUPABASE_URL"))
        );

        let config = config_from(&[
            ("DISCORD_TOKEN", "t"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", "k"),
            ("GROQ_API_KEY", "g"),
        ])
        .unwrap();

        assert_eq!(
            config.story_backend,
            StoryBackend::Supabase {
                url: "https://abc.supabase.co".to_string(),
                api_key: "k".to_string(),
            }
        );
        assert_eq!(config.groq_api_key.as_deref(), Some("g"));
        assert_eq!(config.groq_model, "llama-3.1-8b-instant");
    }

    #[test]
    fn sqlite_backend_uses_default_path() {
        let config = config_from(&[("DISCORD_TOKEN", "t"), ("STORY_BACKEND", "SQLite")]).unwrap();

        assert_eq!(
            config.story_backend,
            StoryBackend::Sqlite {
                path: PathBuf::from("data/stories.db")
            }
        );
    }

    #[test]
    fn groq_key_is_optional() {
        let config = config_from(&[("DISCORD_TOKEN", "t"), ("STORY_BACKEND", "memory")]).unwrap();
        assert_eq!(config.groq_api_key, None);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert_eq!(
            config_from(&[("DISCORD_TOKEN", "t"), ("STORY_BACKEND", "mongo")]),
            Err(ConfigError::Invalid {
                key: "STORY_BACKEND",
                value: "mongo".to_string()
            })
        );
    }

    #[test]
    fn dev_guild_must_be_numeric() {
        let ok = config_from(&[
            ("DISCORD_TOKEN", "t"),
            ("STORY_BACKEND", "memory"),
            ("DISCORD_DEV_GUILD_ID", "1432001978447167611"),
        ])
        .unwrap();
        assert_eq!(ok.dev_guild_id, Some(1432001978447167611));

        assert!(matches!(
            config_from(&[
                ("DISCORD_TOKEN", "t"),
                ("STORY_BACKEND", "memory"),
                ("DISCORD_DEV_GUILD_ID", "abc"),
            ]),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
