// src/config.rs
// Mirror configuration: explicit values > environment > defaults

use std::env;
use std::time::Duration;

use chrono::Local;
use thiserror::Error;

pub const ENV_SECRET: &str = "NOTION_PROGRESS_SECRET";
pub const ENV_DATABASE_ID: &str = "NOTION_PROGRESS_DATABASE_ID";

pub const DEFAULT_TITLE_PROPERTY: &str = "Name";
pub const DEFAULT_PROGRESS_PROPERTY: &str = "Progress";
pub const DEFAULT_DATE_PROPERTY: &str = "Date";
pub const DEFAULT_TIME_REMAINING_PROPERTY: &str = "Time Remaining";
pub const DEFAULT_FILLED_CHAR: char = '▓';
pub const DEFAULT_EMPTY_CHAR: char = '░';
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing Notion integration secret (pass one explicitly or set {})", ENV_SECRET)]
    MissingSecret,

    #[error("missing Notion database id (pass one explicitly or set {})", ENV_DATABASE_ID)]
    MissingDatabaseId,
}

/// Fully resolved mirror configuration, validated once at construction and
/// never re-read mid-run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub secret: String,
    pub database_id: String,
    pub title_property: String,
    pub page_title: String,
    pub progress_property: String,
    pub date_property: String,
    pub time_remaining_property: String,
    pub filled_char: char,
    pub empty_char: char,
    pub update_interval: Duration,
    pub disabled: bool,
}

impl MirrorConfig {
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    /// Resolve everything from the environment and defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder().build()
    }
}

#[derive(Debug, Default)]
pub struct MirrorConfigBuilder {
    secret: Option<String>,
    database_id: Option<String>,
    title_property: Option<String>,
    page_title: Option<String>,
    progress_property: Option<String>,
    date_property: Option<String>,
    time_remaining_property: Option<String>,
    filled_char: Option<char>,
    empty_char: Option<char>,
    update_interval: Option<Duration>,
    disabled: bool,
}

impl MirrorConfigBuilder {
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn database_id(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = Some(database_id.into());
        self
    }

    pub fn title_property(mut self, name: impl Into<String>) -> Self {
        self.title_property = Some(name.into());
        self
    }

    pub fn page_title(mut self, title: impl Into<String>) -> Self {
        self.page_title = Some(title.into());
        self
    }

    pub fn progress_property(mut self, name: impl Into<String>) -> Self {
        self.progress_property = Some(name.into());
        self
    }

    pub fn date_property(mut self, name: impl Into<String>) -> Self {
        self.date_property = Some(name.into());
        self
    }

    pub fn time_remaining_property(mut self, name: impl Into<String>) -> Self {
        self.time_remaining_property = Some(name.into());
        self
    }

    pub fn filled_char(mut self, c: char) -> Self {
        self.filled_char = Some(c);
        self
    }

    pub fn empty_char(mut self, c: char) -> Self {
        self.empty_char = Some(c);
        self
    }

    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = Some(interval);
        self
    }

    /// Disable all remote behavior: no page is created and no update is
    /// ever sent. Credentials are not required in this mode.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn build(self) -> Result<MirrorConfig, ConfigError> {
        dotenvy::dotenv().ok();

        let (secret, database_id) = if self.disabled {
            (String::new(), String::new())
        } else {
            let secret = self
                .secret
                .or_else(|| env::var(ENV_SECRET).ok())
                .filter(|s| !s.trim().is_empty())
                .ok_or(ConfigError::MissingSecret)?;
            let database_id = self
                .database_id
                .or_else(|| env::var(ENV_DATABASE_ID).ok())
                .filter(|s| !s.trim().is_empty())
                .ok_or(ConfigError::MissingDatabaseId)?;
            (secret, database_id)
        };

        Ok(MirrorConfig {
            secret,
            database_id,
            title_property: self
                .title_property
                .unwrap_or_else(|| DEFAULT_TITLE_PROPERTY.to_string()),
            page_title: self.page_title.unwrap_or_else(default_page_title),
            progress_property: self
                .progress_property
                .unwrap_or_else(|| DEFAULT_PROGRESS_PROPERTY.to_string()),
            date_property: self
                .date_property
                .unwrap_or_else(|| DEFAULT_DATE_PROPERTY.to_string()),
            time_remaining_property: self
                .time_remaining_property
                .unwrap_or_else(|| DEFAULT_TIME_REMAINING_PROPERTY.to_string()),
            filled_char: self.filled_char.unwrap_or(DEFAULT_FILLED_CHAR),
            empty_char: self.empty_char.unwrap_or(DEFAULT_EMPTY_CHAR),
            update_interval: self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL),
            disabled: self.disabled,
        })
    }
}

fn default_page_title() -> String {
    Local::now().format("%d-%m, %H:%M").to_string()
}
