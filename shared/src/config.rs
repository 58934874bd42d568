//! Configuration management for the check-in functions.

use std::env;
use std::time::Duration;

use crate::{Error, Result};

/// Application configuration loaded from environment variables.
///
/// Resolved once at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct Config {
    /// Notion API base URL
    pub notion_api_base: String,
    /// Value sent in the `Notion-Version` header
    pub notion_version: String,
    /// Name of the title property on the target database
    pub title_property: String,
    /// Name of the date property on the target database; must match exactly
    pub date_property: String,
    /// Suffix appended to the date in each record title
    pub title_suffix: String,
    /// Optional timeout for calls to Notion
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notion_api_base: "https://api.notion.com/v1".to_string(),
            notion_version: "2022-06-28".to_string(),
            title_property: "이름".to_string(),
            date_property: "날짜".to_string(),
            title_suffix: "캘린더 기록".to_string(),
            request_timeout: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let request_timeout = match lookup("NOTION_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("NOTION_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let config = Self {
            notion_api_base: lookup("NOTION_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.notion_api_base),
            notion_version: lookup("NOTION_VERSION").unwrap_or(defaults.notion_version),
            title_property: lookup("NOTION_TITLE_PROPERTY").unwrap_or(defaults.title_property),
            date_property: lookup("NOTION_DATE_PROPERTY").unwrap_or(defaults.date_property),
            title_suffix: lookup("CHECKIN_TITLE_SUFFIX").unwrap_or(defaults.title_suffix),
            request_timeout,
        };

        if config.title_property.trim().is_empty() {
            return Err(Error::Config("NOTION_TITLE_PROPERTY is empty".to_string()));
        }
        if config.date_property.trim().is_empty() {
            return Err(Error::Config("NOTION_DATE_PROPERTY is empty".to_string()));
        }

        Ok(config)
    }

    /// Title written on a new check-in record.
    pub fn record_title(&self, date: &str) -> String {
        format!("{} - {}", date, self.title_suffix)
    }
}
