//! Runtime tunables for the crawler and the search client.
//!
//! Every value has a code-level default, so a missing config file is not an
//! error. A YAML file may override any subset of fields:
//!
//! ```yaml
//! collector:
//!   max_pages_per_newspaper: 5
//!   max_workers: 4
//! search:
//!   request_delay_ms: 250
//! ```
//!
//! Settings are validated once and then handed to each component's
//! constructor. Nothing here is global.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Upper bound the search API accepts for `display`.
pub const API_MAX_DISPLAY: u64 = 100;

/// Top-level settings file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub collector: CollectorConfig,
    pub search: SearchConfig,
}

impl Settings {
    /// Load settings from `path`, or return defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = match path {
            None => Settings::default(),
            Some(path) => {
                let raw = std::fs::read_to_string(Path::new(path)).map_err(|source| {
                    ConfigError::Io {
                        path: path.to_string(),
                        source,
                    }
                })?;
                let parsed = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
                    path: path.to_string(),
                    source,
                })?;
                info!(path, "Loaded settings file");
                parsed
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.collector.validate()?;
        self.search.validate()
    }
}

/// Tunables for the multi-paper crawl.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CollectorConfig {
    /// Listing pages walked per newspaper before stopping.
    pub max_pages_per_newspaper: u32,
    /// Newspapers crawled concurrently.
    pub max_workers: usize,
    /// The pause between two listing pages is drawn uniformly from
    /// `page_delay_min_ms..=page_delay_max_ms`.
    pub page_delay_min_ms: u64,
    pub page_delay_max_ms: u64,
    pub request_timeout_secs: u64,
    /// Wall-clock budget for one newspaper's whole crawl.
    pub task_timeout_secs: u64,
    pub listing_base_url: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_pages_per_newspaper: 10,
            max_workers: 3,
            page_delay_min_ms: 300,
            page_delay_max_ms: 300,
            request_timeout_secs: 10,
            task_timeout_secs: 30,
            listing_base_url: "https://news.naver.com/main/list.naver".to_string(),
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages_per_newspaper == 0 {
            return Err(ConfigError::Zero {
                field: "max_pages_per_newspaper",
            });
        }
        if self.max_workers == 0 {
            return Err(ConfigError::Zero {
                field: "max_workers",
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "request_timeout_secs",
            });
        }
        if self.task_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "task_timeout_secs",
            });
        }
        if self.page_delay_min_ms > self.page_delay_max_ms {
            return Err(ConfigError::DelayRange {
                min: self.page_delay_min_ms,
                max: self.page_delay_max_ms,
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

/// Tunables and endpoints for keyword search.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// `display` sent to the API; clamped to 1..=100.
    pub max_articles_per_request: u64,
    /// Pause between two API pages.
    pub request_delay_ms: u64,
    /// Pause between two fallback result pages.
    pub fallback_page_delay_ms: u64,
    pub fallback_timeout_secs: u64,
    pub api_timeout_secs: u64,
    pub api_url: String,
    pub fallback_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_articles_per_request: 100,
            request_delay_ms: 100,
            fallback_page_delay_ms: 1000,
            fallback_timeout_secs: 30,
            api_timeout_secs: 10,
            api_url: "https://openapi.naver.com/v1/search/news.json".to_string(),
            fallback_url: "https://search.naver.com/search.naver".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=API_MAX_DISPLAY).contains(&self.max_articles_per_request) {
            return Err(ConfigError::OutOfRange {
                field: "max_articles_per_request",
                min: 1,
                max: API_MAX_DISPLAY,
                value: self.max_articles_per_request,
            });
        }
        if self.fallback_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "fallback_timeout_secs",
            });
        }
        if self.api_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "api_timeout_secs",
            });
        }
        Ok(())
    }

    /// Page size for API requests.
    pub fn api_page_size(&self) -> u64 {
        self.max_articles_per_request.clamp(1, API_MAX_DISPLAY)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn fallback_page_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_page_delay_ms)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_timeout_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

/// Client id/secret pair for the search API.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Both halves must be present and non-blank.
    pub fn from_parts(client_id: Option<String>, client_secret: Option<String>) -> Option<Self> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.trim().is_empty() && !secret.trim().is_empty() => {
                Some(Self {
                    client_id: id,
                    client_secret: secret,
                })
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
