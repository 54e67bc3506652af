use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SearchError;
use crate::search::highlight::{ELLIPSIS, MAX_UNIT_WIDTH};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_SNIPPET_WINDOW: usize = 160;
pub const DEFAULT_RECENCY_WINDOW_DAYS: i64 = 10;

/// Tunables for the search engine. Every field falls back to its default
/// when missing from the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of matches returned per search.
    pub page_size: usize,
    /// Maximum snippet length in characters, ellipsis markers included.
    pub snippet_window: usize,
    /// Matches older than this many days get no recency bonus.
    pub recency_window_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            snippet_window: DEFAULT_SNIPPET_WINDOW,
            recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, SearchError> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or fall back to defaults if no file exists there.
    /// Hosts usually pass [`default_config_path`].
    pub fn load_or_default(path: &Path) -> Result<Self, SearchError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.page_size == 0 {
            return Err(SearchError::Config("page_size must be positive".to_string()));
        }
        if self.snippet_window < min_snippet_window() {
            return Err(SearchError::Config(format!(
                "snippet_window must be at least {}",
                min_snippet_window()
            )));
        }
        if self.recency_window_days < 0 {
            return Err(SearchError::Config(
                "recency_window_days must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Room for both ellipsis markers plus one escaped delimiter.
fn min_snippet_window() -> usize {
    MAX_UNIT_WIDTH + 2 * ELLIPSIS.chars().count()
}

pub fn default_config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("conversation-search");
    path.push("config.json");
    path
}
