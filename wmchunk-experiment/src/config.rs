use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wmchunk_core::DEFAULT_MASK;

use crate::score::ScoringRules;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub mask_symbol: char,
    pub poll_interval_ms: u64,
    /// Upper bound on waiting for the next key in retrieval. `None` waits
    /// forever.
    pub response_timeout_ms: Option<u64>,
    pub scoring: ScoringRules,
    pub layout: Layout,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            mask_symbol: DEFAULT_MASK,
            poll_interval_ms: 1,
            response_timeout_ms: None,
            scoring: ScoringRules::default(),
            layout: Layout::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }
}

/// Placement of the task's screen elements, in display units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub frame_width: f32,
    pub frame_height: f32,
    pub sequence_x: f32,
    pub item_spacing: f32,
    pub cue_x: f32,
    pub cue_size: f32,
    pub scoreboard_y: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            frame_width: 8.0,
            frame_height: 2.0,
            sequence_x: 5.0,
            item_spacing: 0.855,
            cue_x: -5.0,
            cue_size: 2.0,
            scoreboard_y: 2.0,
        }
    }
}
