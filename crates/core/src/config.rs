use std::path::{Path, PathBuf};

use scrollspy_protocol::PolicyOverride;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nav::{NavItem, default_sections};
use crate::observers::{RevealConfig, SectionList};
use crate::styles::StyleConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Adjustments to the central-band policy.
    pub policy: Option<PolicyOverride>,
}

/// Everything a page session needs. Every field has a default, so `{}` is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpyConfig {
    pub sections: Vec<NavItem>,
    pub tracker: TrackerConfig,
    pub reveal: RevealConfig,
    pub styles: StyleConfig,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            tracker: TrackerConfig::default(),
            reveal: RevealConfig::default(),
            styles: StyleConfig::default(),
        }
    }
}

impl SpyConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Section ids in navigation order. Each call builds a new list
    /// instance.
    pub fn section_list(&self) -> SectionList {
        self.sections.iter().map(|s| s.id.clone()).collect()
    }
}
