//! TOML configuration for the importer.
//!
//! ```toml
//! # targetedms.toml
//! [import]
//! transition_chrom_info_ceiling = 5000000
//! batch_size = 1000
//! label_max_len = 255
//! min_library_anchors = 3
//! ```

use serde::Deserialize;
use std::path::Path;

/// Errors loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Root configuration structure for targetedms.toml files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Import pipeline settings.
    #[serde(default)]
    pub import: ImportConfig,
}

/// Tunables for a single document import.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Above this many transition-level chromatogram results, per-transition
    /// rows are not stored and precursor rows carry a chromatogram index.
    pub transition_chrom_info_ceiling: usize,

    /// Number of annotation rows buffered per kind before a flush.
    pub batch_size: usize,

    /// Width protein group labels are truncated to.
    pub label_max_len: usize,

    /// Overlapping library peptides needed to calibrate an iRT import when
    /// no standard peptide overlaps.
    pub min_library_anchors: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            transition_chrom_info_ceiling: 5_000_000,
            batch_size: 1000,
            label_max_len: 255,
            min_library_anchors: 3,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
