//! # Application Configuration
//!
//! Optional `signet.toml`:
//!
//! ```toml
//! [engine]
//! max_len = 3
//! consensus = true
//! max_history = 50
//!
//! [resource]
//! path = "interactions.tsv"
//! format = "tsv"
//! ontology = "terms.tsv"
//! ```
//!
//! Command-line flags override values read here.

use crate::loader;
use serde::Deserialize;
use signet_core::{EngineConfig, NetworkError};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "signet.toml";

/// Interaction table layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceFormat {
    #[default]
    Tsv,
    Sif,
}

impl ResourceFormat {
    /// Parse a format name.
    pub fn parse(name: &str) -> Result<Self, NetworkError> {
        match name.to_ascii_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "sif" => Ok(Self::Sif),
            other => Err(NetworkError::DeserializationError(format!(
                "Unknown resource format '{}' (expected tsv or sif)",
                other
            ))),
        }
    }

    /// Guess from the file extension, falling back to TSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("sif") => Self::Sif,
            _ => Self::Tsv,
        }
    }
}

/// Collaborator files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceConfig {
    pub path: Option<PathBuf>,
    pub format: Option<ResourceFormat>,
    /// Term table (`term<TAB>label<TAB>genes`).
    pub ontology: Option<PathBuf>,
    /// Identifier mapping table (`accession<TAB>label<TAB>aliases`).
    pub translator: Option<PathBuf>,
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub resource: ResourceConfig,
}

impl AppConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, NetworkError> {
        toml::from_str(text)
            .map_err(|e| NetworkError::DeserializationError(format!("Invalid configuration: {}", e)))
    }

    /// Load `explicit`, or `signet.toml` from the working directory when it
    /// exists, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, NetworkError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("no configuration file, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        tracing::info!("Loading configuration from {:?}", path);
        let text = loader::read_text(&path, loader::MAX_CONFIG_FILE_SIZE)?;
        Self::from_toml(&text)
    }
}
