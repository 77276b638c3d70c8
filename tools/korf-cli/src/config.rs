//! korf.toml configuration
//!
//! Every section is optional; missing keys fall back to library defaults.
//!
//! ```toml
//! [classifier]
//! drum_keywords = ["kick", "snare", "toba"]
//! detect_notes = true
//!
//! [linker]
//! min_token_overlap = 2
//!
//! [export]
//! bank_name = "USER01"
//! ```

use anyhow::{Context, Result};
use korf_pcm::{ClassifierConfig, ExportOptions, LinkerConfig};
use serde::Deserialize;
use std::path::Path;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG: &str = "korf.toml";

/// Parsed korf.toml
#[derive(Debug, Default, Deserialize)]
pub struct KorfConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub linker: LinkerConfig,
    #[serde(default)]
    pub export: ExportOptions,
}

impl KorfConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse config text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` if given, else `korf.toml` if present, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG);
                if default.is_file() {
                    tracing::debug!("Using {}", DEFAULT_CONFIG);
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
