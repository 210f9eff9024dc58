//! File-based configuration loading.

use std::path::{Path, PathBuf};

use super::ManagerConfig;
use crate::error::{MockError, Result};

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration file loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Search paths.
    search_paths: Vec<PathBuf>,
    /// Format for files without a known extension.
    default_format: Option<ConfigFormat>,
}

impl ConfigLoader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search path.
    #[must_use]
    pub fn add_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Set default format.
    #[must_use]
    pub const fn with_format(mut self, format: ConfigFormat) -> Self {
        self.default_format = Some(format);
        self
    }

    /// Find a config file.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        for search_path in &self.search_paths {
            let path = search_path.join(name);
            if path.is_file() {
                return Some(path);
            }

            for ext in ["toml", "json"] {
                let path = search_path.join(format!("{name}.{ext}"));
                if path.is_file() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Load a config file.
    pub fn load(&self, path: &Path) -> Result<ManagerConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| MockError::io(path, e))?;

        let format = ConfigFormat::from_path(path)
            .or(self.default_format)
            .ok_or_else(|| {
                MockError::config(format!("unknown config format: {}", path.display()))
            })?;

        tracing::debug!(path = %path.display(), ?format, "loading intercept config");
        parse_config(&content, format)
    }

    /// Load by name (searches paths).
    pub fn load_by_name(&self, name: &str) -> Result<ManagerConfig> {
        let path = self
            .find(name)
            .ok_or_else(|| MockError::config(format!("config file not found: {name}")))?;
        self.load(&path)
    }
}

/// Parse config content.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<ManagerConfig> {
    match format {
        ConfigFormat::Toml => Ok(toml::from_str(content)?),
        ConfigFormat::Json => Ok(serde_json::from_str(content)?),
    }
}
