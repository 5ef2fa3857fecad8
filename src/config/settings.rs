//! Resolver settings and their TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::AttributePattern;
use crate::core::{PugdepError, Result};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "pugdep.toml";

const SUPPORTED_SEPARATORS: [&str; 3] = ["\n", "\r\n", "\r"];

/// Raw resolver settings as written in `pugdep.toml`
///
/// Every field is optional in the file; missing fields take the defaults
/// shown by [`ResolverConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResolverConfig {
    /// Spaces per nesting level (default 2)
    pub indent_unit: usize,
    /// Output line separator (default `"\n"`)
    pub line_separator: String,
    /// `tag:attr` / `:attr` patterns selecting asset attributes (default `["img:src"]`)
    pub attributes: Vec<String>,
    /// Extension appended to extension-less template paths (default `"pug"`)
    pub default_extension: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            indent_unit: 2,
            line_separator: "\n".to_string(),
            attributes: vec!["img:src".to_string()],
            default_extension: "pug".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Load settings from a specific TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PugdepError::FileNotFound`] / [`PugdepError::Io`] if the file
    /// cannot be read and [`PugdepError::ConfigParse`] if it is not valid for
    /// this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).await.map_err(|e| PugdepError::io("reading", path, e))?;

        let config: Self = toml::from_str(&content).map_err(|source| PugdepError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load settings from `path` if given, otherwise from `./pugdep.toml` when
    /// it exists, otherwise return the defaults.
    ///
    /// An explicitly given path must exist.
    ///
    /// # Errors
    ///
    /// Same as [`ResolverConfig::load_from`].
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(&path).await;
        }

        let default_path = PathBuf::from(CONFIG_FILE_NAME);
        if fs::try_exists(&default_path).await.unwrap_or(false) {
            Self::load_from(&default_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Check every setting and produce the form the resolver consumes.
    ///
    /// # Errors
    ///
    /// - [`PugdepError::InvalidAttributePattern`] for a malformed attribute pattern
    /// - [`PugdepError::InvalidConfig`] for a zero indent unit or an unsupported
    ///   line separator
    pub fn validate(&self) -> Result<ValidatedConfig> {
        if self.indent_unit == 0 {
            return Err(PugdepError::InvalidConfig {
                reason: "indent-unit must be at least 1".to_string(),
            });
        }

        if !SUPPORTED_SEPARATORS.contains(&self.line_separator.as_str()) {
            return Err(PugdepError::InvalidConfig {
                reason: format!(
                    "line-separator must be \"\\n\", \"\\r\\n\" or \"\\r\", got {:?}",
                    self.line_separator
                ),
            });
        }

        let patterns = self
            .attributes
            .iter()
            .map(|raw| AttributePattern::parse(raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(ValidatedConfig {
            indent_unit: self.indent_unit,
            line_separator: self.line_separator.clone(),
            patterns,
            default_extension: self.default_extension.trim_start_matches('.').to_string(),
        })
    }
}

/// Settings after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Spaces per nesting level
    pub indent_unit: usize,
    /// Output line separator
    pub line_separator: String,
    /// Parsed attribute patterns
    pub patterns: Vec<AttributePattern>,
    /// Extension without the leading dot; empty disables appending
    pub default_extension: String,
}

impl ValidatedConfig {
    /// Whether `attribute` on the currently open `tag` carries an asset path.
    #[must_use]
    pub fn matches_attribute(&self, tag: Option<&str>, attribute: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(tag, attribute))
    }

    /// Append the default extension to a path that has none.
    #[must_use]
    pub fn with_default_extension(&self, path: &Path) -> PathBuf {
        if path.extension().is_none() && !self.default_extension.is_empty() {
            path.with_extension(&self.default_extension)
        } else {
            path.to_path_buf()
        }
    }
}
