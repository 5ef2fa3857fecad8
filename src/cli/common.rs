//! Arguments shared by every subcommand.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::config::ResolverConfig;
use crate::templating::Resolver;

/// Line separator choices for `--line-separator`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LineSeparator {
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
    /// `\r`
    Cr,
}

impl LineSeparator {
    /// The separator string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
        }
    }
}

/// Entry template plus overrides of `pugdep.toml` settings
#[derive(Args, Debug, Clone)]
pub struct ResolverArgs {
    /// Entry template; the default extension is appended when missing
    pub entry: PathBuf,

    /// Spaces per nesting level in the output
    #[arg(long, value_name = "N")]
    pub indent_unit: Option<usize>,

    /// Line separator of the output
    #[arg(long, value_enum)]
    pub line_separator: Option<LineSeparator>,

    /// Asset attribute pattern (`tag:attr` or `:attr`); repeat to add more
    ///
    /// Replaces the configured list when given.
    #[arg(long = "attr", value_name = "PATTERN")]
    pub attributes: Vec<String>,

    /// Extension appended to template paths without one
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,
}

impl ResolverArgs {
    /// Load the configuration file (if any) and apply command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit configuration file cannot be loaded.
    pub async fn load_config(&self, config_path: Option<PathBuf>) -> Result<ResolverConfig> {
        let mut config = ResolverConfig::load_with_optional(config_path)
            .await
            .context("Failed to load configuration")?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ResolverConfig) {
        if let Some(indent_unit) = self.indent_unit {
            config.indent_unit = indent_unit;
        }
        if let Some(separator) = self.line_separator {
            config.line_separator = separator.as_str().to_string();
        }
        if !self.attributes.is_empty() {
            config.attributes.clone_from(&self.attributes);
        }
        if let Some(extension) = &self.extension {
            config.default_extension.clone_from(extension);
        }
    }

    /// Build a resolver from the merged configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub async fn build_resolver(&self, config_path: Option<PathBuf>) -> Result<Resolver> {
        let config = self.load_config(config_path).await?;
        tracing::debug!("Using configuration {:?}", config);
        Ok(Resolver::new(&config)?)
    }
}
