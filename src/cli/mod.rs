//! Command-line interface for pugdep.
//!
//! # Available Commands
//!
//! - `resolve` - Resolve an entry template and print the result as text, JSON,
//!   or a CommonJS module
//! - `deps` - Print the asset dependencies of an entry template
//! - `watch` - Re-resolve an entry template whenever one of its templates changes
//!
//! # Command Usage Patterns
//!
//! ```bash
//! # Render a page with its layout and partials
//! pugdep resolve views/index.pug
//!
//! # Write the bundler module next to the build output
//! pugdep resolve views/index.pug --format module --output dist/index.js
//!
//! # List every asset the page pulls in
//! pugdep deps views/index.pug --flat
//!
//! # Track images referenced from `source(src=...)` as well
//! pugdep deps views/index.pug --attr img:src --attr source:src
//! ```
//!
//! # Configuration
//!
//! Settings come from `pugdep.toml` in the working directory (or the file
//! given with `--config` / `PUGDEP_CONFIG`); per-command flags override them.
//!
//! # Output
//!
//! Resolver output goes to stdout. Logs go to stderr and are controlled with
//! `--verbose`, `--quiet` and `RUST_LOG`.

mod common;
mod deps;
mod resolve;
mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use common::ResolverArgs;

/// Runtime settings derived from the global flags
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter; `None` keeps `RUST_LOG` (or `info` when unset)
    pub log_level: Option<String>,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the stderr log subscriber.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init();
    }
}

/// Resolve template composition and asset dependencies
#[derive(Parser, Debug)]
#[command(
    name = "pugdep",
    about = "Resolve extends/include/block composition in pug templates and track asset dependencies",
    version,
    long_about = "pugdep flattens a template's extends/include/block chain into one document, rewrites relative asset attributes to absolute paths, and reports which assets each template depends on."
)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    ///
    /// Shows which templates are loaded, reused from the cache, or reloaded
    /// because they changed. Equivalent to `RUST_LOG=debug`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a pugdep.toml configuration file
    ///
    /// Defaults to `./pugdep.toml` when that file exists.
    #[arg(short, long, global = true, env = "PUGDEP_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve an entry template
    Resolve(resolve::ResolveCommand),
    /// Print the asset dependencies of an entry template
    Deps(deps::DepsCommand),
    /// Re-resolve an entry template whenever it or a template it uses changes
    Watch(watch::WatchCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns the first error of the command; callers should display it with
    /// [`user_friendly_error`](crate::core::user_friendly_error).
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`]
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration
    ///
    /// # Errors
    ///
    /// Same as [`Cli::execute`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(config.config_path).await,
            Commands::Deps(cmd) => cmd.execute(config.config_path).await,
            Commands::Watch(cmd) => cmd.execute(config.config_path).await,
        }
    }
}
