//! Error handling for pugdep
//!
//! This module provides the error type shared by every stage of template
//! resolution and the user-friendly reporting used by the CLI.
//!
//! # Architecture
//!
//! - [`PugdepError`] - Enumerated failure modes of configuration, loading,
//!   tokenizing, and composition
//! - [`ErrorContext`] - Wrapper that adds a suggestion and details for terminal output
//!
//! Every fatal condition aborts the whole resolution; no partial artifact is
//! ever returned alongside an error.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pugdep::core::{PugdepError, user_friendly_error};
//!
//! let error = PugdepError::FileNotFound {
//!     path: "/proj/views/layout.pug".into(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the library API.
pub type Result<T, E = PugdepError> = std::result::Result<T, E>;

/// The main error type for pugdep operations
///
/// # Error Categories
///
/// ## Loading
/// - [`FileNotFound`] - An entry, `extends`, or `include` target does not exist
/// - [`Io`] - Any other filesystem failure (permissions, invalid UTF-8, ...)
///
/// ## Parsing
/// - [`Syntax`] - The tokenizer rejected a template
/// - [`CircularReference`] - An `extends`/`include` chain re-entered itself
///
/// ## Configuration
/// - [`InvalidAttributePattern`] - An `attributes` entry is not `tag:attr` or `:attr`
/// - [`InvalidConfig`] - Any other configuration value is out of range
/// - [`ConfigParse`] - The configuration file is not valid TOML for the schema
///
/// [`FileNotFound`]: PugdepError::FileNotFound
/// [`Io`]: PugdepError::Io
/// [`Syntax`]: PugdepError::Syntax
/// [`CircularReference`]: PugdepError::CircularReference
/// [`InvalidAttributePattern`]: PugdepError::InvalidAttributePattern
/// [`InvalidConfig`]: PugdepError::InvalidConfig
/// [`ConfigParse`]: PugdepError::ConfigParse
#[derive(Error, Debug)]
pub enum PugdepError {
    /// A template file could not be found
    ///
    /// The path already carries the default extension when the reference
    /// omitted one.
    #[error("Template not found: {}", path.display())]
    FileNotFound {
        /// Absolute path that was looked up
        path: PathBuf,
    },

    /// The tokenizer rejected a template
    #[error("Syntax error in {}:{line}: {message}", path.display())]
    Syntax {
        /// Template that failed to tokenize
        path: PathBuf,
        /// 1-based line of the offending construct
        line: usize,
        /// Tokenizer message
        message: String,
    },

    /// An `extends`/`include` graph contains a cycle
    ///
    /// `chain` lists the templates in resolution order and ends with the
    /// template that was re-entered.
    #[error("Circular template reference: {}", format_chain(chain))]
    CircularReference {
        /// Templates in the cycle, in the order they were entered
        chain: Vec<PathBuf>,
    },

    /// An attribute pattern is malformed
    #[error("Invalid attribute pattern `{pattern}`: {reason}")]
    InvalidAttributePattern {
        /// The pattern as configured
        pattern: String,
        /// What is wrong with it
        reason: String,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with it
        reason: String,
    },

    /// The configuration file could not be parsed
    #[error("Failed to parse configuration file {}", path.display())]
    ConfigParse {
        /// Configuration file
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A filesystem operation failed
    #[error("Failed {operation} {}", path.display())]
    Io {
        /// What was being done, e.g. "reading"
        operation: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Any error that does not fit the categories above
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> ")
}

impl PugdepError {
    /// Build an [`PugdepError::Io`], mapping `NotFound` to [`PugdepError::FileNotFound`].
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path,
            }
        } else {
            Self::Io {
                operation,
                path,
                source,
            }
        }
    }
}

/// Error wrapper with a suggestion and details for terminal display
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: PugdepError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Why it happened
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without suggestion or details
    #[must_use]
    pub const fn new(error: PugdepError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with suggestions.
///
/// Errors that are not a [`PugdepError`] keep their full context chain as the
/// message of a [`PugdepError::Other`].
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain = format!("{error:#}");
    match error.downcast::<PugdepError>() {
        Ok(pugdep_error) => create_error_context(pugdep_error),
        Err(other) => {
            let permission_denied = other
                .downcast_ref::<std::io::Error>()
                .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied);
            let ctx = ErrorContext::new(PugdepError::Other {
                message: chain,
            });
            if permission_denied {
                ctx.with_suggestion("Check file ownership and permissions")
            } else {
                ctx
            }
        }
    }
}

fn create_error_context(error: PugdepError) -> ErrorContext {
    match &error {
        PugdepError::FileNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the `extends`/`include` path; references are resolved relative to the template that contains them")
            .with_details("Paths without an extension get the configured default extension appended"),
        PugdepError::Syntax {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Fix the template syntax at the reported line")
            .with_details("Every template is tokenized before composition; a syntax error aborts the whole resolution"),
        PugdepError::CircularReference {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Remove one of the `extends`/`include` references in the cycle"),
        PugdepError::InvalidAttributePattern {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use `tag:attribute` (e.g. `img:src`) or `:attribute` to match any tag"),
        PugdepError::InvalidConfig {
            ..
        }
        | PugdepError::ConfigParse {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check pugdep.toml or the command-line overrides"),
        PugdepError::Io {
            source,
            ..
        } if source.kind() == std::io::ErrorKind::PermissionDenied => {
            ErrorContext::new(error).with_suggestion("Check file ownership and permissions")
        }
        PugdepError::Io {
            ..
        }
        | PugdepError::Other {
            ..
        } => ErrorContext::new(error),
    }
}
