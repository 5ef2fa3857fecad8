//! Core types for pugdep
//!
//! This module holds the error type shared by every resolution stage and the
//! helpers that turn those errors into actionable terminal output.
//!
//! ```rust
//! use pugdep::core::{PugdepError, Result};
//!
//! fn lookup(found: bool) -> Result<()> {
//!     if found {
//!         Ok(())
//!     } else {
//!         Err(PugdepError::FileNotFound {
//!             path: "/views/layout.pug".into(),
//!         })
//!     }
//! }
//!
//! assert!(lookup(false).is_err());
//! ```

pub mod error;

pub use error::{ErrorContext, PugdepError, Result, user_friendly_error};
