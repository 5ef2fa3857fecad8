//! Test utilities for pugdep
//!
//! Helpers shared by unit and integration tests:
//! - [`MemoryFileSystem`]: an in-memory [`FileSystem`](crate::templating::FileSystem)
//!   whose modification times are set explicitly
//! - [`TemplateFixture`]: writes template trees into a temporary directory
//! - [`init_test_logging`]: one-time tracing setup
//!
//! # Example
//!
//! ```rust,ignore
//! use pugdep::test_utils::TemplateFixture;
//!
//! let fixture = TemplateFixture::new().unwrap();
//! fixture.write("layout.pug", "html\n  block content").unwrap();
//! fixture.write("page.pug", "extends layout\nblock content\n  p hi").unwrap();
//! let mut resolver = fixture.resolver().unwrap();
//! let artifact = resolver.resolve(&fixture.path("page.pug")).unwrap();
//! assert_eq!(artifact.content, "html\n  p hi");
//! ```

pub mod fixtures;
pub mod memory;

pub use fixtures::TemplateFixture;
pub use memory::MemoryFileSystem;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set that level is used;
/// otherwise logging is enabled only when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=pugdep=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
