//! pugdep CLI entry point
//!
//! Parses arguments, runs the command, and prints a user-friendly report on
//! failure.
//!
//! - `resolve` - Resolve an entry template to text, JSON, or a CommonJS module
//! - `deps` - Print the asset dependencies of an entry template
//! - `watch` - Re-resolve whenever a template in the chain changes

use anyhow::Result;
use clap::Parser;
use pugdep::cli;
use pugdep::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
