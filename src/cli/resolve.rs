//! Resolve an entry template.
//!
//! # Examples
//!
//! ```bash
//! pugdep resolve views/index.pug
//! pugdep resolve views/index.pug --format json
//! pugdep resolve views/index.pug --format module --output dist/index.js
//! ```

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::common::ResolverArgs;
use crate::templating::{ResolvedArtifact, emit_module};
use crate::utils::fs::atomic_write;

/// Resolve an entry template and print or write the result
#[derive(Args, Debug)]
pub struct ResolveCommand {
    #[command(flatten)]
    resolver: ResolverArgs,

    /// Output format (text, json, module)
    ///
    /// - `text`: the rendered document
    /// - `json`: `{ "content": ..., "deps": { template: [asset, ...] } }`
    /// - `module`: a CommonJS module for bundler loaders
    #[arg(short = 'f', long, default_value = "text")]
    format: String,

    /// Write to this file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl ResolveCommand {
    /// Execute the command
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        self.validate_arguments()?;

        let mut resolver = self.resolver.build_resolver(config_path).await?;
        let artifact = resolver
            .resolve(&self.resolver.entry)
            .with_context(|| format!("Failed to resolve {}", self.resolver.entry.display()))?;

        let rendered = self.render(&artifact)?;
        match &self.output {
            Some(path) => {
                atomic_write(path, rendered.as_bytes())?;
                tracing::info!(
                    "Wrote {} ({} templates, {} assets)",
                    path.display(),
                    artifact.deps.len(),
                    artifact.all_dependencies().len()
                );
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }

    fn validate_arguments(&self) -> Result<()> {
        match self.format.as_str() {
            "text" | "json" | "module" => Ok(()),
            other => Err(anyhow::anyhow!(
                "Invalid format '{other}'. Valid formats are: text, json, module"
            )),
        }
    }

    fn render(&self, artifact: &ResolvedArtifact) -> Result<String> {
        Ok(match self.format.as_str() {
            "json" => serde_json::to_string_pretty(artifact)
                .context("Failed to serialize resolved artifact")?,
            "module" => emit_module(artifact),
            _ => artifact.content.clone(),
        })
    }
}
