//! Print the asset dependencies of an entry template.
//!
//! Default output groups assets under the template that references them:
//!
//! ```text
//! /site/views/index.pug
//!   /site/views/img/hero.jpg
//! /site/views/layout.pug
//!   /site/views/img/logo.png
//! /site/views/partials/nav.pug (no assets)
//! ```
//!
//! `--flat` prints each asset once, one per line, for piping into other tools.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;

use super::common::ResolverArgs;
use crate::templating::DependencyMap;

/// Print the dependency map of an entry template
#[derive(Args, Debug)]
pub struct DepsCommand {
    #[command(flatten)]
    resolver: ResolverArgs,

    /// Print each asset once instead of grouping by template
    #[arg(long)]
    flat: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl DepsCommand {
    /// Execute the command
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let mut resolver = self.resolver.build_resolver(config_path).await?;
        let artifact = resolver
            .resolve(&self.resolver.entry)
            .with_context(|| format!("Failed to resolve {}", self.resolver.entry.display()))?;

        let output = if self.json {
            if self.flat {
                serde_json::to_string_pretty(&artifact.all_dependencies())?
            } else {
                serde_json::to_string_pretty(&artifact.deps)?
            }
        } else if self.flat {
            format_flat(&artifact.deps)
        } else {
            format_grouped(&artifact.deps)
        };

        if !output.is_empty() {
            println!("{output}");
        }
        Ok(())
    }
}

fn format_flat(deps: &DependencyMap) -> String {
    deps.flatten().iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join("\n")
}

fn format_grouped(deps: &DependencyMap) -> String {
    let mut out = String::new();
    for (template, assets) in deps.iter() {
        if assets.is_empty() {
            let _ = writeln!(out, "{} {}", template.display().to_string().bold(), "(no assets)".dimmed());
            continue;
        }
        let _ = writeln!(out, "{}", template.display().to_string().bold());
        for asset in assets {
            let _ = writeln!(out, "  {}", asset.display());
        }
    }
    out.trim_end().to_string()
}
