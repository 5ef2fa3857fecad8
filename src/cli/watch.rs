//! Re-resolve an entry template when any template it uses changes.
//!
//! The resolver and its record store live for the whole session, so each
//! re-resolution only reloads the templates whose modification time changed.
//! Errors are reported and watching continues; stop with Ctrl-C.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use super::common::ResolverArgs;
use crate::core::user_friendly_error;
use crate::templating::Resolver;
use crate::utils::fs::atomic_write;

/// Lower bound for `--interval-ms`
const MIN_INTERVAL_MS: u64 = 50;

/// Watch an entry template and re-resolve on change
#[derive(Args, Debug)]
pub struct WatchCommand {
    #[command(flatten)]
    resolver: ResolverArgs,

    /// Polling interval in milliseconds
    #[arg(long, default_value_t = 500, value_name = "MS")]
    interval_ms: u64,

    /// Write each result to this file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// What the last resolution left to watch
#[derive(Debug, Default)]
struct WatchState {
    /// Templates visited by the last successful resolution
    templates: Vec<PathBuf>,
    /// Message of the last failure, to avoid repeating it every tick
    last_error: Option<String>,
}

impl WatchCommand {
    /// Execute the command
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let mut resolver = self.resolver.build_resolver(config_path).await?;
        let mut state = WatchState::default();
        self.run_once(&mut resolver, &mut state)?;

        let interval = Duration::from_millis(self.interval_ms.max(MIN_INTERVAL_MS));
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        tracing::info!("Watching {} (Ctrl-C to stop)", self.resolver.entry.display());
        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Stopped watching");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    if self.needs_rerun(&resolver, &state) {
                        self.run_once(&mut resolver, &mut state)?;
                    }
                }
            }
        }
    }

    fn needs_rerun(&self, resolver: &Resolver, state: &WatchState) -> bool {
        if state.last_error.is_some() {
            return true;
        }
        state.templates.iter().any(|template| resolver.store().is_stale(template))
    }

    /// Resolve once and emit the result; resolution errors are reported, not returned.
    fn run_once(&self, resolver: &mut Resolver, state: &mut WatchState) -> Result<()> {
        match resolver.resolve(&self.resolver.entry) {
            Ok(artifact) => {
                match &self.output {
                    Some(path) => {
                        atomic_write(path, artifact.content.as_bytes())
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        tracing::info!("Updated {}", path.display());
                    }
                    None => println!("{}", artifact.content),
                }
                state.templates = artifact.deps.templates().map(PathBuf::from).collect();
                state.last_error = None;
            }
            Err(error) => {
                let message = error.to_string();
                if state.last_error.as_deref() != Some(message.as_str()) {
                    user_friendly_error(anyhow::Error::from(error)).display();
                }
                state.last_error = Some(message);
            }
        }
        Ok(())
    }
}
