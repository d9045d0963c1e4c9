// quick/src/cli/sync.rs
//! Contains the logic for the `sync` command.
use clap::Args;
use colored::Colorize;
use quick_common::error::{QuickError, Result};
use tracing::debug;

use super::Context;

#[derive(Args, Debug)]
pub struct SyncArgs;

impl SyncArgs {
    pub fn run(&self, ctx: &Context) -> Result<()> {
        debug!("Synchronizing catalog from {}", ctx.config.remote_url);
        if !ctx.quiet {
            println!("Updating package lists from {}", ctx.config.remote_url);
        }

        let mut manager = ctx.manager()?;
        let report = manager.sync()?;

        if report.is_complete() {
            if !ctx.quiet {
                println!(
                    "{}",
                    format!("{} package descriptions fetched.", report.fetched.len()).green()
                );
            }
            return Ok(());
        }

        let names: Vec<&str> = report.failed.iter().map(|(f, _)| f.as_str()).collect();
        eprintln!(
            "{} {}",
            format!(
                "{} of {} package descriptions could not be fetched:",
                report.failed.len(),
                report.failed.len() + report.fetched.len()
            )
            .yellow(),
            names.join(", ").cyan()
        );
        Err(QuickError::Generic(
            "Catalog sync finished with errors.".to_string(),
        ))
    }
}
