// quick/src/cli/upgrade.rs
use clap::Args;
use colored::Colorize;
use quick_common::error::{QuickError, Result};
use quick_core::UpgradeStatus;
use tracing::error;

use super::Context;

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Do not check archive hashes
    #[arg(long = "skip-verify", visible_alias = "skip")]
    skip_verify: bool,
}

impl UpgradeArgs {
    pub fn run(&self, ctx: &Context) -> Result<()> {
        let mut manager = ctx.manager()?;
        let report = manager.upgrade(self.skip_verify)?;

        for (name, status) in &report.packages {
            match status {
                UpgradeStatus::Failed { from, error } => {
                    error!("✖ Failed to upgrade '{}' from {}: {}", name.cyan(), from, error)
                }
                UpgradeStatus::UpToDate { version } if ctx.verbose > 0 => {
                    println!("{name} {version} is the latest version.")
                }
                _ => {}
            }
        }

        let upgraded = report.upgraded().count();
        if !ctx.quiet {
            if upgraded == 0 && !report.has_failures() {
                println!("{}", "All installed packages are up to date.".green());
            } else if upgraded > 0 {
                println!("{}", format!("{upgraded} package(s) upgraded.").bold());
            }
        }

        if report.has_failures() {
            let names: Vec<&str> = report.failures().map(|(name, _)| name).collect();
            return Err(QuickError::Generic(format!(
                "Upgrade failed for {}.",
                names.join(", ")
            )));
        }
        Ok(())
    }
}
