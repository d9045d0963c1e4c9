// quick/src/cli/install.rs
use clap::Args;
use colored::Colorize;
use quick_common::error::{QuickError, Result};
use quick_core::InstallOptions;
use tracing::{error, instrument};

use super::Context;

#[derive(Debug, Args)]
pub struct InstallArgs {
    #[arg(required = true)]
    names: Vec<String>,

    /// Reinstall even if the installed version is the latest
    #[arg(short, long)]
    force: bool,

    /// Do not check archive hashes
    #[arg(long = "skip-verify", visible_alias = "skip")]
    skip_verify: bool,
}

impl InstallArgs {
    #[instrument(skip(self, ctx), fields(targets = ?self.names))]
    pub fn run(&self, ctx: &Context) -> Result<()> {
        let mut manager = ctx.manager()?;
        let options = InstallOptions {
            force: self.force,
            skip_verify: self.skip_verify,
        };

        let mut failed = Vec::new();
        for name in &self.names {
            if let Err(e) = manager.install(name, options) {
                if matches!(e, QuickError::NotSynced) {
                    return Err(e);
                }
                error!("✖ Failed to install '{}': {}", name.cyan(), e);
                failed.push(name.as_str());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(QuickError::Generic(format!(
                "Install failed for {}.",
                failed.join(", ")
            )))
        }
    }
}
