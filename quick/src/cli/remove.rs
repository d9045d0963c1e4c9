// quick/src/cli/remove.rs
use clap::Args;
use colored::Colorize;
use quick_common::error::{QuickError, Result};
use tracing::error;

use super::Context;

#[derive(Args, Debug)]
pub struct Remove {
    /// Packages to remove
    #[arg(required_unless_present = "all")]
    pub names: Vec<String>,

    /// Remove every installed package
    #[arg(long, conflicts_with = "names")]
    pub all: bool,
}

impl Remove {
    pub fn run(&self, ctx: &Context) -> Result<()> {
        let mut manager = ctx.manager()?;

        let failed: Vec<String> = if self.all {
            manager
                .remove_all()
                .into_iter()
                .filter_map(|(name, result)| result.err().map(|_| name))
                .collect()
        } else {
            let mut failed = Vec::new();
            for name in &self.names {
                match manager.remove(name) {
                    Ok(_) => {}
                    Err(QuickError::NotInstalled(_)) => {
                        println!("{}", format!("{name} is not installed.").yellow());
                        failed.push(name.clone());
                    }
                    Err(e) => {
                        error!("✖ Failed to remove '{}': {}", name.cyan(), e);
                        failed.push(name.clone());
                    }
                }
            }
            failed
        };

        if failed.is_empty() {
            Ok(())
        } else {
            Err(QuickError::Generic(format!(
                "Removal failed for {}.",
                failed.join(", ")
            )))
        }
    }
}
