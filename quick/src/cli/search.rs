// quick/src/cli/search.rs
use clap::Args;
use colored::Colorize;
use quick_common::error::Result;
use quick_core::ManifestStore;
use tracing::{debug, warn};

use super::info::print_package;
use super::Context;

#[derive(Args, Debug)]
pub struct Search {
    /// Case-insensitive regular expression matched against names and descriptions
    pub pattern: String,
}

impl Search {
    pub fn run(&self, ctx: &Context) -> Result<()> {
        debug!("Searching for packages matching: {}", self.pattern);
        let store = ManifestStore::new(&ctx.config);
        let matches = store.search(&self.pattern)?;

        if matches.is_empty() {
            println!("{}", format!("No matches found for '{}'", self.pattern).yellow());
            return Ok(());
        }
        if !ctx.quiet {
            println!(
                "{}",
                format!("Found {} result(s) for '{}'", matches.len(), self.pattern).bold()
            );
            println!();
        }
        for name in matches {
            match store.load_descriptor(&name) {
                Ok(descriptor) => {
                    print_package(&name, &descriptor, None);
                    println!();
                }
                Err(e) => warn!("Skipping {}: {}", name, e),
            }
        }
        Ok(())
    }
}
