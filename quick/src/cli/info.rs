// quick/src/cli/info.rs
use clap::Args;
use colored::Colorize;
use quick_common::error::{QuickError, Result};
use quick_common::model::{Descriptor, Version};
use quick_core::ManifestStore;
use tracing::{debug, warn};

use super::Context;

#[derive(Args, Debug)]
pub struct Info {
    /// Packages to describe
    #[arg(required = true)]
    pub names: Vec<String>,
}

impl Info {
    pub fn run(&self, ctx: &Context) -> Result<()> {
        let store = ManifestStore::new(&ctx.config);
        let mut missing = Vec::new();

        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                println!();
            }
            if !store.contains(name)? {
                warn!("{} is not in the catalog.", name);
                missing.push(name.as_str());
                continue;
            }
            match store.load_descriptor(name) {
                Ok(descriptor) => print_package(name, &descriptor, None),
                Err(e) => {
                    debug!("Failed to load {}: {}", name, e);
                    warn!("{} has no readable description; try `quick sync`.", name);
                    missing.push(name.as_str());
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(QuickError::UnknownPackage(missing.join(", ")))
        }
    }
}

/// Prints the catalog record of a package; `version` overrides the catalog
/// version, as for an installed package.
pub fn print_package(name: &str, descriptor: &Descriptor, version: Option<&Version>) {
    let version = version.unwrap_or(&descriptor.version);
    println!("{} {}", "Package:".bold(), name.green());
    println!("{} {}", "Name:".bold(), descriptor.name);
    println!("{} {}", "Description:".bold(), descriptor.description);
    println!("{} {}", "Version:".bold(), version);
    println!("{} {}", "Homepage:".bold(), descriptor.homepage);
}
