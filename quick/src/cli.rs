// quick/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser, Subcommand};
use quick_common::config::Config;
use quick_common::error::Result;
use quick_core::PackageManager;

pub mod clean;
pub mod info;
pub mod install;
pub mod installed;
pub mod list;
pub mod remove;
pub mod search;
pub mod status;
pub mod sync;
pub mod upgrade;

use crate::cli::clean::Clean;
use crate::cli::info::Info;
use crate::cli::install::InstallArgs;
use crate::cli::installed::Installed;
use crate::cli::list::List;
use crate::cli::remove::Remove;
use crate::cli::search::Search;
use crate::cli::sync::SyncArgs;
use crate::cli::upgrade::UpgradeArgs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "quick", bin_name = "quick")]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Print more detail; repeat for debug logs
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resynchronize the package index from the remote catalog
    #[command(alias = "update")]
    Sync(SyncArgs),
    /// Print every package in the catalog
    List(List),
    /// Find packages by regular expression
    Search(Search),
    /// Show package details
    Info(Info),
    /// Install or update packages
    Install(InstallArgs),
    /// Print installed packages
    Installed(Installed),
    /// Remove installed packages
    Remove(Remove),
    /// Upgrade every installed package with a newer catalog version
    Upgrade(UpgradeArgs),
    /// Empty the package index and the downloaded archives
    Clean(Clean),
}

/// Settings shared by every command.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub verbose: u8,
    pub quiet: bool,
}

impl Context {
    /// Package manager reporting progress on stdout.
    pub fn manager(&self) -> Result<PackageManager> {
        Ok(PackageManager::from_config(self.config.clone())?
            .with_progress(!self.quiet)
            .with_event_handler(status::printer(self.verbose, self.quiet)))
    }
}

impl Command {
    pub fn run(&self, ctx: &Context) -> Result<()> {
        match self {
            Self::Sync(command) => command.run(ctx),
            Self::List(command) => command.run(ctx),
            Self::Search(command) => command.run(ctx),
            Self::Info(command) => command.run(ctx),
            Self::Install(command) => command.run(ctx),
            Self::Installed(command) => command.run(ctx),
            Self::Remove(command) => command.run(ctx),
            Self::Upgrade(command) => command.run(ctx),
            Self::Clean(command) => command.run(ctx),
        }
    }
}
