// quick-core/src/lib.rs
//! Package lifecycle for quick: catalog, ledger, fetching, materialization
//! and the install/upgrade/remove orchestration built on top of them.

pub mod catalog;
pub mod events;
pub mod fetch;
pub mod install;
pub mod ledger;
pub mod manager;
pub mod materialize;
pub mod uninstall;
pub mod upgrade;

pub use catalog::{ManifestStore, SyncReport};
pub use events::LifecycleEvent;
pub use fetch::ArtifactFetcher;
pub use install::{InstallAction, InstallOptions, InstallOutcome, InstallPlan};
pub use ledger::Ledger;
pub use manager::PackageManager;
pub use materialize::{Materialized, Materializer};
pub use uninstall::RemovalSummary;
pub use upgrade::{UpgradeReport, UpgradeStatus};
