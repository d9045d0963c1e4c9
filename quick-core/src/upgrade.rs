// quick-core/src/upgrade.rs
use quick_common::error::{QuickError, Result};
use quick_common::model::version::installable;
use quick_common::model::Version;
use tracing::{debug, warn};

use crate::install::{InstallAction, InstallPlan};
use crate::manager::PackageManager;

#[derive(Debug, Clone)]
pub enum UpgradeStatus {
    Upgraded { from: Version, to: Version },
    UpToDate { version: Version },
    /// The package has no descriptor in the local catalog.
    NotInCatalog,
    Failed { from: Version, error: QuickError },
}

/// Per-package results of `PackageManager::upgrade`, sorted by name.
#[derive(Debug, Default)]
pub struct UpgradeReport {
    pub packages: Vec<(String, UpgradeStatus)>,
}

impl UpgradeReport {
    pub fn upgraded(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().filter_map(|(name, status)| {
            matches!(status, UpgradeStatus::Upgraded { .. }).then_some(name.as_str())
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &QuickError)> {
        self.packages.iter().filter_map(|(name, status)| match status {
            UpgradeStatus::Failed { error, .. } => Some((name.as_str(), error)),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

impl PackageManager {
    /// Replaces every installed package for which the catalog carries a
    /// newer version. One failing package does not stop the others.
    pub fn upgrade(&mut self, skip_verify: bool) -> Result<UpgradeReport> {
        if !self.catalog.is_synced() {
            return Err(QuickError::NotSynced);
        }

        let mut report = UpgradeReport::default();
        for record in self.ledger.all() {
            let descriptor = match self.catalog.load_descriptor(&record.name) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Skipping upgrade of {}: {}", record.name, e);
                    report.packages.push((record.name, UpgradeStatus::NotInCatalog));
                    continue;
                }
            };
            if !installable(record.version.as_str(), descriptor.version.as_str()) {
                debug!("{} {} is up to date", record.name, record.version);
                report.packages.push((
                    record.name,
                    UpgradeStatus::UpToDate {
                        version: record.version,
                    },
                ));
                continue;
            }

            let to = descriptor.version.clone();
            let plan = InstallPlan {
                name: record.name.clone(),
                descriptor,
                action: InstallAction::Upgrade,
            };
            let status = match self
                .remove(&record.name)
                .and_then(|_| self.execute(plan, skip_verify))
            {
                Ok(_) => UpgradeStatus::Upgraded {
                    from: record.version,
                    to,
                },
                Err(error) => UpgradeStatus::Failed {
                    from: record.version,
                    error,
                },
            };
            report.packages.push((record.name, status));
        }
        Ok(report)
    }
}
