// quick-core/src/uninstall.rs
use std::path::Path;

use quick_common::error::{QuickError, Result};
use quick_common::model::Version;
use quick_io::fs::remove_filesystem_artifact;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::events::LifecycleEvent;
use crate::manager::PackageManager;

/// What a removal deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalSummary {
    pub name: String,
    pub version: Version,
    pub file_count: usize,
    pub size_bytes: u64,
    pub artifacts_removed: usize,
}

impl PackageManager {
    /// Detaches links and the desktop entry, deletes the install tree and
    /// forgets the package.
    pub fn remove(&mut self, name: &str) -> Result<RemovalSummary> {
        let record = self
            .ledger
            .get(name)
            .cloned()
            .ok_or_else(|| QuickError::NotInstalled(name.to_string()))?;

        self.emit(LifecycleEvent::RemoveStarted {
            name: name.to_string(),
        });
        let (file_count, size_bytes) = count_files_and_size(&record.install_dir);
        let artifacts_removed = self.materializer.detach(name, &record.install_dir)?;
        if !remove_filesystem_artifact(&record.install_dir)? {
            debug!("Install directory {} was already gone", record.install_dir.display());
        }
        self.ledger.remove(name)?;

        self.emit(LifecycleEvent::RemoveFinished {
            name: name.to_string(),
            file_count,
            size_bytes,
        });
        Ok(RemovalSummary {
            name: record.name,
            version: record.version,
            file_count,
            size_bytes,
            artifacts_removed,
        })
    }

    /// Removes every installed package. Failures are collected and do not
    /// stop the remaining removals.
    pub fn remove_all(&mut self) -> Vec<(String, Result<RemovalSummary>)> {
        let names: Vec<String> = self.ledger.all().into_iter().map(|r| r.name).collect();
        names
            .into_iter()
            .map(|name| {
                let result = self.remove(&name);
                if let Err(e) = &result {
                    error!("Failed to remove {}: {}", name, e);
                }
                (name, result)
            })
            .collect()
    }
}

fn count_files_and_size(path: &Path) -> (usize, u64) {
    let mut file_count = 0;
    let mut total_size = 0;
    for entry in WalkDir::new(path) {
        match entry {
            Ok(entry) => {
                let file_type = entry.file_type();
                if file_type.is_file() || file_type.is_symlink() {
                    file_count += 1;
                    if file_type.is_file() {
                        match entry.metadata() {
                            Ok(metadata) => total_size += metadata.len(),
                            Err(e) => warn!(
                                "Could not get metadata for {}: {}",
                                entry.path().display(),
                                e
                            ),
                        }
                    }
                }
            }
            Err(e) => debug!("Error traversing {}: {}", path.display(), e),
        }
    }
    (file_count, total_size)
}
