// quick-core/src/install.rs
use quick_common::error::{QuickError, Result};
use quick_common::model::version::installable;
use quick_common::model::{Descriptor, InstalledRecord, Version};
use tracing::debug;

use crate::events::LifecycleEvent;
use crate::manager::PackageManager;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Reinstall even when the installed version is current.
    pub force: bool,
    /// Accept archives without checking their published hash.
    pub skip_verify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallAction {
    Install,
    Upgrade,
    AlreadyLatest { installed: Version },
}

/// The decision for one package, taken before any download happens.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub name: String,
    pub descriptor: Descriptor,
    pub action: InstallAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyLatest { version: Version },
    Installed { version: Version, upgraded: bool },
}

impl PackageManager {
    /// Resolves `name` against the catalog and the ledger.
    pub fn plan_install(&self, name: &str, force: bool) -> Result<InstallPlan> {
        if !self.catalog.contains(name)? {
            return Err(QuickError::UnknownPackage(name.to_string()));
        }
        let descriptor = self.catalog.load_descriptor(name)?;
        let action = match self.ledger.get(name) {
            Some(record)
                if !force
                    && !installable(record.version.as_str(), descriptor.version.as_str()) =>
            {
                InstallAction::AlreadyLatest {
                    installed: record.version.clone(),
                }
            }
            _ => InstallAction::Install,
        };
        debug!("Planned {:?} for {}", action, name);
        Ok(InstallPlan {
            name: name.to_string(),
            descriptor,
            action,
        })
    }

    /// Installs `name` unless the installed version is already current.
    pub fn install(&mut self, name: &str, options: InstallOptions) -> Result<InstallOutcome> {
        let plan = self.plan_install(name, options.force)?;
        self.execute(plan, options.skip_verify)
    }

    /// Carries out a plan: fetch and unpack every download for this host,
    /// link the results, then record the package in the ledger.
    pub fn execute(&mut self, plan: InstallPlan, skip_verify: bool) -> Result<InstallOutcome> {
        let InstallPlan {
            name,
            descriptor,
            action,
        } = plan;
        let upgrade = match action {
            InstallAction::AlreadyLatest { installed } => {
                self.emit(LifecycleEvent::AlreadyLatest {
                    name,
                    version: installed.clone(),
                });
                return Ok(InstallOutcome::AlreadyLatest { version: installed });
            }
            InstallAction::Install => false,
            InstallAction::Upgrade => true,
        };

        self.emit(LifecycleEvent::InstallStarted {
            name: name.clone(),
            version: descriptor.version.clone(),
            upgrade,
        });

        let install_dir = self.config.package_install_dir(&name);
        let arch = self.config.arch.clone();
        let downloads: Vec<_> = descriptor.downloads_for(&arch).cloned().collect();
        if downloads.is_empty() {
            return Err(QuickError::InstallFailed {
                name,
                reason: format!("no download for {arch}"),
            });
        }

        let mut failures: Vec<QuickError> = Vec::new();
        let mut subfolder: Option<String> = None;
        for download in &downloads {
            self.emit(LifecycleEvent::DownloadStarted {
                name: name.clone(),
                url: download.url.clone(),
            });
            let attempt = self
                .fetcher
                .ensure_local(
                    self.transport.as_ref(),
                    &download.url,
                    download.hash.as_deref(),
                    skip_verify,
                )
                .and_then(|archive| {
                    self.emit(LifecycleEvent::Extracting {
                        name: name.clone(),
                        archive: archive.clone(),
                        target: install_dir.clone(),
                    });
                    self.extractor.extract(&archive, &install_dir)
                });
            match attempt {
                Ok(()) => subfolder = Some(download.folder.clone()),
                Err(e) => {
                    debug!("Download {} for {} failed: {}", download.url, name, e);
                    self.emit(LifecycleEvent::DownloadFailed {
                        name: name.clone(),
                        url: download.url.clone(),
                        error: e.to_string(),
                    });
                    failures.push(e);
                }
            }
        }

        let Some(subfolder) = subfolder else {
            debug!("No download of {} could be installed", name);
            return Err(match failures.len() {
                1 => failures.remove(0),
                _ => QuickError::InstallFailed {
                    reason: failures
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                    name,
                },
            });
        };

        let materialized = self
            .materializer
            .apply(&name, &descriptor, &install_dir, &subfolder)?;
        for (link, source) in materialized.links {
            self.emit(LifecycleEvent::LinkCreated { link, source });
        }
        if let Some(path) = materialized.desktop_entry {
            self.emit(LifecycleEvent::DesktopEntryWritten { path });
        }

        self.ledger.upsert(InstalledRecord::new(
            name.clone(),
            descriptor.version.clone(),
            install_dir,
        ))?;
        self.emit(LifecycleEvent::InstallFinished { name, upgrade });
        Ok(InstallOutcome::Installed {
            version: descriptor.version,
            upgraded: upgrade,
        })
    }
}
