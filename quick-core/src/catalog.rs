// quick-core/src/catalog.rs
//! Local copy of the remote package catalog.
//!
//! The catalog is an index file listing descriptor filenames plus one YAML
//! descriptor per package. A package name is the filename up to its first `.`.

use std::fs;
use std::io;

use quick_common::config::{Config, INDEX_FILENAME};
use quick_common::error::{QuickError, Result};
use quick_common::model::Descriptor;
use quick_io::fs::{atomic_write_file, create_dir_all, empty_directory};
use quick_net::Transport;
use regex::RegexBuilder;
use tracing::{debug, warn};

/// Outcome of a catalog synchronization.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub fetched: Vec<String>,
    pub failed: Vec<(String, QuickError)>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ManifestStore {
    config: Config,
}

/// Package name for an index entry such as `firefox.yaml`.
pub fn package_name(filename: &str) -> &str {
    filename.split('.').next().unwrap_or(filename)
}

impl ManifestStore {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn is_synced(&self) -> bool {
        self.config.index_path().is_file()
    }

    /// Descriptor filenames listed in the local index, in order.
    pub fn load_index(&self) -> Result<Vec<String>> {
        let text = match fs::read_to_string(self.config.index_path()) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(QuickError::NotSynced),
            Err(e) => return Err(e.into()),
        };
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn package_names(&self) -> Result<Vec<String>> {
        Ok(self
            .load_index()?
            .iter()
            .map(|f| package_name(f).to_string())
            .collect())
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self
            .load_index()?
            .iter()
            .any(|f| package_name(f) == name))
    }

    pub fn load_descriptor(&self, name: &str) -> Result<Descriptor> {
        let path = self.config.descriptor_path(name);
        Descriptor::from_path(&path).map_err(|e| {
            debug!("Could not load descriptor {}: {}", path.display(), e);
            QuickError::UnknownPackage(name.to_string())
        })
    }

    /// Fetches the remote index and every descriptor it lists.
    ///
    /// Failing to fetch the index fails the sync. A descriptor that cannot be
    /// fetched is recorded in the report and the rest still proceed.
    /// `progress` is called before each descriptor with `(position, total, filename)`.
    pub fn sync(
        &self,
        transport: &dyn Transport,
        progress: &mut dyn FnMut(usize, usize, &str),
    ) -> Result<SyncReport> {
        create_dir_all(&self.config.catalog_dir)?;
        let index_url = self.config.remote_file_url(INDEX_FILENAME);
        debug!("Fetching catalog index {}", index_url);
        let index = transport.fetch(&index_url)?;
        atomic_write_file(&self.config.index_path(), &index)?;

        let entries = self.load_index()?;
        let total = entries.len();
        let mut report = SyncReport::default();
        for (i, filename) in entries.into_iter().enumerate() {
            progress(i + 1, total, &filename);
            match self.fetch_descriptor(transport, &filename) {
                Ok(()) => report.fetched.push(filename),
                Err(e) => {
                    warn!("Failed to fetch descriptor {}: {}", filename, e);
                    report.failed.push((filename, e));
                }
            }
        }
        debug!(
            "Catalog sync finished: {} fetched, {} failed",
            report.fetched.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn fetch_descriptor(&self, transport: &dyn Transport, filename: &str) -> Result<()> {
        if filename.contains('/') || filename.starts_with('.') {
            return Err(QuickError::Validation(format!(
                "refusing catalog entry '{filename}'"
            )));
        }
        let url = self.config.remote_file_url(filename);
        let body = transport.fetch(&url)?;
        atomic_write_file(&self.config.catalog_dir.join(filename), &body)
    }

    /// Names of packages whose index filename, `Name` or `Description`
    /// matches `pattern` case-insensitively, in index order.
    pub fn search(&self, pattern: &str) -> Result<Vec<String>> {
        let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        let mut matches: Vec<String> = Vec::new();
        for filename in self.load_index()? {
            let name = package_name(&filename).to_string();
            if matches.contains(&name) {
                continue;
            }
            if re.is_match(&filename) {
                matches.push(name);
                continue;
            }
            match Descriptor::from_path(&self.config.catalog_dir.join(&filename)) {
                Ok(d) if re.is_match(&d.name) || re.is_match(&d.description) => matches.push(name),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable descriptor {}: {}", filename, e),
            }
        }
        Ok(matches)
    }

    /// Drops every cached descriptor and the index.
    pub fn clean(&self) -> Result<()> {
        empty_directory(&self.config.catalog_dir)
    }
}
