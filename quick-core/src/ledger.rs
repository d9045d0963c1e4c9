// quick-core/src/ledger.rs
//! Durable record of what is installed.
//!
//! The ledger is a flat text file with one `name version [install_dir]` line
//! per package. The install directory is the remainder of the line, so it may
//! contain spaces; when absent it defaults to `<install_root>/<name>`. The
//! file is read once and rewritten atomically after every mutation.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_common::error::Result;
use quick_common::model::{InstalledRecord, Version};
use quick_io::fs::atomic_write_file;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: BTreeMap<String, InstalledRecord>,
}

impl Ledger {
    /// Loads the ledger at `path`; a missing file is an empty ledger.
    pub fn load(path: impl Into<PathBuf>, install_root: &Path) -> Result<Self> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No ledger at {}, starting empty", path.display());
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = BTreeMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_line(line, install_root) {
                Some(record) => {
                    records.insert(record.name.clone(), record);
                }
                None => warn!(
                    "Skipping malformed ledger line {} in {}: '{}'",
                    lineno + 1,
                    path.display(),
                    line
                ),
            }
        }
        debug!("Loaded {} ledger record(s) from {}", records.len(), path.display());
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&InstalledRecord> {
        self.records.get(name)
    }

    /// Every record, sorted by package name.
    pub fn all(&self) -> Vec<InstalledRecord> {
        self.records.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts or replaces the record for `record.name` and persists.
    pub fn upsert(&mut self, record: InstalledRecord) -> Result<()> {
        debug!("Recording {} {} in ledger", record.name, record.version);
        let previous = self.records.insert(record.name.clone(), record.clone());
        if let Err(e) = self.save() {
            match previous {
                Some(old) => self.records.insert(old.name.clone(), old),
                None => self.records.remove(&record.name),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Drops the record for `name` and persists. Returns the removed record.
    pub fn remove(&mut self, name: &str) -> Result<Option<InstalledRecord>> {
        let Some(removed) = self.records.remove(name) else {
            return Ok(None);
        };
        debug!("Removing {} from ledger", name);
        if let Err(e) = self.save() {
            self.records.insert(removed.name.clone(), removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    fn save(&self) -> Result<()> {
        let mut content = String::new();
        for record in self.records.values() {
            content.push_str(&format!(
                "{} {} {}\n",
                record.name,
                record.version,
                record.install_dir.display()
            ));
        }
        atomic_write_file(&self.path, content.as_bytes())
    }
}

fn parse_line(line: &str, install_root: &Path) -> Option<InstalledRecord> {
    let (name, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let (version, dir) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let version: Version = version.parse().ok()?;
    let dir = match dir.trim() {
        "" => install_root.join(name),
        dir => PathBuf::from(dir),
    };
    Some(InstalledRecord::new(name, version, dir))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::load(tmp.path().join("installed/ledger"), tmp.path()).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.has("foo"));
    }

    #[test]
    fn mutations_persist_and_sort() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("installed/ledger");
        let mut ledger = Ledger::load(&path, tmp.path()).unwrap();
        ledger
            .upsert(InstalledRecord::new("zed", Version::new("1.0"), "/opt/q/lib/zed"))
            .unwrap();
        ledger
            .upsert(InstalledRecord::new("abc", Version::new("0.3"), "/opt/my apps/abc"))
            .unwrap();

        let reloaded = Ledger::load(&path, tmp.path()).unwrap();
        let names: Vec<_> = reloaded.all().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["abc", "zed"]);
        assert_eq!(
            reloaded.get("abc").unwrap().install_dir,
            PathBuf::from("/opt/my apps/abc")
        );

        ledger
            .upsert(InstalledRecord::new("zed", Version::new("2.0"), "/opt/q/lib/zed"))
            .unwrap();
        assert!(ledger.remove("abc").unwrap().is_some());
        assert!(ledger.remove("abc").unwrap().is_none());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "zed 2.0 /opt/q/lib/zed\n"
        );
    }

    #[test]
    fn skips_comments_and_malformed_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ledger");
        fs::write(
            &path,
            "# installed packages\n\nfoo 1.5 /q/lib/foo\nbroken\n",
        )
        .unwrap();
        let ledger = Ledger::load(&path, Path::new("/q/lib")).unwrap();
        assert_eq!(ledger.all().len(), 1);
        assert_eq!(ledger.get("foo").unwrap().version.as_str(), "1.5");
    }

    #[test]
    fn missing_install_dir_defaults_under_install_root() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ledger");
        fs::write(&path, "bar 2.0\nbaz 0.1   \n").unwrap();
        let ledger = Ledger::load(&path, Path::new("/q/lib")).unwrap();
        assert_eq!(ledger.all().len(), 2);
        assert_eq!(
            ledger.get("bar").unwrap().install_dir,
            PathBuf::from("/q/lib/bar")
        );
        assert_eq!(ledger.get("baz").unwrap().version.as_str(), "0.1");
    }
}
