// quick-common/src/model/installed.rs
use std::fmt;
use std::path::PathBuf;

use super::version::Version;

/// A package recorded as installed on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledRecord {
    pub name: String,
    pub version: Version,
    pub install_dir: PathBuf,
}

impl InstalledRecord {
    pub fn new(name: impl Into<String>, version: Version, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version,
            install_dir: install_dir.into(),
        }
    }
}

impl fmt::Display for InstalledRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
