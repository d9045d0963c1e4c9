// quick-common/src/model/descriptor.rs
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::version::Version;
use crate::error::{QuickError, Result};

/// Architecture marker for downloads usable on any host.
pub const ARCH_ALL: &str = "all";

/// One archive a package can be installed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DownloadField")]
pub struct Download {
    pub url: String,
    pub arch: String,
    pub hash: Option<String>,
    pub folder: String,
}

impl Download {
    pub fn matches_arch(&self, host_arch: &str) -> bool {
        self.arch == ARCH_ALL || self.arch == host_arch
    }

    /// Remote basename, used as the cache file name.
    pub fn filename(&self) -> &str {
        archive_filename(&self.url)
    }
}

/// Last path segment of a URL, ignoring any query string.
pub fn archive_filename(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// A download entry as written in the catalog: either the compact
/// `"<url> <arch> <hash> [folder...]"` line or a mapping.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DownloadField {
    Line(String),
    Detailed {
        url: String,
        #[serde(default = "default_arch", alias = "Arch")]
        arch: String,
        #[serde(default, alias = "Hash", alias = "sha1")]
        hash: Option<String>,
        #[serde(default, alias = "Folder")]
        folder: Option<String>,
    },
}

fn default_arch() -> String {
    ARCH_ALL.to_string()
}

fn normalize_hash(hash: Option<String>) -> Option<String> {
    hash.map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty() && h != "-")
}

impl TryFrom<DownloadField> for Download {
    type Error = QuickError;

    fn try_from(field: DownloadField) -> Result<Self> {
        match field {
            DownloadField::Line(line) => parse_download_line(&line),
            DownloadField::Detailed {
                url,
                arch,
                hash,
                folder,
            } => Ok(Download {
                url,
                arch,
                hash: normalize_hash(hash),
                folder: folder.unwrap_or_default(),
            }),
        }
    }
}

/// Parses `"<url> <arch> <hash> [folder...]"`; the folder is the rest of the
/// line and may contain spaces.
pub fn parse_download_line(line: &str) -> Result<Download> {
    let mut fields = line.split(' ').filter(|f| !f.is_empty());
    let (Some(url), Some(arch)) = (fields.next(), fields.next()) else {
        return Err(QuickError::Parse(
            "download",
            format!("expected '<url> <arch> <hash> [folder]', got '{line}'"),
        ));
    };
    let hash = fields.next().map(str::to_string);
    let folder = fields.collect::<Vec<_>>().join(" ");
    Ok(Download {
        url: url.to_string(),
        arch: arch.to_string(),
        hash: normalize_hash(hash),
        folder,
    })
}

/// Launcher description for a `.desktop` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DesktopEntry {
    #[serde(default)]
    pub exec: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A catalog record describing one installable package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Descriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: Version,
    #[serde(default)]
    pub homepage: String,
    #[serde(default, alias = "Download")]
    pub downloads: Vec<Download>,
    #[serde(default, alias = "Symlink")]
    pub symlinks: Vec<String>,
    #[serde(default, rename = "DesktopFile")]
    pub desktop_entry: Option<DesktopEntry>,
}

impl Descriptor {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Downloads usable on `host_arch`, in catalog order.
    pub fn downloads_for<'a>(&'a self, host_arch: &'a str) -> impl Iterator<Item = &'a Download> {
        self.downloads.iter().filter(move |d| d.matches_arch(host_arch))
    }
}
