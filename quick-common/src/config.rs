// quick-common/src/config.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{QuickError, Result};

const DEFAULT_REMOTE: &str = "https://raw.github.com/fourdollars/quick/master/packages/";
pub const INDEX_FILENAME: &str = ".index";
const LEDGER_FILENAME: &str = "ledger";
pub const DESCRIPTOR_EXTENSION: &str = "yaml";

/// How archives get unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorKind {
    /// In-process extraction with the tar/zip crates.
    #[default]
    Native,
    /// Shell out to `tar` and `unzip`.
    Tools,
}

/// Every path the package manager touches, resolved once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub root_dir: PathBuf,
    pub catalog_dir: PathBuf,
    pub binaries_dir: PathBuf,
    pub installed_dir: PathBuf,
    pub ledger_path: PathBuf,
    pub install_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub desktop_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub remote_url: String,
    pub arch: String,
    pub extractor: ExtractorKind,
}

impl Config {
    /// Builds the configuration from the environment.
    ///
    /// `QUICK_ROOT` puts the whole tree under a single directory; otherwise the
    /// per-user `~/.local` layout is used.
    pub fn load() -> Result<Self> {
        debug!("Loading quick configuration");

        let mut config = match env::var("QUICK_ROOT").ok().filter(|s| !s.is_empty()) {
            Some(root) => {
                debug!("QUICK_ROOT set, using single-root layout at {}", root);
                Self::with_root(root)
            }
            None => {
                let home = dirs::home_dir().ok_or_else(|| {
                    QuickError::Config("Could not determine the home directory".to_string())
                })?;
                Self::for_home(&home)
            }
        };

        if let Some(remote) = env::var("QUICK_REMOTE").ok().filter(|s| !s.is_empty()) {
            config.remote_url = remote;
        }
        if let Some(arch) = env::var("QUICK_ARCH").ok().filter(|s| !s.is_empty()) {
            config.arch = normalize_arch(&arch);
        }
        if let Ok(kind) = env::var("QUICK_EXTRACTOR") {
            config.extractor = match kind.as_str() {
                "" | "native" => ExtractorKind::Native,
                "tools" => ExtractorKind::Tools,
                other => {
                    return Err(QuickError::Config(format!(
                        "QUICK_EXTRACTOR must be 'native' or 'tools', got '{other}'"
                    )))
                }
            };
        }

        debug!("Effective root: {}", config.root_dir.display());
        debug!("Host architecture: {}", config.arch);
        Ok(config)
    }

    /// Lays every managed directory out under `root`.
    ///
    /// A relative root is resolved against the working directory so that
    /// links written into `bin/` point at absolute install paths.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        let installed_dir = root.join("installed");
        Self {
            catalog_dir: root.join("packages"),
            binaries_dir: root.join("binaries"),
            ledger_path: installed_dir.join(LEDGER_FILENAME),
            installed_dir,
            install_dir: root.join("lib"),
            bin_dir: root.join("bin"),
            desktop_dir: root.join("applications"),
            logs_dir: root.join("logs"),
            remote_url: DEFAULT_REMOTE.to_string(),
            arch: host_arch(),
            extractor: ExtractorKind::default(),
            root_dir: root,
        }
    }

    fn for_home(home: &Path) -> Self {
        let base = home.join(".local");
        let data = base.join("share").join("quick");
        let installed_dir = data.join("installed");
        Self {
            catalog_dir: data.join("packages"),
            binaries_dir: data.join("binaries"),
            ledger_path: installed_dir.join(LEDGER_FILENAME),
            installed_dir,
            install_dir: base.join("lib").join("quick"),
            bin_dir: base.join("bin"),
            desktop_dir: base.join("share").join("applications"),
            logs_dir: data.join("logs"),
            remote_url: DEFAULT_REMOTE.to_string(),
            arch: host_arch(),
            extractor: ExtractorKind::default(),
            root_dir: data,
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.catalog_dir.join(INDEX_FILENAME)
    }

    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.catalog_dir.join(format!("{name}.{DESCRIPTOR_EXTENSION}"))
    }

    pub fn package_install_dir(&self, name: &str) -> PathBuf {
        self.install_dir.join(name)
    }

    pub fn desktop_entry_path(&self, name: &str) -> PathBuf {
        self.desktop_dir.join(format!("{name}.desktop"))
    }

    /// URL of a file relative to the remote catalog base.
    pub fn remote_file_url(&self, filename: &str) -> String {
        if self.remote_url.ends_with('/') {
            format!("{}{}", self.remote_url, filename)
        } else {
            format!("{}/{}", self.remote_url, filename)
        }
    }

    /// Creates every directory the package manager writes into.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.catalog_dir,
            &self.binaries_dir,
            &self.installed_dir,
            &self.install_dir,
            &self.bin_dir,
            &self.desktop_dir,
        ] {
            if !dir.exists() {
                debug!("Creating directory {}", dir.display());
                fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }
}

/// Architecture name as used in the catalog's download lines.
pub fn host_arch() -> String {
    normalize_arch(env::consts::ARCH)
}

/// Folds the 32-bit x86 spellings (`x86`, `i486`..`i686`) into `i386`.
pub fn normalize_arch(machine: &str) -> String {
    if machine == "x86" {
        return "i386".to_string();
    }
    match machine.strip_prefix('i') {
        Some(rest) if rest.starts_with(['4', '5', '6']) => format!("i3{}", &rest[1..]),
        _ => machine.to_string(),
    }
}
