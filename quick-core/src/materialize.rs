// quick-core/src/materialize.rs
//! Derived artifacts of an installed package: launcher symlinks in `bin/`
//! and an optional `.desktop` file.

use std::fs;
use std::path::{Path, PathBuf};

use quick_common::config::Config;
use quick_common::error::Result;
use quick_common::model::{DesktopEntry, Descriptor};
use quick_io::fs::{
    atomic_write_file, check_symlink_exists, create_dir_all, remove_filesystem_artifact,
    replace_symlink, symlink_target_within,
};
use tracing::{debug, warn};

/// What `Materializer::apply` produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// `(link, source)` pairs.
    pub links: Vec<(PathBuf, PathBuf)>,
    /// Declared symlink targets whose source was missing from the extracted tree.
    pub skipped: Vec<String>,
    pub desktop_entry: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Materializer {
    config: Config,
}

impl Materializer {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Links the descriptor's executables into `bin/` and writes its desktop
    /// entry. Paths in the descriptor are relative to `install_dir/subfolder`.
    pub fn apply(
        &self,
        name: &str,
        descriptor: &Descriptor,
        install_dir: &Path,
        subfolder: &str,
    ) -> Result<Materialized> {
        let content_root = install_dir.join(subfolder);
        let mut result = Materialized::default();

        if !descriptor.symlinks.is_empty() {
            create_dir_all(&self.config.bin_dir)?;
        }
        for target in &descriptor.symlinks {
            let Some(basename) = Path::new(target).file_name() else {
                warn!("Ignoring symlink entry '{}' without a file name", target);
                result.skipped.push(target.clone());
                continue;
            };
            let link = self.config.bin_dir.join(basename);
            let source = content_root.join(target);

            if check_symlink_exists(&link) {
                debug!("Replacing existing {}", link.display());
                remove_filesystem_artifact(&link)?;
            }
            if !source.exists() {
                debug!("Not linking {}: {} is missing", link.display(), source.display());
                result.skipped.push(target.clone());
                continue;
            }
            replace_symlink(&source, &link)?;
            result.links.push((link, source));
        }

        if let Some(entry) = &descriptor.desktop_entry {
            if let Some(exec) = entry.exec.as_deref() {
                let path = self.config.desktop_entry_path(name);
                let content = render_desktop_entry(&descriptor.name, entry, exec, &content_root);
                create_dir_all(&self.config.desktop_dir)?;
                atomic_write_file(&path, content.as_bytes())?;
                debug!("Wrote desktop entry {}", path.display());
                result.desktop_entry = Some(path);
            }
        }
        Ok(result)
    }

    /// Removes every `bin/` link pointing into `install_dir` and the desktop
    /// entry for `name`. Returns how many artifacts were removed.
    pub fn detach(&self, name: &str, install_dir: &Path) -> Result<usize> {
        let mut removed = 0;
        match fs::read_dir(&self.config.bin_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let link = entry.path();
                    if symlink_target_within(&link, install_dir).is_some()
                        && remove_filesystem_artifact(&link)?
                    {
                        debug!("Removed link {}", link.display());
                        removed += 1;
                    }
                }
            }
            Err(e) => debug!("Skipping link scan of {}: {}", self.config.bin_dir.display(), e),
        }

        if remove_filesystem_artifact(&self.config.desktop_entry_path(name))? {
            removed += 1;
        }
        Ok(removed)
    }
}

fn render_desktop_entry(title: &str, entry: &DesktopEntry, exec: &str, root: &Path) -> String {
    let mut out = String::from("[Desktop Entry]\nType=Application\n");
    out.push_str(&format!("Name={title}\n"));
    if let Some(comment) = &entry.comment {
        out.push_str(&format!("Comment={comment}\n"));
    }
    if let Some(categories) = &entry.categories {
        out.push_str(&format!("Categories={categories}\n"));
    }
    out.push_str(&format!("Exec=\"{}\"\n", root.join(exec).display()));
    if let Some(icon) = &entry.icon {
        out.push_str(&format!("Icon={}\n", root.join(icon).display()));
    }
    out.push_str("Terminal=false\nStartupNotify=true\n");
    out
}
