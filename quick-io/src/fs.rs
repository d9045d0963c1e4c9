// quick-io/src/fs.rs
// Primitive synchronous filesystem operations.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use quick_common::error::{QuickError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

/// Checks if a path exists without following symlinks.
pub fn check_symlink_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Creates a directory and all its parent components if they are missing.
pub fn create_dir_all(path: &Path) -> Result<()> {
    debug!("Creating directory recursively: {}", path.display());
    fs::create_dir_all(path).map_err(|e| {
        error!("Failed create dir {}: {}", path.display(), e);
        QuickError::from(e)
    })
}

/// Removes a file, symlink or directory tree.
///
/// A path that is already gone counts as removed. Symlinks are never
/// followed, so a link to a directory only loses the link.
pub fn remove_filesystem_artifact(path: &Path) -> Result<bool> {
    let metadata = match path.symlink_metadata() {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Artifact not found (already removed?): {}", path.display());
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    let file_type = metadata.file_type();
    debug!(
        "Removing filesystem artifact ({}) at: {}",
        if file_type.is_dir() {
            "directory"
        } else if file_type.is_symlink() {
            "symlink"
        } else {
            "file"
        },
        path.display()
    );

    let result = if file_type.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            error!("Failed to remove artifact {}: {}", path.display(), e);
            Err(e.into())
        }
    }
}

/// Creates `link -> target`, replacing anything already at `link`.
#[cfg(unix)]
pub fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    remove_filesystem_artifact(link)?;
    if let Some(parent) = link.parent() {
        create_dir_all(parent)?;
    }
    debug!("Creating symlink {} -> {}", link.display(), target.display());
    std::os::unix::fs::symlink(target, link).map_err(|e| {
        error!(
            "Failed create symlink {} -> {}: {}",
            link.display(),
            target.display(),
            e
        );
        QuickError::from(e)
    })
}

#[cfg(not(unix))]
pub fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    warn!(
        "Symlink creation not supported on this platform: {} -> {}",
        link.display(),
        target.display()
    );
    Err(QuickError::Generic(
        "Symlinks not supported on this platform".to_string(),
    ))
}

/// Target of `link` when it is a symlink whose target lies under `dir`.
pub fn symlink_target_within(link: &Path, dir: &Path) -> Option<PathBuf> {
    let target = fs::read_link(link).ok()?;
    let absolute = if target.is_absolute() {
        target
    } else {
        link.parent()?.join(target)
    };
    absolute.starts_with(dir).then_some(absolute)
}

/// Atomically writes data to a file using a temporary file in the same
/// directory, so readers see either the old or the new contents.
pub fn atomic_write_file(original_path: &Path, content: &[u8]) -> Result<()> {
    let dir = original_path.parent().ok_or_else(|| {
        QuickError::Validation(format!(
            "Cannot get parent directory for {}",
            original_path.display()
        ))
    })?;
    create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    let temp_path = temp_file.path().to_path_buf();
    debug!(
        "Atomically writing {} bytes to {} via temp file {}",
        content.len(),
        original_path.display(),
        temp_path.display()
    );

    temp_file.write_all(content)?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;

    temp_file.persist(original_path).map_err(|e| {
        error!(
            "Failed to persist temporary file {} over {}: {}",
            temp_path.display(),
            original_path.display(),
            e.error
        );
        QuickError::from(e.error)
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(original_path, fs::Permissions::from_mode(0o644)) {
            warn!(
                "Failed to set permissions on {}: {}",
                original_path.display(),
                e
            );
        }
    }
    Ok(())
}

/// Removes every entry inside `dir`, keeping the directory itself.
pub fn empty_directory(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!("Emptying directory {}", dir.display());
        fs::remove_dir_all(dir)?;
    }
    create_dir_all(dir)
}
