// quick-io/src/extract.rs
// Unpacks downloaded archives into a package's install directory.
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use quick_common::config::ExtractorKind;
use quick_common::error::{QuickError, Result};
use tar::Archive;
use tracing::{debug, error, warn};
use xz2::read::XzDecoder;
use zip::read::ZipArchive;

use crate::process::run_command;

/// Capability to unpack an archive into a directory.
///
/// Implementations create `dest` when missing and overwrite entries that
/// already exist. A failed extraction may leave `dest` partially populated.
pub trait Extractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// Builds the extractor selected in the configuration.
pub fn extractor_for(kind: ExtractorKind) -> Box<dyn Extractor> {
    match kind {
        ExtractorKind::Native => Box::new(ArchiveExtractor),
        ExtractorKind::Tools => Box::new(ToolExtractor),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar(Compression),
}

fn file_name_lower(archive: &Path) -> String {
    archive
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Picks the unpack strategy from the file name: `.zip` is a zip, anything
/// else is a tar whose compression comes from the suffix or, failing that,
/// from the leading bytes.
pub fn detect_format(archive: &Path) -> Result<ArchiveFormat> {
    let name = file_name_lower(archive);
    if name.ends_with(".zip") {
        return Ok(ArchiveFormat::Zip);
    }
    let by_suffix = [
        (&[".gz", ".tgz"][..], Compression::Gzip),
        (&[".bz2", ".tbz", ".tbz2"][..], Compression::Bzip2),
        (&[".xz", ".txz"][..], Compression::Xz),
        (&[".tar"][..], Compression::None),
    ]
    .into_iter()
    .find(|(suffixes, _)| suffixes.iter().any(|s| name.ends_with(s)))
    .map(|(_, compression)| compression);

    let compression = match by_suffix {
        Some(compression) => compression,
        None => sniff_compression(archive)?,
    };
    Ok(ArchiveFormat::Tar(compression))
}

fn sniff_compression(archive: &Path) -> Result<Compression> {
    let kind = infer::get_from_path(archive)?;
    let compression = match kind.map(|k| k.extension()) {
        Some("gz") => Compression::Gzip,
        Some("bz2") => Compression::Bzip2,
        Some("xz") => Compression::Xz,
        _ => Compression::None,
    };
    debug!(
        "Detected {:?} compression for {} from content",
        compression,
        archive.display()
    );
    Ok(compression)
}

/// Extracts in-process with the tar and zip crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveExtractor;

impl Extractor for ArchiveExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let format = detect_format(archive)?;
        debug!(
            "Extracting archive '{}' ({:?}) to '{}'",
            archive.display(),
            format,
            dest.display()
        );
        fs::create_dir_all(dest)?;
        let file = File::open(archive)?;

        let result = match format {
            ArchiveFormat::Zip => extract_zip_archive(file, dest),
            ArchiveFormat::Tar(Compression::None) => extract_tar_archive(BufReader::new(file), dest),
            ArchiveFormat::Tar(Compression::Gzip) => extract_tar_archive(GzDecoder::new(file), dest),
            ArchiveFormat::Tar(Compression::Bzip2) => {
                extract_tar_archive(BzDecoder::new(file), dest)
            }
            ArchiveFormat::Tar(Compression::Xz) => extract_tar_archive(XzDecoder::new(file), dest),
        };
        result.map_err(|reason| {
            error!("Extraction of {} failed: {}", archive.display(), reason);
            QuickError::extraction(archive, reason)
        })
    }
}

fn extract_tar_archive<R: Read>(reader: R, dest: &Path) -> std::result::Result<(), String> {
    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    let mut errors: Vec<String> = Vec::new();
    let entries = archive
        .entries()
        .map_err(|e| format!("cannot read tar entries: {e}"))?;
    for entry_result in entries {
        let mut entry = entry_result.map_err(|e| format!("error reading tar entry: {e}"))?;
        let path = entry
            .path()
            .map(|p| p.into_owned())
            .map_err(|e| format!("invalid path in tar entry: {e}"))?;
        match entry.unpack_in(dest) {
            Ok(true) => debug!("Unpacked TAR entry {}", path.display()),
            Ok(false) => {
                let msg = format!("entry {} escapes the target directory", path.display());
                warn!("{}", msg);
                errors.push(msg);
            }
            Err(e) => {
                let msg = format!("failed to unpack {}: {}", path.display(), e);
                error!("{}", msg);
                errors.push(msg);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} error(s): {}", errors.len(), errors.join("; ")))
    }
}

fn extract_zip_archive<R: Read + Seek>(reader: R, dest: &Path) -> std::result::Result<(), String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| format!("failed to open zip: {e}"))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| format!("error reading zip index {i}: {e}"))?;
        let Some(relative) = file.enclosed_name() else {
            return Err(format!("unsafe zip entry name {}", file.name()));
        };
        let out_path = dest.join(relative);

        if file.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| format!("failed to create {}: {e}", out_path.display()))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
        if out_path.symlink_metadata().is_ok() {
            fs::remove_file(&out_path)
                .map_err(|e| format!("failed to replace {}: {e}", out_path.display()))?;
        }

        if file.is_symlink() {
            let mut target = String::new();
            file.read_to_string(&mut target)
                .map_err(|e| format!("failed to read link {}: {e}", file.name()))?;
            #[cfg(unix)]
            std::os::unix::fs::symlink(&target, &out_path)
                .map_err(|e| format!("failed to link {}: {e}", out_path.display()))?;
            #[cfg(not(unix))]
            warn!(
                "Cannot create symlink on non-unix system: {} -> {}",
                out_path.display(),
                target
            );
            continue;
        }

        let mut out_file = File::create(&out_path)
            .map_err(|e| format!("failed to create {}: {e}", out_path.display()))?;
        io::copy(&mut file, &mut out_file)
            .map_err(|e| format!("failed to write {}: {e}", out_path.display()))?;
        debug!("Unpacked ZIP entry {}", out_path.display());

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                .map_err(|e| format!("failed to set mode on {}: {e}", out_path.display()))?;
        }
    }
    Ok(())
}

/// Extracts by running `unzip` or `tar`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolExtractor;

impl Extractor for ToolExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest)?;
        let (program, args) = if file_name_lower(archive).ends_with(".zip") {
            (
                "unzip",
                vec![OsStr::new("-qo"), archive.as_os_str(), OsStr::new("-d"), dest.as_os_str()],
            )
        } else {
            (
                "tar",
                vec![OsStr::new("xf"), archive.as_os_str(), OsStr::new("-C"), dest.as_os_str()],
            )
        };
        let output = run_command(program, &args)
            .map_err(|e| QuickError::extraction(archive, format!("could not run {program}: {e}")))?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(QuickError::extraction(
                archive,
                format!("{program} exited with {}: {}", output.status, stderr.trim()),
            ))
        }
    }
}
