// quick-io/src/checksum.rs
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use quick_common::error::{QuickError, Result};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Digest used for a published hash, chosen by its hex length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    pub fn for_hex(expected: &str) -> Result<Self> {
        if !expected.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(QuickError::Validation(format!(
                "Hash '{expected}' is not hexadecimal"
            )));
        }
        match expected.len() {
            40 => Ok(HashAlgorithm::Sha1),
            64 => Ok(HashAlgorithm::Sha256),
            n => Err(QuickError::Validation(format!(
                "Unsupported hash length {n} for '{expected}' (expected 40 or 64 hex digits)"
            ))),
        }
    }
}

fn digest_reader<D: Digest + io::Write, R: Read>(mut reader: R) -> Result<(String, u64)> {
    let mut hasher = D::new();
    let bytes = io::copy(&mut reader, &mut hasher)?;
    Ok((hex::encode(hasher.finalize()), bytes))
}

/// Hex digest of a file's contents.
pub fn file_digest(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let reader = BufReader::new(File::open(path)?);
    let (actual, bytes) = match algorithm {
        HashAlgorithm::Sha1 => digest_reader::<Sha1, _>(reader)?,
        HashAlgorithm::Sha256 => digest_reader::<Sha256, _>(reader)?,
    };
    debug!(
        "Calculated {:?} for {}: {} ({} bytes read)",
        algorithm,
        path.display(),
        actual,
        bytes
    );
    Ok(actual)
}

/// Recomputes the digest of `path` and requires it to equal `expected`.
pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    tracing::debug!("Verifying checksum for: {}", path.display());
    let algorithm = HashAlgorithm::for_hex(expected)?;
    let actual = file_digest(path, algorithm)?;
    tracing::debug!("Expected digest:   {}", expected);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(QuickError::HashMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}
