// quick-io/src/lib.rs
//! Blocking IO operations for quick (filesystem, checksums, archives, processes)

pub mod checksum;
pub mod extract;
pub mod fs;
pub mod process;

pub use checksum::{file_digest, verify_checksum, HashAlgorithm};
pub use extract::{extractor_for, ArchiveExtractor, Extractor, ToolExtractor};
pub use fs::atomic_write_file;
