// quick-common/src/model/mod.rs
pub mod descriptor;
pub mod installed;
pub mod version;

pub use descriptor::{DesktopEntry, Descriptor, Download};
pub use installed::InstalledRecord;
pub use version::Version;
