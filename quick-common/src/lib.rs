// quick-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;

pub use config::{Config, ExtractorKind};
pub use error::{QuickError, Result};
pub use model::{Descriptor, InstalledRecord, Version};
