// quick-core/src/events.rs
use std::path::PathBuf;

use quick_common::model::Version;

/// Progress notifications emitted by `PackageManager` while it works.
///
/// The library never prints; a front end subscribes with
/// `PackageManager::with_event_handler` and renders these however it likes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    SyncFetching {
        position: usize,
        total: usize,
        filename: String,
    },
    InstallStarted {
        name: String,
        version: Version,
        upgrade: bool,
    },
    InstallFinished {
        name: String,
        upgrade: bool,
    },
    AlreadyLatest {
        name: String,
        version: Version,
    },
    DownloadStarted {
        name: String,
        url: String,
    },
    DownloadFailed {
        name: String,
        url: String,
        error: String,
    },
    Extracting {
        name: String,
        archive: PathBuf,
        target: PathBuf,
    },
    LinkCreated {
        link: PathBuf,
        source: PathBuf,
    },
    DesktopEntryWritten {
        path: PathBuf,
    },
    RemoveStarted {
        name: String,
    },
    RemoveFinished {
        name: String,
        file_count: usize,
        size_bytes: u64,
    },
}

pub type EventHandler = Box<dyn FnMut(&LifecycleEvent)>;
