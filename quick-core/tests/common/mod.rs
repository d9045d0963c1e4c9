// quick-core/tests/common/mod.rs
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use flate2::write::GzEncoder;
use flate2::Compression;
use quick_common::config::Config;
use quick_common::error::{QuickError, Result};
use quick_core::{LifecycleEvent, PackageManager};
use quick_io::checksum::{file_digest, HashAlgorithm};
use quick_io::extract::{ArchiveExtractor, Extractor};
use quick_net::{ProgressFn, Transport};
use tempfile::TempDir;

pub const CATALOG: &str = "https://catalog.test/packages/";
pub const ARCH: &str = "x86_64";

/// In-memory remote: URL to body, counting every request.
#[derive(Clone, Default)]
pub struct FakeTransport {
    files: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    pub fetches: Rc<Cell<usize>>,
}

impl FakeTransport {
    pub fn serve(&self, url: &str, body: Vec<u8>) {
        self.files.borrow_mut().insert(url.to_string(), body);
    }
}

impl Transport for FakeTransport {
    fn fetch_to(&self, url: &str, sink: &mut dyn Write, progress: ProgressFn<'_>) -> Result<u64> {
        self.fetches.set(self.fetches.get() + 1);
        let files = self.files.borrow();
        let body = files
            .get(url)
            .ok_or_else(|| QuickError::fetch(url, "HTTP status 404 Not Found"))?;
        sink.write_all(body)?;
        progress(body.len() as u64, Some(body.len() as u64));
        Ok(body.len() as u64)
    }
}

/// Native extraction that counts its calls.
pub struct CountingExtractor {
    pub calls: Rc<Cell<usize>>,
}

impl Extractor for CountingExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        ArchiveExtractor.extract(archive, dest)
    }
}

pub struct Harness {
    pub tmp: TempDir,
    pub config: Config,
    pub transport: FakeTransport,
    pub extractions: Rc<Cell<usize>>,
    pub events: Rc<RefCell<Vec<LifecycleEvent>>>,
}

impl Harness {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::with_root(tmp.path());
        config.remote_url = CATALOG.to_string();
        config.arch = ARCH.to_string();
        config.ensure_dirs().unwrap();
        fs::write(config.index_path(), "").unwrap();
        Self {
            tmp,
            config,
            transport: FakeTransport::default(),
            extractions: Rc::new(Cell::new(0)),
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A fresh manager over the same root, reloading the ledger from disk.
    pub fn manager(&self) -> PackageManager {
        let events = Rc::clone(&self.events);
        PackageManager::new(
            self.config.clone(),
            Box::new(self.transport.clone()),
            Box::new(CountingExtractor {
                calls: Rc::clone(&self.extractions),
            }),
        )
        .unwrap()
        .with_event_handler(move |e| events.borrow_mut().push(e.clone()))
    }

    /// Serves a gzipped tarball at `url` and returns its SHA-1.
    pub fn serve_archive(&self, url: &str, entries: &[(&str, &[u8])]) -> String {
        let body = tar_gz(entries);
        let scratch = self.tmp.path().join("scratch.tar.gz");
        fs::write(&scratch, &body).unwrap();
        let sha1 = file_digest(&scratch, HashAlgorithm::Sha1).unwrap();
        fs::remove_file(&scratch).unwrap();
        self.transport.serve(url, body);
        sha1
    }

    /// Writes a descriptor into the local catalog and lists it in the index.
    pub fn publish(&self, name: &str, yaml: &str) {
        let filename = format!("{name}.yaml");
        fs::write(self.config.catalog_dir.join(&filename), yaml).unwrap();
        let index = fs::read_to_string(self.config.index_path()).unwrap();
        if !index.lines().any(|l| l == filename) {
            fs::write(self.config.index_path(), format!("{index}{filename}\n")).unwrap();
        }
    }

    /// Publishes `tool` at `version` with a single download for this host.
    pub fn publish_tool(&self, version: &str) -> String {
        let url = format!("https://dl.test/tool-{version}.tar.gz");
        let script = format!("#!/bin/sh\necho {version}\n");
        let sha1 = self.serve_archive(
            &url,
            &[
                ("tool-dist/bin/tool", script.as_bytes()),
                ("tool-dist/share/tool.png", b"png"),
            ],
        );
        self.publish("tool", &tool_descriptor(version, &format!("{url} {ARCH} {sha1} tool-dist")));
        url
    }

    pub fn take_events(&self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

pub fn tool_descriptor(version: &str, download_line: &str) -> String {
    format!(
        "Name: Tool\nDescription: A command line tool\nVersion: \"{version}\"\n\
         Homepage: https://tool.test/\nDownload:\n  - {download_line}\n\
         Symlink:\n  - bin/tool\nDesktopFile:\n  Exec: bin/tool\n  Icon: share/tool.png\n"
    )
}

pub fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}
