// quick-core/src/manager.rs
use quick_common::config::Config;
use quick_common::error::Result;
use quick_io::extract::{extractor_for, Extractor};
use quick_io::fs::empty_directory;
use quick_net::{HttpTransport, Transport};
use tracing::debug;

use crate::catalog::{ManifestStore, SyncReport};
use crate::events::{EventHandler, LifecycleEvent};
use crate::fetch::ArtifactFetcher;
use crate::ledger::Ledger;
use crate::materialize::Materializer;

/// Owns every component of the package lifecycle and runs the install,
/// upgrade and remove operations over them.
///
/// Transport and extractor are injected so tests can run without a network
/// or external tools.
pub struct PackageManager {
    pub(crate) config: Config,
    pub(crate) catalog: ManifestStore,
    pub(crate) ledger: Ledger,
    pub(crate) fetcher: ArtifactFetcher,
    pub(crate) materializer: Materializer,
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) extractor: Box<dyn Extractor>,
    events: Option<EventHandler>,
}

impl PackageManager {
    pub fn new(
        config: Config,
        transport: Box<dyn Transport>,
        extractor: Box<dyn Extractor>,
    ) -> Result<Self> {
        let ledger = Ledger::load(&config.ledger_path, &config.install_dir)?;
        Ok(Self {
            catalog: ManifestStore::new(&config),
            fetcher: ArtifactFetcher::new(&config.binaries_dir),
            materializer: Materializer::new(&config),
            ledger,
            transport,
            extractor,
            events: None,
            config,
        })
    }

    /// Manager wired to HTTP and the extractor chosen in `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let transport = Box::new(HttpTransport::new()?);
        let extractor = extractor_for(config.extractor);
        Self::new(config, transport, extractor)
    }

    /// Shows a progress bar while archives download.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.fetcher = self.fetcher.with_progress(show);
        self
    }

    pub fn with_event_handler(mut self, handler: impl FnMut(&LifecycleEvent) + 'static) -> Self {
        self.events = Some(Box::new(handler));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &ManifestStore {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub(crate) fn emit(&mut self, event: LifecycleEvent) {
        emit_to(&mut self.events, event);
    }

    /// Refreshes the local catalog from the remote.
    pub fn sync(&mut self) -> Result<SyncReport> {
        let events = &mut self.events;
        self.catalog
            .sync(self.transport.as_ref(), &mut |position, total, filename| {
                emit_to(
                    events,
                    LifecycleEvent::SyncFetching {
                        position,
                        total,
                        filename: filename.to_string(),
                    },
                )
            })
    }

    /// Empties the descriptor and archive caches.
    pub fn clean(&self) -> Result<()> {
        debug!("Cleaning catalog and archive caches");
        self.catalog.clean()?;
        empty_directory(&self.config.binaries_dir)
    }
}

fn emit_to(events: &mut Option<EventHandler>, event: LifecycleEvent) {
    if let Some(handler) = events.as_mut() {
        handler(&event);
    }
}
