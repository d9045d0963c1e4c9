// quick-core/src/fetch.rs
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use quick_common::error::{QuickError, Result};
use quick_common::model::descriptor::archive_filename;
use quick_io::checksum::verify_checksum;
use quick_io::fs::create_dir_all;
use quick_net::Transport;
use tempfile::Builder;
use tracing::{debug, warn};

/// Keeps downloaded archives in the binaries cache and checks them against
/// their published hash.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    cache_dir: PathBuf,
    show_progress: bool,
}

impl ArtifactFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Cache location for `url`.
    pub fn local_path(&self, url: &str) -> Result<PathBuf> {
        let filename = archive_filename(url);
        if filename.is_empty() || filename == "." || filename == ".." {
            return Err(QuickError::Validation(format!(
                "cannot derive an archive name from '{url}'"
            )));
        }
        Ok(self.cache_dir.join(filename))
    }

    /// Returns a local copy of `url`, downloading it only when the cache has
    /// no copy or the cached copy fails verification.
    pub fn ensure_local(
        &self,
        transport: &dyn Transport,
        url: &str,
        expected_hash: Option<&str>,
        skip_verify: bool,
    ) -> Result<PathBuf> {
        let target = self.local_path(url)?;
        let verify = if skip_verify { None } else { expected_hash };

        if target.is_file() {
            match verify {
                None => {
                    debug!("Using cached {}", target.display());
                    return Ok(target);
                }
                Some(hash) => match verify_checksum(&target, hash) {
                    Ok(()) => {
                        debug!("Cached {} matches its checksum", target.display());
                        return Ok(target);
                    }
                    Err(QuickError::HashMismatch { .. }) => {
                        warn!("Cached {} is stale, downloading again", target.display());
                    }
                    Err(e) => return Err(e),
                },
            }
        }

        self.download(transport, url, &target, verify)?;
        Ok(target)
    }

    /// Streams `url` into a hidden file next to `target` and renames it into
    /// place once verified. The staging file is deleted on any failure.
    fn download(
        &self,
        transport: &dyn Transport,
        url: &str,
        target: &Path,
        expected_hash: Option<&str>,
    ) -> Result<()> {
        create_dir_all(&self.cache_dir)?;
        let mut staged = Builder::new()
            .prefix(".download-")
            .tempfile_in(&self.cache_dir)?;

        let bar = self.progress_bar(archive_filename(url));
        let fetched = transport.fetch_to(url, staged.as_file_mut(), &mut |done, total| {
            if let Some(total) = total {
                bar.set_length(total);
            }
            bar.set_position(done);
        });
        bar.finish_and_clear();
        let bytes = fetched?;

        staged.as_file().sync_all()?;
        if let Some(hash) = expected_hash {
            verify_checksum(staged.path(), hash).map_err(|e| match e {
                QuickError::HashMismatch {
                    expected, actual, ..
                } => QuickError::HashMismatch {
                    path: target.to_path_buf(),
                    expected,
                    actual,
                },
                other => other,
            })?;
        }
        staged
            .persist(target)
            .map_err(|e| QuickError::from(e.error))?;
        debug!("Downloaded {} bytes to {}", bytes, target.display());
        Ok(())
    }

    fn progress_bar(&self, label: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(" {msg} [{bar:40.cyan/blue}] {percent:>3}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_message(label.to_string());
        bar
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;
    use std::io::Write;

    use quick_net::ProgressFn;

    use super::*;

    const HELLO_SHA1: &str = "f572d396fae9206628714fb2ce00f72e94f2258f";

    struct Counting {
        body: Vec<u8>,
        calls: Cell<usize>,
    }

    impl Transport for Counting {
        fn fetch_to(&self, _url: &str, sink: &mut dyn Write, progress: ProgressFn<'_>) -> Result<u64> {
            self.calls.set(self.calls.get() + 1);
            sink.write_all(&self.body)?;
            progress(self.body.len() as u64, Some(self.body.len() as u64));
            Ok(self.body.len() as u64)
        }
    }

    #[test]
    fn valid_cache_skips_second_download() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = ArtifactFetcher::new(tmp.path());
        let transport = Counting {
            body: b"hello\n".to_vec(),
            calls: Cell::new(0),
        };
        let url = "https://dl.test/hello.tar.gz";
        let first = fetcher.ensure_local(&transport, url, Some(HELLO_SHA1), false).unwrap();
        let second = fetcher.ensure_local(&transport, url, Some(HELLO_SHA1), false).unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.calls.get(), 1);
        assert_eq!(fs::read(&first).unwrap(), b"hello\n");
    }

    #[test]
    fn stale_cache_is_replaced() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("hello.tar.gz"), b"stale").unwrap();
        let fetcher = ArtifactFetcher::new(tmp.path());
        let transport = Counting {
            body: b"hello\n".to_vec(),
            calls: Cell::new(0),
        };
        let path = fetcher
            .ensure_local(&transport, "https://dl.test/hello.tar.gz", Some(HELLO_SHA1), false)
            .unwrap();
        assert_eq!(fs::read(path).unwrap(), b"hello\n");
        assert_eq!(transport.calls.get(), 1);
    }

    #[test]
    fn mismatch_after_download_leaves_nothing_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = ArtifactFetcher::new(tmp.path());
        let transport = Counting {
            body: b"tampered\n".to_vec(),
            calls: Cell::new(0),
        };
        let err = fetcher
            .ensure_local(&transport, "https://dl.test/hello.tar.gz", Some(HELLO_SHA1), false)
            .unwrap_err();
        assert!(matches!(err, QuickError::HashMismatch { .. }));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn skip_verify_trusts_any_content() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = ArtifactFetcher::new(tmp.path());
        let transport = Counting {
            body: b"tampered\n".to_vec(),
            calls: Cell::new(0),
        };
        let url = "https://dl.test/hello.tar.gz";
        fetcher.ensure_local(&transport, url, Some(HELLO_SHA1), true).unwrap();
        fetcher.ensure_local(&transport, url, None, false).unwrap();
        assert_eq!(transport.calls.get(), 1);
    }
}
