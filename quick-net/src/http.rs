// quick-net/src/http.rs
use std::io::{Read, Write};
use std::time::Duration;

use quick_common::error::{QuickError, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::{debug, error};

use crate::validation::validate_url;

const DOWNLOAD_TIMEOUT_SECS: u64 = 600;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT_STRING: &str = "quick package manager (Rust)";
const CHUNK_SIZE: usize = 64 * 1024;

/// Called with `(bytes_so_far, total_if_known)` while a body streams in.
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64, Option<u64>);

/// Capability to retrieve a remote file.
pub trait Transport {
    /// Streams the body at `url` into `sink` and returns the byte count.
    fn fetch_to(&self, url: &str, sink: &mut dyn Write, progress: ProgressFn<'_>) -> Result<u64>;

    /// Fetches the whole body into memory.
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.fetch_to(url, &mut body, &mut |_, _| {})?;
        Ok(body)
    }
}

/// Blocking HTTP(S) transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
        })
    }
}

fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| QuickError::Config(format!("Failed to build HTTP client: {e}")))
}

impl Transport for HttpTransport {
    fn fetch_to(&self, url: &str, sink: &mut dyn Write, progress: ProgressFn<'_>) -> Result<u64> {
        validate_url(url)?;
        debug!("Fetching {}", url);

        let mut response = self.client.get(url).send().map_err(|e| {
            debug!("HTTP request failed for {url}: {e}");
            QuickError::fetch(url, e)
        })?;
        let status = response.status();
        debug!("Received HTTP status: {} for {}", status, url);
        if !status.is_success() {
            error!("HTTP error {} for URL {}", status, url);
            return Err(QuickError::fetch(url, format!("HTTP status {status}")));
        }

        let total = response.content_length();
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut written: u64 = 0;
        progress(0, total);
        loop {
            let n = response
                .read(&mut buf)
                .map_err(|e| QuickError::fetch(url, format!("failed reading body: {e}")))?;
            if n == 0 {
                break;
            }
            sink.write_all(&buf[..n])?;
            written += n as u64;
            progress(written, total);
        }
        sink.flush()?;
        debug!("Fetched {} bytes from {}", written, url);
        Ok(written)
    }
}
