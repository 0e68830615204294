//! Where the memory stream gets its batches from.
//!
//! A [`DataSource`] starts a load and hands back a [`PendingBatch`] that the
//! feed polls without blocking. HTTP loads run on a worker thread; file and
//! in-memory loads complete before `request` returns.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use url::Url;

use crate::error::FeedError;

/// Label shown for items whose payload carries no `source`.
pub const DEFAULT_SOURCE_LABEL: &str = "LOG";

/// One snippet of the memory stream.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TextItem {
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl TextItem {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: Some(source.into()),
        }
    }

    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE_LABEL)
    }
}

pub type BatchResult = Result<Vec<TextItem>, FeedError>;

/// Decodes a batch: a JSON array of `{text, source?}` objects.
pub fn parse_batch(bytes: &[u8]) -> BatchResult {
    Ok(serde_json::from_slice(bytes)?)
}

/// A load in flight.
#[derive(Debug)]
pub struct PendingBatch(Receiver<BatchResult>);

impl PendingBatch {
    /// A load that has already finished.
    pub fn ready(result: BatchResult) -> Self {
        let (tx, rx) = mpsc::channel();
        // The receiver is alive in this scope, so the send cannot fail.
        let _ = tx.send(result);
        Self(rx)
    }

    /// Runs `load` on a worker thread.
    pub fn spawn(load: impl FnOnce() -> BatchResult + Send + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            // The feed may have been torn down meanwhile; nobody to tell.
            let _ = tx.send(load());
        });
        Self(rx)
    }

    /// Returns the outcome once available. A worker that died without
    /// reporting yields [`FeedError::Disconnected`].
    pub fn poll(&mut self) -> Option<BatchResult> {
        match self.0.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(FeedError::Disconnected)),
        }
    }
}

impl From<Receiver<BatchResult>> for PendingBatch {
    fn from(rx: Receiver<BatchResult>) -> Self {
        Self(rx)
    }
}

pub trait DataSource {
    fn request(&self) -> PendingBatch;

    /// Human-readable locator for logs.
    fn describe(&self) -> String;
}

/// Picks a source for `locator`: `http://` and `https://` URLs are fetched
/// over the network, anything else is read from disk.
pub fn source_for(locator: &str) -> Box<dyn DataSource> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        Box::new(HttpSource::new(locator))
    } else {
        Box::new(FileSource::new(locator))
    }
}

/// Fetches the batch over HTTP, cache-busting each request.
#[derive(Clone, Debug)]
pub struct HttpSource {
    locator: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Request URL with a `t=<unix millis>` query parameter appended.
    pub fn busted_url(&self, now: SystemTime) -> Result<Url, FeedError> {
        let mut url = Url::parse(&self.locator).map_err(|source| FeedError::Locator {
            locator: self.locator.clone(),
            source,
        })?;
        let millis = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        url.query_pairs_mut().append_pair("t", &millis.to_string());
        Ok(url)
    }

    fn fetch(url: Url, timeout: Duration) -> BatchResult {
        let http_err = |source: reqwest::Error| FeedError::Http {
            url: url.to_string(),
            source,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(http_err)?;

        let response = client
            .get(url.as_str())
            .header("Accept", "application/json")
            .send()
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(http_err)?;
        parse_batch(&body)
    }
}

impl DataSource for HttpSource {
    fn request(&self) -> PendingBatch {
        let url = match self.busted_url(SystemTime::now()) {
            Ok(url) => url,
            Err(e) => return PendingBatch::ready(Err(e)),
        };
        let timeout = self.timeout;
        PendingBatch::spawn(move || Self::fetch(url, timeout))
    }

    fn describe(&self) -> String {
        self.locator.clone()
    }
}

/// Re-reads a JSON file on every request.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn request(&self) -> PendingBatch {
        let result = std::fs::read(&self.path)
            .map_err(|source| FeedError::Io {
                path: self.path.clone(),
                source,
            })
            .and_then(|bytes| parse_batch(&bytes));
        PendingBatch::ready(result)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serves a fixed batch from memory.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    pub items: Vec<TextItem>,
}

impl StaticSource {
    pub fn new(items: Vec<TextItem>) -> Self {
        Self { items }
    }
}

impl DataSource for StaticSource {
    fn request(&self) -> PendingBatch {
        PendingBatch::ready(Ok(self.items.clone()))
    }

    fn describe(&self) -> String {
        format!("<{} static items>", self.items.len())
    }
}
