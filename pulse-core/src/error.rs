//! Error types shared across the crate.
//!
//! Feed errors never escape [`crate::feed::TypewriterFeed`]; they are logged
//! and replaced by the placeholder item. Config errors are returned to the
//! host, which decides whether to abort.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while retrieving or decoding a batch of text items.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid data source locator {locator:?}: {source}")]
    Locator {
        locator: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed batch: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("loader went away before delivering a batch")]
    Disconnected,
}

/// Failure while loading a [`crate::config::PortalConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A color string that none of the supported notations accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color {0:?}")]
pub struct ColorError(pub String);
