// src/error.rs
// =============================================================================
// Every failure a harvest run can hit, as one typed enum.
//
// Most of these are per-unit failures: the crawl engine and the download
// pipeline catch them where they happen, log them, and move on to the next
// URL or file. Only `Config` (and a client that cannot be built) stops a run,
// and that happens before the first request goes out.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// Connection-level failure (DNS, refused connection, TLS, broken body)
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within the configured timeout
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// The server answered with a non-2xx status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// A 3xx pointing elsewhere. Redirects are never followed automatically;
    /// the crawl treats `location` as one more discovered link
    #[error("{url} redirects to {location}")]
    Redirect { url: String, location: url::Url },

    /// HTML could not be interpreted; extraction falls back to whatever was found
    #[error("could not parse HTML from {url}: {reason}")]
    Parse { url: String, reason: String },

    /// No extension could be derived from the content type or the bytes
    #[error("no extension could be resolved for {url}")]
    Classification { url: String },

    /// Staging write or delete failed
    #[error("filesystem error at {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive writer failed
    #[error("archive error at {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Invalid seed or origin; fatal
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HarvestError {
    /// Maps a reqwest error onto the taxonomy, keeping timeouts distinct
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            HarvestError::Timeout {
                url: url.to_string(),
            }
        } else {
            HarvestError::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }

    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarvestError::FileSystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
