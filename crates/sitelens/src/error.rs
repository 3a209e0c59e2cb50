//! Typed errors for the sitelens library.
//!
//! Probe failures are not represented here: they are absorbed inside each
//! probe as [`ProbeOutcome::Unavailable`](crate::probe::ProbeOutcome).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that escape the aggregator or the dataset builder.
#[derive(Debug, Error)]
pub enum SiteLensError {
    /// The URL could not be parsed or carries no host.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted output table could not be read or written.
    #[error("table error on {}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The shared HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The TLS client configuration could not be constructed.
    #[error("failed to set up TLS: {0}")]
    TlsSetup(#[source] crate::acquisition::tls::CertificateError),
}

impl SiteLensError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn table(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Table {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, SiteLensError>;
