//! SiteLens: website trust feature extraction.
//!
//! Five independent probes (URL shape, TLS certificate, HTTP security
//! headers, page content and WHOIS registry data) each fill a slice of a
//! fixed-schema [`FeatureRecord`]. A probe that cannot measure its signal
//! contributes defaults instead of failing the record. The
//! [`DatasetBuilder`] drives the extractor over a URL list and persists
//! rows to a resumable CSV table.

pub mod acquisition;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extractor;
pub mod features;
pub mod probe;
pub mod record;

pub use config::{BuildConfig, Labeling, ProbeConfig};
pub use dataset::builder::{BuildReport, DatasetBuilder};
pub use dataset::table::OutputTable;
pub use error::{Result, SiteLensError};
pub use extractor::{normalize_url, Extractor, FeatureExtractor};
pub use probe::ProbeOutcome;
pub use record::{FeatureRecord, Label, COLUMNS};
