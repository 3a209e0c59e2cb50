//! Probe result type.
//!
//! A probe either measured its fields or could not, and in the latter case the
//! record gets the probe's zero/empty defaults. Keeping the reason around lets
//! the aggregator log why a slice of the record is blank.

use tracing::debug;

/// Outcome of one probe against one website.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome<T> {
    /// The probe ran and produced its fields.
    Measured(T),
    /// The probe could not produce its fields; defaults apply.
    Unavailable { reason: String },
}

impl<T: Default> ProbeOutcome<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Measured(_))
    }

    /// Collapse to the probe's fields, falling back to the default payload.
    pub fn into_features(self) -> T {
        match self {
            Self::Measured(features) => features,
            Self::Unavailable { .. } => T::default(),
        }
    }

    /// Same as [`into_features`](Self::into_features), logging the reason at debug level.
    pub fn log_into_features(self, probe: &str, url: &str) -> T {
        if let Self::Unavailable { reason } = &self {
            debug!(probe, url, reason = %reason, "probe unavailable, using defaults");
        }
        self.into_features()
    }
}
