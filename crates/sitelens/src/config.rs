//! Probe and dataset-builder settings.

use std::time::Duration;

/// Browser user-agent sent with every HTTP probe to avoid trivial bot blocking.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Settings shared by the network probes.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Bound on each network call (HTTP request, TLS handshake, WHOIS query).
    pub timeout: Duration,
    /// Port used for the certificate probe.
    pub tls_port: u16,
    /// Port used for WHOIS queries.
    pub whois_port: u16,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            tls_port: 443,
            whois_port: 43,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
        }
    }
}

impl ProbeConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_tls_port(mut self, port: u16) -> Self {
        self.tls_port = port;
        self
    }

    pub fn with_whois_port(mut self, port: u16) -> Self {
        self.whois_port = port;
        self
    }
}

/// How the builder assigns `secure_label` to list entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Labeling {
    /// First half of the list is secure (1), second half malicious (0).
    #[default]
    Positional,
    /// No labels; the `secure_label` column is left empty.
    Unlabeled,
}

/// Settings for a dataset build run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Pending records that trigger a flush to the table.
    pub batch_size: usize,
    /// Politeness delay after every attempted entry.
    pub delay: Duration,
    /// Lists shorter than this still run, with a warning.
    pub min_expected_urls: usize,
    pub labeling: Labeling,
    /// Only the first `limit` entries are processed when set.
    pub limit: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            delay: Duration::from_millis(500),
            min_expected_urls: 1000,
            labeling: Labeling::Positional,
            limit: None,
        }
    }
}

impl BuildConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_labeling(mut self, labeling: Labeling) -> Self {
        self.labeling = labeling;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_min_expected_urls(mut self, min: usize) -> Self {
        self.min_expected_urls = min;
        self
    }
}
