//! Feature aggregation: run every probe against one URL and merge the
//! results into a single [`FeatureRecord`].

use crate::acquisition::http_client::HttpClient;
use crate::acquisition::tls::{CertificateFetcher, RustlsCertificateFetcher};
use crate::acquisition::whois::{RegistryLookup, WhoisClient};
use crate::config::ProbeConfig;
use crate::error::{Result, SiteLensError};
use crate::features::{content, headers, lexical, registry, tls};
use crate::record::{FeatureRecord, Label};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Anything that can turn a URL into a complete feature record.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Build the record for `url`. Probe failures are absorbed into default
    /// fields; only a URL without a usable host is an error.
    async fn extract(&self, url: &str, label: Option<Label>) -> Result<FeatureRecord>;
}

/// Prefix `https://` unless the URL already names an http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });

    if has_scheme {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Host of a normalized URL, as used by the TLS and registry probes.
pub fn host_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| SiteLensError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    parsed
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| SiteLensError::InvalidUrl {
            url: url.to_string(),
            reason: "no host".to_string(),
        })
}

/// The production extractor: one shared HTTP client plus TLS and registry
/// capabilities.
pub struct FeatureExtractor {
    http: HttpClient,
    certificates: Arc<dyn CertificateFetcher>,
    registry: Arc<dyn RegistryLookup>,
}

impl FeatureExtractor {
    /// Build an extractor with the real network capabilities.
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let http = HttpClient::new(config)?;
        let certificates =
            RustlsCertificateFetcher::new(config).map_err(SiteLensError::TlsSetup)?;

        Ok(Self::with_capabilities(
            http,
            Arc::new(certificates),
            Arc::new(WhoisClient::new(config)),
        ))
    }

    /// Build an extractor from explicit capability handles.
    pub fn with_capabilities(
        http: HttpClient,
        certificates: Arc<dyn CertificateFetcher>,
        registry: Arc<dyn RegistryLookup>,
    ) -> Self {
        Self {
            http,
            certificates,
            registry,
        }
    }
}

#[async_trait]
impl Extractor for FeatureExtractor {
    async fn extract(&self, url: &str, label: Option<Label>) -> Result<FeatureRecord> {
        let website = normalize_url(url);
        let host = host_of(&website)?;
        let now = Utc::now();
        debug!(url = %website, host = %host, "extracting features");

        let tls = tls::probe_tls(self.certificates.as_ref(), &host, &website, now)
            .await
            .log_into_features("tls", &website);
        let registry = registry::probe_registry(self.registry.as_ref(), &host, now)
            .await
            .log_into_features("registry", &website);
        let url_features = lexical::analyze_url(&website);
        let content = content::probe_content(&self.http, &website)
            .await
            .log_into_features("content", &website);
        let headers = headers::probe_headers(&self.http, &website)
            .await
            .log_into_features("headers", &website);

        Ok(FeatureRecord::assemble(
            website,
            tls,
            registry,
            url_features,
            content,
            headers,
            label,
        ))
    }
}
