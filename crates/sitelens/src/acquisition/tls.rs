//! Peer-certificate retrieval over TLS.
//!
//! The handshake verifies the chain against the bundled webpki roots and the
//! host name, so a certificate is only returned for a trusted connection.

use crate::config::ProbeConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{self, ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

/// The certificate attributes the TLS probe cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCertificate {
    /// `O=` attribute of the issuer name, if present.
    pub issuer_organization: Option<String>,
    /// End of the validity window.
    pub not_after: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("connect to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid server name {0:?}")]
    ServerName(String),

    #[error("server presented no certificate")]
    NoCertificate,

    #[error("certificate parse error: {0}")]
    Parse(String),

    #[error("TLS configuration error: {0}")]
    Config(String),
}

/// Capability to fetch the leaf certificate a host presents.
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    async fn fetch(&self, host: &str) -> Result<PeerCertificate, CertificateError>;
}

/// [`CertificateFetcher`] backed by rustls with the webpki root store.
pub struct RustlsCertificateFetcher {
    connector: TlsConnector,
    port: u16,
    timeout: Duration,
}

impl RustlsCertificateFetcher {
    pub fn new(config: &ProbeConfig) -> Result<Self, CertificateError> {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| CertificateError::Config(e.to_string()))?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(tls)),
            port: config.tls_port,
            timeout: config.timeout,
        })
    }

    async fn handshake(&self, host: &str) -> Result<PeerCertificate, CertificateError> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| CertificateError::ServerName(host.to_string()))?;

        let tcp = TcpStream::connect((host, self.port))
            .await
            .map_err(|source| CertificateError::Connect {
                host: host.to_string(),
                port: self.port,
                source,
            })?;

        let stream = self
            .connector
            .connect(server_name, tcp)
            .await
            .map_err(|source| CertificateError::Handshake {
                host: host.to_string(),
                source,
            })?;

        let (_, session) = stream.get_ref();
        let leaf = session
            .peer_certificates()
            .and_then(|chain| chain.first())
            .ok_or(CertificateError::NoCertificate)?;

        parse_certificate(leaf.as_ref())
    }
}

#[async_trait]
impl CertificateFetcher for RustlsCertificateFetcher {
    async fn fetch(&self, host: &str) -> Result<PeerCertificate, CertificateError> {
        tokio::time::timeout(self.timeout, self.handshake(host))
            .await
            .map_err(|_| CertificateError::Timeout(self.timeout))?
    }
}

/// Extract issuer organization and expiry from a DER-encoded certificate.
pub fn parse_certificate(der: &[u8]) -> Result<PeerCertificate, CertificateError> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| CertificateError::Parse(e.to_string()))?;

    let issuer_organization = cert
        .issuer()
        .iter_organization()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string);

    let ts = cert.validity().not_after.timestamp();
    let not_after = DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| CertificateError::Parse(format!("not-after out of range: {ts}")))?;

    Ok(PeerCertificate {
        issuer_organization,
        not_after,
    })
}
