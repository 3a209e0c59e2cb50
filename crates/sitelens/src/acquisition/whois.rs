//! WHOIS registry lookups (RFC 3912).
//!
//! A query starts at the IANA root server, follows the `refer:` line to the
//! TLD registry and, for thin registries, one more hop to the registrar's
//! server. Field values from later hops override earlier ones.

use crate::config::ProbeConfig;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Root server every lookup starts from.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// Referral hops followed after the root answer.
const MAX_REFERRALS: usize = 2;

const CREATION_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "registered on",
    "registration time",
    "registered",
    "domain registration date",
    "domain name commencement date",
];

const ORG_KEYS: &[&str] = &["org", "registrant org"];

const ORGANIZATION_KEYS: &[&str] = &[
    "registrant organization",
    "registrant organisation",
    "organization",
    "organisation",
];

const REFERRAL_KEYS: &[&str] = &["refer", "whois", "registrar whois server"];

/// Creation date as a registry reports it, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationDate {
    /// Timestamp carrying an explicit offset.
    Zoned(DateTime<FixedOffset>),
    /// Timestamp without timezone information.
    Naive(NaiveDateTime),
    /// Raw text that no known date layout matched.
    Text(String),
    /// Several values; the first one is authoritative.
    List(Vec<CreationDate>),
}

/// The registration fields the registry probe reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryRecord {
    pub creation_date: Option<CreationDate>,
    pub org: Option<String>,
    pub organization: Option<String>,
}

impl RegistryRecord {
    fn merge(&mut self, newer: RegistryRecord) {
        if newer.creation_date.is_some() {
            self.creation_date = newer.creation_date;
        }
        if newer.org.is_some() {
            self.org = newer.org;
        }
        if newer.organization.is_some() {
            self.organization = newer.organization;
        }
    }

    fn is_empty(&self) -> bool {
        self.creation_date.is_none() && self.org.is_none() && self.organization.is_none()
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("connect to {server} failed: {source}")]
    Connect {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("query to {server} failed: {source}")]
    Io {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("no registration data for {0}")]
    NoData(String),
}

/// Capability to fetch the registration record for a host.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn lookup(&self, host: &str) -> Result<RegistryRecord, LookupError>;
}

/// Plain-TCP WHOIS client.
pub struct WhoisClient {
    root_server: String,
    port: u16,
    timeout: Duration,
}

impl WhoisClient {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            root_server: IANA_WHOIS_SERVER.to_string(),
            port: config.whois_port,
            timeout: config.timeout,
        }
    }

    /// Start lookups at a different server.
    pub fn with_root_server(mut self, server: impl Into<String>) -> Self {
        self.root_server = server.into();
        self
    }

    async fn query(&self, server: &str, domain: &str) -> Result<String, LookupError> {
        let exchange = async {
            let mut stream = TcpStream::connect((server, self.port))
                .await
                .map_err(|source| LookupError::Connect {
                    server: server.to_string(),
                    source,
                })?;

            let io_err = |source| LookupError::Io {
                server: server.to_string(),
                source,
            };
            stream
                .write_all(format!("{domain}\r\n").as_bytes())
                .await
                .map_err(io_err)?;

            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await.map_err(io_err)?;
            Ok::<_, LookupError>(String::from_utf8_lossy(&buf).into_owned())
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl RegistryLookup for WhoisClient {
    async fn lookup(&self, host: &str) -> Result<RegistryRecord, LookupError> {
        let domain = registrable_domain(host);
        let mut server = self.root_server.clone();
        let mut record = RegistryRecord::default();

        for hop in 0..=MAX_REFERRALS {
            let text = match self.query(&server, &domain).await {
                Ok(text) => text,
                Err(e) if hop > 0 => {
                    debug!(server = %server, domain = %domain, error = %e, "referral query failed");
                    break;
                }
                Err(e) => return Err(e),
            };
            let response = parse_whois_response(&text);

            let referral = response
                .referral
                .filter(|next| !next.eq_ignore_ascii_case(&server));

            // The root answer describes the TLD, not the domain; only its
            // referral is used when one is given.
            if hop > 0 || referral.is_none() {
                record.merge(response.record);
            }

            match referral {
                Some(next) if hop < MAX_REFERRALS => server = next,
                _ => break,
            }
        }

        if record.is_empty() {
            return Err(LookupError::NoData(domain));
        }
        Ok(record)
    }
}

/// One parsed WHOIS answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisResponse {
    pub record: RegistryRecord,
    /// Next server to ask, if the answer points elsewhere.
    pub referral: Option<String>,
}

/// Parse `key: value` lines of a WHOIS answer.
pub fn parse_whois_response(text: &str) -> WhoisResponse {
    let mut created = Vec::new();
    let mut response = WhoisResponse::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if CREATION_KEYS.contains(&key.as_str()) {
            created.push(parse_date_value(value));
        } else if ORG_KEYS.contains(&key.as_str()) {
            response.record.org.get_or_insert_with(|| value.to_string());
        } else if ORGANIZATION_KEYS.contains(&key.as_str()) {
            response
                .record
                .organization
                .get_or_insert_with(|| value.to_string());
        } else if REFERRAL_KEYS.contains(&key.as_str()) && response.referral.is_none() {
            let server = value
                .trim_start_matches("http://")
                .trim_start_matches("https://")
                .trim_end_matches('/');
            if !server.is_empty() {
                response.referral = Some(server.to_string());
            }
        }
    }

    response.record.creation_date = match created.len() {
        0 => None,
        1 => created.pop(),
        _ => Some(CreationDate::List(created)),
    };
    response
}

/// Interpret a registry date string, keeping it as text when no layout fits.
pub fn parse_date_value(raw: &str) -> CreationDate {
    const DATETIME_LAYOUTS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y.%m.%d %H:%M:%S",
        "%d-%b-%Y %H:%M:%S",
        "%d.%m.%Y %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%d.%m.%Y", "%Y/%m/%d", "%Y%m%d"];

    let value = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return CreationDate::Zoned(dt);
    }

    let naive = value
        .strip_suffix(" UTC")
        .or_else(|| value.strip_suffix(" GMT"))
        .or_else(|| value.strip_suffix('Z'))
        .unwrap_or(value)
        .trim();

    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, layout) {
            return CreationDate::Naive(dt);
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(naive, layout) {
            return CreationDate::Naive(date.and_time(NaiveTime::MIN));
        }
    }

    CreationDate::Text(value.to_string())
}

/// Reduce a host name to the domain a registry knows about, using the
/// Public Suffix List.
///
/// `www.example.com` becomes `example.com`, `shop.example.ltd.uk` becomes
/// `example.ltd.uk`. IP addresses and bare suffixes pass through.
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    if host.parse::<std::net::IpAddr>().is_ok() {
        return host;
    }

    match psl::domain_str(&host) {
        Some(domain) => domain.to_string(),
        None => host,
    }
}
