//! Transport security features from the host's TLS certificate.

use crate::acquisition::tls::{CertificateFetcher, PeerCertificate};
use crate::probe::ProbeOutcome;
use crate::record::TlsFeatures;
use chrono::{DateTime, TimeDelta, Utc};

/// Probe the certificate of `host`. Only `https` URLs are probed.
pub async fn probe_tls(
    fetcher: &dyn CertificateFetcher,
    host: &str,
    url: &str,
    now: DateTime<Utc>,
) -> ProbeOutcome<TlsFeatures> {
    if !is_secure_scheme(url) {
        return ProbeOutcome::unavailable("not an https URL");
    }

    match fetcher.fetch(host).await {
        Ok(cert) => ProbeOutcome::Measured(features_from_certificate(&cert, now)),
        Err(e) => ProbeOutcome::unavailable(e.to_string()),
    }
}

/// Fields for a successfully retrieved certificate.
pub fn features_from_certificate(cert: &PeerCertificate, now: DateTime<Utc>) -> TlsFeatures {
    TlsFeatures {
        has_https: 1,
        ssl_valid: 1,
        ssl_expiry_days: whole_days(cert.not_after - now),
        ssl_issuer: cert.issuer_organization.clone().unwrap_or_default(),
    }
}

/// Whole days in a span, rounded toward negative infinity.
pub fn whole_days(delta: TimeDelta) -> i64 {
    delta.num_seconds().div_euclid(86_400)
}

fn is_secure_scheme(url: &str) -> bool {
    url.get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("https://"))
}
