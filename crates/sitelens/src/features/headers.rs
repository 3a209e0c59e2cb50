//! Presence of security response headers.

use crate::acquisition::http_client::HttpClient;
use crate::probe::ProbeOutcome;
use crate::record::HeaderFeatures;
use reqwest::header::HeaderMap;

/// GET the URL and flag the four security headers.
pub async fn probe_headers(client: &HttpClient, url: &str) -> ProbeOutcome<HeaderFeatures> {
    match client.get(url).await {
        Ok(resp) => ProbeOutcome::Measured(header_features(&resp.headers)),
        Err(e) => ProbeOutcome::unavailable(e.to_string()),
    }
}

/// Header names are matched case-insensitively.
pub fn header_features(headers: &HeaderMap) -> HeaderFeatures {
    let flag = |name: &str| u8::from(headers.contains_key(name));

    HeaderFeatures {
        has_hsts_header: flag("strict-transport-security"),
        has_x_frame_options: flag("x-frame-options"),
        has_csp: flag("content-security-policy"),
        has_x_content_type_options: flag("x-content-type-options"),
    }
}
