//! The fixed-schema feature record and the partial records each probe fills.
//!
//! Every probe owns a disjoint slice of the columns. `FeatureRecord` is the
//! flat union of those slices plus the `Website` key and the optional label,
//! laid out in the column order of the persisted table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names of the output table, in write order.
pub const COLUMNS: &[&str] = &[
    "Website",
    "has_https",
    "ssl_valid",
    "ssl_expiry_days",
    "ssl_issuer",
    "domain_age_days",
    "whois_info_available",
    "organization_name",
    "url_length",
    "num_dots",
    "num_hyphens",
    "has_ip_in_url",
    "num_special_chars",
    "tld_type",
    "num_iframes",
    "num_forms",
    "num_external_links",
    "has_login_keyword",
    "has_privacy_policy",
    "has_contact_page",
    "num_suspicious_keywords",
    "has_hsts_header",
    "has_x_frame_options",
    "has_csp",
    "has_x_content_type_options",
    "secure_label",
];

/// Supervised label attached to a record by the dataset builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    /// Reference set of malicious sites (second half of a labeled list).
    Malicious,
    /// Reference set of secure sites (first half of a labeled list).
    Secure,
}

impl From<Label> for u8 {
    fn from(label: Label) -> u8 {
        match label {
            Label::Malicious => 0,
            Label::Secure => 1,
        }
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Malicious),
            1 => Ok(Label::Secure),
            other => Err(format!("secure_label must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Transport security fields from the TLS certificate probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsFeatures {
    pub has_https: u8,
    pub ssl_valid: u8,
    pub ssl_expiry_days: i64,
    pub ssl_issuer: String,
}

/// Presence flags for the four security response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFeatures {
    pub has_hsts_header: u8,
    pub has_x_frame_options: u8,
    pub has_csp: u8,
    pub has_x_content_type_options: u8,
}

/// Structural and keyword signals from the page body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFeatures {
    pub num_iframes: u32,
    pub num_forms: u32,
    pub num_external_links: u32,
    pub has_login_keyword: u8,
    pub has_privacy_policy: u8,
    pub has_contact_page: u8,
    pub num_suspicious_keywords: u32,
}

/// Registration trust fields from the registry lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryFeatures {
    pub domain_age_days: i64,
    pub whois_info_available: u8,
    pub organization_name: String,
}

/// Lexical URL-shape fields. Always computable, so there is no failure default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlFeatures {
    pub url_length: u32,
    pub num_dots: u32,
    pub num_hyphens: u32,
    pub has_ip_in_url: u8,
    pub num_special_chars: u32,
    pub tld_type: String,
}

/// One row of the dataset: everything known about a single website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "Website")]
    pub website: String,

    pub has_https: u8,
    pub ssl_valid: u8,
    pub ssl_expiry_days: i64,
    pub ssl_issuer: String,

    pub domain_age_days: i64,
    pub whois_info_available: u8,
    pub organization_name: String,

    pub url_length: u32,
    pub num_dots: u32,
    pub num_hyphens: u32,
    pub has_ip_in_url: u8,
    pub num_special_chars: u32,
    pub tld_type: String,

    pub num_iframes: u32,
    pub num_forms: u32,
    pub num_external_links: u32,
    pub has_login_keyword: u8,
    pub has_privacy_policy: u8,
    pub has_contact_page: u8,
    pub num_suspicious_keywords: u32,

    pub has_hsts_header: u8,
    pub has_x_frame_options: u8,
    pub has_csp: u8,
    pub has_x_content_type_options: u8,

    #[serde(default)]
    pub secure_label: Option<Label>,
}

impl FeatureRecord {
    /// Merge the disjoint probe outputs into one record.
    pub fn assemble(
        website: impl Into<String>,
        tls: TlsFeatures,
        registry: RegistryFeatures,
        url: UrlFeatures,
        content: ContentFeatures,
        headers: HeaderFeatures,
        secure_label: Option<Label>,
    ) -> Self {
        Self {
            website: website.into(),
            has_https: tls.has_https,
            ssl_valid: tls.ssl_valid,
            ssl_expiry_days: tls.ssl_expiry_days,
            ssl_issuer: tls.ssl_issuer,
            domain_age_days: registry.domain_age_days,
            whois_info_available: registry.whois_info_available,
            organization_name: registry.organization_name,
            url_length: url.url_length,
            num_dots: url.num_dots,
            num_hyphens: url.num_hyphens,
            has_ip_in_url: url.has_ip_in_url,
            num_special_chars: url.num_special_chars,
            tld_type: url.tld_type,
            num_iframes: content.num_iframes,
            num_forms: content.num_forms,
            num_external_links: content.num_external_links,
            has_login_keyword: content.has_login_keyword,
            has_privacy_policy: content.has_privacy_policy,
            has_contact_page: content.has_contact_page,
            num_suspicious_keywords: content.num_suspicious_keywords,
            has_hsts_header: headers.has_hsts_header,
            has_x_frame_options: headers.has_x_frame_options,
            has_csp: headers.has_csp,
            has_x_content_type_options: headers.has_x_content_type_options,
            secure_label,
        }
    }
}
