//! URL-shape features computed from the URL string alone.

use crate::record::UrlFeatures;
use regex::Regex;
use std::sync::LazyLock;

/// Characters counted by `num_special_chars`.
const SPECIAL_CHARS: &[char] = &['@', '?', '=', '%', '&'];

static DOTTED_QUAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}").expect("static regex"));

/// Compute the lexical features of a URL that already carries a scheme.
pub fn analyze_url(url: &str) -> UrlFeatures {
    let host = host_portion(url);

    UrlFeatures {
        url_length: url.chars().count() as u32,
        num_dots: url.matches('.').count() as u32,
        num_hyphens: url.matches('-').count() as u32,
        has_ip_in_url: u8::from(DOTTED_QUAD.is_match(host)),
        num_special_chars: url.chars().filter(|c| SPECIAL_CHARS.contains(c)).count() as u32,
        tld_type: tld_of(host),
    }
}

/// Host portion of a URL: authority without scheme, userinfo or port.
pub fn host_portion(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(pos) => &url[pos + 3..],
        None => url,
    };
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(rest);
    let host = authority
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(authority);

    if host.starts_with('[') {
        // IPv6 literal: keep the brackets, drop any port.
        return host.split_once(']').map(|(h, _)| &host[..h.len() + 1]).unwrap_or(host);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

fn tld_of(host: &str) -> String {
    match host.rsplit_once('.') {
        Some((_, tld)) => tld.to_string(),
        None => "unknown".to_string(),
    }
}
