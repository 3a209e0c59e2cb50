//! Page-content risk signals: embedded frames, forms, outbound links and
//! keyword hits in the raw HTML.

use crate::acquisition::http_client::HttpClient;
use crate::probe::ProbeOutcome;
use crate::record::ContentFeatures;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Phrases summed into `num_suspicious_keywords`.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "malware",
    "phishing",
    "click here",
    "free money",
    "adult",
    "xxx",
];

const LOGIN_KEYWORDS: &[&str] = &["login", "signin", "account"];

static IFRAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("iframe").expect("static selector"));
static FORM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("form").expect("static selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// GET the URL and analyze whatever body comes back, regardless of status.
pub async fn probe_content(client: &HttpClient, url: &str) -> ProbeOutcome<ContentFeatures> {
    let page_url = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => return ProbeOutcome::unavailable(format!("unparsable URL: {e}")),
    };

    match client.get(url).await {
        Ok(resp) => ProbeOutcome::Measured(analyze_html(&resp.body, &page_url)),
        Err(e) => ProbeOutcome::unavailable(e.to_string()),
    }
}

/// Compute content features for an HTML document fetched from `page_url`.
pub fn analyze_html(html: &str, page_url: &Url) -> ContentFeatures {
    let document = Html::parse_document(html);
    let page_host = page_url.host_str();

    let num_external_links = document
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .filter(|link| link.host_str().is_some_and(|host| Some(host) != page_host))
        .count();

    let text = html.to_lowercase();
    let num_suspicious_keywords: usize = SUSPICIOUS_KEYWORDS
        .iter()
        .map(|kw| text.matches(kw).count())
        .sum();

    ContentFeatures {
        num_iframes: document.select(&IFRAME).count() as u32,
        num_forms: document.select(&FORM).count() as u32,
        num_external_links: num_external_links as u32,
        has_login_keyword: u8::from(LOGIN_KEYWORDS.iter().any(|kw| text.contains(kw))),
        has_privacy_policy: u8::from(text.contains("privacy")),
        has_contact_page: u8::from(text.contains("contact")),
        num_suspicious_keywords: num_suspicious_keywords as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PHISHY_PAGE: &str = r#"<html><body>
        <h1>Free Money! CLICK HERE</h1>
        <iframe src="https://ads.tracker.test/frame"></iframe>
        <iframe src="/local"></iframe>
        <form action="/steal"><input name="account"></form>
        <a href="https://evil.test/x">prize</a>
        <a href="//cdn.other.test/lib.js">cdn</a>
        <a href="/about">about</a>
        <a href="https://shop.example.com/cart">same host</a>
        <a href="mailto:someone@shop.example.com">mail</a>
        <p>click here for free money, no malware, no phishing</p>
    </body></html>"#;

    #[test]
    fn test_analyze_phishy_page() {
        let page = Url::parse("https://shop.example.com/").unwrap();
        let f = analyze_html(PHISHY_PAGE, &page);

        assert_eq!(f.num_iframes, 2);
        assert_eq!(f.num_forms, 1);
        assert_eq!(f.num_external_links, 2);
        assert_eq!(f.has_login_keyword, 1);
        assert_eq!(f.has_privacy_policy, 0);
        assert_eq!(f.has_contact_page, 0);
        // free money x2, click here x2, malware, phishing
        assert_eq!(f.num_suspicious_keywords, 6);
    }

    #[test]
    fn test_analyze_clean_page() {
        let html = r#"<html><body><a href="/privacy">Privacy Policy</a><a href="/contact-us">Contact</a></body></html>"#;
        let page = Url::parse("https://good.example/").unwrap();
        let f = analyze_html(html, &page);

        assert_eq!(f.num_external_links, 0);
        assert_eq!(f.has_privacy_policy, 1);
        assert_eq!(f.has_contact_page, 1);
        assert_eq!(f.has_login_keyword, 0);
        assert_eq!(f.num_suspicious_keywords, 0);
    }

    #[tokio::test]
    async fn test_probe_content_against_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<form></form><a href="https://elsewhere.test/">x</a><p>Sign in to your account</p>"#,
            ))
            .mount(&server)
            .await;

        let client = HttpClient::new(&ProbeConfig::default()).unwrap();
        let f = probe_content(&client, &format!("{}/", server.uri()))
            .await
            .into_features();
        assert_eq!(f.num_forms, 1);
        assert_eq!(f.num_external_links, 1);
        assert_eq!(f.has_login_keyword, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_zeroes() {
        let client = HttpClient::new(&ProbeConfig::default()).unwrap();
        let outcome = probe_content(&client, "http://127.0.0.1:1/").await;
        assert_eq!(outcome.into_features(), ContentFeatures::default());
    }
}
