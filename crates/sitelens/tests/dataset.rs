//! End-to-end dataset builds through the real aggregator with injected
//! TLS and registry capabilities.

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta, Utc};
use sitelens::acquisition::http_client::HttpClient;
use sitelens::acquisition::tls::{CertificateError, CertificateFetcher, PeerCertificate};
use sitelens::acquisition::whois::{CreationDate, LookupError, RegistryLookup, RegistryRecord};
use sitelens::{
    BuildConfig, DatasetBuilder, FeatureExtractor, Label, Labeling, OutputTable, ProbeConfig,
    COLUMNS,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const GOOD: &str = "good.invalid";

/// Only the good host completes a trusted handshake.
struct GoodHostOnly;

#[async_trait]
impl CertificateFetcher for GoodHostOnly {
    async fn fetch(&self, host: &str) -> Result<PeerCertificate, CertificateError> {
        if host == GOOD {
            Ok(PeerCertificate {
                issuer_organization: Some("Good CA".to_string()),
                not_after: Utc::now() + TimeDelta::days(30) + TimeDelta::hours(1),
            })
        } else {
            Err(CertificateError::Handshake {
                host: host.to_string(),
                source: std::io::Error::other("certificate verify failed"),
            })
        }
    }
}

/// Only the good host has a registration record.
struct GoodHostRegistry;

#[async_trait]
impl RegistryLookup for GoodHostRegistry {
    async fn lookup(&self, host: &str) -> Result<RegistryRecord, LookupError> {
        if host != GOOD {
            return Err(LookupError::NoData(host.to_string()));
        }
        let created = NaiveDate::from_ymd_opt(2012, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Ok(RegistryRecord {
            creation_date: Some(CreationDate::Naive(created)),
            org: None,
            organization: Some("Good Org".to_string()),
        })
    }
}

fn builder(output: &Path, build: BuildConfig) -> DatasetBuilder {
    let probe = ProbeConfig::default().with_timeout(Duration::from_secs(2));
    let extractor = FeatureExtractor::with_capabilities(
        HttpClient::new(&probe).unwrap(),
        Arc::new(GoodHostOnly),
        Arc::new(GoodHostRegistry),
    );
    DatasetBuilder::new(Arc::new(extractor), OutputTable::new(output), build)
}

fn quick() -> BuildConfig {
    BuildConfig::default()
        .with_delay(Duration::ZERO)
        .with_min_expected_urls(0)
}

#[tokio::test]
async fn test_two_site_build_and_resume() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("urls.txt");
    let output = dir.path().join("dataset.csv");
    std::fs::write(&input, format!("{GOOD}\nbad.invalid\n")).unwrap();

    let report = builder(&output, quick()).build_from_file(&input).await.unwrap();
    assert_eq!(report.extracted, 2);
    assert_eq!(report.flushes, 1);

    let header = std::fs::read_to_string(&output)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string();
    assert_eq!(header, COLUMNS.join(","));

    let rows = OutputTable::new(&output).load().unwrap();
    assert_eq!(rows.len(), 2);

    let good = &rows[0];
    assert_eq!(good.website, "https://good.invalid");
    assert_eq!(good.secure_label, Some(Label::Secure));
    assert_eq!(good.ssl_valid, 1);
    assert_eq!(good.ssl_expiry_days, 30);
    assert_eq!(good.ssl_issuer, "Good CA");
    assert_eq!(good.whois_info_available, 1);
    assert_eq!(good.organization_name, "Good Org");
    assert!(good.domain_age_days > 0);

    let bad = &rows[1];
    assert_eq!(bad.website, "https://bad.invalid");
    assert_eq!(bad.secure_label, Some(Label::Malicious));
    assert_eq!(bad.ssl_valid, 0);
    assert_eq!(bad.ssl_issuer, "");
    assert_eq!(bad.domain_age_days, 0);
    assert_eq!(bad.whois_info_available, 0);

    let before = std::fs::read_to_string(&output).unwrap();
    let again = builder(&output, quick()).build_from_file(&input).await.unwrap();
    assert_eq!(again.skipped, 2);
    assert_eq!(again.extracted, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), before);
}

#[tokio::test]
async fn test_unlabeled_build_leaves_label_column_empty() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("urls.txt");
    let output = dir.path().join("features.csv");
    std::fs::write(&input, format!("{GOOD}\n")).unwrap();

    builder(&output, quick().with_labeling(Labeling::Unlabeled))
        .build_from_file(&input)
        .await
        .unwrap();

    let rows = OutputTable::new(&output).load().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].secure_label, None);
    assert_eq!(rows[0].ssl_valid, 1);
}

#[tokio::test]
async fn test_missing_input_list_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = builder(&dir.path().join("out.csv"), quick())
        .build_from_file(&dir.path().join("absent.txt"))
        .await;

    assert!(matches!(result, Err(sitelens::SiteLensError::Io { .. })));
    assert!(!dir.path().join("out.csv").exists());
}
