//! Registration trust features: domain age and registrant organization.
//!
//! The creation date and the organization are extracted independently, so a
//! malformed date never hides an organization name and vice versa.

use crate::acquisition::whois::{CreationDate, RegistryLookup, RegistryRecord};
use crate::features::tls::whole_days;
use crate::probe::ProbeOutcome;
use crate::record::RegistryFeatures;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Look up `host` in the registry and derive the trust fields.
pub async fn probe_registry(
    lookup: &dyn RegistryLookup,
    host: &str,
    now: DateTime<Utc>,
) -> ProbeOutcome<RegistryFeatures> {
    match lookup.lookup(host).await {
        Ok(record) => ProbeOutcome::Measured(features_from_record(&record, now)),
        Err(e) => ProbeOutcome::unavailable(e.to_string()),
    }
}

/// Derive registry fields from a record that was retrieved successfully.
pub fn features_from_record(record: &RegistryRecord, now: DateTime<Utc>) -> RegistryFeatures {
    let created = record.creation_date.as_ref().and_then(creation_instant);

    let organization_name = record
        .org
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| record.organization.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string();

    match created {
        Some(created) => RegistryFeatures {
            domain_age_days: whole_days(now - created),
            whois_info_available: 1,
            organization_name,
        },
        None => RegistryFeatures {
            organization_name,
            ..Default::default()
        },
    }
}

/// Normalize a reported creation date to a UTC instant.
///
/// Lists use their first element, text must be `YYYY-MM-DD`, naive timestamps
/// are taken as UTC and zoned ones are converted.
pub fn creation_instant(date: &CreationDate) -> Option<DateTime<Utc>> {
    match date {
        CreationDate::List(values) => values.first().and_then(creation_instant),
        CreationDate::Text(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN).and_utc()),
        CreationDate::Naive(dt) => Some(dt.and_utc()),
        CreationDate::Zoned(dt) => Some(dt.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::whois::LookupError;
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 11, 0, 0, 0).unwrap()
    }

    fn naive(y: i32, m: u32, d: u32) -> CreationDate {
        CreationDate::Naive(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_time(NaiveTime::MIN),
        )
    }

    #[test]
    fn test_list_matches_first_element() {
        let first = naive(2016, 1, 11);
        let list = RegistryRecord {
            creation_date: Some(CreationDate::List(vec![first.clone(), naive(2020, 5, 5)])),
            ..Default::default()
        };
        let single = RegistryRecord {
            creation_date: Some(first),
            ..Default::default()
        };

        let from_list = features_from_record(&list, now());
        let from_single = features_from_record(&single, now());
        assert_eq!(from_list.domain_age_days, from_single.domain_age_days);
        assert_eq!(from_list.domain_age_days, 3653);
        assert_eq!(from_list.whois_info_available, 1);
    }

    #[test]
    fn test_unparsable_text_is_unavailable() {
        let record = RegistryRecord {
            creation_date: Some(CreationDate::Text("sometime in 1999".to_string())),
            organization: Some("Still Extracted Ltd".to_string()),
            ..Default::default()
        };
        let f = features_from_record(&record, now());
        assert_eq!(f.whois_info_available, 0);
        assert_eq!(f.domain_age_days, 0);
        assert_eq!(f.organization_name, "Still Extracted Ltd");
    }

    #[test]
    fn test_text_date_is_parsed() {
        let record = RegistryRecord {
            creation_date: Some(CreationDate::Text("2026-01-01".to_string())),
            ..Default::default()
        };
        let f = features_from_record(&record, now());
        assert_eq!(f.domain_age_days, 10);
        assert_eq!(f.whois_info_available, 1);
    }

    #[test]
    fn test_zoned_date_is_converted_to_utc() {
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        // 2026-01-10 03:00 +05:00 is 2026-01-09 22:00 UTC.
        let created = offset.with_ymd_and_hms(2026, 1, 10, 3, 0, 0).unwrap();
        let record = RegistryRecord {
            creation_date: Some(CreationDate::Zoned(created)),
            ..Default::default()
        };
        assert_eq!(features_from_record(&record, now()).domain_age_days, 1);
    }

    #[test]
    fn test_org_preferred_over_organization() {
        let record = RegistryRecord {
            org: Some("Short Org".to_string()),
            organization: Some("Long Organization".to_string()),
            ..Default::default()
        };
        assert_eq!(features_from_record(&record, now()).organization_name, "Short Org");

        let record = RegistryRecord {
            org: Some(String::new()),
            organization: Some("Long Organization".to_string()),
            ..Default::default()
        };
        assert_eq!(
            features_from_record(&record, now()).organization_name,
            "Long Organization"
        );
    }

    struct FailingLookup;

    #[async_trait]
    impl RegistryLookup for FailingLookup {
        async fn lookup(&self, host: &str) -> Result<RegistryRecord, LookupError> {
            Err(LookupError::NoData(host.to_string()))
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_yields_defaults() {
        let outcome = probe_registry(&FailingLookup, "bad.example", now()).await;
        assert!(!outcome.is_measured());
        let f = outcome.into_features();
        assert_eq!(f.domain_age_days, 0);
        assert_eq!(f.whois_info_available, 0);
        assert_eq!(f.organization_name, "");
    }
}
