//! The persisted output table: a CSV file keyed by `Website`.
//!
//! Every flush reads the whole table, merges the new batch with
//! upsert-by-key semantics and rewrites the file. The rewrite goes through a
//! sibling temporary file so an interrupted flush leaves the previous table
//! intact.

use crate::error::{Result, SiteLensError};
use crate::record::FeatureRecord;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle to the CSV table at a fixed path.
#[derive(Debug, Clone)]
pub struct OutputTable {
    path: PathBuf,
}

impl OutputTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// All rows currently persisted, in file order. A missing table is empty.
    pub fn load(&self) -> Result<Vec<FeatureRecord>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| SiteLensError::table(&self.path, e))?;
        reader
            .deserialize()
            .collect::<std::result::Result<Vec<FeatureRecord>, _>>()
            .map_err(|e| SiteLensError::table(&self.path, e))
    }

    /// Keys already persisted; this is the builder's resume set.
    pub fn load_keys(&self) -> Result<HashSet<String>> {
        Ok(self.load()?.into_iter().map(|r| r.website).collect())
    }

    /// Merge `batch` into the table. A row whose key reappears is replaced by
    /// the newest record and moves to that record's position.
    pub fn upsert(&self, batch: &[FeatureRecord]) -> Result<usize> {
        let existing = self.load()?;
        let merged = upsert_by_key(existing, batch.iter().cloned());
        self.write_all(&merged)?;

        info!(
            path = %self.path.display(),
            batch = batch.len(),
            rows = merged.len(),
            "flushed batch to table"
        );
        Ok(merged.len())
    }

    fn write_all(&self, rows: &[FeatureRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SiteLensError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        {
            let mut writer =
                csv::Writer::from_path(&tmp).map_err(|e| SiteLensError::table(&tmp, e))?;
            for row in rows {
                writer
                    .serialize(row)
                    .map_err(|e| SiteLensError::table(&tmp, e))?;
            }
            writer
                .flush()
                .map_err(|e| SiteLensError::io(&tmp, e))?;
        }

        std::fs::rename(&tmp, &self.path).map_err(|e| SiteLensError::io(&self.path, e))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Concatenate `existing` and `incoming`, keeping only the last row per key.
pub fn upsert_by_key(
    existing: Vec<FeatureRecord>,
    incoming: impl IntoIterator<Item = FeatureRecord>,
) -> Vec<FeatureRecord> {
    let combined: Vec<FeatureRecord> = existing.into_iter().chain(incoming).collect();

    let mut seen = HashSet::new();
    let mut kept: Vec<FeatureRecord> = combined
        .into_iter()
        .rev()
        .filter(|row| seen.insert(row.website.clone()))
        .collect();
    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::lexical::analyze_url;
    use crate::record::{
        ContentFeatures, HeaderFeatures, Label, RegistryFeatures, TlsFeatures,
    };

    fn record(url: &str, ssl_valid: u8, label: Option<Label>) -> FeatureRecord {
        FeatureRecord::assemble(
            url,
            TlsFeatures {
                has_https: ssl_valid,
                ssl_valid,
                ssl_expiry_days: 30,
                ssl_issuer: "Issuer, Inc.".to_string(),
            },
            RegistryFeatures::default(),
            analyze_url(url),
            ContentFeatures::default(),
            HeaderFeatures::default(),
            label,
        )
    }

    #[test]
    fn test_missing_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = OutputTable::new(dir.path().join("absent.csv"));
        assert!(table.load().unwrap().is_empty());
        assert!(table.load_keys().unwrap().is_empty());
    }

    #[test]
    fn test_first_flush_creates_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = OutputTable::new(dir.path().join("nested/out.csv"));

        let rows = table
            .upsert(&[
                record("https://a.example", 1, Some(Label::Secure)),
                record("https://b.example", 0, Some(Label::Malicious)),
            ])
            .unwrap();

        assert_eq!(rows, 2);
        let loaded = table.load().unwrap();
        assert_eq!(loaded[0].website, "https://a.example");
        assert_eq!(loaded[0].ssl_issuer, "Issuer, Inc.");
        assert_eq!(loaded[1].secure_label, Some(Label::Malicious));
        assert!(!dir.path().join("nested/out.csv.tmp").exists());
    }

    #[test]
    fn test_upsert_replaces_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let table = OutputTable::new(dir.path().join("out.csv"));
        table
            .upsert(&[
                record("https://a.example", 0, Some(Label::Secure)),
                record("https://b.example", 0, Some(Label::Malicious)),
            ])
            .unwrap();

        table
            .upsert(&[record("https://a.example", 1, Some(Label::Secure))])
            .unwrap();

        let loaded = table.load().unwrap();
        assert_eq!(loaded.len(), 2);
        let a: Vec<_> = loaded
            .iter()
            .filter(|r| r.website == "https://a.example")
            .collect();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].ssl_valid, 1);
        // Replaced row moves to the position of its newest write.
        assert_eq!(loaded[1].website, "https://a.example");
    }

    #[test]
    fn test_duplicate_keys_within_batch_keep_last() {
        let merged = upsert_by_key(
            Vec::new(),
            vec![
                record("https://a.example", 0, None),
                record("https://a.example", 1, None),
            ],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].ssl_valid, 1);
    }

    #[test]
    fn test_unlabeled_rows_round_trip_with_empty_label() {
        let dir = tempfile::tempdir().unwrap();
        let table = OutputTable::new(dir.path().join("out.csv"));
        table.upsert(&[record("https://a.example", 1, None)]).unwrap();

        let text = std::fs::read_to_string(table.path()).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with(','));
        assert_eq!(table.load().unwrap()[0].secure_label, None);
    }

    #[test]
    fn test_corrupt_table_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "Website,has_https\nhttps://a.example,not-a-number\n").unwrap();

        let table = OutputTable::new(&path);
        assert!(matches!(table.load(), Err(SiteLensError::Table { .. })));
    }
}
