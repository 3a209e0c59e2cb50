//! The batch dataset builder.
//!
//! Entries are processed strictly one after another. Keys already present in
//! the output table are skipped, new records accumulate in a pending batch
//! that is flushed every `batch_size` records and once more at the end.
//! Interrupting a run loses at most the pending batch, and those entries are
//! simply fetched again by the next run.

use crate::config::BuildConfig;
use crate::dataset::labels::{assign_labels, read_url_list, LabeledUrl};
use crate::dataset::table::OutputTable;
use crate::error::Result;
use crate::extractor::Extractor;
use crate::record::FeatureRecord;
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Counters for one builder run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Entries considered after labeling and the optional limit.
    pub loaded: usize,
    /// Entries already in the table at startup.
    pub skipped: usize,
    pub extracted: usize,
    pub failed: usize,
    pub flushes: usize,
    /// Rows in the table after the last flush.
    pub rows: usize,
}

pub struct DatasetBuilder {
    extractor: Arc<dyn Extractor>,
    table: OutputTable,
    config: BuildConfig,
    progress: ProgressBar,
}

impl DatasetBuilder {
    pub fn new(extractor: Arc<dyn Extractor>, table: OutputTable, config: BuildConfig) -> Self {
        Self {
            extractor,
            table,
            config,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on the given bar instead of a hidden one.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn table(&self) -> &OutputTable {
        &self.table
    }

    /// Read a URL list file, label it and run the build.
    pub async fn build_from_file(&self, input: &Path) -> Result<BuildReport> {
        let urls = read_url_list(input)?;
        if urls.len() < self.config.min_expected_urls {
            warn!(
                found = urls.len(),
                expected = self.config.min_expected_urls,
                "input list is shorter than expected, proceeding anyway"
            );
        }

        let mut entries = assign_labels(urls, self.config.labeling);
        if let Some(limit) = self.config.limit {
            entries.truncate(limit);
        }
        info!(entries = entries.len(), input = %input.display(), "loaded URL list");

        self.run(&entries).await
    }

    /// Process `entries` in order against the current table.
    pub async fn run(&self, entries: &[LabeledUrl]) -> Result<BuildReport> {
        let done = self.table.load_keys()?;
        if !done.is_empty() {
            info!(done = done.len(), "resuming from existing table");
        }

        let mut report = BuildReport {
            loaded: entries.len(),
            rows: done.len(),
            ..Default::default()
        };
        let mut pending: Vec<FeatureRecord> = Vec::with_capacity(self.config.batch_size);
        self.progress.set_length(entries.len() as u64);

        for entry in entries {
            self.progress.inc(1);
            if done.contains(&entry.url) {
                report.skipped += 1;
                continue;
            }

            self.progress.set_message(entry.url.clone());
            match self.extractor.extract(&entry.url, entry.label).await {
                Ok(record) => {
                    pending.push(record);
                    report.extracted += 1;
                }
                Err(e) => {
                    error!(url = %entry.url, error = %e, "failed to extract features");
                    report.failed += 1;
                }
            }

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            if pending.len() >= self.config.batch_size {
                self.flush(&mut pending, &mut report)?;
            }
        }

        if !pending.is_empty() {
            self.flush(&mut pending, &mut report)?;
        }
        self.progress.finish_and_clear();

        info!(
            extracted = report.extracted,
            skipped = report.skipped,
            failed = report.failed,
            rows = report.rows,
            "build finished"
        );
        Ok(report)
    }

    fn flush(&self, pending: &mut Vec<FeatureRecord>, report: &mut BuildReport) -> Result<()> {
        report.rows = self.table.upsert(pending)?;
        report.flushes += 1;
        pending.clear();
        Ok(())
    }
}
