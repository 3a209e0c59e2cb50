//! `sitelens extract <url>`: features for a single website.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use sitelens::{Extractor, FeatureExtractor, Label, ProbeConfig};
use std::time::Instant;

/// Run the extract command and print the record as JSON on stdout.
pub async fn run(url: &str, label: Option<u8>, config: &ProbeConfig) -> Result<()> {
    let s = Styled::new();
    let label = label
        .map(Label::try_from)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let extractor = FeatureExtractor::new(config).context("failed to set up probes")?;
    let start = Instant::now();
    let record = extractor
        .extract(url, label)
        .await
        .with_context(|| format!("failed to extract features for {url}"))?;

    output::print_json(&serde_json::to_value(&record)?);

    if !output::is_quiet() {
        eprintln!(
            "  {} {} {}",
            s.ok_sym(),
            s.bold(&record.website),
            s.dim(&format!("({:.1}s)", start.elapsed().as_secs_f64()))
        );
    }
    Ok(())
}
