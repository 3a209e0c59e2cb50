//! `sitelens build`: resumable labeled dataset construction.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sitelens::{BuildConfig, BuildReport, DatasetBuilder, FeatureExtractor, OutputTable, ProbeConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

/// Exit status for a build stopped by Ctrl-C (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// The build was stopped before every entry was processed.
#[derive(Debug, Error)]
#[error("build interrupted; flushed rows are kept, rerun the same command to resume")]
pub struct Interrupted;

/// Process exit status for a failed command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.is::<Interrupted>() {
        INTERRUPTED_EXIT_CODE
    } else {
        1
    }
}

/// Run the build command.
pub async fn run(
    input: &Path,
    output_path: &Path,
    probe: &ProbeConfig,
    build: BuildConfig,
) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let extractor = FeatureExtractor::new(probe).context("failed to set up probes")?;
    let builder = DatasetBuilder::new(Arc::new(extractor), OutputTable::new(output_path), build)
        .with_progress(progress_bar());

    let report = tokio::select! {
        report = builder.build_from_file(input) => {
            report.with_context(|| format!("build into {} failed", output_path.display()))?
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; flushed rows are kept and the next run resumes from them");
            if !output::is_quiet() {
                eprintln!("  {} Interrupted. Rerun the same command to resume.", s.warn_sym());
            }
            return Err(Interrupted.into());
        }
    };

    if !output::is_quiet() {
        print_summary(&s, &report, output_path, start.elapsed());
    }
    Ok(())
}

fn progress_bar() -> ProgressBar {
    if output::is_quiet() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} {wide_msg:.dim}")
            .unwrap()
            .tick_chars("\u{25b8}\u{25b9}\u{25b8}\u{25b9}\u{25b8}")
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn print_summary(s: &Styled, report: &BuildReport, output_path: &Path, elapsed: Duration) {
    let sym = if report.failed == 0 {
        s.ok_sym()
    } else {
        s.warn_sym()
    };
    eprintln!(
        "  {sym} Build complete in {:.1}s",
        elapsed.as_secs_f64()
    );
    eprintln!("  {}", s.bold(&output_path.display().to_string()));
    output::print_stat("Loaded:", report.loaded);
    output::print_stat("Skipped:", s.dim(&report.skipped.to_string()));
    output::print_stat("Extracted:", s.green(&report.extracted.to_string()));
    let failed = report.failed.to_string();
    output::print_stat(
        "Failed:",
        if report.failed == 0 {
            failed
        } else {
            s.red(&failed)
        },
    );
    output::print_stat("Flushes:", report.flushes);
    output::print_stat("Rows:", report.rows);
}
