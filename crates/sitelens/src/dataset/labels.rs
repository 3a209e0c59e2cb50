//! Input URL lists and positional labeling.

use crate::config::Labeling;
use crate::error::{Result, SiteLensError};
use crate::extractor::normalize_url;
use crate::record::Label;
use std::path::Path;

/// One list entry ready for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledUrl {
    /// Normalized URL, identical to the `Website` key it will be stored under.
    pub url: String,
    pub label: Option<Label>,
}

/// Read a newline-delimited URL list, skipping blank lines. A list with no
/// URLs at all is empty, not an error.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| SiteLensError::io(path, e))?;
    Ok(parse_url_list(&text))
}

/// Split list text into trimmed, non-blank lines.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Attach labels by position: entries `0..n/2` are secure, the rest malicious.
pub fn assign_labels(urls: Vec<String>, labeling: Labeling) -> Vec<LabeledUrl> {
    let half = urls.len() / 2;

    urls.into_iter()
        .enumerate()
        .map(|(i, url)| LabeledUrl {
            url: normalize_url(&url),
            label: match labeling {
                Labeling::Positional if i < half => Some(Label::Secure),
                Labeling::Positional => Some(Label::Malicious),
                Labeling::Unlabeled => None,
            },
        })
        .collect()
}
