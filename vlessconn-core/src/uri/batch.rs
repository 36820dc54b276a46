//! Batch parsing of pasted link lists.

use crate::error::{UriError, UriResult};

use super::parser::{ParsedUri, parse};

/// A link that failed to parse during a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLink {
    /// The original text
    pub link: String,
    /// Why it was rejected
    pub error: UriError,
}

/// Outcome of a batch parse, split into successes and failures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchParseResult {
    /// Successfully parsed links with their original text, in input order
    pub parsed: Vec<(String, ParsedUri)>,
    /// Links that failed, in input order
    pub skipped: Vec<SkippedLink>,
}

impl BatchParseResult {
    /// Returns the number of links processed
    #[must_use]
    pub fn total_processed(&self) -> usize {
        self.parsed.len() + self.skipped.len()
    }

    /// Returns true if any link was rejected
    #[must_use]
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Returns a summary string of the batch
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Parsed: {}, Skipped: {}",
            self.parsed.len(),
            self.skipped.len()
        )
    }
}

/// Parses every link, pairing each input with its result
///
/// Input order is preserved.
pub fn parse_batch<I, S>(links: I) -> Vec<(String, UriResult<ParsedUri>)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let _span =
        crate::trace_operation_debug!(crate::tracing::span_names::URI_BATCH_PARSE).entered();
    links
        .into_iter()
        .map(|link| {
            let link = link.as_ref();
            (link.to_string(), parse(link))
        })
        .collect()
}

/// Parses every link and keeps only the successes
///
/// Failures are dropped silently; the relative order of the successes
/// matches the input.
pub fn parse_batch_valid<I, S>(links: I) -> Vec<(String, ParsedUri)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_batch(links)
        .into_iter()
        .filter_map(|(link, result)| result.ok().map(|parsed| (link, parsed)))
        .collect()
}

/// Parses every link and reports successes and failures separately
pub fn parse_batch_report<I, S>(links: I) -> BatchParseResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = BatchParseResult::default();
    for (link, outcome) in parse_batch(links) {
        match outcome {
            Ok(parsed) => result.parsed.push((link, parsed)),
            Err(error) => result.skipped.push(SkippedLink { link, error }),
        }
    }
    tracing::debug!(
        parsed = result.parsed.len(),
        skipped = result.skipped.len(),
        "Batch parse finished"
    );
    result
}

/// Splits a pasted block of text into candidate links
///
/// Lines are trimmed; blank lines and lines starting with `#` are dropped.
#[must_use]
pub fn split_links(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}
