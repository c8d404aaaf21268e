//! Test log parsing.
//!
//! This module turns the captured console output of a test run into
//! [`TestResultCounts`]. Test runners print their summaries in many
//! different shapes, so parsing is split into independent [`Extractor`]s,
//! one per output dialect, that a [`LogParser`] runs over the whole log.
//!
//! # Architecture
//!
//! ```text
//!  raw log text
//!       │
//!       ▼
//!  strip_ansi()              remove terminal escape sequences
//!       │
//!       ▼
//!  crash signatures?  ─yes─► None   (strict mode only)
//!       │ no
//!       ▼
//!  every Extractor::extract() ──► Some(counts) / None
//!       │
//!       ▼
//!  sum of all Some(..)  ─────► Some(total) or None if nothing matched
//! ```
//!
//! # Built-in Dialects
//!
//! | Extractor | Runner |
//! |-----------|--------|
//! | [`pytest::PytestSummary`] | pytest `==== 3 passed in 0.1s ====` |
//! | [`pytest::PytestSugarSummary`] | pytest-sugar `Results (0.12s):` |
//! | [`zope::ZopeSummary`] | zope.testrunner |
//! | [`unittest::UnittestSummary`] | unittest and twisted trial |
//! | [`stestr::StestrSummary`] | stestr |
//! | [`pyyaml::PyyamlSummary`] | PyYAML's test runner |
//! | [`numpy::NumpySummary`] | numpy's runner |
//!
//! Every extractor runs on every log and all hits are summed. In practice a
//! well-formed log matches a single dialect; a log that matches two is
//! double counted.
//!
//! # Example
//!
//! ```
//! use libtester::parser::LogParser;
//! use libtester::TestResultCounts;
//!
//! let parser = LogParser::new()?;
//! let counts = parser.parse_log("==== 3 passed, 1 failed, 2 skipped in 0.5s ====", true);
//! assert_eq!(counts, Some(TestResultCounts::new(3, 1, 2, 0)));
//! # Ok::<(), libtester::parser::ParseError>(())
//! ```

pub mod numpy;
pub mod pytest;
pub mod pyyaml;
pub mod stestr;
pub mod unittest;
pub mod zope;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::counts::TestResultCounts;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while reading test output.
///
/// Unrecognized or inconsistent output is never an error: it degrades to
/// "no result" or to floored counts instead.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A log or report file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A built-in pattern failed to compile.
    #[error("Failed to compile result pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A JUnit report file pattern is not a valid glob.
    #[error("Invalid report pattern: {0}")]
    Glob(#[from] globset::Error),

    /// Walking a report directory failed.
    #[error("Failed to search for reports: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Recognizes one test runner's summary format.
///
/// Implementations receive the full log with ANSI sequences already
/// removed. They must return `None` when their format is absent and must
/// sum every summary they find, since one log may hold several test
/// sessions.
pub trait Extractor: Send + Sync {
    /// Short name of the dialect, used in logs.
    fn name(&self) -> &'static str;

    /// Extracts counts from `log`, or `None` if this dialect is absent.
    fn extract(&self, log: &str) -> Option<TestResultCounts>;
}

/// Banner printed when pytest itself crashes.
const INTERNAL_ERROR_PATTERN: &str = r"INTERNALERROR> Traceback \(most recent call last\):";

/// ESC followed by a single Fe byte, or a full CSI sequence.
const ANSI_ESCAPE_PATTERN: &str = r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])";

/// Parses captured test logs into counts.
///
/// Build one with [`LogParser::new`] and share it by reference; it holds
/// no state between calls.
pub struct LogParser {
    extractors: Vec<Box<dyn Extractor>>,
    rejected_patterns: Vec<Regex>,
    ansi_escape: Regex,
}

impl LogParser {
    /// Creates a parser with every built-in dialect and crash signature.
    pub fn new() -> ParseResult<Self> {
        Self::with_extractors(builtin_extractors()?)
    }

    /// Creates a parser with a custom extractor table.
    ///
    /// Extractors run in the given order. Crash signatures are the
    /// built-in ones.
    pub fn with_extractors(extractors: Vec<Box<dyn Extractor>>) -> ParseResult<Self> {
        Ok(Self {
            extractors,
            rejected_patterns: vec![Regex::new(INTERNAL_ERROR_PATTERN)?],
            ansi_escape: Regex::new(ANSI_ESCAPE_PATTERN)?,
        })
    }

    /// Names of the registered extractors, in run order.
    pub fn extractor_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.extractors.iter().map(|e| e.name())
    }

    /// Removes ANSI terminal escape sequences from `text`.
    pub fn strip_ansi<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.ansi_escape.replace_all(text, "")
    }

    /// Returns `true` if `log` contains a test framework crash banner.
    pub fn is_rejected(&self, log: &str) -> bool {
        self.rejected_patterns.iter().any(|p| p.is_match(log))
    }

    /// Parses the text of a test log.
    ///
    /// With `strict` set, a log containing a crash banner yields `None`
    /// even if a summary was also printed; use it for the reference
    /// interpreter, whose totals must be exact. Returns `None` when no
    /// extractor recognized anything, which is different from
    /// `Some(zero counts)` (zero tests ran).
    pub fn parse_log(&self, text: &str, strict: bool) -> Option<TestResultCounts> {
        let log = self.strip_ansi(text);

        if strict && self.is_rejected(&log) {
            info!("Rejecting test log: test framework crashed");
            return None;
        }

        let mut hits = self
            .extractors
            .iter()
            .filter_map(|extractor| {
                let counts = extractor.extract(&log)?;
                debug!("{} summary matched: {}", extractor.name(), counts);
                Some(counts)
            })
            .peekable();

        hits.peek()?;
        Some(hits.sum())
    }

    /// Reads a log file and parses it with [`parse_log`](Self::parse_log).
    ///
    /// Bytes that aren't valid UTF-8 are replaced rather than rejected.
    pub fn parse_log_file(
        &self,
        path: &Path,
        strict: bool,
    ) -> ParseResult<Option<TestResultCounts>> {
        let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse_log(&String::from_utf8_lossy(&bytes), strict))
    }
}

/// The built-in extractor table, in run order.
pub fn builtin_extractors() -> ParseResult<Vec<Box<dyn Extractor>>> {
    Ok(vec![
        Box::new(pytest::PytestSummary::new()?),
        Box::new(pytest::PytestSugarSummary::new()?),
        Box::new(zope::ZopeSummary::new()?),
        Box::new(unittest::UnittestSummary::new()?),
        Box::new(stestr::StestrSummary::new()?),
        Box::new(pyyaml::PyyamlSummary::new()?),
        Box::new(numpy::NumpySummary::new()?),
    ])
}

/// Parses a captured count, saturating at `u64::MAX`.
///
/// Returns `None` only for text that isn't a run of ASCII digits.
pub(crate) fn parse_count(text: &str) -> Option<u64> {
    let digits = text.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().unwrap_or(u64::MAX))
}
