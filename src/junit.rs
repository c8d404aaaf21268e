//! JUnit XML result parsing.
//!
//! Some packages write JUnit reports instead of (or as well as) a readable
//! console summary. This module reads the suite-level totals of those
//! reports into [`TestResultCounts`].
//!
//! # Format
//!
//! Either a single suite:
//!
//! ```xml
//! <testsuite name="pytest" tests="12" failures="1" errors="0" skipped="2">
//!   ...
//! </testsuite>
//! ```
//!
//! or a `<testsuites>` wrapper, whose direct `<testsuite>` children are
//! summed (falling back to the wrapper's own attributes when it has no
//! children):
//!
//! ```xml
//! <testsuites>
//!   <testsuite name="unit" tests="10" failures="1" errors="1" skipped="0"/>
//!   <testsuite name="functional" tests="5" failures="0" errors="0" skipped="1"/>
//! </testsuites>
//! ```
//!
//! Only the totals are read; individual `<testcase>` elements are not
//! counted. A report that isn't well-formed counts as a single failure: a
//! truncated or corrupt report means the test run itself broke.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use quick_xml::Reader;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::counts::TestResultCounts;
use crate::parser::{ParseError, ParseResult};

/// Why a report couldn't be read as JUnit XML.
#[derive(Debug, thiserror::Error)]
pub enum MalformedReport {
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("attribute {name}=\"{value}\" is not a test count")]
    BadCount { name: String, value: String },

    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    #[error("more than one root element")]
    MultipleRoots,

    #[error("no root element")]
    NoRoot,

    #[error("unclosed or unbalanced elements")]
    Unbalanced,
}

/// Suite-level totals as written in the XML attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SuiteTotals {
    tests: u64,
    failures: u64,
    errors: u64,
    skipped: u64,
}

impl SuiteTotals {
    fn from_element(element: &BytesStart<'_>) -> Result<Self, MalformedReport> {
        let mut totals = Self::default();
        for attr in element.attributes() {
            let attr = attr?;
            let slot = match attr.key.as_ref() {
                b"tests" => &mut totals.tests,
                b"failures" => &mut totals.failures,
                b"errors" => &mut totals.errors,
                b"skipped" => &mut totals.skipped,
                _ => continue,
            };
            *slot = parse_attr_count(attr.key.as_ref(), &attr.value)?;
        }
        Ok(totals)
    }

    fn add(self, other: Self) -> Self {
        Self {
            tests: self.tests.saturating_add(other.tests),
            failures: self.failures.saturating_add(other.failures),
            errors: self.errors.saturating_add(other.errors),
            skipped: self.skipped.saturating_add(other.skipped),
        }
    }

    fn counts(self) -> TestResultCounts {
        TestResultCounts::from_total(
            self.tests,
            self.failures.saturating_add(self.errors),
            self.skipped,
            0,
        )
    }
}

fn parse_attr_count(name: &[u8], value: &[u8]) -> Result<u64, MalformedReport> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| MalformedReport::BadCount {
            name: String::from_utf8_lossy(name).into_owned(),
            value: String::from_utf8_lossy(value).into_owned(),
        })
}

enum Root {
    Suite(SuiteTotals),
    Suites {
        own: SuiteTotals,
        children: Option<SuiteTotals>,
    },
}

impl Root {
    fn from_element(element: &BytesStart<'_>) -> Result<Self, MalformedReport> {
        match element.name().as_ref() {
            b"testsuite" => Ok(Root::Suite(SuiteTotals::from_element(element)?)),
            b"testsuites" => Ok(Root::Suites {
                own: SuiteTotals::from_element(element)?,
                children: None,
            }),
            other => Err(MalformedReport::UnexpectedRoot(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

/// Reads the totals of one JUnit XML document.
pub fn read_report(content: &str) -> Result<TestResultCounts, MalformedReport> {
    let mut reader = Reader::from_str(content);
    let mut root: Option<Root> = None;
    let mut depth = 0usize;

    loop {
        let (element, is_empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or(MalformedReport::Unbalanced)?;
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        if depth == 0 {
            if root.is_some() {
                return Err(MalformedReport::MultipleRoots);
            }
            root = Some(Root::from_element(&element)?);
        } else if depth == 1
            && element.name().as_ref() == b"testsuite"
            && let Some(Root::Suites { children, .. }) = &mut root
        {
            let suite = SuiteTotals::from_element(&element)?;
            *children = Some(children.unwrap_or_default().add(suite));
        }

        if !is_empty {
            depth += 1;
        }
    }

    if depth != 0 {
        return Err(MalformedReport::Unbalanced);
    }

    let totals = match root.ok_or(MalformedReport::NoRoot)? {
        Root::Suite(totals) => totals,
        Root::Suites { own, children } => children.unwrap_or(own),
    };
    Ok(totals.counts())
}

/// Counts for one report's contents, where a malformed report is a single
/// failure.
pub fn parse_junit_report(content: &str) -> TestResultCounts {
    read_report(content).unwrap_or_else(|e| {
        warn!("Malformed JUnit XML report, counting it as one failure: {}", e);
        TestResultCounts::from_total(0, 1, 0, 0)
    })
}

/// Parses and sums a set of JUnit XML report files.
///
/// Returns `Ok(None)` only for an empty file list. Malformed reports are
/// counted as one failure each and the remaining files are still parsed.
///
/// # Errors
///
/// Returns an error if a file can't be read.
pub fn parse_junit_xml<P: AsRef<Path>>(files: &[P]) -> ParseResult<Option<TestResultCounts>> {
    if files.is_empty() {
        return Ok(None);
    }

    let mut total = TestResultCounts::default();
    for file in files {
        let path = file.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let counts = parse_junit_report(&String::from_utf8_lossy(&bytes));
        debug!("JUnit report {}: {}", path.display(), counts);
        total = total.combine(counts);
    }
    Ok(Some(total))
}

/// Builds a matcher for `pattern` at any depth below the search root.
fn report_matcher(pattern: &str) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    builder.add(
        GlobBuilder::new(&format!("**/{pattern}"))
            .literal_separator(true)
            .build()?,
    );
    builder.build()
}

/// Finds JUnit reports below `dir` whose relative path matches `pattern`.
///
/// The pattern is matched against the path relative to `dir`, at any
/// depth: `junit-*.xml` finds `junit-unit.xml` as well as
/// `build/reports/junit-unit.xml`. Results are sorted.
pub fn find_junit_reports(dir: &Path, pattern: &str) -> ParseResult<Vec<PathBuf>> {
    let matcher = report_matcher(pattern)?;
    let mut reports = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        if matcher.is_match(relative) {
            reports.push(entry.into_path());
        }
    }

    reports.sort();
    debug!(
        "Found {} JUnit reports matching '{}' in {}",
        reports.len(),
        pattern,
        dir.display()
    );
    Ok(reports)
}
