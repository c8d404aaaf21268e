//! pytest summary extractors.
//!
//! pytest ends every session with a line such as:
//!
//! ```text
//! ============ 3 failed, 120 passed, 4 skipped, 2 warnings in 12.31s ============
//! ```
//!
//! The pytest-sugar plugin replaces it with an indented block:
//!
//! ```text
//! Results (12.31s):
//!      120 passed
//!        3 failed
//!          - tests/test_io.py:41 test_read
//!        4 skipped
//! ```
//!
//! Both share the state vocabulary classified by [`classify_state`].

use regex::Regex;

use super::{Extractor, parse_count};
use crate::counts::TestResultCounts;

/// Outcome bucket for a pytest state word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryState {
    Passed,
    Failed,
    Skipped,
    Unknown,
    /// Not a test outcome (warnings, subtest tallies).
    Ignored,
}

impl SummaryState {
    /// Counts holding `n` tests in this bucket, or `None` for
    /// [`SummaryState::Ignored`].
    pub fn counts(self, n: u64) -> Option<TestResultCounts> {
        match self {
            SummaryState::Passed => Some(TestResultCounts::passed(n)),
            SummaryState::Failed => Some(TestResultCounts::failed(n)),
            SummaryState::Skipped => Some(TestResultCounts::skipped(n)),
            SummaryState::Unknown => Some(TestResultCounts::unknown(n)),
            SummaryState::Ignored => None,
        }
    }
}

/// Classifies a pytest summary state such as `passed` or `xfailed`.
///
/// Expected failures and unexpected passes count as skipped, since
/// neither says anything about the interpreter under test.
pub fn classify_state(state: &str) -> SummaryState {
    match state {
        "passed" => SummaryState::Passed,
        "failed" | "error" | "errors" => SummaryState::Failed,
        "skipped" | "deselected" | "xfailed" | "xpassed" => SummaryState::Skipped,
        "warning" | "warnings" => SummaryState::Ignored,
        s if s.starts_with("subtests ") => SummaryState::Ignored,
        _ => SummaryState::Unknown,
    }
}

/// Sums a comma separated `N state, N state` list.
///
/// Pairs that don't split into a count and a state are skipped.
pub(crate) fn tally_states(
    list: &str,
    classify: impl Fn(&str) -> SummaryState,
) -> TestResultCounts {
    list.split(", ")
        .filter_map(|pair| {
            let (count, state) = pair.split_once(' ')?;
            classify(state).counts(parse_count(count)?)
        })
        .sum()
}

/// Extractor for pytest's `==== ... in 1.23s ====` summary line.
pub struct PytestSummary {
    summary: Regex,
}

impl PytestSummary {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            summary: Regex::new(
                r"(?m)^=+ ((?:[0-9]+ (?:subtests )?\w+, )*[0-9]+ (?:subtests )?\w+) in .+ =+$",
            )?,
        })
    }
}

impl Extractor for PytestSummary {
    fn name(&self) -> &'static str {
        "pytest"
    }

    fn extract(&self, log: &str) -> Option<TestResultCounts> {
        let mut matches = self
            .summary
            .captures_iter(log)
            .map(|cap| tally_states(&cap[1], classify_state))
            .peekable();
        matches.peek()?;
        Some(matches.sum())
    }
}

/// Extractor for the pytest-sugar `Results (...):` block.
pub struct PytestSugarSummary {
    block: Regex,
    line: Regex,
}

impl PytestSugarSummary {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            block: Regex::new(r"(?m)^Results \([^)]*\):\n((?:\s*[0-9]+ \w+\n(?:\s+- .*\n)*)+)")?,
            line: Regex::new(r"^\s*([0-9]+) (\w+)")?,
        })
    }
}

impl Extractor for PytestSugarSummary {
    fn name(&self) -> &'static str {
        "pytest-sugar"
    }

    fn extract(&self, log: &str) -> Option<TestResultCounts> {
        let mut matches = self
            .block
            .captures_iter(log)
            .map(|cap| {
                cap[1]
                    .lines()
                    .filter_map(|line| {
                        let line_cap = self.line.captures(line)?;
                        classify_state(&line_cap[2]).counts(parse_count(&line_cap[1])?)
                    })
                    .sum::<TestResultCounts>()
            })
            .peekable();
        matches.peek()?;
        Some(matches.sum())
    }
}
