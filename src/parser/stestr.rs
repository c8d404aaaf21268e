//! stestr summary extractor.
//!
//! ```text
//! ======
//! Totals
//! ======
//! Ran: 120 tests in 14.2000 sec.
//!  - Passed: 110
//!  - Skipped: 5
//!  - Expected Fail: 2
//!  - Unexpected Success: 1
//!  - Failed: 2
//! ```
//!
//! Expected failures count as passed and unexpected successes as failed.

use regex::Regex;

use super::{Extractor, parse_count};
use crate::counts::TestResultCounts;

pub struct StestrSummary {
    summary: Regex,
}

impl StestrSummary {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            summary: Regex::new(concat!(
                r"Ran: (?P<total>[0-9]+) .*\n",
                r" - Passed: (?P<p>[0-9]+)\n",
                r" - Skipped: (?P<s>[0-9]+)\n",
                r" - Expected Fail: (?P<ef>[0-9]+)\n",
                r" - Unexpected Success: (?P<us>[0-9]+)\n",
                r" - Failed: (?P<f>[0-9]+)",
            ))?,
        })
    }
}

impl Extractor for StestrSummary {
    fn name(&self) -> &'static str {
        "stestr"
    }

    fn extract(&self, log: &str) -> Option<TestResultCounts> {
        let mut matches = self
            .summary
            .captures_iter(log)
            .filter_map(|cap| {
                let passed = parse_count(&cap["p"])?.checked_add(parse_count(&cap["ef"])?)?;
                let failed = parse_count(&cap["f"])?.checked_add(parse_count(&cap["us"])?)?;
                let skipped = parse_count(&cap["s"])?;
                Some(TestResultCounts::new(passed, failed, skipped, 0))
            })
            .peekable();
        matches.peek()?;
        Some(matches.sum())
    }
}
