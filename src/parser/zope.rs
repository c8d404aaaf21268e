//! zope.testrunner summary extractor.
//!
//! ```text
//!   Ran 412 tests with 2 failures, 1 errors, 7 skipped in 3.512 seconds.
//! ```
//!
//! Layered runs print one such line per layer and all of them are summed.
//! The closing `Total: N tests, ...` line has a different shape and is not
//! matched, so layers aren't counted twice.

use regex::Regex;

use super::{Extractor, parse_count};
use crate::counts::TestResultCounts;

pub struct ZopeSummary {
    summary: Regex,
}

impl ZopeSummary {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            summary: Regex::new(
                r"(?m)Ran (?P<total>[0-9]+) tests with (?P<f>[0-9]+) failures, (?P<e>[0-9]+) errors, (?P<s>[0-9]+) skipped in.*$",
            )?,
        })
    }
}

impl Extractor for ZopeSummary {
    fn name(&self) -> &'static str {
        "zope.testrunner"
    }

    fn extract(&self, log: &str) -> Option<TestResultCounts> {
        let mut matches = self
            .summary
            .captures_iter(log)
            .filter_map(|cap| {
                let total = parse_count(&cap["total"])?;
                let failed = parse_count(&cap["f"])?.checked_add(parse_count(&cap["e"])?)?;
                let skipped = parse_count(&cap["s"])?;
                Some(TestResultCounts::from_total(total, failed, skipped, 0))
            })
            .peekable();
        matches.peek()?;
        Some(matches.sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zope_summary() {
        let log = "\
Running zope.testrunner.layer.UnitTests tests:
  Set up zope.testrunner.layer.UnitTests in 0.000 seconds.
  Ran 412 tests with 2 failures, 1 errors, 7 skipped in 3.512 seconds.
Tearing down left over layers:
";
        let counts = ZopeSummary::new().unwrap().extract(log);
        assert_eq!(counts, Some(TestResultCounts::new(402, 3, 7, 0)));
    }

    #[test]
    fn test_zope_multiple_layers_summed() {
        let log = "\
  Ran 10 tests with 0 failures, 0 errors, 0 skipped in 0.1 seconds.
  Ran 5 tests with 1 failures, 0 errors, 1 skipped in 0.2 seconds.
";
        let counts = ZopeSummary::new().unwrap().extract(log);
        assert_eq!(counts, Some(TestResultCounts::new(13, 1, 1, 0)));
    }

    #[test]
    fn test_zope_inconsistent_total_floors() {
        let log = "Ran 1 tests with 2 failures, 1 errors, 0 skipped in 0.1 seconds.";
        let counts = ZopeSummary::new().unwrap().extract(log);
        assert_eq!(counts, Some(TestResultCounts::new(0, 3, 0, 0)));
    }

    #[test]
    fn test_zope_absent() {
        let log = "Ran 3 tests in 0.001s\n\nOK\n";
        assert_eq!(ZopeSummary::new().unwrap().extract(log), None);
    }
}
