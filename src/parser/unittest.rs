//! unittest and twisted trial summary extractor.
//!
//! Both runners end with the same shape, so one extractor handles them:
//!
//! ```text
//! Ran 42 tests in 0.315s
//!
//! FAILED (failures=2, errors=1, skipped=3)
//! ```
//!
//! ```text
//! Ran 7 tests in 0.020s
//!
//! PASSED (skips=1, successes=6)
//! ```
//!
//! Twisted reports `successes` explicitly. unittest doesn't, so the passed
//! count is derived from the total instead.

use regex::Regex;

use super::{Extractor, parse_count};
use crate::counts::TestResultCounts;

pub struct UnittestSummary {
    summary: Regex,
}

impl UnittestSummary {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            summary: Regex::new(
                r"(?m)^Ran ([0-9]+) tests? in .*\n\n(?:OK|PASSED|FAILED)(?: \(((?:[^=]+=\s*[0-9]+,\s*)*[^=]+=\s*[0-9]+)\))?",
            )?,
        })
    }
}

/// Running totals across every matched summary.
#[derive(Default)]
struct Tally {
    total: u64,
    successes: Option<u64>,
    failed: u64,
    skipped: u64,
    unknown: u64,
}

impl Tally {
    fn add_detail(&mut self, name: &str, value: u64) {
        match name {
            "successes" => {
                self.successes = Some(self.successes.unwrap_or(0).saturating_add(value));
            }
            "failures" | "errors" => self.failed = self.failed.saturating_add(value),
            "skipped" | "skips" | "expected failures" => {
                self.skipped = self.skipped.saturating_add(value);
            }
            _ => self.unknown = self.unknown.saturating_add(value),
        }
    }

    fn finish(self) -> TestResultCounts {
        let Tally {
            total,
            successes,
            failed,
            skipped,
            unknown,
        } = self;
        match successes {
            Some(passed) => TestResultCounts::new(passed, failed, skipped, unknown),
            None => TestResultCounts::from_total(total, failed, skipped, unknown),
        }
    }
}

impl Extractor for UnittestSummary {
    fn name(&self) -> &'static str {
        "unittest"
    }

    fn extract(&self, log: &str) -> Option<TestResultCounts> {
        let mut tally = Tally::default();
        let mut matched = false;

        for cap in self.summary.captures_iter(log) {
            matched = true;
            tally.total = tally.total.saturating_add(parse_count(&cap[1]).unwrap_or(0));

            let Some(details) = cap.get(2) else {
                continue;
            };
            for element in details.as_str().split(',') {
                let Some((name, value)) = element.split_once('=') else {
                    continue;
                };
                if let Some(value) = parse_count(value) {
                    tally.add_detail(name.trim(), value);
                }
            }
        }

        matched.then(|| tally.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(log: &str) -> Option<TestResultCounts> {
        UnittestSummary::new().unwrap().extract(log)
    }

    #[test]
    fn test_unittest_ok() {
        let log = "\
..........
----------------------------------------------------------------------
Ran 10 tests in 0.004s

OK
";
        assert_eq!(extract(log), Some(TestResultCounts::passed(10)));
    }

    #[test]
    fn test_unittest_single_test() {
        assert_eq!(
            extract("Ran 1 test in 0.000s\n\nOK\n"),
            Some(TestResultCounts::passed(1))
        );
    }

    #[test]
    fn test_unittest_failed_with_details() {
        let log = "\
Ran 42 tests in 0.315s

FAILED (failures=2, errors=1, skipped=3, expected failures=1, unexpected successes=1)
";
        assert_eq!(extract(log), Some(TestResultCounts::new(34, 3, 4, 1)));
    }

    #[test]
    fn test_twisted_successes() {
        let log = "\
Ran 7 tests in 0.020s

PASSED (skips=1, successes=6)
";
        assert_eq!(extract(log), Some(TestResultCounts::new(6, 0, 1, 0)));
    }

    #[test]
    fn test_twisted_successes_ignore_total() {
        // trial's total disagrees with its own breakdown here
        let log = "\
Ran 9 tests in 0.020s

FAILED (failures=1, successes=3)
";
        assert_eq!(extract(log), Some(TestResultCounts::new(3, 1, 0, 0)));
    }

    #[test]
    fn test_multiple_runs_summed() {
        let log = "\
Ran 5 tests in 0.1s

OK (skipped=1)
Ran 3 tests in 0.2s

FAILED (failures=1)
";
        assert_eq!(extract(log), Some(TestResultCounts::new(6, 1, 1, 0)));
    }

    #[test]
    fn test_missing_blank_line_not_matched() {
        assert_eq!(extract("Ran 5 tests in 0.1s\nOK\n"), None);
    }

    #[test]
    fn test_absent() {
        assert_eq!(extract("nothing to see here"), None);
    }
}
