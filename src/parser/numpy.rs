//! numpy-style summary extractor.
//!
//! Runners built on numpy's test harness print the counts on their own
//! line, directly above a `summary` rule:
//!
//! ```text
//! 8123 passed, 45 skipped, 12 xfailed, 3 warnings in 212.45s
//! ________________________________ summary ________________________________
//! ```

use regex::Regex;

use super::Extractor;
use super::pytest::{SummaryState, classify_state, tally_states};
use crate::counts::TestResultCounts;

pub struct NumpySummary {
    summary: Regex,
}

impl NumpySummary {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            summary: Regex::new(r"(?m)^((?:[0-9]+ \w+, )*[0-9]+ \w+) in .+\n_+ summary _+$")?,
        })
    }
}

/// pytest classification, except that unexpected passes count as passed.
fn classify_numpy_state(state: &str) -> SummaryState {
    match state {
        "xpassed" => SummaryState::Passed,
        other => classify_state(other),
    }
}

impl Extractor for NumpySummary {
    fn name(&self) -> &'static str {
        "numpy"
    }

    fn extract(&self, log: &str) -> Option<TestResultCounts> {
        let mut matches = self
            .summary
            .captures_iter(log)
            .map(|cap| tally_states(&cap[1], classify_numpy_state))
            .peekable();
        matches.peek()?;
        Some(matches.sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numpy_summary() {
        let log = "\
8123 passed, 45 skipped, 12 xfailed, 2 xpassed, 3 warnings in 212.45s
________________________________ summary ________________________________
";
        let counts = NumpySummary::new().unwrap().extract(log);
        assert_eq!(counts, Some(TestResultCounts::new(8125, 0, 57, 0)));
    }

    #[test]
    fn test_numpy_failures() {
        let log = "\
3 failed, 97 passed, 1 error in 10.00s
___ summary ___
";
        let counts = NumpySummary::new().unwrap().extract(log);
        assert_eq!(counts, Some(TestResultCounts::new(97, 4, 0, 0)));
    }

    #[test]
    fn test_numpy_multiple_summaries_summed() {
        let log = "\
10 passed, 1 skipped in 1.00s
___ summary ___
running the second suite
4 passed, 2 failed, 1 xpassed in 2.00s
________ summary ________
";
        let counts = NumpySummary::new().unwrap().extract(log);
        assert_eq!(counts, Some(TestResultCounts::new(15, 2, 1, 0)));
    }

    #[test]
    fn test_numpy_requires_summary_rule() {
        let log = "100 passed in 1.00s\n";
        assert_eq!(NumpySummary::new().unwrap().extract(log), None);
    }

    #[test]
    fn test_numpy_does_not_match_pytest_line() {
        let log = "==== 100 passed in 1.00s ====\n___ summary ___\n";
        assert_eq!(NumpySummary::new().unwrap().extract(log), None);
    }
}
