//! PyYAML test appliance summary extractor.
//!
//! ```text
//! TESTS: 2581
//! FAILURES: 1
//! ERRORS: 0
//! ```
//!
//! The appliance reprints `TESTS`, `FAILURES` and `ERRORS` as running
//! totals, so only the last value of each counts. `Skipped` lines
//! accumulate.

use regex::Regex;

use super::{Extractor, parse_count};
use crate::counts::TestResultCounts;

pub struct PyyamlSummary {
    line: Regex,
}

impl PyyamlSummary {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            line: Regex::new(r"(?m)^(?P<state>TESTS|FAILURES|ERRORS|Skipped):?\s(?P<n>[0-9]+).*$")?,
        })
    }
}

impl Extractor for PyyamlSummary {
    fn name(&self) -> &'static str {
        "pyyaml"
    }

    fn extract(&self, log: &str) -> Option<TestResultCounts> {
        let mut matched = false;
        let mut total = 0;
        let mut failures = 0;
        let mut errors = 0;
        let mut skipped: u64 = 0;

        for cap in self.line.captures_iter(log) {
            matched = true;
            let Some(n) = parse_count(&cap["n"]) else {
                continue;
            };
            match &cap["state"] {
                "TESTS" => total = n,
                "FAILURES" => failures = n,
                "ERRORS" => errors = n,
                _ => skipped = skipped.saturating_add(n),
            }
        }

        matched.then(|| {
            TestResultCounts::from_total(total, failures.saturating_add(errors), skipped, 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pyyaml_summary() {
        let log = "\
test_appliance: running tests
Skipped: 4 (libyaml not available)
TESTS: 120
FAILURES: 2
ERRORS: 1
";
        let counts = PyyamlSummary::new().unwrap().extract(log);
        assert_eq!(counts, Some(TestResultCounts::new(113, 3, 4, 0)));
    }

    #[test]
    fn test_pyyaml_last_totals_win() {
        let log = "\
TESTS: 50
FAILURES: 1
TESTS: 80
FAILURES: 0
Skipped: 2
Skipped: 3
";
        let counts = PyyamlSummary::new().unwrap().extract(log);
        assert_eq!(counts, Some(TestResultCounts::new(75, 0, 5, 0)));
    }

    #[test]
    fn test_pyyaml_absent() {
        let log = "ERRORS were found: see above\n";
        assert_eq!(PyyamlSummary::new().unwrap().extract(log), None);
    }
}
