//! Test result records.
//!
//! A [`TestResult`] is what gets written to the results file for one step
//! of a package's run (an installation, a test run, an auxiliary log). It
//! serializes to a flat JSON object:
//!
//! ```json
//! {
//!   "name": "graalpy-test",
//!   "log_file": "results/requests/graalpy-test.log",
//!   "test_time": 12.5,
//!   "passed": 80,
//!   "failed": 20,
//!   "skipped": 0,
//!   "unknown": 0
//! }
//! ```
//!
//! Optional fields are omitted when unknown, and the count fields are
//! omitted entirely when the log couldn't be parsed.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::counts::TestResultCounts;

/// Outcome of one step of a package's run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    /// Step name, such as `cpython-test` or `graalpy-install`.
    pub name: String,

    /// Path to the captured log.
    #[serde(rename = "log_file")]
    pub log_path: PathBuf,

    /// Produced by the reference interpreter.
    #[serde(skip_serializing_if = "is_false")]
    pub reference_impl: bool,

    /// Informational only; excluded from pass/fail judgement.
    #[serde(skip_serializing_if = "is_false")]
    pub auxiliary: bool,

    /// Wall-clock duration of the step.
    #[serde(
        rename = "test_time",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secs"
    )]
    pub test_duration: Option<Duration>,

    /// Parsed counts, `None` until parsing succeeds.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub counts: Option<TestResultCounts>,

    /// Whether the package installed, for installation steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installs: Option<bool>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn serialize_secs<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(d) => serializer.serialize_f64(d.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

impl TestResult {
    /// Creates a record with no counts.
    pub fn new(name: impl Into<String>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            log_path: log_path.into(),
            reference_impl: false,
            auxiliary: false,
            test_duration: None,
            counts: None,
            installs: None,
        }
    }

    /// Marks the record as produced by the reference interpreter.
    pub fn with_reference_impl(mut self, reference_impl: bool) -> Self {
        self.reference_impl = reference_impl;
        self
    }

    /// Sets the parsed counts.
    pub fn with_counts(mut self, counts: Option<TestResultCounts>) -> Self {
        self.counts = counts;
        self
    }

    /// Sets the step duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.test_duration = Some(duration);
        self
    }

    /// Marks the record as auxiliary.
    pub fn auxiliary(mut self) -> Self {
        self.auxiliary = true;
        self
    }
}
