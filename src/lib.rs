//! libtester: compare Python test-suite results across two interpreters.
//!
//! This crate turns the output of a package's test suite, run once under a
//! reference interpreter and once under an alternative one, into
//! comparable pass/fail/skip/unknown counts.
//!
//! # Architecture
//!
//! The main components are:
//!
//! - **Counts**: [`TestResultCounts`], the common tally every parser produces
//! - **Parser**: [`LogParser`] recognizes the summaries of pytest, unittest,
//!   twisted trial, zope.testrunner, stestr and others in console logs
//! - **JUnit**: suite totals from JUnit XML reports
//! - **Reconcile**: charges tests the alternative run never executed as
//!   failures
//! - **Compare**: per-package pipeline producing [`TestResult`] records
//!
//! # Example
//!
//! ```
//! use libtester::reconcile::{ReconcilePolicy, reconcile};
//! use libtester::{LogParser, TestResultCounts};
//!
//! let parser = LogParser::new()?;
//! let reference = parser.parse_log("==== 100 passed in 10.0s ====", true);
//! let alternative = parser.parse_log("==== 80 passed in 30.0s ====", false);
//!
//! let comparison = reconcile(reference.as_ref(), alternative, ReconcilePolicy::default());
//! assert_eq!(comparison.alternative(), Some(TestResultCounts::new(80, 20, 0, 0)));
//! # Ok::<(), libtester::parser::ParseError>(())
//! ```

pub mod compare;
pub mod config;
pub mod counts;
pub mod junit;
pub mod parser;
pub mod reconcile;
pub mod report;
pub mod result;

// Re-export commonly used types
pub use compare::{Interpreter, PackageReport, RunArtifacts, compare_package};
pub use config::{Config, load_config};
pub use counts::TestResultCounts;
pub use junit::parse_junit_xml;
pub use parser::{Extractor, LogParser, ParseError};
pub use reconcile::{Comparison, ReconcilePolicy, reconcile};
pub use result::TestResult;
