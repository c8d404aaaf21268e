//! Comparing one package's test results across two interpreters.
//!
//! The orchestrator runs a package's test suite under the reference and
//! the alternative interpreter and leaves behind a console log (and, for
//! some packages, JUnit reports) per run. This module turns those
//! artifacts into [`TestResult`] records and reconciles them.
//!
//! # Flow
//!
//! ```text
//!  reference RunArtifacts ──► collect_result(strict) ──► TestResult ─┐
//!                                                                     ├─► reconcile() ──► PackageReport
//!  alternative RunArtifacts ─► collect_result(lenient) ─► TestResult ─┘
//! ```
//!
//! # Results Directory Layout
//!
//! [`compare_results_dir`] expects one directory per package:
//!
//! ```text
//! results/
//! ├── requests/
//! │   ├── cpython-test.log
//! │   └── graalpy-test.log
//! └── lxml/
//!     ├── cpython-test.log
//!     ├── cpython-junit/junit.xml
//!     ├── graalpy-test.log
//!     └── graalpy-junit/junit.xml
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::{Config, PackageConfig};
use crate::counts::TestResultCounts;
use crate::junit::{find_junit_reports, parse_junit_xml};
use crate::parser::{LogParser, ParseResult};
use crate::reconcile::{Comparison, reconcile};
use crate::result::TestResult;

/// One of the two interpreters under comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub name: String,
    /// Results from this interpreter are ground truth and parsed strictly.
    pub reference_impl: bool,
}

impl Interpreter {
    /// The reference interpreter named `name`.
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference_impl: true,
        }
    }

    /// The alternative interpreter named `name`.
    pub fn alternative(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference_impl: false,
        }
    }

    /// Both interpreters named in `config`, reference first.
    pub fn pair(config: &Config) -> (Self, Self) {
        (
            Self::reference(&config.interpreters.reference),
            Self::alternative(&config.interpreters.alternative),
        )
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Files left behind by one test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    /// Captured console output.
    pub log_path: PathBuf,
    /// Root directory to search for JUnit reports.
    pub junit_dir: Option<PathBuf>,
    /// How long the run took, if the orchestrator measured it.
    pub duration: Option<Duration>,
}

impl RunArtifacts {
    /// Artifacts consisting of just a console log.
    pub fn log(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            junit_dir: None,
            duration: None,
        }
    }

    /// Artifacts of `interpreter`'s run inside a package results directory.
    ///
    /// The log is `{name}-test.log`; JUnit reports are searched in
    /// `{name}-junit/` when that directory exists.
    pub fn in_dir(dir: &Path, interpreter: &Interpreter) -> Self {
        let junit_dir = dir.join(format!("{}-junit", interpreter.name));
        Self {
            log_path: dir.join(format!("{}-test.log", interpreter.name)),
            junit_dir: junit_dir.is_dir().then_some(junit_dir),
            duration: None,
        }
    }

    pub fn with_junit_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.junit_dir = Some(dir.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Results of comparing one package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageReport {
    pub package: String,
    pub comparison: Comparison,
    /// Reference record first, then the alternative record with
    /// reconciled counts.
    pub results: Vec<TestResult>,
}

impl PackageReport {
    /// Counts recorded for the reference run.
    pub fn reference_counts(&self) -> Option<TestResultCounts> {
        self.results
            .iter()
            .find(|r| r.reference_impl && !r.auxiliary)
            .and_then(|r| r.counts)
    }

    /// Counts recorded for the alternative run.
    pub fn alternative_counts(&self) -> Option<TestResultCounts> {
        self.results
            .iter()
            .find(|r| !r.reference_impl && !r.auxiliary)
            .and_then(|r| r.counts)
    }
}

fn collect_counts(
    parser: &LogParser,
    interpreter: &Interpreter,
    package: &PackageConfig,
    artifacts: &RunArtifacts,
) -> ParseResult<Option<TestResultCounts>> {
    if let (Some(pattern), Some(junit_dir)) = (&package.junit_xml, &artifacts.junit_dir) {
        let root = match &package.subdirectory {
            Some(sub) => junit_dir.join(sub),
            None => junit_dir.clone(),
        };
        let files = find_junit_reports(&root, pattern)?;
        return parse_junit_xml(&files);
    }
    parser.parse_log_file(&artifacts.log_path, interpreter.reference_impl)
}

/// Parses one run's artifacts into a `{interpreter}-test` record.
///
/// JUnit reports are used when the package configures a `junit_xml`
/// pattern and the run has a JUnit directory; otherwise the console log
/// is parsed, strictly for the reference interpreter. A parsing failure
/// is logged and leaves the record without counts.
pub fn collect_result(
    parser: &LogParser,
    interpreter: &Interpreter,
    package: &PackageConfig,
    artifacts: &RunArtifacts,
) -> TestResult {
    let mut result = TestResult::new(format!("{interpreter}-test"), &artifacts.log_path)
        .with_reference_impl(interpreter.reference_impl);
    if let Some(duration) = artifacts.duration {
        result = result.with_duration(duration);
    }

    match collect_counts(parser, interpreter, package, artifacts) {
        Ok(Some(counts)) => {
            info!("Test results for {}: {}", interpreter, counts);
            result.with_counts(Some(counts))
        }
        Ok(None) => {
            info!(
                "Couldn't parse test results or no tests executed for {}",
                interpreter
            );
            result
        }
        Err(e) => {
            warn!("Result parsing failed for {}: {}", interpreter, e);
            result
        }
    }
}

/// Parses both runs of `package` and reconciles them.
///
/// If the reference run has no usable result the comparison is
/// [`Comparison::Aborted`] and the alternative record keeps its raw counts.
pub fn compare_package(
    parser: &LogParser,
    config: &Config,
    package: &str,
    reference: &RunArtifacts,
    alternative: &RunArtifacts,
) -> PackageReport {
    let package_config = config.package(package);
    let (reference_interp, alternative_interp) = Interpreter::pair(config);

    let reference_result = collect_result(parser, &reference_interp, &package_config, reference);
    let mut alternative_result =
        collect_result(parser, &alternative_interp, &package_config, alternative);

    let comparison = reconcile(
        reference_result.counts.as_ref(),
        alternative_result.counts,
        package_config.reconcile_policy(),
    );
    match comparison {
        Comparison::Aborted => {
            info!("{}: {} didn't finish tests, not comparing", package, reference_interp);
        }
        Comparison::Compared {
            alternative,
            unexecuted,
        } => {
            if unexecuted > 0 {
                info!(
                    "{}: {} tests not executed on {}, counted as failures",
                    package, unexecuted, alternative_interp
                );
            }
            alternative_result.counts = Some(alternative);
        }
    }

    PackageReport {
        package: package.to_string(),
        comparison,
        results: vec![reference_result, alternative_result],
    }
}

/// Package directories under `dir` that hold a reference log, sorted.
fn package_dirs(dir: &Path, reference: &Interpreter) -> Result<Vec<(String, PathBuf)>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read results directory: {}", dir.display()))?;

    let mut packages = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read results directory: {}", dir.display()))?
            .path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !RunArtifacts::in_dir(&path, reference).log_path.is_file() {
            debug!("Skipping {}: no {} test log", path.display(), reference);
            continue;
        }
        packages.push((name.to_string(), path));
    }
    packages.sort();
    Ok(packages)
}

/// Compares every package in a results directory.
///
/// Each sub-directory containing a reference test log is one package (see
/// the module docs for the layout). Packages are parsed concurrently on
/// the blocking thread pool; reports come back sorted by package name.
pub async fn compare_results_dir(
    parser: Arc<LogParser>,
    config: Arc<Config>,
    dir: &Path,
) -> Result<Vec<PackageReport>> {
    let (reference, alternative) = Interpreter::pair(&config);
    let packages = package_dirs(dir, &reference)?;
    info!("Comparing {} packages in {}", packages.len(), dir.display());

    let tasks = packages.into_iter().map(|(package, path)| {
        let parser = Arc::clone(&parser);
        let config = Arc::clone(&config);
        let reference_run = RunArtifacts::in_dir(&path, &reference);
        let alternative_run = RunArtifacts::in_dir(&path, &alternative);
        tokio::task::spawn_blocking(move || {
            compare_package(&parser, &config, &package, &reference_run, &alternative_run)
        })
    });

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.context("Package comparison task panicked"))
        .collect()
}
