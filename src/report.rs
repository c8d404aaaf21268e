//! Result reporting and output generation.
//!
//! This module prints comparison summaries to the console and writes the
//! JSON results file consumed by the upload step.

use std::path::Path;

use anyhow::{Context, Result};

use crate::compare::PackageReport;
use crate::counts::TestResultCounts;
use crate::reconcile::Comparison;
use crate::result::TestResult;

/// Prints one interpreter's counts with colored buckets.
pub fn print_counts(label: &str, counts: Option<TestResultCounts>) {
    let Some(counts) = counts else {
        println!("  {:<12} {}", label, console::style("no result").red().bold());
        return;
    };
    println!(
        "  {:<12} total {:>6}  passed {}  failed {}  skipped {}  unknown {}",
        label,
        counts.total(),
        console::style(counts.passed_count()).green(),
        console::style(counts.failed_count()).red(),
        console::style(counts.skipped_count()).yellow(),
        console::style(counts.unknown_count()).dim(),
    );
}

/// Prints a summary of one package comparison.
pub fn print_summary(report: &PackageReport) {
    println!();
    println!("Test Results: {}", console::style(&report.package).bold());

    for result in report.results.iter().filter(|r| !r.auxiliary) {
        print_counts(&result.name, result.counts);
    }

    println!();
    match report.comparison {
        Comparison::Aborted => {
            println!(
                "{}",
                console::style("Reference run didn't finish tests, comparison is inconclusive.")
                    .red()
                    .bold()
            );
        }
        Comparison::Compared { unexecuted, .. } if unexecuted > 0 => {
            println!(
                "{}",
                console::style(format!(
                    "{unexecuted} tests were not executed by the alternative interpreter and were counted as failures."
                ))
                .yellow()
            );
        }
        Comparison::Compared { alternative, .. } if alternative.failed_count() == 0 => {
            println!("{}", console::style("No failures.").green().bold());
        }
        Comparison::Compared { .. } => {
            println!("{}", console::style("Some tests failed.").red().bold());
        }
    }
}

/// One line per package, for batch runs.
pub fn summary_line(report: &PackageReport) -> String {
    let describe = |counts: Option<TestResultCounts>| match counts {
        Some(c) => format!("{}/{}", c.passed_count(), c.total()),
        None => "-".to_string(),
    };
    let status = if report.comparison.is_aborted() {
        "aborted"
    } else {
        "compared"
    };
    format!(
        "{}: {} reference {} alternative {}",
        report.package,
        status,
        describe(report.reference_counts()),
        describe(report.alternative_counts()),
    )
}

/// Writes result records as a JSON array.
///
/// Parent directories are created if they don't exist.
pub fn write_results(path: &Path, results: &[TestResult]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string(results).context("Failed to serialize results")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results file: {}", path.display()))?;

    tracing::info!("Results written to: {}", path.display());
    Ok(())
}
