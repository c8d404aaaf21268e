//! libtester CLI - parse and compare Python test-suite results.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use libtester::compare::{Interpreter, RunArtifacts, compare_package, compare_results_dir};
use libtester::config::{self, Config};
use libtester::parser::LogParser;
use libtester::report::{print_summary, summary_line, write_results};

const DEFAULT_CONFIG: &str = "libtester.toml";

#[derive(Parser)]
#[command(name = "libtester")]
#[command(about = "Parse and compare Python test-suite results", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to libtester.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a captured test log; exits with 1 if no result is found
    Parse {
        /// Log file to parse
        log: PathBuf,

        /// Keep partial results from crashed test frameworks
        #[arg(long)]
        lenient: bool,
    },

    /// Sum the totals of JUnit XML reports
    Junit {
        /// Report files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Compare one package's reference and alternative runs
    Compare {
        /// Package name, used to look up package settings
        package: String,

        /// Test log of the reference interpreter
        #[arg(long)]
        reference_log: PathBuf,

        /// Test log of the alternative interpreter
        #[arg(long)]
        alternative_log: PathBuf,

        /// Directory with the reference run's JUnit reports
        #[arg(long)]
        reference_junit_dir: Option<PathBuf>,

        /// Directory with the alternative run's JUnit reports
        #[arg(long)]
        alternative_junit_dir: Option<PathBuf>,

        /// Reference test duration in seconds
        #[arg(long)]
        reference_time: Option<f64>,

        /// Alternative test duration in seconds
        #[arg(long)]
        alternative_time: Option<f64>,

        /// Results file path
        #[arg(short, long, default_value = "result.json")]
        output: PathBuf,
    },

    /// Compare every package in a results directory
    Batch {
        /// Directory with one sub-directory per package
        results_dir: PathBuf,

        /// Results file name written inside each package directory
        #[arg(long, default_value = "result.json")]
        results_file: String,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Parse { log, lenient } => parse_log(&log, !lenient),
        Commands::Junit { files } => parse_junit(&files),
        Commands::Compare {
            package,
            reference_log,
            alternative_log,
            reference_junit_dir,
            alternative_junit_dir,
            reference_time,
            alternative_time,
            output,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            let reference = run_artifacts(reference_log, reference_junit_dir, reference_time)?;
            let alternative =
                run_artifacts(alternative_log, alternative_junit_dir, alternative_time)?;
            compare(&config, &package, &reference, &alternative, &output)
        }
        Commands::Batch {
            results_dir,
            results_file,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            batch(config, &results_dir, &results_file).await
        }
        Commands::Validate => validate_config(cli.config.as_deref()),
    }
}

/// Loads the given config, or `libtester.toml` if it exists, or defaults.
fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).is_file() => {
            config::load_config(Path::new(DEFAULT_CONFIG))
        }
        None => Ok(Config::default()),
    }
}

fn run_artifacts(
    log: PathBuf,
    junit_dir: Option<PathBuf>,
    secs: Option<f64>,
) -> Result<RunArtifacts> {
    let mut artifacts = RunArtifacts::log(log);
    if let Some(dir) = junit_dir {
        artifacts = artifacts.with_junit_dir(dir);
    }
    if let Some(secs) = secs {
        let duration = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("Invalid test duration: {secs}"))?;
        artifacts = artifacts.with_duration(duration);
    }
    Ok(artifacts)
}

fn parse_log(log: &Path, strict: bool) -> Result<()> {
    let parser = LogParser::new()?;
    match parser.parse_log_file(log, strict)? {
        Some(counts) => {
            println!("{}", counts);
            Ok(())
        }
        None => {
            eprintln!("Couldn't parse test results from {}", log.display());
            std::process::exit(1);
        }
    }
}

fn parse_junit(files: &[PathBuf]) -> Result<()> {
    if let Some(counts) = libtester::parse_junit_xml(files)? {
        println!("{}", counts);
    }
    Ok(())
}

fn compare(
    config: &Config,
    package: &str,
    reference: &RunArtifacts,
    alternative: &RunArtifacts,
    output: &Path,
) -> Result<()> {
    let parser = LogParser::new()?;
    let report = compare_package(&parser, config, package, reference, alternative);

    print_summary(&report);
    write_results(output, &report.results)
}

async fn batch(config: Config, results_dir: &Path, results_file: &str) -> Result<()> {
    let parser = Arc::new(LogParser::new()?);
    let reports = compare_results_dir(parser, Arc::new(config), results_dir).await?;

    for report in &reports {
        let path = results_dir.join(&report.package).join(results_file);
        write_results(&path, &report.results)?;
        println!("{}", summary_line(report));
    }

    let aborted = reports.iter().filter(|r| r.comparison.is_aborted()).count();
    info!(
        "Compared {} packages ({} inconclusive)",
        reports.len(),
        aborted
    );
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match resolve_config(path) {
        Ok(config) => {
            let (reference, alternative) = Interpreter::pair(&config);
            println!("Configuration is valid!");
            println!();
            println!("Settings:");
            println!("  Reference interpreter: {}", reference);
            println!("  Alternative interpreter: {}", alternative);
            println!("  Packages: {}", config.packages.len());
            for (name, package) in &config.packages {
                let source = match &package.junit_xml {
                    Some(pattern) => format!("junit {pattern}"),
                    None => "log".to_string(),
                };
                let lower = if package.allow_lower_total {
                    ", lower total allowed"
                } else {
                    ""
                };
                println!("    {}: {}{}", name, source, lower);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    }
}
