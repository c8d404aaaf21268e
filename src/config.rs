//! Configuration loading and schema definitions for libtester.
//!
//! This module provides types and functions for loading libtester
//! configuration from TOML files or strings. The configuration names the
//! reference and alternative interpreters and holds per-package settings
//! for result parsing and reconciliation.

pub mod schema;

pub use schema::*;

use std::path::Path;

use anyhow::{Context, Result};

/// Loads libtester configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read (e.g., doesn't exist or permission denied)
/// - The file contains invalid TOML syntax
/// - The configuration doesn't match the expected schema
///
/// # Example
///
/// ```no_run
/// use libtester::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("libtester.toml"))?;
/// println!("Reference: {}", config.interpreters.reference);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Loads libtester configuration from a TOML string.
///
/// # Example
///
/// ```
/// use libtester::config::load_config_str;
///
/// let config = load_config_str(r#"
///     [interpreters]
///     alternative = "pypy"
///
///     [packages.requests]
///     allow_lower_total = true
/// "#)?;
///
/// assert_eq!(config.interpreters.reference, "cpython");
/// assert_eq!(config.interpreters.alternative, "pypy");
/// assert!(config.package("requests").allow_lower_total);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;

    Ok(config)
}
