//! Configuration schema definitions for libtester.
//!
//! This module defines the configuration types deserialized from TOML.
//!
//! # Schema Overview
//!
//! ```text
//! Config (root)
//! ├── InterpreterConfig      - Names of the reference and alternative interpreters
//! └── packages               - Map of package name to PackageConfig
//!     └── PackageConfig      - Per-package parsing and reconciliation settings
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::reconcile::ReconcilePolicy;

/// Root configuration structure for libtester.
///
/// Every section is optional. An empty file is a valid configuration
/// comparing `cpython` against `graalpy` with default package settings.
///
/// # TOML Structure
///
/// ```toml
/// [interpreters]
/// reference = "cpython"
/// alternative = "graalpy"
///
/// [packages.requests]
/// version = "2.31.0"
/// allow_lower_total = true
///
/// [packages.lxml]
/// junit_xml = "junit*.xml"
/// subdirectory = "src"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Which interpreters are compared.
    #[serde(default)]
    pub interpreters: InterpreterConfig,

    /// Per-package settings, keyed by package name.
    #[serde(default)]
    pub packages: BTreeMap<String, PackageConfig>,
}

impl Config {
    /// Settings for `name`, or defaults for a package with no entry.
    pub fn package(&self, name: &str) -> PackageConfig {
        self.packages.get(name).cloned().unwrap_or_default()
    }
}

/// Names of the two interpreters under comparison.
///
/// The names are used for log file names (`{name}-test.log`) and record
/// names (`{name}-test`).
///
/// # Defaults
///
/// | Field | Default |
/// |-------|---------|
/// | `reference` | `cpython` |
/// | `alternative` | `graalpy` |
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterpreterConfig {
    /// Interpreter whose results are ground truth. Its logs are parsed in
    /// strict mode.
    #[serde(default = "default_reference")]
    pub reference: String,

    /// Interpreter under evaluation.
    #[serde(default = "default_alternative")]
    pub alternative: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            reference: default_reference(),
            alternative: default_alternative(),
        }
    }
}

fn default_reference() -> String {
    "cpython".to_string()
}

fn default_alternative() -> String {
    "graalpy".to_string()
}

/// Settings for one package.
///
/// # Example
///
/// ```toml
/// [packages.twisted]
/// version = "23.10.0"
/// junit_xml = "reports/*.xml"
/// allow_lower_total = true
/// subdirectory = "src"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PackageConfig {
    /// Package version, informational.
    pub version: Option<String>,

    /// Glob for JUnit XML reports. When set, counts come from the reports
    /// instead of the console log.
    pub junit_xml: Option<String>,

    /// Accept a lower test total from the alternative interpreter.
    #[serde(default)]
    pub allow_lower_total: bool,

    /// Directory (relative to the JUnit search root) that holds the test
    /// suite.
    pub subdirectory: Option<PathBuf>,
}

impl PackageConfig {
    /// Reconciliation policy for this package.
    pub fn reconcile_policy(&self) -> ReconcilePolicy {
        ReconcilePolicy {
            allow_lower_total: self.allow_lower_total,
        }
    }
}
