//! Reconciling alternative-interpreter counts against the reference run.
//!
//! Many packages run several test sessions, and an alternative interpreter
//! that crashes or times out part way through simply reports fewer tests.
//! Compared naively, such a run could look *better* than the reference. So
//! every test the reference ran that the alternative run doesn't account
//! for is charged to the alternative run as a failure.
//!
//! # Example
//!
//! ```
//! use libtester::TestResultCounts;
//! use libtester::reconcile::{Comparison, ReconcilePolicy, reconcile};
//!
//! let reference = TestResultCounts::passed(100);
//! let alternative = TestResultCounts::passed(80);
//!
//! let comparison = reconcile(Some(&reference), Some(alternative), ReconcilePolicy::default());
//! assert_eq!(
//!     comparison,
//!     Comparison::Compared {
//!         alternative: TestResultCounts::new(80, 20, 0, 0),
//!         unexecuted: 20,
//!     }
//! );
//! ```

use tracing::{debug, info};

use crate::counts::TestResultCounts;

/// Per-package reconciliation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// Accept a lower total from the alternative interpreter, as long as it
    /// ran at least one test. Used for packages whose test collection
    /// legitimately differs between interpreters.
    pub allow_lower_total: bool,
}

/// Outcome of comparing two runs of the same test suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The reference run produced no result or passed nothing, so there is
    /// nothing trustworthy to compare against.
    Aborted,

    /// The runs are comparable.
    Compared {
        /// Alternative counts with unexecuted tests charged as failures.
        alternative: TestResultCounts,
        /// Number of tests added to `alternative`'s failures.
        unexecuted: u64,
    },
}

impl Comparison {
    /// Returns `true` if the comparison was inconclusive.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Comparison::Aborted)
    }

    /// Reconciled alternative counts, if the runs were comparable.
    pub fn alternative(&self) -> Option<TestResultCounts> {
        match self {
            Comparison::Aborted => None,
            Comparison::Compared { alternative, .. } => Some(*alternative),
        }
    }
}

/// Reconciles the alternative run's counts against the reference run's.
///
/// A missing alternative result is treated as zero tests run. When the
/// alternative total falls short of the reference total, the shortfall is
/// added to its failures, unless the policy allows a lower total and the
/// alternative ran anything at all.
pub fn reconcile(
    reference: Option<&TestResultCounts>,
    alternative: Option<TestResultCounts>,
    policy: ReconcilePolicy,
) -> Comparison {
    let Some(reference) = reference.filter(|r| r.passed_count() > 0) else {
        info!("Reference run didn't complete, not comparing");
        return Comparison::Aborted;
    };

    let alternative = alternative.unwrap_or_default();
    let shortfall = reference.total().saturating_sub(alternative.total());
    let waived = policy.allow_lower_total && alternative.total() != 0;

    if shortfall == 0 || waived {
        if shortfall > 0 {
            debug!("Lower total allowed, ignoring {} unexecuted tests", shortfall);
        }
        return Comparison::Compared {
            alternative,
            unexecuted: 0,
        };
    }

    debug!("Charging {} unexecuted tests as failures", shortfall);
    Comparison::Compared {
        alternative: alternative.with_additional_failures(shortfall),
        unexecuted: shortfall,
    }
}
