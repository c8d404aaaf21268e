//! Pass/fail/skip/unknown tallies.
//!
//! [`TestResultCounts`] is the one structure every result parser produces,
//! whatever the test runner's output looked like. Counts from several
//! summary blocks or several parsers are folded together with
//! [`TestResultCounts::combine`] (or `.sum()` over an iterator).
//!
//! # Example
//!
//! ```
//! use libtester::TestResultCounts;
//!
//! let first = TestResultCounts::from_total(10, 3, 2, 0);
//! assert_eq!(first.passed_count(), 5);
//!
//! let both = first.combine(TestResultCounts::failed(1));
//! assert_eq!(both.total(), 11);
//! ```

use std::fmt;
use std::iter::Sum;

use serde::Serialize;

/// Number of tests in each outcome bucket for one test run.
///
/// Values are immutable once built. Use [`combine`](Self::combine) to
/// produce a new value rather than editing fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TestResultCounts {
    passed: u64,
    failed: u64,
    skipped: u64,
    unknown: u64,
}

impl TestResultCounts {
    /// Creates counts from all four buckets.
    pub const fn new(passed: u64, failed: u64, skipped: u64, unknown: u64) -> Self {
        Self {
            passed,
            failed,
            skipped,
            unknown,
        }
    }

    /// Counts with only `n` passed tests.
    pub const fn passed(n: u64) -> Self {
        Self::new(n, 0, 0, 0)
    }

    /// Counts with only `n` failed tests.
    pub const fn failed(n: u64) -> Self {
        Self::new(0, n, 0, 0)
    }

    /// Counts with only `n` skipped tests.
    pub const fn skipped(n: u64) -> Self {
        Self::new(0, 0, n, 0)
    }

    /// Counts with only `n` tests of unknown outcome.
    pub const fn unknown(n: u64) -> Self {
        Self::new(0, 0, 0, n)
    }

    /// Builds counts from a runner that reports a total instead of a
    /// passed count.
    ///
    /// `passed` is whatever remains of `total` after the other buckets,
    /// floored at zero. Runner totals don't always add up (unittest in
    /// particular), so an inconsistent total is accepted, never an error.
    pub const fn from_total(total: u64, failed: u64, skipped: u64, unknown: u64) -> Self {
        let passed = total
            .saturating_sub(failed)
            .saturating_sub(skipped)
            .saturating_sub(unknown);
        Self::new(passed, failed, skipped, unknown)
    }

    /// Number of passed tests.
    pub const fn passed_count(&self) -> u64 {
        self.passed
    }

    /// Number of failed (or errored) tests.
    pub const fn failed_count(&self) -> u64 {
        self.failed
    }

    /// Number of skipped tests.
    pub const fn skipped_count(&self) -> u64 {
        self.skipped
    }

    /// Number of tests whose outcome didn't fit another bucket.
    pub const fn unknown_count(&self) -> u64 {
        self.unknown
    }

    /// Sum of all four buckets, saturating at `u64::MAX`.
    pub const fn total(&self) -> u64 {
        self.passed
            .saturating_add(self.failed)
            .saturating_add(self.skipped)
            .saturating_add(self.unknown)
    }

    /// Componentwise sum of two tallies. Each bucket saturates at
    /// `u64::MAX`.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        Self::new(
            self.passed.saturating_add(other.passed),
            self.failed.saturating_add(other.failed),
            self.skipped.saturating_add(other.skipped),
            self.unknown.saturating_add(other.unknown),
        )
    }

    /// Returns a copy with `n` more failures.
    #[must_use]
    pub const fn with_additional_failures(self, n: u64) -> Self {
        self.combine(Self::failed(n))
    }
}

impl Sum for TestResultCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::combine)
    }
}

impl fmt::Display for TestResultCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "passed: {}, failed: {}, skipped: {}, unknown: {}",
            self.passed, self.failed, self.skipped, self.unknown
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_total_derives_passed() {
        let counts = TestResultCounts::from_total(10, 3, 2, 0);
        assert_eq!(counts, TestResultCounts::new(5, 3, 2, 0));
        assert_eq!(counts.total(), 10);
    }

    #[test]
    fn test_from_total_floors_at_zero() {
        let counts = TestResultCounts::from_total(5, 10, 0, 0);
        assert_eq!(counts.passed_count(), 0);
        assert_eq!(counts.failed_count(), 10);
        assert_eq!(counts.total(), 10);
    }

    #[test]
    fn test_from_total_with_unknown() {
        let counts = TestResultCounts::from_total(7, 1, 1, 2);
        assert_eq!(counts, TestResultCounts::new(3, 1, 1, 2));
    }

    #[test]
    fn test_combine_adds_componentwise() {
        let a = TestResultCounts::new(1, 2, 3, 4);
        let b = TestResultCounts::new(10, 20, 30, 40);
        let sum = a.combine(b);
        assert_eq!(sum, TestResultCounts::new(11, 22, 33, 44));
        assert_eq!(sum.total(), a.total() + b.total());
    }

    #[test]
    fn test_combine_commutative_and_associative() {
        let a = TestResultCounts::new(3, 0, 1, 0);
        let b = TestResultCounts::new(0, 5, 0, 2);
        let c = TestResultCounts::new(7, 1, 1, 1);

        assert_eq!(a.combine(b), b.combine(a));
        assert_eq!(a.combine(b).combine(c), a.combine(b.combine(c)));
    }

    #[test]
    fn test_sum_of_empty_iterator_is_zero() {
        let sum: TestResultCounts = std::iter::empty().sum();
        assert_eq!(sum, TestResultCounts::default());
        assert_eq!(sum.total(), 0);
    }

    #[test]
    fn test_sum_matches_combine() {
        let parts = [
            TestResultCounts::passed(4),
            TestResultCounts::failed(1),
            TestResultCounts::skipped(2),
            TestResultCounts::unknown(3),
        ];
        let sum: TestResultCounts = parts.iter().copied().sum();
        assert_eq!(sum, TestResultCounts::new(4, 1, 2, 3));
    }

    #[test]
    fn test_with_additional_failures() {
        let counts = TestResultCounts::passed(80).with_additional_failures(20);
        assert_eq!(counts, TestResultCounts::new(80, 20, 0, 0));
    }

    #[test]
    fn test_combine_saturates() {
        let big = TestResultCounts::new(u64::MAX, 1, 0, 0);
        assert_eq!(big.total(), u64::MAX);
        assert_eq!(
            big.combine(TestResultCounts::new(1, 2, 3, 4)),
            TestResultCounts::new(u64::MAX, 3, 3, 4)
        );
        let sum: TestResultCounts = [big, big].into_iter().sum();
        assert_eq!(sum.passed_count(), u64::MAX);
        assert_eq!(sum.failed_count(), 2);
    }

    #[test]
    fn test_display() {
        let counts = TestResultCounts::new(3, 1, 2, 0);
        assert_eq!(
            counts.to_string(),
            "passed: 3, failed: 1, skipped: 2, unknown: 0"
        );
    }
}
