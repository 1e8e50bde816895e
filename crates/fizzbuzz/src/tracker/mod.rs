//! Concurrent request-frequency tracking.
//!
//! [`FrequencyTracker`] owns one table mapping each [`RequestSignature`] to the
//! number of times it has been recorded. The whole table sits behind a single
//! reader/writer lock: [`FrequencyTracker::record`] takes it exclusively for
//! one lookup-and-increment, while [`FrequencyTracker::most_frequent`] and
//! [`FrequencyTracker::len`] share it for the duration of their scan. No
//! operation blocks on anything but the lock itself.
//!
//! A `record` and a later `most_frequent` are separate critical sections. A
//! query racing an in-flight `record` may or may not see that increment, but
//! it never observes a partially applied one.

mod signature;

pub use signature::*;

use crate::lock::{RwLock, read, write};
use std::collections::HashMap;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Counts observations per [`RequestSignature`] for the lifetime of the
/// tracker.
///
/// Every signature in the table has a count of at least one, and counts only
/// ever grow. The table is unbounded; nothing is evicted.
///
/// The tracker is an ordinary value: share it behind an `Arc` across request
/// handlers, or build a fresh one per test.
///
/// # Example
/// ```
/// use core::num::NonZeroU64;
/// use fizzbuzz::{FrequencyTracker, RequestSignature};
///
/// let nz = |v| NonZeroU64::new(v).unwrap();
/// let a = RequestSignature::new(nz(3), nz(5), 15, "fizz", "buzz");
/// let b = RequestSignature::new(nz(2), nz(7), 10, "hello", "world");
///
/// let tracker = FrequencyTracker::new();
/// assert_eq!(tracker.most_frequent(), None);
///
/// for _ in 0..3 {
///     tracker.record(a.clone());
/// }
/// tracker.record(b);
///
/// assert_eq!(tracker.most_frequent(), Some((a, 3)));
/// assert_eq!(tracker.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct FrequencyTracker {
    counts: RwLock<HashMap<RequestSignature, u64>>,
}

impl FrequencyTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation of `signature`.
    ///
    /// Inserts the signature with a count of one the first time it is seen
    /// and increments it afterwards. Concurrent calls never lose an update.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn record(&self, signature: RequestSignature) {
        let mut counts = write(&self.counts);
        *counts.entry(signature).or_insert(0) += 1;
    }

    /// Returns a signature holding the highest count, with that count.
    ///
    /// Returns `None` when nothing has been recorded yet, which callers should
    /// treat as "no statistics", not as a failure.
    ///
    /// When several signatures share the highest count, which one is returned
    /// is unspecified: the table is scanned in its (arbitrary) iteration order
    /// and the first maximal entry found wins. It is neither the first nor the
    /// last one recorded, and may differ between runs.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn most_frequent(&self) -> Option<(RequestSignature, u64)> {
        max_entry(&read(&self.counts))
    }

    /// Returns the number of distinct signatures together with
    /// [`Self::most_frequent`], both read from the same snapshot of the table.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn snapshot(&self) -> (usize, Option<(RequestSignature, u64)>) {
        let counts = read(&self.counts);
        (counts.len(), max_entry(&counts))
    }

    /// Returns how many times `signature` has been recorded.
    pub fn count(&self, signature: &RequestSignature) -> u64 {
        read(&self.counts).get(signature).copied().unwrap_or(0)
    }

    /// Returns the number of distinct signatures recorded so far.
    pub fn len(&self) -> usize {
        read(&self.counts).len()
    }

    /// Returns `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        read(&self.counts).is_empty()
    }
}

fn max_entry(counts: &HashMap<RequestSignature, u64>) -> Option<(RequestSignature, u64)> {
    let mut best: Option<(&RequestSignature, u64)> = None;
    for (signature, &count) in counts {
        if best.is_none_or(|(_, max)| count > max) {
            best = Some((signature, count));
        }
    }
    best.map(|(signature, count)| (signature.clone(), count))
}
