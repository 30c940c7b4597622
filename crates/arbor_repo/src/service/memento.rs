//! I define helpers over the memento store contract: the range
//! view derived from the sorted instant listing.
//!

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

/// A half-open validity window of one memento: the snapshot at
/// `from` answers lookups until `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    /// Instant of the snapshot.
    pub from: DateTime<Utc>,

    /// Instant the next snapshot supersedes it, or the listing
    /// horizon for the latest one.
    pub until: DateTime<Utc>,
}

/// Derive the range view over a sorted instant listing, up to
/// given horizon. Mementos are point events; each range spans
/// from its snapshot to the next.
pub fn version_ranges(
    instants: &BTreeSet<DateTime<Utc>>,
    horizon: DateTime<Utc>,
) -> Vec<VersionRange> {
    let mut ranges = Vec::with_capacity(instants.len());
    let mut iter = instants.iter().peekable();
    while let Some(from) = iter.next() {
        let until = iter.peek().copied().copied().unwrap_or(horizon);
        ranges.push(VersionRange { from: *from, until });
    }
    ranges
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn ranges_chain_and_end_at_horizon() {
        let t = |s| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, s).unwrap();
        let instants: BTreeSet<_> = [t(0), t(10), t(20)].into_iter().collect();
        let horizon = t(30);

        let ranges = version_ranges(&instants, horizon);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].from, t(0));
        assert_eq!(ranges[0].until, t(10));
        assert_eq!(ranges[1].until, t(20));
        assert_eq!(ranges[2].until, horizon);
    }

    #[test]
    fn empty_listing_yields_no_ranges() {
        assert!(version_ranges(&BTreeSet::new(), Utc::now()).is_empty());
    }
}
