use std::cmp::Reverse;

use foundation::time::EpochMillis;

use crate::DatasetDescriptor;

/// USGS quality tier derived from a free-text label. Lower is better.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualityScore(u8);

const QUALITY_TIERS: [(&str, u8); 4] = [("QL0", 0), ("QL1", 1), ("QL2", 2), ("QL3", 3)];

impl QualityScore {
    pub const UNKNOWN: QualityScore = QualityScore(9);

    /// Case-insensitive substring match against `QL0`..`QL3`, checked from the
    /// finest tier down. Anything else, including a missing label, is unknown.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return Self::UNKNOWN;
        };
        let upper = label.to_ascii_uppercase();
        QUALITY_TIERS
            .iter()
            .find(|(tier, _)| upper.contains(tier))
            .map(|(_, score)| QualityScore(*score))
            .unwrap_or(Self::UNKNOWN)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Sort key: better quality first, then most recent first.
pub fn rank_key(descriptor: &DatasetDescriptor) -> (QualityScore, Reverse<EpochMillis>) {
    (descriptor.quality_score(), Reverse(descriptor.published_at()))
}

/// Orders descriptors best-first. Descriptors that tie on both quality and
/// date keep their input order. The input is never modified.
pub fn rank(descriptors: &[DatasetDescriptor]) -> Vec<&DatasetDescriptor> {
    let mut keyed: Vec<_> = descriptors.iter().map(|d| (rank_key(d), d)).collect();
    // `sort_by` is stable.
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, d)| d).collect()
}

/// The single best candidate to load, or `None` for an empty search result.
pub fn select_best(descriptors: &[DatasetDescriptor]) -> Option<&DatasetDescriptor> {
    // `min_by_key` returns the first of equal minima, matching `rank`.
    descriptors.iter().min_by_key(|d| rank_key(d))
}
