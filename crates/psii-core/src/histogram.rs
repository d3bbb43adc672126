//! Value → count histogram of one image's pixels.

use std::collections::BTreeMap;

/// Occurrence count of every distinct pixel value in one image.
/// Built once and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelHistogram {
    counts: BTreeMap<u16, u64>,
}

impl PixelHistogram {
    pub fn from_pixels(pixels: &[u16]) -> Self {
        let mut counts = BTreeMap::new();
        for &v in pixels {
            *counts.entry(v).or_insert(0u64) += 1;
        }
        Self { counts }
    }

    /// Count for `value` (0 if never observed).
    #[cfg(test)]
    pub(crate) fn count(&self, value: u16) -> u64 {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    /// Total number of pixels that went into the histogram.
    #[cfg(test)]
    pub(crate) fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct pixel values.
    #[cfg(test)]
    pub(crate) fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// (value, count) pairs restricted to the inclusive range `[min, max]`.
    pub fn range(&self, min: u16, max: u16) -> impl Iterator<Item = (u16, u64)> + '_ {
        self.counts.range(min..=max).map(|(&v, &c)| (v, c))
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (u16, u64)> + '_ {
        self.counts.iter().map(|(&v, &c)| (v, c))
    }
}
