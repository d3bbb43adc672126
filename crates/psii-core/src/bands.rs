//! Fixed intensity bands used for threshold segmentation.
//!
//! The five bands are contiguous, non-overlapping and together cover the
//! full 8-bit intensity domain [0, 255].

/// A named, inclusive intensity range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntensityBand {
    pub name: &'static str,
    pub min: u16,
    pub max: u16,
}

impl IntensityBand {
    #[inline]
    pub const fn contains(&self, value: u16) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Band table in declaration order. Output rows follow this order.
pub const BANDS: [IntensityBand; 5] = [
    IntensityBand { name: "t1", min: 0, max: 7 },
    IntensityBand { name: "t2", min: 8, max: 10 },
    IntensityBand { name: "t3", min: 11, max: 14 },
    IntensityBand { name: "t4", min: 15, max: 19 },
    IntensityBand { name: "t5", min: 20, max: 255 },
];
