//! Band classification and per-band statistics for one image.
//!
//! For every band in [`BANDS`], in declaration order:
//!   area = Σ count            over histogram values v with min ≤ v ≤ max
//!   mean = Σ v·count / area   (0 when area = 0)
//! Bands are disjoint, so no pixel contributes to two results.

use std::path::Path;

use tracing::debug;

use crate::bands::{IntensityBand, BANDS};
use crate::error::Result;
use crate::histogram::PixelHistogram;
use crate::naming::{image_label, plot_name};
use crate::raster::{read_raster, Raster};

/// One output row: the statistics of one band in one image.
#[derive(Debug, Clone, PartialEq)]
pub struct BandResult {
    /// Image file name.
    pub label: String,
    /// Number of pixels inside the band.
    pub area: u64,
    /// Intensity-weighted mean inside the band, 0.0 for an empty band.
    pub mean: f64,
    pub min: u16,
    pub max: u16,
    /// Parent-directory name of the image.
    pub plot: String,
}

/// Area and weighted mean of one band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BandStats {
    pub area: u64,
    pub mean: f64,
}

/// Accumulate area and weighted mean of `band` from `hist`.
pub(crate) fn band_stats(hist: &PixelHistogram, band: &IntensityBand) -> BandStats {
    let mut area = 0u64;
    let mut weighted = 0u128;
    for (value, count) in hist.range(band.min, band.max) {
        area += count;
        weighted += u128::from(value) * u128::from(count);
    }
    let mean = if area == 0 { 0.0 } else { weighted as f64 / area as f64 };
    BandStats { area, mean }
}

/// Classify a flat pixel buffer. Always returns exactly `BANDS.len()` rows.
pub fn classify_pixels(pixels: &[u16], label: &str, plot: &str) -> Vec<BandResult> {
    let hist = PixelHistogram::from_pixels(pixels);
    BANDS
        .iter()
        .map(|band| {
            let stats = band_stats(&hist, band);
            BandResult {
                label: label.to_owned(),
                area: stats.area,
                mean: stats.mean,
                min: band.min,
                max: band.max,
                plot: plot.to_owned(),
            }
        })
        .collect()
}

/// Classify a decoded raster.
pub fn classify(raster: &Raster, label: &str, plot: &str) -> Vec<BandResult> {
    classify_pixels(raster.pixels(), label, plot)
}

/// Read the image at `path` and classify it. Label and plot come from the path.
pub fn classify_file(path: &Path) -> Result<Vec<BandResult>> {
    let raster = read_raster(path)?;
    let label = image_label(path);
    let plot = plot_name(path);
    debug!(
        "{label}: {}x{} px, plot {plot:?}",
        raster.width, raster.height
    );
    Ok(classify(&raster, &label, &plot))
}
