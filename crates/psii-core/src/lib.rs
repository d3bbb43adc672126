//! Threshold segmentation of single-band PSII raster frames.
//!
//! Each image is binned into five fixed intensity bands and reduced to a
//! pixel count and intensity-weighted mean per band. Images are gathered per
//! input directory into one output table.

pub mod bands;
pub mod batch;
pub mod classify;
pub mod discover;
pub mod error;
pub mod histogram;
pub mod naming;
pub mod raster;
pub mod table;

pub use bands::{IntensityBand, BANDS};
pub use batch::{process_all, process_directory, segment_directory, write_table, DirectoryReport};
pub use classify::{classify, BandResult};
pub use error::{Result, SegmentationError};
pub use raster::{read_raster, Raster};
pub use table::OutputTable;
