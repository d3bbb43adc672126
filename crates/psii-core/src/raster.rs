//! Single-band raster frames and the TIFF reader that produces them.
//!
//! Only the first image of a TIFF is read. Chunky multi-sample images are
//! reduced to their first sample per pixel (band 1).

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};

use crate::error::{Result, SegmentationError};

/// Row-major pixel intensities of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub data: Vec<u16>,
    pub width: usize,
    pub height: usize,
}

impl Raster {
    pub fn from_vec(data: Vec<u16>, width: usize, height: usize) -> Result<Self> {
        if data.len() != width * height {
            return Err(SegmentationError::DimensionMismatch { width, height, len: data.len() });
        }
        Ok(Self { data, width, height })
    }

    /// Raster of `width × height` pixels all set to `fill`.
    #[cfg(test)]
    pub(crate) fn filled(width: usize, height: usize, fill: u16) -> Self {
        Self { data: vec![fill; width * height], width, height }
    }

    pub fn pixels(&self) -> &[u16] {
        &self.data
    }
}

/// Open and decode the raster at `path`.
pub fn read_raster(path: &Path) -> Result<Raster> {
    let file = File::open(path).map_err(|source| SegmentationError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    decode_raster(BufReader::new(file), path)
}

/// Decode a TIFF from any `Read + Seek` source. `path` is only used in errors.
pub fn decode_raster<R: Read + Seek>(reader: R, path: &Path) -> Result<Raster> {
    let decode_err = |source: tiff::TiffError| SegmentationError::Decode { path: path.to_path_buf(), source };

    let mut decoder = Decoder::new(reader).map_err(decode_err)?;
    let (width, height) = decoder.dimensions().map_err(decode_err)?;
    let (width, height) = (width as usize, height as usize);

    let samples: Vec<u16> = match decoder.read_image().map_err(decode_err)? {
        DecodingResult::U8(buf) => buf.into_iter().map(u16::from).collect(),
        DecodingResult::U16(buf) => buf,
        other => {
            return Err(SegmentationError::UnsupportedPixelType {
                path: path.to_path_buf(),
                kind: sample_kind(&other),
            })
        }
    };

    Raster::from_vec(first_band(samples, width, height)?, width, height)
}

/// Keep sample 0 of every pixel when the buffer interleaves several samples.
fn first_band(samples: Vec<u16>, width: usize, height: usize) -> Result<Vec<u16>> {
    let pixels = width * height;
    let mismatch = SegmentationError::DimensionMismatch { width, height, len: samples.len() };
    if pixels == 0 {
        return if samples.is_empty() { Ok(samples) } else { Err(mismatch) };
    }
    if samples.len() % pixels != 0 || samples.len() < pixels {
        return Err(mismatch);
    }
    let per_pixel = samples.len() / pixels;
    if per_pixel == 1 {
        return Ok(samples);
    }
    Ok(samples.into_iter().step_by(per_pixel).collect())
}

fn sample_kind(result: &DecodingResult) -> &'static str {
    match result {
        DecodingResult::U8(_) => "u8",
        DecodingResult::U16(_) => "u16",
        DecodingResult::U32(_) => "u32",
        DecodingResult::U64(_) => "u64",
        DecodingResult::I8(_) => "i8",
        DecodingResult::I16(_) => "i16",
        DecodingResult::I32(_) => "i32",
        DecodingResult::I64(_) => "i64",
        DecodingResult::F32(_) => "f32",
        DecodingResult::F64(_) => "f64",
        #[allow(unreachable_patterns)]
        _ => "unknown",
    }
}
