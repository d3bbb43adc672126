//! Directory-level batching: discover → name → classify → table → CSV.
//!
//! Images in one directory are independent; with the `threading` feature
//! they are classified on the rayon pool and collected back in discovery
//! order, so the table is identical to a sequential run.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[cfg(feature = "threading")]
use rayon::prelude::*;
use tracing::debug;

use crate::classify::{classify_file, BandResult};
use crate::discover::discover_images;
use crate::error::{Result, SegmentationError};
use crate::naming::{output_identifier, table_file_name};
use crate::table::OutputTable;

/// Outcome of one successfully segmented directory.
#[derive(Debug, Clone)]
pub struct DirectoryReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub images: usize,
    pub rows: usize,
    pub elapsed: Duration,
}

/// Classify `images` in order and gather their rows under `identifier`.
/// The first unreadable image aborts the whole table.
pub fn build_table(identifier: &str, images: &[PathBuf]) -> Result<OutputTable> {
    #[cfg(feature = "threading")]
    let per_image: Vec<Vec<BandResult>> =
        images.par_iter().map(|p| classify_file(p)).collect::<Result<_>>()?;
    #[cfg(not(feature = "threading"))]
    let per_image: Vec<Vec<BandResult>> =
        images.iter().map(|p| classify_file(p)).collect::<Result<_>>()?;

    let mut table = OutputTable::new(identifier);
    for rows in per_image {
        table.push_image(rows);
    }
    Ok(table)
}

/// Build the output table for every `.tif` directly under `dir`.
///
/// The identifier comes from the first image in sorted order. A directory
/// without images is an error, never an empty table.
pub fn process_directory(dir: &Path) -> Result<OutputTable> {
    let images = discover_images(dir)?;
    let first = images
        .first()
        .ok_or_else(|| SegmentationError::EmptyDirectory { path: dir.to_path_buf() })?;
    let identifier = output_identifier(first)?;
    debug!("{}: {} images, identifier {identifier}", dir.display(), images.len());
    build_table(&identifier, &images)
}

/// Lazily process each directory in turn. Each item carries its own result,
/// so the caller decides whether a failure stops the run.
pub fn process_all<I, P>(dirs: I) -> impl Iterator<Item = (PathBuf, Result<OutputTable>)>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    dirs.into_iter().map(|dir| {
        let dir = dir.as_ref().to_path_buf();
        let table = process_directory(&dir);
        (dir, table)
    })
}

/// Write `table` (built from `dir`) to `{outdir}/{identifier}_segmentation.csv`.
/// `start` marks when processing of `dir` began.
pub fn write_table(
    dir: &Path,
    table: &OutputTable,
    outdir: &Path,
    start: Instant,
) -> Result<DirectoryReport> {
    let output = outdir.join(table_file_name(&table.identifier));
    table.write_to(&output)?;
    Ok(DirectoryReport {
        input: dir.to_path_buf(),
        output,
        images: table.image_count(),
        rows: table.len(),
        elapsed: start.elapsed(),
    })
}

/// Process `dir` and write its table into `outdir`.
/// Nothing is written if any step before serialisation fails.
pub fn segment_directory(dir: &Path, outdir: &Path) -> Result<DirectoryReport> {
    let start = Instant::now();
    let table = process_directory(dir)?;
    write_table(dir, &table, outdir, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tiff::encoder::{colortype, TiffEncoder};

    fn write_gray8(path: &Path, width: u32, height: u32, data: &[u8]) {
        let file = File::create(path).unwrap();
        TiffEncoder::new(file)
            .unwrap()
            .write_image::<colortype::Gray8>(width, height, data)
            .unwrap();
    }

    fn plot_dir(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn two_images_give_ten_rows_in_discovery_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = plot_dir(tmp.path(), "plot9");
        write_gray8(&dir.join("B.tif"), 2, 1, &[30, 30]);
        write_gray8(&dir.join("A.tif"), 2, 2, &[5, 5, 5, 5]);

        let images = discover_images(&dir).unwrap();
        let table = build_table("X", &images).unwrap();
        assert_eq!(table.len(), 10);
        assert!(table.rows[..5].iter().all(|r| r.label == "A.tif"));
        assert!(table.rows[5..].iter().all(|r| r.label == "B.tif"));
        assert!(table.rows.iter().all(|r| r.plot == "plot9"));
        assert_eq!(table.rows[0].area, 4);
        assert_eq!(table.rows[9].area, 2);
    }

    #[test]
    fn identifier_comes_from_first_sorted_image() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = plot_dir(tmp.path(), "p1");
        write_gray8(&dir.join("p1_SECOND_ps2.tif"), 1, 1, &[9]);
        write_gray8(&dir.join("p1_FIRST_ps2.tif"), 1, 1, &[12]);

        let table = process_directory(&dir).unwrap();
        assert_eq!(table.identifier, "FIRST");
        assert_eq!(table.image_count(), 2);
        // Every row shares the directory's identifier, whichever image it came from.
        assert_eq!(table.rows[0].label, "p1_FIRST_ps2.tif");
        assert_eq!(table.rows[2].area, 1); // FIRST: 12 → t3
        assert_eq!(table.rows[6].area, 1); // SECOND: 9 → t2
    }

    #[test]
    fn appledouble_sidecar_does_not_name_or_break_the_table() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = plot_dir(tmp.path(), "p1");
        write_gray8(&dir.join("p1_ID_a.tif"), 1, 1, &[4]);
        fs::write(dir.join("._p1_ID_a.tif"), b"\x00\x05\x16\x07 sidecar").unwrap();

        let table = process_directory(&dir).unwrap();
        assert_eq!(table.identifier, "ID");
        assert_eq!(table.len(), 5);
        assert!(table.rows.iter().all(|r| r.label == "p1_ID_a.tif"));
    }

    #[test]
    fn empty_directory_is_fatal_and_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = plot_dir(tmp.path(), "empty");
        let out = plot_dir(tmp.path(), "out");

        let err = segment_directory(&dir, &out).unwrap_err();
        assert!(matches!(err, SegmentationError::EmptyDirectory { .. }), "got {err}");
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn undecodable_image_aborts_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = plot_dir(tmp.path(), "p2");
        let out = plot_dir(tmp.path(), "out");
        write_gray8(&dir.join("p2_ID_a.tif"), 1, 1, &[1]);
        fs::write(dir.join("p2_ID_b.tif"), b"broken").unwrap();

        let err = segment_directory(&dir, &out).unwrap_err();
        assert!(matches!(err, SegmentationError::Decode { .. }), "got {err}");
        assert!(!out.join("ID_segmentation.csv").exists());
    }

    #[test]
    fn segment_directory_writes_named_table() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = plot_dir(tmp.path(), "p3");
        let out = plot_dir(tmp.path(), "out");
        write_gray8(&dir.join("p3_20200823_ps2.tif"), 2, 1, &[10, 12]);

        let report = segment_directory(&dir, &out).unwrap();
        assert_eq!(report.output, out.join("20200823_segmentation.csv"));
        assert_eq!((report.images, report.rows), (1, 5));

        let text = fs::read_to_string(&report.output).unwrap();
        assert!(text.starts_with(",Label,Area,Mean,Min,Max,Plot\n"));
        assert!(text.contains("1,p3_20200823_ps2.tif,1,10.0,8,10,p3\n"), "{text}");
        assert!(text.contains("2,p3_20200823_ps2.tif,1,12.0,11,14,p3\n"), "{text}");
    }

    #[test]
    fn process_all_isolates_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let good = plot_dir(tmp.path(), "good");
        let empty = plot_dir(tmp.path(), "empty");
        write_gray8(&good.join("g_ID_x.tif"), 1, 1, &[0]);

        let results: Vec<_> = process_all([&empty, &good]).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, empty);
        assert!(results[0].1.is_err());
        assert_eq!(results[1].1.as_ref().unwrap().len(), 5);
    }
}
