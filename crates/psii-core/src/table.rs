//! Per-directory output table and its delimited-text serialisation.
//!
//! Layout (one row per image × band, image-then-band order):
//!   ,Label,Area,Mean,Min,Max,Plot
//!   0,A_ID_x.tif,120,5.0,0,7,plot1
//! The leading unnamed column is a 0-based row index.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::bands::BANDS;
use crate::classify::BandResult;
use crate::error::{Result, SegmentationError};

pub const HEADER: [&str; 7] = ["", "Label", "Area", "Mean", "Min", "Max", "Plot"];

/// All band rows produced for the images of one input directory.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    /// Shared identifier used to name the output file.
    pub identifier: String,
    pub rows: Vec<BandResult>,
}

impl OutputTable {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), rows: Vec::new() }
    }

    /// Append one image's rows (one per band).
    pub fn push_image(&mut self, rows: Vec<BandResult>) {
        debug_assert_eq!(rows.len(), BANDS.len());
        self.rows.extend(rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Number of images that contributed rows.
    pub fn image_count(&self) -> usize {
        self.rows.len() / BANDS.len()
    }

    pub fn write_csv<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{}", HEADER.join(","))?;
        for (i, row) in self.rows.iter().enumerate() {
            writeln!(
                w,
                "{i},{},{},{:?},{},{},{}",
                escape_field(&row.label),
                row.area,
                row.mean,
                row.min,
                row.max,
                escape_field(&row.plot),
            )?;
        }
        w.flush()
    }

    /// Write the table to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let write_err = |source: io::Error| SegmentationError::Write { path: path.to_path_buf(), source };
        let file = File::create(path).map_err(write_err)?;
        self.write_csv(BufWriter::new(file)).map_err(write_err)
    }
}

/// Quote a field if it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_pixels;

    fn render(table: &OutputTable) -> String {
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_and_row_layout() {
        let mut table = OutputTable::new("ID");
        table.push_image(classify_pixels(&[5, 5, 5, 5], "P_ID_a.tif", "plot1"));
        let text = render(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], ",Label,Area,Mean,Min,Max,Plot");
        assert_eq!(lines[1], "0,P_ID_a.tif,4,5.0,0,7,plot1");
        assert_eq!(lines[2], "1,P_ID_a.tif,0,0.0,8,10,plot1");
        assert_eq!(lines[5], "4,P_ID_a.tif,0,0.0,20,255,plot1");
    }

    #[test]
    fn row_index_continues_across_images() {
        let mut table = OutputTable::new("ID");
        table.push_image(classify_pixels(&[1], "A.tif", "p"));
        table.push_image(classify_pixels(&[30], "B.tif", "p"));
        assert_eq!(table.len(), 10);
        assert_eq!(table.image_count(), 2);
        let text = render(&table);
        let last = text.lines().last().unwrap();
        assert_eq!(last, "9,B.tif,1,30.0,20,255,p");
    }

    #[test]
    fn fractional_means_keep_full_precision() {
        let mut table = OutputTable::new("ID");
        table.push_image(classify_pixels(&[20, 21, 21], "A.tif", "p"));
        let text = render(&table);
        assert!(text.contains(",3,20.666666666666668,20,255,"), "{text}");
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let table = OutputTable::new("ID");
        let err = table.write_to(&tmp.path().join("no/such/dir/out.csv")).unwrap_err();
        assert!(matches!(err, SegmentationError::Write { .. }), "got {err}");
    }
}
