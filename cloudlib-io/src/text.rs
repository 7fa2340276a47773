//! Plain-text single-cloud format
//!
//! The first line holds the point count, followed by one `x y z` line per
//! point:
//!
//! ```text
//! 2
//! 1 2 3
//! 4.5 -1 0.25
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. The count line is
//! optional on input; when present it must match the number of rows.

use crate::PointCloudSource;
use cloudlib_core::{Error, Point, PointCloud, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Options for writing the text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextWriteOptions {
    /// Emit the leading point-count line
    pub write_count_header: bool,
}

impl Default for TextWriteOptions {
    fn default() -> Self {
        Self {
            write_count_header: true,
        }
    }
}

impl TextWriteOptions {
    /// Bare `x y z` rows without a count line
    pub fn rows_only() -> Self {
        Self {
            write_count_header: false,
        }
    }
}

/// Write `cloud` as text
///
/// Floats are written in their shortest round-trip form, so reading the file
/// back reproduces the exact values.
pub fn write_text<W: Write>(
    writer: &mut W,
    cloud: &PointCloud,
    options: &TextWriteOptions,
) -> Result<()> {
    if options.write_count_header {
        writeln!(writer, "{}", cloud.len())?;
    }
    for p in cloud.iter() {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Write `cloud` to a text file with default options
pub fn save_to_text<P: AsRef<Path>>(path: P, cloud: &PointCloud) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_text(&mut writer, cloud, &TextWriteOptions::default())?;
    writer.flush()?;
    Ok(())
}

/// Parse text rows and append them to `cloud`, returning how many points
/// were added
///
/// Parsing completes before anything is appended: on error the cloud is left
/// exactly as it was.
pub fn read_text<R: BufRead>(reader: R, cloud: &mut PointCloud) -> Result<usize> {
    let mut declared: Option<usize> = None;
    let mut points = Vec::new();
    let mut seen_content = false;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if !seen_content && fields.len() == 1 {
            declared = Some(fields[0].parse::<usize>().map_err(|_| {
                Error::Parse(format!("line {}: invalid point count {:?}", line_no + 1, fields[0]))
            })?);
            seen_content = true;
            continue;
        }
        seen_content = true;

        points.push(parse_row(&fields, line_no + 1)?);
    }

    if let Some(declared) = declared {
        if declared != points.len() {
            return Err(Error::Parse(format!(
                "header declares {} points but {} rows follow",
                declared,
                points.len()
            )));
        }
    }

    let added = points.len();
    cloud.extend(points);
    Ok(added)
}

/// Append the points of the text file at `path` to `cloud`
pub fn load_from_text<P: AsRef<Path>>(path: P, cloud: &mut PointCloud) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let added = read_text(BufReader::new(file), cloud)?;
    debug!("read {} points from {}", added, path.display());
    Ok(added)
}

fn parse_row(fields: &[&str], line_no: usize) -> Result<Point> {
    if fields.len() != 3 {
        return Err(Error::Parse(format!(
            "line {}: expected 3 values, found {}",
            line_no,
            fields.len()
        )));
    }

    let mut xyz = [0.0f32; 3];
    for (slot, field) in xyz.iter_mut().zip(fields) {
        *slot = field
            .parse::<f32>()
            .map_err(|_| Error::Parse(format!("line {}: invalid number {:?}", line_no, field)))?;
    }
    Ok(Point::from(xyz))
}

/// Text-format reader usable wherever a [`PointCloudSource`] is expected
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReader;

impl PointCloudSource for TextReader {
    fn populate(&self, path: &Path, cloud: &mut PointCloud) -> Result<()> {
        load_from_text(path, cloud).map(|_| ())
    }
}
