//! I/O for point clouds
//!
//! This crate persists collections of clouds to the compact binary container
//! in [`binary`], reads and writes the plain-text single-cloud format in
//! [`text`], and defines [`PointCloudSource`], the contract external readers
//! implement to feed points into a cloud.

pub mod binary;
pub mod text;

pub use binary::{
    decode, encode, encoded_len, load_from_bin, read_clouds, save_to_bin, write_clouds,
    NAME_FLAG, POINT_SIZE,
};
pub use text::{load_from_text, read_text, save_to_text, write_text, TextReader, TextWriteOptions};

use cloudlib_core::{PointCloud, Result};
use std::path::Path;

/// A reader that appends points from a file to an existing cloud
///
/// After a successful call the cloud holds its previous points followed by
/// the file's points in file order. Failures to open or parse the file are
/// returned, never swallowed into a partially filled cloud.
pub trait PointCloudSource {
    fn populate(&self, path: &Path, cloud: &mut PointCloud) -> Result<()>;
}

impl<F> PointCloudSource for F
where
    F: Fn(&Path, &mut PointCloud) -> Result<()>,
{
    fn populate(&self, path: &Path, cloud: &mut PointCloud) -> Result<()> {
        self(path, cloud)
    }
}

/// Populate a fresh cloud named after the file stem
pub fn read_named<S: PointCloudSource + ?Sized>(source: &S, path: &Path) -> Result<PointCloud> {
    let mut cloud = PointCloud::new();
    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        cloud.set_name(stem);
    }
    source.populate(path, &mut cloud)?;
    Ok(cloud)
}
