//! Range-grid noise filtering
//!
//! Organized clouds from range sensors carry a depth value per grid cell.
//! Isolated spikes show up as cells whose depth disagrees with the cells
//! around them. [`NoiseFilter`] compares every candidate's `z` against the
//! median `z` of a square window centred on it and keeps only the candidates
//! that fall strictly within `range_threshold` of that median.

use cloudlib_core::{median_in_place, Error, Layout, PointCloud, PointIndices, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Windowed median depth filter for organized clouds
///
/// # Example
/// ```rust
/// use cloudlib_core::{PointCloud, Point};
/// use cloudlib_algorithms::NoiseFilter;
///
/// fn main() -> cloudlib_core::Result<()> {
///     let mut cloud = PointCloud::organized(3, 3);
///     for i in 0..9 {
///         let z = if i == 4 { 50.0 } else { 2.0 };
///         cloud.push(Point::new((i % 3) as f32, (i / 3) as f32, z));
///     }
///
///     let candidates: Vec<usize> = (0..cloud.len()).collect();
///     let kept = NoiseFilter::new(3, 0.5).filter(&cloud, &candidates)?;
///     assert_eq!(kept, vec![0, 1, 2, 3, 5, 6, 7, 8]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseFilter {
    /// Side length of the square window, in grid cells. The window reaches
    /// `window_size / 2` cells in each direction.
    pub window_size: usize,
    /// Maximum distance from the window median, exclusive
    pub range_threshold: f32,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            window_size: 3,
            range_threshold: 0.01,
        }
    }
}

/// Grid dimensions of a cloud that passed the layout precondition
#[derive(Debug, Clone, Copy)]
struct Grid {
    width: usize,
    height: usize,
}

impl NoiseFilter {
    pub fn new(window_size: usize, range_threshold: f32) -> Self {
        Self {
            window_size,
            range_threshold,
        }
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_range_threshold(mut self, range_threshold: f32) -> Self {
        self.range_threshold = range_threshold;
        self
    }

    /// Keep the candidates whose depth agrees with their neighbourhood
    ///
    /// Candidates are processed in input order and the result preserves that
    /// order. The window samples every grid cell it covers, not only other
    /// candidates.
    ///
    /// # Errors
    /// * `UnsupportedLayout` if the cloud is not organized or has zero width
    /// * `IndexOutOfRange` if a candidate, or a cell inside its window, lies
    ///   beyond the end of the cloud
    ///
    /// A negative or NaN threshold is not an error; no candidate can pass it.
    pub fn filter(&self, cloud: &PointCloud, indices: &[usize]) -> Result<PointIndices> {
        let grid = self.prepare(cloud)?;
        let mut scratch = Vec::with_capacity(self.window_capacity(grid).min(cloud.len()));

        let mut accepted = Vec::with_capacity(indices.len());
        for &index in indices {
            if self.accepts(cloud, grid, index, &mut scratch)? {
                accepted.push(index);
            }
        }

        self.log_summary(indices.len(), accepted.len());
        Ok(accepted)
    }

    /// Same as [`NoiseFilter::filter`], evaluating candidates on the rayon
    /// thread pool
    ///
    /// The result, including its order, is identical to the sequential
    /// version.
    #[cfg(feature = "parallel")]
    pub fn filter_parallel(&self, cloud: &PointCloud, indices: &[usize]) -> Result<PointIndices> {
        let grid = self.prepare(cloud)?;

        let verdicts: Vec<bool> = indices
            .par_iter()
            .map_init(Vec::new, |scratch, &index| {
                self.accepts(cloud, grid, index, scratch)
            })
            .collect::<Result<Vec<bool>>>()?;

        let accepted: PointIndices = indices
            .iter()
            .zip(verdicts)
            .filter_map(|(&index, keep)| keep.then_some(index))
            .collect();

        self.log_summary(indices.len(), accepted.len());
        Ok(accepted)
    }

    fn prepare(&self, cloud: &PointCloud) -> Result<Grid> {
        if self.range_threshold.is_nan() || self.range_threshold < 0.0 {
            warn!(
                "noise filter: range_threshold {} rejects every candidate",
                self.range_threshold
            );
        }

        let (width, height) = match cloud.layout() {
            Layout::Organized { width, height } => (width, height),
            Layout::Unorganized => {
                return Err(Error::UnsupportedLayout(
                    "noise filter requires an organized cloud".to_string(),
                ))
            }
        };

        if width == 0 {
            return Err(Error::UnsupportedLayout(format!(
                "organized cloud has zero width (height {})",
                height
            )));
        }

        if width.checked_mul(height) != Some(cloud.len()) {
            warn!(
                "noise filter: cloud holds {} points but its grid is {}x{}",
                cloud.len(),
                width,
                height
            );
        }

        Ok(Grid { width, height })
    }

    /// Cells in the largest window once clamped to the grid
    fn window_capacity(&self, grid: Grid) -> usize {
        let side = self.window_size.max(1);
        side.min(grid.width).saturating_mul(side.min(grid.height))
    }

    fn accepts(
        &self,
        cloud: &PointCloud,
        grid: Grid,
        index: usize,
        scratch: &mut Vec<f32>,
    ) -> Result<bool> {
        let z = cloud.at(index)?.z;

        let row = index / grid.width;
        let column = index % grid.width;
        let half = self.window_size / 2;

        let col_start = column.saturating_sub(half);
        let col_end = column.saturating_add(half).min(grid.width - 1);
        let row_start = row.saturating_sub(half);
        let row_end = row.saturating_add(half).saturating_add(1).min(grid.height);

        scratch.clear();
        for r in row_start..row_end {
            for c in col_start..=col_end {
                scratch.push(cloud.at(r * grid.width + c)?.z);
            }
        }

        let median_range = median_in_place(scratch);
        Ok(median_range - self.range_threshold < z && z < median_range + self.range_threshold)
    }

    fn log_summary(&self, candidates: usize, accepted: usize) {
        debug!(
            "noise filter: kept {} of {} candidates (window {}, threshold {})",
            accepted, candidates, self.window_size, self.range_threshold
        );
    }
}

/// Convenience wrapper around [`NoiseFilter::filter`]
pub fn filter_noise(
    cloud: &PointCloud,
    indices: &[usize],
    window_size: usize,
    range_threshold: f32,
) -> Result<PointIndices> {
    NoiseFilter::new(window_size, range_threshold).filter(cloud, indices)
}
