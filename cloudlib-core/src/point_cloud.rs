//! Point cloud container and grid layout

use crate::error::{Error, Result};
use crate::point::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Ordered list of indices into a [`PointCloud`]
pub type PointIndices = Vec<usize>;

/// How the point sequence of a cloud is interpreted
///
/// An organized cloud is a row-major `width x height` grid, as produced by
/// range sensors: linear index `i` sits at row `i / width`, column
/// `i % width`. The point count is not forced to equal `width * height`;
/// use [`PointCloud::check_layout`] where that matters.
///
/// `Organized { width: 0, height: 0 }` is not a valid grid; clouds and
/// deserialization store it as `Unorganized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawLayout")]
pub enum Layout {
    #[default]
    Unorganized,
    Organized { width: usize, height: usize },
}

/// Wire shape of [`Layout`] before normalization
#[derive(Deserialize)]
enum RawLayout {
    Unorganized,
    Organized { width: usize, height: usize },
}

impl From<RawLayout> for Layout {
    fn from(raw: RawLayout) -> Self {
        match raw {
            RawLayout::Unorganized => Layout::Unorganized,
            RawLayout::Organized { width, height } => Layout::from_dimensions(width, height),
        }
    }
}

impl Layout {
    /// Build a layout from raw dimensions; both zero means unorganized
    pub fn from_dimensions(width: usize, height: usize) -> Self {
        if width == 0 && height == 0 {
            Layout::Unorganized
        } else {
            Layout::Organized { width, height }
        }
    }

    /// True when width or height is non-zero
    pub fn is_organized(&self) -> bool {
        matches!(*self, Layout::Organized { width, height } if width != 0 || height != 0)
    }

    /// Same layout with a zero-sized grid mapped to `Unorganized`
    pub fn normalized(self) -> Self {
        Layout::from_dimensions(self.width(), self.height())
    }

    /// Grid width, 0 when unorganized
    pub fn width(&self) -> usize {
        match *self {
            Layout::Organized { width, .. } => width,
            Layout::Unorganized => 0,
        }
    }

    /// Grid height, 0 when unorganized
    pub fn height(&self) -> usize {
        match *self {
            Layout::Organized { height, .. } => height,
            Layout::Unorganized => 0,
        }
    }
}

/// An ordered, optionally named, optionally organized collection of points
///
/// Insertion order and duplicates are significant and preserved by every
/// operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointCloud {
    points: Vec<Point>,
    name: Option<String>,
    layout: Layout,
}

impl PointCloud {
    /// Create a new empty, unnamed, unorganized point cloud
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty point cloud with the given name
    pub fn named<S: Into<String>>(name: S) -> Self {
        let mut cloud = Self::new();
        cloud.set_name(name);
        cloud
    }

    /// Create a new empty point cloud with a grid layout
    ///
    /// Passing `0, 0` yields an unorganized cloud.
    pub fn organized(width: usize, height: usize) -> Self {
        Self {
            points: Vec::with_capacity(width.saturating_mul(height)),
            name: None,
            layout: Layout::from_dimensions(width, height),
        }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Create an unnamed, unorganized cloud from a vector of points
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Name of the cloud, `None` when unnamed
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the name; an empty string clears it
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
    }

    pub fn clear_name(&mut self) {
        self.name = None;
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout.normalized();
    }

    /// True when width or height is non-zero
    pub fn is_organized(&self) -> bool {
        self.layout.is_organized()
    }

    pub fn width(&self) -> usize {
        self.layout.width()
    }

    pub fn height(&self) -> usize {
        self.layout.height()
    }

    /// Set grid width; a non-zero width makes the cloud organized
    pub fn set_width(&mut self, width: usize) {
        self.layout = Layout::from_dimensions(width, self.height());
    }

    /// Set grid height; a non-zero height makes the cloud organized
    pub fn set_height(&mut self, height: usize) {
        self.layout = Layout::from_dimensions(self.width(), height);
    }

    /// Verify that an organized cloud holds exactly `width * height` points
    ///
    /// Nothing in the container enforces this; callers that depend on a full
    /// grid opt in here.
    pub fn check_layout(&self) -> Result<()> {
        match self.layout {
            Layout::Unorganized => Ok(()),
            Layout::Organized { width, height } => {
                let expected = width.checked_mul(height).ok_or_else(|| {
                    Error::InvalidData(format!("grid {}x{} overflows usize", width, height))
                })?;
                if expected == self.points.len() {
                    Ok(())
                } else {
                    Err(Error::InvalidData(format!(
                        "organized cloud is {}x{} ({} cells) but holds {} points",
                        width,
                        height,
                        expected,
                        self.points.len()
                    )))
                }
            }
        }
    }

    /// Grid `(row, column)` of a linear index, `None` when unorganized or
    /// the width is zero
    pub fn grid_position(&self, index: usize) -> Option<(usize, usize)> {
        match self.layout {
            Layout::Organized { width, .. } if width > 0 => Some((index / width, index % width)),
            _ => None,
        }
    }

    /// Linear index of grid cell `(row, column)`, `None` when unorganized or
    /// the cell lies outside the grid
    pub fn grid_index(&self, row: usize, column: usize) -> Option<usize> {
        match self.layout {
            Layout::Organized { width, height } if row < height && column < width => {
                Some(row * width + column)
            }
            _ => None,
        }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the end of the cloud
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Resize the cloud, filling new slots with the origin
    pub fn resize(&mut self, len: usize) {
        self.points.resize(len, Point::default());
    }

    /// Clear all points from the cloud
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Reserve capacity for additional points
    pub fn reserve(&mut self, additional: usize) {
        self.points.reserve(additional);
    }

    /// Bounds-checked access to the point at `index`
    pub fn at(&self, index: usize) -> Result<&Point> {
        self.points.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.points.len(),
        })
    }

    /// Bounds-checked mutable access to the point at `index`
    pub fn at_mut(&mut self, index: usize) -> Result<&mut Point> {
        let len = self.points.len();
        self.points
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Get a mutable iterator over the points
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Point> {
        self.points.iter_mut()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    pub fn as_mut_slice(&mut self) -> &mut [Point] {
        &mut self.points
    }

    /// Raw view of the point buffer: `x0, y0, z0, x1, ...` as native-endian
    /// `f32` bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }

    /// Take the point vector, dropping name and layout
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Prepend the points of `other` to this cloud
    ///
    /// This is list concatenation, not geometric addition: afterwards the
    /// cloud holds `other`'s points followed by its own previous points.
    /// Name and layout of `self` are left untouched.
    pub fn concatenate(&mut self, other: &PointCloud) -> &mut Self {
        let mut merged = Vec::with_capacity(other.len() + self.len());
        merged.extend_from_slice(&other.points);
        merged.append(&mut self.points);
        self.points = merged;
        self
    }

    /// Componentwise sum of two clouds of equal length
    ///
    /// The result keeps this cloud's name and layout.
    pub fn pairwise_add(&self, other: &PointCloud) -> Result<PointCloud> {
        if self.len() != other.len() {
            return Err(Error::InvalidData(format!(
                "pairwise_add needs equal lengths, got {} and {}",
                self.len(),
                other.len()
            )));
        }

        Ok(PointCloud {
            points: self
                .points
                .iter()
                .zip(other.points.iter())
                .map(|(a, b)| *a + *b)
                .collect(),
            name: self.name.clone(),
            layout: self.layout,
        })
    }
}

impl fmt::Display for PointCloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CloudSize({}) {{", self.len())?;
        for point in &self.points {
            writeln!(f, "  {}", point)?;
        }
        writeln!(f, "}}")
    }
}

impl Index<usize> for PointCloud {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl IndexMut<usize> for PointCloud {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.points[index]
    }
}

impl IntoIterator for PointCloud {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a mut PointCloud {
    type Item = &'a mut Point;
    type IntoIter = std::slice::IterMut<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter_mut()
    }
}

impl Extend<Point> for PointCloud {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl FromIterator<Point> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::from_points(Vec::from_iter(iter))
    }
}
