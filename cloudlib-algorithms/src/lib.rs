//! # cloudlib algorithms
//!
//! Algorithms that operate on [`cloudlib_core::PointCloud`]: the windowed
//! median noise filter for organized range grids, centroids, and index
//! extraction to turn filter output back into a cloud.

pub mod filtering;
pub mod point_cloud_ops;

// Re-export commonly used items
pub use filtering::*;
pub use point_cloud_ops::*;
