//! Core data structures for cloudlib
//!
//! This crate provides the point and point cloud types shared by the rest of
//! the workspace: tolerance-compared points, clouds with an optional grid
//! layout, a read-only shared handle and small statistics helpers.

pub mod point;
pub mod point_cloud;
pub mod shared;
pub mod statistics;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use shared::*;
pub use statistics::*;
pub use traits::*;
pub use error::*;

/// Re-export of the nalgebra point type `Point` converts to and from
pub use nalgebra::Point3;
