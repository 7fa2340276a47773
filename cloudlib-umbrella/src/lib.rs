//! # cloudlib
//!
//! Point cloud storage, range-grid noise filtering and a compact binary
//! container for collections of clouds.
//!
//! This is the umbrella crate that re-exports the workspace crates. Use it to
//! get everything in one place, or depend on the individual crates for finer
//! control over dependencies.
//!
//! ## Quick Start
//!
//! ```rust
//! use cloudlib::prelude::*;
//!
//! # fn main() -> cloudlib::Result<()> {
//! let mut scan = PointCloud::organized(3, 3);
//! for i in 0..9 {
//!     let z = if i == 4 { 10.0 } else { 1.0 };
//!     scan.push(Point::new((i % 3) as f32, (i / 3) as f32, z));
//! }
//!
//! let kept = NoiseFilter::new(3, 0.5).filter(&scan, &[0, 4, 8])?;
//! assert_eq!(kept, vec![0, 8]);
//!
//! let bytes = encode(&[&scan])?;
//! assert_eq!(decode(&bytes)?[0].len(), 9);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables algorithms, io and parallel
//! - `algorithms`: Noise filtering and cloud operations
//! - `io`: Binary container and text format
//! - `parallel`: Rayon-backed `NoiseFilter::filter_parallel`
//! - `all`: Enables all features

// Re-export core functionality
pub use cloudlib_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use cloudlib_algorithms as algorithms;

#[cfg(feature = "io")]
pub use cloudlib_io as io;

/// Convenient imports for common use cases
pub mod prelude {
    pub use cloudlib_core::{
        Error, Layout, Point, PointCloud, PointIndices, Result, SharedPointCloud,
    };

    #[cfg(feature = "algorithms")]
    pub use cloudlib_algorithms::{centroid, extract_indices, filter_noise, NoiseFilter};

    #[cfg(feature = "io")]
    pub use cloudlib_io::{
        decode, encode, load_from_bin, load_from_text, save_to_bin, save_to_text,
        PointCloudSource, TextReader,
    };
}
