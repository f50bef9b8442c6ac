#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// cross-dissolve of aligned images.
pub mod blend;

/// error types for the image processing operations.
pub mod error;

/// utilities for interpolation.
pub mod interpolation;

/// triangle geometry and affine fitting helpers.
pub mod linalg;

/// module containing parallization utilities.
pub mod parallel;

/// piecewise affine warping over triangles.
pub mod warp;

pub use error::ImgprocError;
