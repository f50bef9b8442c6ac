//! Piecewise affine image warping.
//!
//! This module provides the building blocks of a triangle-to-triangle warp:
//!
//! - [`AffineTransform`] fits the affine map between two triangles
//! - [`TriangleMask`] rasterizes the destination triangle
//! - [`WarpPatch`] holds the resampled values of one triangle so that several
//!   triangles can be resampled concurrently and written afterwards
//!
//! # Examples
//!
//! Warping a triangle of one image onto a shifted triangle of another:
//!
//! ```
//! use morphe_image::Image;
//! use morphe_imgproc::warp::AffineTransform;
//!
//! let src = Image::<u8, 3>::from_size_val([8, 8].into(), 128).unwrap();
//! let mut dst = Image::<u8, 3>::from_size_val([8, 8].into(), 0).unwrap();
//!
//! let from = [[0.0, 0.0], [6.0, 0.0], [0.0, 6.0]];
//! let to = [[1.0, 1.0], [7.0, 1.0], [1.0, 7.0]];
//! AffineTransform::from_triangles(&from, &to)
//!     .unwrap()
//!     .warp(&src, &mut dst)
//!     .unwrap();
//!
//! assert_eq!(dst.pixel(1, 1).unwrap(), &[128, 128, 128]);
//! assert_eq!(dst.pixel(0, 0).unwrap(), &[0, 0, 0]);
//! ```

mod affine;
mod mask;

pub use affine::{AffineTransform, WarpPatch};
pub use mask::{MaskSpan, TriangleMask};
