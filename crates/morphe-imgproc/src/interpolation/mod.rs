//! Pixel interpolation methods for image transformations.
//!
//! The kernels sample 8-bit images at fractional coordinates and return the
//! per-channel values in `f64`, leaving rounding to the caller.
//!
//! # Interpolation Modes
//!
//! - **Bilinear**: Smooth linear interpolation between adjacent pixels
//! - **Nearest**: Fastest, uses nearest pixel value (no interpolation)

mod bilinear;
pub(crate) mod interpolate;
mod nearest;

pub use interpolate::{interpolate_pixel, InterpolationMode};
