#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`IoError`] variants for file access, encoding/decoding failures,
/// landmark parsing and video encoding.
pub mod error;

/// High-level image reading functions.
///
/// Decodes any format supported by the `image` crate into a typed image.
pub mod functional;

/// JPEG image encoding.
pub mod jpeg;

/// Landmark point files.
///
/// Plain text files of whitespace separated `x y` pairs, one per line.
pub mod points;

/// Ordered frame sinks, including the `ffmpeg` MP4 encoder.
pub mod video;

pub use error::IoError;
