#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! A [`BlendSession`] holds two images with corresponding landmarks and the
//! Delaunay triangulation of the start landmarks. [`BlendSession::blend`]
//! produces one morphed frame, [`BlendSession::generate_sequence`] renders a
//! whole sequence to JPEG files and an MP4 video.

/// editing model for landmark correspondences.
pub mod correspondences;

/// error types for the morphing pipeline.
pub mod error;

/// landmark points.
pub mod point;

/// frame blending over a shared triangulation.
pub mod session;

/// frame sequences and their persistence.
pub mod sequence;

/// Delaunay triangulation of landmark sets.
pub mod triangulation;

pub use correspondences::Correspondences;
pub use error::MorphError;
pub use point::Point2d;
pub use sequence::{Frame, SequenceConfig};
pub use session::BlendSession;
pub use triangulation::Triangulation;

#[doc(inline)]
pub use morphe_image as image;

#[doc(inline)]
pub use morphe_imgproc as imgproc;

#[doc(inline)]
pub use morphe_io as io;
