use morphe_image::{ImageError, ImageSize};

/// An error type for the image processing operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImgprocError {
    /// The triangle points are collinear so no unique affine map exists.
    #[error("Singular transform: triangle points are collinear")]
    SingularTransform,

    /// Two images that must share a size do not.
    #[error("Image size mismatch: {0} vs {1}")]
    SizeMismatch(ImageSize, ImageSize),

    /// The blend weight is not a finite value in [0, 1].
    #[error("Blend weight must be within [0, 1], got {0}")]
    InvalidWeight(f64),

    /// Error from the underlying image container.
    #[error(transparent)]
    Image(#[from] ImageError),
}
