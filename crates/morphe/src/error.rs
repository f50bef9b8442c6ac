use morphe_image::ImageError;
use morphe_imgproc::ImgprocError;
use morphe_io::IoError;

/// An error type for the morphing pipeline.
#[derive(thiserror::Error, Debug)]
pub enum MorphError {
    /// The inputs of a session have mismatched shapes or invalid values.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An affine map could not be fitted because a triangle is degenerate.
    #[error("Singular transform: triangle points are collinear")]
    SingularTransform,

    /// An interpolated triangle collapsed at the given blend parameter.
    #[error("Triangle {triangle} is degenerate at alpha {alpha}")]
    DegenerateTriangle {
        /// Index of the triangle in the triangulation.
        triangle: usize,
        /// The blend parameter.
        alpha: f64,
    },

    /// The landmarks cannot be triangulated.
    #[error("At least 3 non-collinear points are required, got {0} points")]
    InsufficientPoints(usize),

    /// A sequence needs at least the start and end frames.
    #[error("Sequence length must be at least 2, got {0}")]
    InvalidSequenceLength(usize),

    /// The blend parameter is not a finite value in [0, 1].
    #[error("Alpha must be within [0, 1], got {0}")]
    InvalidAlpha(f64),

    /// Error from an image processing operation.
    #[error(transparent)]
    Imgproc(ImgprocError),

    /// Error from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error reading or writing files.
    #[error(transparent)]
    Io(#[from] IoError),
}

impl From<ImgprocError> for MorphError {
    fn from(err: ImgprocError) -> Self {
        match err {
            ImgprocError::SingularTransform => MorphError::SingularTransform,
            ImgprocError::Image(err) => MorphError::Image(err),
            err => MorphError::Imgproc(err),
        }
    }
}

impl From<std::io::Error> for MorphError {
    fn from(err: std::io::Error) -> Self {
        MorphError::Io(IoError::FileError(err))
    }
}
