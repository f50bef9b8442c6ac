/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File is does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to encode the JPEG image.
    #[error("Error with Jpeg encoding. {0}")]
    JpegEncodingError(#[from] jpeg_encoder::EncodingError),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] morphe_image::ImageError),

    /// Error to decode the image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// The image has a channel count or size the codec cannot handle.
    #[error("Unsupported image format")]
    UnsupportedImageFormat,

    /// A landmark line does not hold exactly two numbers.
    #[error("Invalid point at line {line}: {content:?}")]
    InvalidPointLine {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// The `ffmpeg` binary could not be found.
    #[error("ffmpeg is required for video encoding, but was not found on PATH")]
    FfmpegNotFound,

    /// The `ffmpeg` process failed.
    #[error("ffmpeg failed: {0}")]
    Ffmpeg(String),

    /// A video sink was used out of order or with inconsistent frames.
    #[error("Video sink error: {0}")]
    Sink(String),
}
