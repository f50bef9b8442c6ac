use crate::error::IoError;
use jpeg_encoder::{ColorType, Encoder};
use morphe_image::Image;
use std::path::Path;

/// Writes a grayscale or RGB image as JPEG, picking the color type from `C`.
///
/// # Arguments
///
/// - `file_path` - The path to the JPEG image.
/// - `image` - The image to encode, with 1 _(luma)_ or 3 _(rgb)_ channels.
/// - `quality` - The quality of the JPEG encoding, range from 0 (lowest) to 100 (highest)
///
/// # Errors
///
/// [`IoError::UnsupportedImageFormat`] for any other channel count, or a size
/// that does not fit the JPEG limit of 65535 pixels per side.
pub fn write_image_jpeg<const C: usize>(
    file_path: impl AsRef<Path>,
    image: &Image<u8, C>,
    quality: u8,
) -> Result<(), IoError> {
    let color_type = match C {
        1 => ColorType::Luma,
        3 => ColorType::Rgb,
        _ => return Err(IoError::UnsupportedImageFormat),
    };

    let image_size = image.size();
    let (Ok(width), Ok(height)) = (
        u16::try_from(image_size.width),
        u16::try_from(image_size.height),
    ) else {
        return Err(IoError::UnsupportedImageFormat);
    };

    let encoder = Encoder::new_file(file_path, quality)?;
    encoder.encode(image.as_slice(), width, height, color_type)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::read;

    #[test]
    fn write_jpeg_rgb8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("rgb.jpg");

        let image = Image::<u8, 3>::from_size_val([32, 16].into(), 200)?;
        write_image_jpeg(&file_path, &image, 95)?;

        let bytes = read(&file_path)?;
        // SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        Ok(())
    }

    #[test]
    fn write_jpeg_gray8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gray.jpg");

        let image = Image::<u8, 1>::from_size_val([8, 8].into(), 10)?;
        write_image_jpeg(&file_path, &image, 95)?;
        assert!(file_path.exists());
        Ok(())
    }

    #[test]
    fn write_jpeg_unsupported_channels() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let image = Image::<u8, 4>::from_size_val([2, 2].into(), 0)?;
        let res = write_image_jpeg(tmp_dir.path().join("rgba.jpg"), &image, 90);
        assert!(matches!(res, Err(IoError::UnsupportedImageFormat)));
        Ok(())
    }
}
