use std::path::Path;

use morphe_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path as an 8-bit image with `C` channels.
///
/// The method tries to read from any image format supported by the image crate
/// and converts the decoded pixels to grayscale (`C = 1`) or RGB (`C = 3`).
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Errors
///
/// [`IoError::UnsupportedImageFormat`] for any other channel count.
pub fn read_image<const C: usize>(file_path: impl AsRef<Path>) -> Result<Image<u8, C>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path));
    }

    let img = image::ImageReader::open(&file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let data = match C {
        1 => img.into_luma8().into_raw(),
        3 => img.into_rgb8().into_raw(),
        _ => return Err(IoError::UnsupportedImageFormat),
    };

    Ok(Image::new(size, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpeg::write_image_jpeg;

    #[test]
    fn read_missing_file() {
        let res = read_image::<3>("does/not/exist.jpg");
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn read_written_jpeg() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gray.jpg");

        let image = Image::<u8, 1>::from_size_val([16, 8].into(), 120)?;
        write_image_jpeg(&file_path, &image, 100)?;

        let gray = read_image::<1>(&file_path)?;
        assert_eq!(gray.size(), image.size());
        assert!(gray.as_slice().iter().all(|&v| v.abs_diff(120) <= 2));

        let color = read_image::<3>(&file_path)?;
        assert_eq!(color.size(), image.size());
        assert_eq!(color.num_channels(), 3);

        Ok(())
    }

    #[test]
    fn read_unsupported_channels() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gray.jpg");
        let image = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        write_image_jpeg(&file_path, &image, 90)?;

        let res = read_image::<2>(&file_path);
        assert!(matches!(res, Err(IoError::UnsupportedImageFormat)));
        Ok(())
    }
}
