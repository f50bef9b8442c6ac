use super::bilinear::bilinear_interpolation;
use super::nearest::nearest_neighbor_interpolation;
use morphe_image::Image;

/// Interpolation mode used when resampling a warped image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum InterpolationMode {
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

/// Kernel for interpolating a pixel value
///
/// # Arguments
///
/// * `image` - The input image container with shape (height, width, C).
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `interpolation` - The interpolation mode to use.
///
/// The coordinates must lie within `[0, width - 1] x [0, height - 1]`.
///
/// # Returns
///
/// The interpolated value of every channel.
pub fn interpolate_pixel<const C: usize>(
    image: &Image<u8, C>,
    u: f64,
    v: f64,
    interpolation: InterpolationMode,
) -> [f64; C] {
    match interpolation {
        InterpolationMode::Bilinear => bilinear_interpolation(image, u, v),
        InterpolationMode::Nearest => nearest_neighbor_interpolation(image, u, v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use morphe_image::ImageError;

    #[test]
    fn interpolate_integer_coords() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([3, 2].into(), vec![0, 10, 20, 30, 40, 50])?;
        for mode in [InterpolationMode::Bilinear, InterpolationMode::Nearest] {
            assert_relative_eq!(interpolate_pixel(&image, 2.0, 1.0, mode)[0], 50.0);
            assert_relative_eq!(interpolate_pixel(&image, 1.0, 0.0, mode)[0], 10.0);
        }
        Ok(())
    }

    #[test]
    fn interpolate_bilinear_center() -> Result<(), ImageError> {
        let image = Image::<u8, 2>::new([2, 2].into(), vec![0, 100, 10, 100, 20, 100, 30, 100])?;
        let pixel = interpolate_pixel(&image, 0.5, 0.5, InterpolationMode::Bilinear);
        assert_relative_eq!(pixel[0], 15.0);
        assert_relative_eq!(pixel[1], 100.0);
        Ok(())
    }

    #[test]
    fn interpolate_nearest_rounds() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([2, 1].into(), vec![0, 200])?;
        let pixel = interpolate_pixel(&image, 0.6, 0.0, InterpolationMode::Nearest);
        assert_relative_eq!(pixel[0], 200.0);
        Ok(())
    }
}
