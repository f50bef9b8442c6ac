use morphe_image::Image;

use crate::{error::ImgprocError, parallel};

/// Cross-dissolves two aligned images.
///
/// Every value is computed as `round((1 - alpha) * src1 + alpha * src2)` and
/// clamped to the `u8` range.
///
/// # Arguments
///
/// * `src1` - The image weighted by `1 - alpha`.
/// * `src2` - The image weighted by `alpha`.
/// * `alpha` - The blend weight in `[0, 1]`.
/// * `dst` - The output image, same size as the inputs.
///
/// # Example
///
/// ```
/// use morphe_image::Image;
/// use morphe_imgproc::blend::cross_dissolve;
///
/// let a = Image::<u8, 1>::new([2, 1].into(), vec![0, 100]).unwrap();
/// let b = Image::<u8, 1>::new([2, 1].into(), vec![100, 200]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val([2, 1].into(), 0).unwrap();
///
/// cross_dissolve(&a, &b, 0.25, &mut dst).unwrap();
/// assert_eq!(dst.as_slice(), &[25, 125]);
/// ```
pub fn cross_dissolve<const C: usize>(
    src1: &Image<u8, C>,
    src2: &Image<u8, C>,
    alpha: f64,
    dst: &mut Image<u8, C>,
) -> Result<(), ImgprocError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(ImgprocError::InvalidWeight(alpha));
    }
    if src1.size() != src2.size() {
        return Err(ImgprocError::SizeMismatch(src1.size(), src2.size()));
    }
    if src1.size() != dst.size() {
        return Err(ImgprocError::SizeMismatch(src1.size(), dst.size()));
    }

    let beta = 1.0 - alpha;
    parallel::par_iter_rows_val_two(src1, src2, dst, |&a, &b, out| {
        *out = (beta * a as f64 + alpha * b as f64).round().clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dissolve_endpoints() -> Result<(), ImgprocError> {
        let a = Image::<u8, 3>::new([1, 1].into(), vec![10, 20, 30])?;
        let b = Image::<u8, 3>::new([1, 1].into(), vec![200, 210, 220])?;
        let mut dst = Image::<u8, 3>::from_size_val([1, 1].into(), 0)?;

        cross_dissolve(&a, &b, 0.0, &mut dst)?;
        assert_eq!(dst.as_slice(), a.as_slice());

        cross_dissolve(&a, &b, 1.0, &mut dst)?;
        assert_eq!(dst.as_slice(), b.as_slice());

        Ok(())
    }

    #[test]
    fn dissolve_rounds_to_nearest() -> Result<(), ImgprocError> {
        let a = Image::<u8, 1>::new([1, 1].into(), vec![0])?;
        let b = Image::<u8, 1>::new([1, 1].into(), vec![3])?;
        let mut dst = Image::<u8, 1>::from_size_val([1, 1].into(), 0)?;
        // 0.5 * 3 = 1.5 rounds away from zero
        cross_dissolve(&a, &b, 0.5, &mut dst)?;
        assert_eq!(dst.as_slice(), &[2]);
        Ok(())
    }

    #[test]
    fn dissolve_rejects_bad_input() -> Result<(), ImgprocError> {
        let a = Image::<u8, 1>::new([1, 1].into(), vec![0])?;
        let b = Image::<u8, 1>::new([2, 1].into(), vec![0, 0])?;
        let mut dst = Image::<u8, 1>::from_size_val([1, 1].into(), 0)?;
        assert!(matches!(
            cross_dissolve(&a, &b, 0.5, &mut dst),
            Err(ImgprocError::SizeMismatch(..))
        ));
        assert_eq!(
            cross_dissolve(&a, &a, 1.5, &mut dst),
            Err(ImgprocError::InvalidWeight(1.5))
        );
        Ok(())
    }
}
