use morphe_image::{Image, ImageSize};

use crate::error::ImgprocError;
use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::linalg::{affine_3pt2d, invert_affine_matrix, is_degenerate_triangle};

use super::mask::TriangleMask;

/// Slack, in pixels, granted to inverse-mapped coordinates that land just
/// outside the source image because of floating point error.
const BOUNDS_TOLERANCE: f64 = 1e-6;

/// A 2D affine map fitted between a source and a destination triangle.
///
/// The map `T` satisfies `T(source[i]) = destination[i]` for the three
/// vertices. Both the forward and the inverse homogeneous matrices are
/// computed on construction, so a value of this type is always invertible.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform {
    destination: [[f64; 2]; 3],
    matrix: [[f64; 3]; 3],
    inverse: [[f64; 3]; 3],
}

impl AffineTransform {
    /// Fits the affine map taking `source` onto `destination`.
    ///
    /// The six parameters of `x' = a*x + b*y + c`, `y' = d*x + e*y + f` are
    /// found by an LU solve of the 6x6 system given by the three correspondences.
    ///
    /// # Errors
    ///
    /// [`ImgprocError::SingularTransform`] if either triangle is degenerate
    /// (collinear or repeated vertices), because the map or its inverse does
    /// not exist.
    ///
    /// # Example
    ///
    /// ```
    /// use morphe_imgproc::warp::AffineTransform;
    ///
    /// let src = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
    /// let dst = [[2.0, 3.0], [4.0, 3.0], [2.0, 5.0]];
    /// let transform = AffineTransform::from_triangles(&src, &dst).unwrap();
    ///
    /// let p = transform.apply([1.0, 0.0]);
    /// assert!((p[0] - 4.0).abs() < 1e-9 && (p[1] - 3.0).abs() < 1e-9);
    /// ```
    pub fn from_triangles(
        source: &[[f64; 2]; 3],
        destination: &[[f64; 2]; 3],
    ) -> Result<Self, ImgprocError> {
        if is_degenerate_triangle(source) || is_degenerate_triangle(destination) {
            return Err(ImgprocError::SingularTransform);
        }

        let [[a, b, c], [d, e, f]] =
            affine_3pt2d(source, destination).ok_or(ImgprocError::SingularTransform)?;
        let matrix = [[a, b, c], [d, e, f], [0.0, 0.0, 1.0]];
        let inverse = invert_affine_matrix(&matrix).ok_or(ImgprocError::SingularTransform)?;

        Ok(Self {
            destination: *destination,
            matrix,
            inverse,
        })
    }

    /// The forward 3x3 homogeneous matrix.
    pub fn matrix(&self) -> &[[f64; 3]; 3] {
        &self.matrix
    }

    /// The inverse 3x3 homogeneous matrix.
    pub fn inverse_matrix(&self) -> &[[f64; 3]; 3] {
        &self.inverse
    }

    /// The destination triangle the transform was fitted to.
    pub fn destination(&self) -> &[[f64; 2]; 3] {
        &self.destination
    }

    /// Maps a point from the source into the destination frame.
    pub fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        transform_point(&self.matrix, p)
    }

    /// Maps a point from the destination back into the source frame.
    pub fn apply_inverse(&self, p: [f64; 2]) -> [f64; 2] {
        transform_point(&self.inverse, p)
    }

    /// Warps `src` into the destination triangle of `dst` with bilinear sampling.
    ///
    /// Only pixels covered by the destination triangle are written. Pixels
    /// whose inverse-mapped coordinate falls outside `src` are left untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use morphe_image::Image;
    /// use morphe_imgproc::warp::AffineTransform;
    ///
    /// let src = Image::<u8, 1>::from_size_val([4, 4].into(), 9).unwrap();
    /// let mut dst = Image::<u8, 1>::from_size_val([4, 4].into(), 0).unwrap();
    ///
    /// let tri = [[0.0, 0.0], [3.0, 0.0], [0.0, 3.0]];
    /// AffineTransform::from_triangles(&tri, &tri)
    ///     .unwrap()
    ///     .warp(&src, &mut dst)
    ///     .unwrap();
    ///
    /// assert_eq!(dst.as_slice()[0], 9);
    /// assert_eq!(dst.as_slice()[15], 0);
    /// ```
    pub fn warp<const C: usize>(
        &self,
        src: &Image<u8, C>,
        dst: &mut Image<u8, C>,
    ) -> Result<(), ImgprocError> {
        self.warp_with(src, dst, InterpolationMode::Bilinear)
    }

    /// Same as [`AffineTransform::warp`] with an explicit interpolation mode.
    pub fn warp_with<const C: usize>(
        &self,
        src: &Image<u8, C>,
        dst: &mut Image<u8, C>,
        interpolation: InterpolationMode,
    ) -> Result<(), ImgprocError> {
        self.warp_patch(src, dst.size(), interpolation).apply(dst)
    }

    /// Resamples `src` over the destination triangle without touching any output buffer.
    ///
    /// The returned patch owns the values for every masked pixel of an image
    /// of `dst_size` and is applied later with [`WarpPatch::apply`]. Patches of
    /// different triangles can be computed concurrently.
    pub fn warp_patch<const C: usize>(
        &self,
        src: &Image<u8, C>,
        dst_size: ImageSize,
        interpolation: InterpolationMode,
    ) -> WarpPatch<C> {
        let mask = TriangleMask::from_triangle(&self.destination, dst_size);
        let mut writes = Vec::with_capacity(mask.len());

        if src.width() == 0 || src.height() == 0 {
            return WarpPatch {
                size: dst_size,
                writes,
            };
        }

        let max_u = (src.width() - 1) as f64;
        let max_v = (src.height() - 1) as f64;

        for (x, y) in mask.iter() {
            let [u, v] = self.apply_inverse([x as f64, y as f64]);

            // out of bounds samples are left unwritten
            if !(-BOUNDS_TOLERANCE..=max_u + BOUNDS_TOLERANCE).contains(&u)
                || !(-BOUNDS_TOLERANCE..=max_v + BOUNDS_TOLERANCE).contains(&v)
            {
                continue;
            }

            let sample = interpolate_pixel(
                src,
                u.clamp(0.0, max_u),
                v.clamp(0.0, max_v),
                interpolation,
            );
            let mut value = [0u8; C];
            for (out, s) in value.iter_mut().zip(sample.iter()) {
                *out = s.round().clamp(0.0, 255.0) as u8;
            }

            writes.push((y * dst_size.width + x, value));
        }

        WarpPatch {
            size: dst_size,
            writes,
        }
    }
}

/// Pixel values produced by warping one triangle, ready to be written into an image.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpPatch<const C: usize> {
    size: ImageSize,
    writes: Vec<(usize, [u8; C])>,
}

impl<const C: usize> WarpPatch<C> {
    /// The size of the image the patch was computed for.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Number of pixels the patch writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether the patch writes no pixel.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// The `(x, y)` coordinates written by the patch.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.size.width.max(1);
        self.writes.iter().map(move |(i, _)| (i % width, i / width))
    }

    /// Writes the patch values into `dst`.
    ///
    /// # Errors
    ///
    /// [`ImgprocError::SizeMismatch`] if `dst` differs from the patch size.
    pub fn apply(&self, dst: &mut Image<u8, C>) -> Result<(), ImgprocError> {
        if dst.size() != self.size {
            return Err(ImgprocError::SizeMismatch(self.size, dst.size()));
        }

        let data = dst.as_slice_mut();
        for (index, value) in self.writes.iter() {
            let base = index * C;
            data[base..base + C].copy_from_slice(value);
        }

        Ok(())
    }
}

fn transform_point(m: &[[f64; 3]; 3], p: [f64; 2]) -> [f64; 2] {
    [
        m[0][0] * p[0] + m[0][1] * p[1] + m[0][2],
        m[1][0] * p[0] + m[1][1] * p[1] + m[1][2],
    ]
}
