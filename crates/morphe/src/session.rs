use morphe_image::{Image, ImageSize};
use morphe_imgproc::{
    blend::cross_dissolve,
    interpolation::InterpolationMode,
    parallel::{self, ExecutionStrategy},
    warp::{AffineTransform, WarpPatch},
};

use crate::{
    error::MorphError,
    point::Point2d,
    triangulation::{is_degenerate_triangle, Triangulation},
};

/// Two images with corresponding landmarks, ready to be blended.
///
/// The triangulation is computed once from the start landmarks and reused
/// for every frame: the same index triples select the end landmarks and the
/// interpolated landmarks.
#[derive(Debug, Clone)]
pub struct BlendSession<const C: usize> {
    start_image: Image<u8, C>,
    start_points: Vec<Point2d>,
    end_image: Image<u8, C>,
    end_points: Vec<Point2d>,
    triangulation: Triangulation,
    strategy: ExecutionStrategy,
    interpolation: InterpolationMode,
}

impl<const C: usize> BlendSession<C> {
    /// Creates a session and triangulates the start landmarks.
    ///
    /// # Arguments
    ///
    /// * `start_image` - The image shown at `alpha = 0`.
    /// * `start_points` - Landmarks on the start image.
    /// * `end_image` - The image shown at `alpha = 1`, same size as `start_image`.
    /// * `end_points` - Landmarks on the end image, in the same order as `start_points`.
    ///
    /// # Errors
    ///
    /// * [`MorphError::InvalidInput`] if the landmark lists differ in length,
    ///   the images differ in size or a coordinate is not finite.
    /// * [`MorphError::InsufficientPoints`] if the start landmarks cannot be triangulated.
    pub fn new(
        start_image: Image<u8, C>,
        start_points: Vec<Point2d>,
        end_image: Image<u8, C>,
        end_points: Vec<Point2d>,
    ) -> Result<Self, MorphError> {
        if start_points.len() != end_points.len() {
            return Err(MorphError::InvalidInput(format!(
                "landmark count mismatch: {} start points, {} end points",
                start_points.len(),
                end_points.len()
            )));
        }
        if start_image.size() != end_image.size() {
            return Err(MorphError::InvalidInput(format!(
                "image size mismatch: start is {}, end is {}",
                start_image.size(),
                end_image.size()
            )));
        }
        if let Some(i) = end_points.iter().position(|p| !p.is_finite()) {
            return Err(MorphError::InvalidInput(format!(
                "end point {i} has a non-finite coordinate"
            )));
        }

        let triangulation = Triangulation::new(&start_points)?;

        log::debug!(
            "blend session over {} image with {} landmarks and {} triangles",
            start_image.size(),
            start_points.len(),
            triangulation.len()
        );

        Ok(Self {
            start_image,
            start_points,
            end_image,
            end_points,
            triangulation,
            strategy: ExecutionStrategy::default(),
            interpolation: InterpolationMode::default(),
        })
    }

    /// Sets how triangles and frames are distributed over threads.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the sampling used by the triangle warps.
    pub fn with_interpolation(mut self, interpolation: InterpolationMode) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// The execution strategy.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// The interpolation mode.
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    /// The triangulation of the start landmarks.
    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// The size shared by both images and every frame.
    pub fn size(&self) -> ImageSize {
        self.start_image.size()
    }

    /// The image shown at `alpha = 0`.
    pub fn start_image(&self) -> &Image<u8, C> {
        &self.start_image
    }

    /// The image shown at `alpha = 1`.
    pub fn end_image(&self) -> &Image<u8, C> {
        &self.end_image
    }

    /// Landmarks on the start image.
    pub fn start_points(&self) -> &[Point2d] {
        &self.start_points
    }

    /// Landmarks on the end image.
    pub fn end_points(&self) -> &[Point2d] {
        &self.end_points
    }

    /// The interpolated landmarks `(1 - alpha) * start + alpha * end`.
    pub fn target_points(&self, alpha: f64) -> Vec<Point2d> {
        self.start_points
            .iter()
            .zip(self.end_points.iter())
            .map(|(s, e)| s.lerp(e, alpha))
            .collect()
    }

    /// Produces the morphed frame at `alpha`.
    ///
    /// Both images are warped triangle by triangle onto the interpolated
    /// landmarks, then cross-dissolved. Pixels not covered by any target
    /// triangle, or whose source location falls outside the image, are zero.
    ///
    /// # Errors
    ///
    /// * [`MorphError::InvalidAlpha`] unless `alpha` is a finite value in `[0, 1]`.
    /// * [`MorphError::DegenerateTriangle`] if an interpolated triangle has zero area.
    /// * [`MorphError::SingularTransform`] if an affine map cannot be fitted.
    ///
    /// # Example
    ///
    /// ```
    /// use morphe::{image::Image, BlendSession, Point2d};
    ///
    /// let corners = vec![
    ///     Point2d::new(0.0, 0.0),
    ///     Point2d::new(3.0, 0.0),
    ///     Point2d::new(3.0, 3.0),
    ///     Point2d::new(0.0, 3.0),
    /// ];
    /// let black = Image::<u8, 1>::from_size_val([4, 4].into(), 0).unwrap();
    /// let white = Image::<u8, 1>::from_size_val([4, 4].into(), 200).unwrap();
    ///
    /// let session = BlendSession::new(black, corners.clone(), white, corners).unwrap();
    /// let frame = session.blend(0.5).unwrap();
    /// assert!(frame.as_slice().iter().all(|&v| v == 100));
    /// ```
    pub fn blend(&self, alpha: f64) -> Result<Image<u8, C>, MorphError> {
        if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
            return Err(MorphError::InvalidAlpha(alpha));
        }

        let size = self.size();
        let target_points = self.target_points(alpha);

        let indices: Vec<usize> = (0..self.triangulation.len()).collect();
        let patches = parallel::try_map_collect(self.strategy, &indices, |&i| {
            self.warp_triangle(i, &target_points, alpha, size)
        })?;

        let mut warped_start = Image::from_size_val(size, 0u8)?;
        let mut warped_end = Image::from_size_val(size, 0u8)?;
        // triangle order decides shared edge pixels
        for (start_patch, end_patch) in &patches {
            start_patch.apply(&mut warped_start)?;
            end_patch.apply(&mut warped_end)?;
        }

        let mut frame = Image::from_size_val(size, 0u8)?;
        cross_dissolve(&warped_start, &warped_end, alpha, &mut frame)?;

        log::trace!("blended frame at alpha {alpha:.4}");

        Ok(frame)
    }

    fn warp_triangle(
        &self,
        index: usize,
        target_points: &[Point2d],
        alpha: f64,
        size: ImageSize,
    ) -> Result<(WarpPatch<C>, WarpPatch<C>), MorphError> {
        let missing = || MorphError::InvalidInput(format!("triangle {index} is out of range"));

        let target = self
            .triangulation
            .triangle_points(index, target_points)
            .ok_or_else(missing)?;
        if is_degenerate_triangle(&target) {
            return Err(MorphError::DegenerateTriangle {
                triangle: index,
                alpha,
            });
        }

        let start = self
            .triangulation
            .triangle_points(index, &self.start_points)
            .ok_or_else(missing)?;
        let end = self
            .triangulation
            .triangle_points(index, &self.end_points)
            .ok_or_else(missing)?;

        let start_patch = AffineTransform::from_triangles(&start, &target)?.warp_patch(
            &self.start_image,
            size,
            self.interpolation,
        );
        let end_patch = AffineTransform::from_triangles(&end, &target)?.warp_patch(
            &self.end_image,
            size,
            self.interpolation,
        );

        Ok((start_patch, end_patch))
    }
}
