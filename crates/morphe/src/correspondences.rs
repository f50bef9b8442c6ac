use std::path::Path;

use morphe_image::Image;
use morphe_io::points::{points_path_for, read_points, write_points};

use crate::{
    error::MorphError,
    point::{points_from_arrays, points_to_arrays, Point2d},
    session::BlendSession,
    triangulation::Triangulation,
};

/// Paired start and end landmarks as collected by an editor.
///
/// Pairs are only ever appended whole, so both lists always have the same
/// length. The start points are re-triangulated every time a pair is added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correspondences {
    start: Vec<Point2d>,
    end: Vec<Point2d>,
    triangulation: Option<Triangulation>,
}

impl Correspondences {
    /// An empty set of correspondences.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds correspondences from two landmark lists of equal length.
    pub fn from_points(start: Vec<Point2d>, end: Vec<Point2d>) -> Result<Self, MorphError> {
        if start.len() != end.len() {
            return Err(MorphError::InvalidInput(format!(
                "landmark count mismatch: {} start points, {} end points",
                start.len(),
                end.len()
            )));
        }
        if let Some(i) = start
            .iter()
            .zip(end.iter())
            .position(|(s, e)| !s.is_finite() || !e.is_finite())
        {
            return Err(MorphError::InvalidInput(format!(
                "pair {i} has a non-finite coordinate"
            )));
        }

        let mut correspondences = Self {
            start,
            end,
            triangulation: None,
        };
        correspondences.retriangulate();
        Ok(correspondences)
    }

    /// Loads the landmark files `<image>.txt` paired with both images.
    ///
    /// When either file is missing the result is empty.
    pub fn load(
        start_image_path: impl AsRef<Path>,
        end_image_path: impl AsRef<Path>,
    ) -> Result<Self, MorphError> {
        let start_path = points_path_for(start_image_path);
        let end_path = points_path_for(end_image_path);

        if !start_path.exists() || !end_path.exists() {
            log::debug!("no landmark files next to the images, starting empty");
            return Ok(Self::new());
        }

        let start = points_from_arrays(&read_points(&start_path)?);
        let end = points_from_arrays(&read_points(&end_path)?);
        Self::from_points(start, end)
    }

    /// Writes both landmark lists next to their images as `<image>.txt`.
    pub fn save(
        &self,
        start_image_path: impl AsRef<Path>,
        end_image_path: impl AsRef<Path>,
    ) -> Result<(), MorphError> {
        let start_path = points_path_for(start_image_path);
        let end_path = points_path_for(end_image_path);
        write_points(&start_path, &points_to_arrays(&self.start))?;
        write_points(&end_path, &points_to_arrays(&self.end))?;
        log::info!(
            "saved {} landmark pairs to {} and {}",
            self.len(),
            start_path.display(),
            end_path.display()
        );
        Ok(())
    }

    /// Appends one start/end pair and refreshes the triangulation.
    pub fn add_pair(
        &mut self,
        start: impl Into<Point2d>,
        end: impl Into<Point2d>,
    ) -> Result<(), MorphError> {
        let (start, end) = (start.into(), end.into());
        if !start.is_finite() || !end.is_finite() {
            return Err(MorphError::InvalidInput(
                "landmark pair has a non-finite coordinate".to_string(),
            ));
        }
        self.start.push(start);
        self.end.push(end);
        self.retriangulate();
        Ok(())
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.start.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }

    /// Landmarks on the start image.
    pub fn start_points(&self) -> &[Point2d] {
        &self.start
    }

    /// Landmarks on the end image.
    pub fn end_points(&self) -> &[Point2d] {
        &self.end
    }

    /// The current triangulation, `None` until the start points span an area.
    pub fn triangulation(&self) -> Option<&Triangulation> {
        self.triangulation.as_ref()
    }

    /// Creates a blend session over the two images.
    pub fn into_session<const C: usize>(
        self,
        start_image: Image<u8, C>,
        end_image: Image<u8, C>,
    ) -> Result<BlendSession<C>, MorphError> {
        BlendSession::new(start_image, self.start, end_image, self.end)
    }

    fn retriangulate(&mut self) {
        self.triangulation = match Triangulation::new(&self.start) {
            Ok(t) => Some(t),
            Err(MorphError::InsufficientPoints(_)) => None,
            Err(err) => {
                log::warn!("cannot triangulate landmarks: {err}");
                None
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_pairs_triangulates() -> Result<(), MorphError> {
        let mut c = Correspondences::new();
        assert!(c.is_empty());

        c.add_pair([0.0, 0.0], [1.0, 1.0])?;
        c.add_pair([10.0, 0.0], [11.0, 1.0])?;
        assert!(c.triangulation().is_none());

        // still collinear
        c.add_pair([20.0, 0.0], [21.0, 1.0])?;
        assert!(c.triangulation().is_none());

        c.add_pair([0.0, 10.0], [1.0, 11.0])?;
        assert_eq!(c.len(), 4);
        assert_eq!(c.triangulation().map(|t| t.len()), Some(2));
        assert_eq!(c.end_points()[3], Point2d::new(1.0, 11.0));
        Ok(())
    }

    #[test]
    fn rejects_non_finite_pair() {
        let mut c = Correspondences::new();
        assert!(c.add_pair([f64::NAN, 0.0], [0.0, 0.0]).is_err());
        assert!(c.is_empty());
    }

    #[test]
    fn from_points_length_mismatch() {
        let res = Correspondences::from_points(vec![Point2d::new(0.0, 0.0)], vec![]);
        assert!(matches!(res, Err(MorphError::InvalidInput(_))));
    }

    #[test]
    fn save_and_load() -> Result<(), MorphError> {
        let tmp_dir = tempfile::tempdir()?;
        let start_path = tmp_dir.path().join("start.png");
        let end_path = tmp_dir.path().join("end.png");

        assert!(Correspondences::load(&start_path, &end_path)?.is_empty());

        let mut c = Correspondences::new();
        c.add_pair([0.0, 0.0], [0.5, 0.25])?;
        c.add_pair([9.0, 0.0], [8.0, 1.0])?;
        c.add_pair([0.0, 9.0], [1.5, 7.75])?;
        c.save(&start_path, &end_path)?;

        assert!(tmp_dir.path().join("start.png.txt").exists());
        assert!(tmp_dir.path().join("end.png.txt").exists());

        let loaded = Correspondences::load(&start_path, &end_path)?;
        assert_eq!(loaded, c);
        Ok(())
    }

    #[test]
    fn into_session() -> Result<(), MorphError> {
        let mut c = Correspondences::new();
        c.add_pair([0.0, 0.0], [0.0, 0.0])?;
        c.add_pair([3.0, 0.0], [3.0, 0.0])?;
        c.add_pair([0.0, 3.0], [0.0, 3.0])?;

        let img = Image::<u8, 1>::from_size_val([4, 4].into(), 1)?;
        let session = c.into_session(img.clone(), img)?;
        assert_eq!(session.triangulation().len(), 1);
        Ok(())
    }
}
