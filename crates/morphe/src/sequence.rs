use std::path::{Path, PathBuf};

use morphe_image::Image;
use morphe_imgproc::parallel::{self, ExecutionStrategy};
use morphe_io::{
    jpeg::write_image_jpeg,
    video::{FfmpegSink, FfmpegSinkOpts, FrameSink, VideoConfig},
};
use serde::{Deserialize, Serialize};

use crate::{error::MorphError, session::BlendSession};

/// File name of the encoded video inside the output directory.
pub const VIDEO_FILE_NAME: &str = "morph.mp4";

/// Settings for rendering a frame sequence.
///
/// Missing fields take their default when deserialized.
///
/// # Example
///
/// ```
/// use morphe::SequenceConfig;
///
/// let config: SequenceConfig = serde_json::from_str(r#"{"sequence_length": 10}"#).unwrap();
/// assert_eq!(config.sequence_length, 10);
/// assert_eq!(config.fps, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Number of forward frames, start and end images included.
    pub sequence_length: usize,
    /// Append the forward frames again in reverse order.
    pub include_reversed: bool,
    /// Video frame rate.
    pub fps: u32,
    /// JPEG quality of the frame files, from 0 to 100.
    pub jpeg_quality: u8,
    /// How intermediate frames are distributed over threads.
    pub strategy: ExecutionStrategy,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            sequence_length: 40,
            include_reversed: true,
            fps: 5,
            jpeg_quality: 95,
            strategy: ExecutionStrategy::Parallel,
        }
    }
}

/// One frame of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<const C: usize> {
    /// 1-based position in the sequence.
    pub index: usize,
    /// Blend parameter the frame was produced at.
    pub alpha: f64,
    /// The frame pixels.
    pub image: Image<u8, C>,
}

/// The alpha ramp of a forward sequence: `0`, `k / (n - 1)` for `k = 1..n-1`, `1`.
///
/// # Errors
///
/// [`MorphError::InvalidSequenceLength`] if `sequence_length < 2`.
pub fn frame_alphas(sequence_length: usize) -> Result<Vec<f64>, MorphError> {
    if sequence_length < 2 {
        return Err(MorphError::InvalidSequenceLength(sequence_length));
    }

    let increment = 1.0 / ((sequence_length - 2) as f64 + 1.0);

    let mut alphas = Vec::with_capacity(sequence_length);
    alphas.push(0.0);
    alphas.extend((1..sequence_length - 1).map(|k| k as f64 * increment));
    alphas.push(1.0);
    Ok(alphas)
}

/// File name of the frame at 1-based `index`, zero padded to three digits.
///
/// ```
/// assert_eq!(morphe::sequence::frame_file_name(7), "frame007.jpg");
/// assert_eq!(morphe::sequence::frame_file_name(1234), "frame1234.jpg");
/// ```
pub fn frame_file_name(index: usize) -> String {
    format!("frame{index:03}.jpg")
}

/// The forward frames followed, with `include_reversed`, by the same frames
/// backwards, paired with their 1-based playback index.
fn playback_order<const C: usize>(
    forward: &[Frame<C>],
    include_reversed: bool,
) -> impl Iterator<Item = (usize, &Frame<C>)> {
    let n = forward.len();
    let backward = forward
        .iter()
        .rev()
        .enumerate()
        .map(move |(i, frame)| (n + i + 1, frame))
        .take(if include_reversed { n } else { 0 });
    forward.iter().map(|frame| (frame.index, frame)).chain(backward)
}

impl<const C: usize> BlendSession<C> {
    /// Produces the frames of a sequence in playback order.
    ///
    /// The first and last forward frames are the unmodified input images.
    /// With `include_reversed` the forward frames are followed by the same
    /// frames in reverse order, numbered on from `sequence_length + 1`.
    ///
    /// # Errors
    ///
    /// [`MorphError::InvalidSequenceLength`] if `sequence_length < 2`, or any
    /// error of [`BlendSession::blend`].
    pub fn frames(
        &self,
        sequence_length: usize,
        include_reversed: bool,
    ) -> Result<Vec<Frame<C>>, MorphError> {
        let mut frames = self.forward_frames(sequence_length, self.strategy())?;
        if include_reversed {
            let reversed: Vec<Frame<C>> = playback_order(&frames, true)
                .skip(sequence_length)
                .map(|(index, frame)| Frame {
                    index,
                    alpha: frame.alpha,
                    image: frame.image.clone(),
                })
                .collect();
            frames.extend(reversed);
        }
        Ok(frames)
    }

    fn forward_frames(
        &self,
        sequence_length: usize,
        strategy: ExecutionStrategy,
    ) -> Result<Vec<Frame<C>>, MorphError> {
        let alphas = frame_alphas(sequence_length)?;
        let inner = &alphas[1..sequence_length - 1];

        let blended = parallel::try_map_collect(strategy, inner, |&alpha| self.blend(alpha))?;

        let mut images = Vec::with_capacity(sequence_length);
        images.push(self.start_image().clone());
        images.extend(blended);
        images.push(self.end_image().clone());

        let frames: Vec<Frame<C>> = alphas
            .iter()
            .zip(images)
            .enumerate()
            .map(|(i, (&alpha, image))| Frame {
                index: i + 1,
                alpha,
                image,
            })
            .collect();

        log::debug!("produced {} forward frames", frames.len());

        Ok(frames)
    }

    /// Renders a sequence into `dir` as `frame###.jpg` files and `morph.mp4`.
    ///
    /// The video is encoded at 5 fps by the system `ffmpeg`. Returns the frame
    /// paths in playback order.
    ///
    /// # Errors
    ///
    /// Any error of [`BlendSession::generate_sequence_with`]; in particular
    /// [`morphe_io::IoError::FfmpegNotFound`] when `ffmpeg` is not installed.
    pub fn generate_sequence(
        &self,
        dir: impl AsRef<Path>,
        sequence_length: usize,
        include_reversed: bool,
    ) -> Result<Vec<PathBuf>, MorphError>
    where
        FfmpegSink: FrameSink<C>,
    {
        let dir = dir.as_ref();
        let config = SequenceConfig {
            sequence_length,
            include_reversed,
            ..Default::default()
        };
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.join(VIDEO_FILE_NAME)));
        self.generate_sequence_with(dir, &config, &mut sink)
    }

    /// Renders a sequence into `dir` and streams the frames to `sink`.
    ///
    /// The forward frames are produced first; the files are then written and
    /// the frames pushed to the sink in playback order, the mirrored tail
    /// reusing the forward frames.
    pub fn generate_sequence_with(
        &self,
        dir: impl AsRef<Path>,
        config: &SequenceConfig,
        sink: &mut impl FrameSink<C>,
    ) -> Result<Vec<PathBuf>, MorphError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let frames = self.forward_frames(config.sequence_length, config.strategy)?;

        let mut paths = Vec::new();
        for (index, frame) in playback_order(&frames, config.include_reversed) {
            let path = dir.join(frame_file_name(index));
            write_image_jpeg(&path, &frame.image, config.jpeg_quality)?;
            paths.push(path);
        }
        log::info!("wrote {} frames to {}", paths.len(), dir.display());

        sink.begin(VideoConfig {
            size: self.size(),
            fps: config.fps,
        })?;
        for (_, frame) in playback_order(&frames, config.include_reversed) {
            sink.push_frame(&frame.image)?;
        }
        sink.end()?;

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn alphas_five() -> Result<(), MorphError> {
        let alphas = frame_alphas(5)?;
        assert_eq!(alphas.len(), 5);
        for (a, e) in alphas.iter().zip([0.0, 0.25, 0.5, 0.75, 1.0]) {
            assert_relative_eq!(*a, e);
        }
        Ok(())
    }

    #[test]
    fn alphas_two_and_three() -> Result<(), MorphError> {
        assert_eq!(frame_alphas(2)?, vec![0.0, 1.0]);
        assert_eq!(frame_alphas(3)?, vec![0.0, 0.5, 1.0]);
        Ok(())
    }

    #[test]
    fn alphas_forty_are_increasing() -> Result<(), MorphError> {
        let alphas = frame_alphas(40)?;
        assert_eq!(alphas.len(), 40);
        assert_relative_eq!(alphas[1], 1.0 / 39.0);
        assert!(alphas.windows(2).all(|w| w[0] < w[1]));
        Ok(())
    }

    #[test]
    fn alphas_too_short() {
        for n in [0, 1] {
            assert!(matches!(
                frame_alphas(n),
                Err(MorphError::InvalidSequenceLength(m)) if m == n
            ));
        }
    }

    #[test]
    fn file_names() {
        assert_eq!(frame_file_name(1), "frame001.jpg");
        assert_eq!(frame_file_name(80), "frame080.jpg");
    }

    #[test]
    fn playback_order_mirrors_forward_frames() -> Result<(), MorphError> {
        let forward: Vec<Frame<1>> = frame_alphas(3)?
            .into_iter()
            .enumerate()
            .map(|(i, alpha)| -> Result<Frame<1>, MorphError> {
                Ok(Frame {
                    index: i + 1,
                    alpha,
                    image: Image::from_size_val([1, 1].into(), i as u8)?,
                })
            })
            .collect::<Result<_, MorphError>>()?;

        let order: Vec<(usize, f64)> = playback_order(&forward, true)
            .map(|(index, frame)| (index, frame.alpha))
            .collect();
        assert_eq!(
            order,
            vec![(1, 0.0), (2, 0.5), (3, 1.0), (4, 1.0), (5, 0.5), (6, 0.0)]
        );

        // the tail borrows the forward frames
        let (_, last) = playback_order(&forward, true)
            .last()
            .ok_or(MorphError::InvalidSequenceLength(0))?;
        assert!(std::ptr::eq(last, &forward[0]));

        assert_eq!(playback_order(&forward, false).count(), 3);
        Ok(())
    }

    #[test]
    fn default_config() {
        let config = SequenceConfig::default();
        assert_eq!(config.sequence_length, 40);
        assert!(config.include_reversed);
        assert_eq!(config.fps, 5);
        assert_eq!(config.jpeg_quality, 95);
        assert_eq!(config.strategy, ExecutionStrategy::Parallel);
    }

    #[test]
    fn config_serde_roundtrip() -> Result<(), serde_json::Error> {
        let config = SequenceConfig {
            sequence_length: 8,
            include_reversed: false,
            fps: 12,
            jpeg_quality: 80,
            strategy: ExecutionStrategy::Serial,
        };
        let json = serde_json::to_string(&config)?;
        assert_eq!(serde_json::from_str::<SequenceConfig>(&json)?, config);
        Ok(())
    }
}
