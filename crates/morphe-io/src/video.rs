use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use morphe_image::{Image, ImageSize};

use crate::error::IoError;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConfig {
    /// Size shared by every frame.
    pub size: ImageSize,
    /// Output frames per second.
    pub fps: u32,
}

/// Sink contract for consuming frames in playback order.
pub trait FrameSink<const C: usize> {
    /// Called once before any frames are pushed.
    fn begin(&mut self, config: VideoConfig) -> Result<(), IoError>;
    /// Push the next frame.
    fn push_frame(&mut self, frame: &Image<u8, C>) -> Result<(), IoError>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> Result<(), IoError>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink<const C: usize> {
    config: Option<VideoConfig>,
    frames: Vec<Image<u8, C>>,
    finished: bool,
}

impl<const C: usize> InMemorySink<C> {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<VideoConfig> {
        self.config
    }

    /// Frames in playback order.
    pub fn frames(&self) -> &[Image<u8, C>] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<const C: usize> FrameSink<C> for InMemorySink<C> {
    fn begin(&mut self, config: VideoConfig) -> Result<(), IoError> {
        self.config = Some(config);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &Image<u8, C>) -> Result<(), IoError> {
        let config = self
            .config
            .ok_or_else(|| IoError::Sink("sink not started".to_string()))?;
        check_frame_size(&config, frame)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> Result<(), IoError> {
        if self.config.is_none() {
            return Err(IoError::Sink("sink not started".to_string()));
        }
        self.finished = true;
        Ok(())
    }
}

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// Grayscale frames are sent as `gray`, color frames as `rgb24`. The output is
/// H.264 in `yuv420p`; odd frame sizes are padded to the next even size.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    config: Option<VideoConfig>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            config: None,
        }
    }

    /// The output file path.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn start(&mut self, config: VideoConfig, pix_fmt: &str) -> Result<(), IoError> {
        if config.fps == 0 {
            return Err(IoError::Sink("fps must be non-zero".to_string()));
        }
        if config.size.width == 0 || config.size.height == 0 {
            return Err(IoError::Sink(
                "ffmpeg sink width/height must be non-zero".to_string(),
            ));
        }

        if let Some(parent) = self.opts.out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(IoError::Sink(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(IoError::FfmpegNotFound);
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        let size_arg = format!("{}x{}", config.size.width, config.size.height);
        let fps_arg = config.fps.to_string();

        // for rawvideo input `-r` before `-i` sets the input frame rate
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            pix_fmt,
            "-s",
            size_arg.as_str(),
            "-r",
            fps_arg.as_str(),
            "-i",
            "pipe:0",
            "-an",
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            IoError::Ffmpeg(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| IoError::Ffmpeg("failed to open ffmpeg stdin".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| IoError::Ffmpeg("failed to open ffmpeg stderr".to_string()))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        log::debug!(
            "spawned ffmpeg for {} at {} fps",
            self.opts.out_path.display(),
            config.fps
        );

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.config = Some(config);
        Ok(())
    }

    fn write<const C: usize>(&mut self, frame: &Image<u8, C>) -> Result<(), IoError> {
        let config = self
            .config
            .ok_or_else(|| IoError::Sink("ffmpeg sink not started".to_string()))?;
        check_frame_size(&config, frame)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(IoError::Sink("ffmpeg sink is already finalized".to_string()));
        };

        stdin
            .write_all(frame.as_slice())
            .map_err(|e| IoError::Ffmpeg(format!("failed to write frame to ffmpeg stdin: {e}")))
    }

    fn finish(&mut self) -> Result<(), IoError> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| IoError::Sink("ffmpeg sink not started".to_string()))?;

        let status = child.wait()?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| IoError::Ffmpeg("ffmpeg stderr drain thread panicked".to_string()))??,
            None => Vec::new(),
        };

        self.config = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(IoError::Ffmpeg(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        log::info!("encoded video {}", self.opts.out_path.display());
        Ok(())
    }
}

impl FrameSink<1> for FfmpegSink {
    fn begin(&mut self, config: VideoConfig) -> Result<(), IoError> {
        self.start(config, "gray")
    }

    fn push_frame(&mut self, frame: &Image<u8, 1>) -> Result<(), IoError> {
        self.write(frame)
    }

    fn end(&mut self) -> Result<(), IoError> {
        self.finish()
    }
}

impl FrameSink<3> for FfmpegSink {
    fn begin(&mut self, config: VideoConfig) -> Result<(), IoError> {
        self.start(config, "rgb24")
    }

    fn push_frame(&mut self, frame: &Image<u8, 3>) -> Result<(), IoError> {
        self.write(frame)
    }

    fn end(&mut self) -> Result<(), IoError> {
        self.finish()
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // an unfinished encode must not leave a zombie process behind
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn check_frame_size<const C: usize>(
    config: &VideoConfig,
    frame: &Image<u8, C>,
) -> Result<(), IoError> {
    if frame.size() != config.size {
        return Err(IoError::Sink(format!(
            "frame size mismatch: got {}, expected {}",
            frame.size(),
            config.size
        )));
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
