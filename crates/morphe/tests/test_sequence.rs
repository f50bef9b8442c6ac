use morphe::{
    image::Image,
    imgproc::parallel::ExecutionStrategy,
    io::{functional::read_image, video::InMemorySink},
    sequence::{frame_file_name, VIDEO_FILE_NAME},
    BlendSession, MorphError, Point2d, SequenceConfig,
};

fn corners(width: usize, height: usize) -> Vec<Point2d> {
    let (w, h) = ((width - 1) as f64, (height - 1) as f64);
    vec![
        Point2d::new(0.0, 0.0),
        Point2d::new(w, 0.0),
        Point2d::new(w, h),
        Point2d::new(0.0, h),
    ]
}

fn session<const C: usize>(width: usize, height: usize) -> Result<BlendSession<C>, MorphError> {
    let size = [width, height].into();
    let start = Image::<u8, C>::from_size_val(size, 40)?;
    let end = Image::<u8, C>::from_size_val(size, 200)?;

    let mut start_points = corners(width, height);
    let mut end_points = corners(width, height);
    start_points.push(Point2d::new(width as f64 / 3.0, height as f64 / 2.0));
    end_points.push(Point2d::new(width as f64 / 2.0, height as f64 / 3.0));

    BlendSession::new(start, start_points, end, end_points)
}

#[test]
fn forward_frames() -> Result<(), MorphError> {
    let session = session::<1>(16, 12)?;
    let frames = session.frames(5, false)?;

    assert_eq!(frames.len(), 5);
    let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    let alphas: Vec<f64> = frames.iter().map(|f| f.alpha).collect();
    assert_eq!(alphas, vec![0.0, 0.25, 0.5, 0.75, 1.0]);

    assert_eq!(&frames[0].image, session.start_image());
    assert_eq!(&frames[4].image, session.end_image());
    assert_eq!(frames[2].image, session.blend(0.5)?);
    Ok(())
}

#[test]
fn reversed_frames_form_a_palindrome() -> Result<(), MorphError> {
    let session = session::<3>(10, 8)?;
    let frames = session.frames(5, true)?;

    assert_eq!(frames.len(), 10);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.index, i + 1);
    }
    for k in 0..5 {
        assert_eq!(frames[5 + k].image, frames[4 - k].image);
        assert_eq!(frames[5 + k].alpha, frames[4 - k].alpha);
    }
    Ok(())
}

#[test]
fn two_frames_are_the_inputs() -> Result<(), MorphError> {
    let session = session::<1>(6, 6)?;
    let frames = session.frames(2, false)?;
    assert_eq!(frames.len(), 2);
    assert_eq!(&frames[0].image, session.start_image());
    assert_eq!(&frames[1].image, session.end_image());
    Ok(())
}

#[test]
fn too_short_sequence() -> Result<(), MorphError> {
    let session = session::<1>(6, 6)?;
    assert!(matches!(
        session.frames(1, true),
        Err(MorphError::InvalidSequenceLength(1))
    ));
    assert!(matches!(
        session.frames(0, false),
        Err(MorphError::InvalidSequenceLength(0))
    ));
    Ok(())
}

#[test]
fn serial_frames_match_parallel() -> Result<(), MorphError> {
    let parallel = session::<1>(14, 9)?;
    let serial = session::<1>(14, 9)?.with_strategy(ExecutionStrategy::Serial);
    assert_eq!(parallel.frames(6, true)?, serial.frames(6, true)?);
    Ok(())
}

#[test]
fn generate_sequence_writes_frames_and_video() -> Result<(), MorphError> {
    let _ = env_logger::builder().is_test(true).try_init();

    let tmp_dir = tempfile::tempdir()?;
    let out_dir = tmp_dir.path().join("morph");

    let session = session::<3>(16, 12)?;
    let config = SequenceConfig {
        sequence_length: 4,
        include_reversed: true,
        fps: 5,
        jpeg_quality: 90,
        strategy: ExecutionStrategy::Parallel,
    };
    let mut sink = InMemorySink::<3>::new();
    let paths = session.generate_sequence_with(&out_dir, &config, &mut sink)?;

    assert_eq!(paths.len(), 8);
    for (i, path) in paths.iter().enumerate() {
        assert_eq!(path, &out_dir.join(frame_file_name(i + 1)));
        assert!(path.exists());
    }
    assert_eq!(paths[7], out_dir.join("frame008.jpg"));

    let decoded = read_image::<3>(&paths[0])?;
    assert_eq!(decoded.size(), session.size());

    assert!(sink.is_finished());
    let video = sink.config().ok_or(MorphError::InvalidInput("no video".into()))?;
    assert_eq!(video.fps, 5);
    assert_eq!(video.size, session.size());

    let frames = session.frames(4, true)?;
    assert_eq!(sink.frames().len(), frames.len());
    for (pushed, frame) in sink.frames().iter().zip(frames.iter()) {
        assert_eq!(pushed, &frame.image);
    }

    // only the in-memory sink was used
    assert!(!out_dir.join(VIDEO_FILE_NAME).exists());
    Ok(())
}

#[test]
fn generate_sequence_rejects_short_length() -> Result<(), MorphError> {
    let tmp_dir = tempfile::tempdir()?;
    let session = session::<1>(8, 8)?;
    let config = SequenceConfig {
        sequence_length: 1,
        ..Default::default()
    };
    let mut sink = InMemorySink::<1>::new();
    let res = session.generate_sequence_with(tmp_dir.path(), &config, &mut sink);
    assert!(matches!(res, Err(MorphError::InvalidSequenceLength(1))));
    assert!(sink.frames().is_empty());
    Ok(())
}
