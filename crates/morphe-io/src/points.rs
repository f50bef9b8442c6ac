use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::IoError;

/// Returns the landmark file paired with an image: the image file name with `.txt` appended.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use morphe_io::points::points_path_for;
///
/// assert_eq!(points_path_for("faces/tiger.jpg"), Path::new("faces/tiger.jpg.txt"));
/// ```
pub fn points_path_for(image_path: impl AsRef<Path>) -> PathBuf {
    let mut path = image_path.as_ref().as_os_str().to_owned();
    path.push(".txt");
    PathBuf::from(path)
}

/// Parses landmark points from text, one whitespace separated `x y` pair per line.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// [`IoError::InvalidPointLine`] if a line does not hold exactly two finite numbers.
pub fn parse_points(text: &str) -> Result<Vec<[f64; 2]>, IoError> {
    let mut points = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let invalid = || IoError::InvalidPointLine {
            line: i + 1,
            content: line.to_string(),
        };

        let values = trimmed
            .split_whitespace()
            .map(|token| token.parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            [x, y] if x.is_finite() && y.is_finite() => points.push([*x, *y]),
            _ => return Err(invalid()),
        }
    }

    Ok(points)
}

/// Reads landmark points from a file.
pub fn read_points(file_path: impl AsRef<Path>) -> Result<Vec<[f64; 2]>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let points = parse_points(&std::fs::read_to_string(file_path)?)?;
    log::debug!("read {} points from {}", points.len(), file_path.display());
    Ok(points)
}

/// Formats landmark points with six decimals, one pair per line.
pub fn format_points(points: &[[f64; 2]]) -> String {
    let mut text = String::with_capacity(points.len() * 24);
    for [x, y] in points {
        // writing into a String cannot fail
        let _ = writeln!(text, "{x:.6} {y:.6}");
    }
    text
}

/// Writes landmark points to a file, replacing its content.
pub fn write_points(file_path: impl AsRef<Path>, points: &[[f64; 2]]) -> Result<(), IoError> {
    std::fs::write(file_path, format_points(points))?;
    Ok(())
}
