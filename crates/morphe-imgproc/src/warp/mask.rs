use morphe_image::ImageSize;

/// Distance tolerance, in pixels, for a pixel center to count as lying on an edge.
const EDGE_TOLERANCE: f64 = 1e-9;

/// A run of masked pixels on one image row, with inclusive column bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskSpan {
    /// Row of the span.
    pub y: usize,
    /// First masked column.
    pub x_start: usize,
    /// Last masked column.
    pub x_end: usize,
}

impl MaskSpan {
    /// Number of pixels in the span.
    pub fn len(&self) -> usize {
        self.x_end - self.x_start + 1
    }

    /// A span always covers at least one pixel.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The set of pixels covered by a triangle, stored as per-row spans.
///
/// A pixel `(x, y)` is covered when its integer coordinate lies inside the
/// triangle or on its boundary. Adjacent triangles therefore share only the
/// pixels lying on their common edge. The mask depends on geometry and image
/// size only, never on the number of channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangleMask {
    size: ImageSize,
    spans: Vec<MaskSpan>,
}

impl TriangleMask {
    /// Scan-fills `triangle` clipped to an image of `size`.
    ///
    /// Collinear or non-finite vertices produce an empty mask.
    ///
    /// # Example
    ///
    /// ```
    /// use morphe_imgproc::warp::TriangleMask;
    ///
    /// let mask = TriangleMask::from_triangle(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]], [4, 4].into());
    /// assert_eq!(mask.len(), 6);
    /// assert!(mask.contains(1, 1));
    /// assert!(!mask.contains(2, 1));
    /// ```
    pub fn from_triangle(triangle: &[[f64; 2]; 3], size: ImageSize) -> Self {
        let mut mask = Self {
            size,
            spans: Vec::new(),
        };

        if size.width == 0 || size.height == 0 {
            return mask;
        }

        let [p0, p1, p2] = *triangle;
        let area2 = (p1[0] - p0[0]) * (p2[1] - p0[1]) - (p1[1] - p0[1]) * (p2[0] - p0[0]);
        if !area2.is_finite() || area2 == 0.0 {
            return mask;
        }

        // orient so that the interior has non-negative edge functions
        let vertices = if area2 > 0.0 { [p0, p1, p2] } else { [p0, p2, p1] };
        let edges = [
            (vertices[0], vertices[1]),
            (vertices[1], vertices[2]),
            (vertices[2], vertices[0]),
        ];

        let y_min = vertices.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
        let y_max = vertices.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);
        let row_first = (y_min - EDGE_TOLERANCE).ceil().max(0.0);
        let row_last = (y_max + EDGE_TOLERANCE)
            .floor()
            .min((size.height - 1) as f64);
        if row_first > row_last {
            return mask;
        }
        let max_col = (size.width - 1) as f64;

        for y in row_first as usize..=row_last as usize {
            let yf = y as f64;
            let mut lo = f64::NEG_INFINITY;
            let mut hi = f64::INFINITY;
            let mut empty = false;

            for (a, b) in edges.iter() {
                // edge function along the row: k * x + m >= -tolerance
                let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
                let k = -dy;
                let m = dx * (yf - a[1]) + dy * a[0];
                let tolerance = EDGE_TOLERANCE * dx.hypot(dy);

                if k > 0.0 {
                    lo = lo.max((-tolerance - m) / k);
                } else if k < 0.0 {
                    hi = hi.min((-tolerance - m) / k);
                } else if m < -tolerance {
                    empty = true;
                    break;
                }
            }

            if empty {
                continue;
            }

            let x_start = lo.ceil().max(0.0);
            let x_end = hi.floor().min(max_col);
            if x_start > x_end {
                continue;
            }

            mask.spans.push(MaskSpan {
                y,
                x_start: x_start as usize,
                x_end: x_end as usize,
            });
        }

        mask
    }

    /// The image size the mask was rasterized for.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The row spans, ordered by row.
    pub fn spans(&self) -> &[MaskSpan] {
        &self.spans
    }

    /// Number of covered pixels.
    pub fn len(&self) -> usize {
        self.spans.iter().map(MaskSpan::len).sum()
    }

    /// Whether the mask covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Whether pixel `(x, y)` is covered.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.spans
            .binary_search_by_key(&y, |span| span.y)
            .map(|i| {
                let span = &self.spans[i];
                span.x_start <= x && x <= span.x_end
            })
            .unwrap_or(false)
    }

    /// Iterates the covered pixels as `(x, y)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.spans
            .iter()
            .flat_map(|span| (span.x_start..=span.x_end).map(move |x| (x, span.y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mask_includes_boundary() {
        let size = ImageSize {
            width: 11,
            height: 11,
        };
        let mask = TriangleMask::from_triangle(&[[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]], size);
        // rows of 11, 10, ..., 1 pixels
        assert_eq!(mask.len(), 66);
        assert!(mask.contains(0, 0));
        assert!(mask.contains(10, 0));
        assert!(mask.contains(0, 10));
        assert!(mask.contains(5, 5));
        assert!(!mask.contains(6, 5));
    }

    #[test]
    fn mask_orientation_independent() {
        let size = [8, 8].into();
        let ccw = TriangleMask::from_triangle(&[[1.0, 1.0], [6.0, 2.0], [3.0, 7.0]], size);
        let cw = TriangleMask::from_triangle(&[[1.0, 1.0], [3.0, 7.0], [6.0, 2.0]], size);
        assert_eq!(ccw, cw);
        assert!(!ccw.is_empty());
    }

    #[test]
    fn mask_adjacent_triangles_share_only_edge() {
        let size = ImageSize {
            width: 11,
            height: 11,
        };
        let upper = TriangleMask::from_triangle(&[[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]], size);
        let lower = TriangleMask::from_triangle(&[[10.0, 0.0], [10.0, 10.0], [0.0, 10.0]], size);

        let a: HashSet<_> = upper.iter().collect();
        let b: HashSet<_> = lower.iter().collect();
        let shared: HashSet<_> = a.intersection(&b).copied().collect();

        // only the diagonal x + y = 10
        assert_eq!(shared.len(), 11);
        assert!(shared.iter().all(|(x, y)| x + y == 10));
        // together they tile the square
        assert_eq!(a.union(&b).count(), 121);
    }

    #[test]
    fn mask_clipped_to_image() {
        let mask = TriangleMask::from_triangle(
            &[[-5.0, -5.0], [20.0, -5.0], [-5.0, 20.0]],
            [4, 3].into(),
        );
        assert_eq!(mask.len(), 12);
        assert!(mask.iter().all(|(x, y)| x < 4 && y < 3));
    }

    #[test]
    fn mask_degenerate_is_empty() {
        let mask = TriangleMask::from_triangle(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]], [4, 4].into());
        assert!(mask.is_empty());
        assert_eq!(mask.len(), 0);

        let outside =
            TriangleMask::from_triangle(&[[10.0, 10.0], [12.0, 10.0], [10.0, 12.0]], [4, 4].into());
        assert!(outside.is_empty());
    }
}
