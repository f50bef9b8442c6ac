use std::collections::HashSet;

use crate::{error::MorphError, point::Point2d};

pub use morphe_imgproc::linalg::{is_degenerate_triangle, signed_area2};

/// Distance of the enclosing triangle vertices, in multiples of the point set extent.
const SUPER_TRIANGLE_SCALE: f64 = 1e3;

/// Delaunay triangulation of a landmark set.
///
/// Triangles are stored as index triples into the point list passed to
/// [`Triangulation::new`], so the same triples index any corresponding point
/// list of the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangulation {
    num_points: usize,
    triangles: Vec<[usize; 3]>,
}

#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    center: [f64; 2],
    radius2: f64,
}

impl Circumcircle {
    fn of(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Self {
        // relative to `a` for precision
        let (bx, by) = (b[0] - a[0], b[1] - a[1]);
        let (cx, cy) = (c[0] - a[0], c[1] - a[1]);
        let d = 2.0 * (bx * cy - by * cx);
        if d == 0.0 {
            // flat triangles are removed by the next insertion
            return Self {
                center: a,
                radius2: f64::INFINITY,
            };
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        Self {
            center: [a[0] + ux, a[1] + uy],
            radius2: ux * ux + uy * uy,
        }
    }

    fn contains(&self, p: [f64; 2]) -> bool {
        if self.radius2.is_infinite() {
            return true;
        }
        let d2 = (p[0] - self.center[0]).powi(2) + (p[1] - self.center[1]).powi(2);
        // cocircular points count as outside
        d2 < self.radius2 * (1.0 - 1e-10)
    }
}

#[derive(Debug, Clone, Copy)]
struct Working {
    vertices: [usize; 3],
    circle: Circumcircle,
}

impl Triangulation {
    /// Computes the Delaunay triangulation of `points`.
    ///
    /// Exact duplicate points are triangulated once, through their first
    /// occurrence. The triangles cover the convex hull of the points, every
    /// triangle has positive [`signed_area2`] and the list is sorted, so the
    /// result is deterministic for a given input.
    ///
    /// # Errors
    ///
    /// * [`MorphError::InsufficientPoints`] for fewer than 3 distinct points or
    ///   when all points are collinear.
    /// * [`MorphError::InvalidInput`] if a coordinate is not finite.
    ///
    /// # Example
    ///
    /// ```
    /// use morphe::{Point2d, Triangulation};
    ///
    /// let points = [
    ///     Point2d::new(0.0, 0.0),
    ///     Point2d::new(10.0, 0.0),
    ///     Point2d::new(10.0, 10.0),
    ///     Point2d::new(0.0, 10.0),
    /// ];
    /// let triangulation = Triangulation::new(&points).unwrap();
    /// assert_eq!(triangulation.len(), 2);
    /// ```
    pub fn new(points: &[Point2d]) -> Result<Self, MorphError> {
        if points.len() < 3 {
            return Err(MorphError::InsufficientPoints(points.len()));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(MorphError::InvalidInput(format!(
                "point {i} has a non-finite coordinate"
            )));
        }

        // indices of the first occurrence of every distinct point
        let mut unique: Vec<usize> = Vec::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            if unique.iter().any(|&j| points[j] == *p) {
                log::warn!("dropping duplicate landmark {i} at ({}, {})", p.x, p.y);
                continue;
            }
            unique.push(i);
        }
        if unique.len() < 3 {
            return Err(MorphError::InsufficientPoints(unique.len()));
        }

        let mut vertices: Vec<[f64; 2]> = unique.iter().map(|&i| points[i].into()).collect();
        let n = vertices.len();

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for v in &vertices {
            min_x = min_x.min(v[0]);
            min_y = min_y.min(v[1]);
            max_x = max_x.max(v[0]);
            max_y = max_y.max(v[1]);
        }
        let extent = (max_x - min_x).max(max_y - min_y).max(1.0);
        let (mid_x, mid_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
        let far = SUPER_TRIANGLE_SCALE * extent;

        vertices.push([mid_x - far, mid_y - far]);
        vertices.push([mid_x + far, mid_y - far]);
        vertices.push([mid_x, mid_y + far]);

        let make = |vertices: &[[f64; 2]], tri: [usize; 3]| Working {
            vertices: tri,
            circle: Circumcircle::of(vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]),
        };

        let mut working = vec![make(&vertices, [n, n + 1, n + 2])];

        for i in 0..n {
            let p = vertices[i];

            let (bad, good): (Vec<Working>, Vec<Working>) =
                working.into_iter().partition(|t| t.circle.contains(p));
            working = good;

            // the boundary of the cavity is made of the edges used by exactly one bad triangle
            let mut edges: Vec<[usize; 2]> = Vec::with_capacity(bad.len() * 3);
            for t in &bad {
                let [a, b, c] = t.vertices;
                edges.extend([[a, b], [b, c], [c, a]]);
            }
            let is_shared = |e: &[usize; 2], edges: &[[usize; 2]]| {
                edges
                    .iter()
                    .filter(|o| (o[0] == e[0] && o[1] == e[1]) || (o[0] == e[1] && o[1] == e[0]))
                    .count()
                    > 1
            };
            for e in edges.iter().filter(|e| !is_shared(e, &edges)) {
                working.push(make(&vertices, [e[0], e[1], i]));
            }
        }

        let mut local: Vec<[usize; 3]> = working
            .iter()
            .filter(|t| t.vertices.iter().all(|&v| v < n))
            .filter_map(|t| {
                let [a, b, c] = t.vertices;
                let tri = [vertices[a], vertices[b], vertices[c]];
                if is_degenerate_triangle(&tri) {
                    return None;
                }
                Some(if signed_area2(tri[0], tri[1], tri[2]) > 0.0 {
                    [a, b, c]
                } else {
                    [a, c, b]
                })
            })
            .collect();

        if local.is_empty() {
            // every distinct point lies on one line
            return Err(MorphError::InsufficientPoints(points.len()));
        }

        close_hull(&vertices[..n], &mut local);

        let mut triangles: Vec<[usize; 3]> = local
            .iter()
            .map(|t| rotate_to_min(t.map(|v| unique[v])))
            .collect();
        triangles.sort_unstable();

        log::debug!(
            "triangulated {} points into {} triangles",
            points.len(),
            triangles.len()
        );

        Ok(Self {
            num_points: points.len(),
            triangles,
        })
    }

    /// The triangles as index triples.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the triangulation has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of points of the triangulated set, duplicates included.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Gathers the vertices of triangle `index` from a point list.
    ///
    /// Returns `None` if `index` is out of range or `points` is shorter than
    /// the triangulated set.
    pub fn triangle_points(&self, index: usize, points: &[Point2d]) -> Option<[[f64; 2]; 3]> {
        let [a, b, c] = *self.triangles.get(index)?;
        Some([
            (*points.get(a)?).into(),
            (*points.get(b)?).into(),
            (*points.get(c)?).into(),
        ])
    }
}

/// Covers the parts of the convex hull the enclosing triangle cut away.
///
/// A thin triangle along the hull can keep a far enclosing vertex inside its
/// circumcircle and is then dropped together with it. Each boundary edge with
/// a point beyond it is closed towards the point that sees the edge under the
/// widest angle, provided the new triangle holds no other point and crosses
/// no existing edge.
fn close_hull(vertices: &[[f64; 2]], triangles: &mut Vec<[usize; 3]>) {
    // a triangulation of n points has fewer than 2n triangles
    for _ in 0..2 * vertices.len() {
        let Some(triangle) = next_hull_triangle(vertices, triangles) else {
            return;
        };
        log::trace!("closing the hull with triangle {triangle:?}");
        triangles.push(triangle);
    }
}

fn next_hull_triangle(vertices: &[[f64; 2]], triangles: &[[usize; 3]]) -> Option<[usize; 3]> {
    let edges: HashSet<[usize; 2]> = triangles
        .iter()
        .flat_map(|&[a, b, c]| [[a, b], [b, c], [c, a]])
        .collect();
    let mut boundary: Vec<[usize; 2]> = edges
        .iter()
        .copied()
        .filter(|&[a, b]| !edges.contains(&[b, a]))
        .collect();
    boundary.sort_unstable();

    boundary.into_iter().find_map(|[a, b]| {
        let (pa, pb) = (vertices[a], vertices[b]);
        let mut best: Option<(usize, f64)> = None;
        for (p, &pp) in vertices.iter().enumerate() {
            // only points beyond the edge, i.e. on its right
            let corners = [pa, pp, pb];
            if p == a || p == b || is_degenerate_triangle(&corners) || signed_area2(pa, pp, pb) <= 0.0
            {
                continue;
            }
            let (u, v) = ([pa[0] - pp[0], pa[1] - pp[1]], [pb[0] - pp[0], pb[1] - pp[1]]);
            let angle = (u[0] * v[1] - u[1] * v[0])
                .abs()
                .atan2(u[0] * v[0] + u[1] * v[1]);
            if best.map_or(true, |(_, widest)| angle > widest)
                && is_free(vertices, &edges, [a, p, b])
            {
                best = Some((p, angle));
            }
        }
        best.map(|(p, _)| [a, p, b])
    })
}

/// Whether a candidate triangle can join the triangulation without overlap.
fn is_free(vertices: &[[f64; 2]], edges: &HashSet<[usize; 2]>, triangle: [usize; 3]) -> bool {
    let [a, p, b] = triangle;
    if edges.contains(&[a, p]) || edges.contains(&[p, b]) {
        return false;
    }

    let [ca, cp, cb] = triangle.map(|i| vertices[i]);
    let holds_point = vertices.iter().enumerate().any(|(i, &q)| {
        !triangle.contains(&i)
            && signed_area2(ca, cp, q) >= 0.0
            && signed_area2(cp, cb, q) >= 0.0
            && signed_area2(cb, ca, q) >= 0.0
    });
    if holds_point {
        return false;
    }

    !edges
        .iter()
        .any(|&e| segments_cross(vertices, [a, p], e) || segments_cross(vertices, [p, b], e))
}

/// Proper intersection of two segments, shared endpoints excluded.
fn segments_cross(vertices: &[[f64; 2]], [s, t]: [usize; 2], [u, v]: [usize; 2]) -> bool {
    if s == u || s == v || t == u || t == v {
        return false;
    }
    let (ps, pt, pu, pv) = (vertices[s], vertices[t], vertices[u], vertices[v]);
    signed_area2(ps, pt, pu) * signed_area2(ps, pt, pv) < 0.0
        && signed_area2(pu, pv, ps) * signed_area2(pu, pv, pt) < 0.0
}

fn rotate_to_min(t: [usize; 3]) -> [usize; 3] {
    if t[0] <= t[1] && t[0] <= t[2] {
        t
    } else if t[1] <= t[2] {
        [t[1], t[2], t[0]]
    } else {
        [t[2], t[0], t[1]]
    }
}
