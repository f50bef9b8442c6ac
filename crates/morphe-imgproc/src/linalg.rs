use faer::prelude::SpSolver;

/// Relative tolerance below which a triangle or a determinant is treated as vanishing.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Twice the signed area of a triangle.
///
/// Positive when the vertices are counter-clockwise in a y-up frame, which is
/// clockwise on screen with the image y axis pointing down.
pub fn signed_area2(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Whether a triangle has (numerically) zero area.
///
/// The area is compared against the square of the longest edge so the test
/// does not depend on the coordinate scale.
pub fn is_degenerate_triangle(triangle: &[[f64; 2]; 3]) -> bool {
    let [a, b, c] = *triangle;
    let edge2 = |p: [f64; 2], q: [f64; 2]| (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2);
    let longest = edge2(a, b).max(edge2(b, c)).max(edge2(c, a));
    let area2 = signed_area2(a, b, c);
    !area2.is_finite() || longest == 0.0 || area2.abs() <= SINGULAR_TOLERANCE * longest
}

/// Computes the 2D affine transformation from 3 point correspondences.
///
/// * `x1` - The source points with shape (3, 2).
/// * `x2` - The destination points with shape (3, 2).
///
/// # Returns
///
/// The 2D affine transformation matrix with shape (2, 3), or `None` if the
/// solution is not finite. The caller rejects degenerate source triangles
/// beforehand with [`is_degenerate_triangle`].
pub fn affine_3pt2d(x1: &[[f64; 2]; 3], x2: &[[f64; 2]; 3]) -> Option<[[f64; 3]; 2]> {
    // construct matrix A, two rows per correspondence
    let mat_a = faer::Mat::<f64>::from_fn(6, 6, |row, col| {
        let [x, y] = x1[row / 2];
        match (row % 2, col) {
            (0, 0) | (1, 3) => x,
            (0, 1) | (1, 4) => y,
            (0, 2) | (1, 5) => 1.0,
            _ => 0.0,
        }
    });
    let mat_b = faer::Mat::<f64>::from_fn(6, 1, |row, _| x2[row / 2][row % 2]);

    let params = mat_a.partial_piv_lu().solve(mat_b);
    let aff = params.col(0);

    let affine = [[aff[0], aff[1], aff[2]], [aff[3], aff[4], aff[5]]];
    affine
        .iter()
        .flatten()
        .all(|v| v.is_finite())
        .then_some(affine)
}

/// Inverts a 3x3 homogeneous affine matrix `[[a, b, c], [d, e, f], [0, 0, 1]]`.
///
/// Returns `None` when the linear part has a vanishing determinant.
pub fn invert_affine_matrix(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let (a, b, c) = (m[0][0], m[0][1], m[0][2]);
    let (d, e, f) = (m[1][0], m[1][1], m[1][2]);

    let determinant = a * e - b * d;
    let scale = (a * e).abs() + (b * d).abs();
    if !determinant.is_finite() || determinant.abs() <= SINGULAR_TOLERANCE * scale || scale == 0.0
    {
        return None;
    }
    let inv_determinant = 1.0 / determinant;

    let new_a = e * inv_determinant;
    let new_b = -b * inv_determinant;
    let new_d = -d * inv_determinant;
    let new_e = a * inv_determinant;
    let new_c = -(new_a * c + new_b * f);
    let new_f = -(new_d * c + new_e * f);

    Some([[new_a, new_b, new_c], [new_d, new_e, new_f], [0.0, 0.0, 1.0]])
}
