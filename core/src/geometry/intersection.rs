//! 2D segment intersection calculations for camera-plane geometry

use super::utils_2d::{cross_2d, distance_squared, dot_2d, lerp};
use super::Point2;

/// Find the parameter t along line segment where a point lies.
/// Returns t such that point = start + t * (end - start)
/// t in [0,1] means point is on segment.
pub fn point_on_line_parameter(start: Point2, end: Point2, point: Point2) -> f64 {
    let dx = end[0] - start[0];
    let dy = end[1] - start[1];
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-30 {
        return 0.0;
    }

    let px = point[0] - start[0];
    let py = point[1] - start[1];

    (px * dx + py * dy) / len_sq
}

/// Whether `point` lies on the segment `start..end` within `tolerance`.
pub fn point_on_segment(point: Point2, start: Point2, end: Point2, tolerance: f64) -> bool {
    let t = point_on_line_parameter(start, end, point).clamp(0.0, 1.0);
    distance_squared(lerp(start, end, t), point) <= tolerance * tolerance
}

/// Calculate every point shared by two 2D line segments.
///
/// Returns nothing for disjoint segments, one point for a crossing or a
/// touch, and the overlap endpoints for collinear overlapping segments.
/// Uses parametric line representation: P = P0 + t*(P1-P0).
pub fn segment_intersections(
    a0: Point2, a1: Point2,
    b0: Point2, b1: Point2,
    tolerance: f64,
) -> Vec<Point2> {
    let da = [a1[0] - a0[0], a1[1] - a0[1]];
    let db = [b1[0] - b0[0], b1[1] - b0[1]];
    let len_a = dot_2d(da, da).sqrt();
    let len_b = dot_2d(db, db).sqrt();

    // Degenerate segments act as points.
    if len_a <= tolerance || len_b <= tolerance {
        let (p, s0, s1) = if len_a <= tolerance { (a0, b0, b1) } else { (b0, a0, a1) };
        return if point_on_segment(p, s0, s1, tolerance) { vec![p] } else { Vec::new() };
    }

    // Cross product of direction vectors (2D determinant)
    let cross = cross_2d(da, db);

    if cross.abs() > tolerance * len_a * len_b {
        // Vector from A start to B start
        let d = [b0[0] - a0[0], b0[1] - a0[1]];
        let t = cross_2d(d, db) / cross;
        let u = cross_2d(d, da) / cross;

        let t_tol = tolerance / len_a;
        let u_tol = tolerance / len_b;
        if t >= -t_tol && t <= 1.0 + t_tol && u >= -u_tol && u <= 1.0 + u_tol {
            return vec![lerp(a0, a1, t.clamp(0.0, 1.0))];
        }
        return Vec::new();
    }

    // Parallel: only collinear segments can share points.
    let offset = cross_2d(da, [b0[0] - a0[0], b0[1] - a0[1]]) / len_a;
    if offset.abs() > tolerance {
        return Vec::new();
    }

    let mut points: Vec<Point2> = Vec::with_capacity(2);
    for (p, s0, s1) in [(b0, a0, a1), (b1, a0, a1), (a0, b0, b1), (a1, b0, b1)] {
        if point_on_segment(p, s0, s1, tolerance)
            && !points.iter().any(|q| distance_squared(*q, p) <= tolerance * tolerance)
        {
            points.push(p);
        }
    }
    points
}
