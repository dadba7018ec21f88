//! 2D geometry utilities for camera-plane shapes.
//!
//! Pure functions over `[f64; 2]` points and rings that the extractor,
//! the planar arrangement and the triangulator all share.

use super::Point2;
use std::f64::consts::TAU;

/// Tolerance for floating-point comparisons
pub const EPSILON: f64 = 1e-9;

// =============================================================================
// Point Operations
// =============================================================================

/// Compute squared distance between two 2D points.
#[inline]
pub fn distance_squared(p1: Point2, p2: Point2) -> f64 {
    let dx = p2[0] - p1[0];
    let dy = p2[1] - p1[1];
    dx * dx + dy * dy
}

/// Compute distance between two 2D points.
#[inline]
pub fn distance(p1: Point2, p2: Point2) -> f64 {
    distance_squared(p1, p2).sqrt()
}

/// Linear interpolation between two 2D points.
#[inline]
pub fn lerp(p1: Point2, p2: Point2, t: f64) -> Point2 {
    [p1[0] + t * (p2[0] - p1[0]), p1[1] + t * (p2[1] - p1[1])]
}

// =============================================================================
// Vector Operations
// =============================================================================

/// 2D cross product (z-component of 3D cross product).
/// Positive if v2 is counter-clockwise from v1.
#[inline]
pub fn cross_2d(v1: Point2, v2: Point2) -> f64 {
    v1[0] * v2[1] - v1[1] * v2[0]
}

/// Orientation of the triple (a, b, c): positive when counter-clockwise.
#[inline]
pub fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
    cross_2d([b[0] - a[0], b[1] - a[1]], [c[0] - a[0], c[1] - a[1]])
}

/// 2D dot product.
#[inline]
pub fn dot_2d(v1: Point2, v2: Point2) -> f64 {
    v1[0] * v2[0] + v1[1] * v2[1]
}

/// Angle of the direction `from -> to`, normalized to `[0, TAU)`.
#[inline]
pub fn direction_angle(from: Point2, to: Point2) -> f64 {
    (to[1] - from[1]).atan2(to[0] - from[0]).rem_euclid(TAU)
}

/// Perpendicular vector (90° counter-clockwise rotation).
#[inline]
pub fn perpendicular_ccw(v: Point2) -> Point2 {
    [-v[1], v[0]]
}

// =============================================================================
// Polygon Operations
// =============================================================================

/// Compute signed area of a polygon using the Shoelace formula.
/// Positive = CCW winding, Negative = CW winding.
pub fn polygon_signed_area(vertices: &[Point2]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i][0] * vertices[j][1];
        area -= vertices[j][0] * vertices[i][1];
    }
    area / 2.0
}

/// Compute absolute area of a polygon.
pub fn polygon_area(vertices: &[Point2]) -> f64 {
    polygon_signed_area(vertices).abs()
}

/// Winding number of `polygon` around `point`.
///
/// The ring is implicitly closed. Non-simple rings are allowed; regions
/// traversed in opposite directions cancel out.
pub fn winding_number(point: Point2, polygon: &[Point2]) -> i32 {
    let n = polygon.len();
    if n < 3 {
        return 0;
    }

    let mut winding: i32 = 0;

    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];

        if p1[1] <= point[1] {
            if p2[1] > point[1] && orient(p1, p2, point) > 0.0 {
                // Upward crossing
                winding += 1;
            }
        } else if p2[1] <= point[1] && orient(p1, p2, point) < 0.0 {
            // Downward crossing
            winding -= 1;
        }
    }

    winding
}

/// Test if a point is inside a polygon using the winding number algorithm.
/// Works for both convex and concave polygons.
pub fn point_in_polygon(point: Point2, polygon: &[Point2]) -> bool {
    winding_number(point, polygon) != 0
}

/// Remove consecutive duplicates (including the wrap-around pair) and
/// vertices collinear with their neighbours.
///
/// `tolerance` bounds both the duplicate distance and the height of a
/// collinear vertex above the chord of its neighbours.
pub fn simplify_ring(ring: &[Point2], tolerance: f64) -> Vec<Point2> {
    let mut pts: Vec<Point2> = Vec::with_capacity(ring.len());
    for &p in ring {
        if pts.last().map_or(true, |&q| distance_squared(p, q) > tolerance * tolerance) {
            pts.push(p);
        }
    }
    while pts.len() > 1 && distance_squared(pts[0], pts[pts.len() - 1]) <= tolerance * tolerance {
        pts.pop();
    }

    // Repeatedly drop collinear vertices until a full pass removes nothing.
    let mut changed = true;
    while changed && pts.len() >= 3 {
        changed = false;
        let n = pts.len();
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let curr = pts[i];
            let next = pts[(i + 1) % n];
            let chord = distance(prev, next);
            let height = if chord > 0.0 {
                orient(prev, curr, next).abs() / chord
            } else {
                distance(prev, curr)
            };
            if height <= tolerance {
                pts.remove(i);
                changed = true;
                break;
            }
        }
    }

    pts
}

/// Whether a closed ring is simple: at least three vertices, non-zero area,
/// no zero-length edge, and no two edges touching except consecutive edges
/// at their shared vertex.
pub fn ring_is_simple(ring: &[Point2], tolerance: f64) -> bool {
    let n = ring.len();
    if n < 3 || polygon_area(ring) <= tolerance * tolerance {
        return false;
    }

    for i in 0..n {
        if distance_squared(ring[i], ring[(i + 1) % n]) <= tolerance * tolerance {
            return false;
        }
    }

    for i in 0..n {
        let a0 = ring[i];
        let a1 = ring[(i + 1) % n];
        for j in (i + 1)..n {
            let b0 = ring[j];
            let b1 = ring[(j + 1) % n];
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                // Consecutive edges may only share their common vertex; a
                // collinear fold-back overlaps along its length.
                let (shared, far_a, far_b) = if j == i + 1 { (a1, a0, b1) } else { (a0, a1, b0) };
                let da = [far_a[0] - shared[0], far_a[1] - shared[1]];
                let db = [far_b[0] - shared[0], far_b[1] - shared[1]];
                let cross = cross_2d(da, db);
                let scale = (dot_2d(da, da) * dot_2d(db, db)).sqrt();
                if cross.abs() <= tolerance * scale && dot_2d(da, db) > 0.0 {
                    return false;
                }
                continue;
            }
            if !super::segment_intersections(a0, a1, b0, b1, tolerance).is_empty() {
                return false;
            }
        }
    }

    true
}

/// Whether an open polyline never touches itself, apart from consecutive
/// segments meeting at their shared vertex.
pub fn polyline_is_simple(points: &[Point2], tolerance: f64) -> bool {
    let segments = points.len().saturating_sub(1);
    for i in 0..segments {
        for j in (i + 2)..segments {
            if !super::segment_intersections(points[i], points[i + 1], points[j], points[j + 1], tolerance)
                .is_empty()
            {
                return false;
            }
        }
    }
    true
}

/// A point strictly inside a simple ring.
///
/// Scans the horizontal line halfway between the two middle distinct vertex
/// heights, pairs up its crossings with the ring and returns the midpoint of
/// the widest inside interval.
pub fn representative_point(ring: &[Point2]) -> Option<Point2> {
    let n = ring.len();
    if n < 3 {
        return None;
    }

    let mut ys: Vec<f64> = ring.iter().map(|p| p[1]).collect();
    ys.sort_by(|a, b| a.total_cmp(b));
    ys.dedup_by(|a, b| (*a - *b).abs() <= EPSILON);
    if ys.len() < 2 {
        return None;
    }
    let mid = ys.len() / 2;
    let scan_y = (ys[mid - 1] + ys[mid]) / 2.0;

    let mut xs: Vec<f64> = Vec::new();
    for i in 0..n {
        let p1 = ring[i];
        let p2 = ring[(i + 1) % n];
        if (p1[1] <= scan_y) != (p2[1] <= scan_y) {
            let t = (scan_y - p1[1]) / (p2[1] - p1[1]);
            xs.push(p1[0] + t * (p2[0] - p1[0]));
        }
    }
    xs.sort_by(|a, b| a.total_cmp(b));

    xs.chunks_exact(2)
        .max_by(|a, b| (a[1] - a[0]).total_cmp(&(b[1] - b[0])))
        .filter(|pair| pair[1] - pair[0] > 0.0)
        .map(|pair| [(pair[0] + pair[1]) / 2.0, scan_y])
}

// =============================================================================
// Tests
// =============================================================================
