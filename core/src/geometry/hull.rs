//! # Convex Hull (Monotone Chain)
//!
//! 2D convex hull of projected points, used for the hull outline policies of
//! the shape extractor.
//!
//! ## Algorithm
//!
//! 1. Sort points lexicographically by (x, y)
//! 2. Build the lower chain left to right, popping non-left turns
//! 3. Build the upper chain right to left the same way
//! 4. Concatenate the chains without their repeated end points

use super::utils_2d::orient;
use super::Point2;

/// Compute the convex hull of `points` as a CCW ring without collinear
/// vertices. Returns fewer than three points when the input is degenerate.
pub fn convex_hull(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let mut sorted: Vec<Point2> = points.to_vec();
    sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    sorted.dedup_by(|a, b| (a[0] - b[0]).abs() <= tolerance && (a[1] - b[1]).abs() <= tolerance);

    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<Point2> = Vec::with_capacity(sorted.len() * 2);

    // Lower chain
    for &p in &sorted {
        while hull.len() >= 2 && orient(hull[hull.len() - 2], hull[hull.len() - 1], p) <= tolerance {
            hull.pop();
        }
        hull.push(p);
    }

    // Upper chain
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && orient(hull[hull.len() - 2], hull[hull.len() - 1], p) <= tolerance
        {
            hull.pop();
        }
        hull.push(p);
    }

    // Last point repeats the first
    hull.pop();
    hull
}
