//! Tolerant 2D vertex pool.
//!
//! Positions are quantized onto a grid whose cell size equals the merge
//! tolerance; a lookup checks the 3x3 neighbourhood of cells so points that
//! straddle a cell border still merge.

use std::collections::HashMap;

use super::utils_2d::distance_squared;
use super::Point2;

/// Smallest usable cell size; keeps quantized keys inside i64 range.
const MIN_CELL: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct VertexPool {
    tolerance: f64,
    cell: f64,
    points: Vec<Point2>,
    grid: HashMap<(i64, i64), Vec<usize>>,
}

impl VertexPool {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            cell: tolerance.max(MIN_CELL),
            points: Vec::new(),
            grid: HashMap::new(),
        }
    }

    fn key(&self, p: Point2) -> (i64, i64) {
        ((p[0] / self.cell).floor() as i64, (p[1] / self.cell).floor() as i64)
    }

    /// Index of an existing vertex within tolerance of `p`, if any.
    pub fn find(&self, p: Point2) -> Option<usize> {
        let (kx, ky) = self.key(p);
        let tol_sq = self.tolerance * self.tolerance;
        let mut best: Option<(usize, f64)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.grid.get(&(kx + dx, ky + dy)) else {
                    continue;
                };
                for &idx in bucket {
                    let d = distance_squared(self.points[idx], p);
                    if d <= tol_sq && best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((idx, d));
                    }
                }
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Insert `p`, returning the index of the vertex it merged into.
    pub fn insert(&mut self, p: Point2) -> usize {
        if let Some(idx) = self.find(p) {
            return idx;
        }
        let idx = self.points.len();
        self.points.push(p);
        let key = self.key(p);
        self.grid.entry(key).or_default().push(idx);
        idx
    }

    pub fn get(&self, idx: usize) -> Point2 {
        self.points[idx]
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point2> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
