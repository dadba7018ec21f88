//! Camera-plane shapes: polygons with holes and the planar operations that
//! produce them.

use serde::{Deserialize, Serialize};

use crate::geometry::utils_2d::polygon_area;
use crate::geometry::Point2;

pub mod planar;

#[cfg(test)]
mod tests_union;

pub use planar::{node_segments, polygonize, union_polygons, PlanarGraph};

/// Ordered camera-plane points with implicit closure (last != first).
pub type Ring = Vec<Point2>;

/// A polygon with holes.
///
/// After resolution the exterior is CCW, holes are CW and every ring is
/// simple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StencilPolygon {
    pub exterior: Ring,
    #[serde(default)]
    pub holes: Vec<Ring>,
}

impl StencilPolygon {
    pub fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    /// Exterior first, then holes.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    /// Filled area (exterior minus holes).
    pub fn area(&self) -> f64 {
        polygon_area(&self.exterior) - self.holes.iter().map(|h| polygon_area(h)).sum::<f64>()
    }

    /// Total number of ring points, which is also the number of ring edges.
    pub fn point_count(&self) -> usize {
        self.rings().map(|r| r.len()).sum()
    }

    /// Every ring edge as a segment, closing edges included.
    pub fn segments(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        self.rings().flat_map(|ring| {
            let n = ring.len();
            (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
        })
    }
}

/// A set of non-overlapping polygons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StencilShape {
    pub polygons: Vec<StencilPolygon>,
}

impl StencilShape {
    pub fn new(polygons: Vec<StencilPolygon>) -> Self {
        Self { polygons }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn area(&self) -> f64 {
        self.polygons.iter().map(|p| p.area()).sum()
    }

    pub fn point_count(&self) -> usize {
        self.polygons.iter().map(|p| p.point_count()).sum()
    }
}
