//! Constrained triangulation of stencil shapes.
//!
//! Ring edges are the constraints: each polygon is ear-clipped together with
//! its holes, so no triangle crosses a ring and hole interiors stay empty.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CarveError, CarveResult};
use crate::geometry::utils_2d::{orient, representative_point};
use crate::geometry::{Point2, VertexPool};
use crate::shape::StencilShape;

/// Triangles over a deduplicated vertex list, all CCW.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangulatedShape {
    pub vertices: Vec<Point2>,
    pub triangles: Vec<[usize; 3]>,
}

impl TriangulatedShape {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Edges used by exactly one triangle, directed as in that triangle.
    pub fn boundary_edges(&self) -> Vec<(usize, usize)> {
        let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
        for tri in &self.triangles {
            for (a, b) in triangle_edges(tri) {
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }

        self.triangles
            .iter()
            .flat_map(triangle_edges)
            .filter(|&(a, b)| counts.get(&(a.min(b), a.max(b))) == Some(&1))
            .collect()
    }

    /// Give every edge-connected fan of triangles around a vertex its own
    /// copy of that vertex.
    ///
    /// Regions touching at a single point (figure-eight lobes, a hole
    /// touching its exterior) share that vertex after deduplication; lifted
    /// as is, its side edge would border four faces.
    pub fn split_pinch_vertices(&self) -> TriangulatedShape {
        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); self.vertices.len()];
        for (t, tri) in self.triangles.iter().enumerate() {
            for &v in tri {
                incident[v].push(t);
            }
        }

        let mut vertices = self.vertices.clone();
        let mut triangles = self.triangles.clone();
        for (v, tris) in incident.iter().enumerate() {
            if tris.len() < 2 {
                continue;
            }
            for fan in vertex_fans(v, tris, &self.triangles).iter().skip(1) {
                let copy = vertices.len();
                vertices.push(self.vertices[v]);
                for &t in fan {
                    for corner in triangles[t].iter_mut().filter(|c| **c == v) {
                        *corner = copy;
                    }
                }
            }
        }

        TriangulatedShape { vertices, triangles }
    }
}

fn triangle_edges(tri: &[usize; 3]) -> [(usize, usize); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}

/// Triangles around `v` grouped by shared edges through `v`.
fn vertex_fans(v: usize, tris: &[usize], triangles: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let shares_edge = |a: &[usize; 3], b: &[usize; 3]| a.iter().any(|&w| w != v && b.contains(&w));

    let mut assigned = vec![false; tris.len()];
    let mut fans = Vec::new();
    for seed in 0..tris.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut fan = Vec::new();
        let mut stack = vec![seed];
        while let Some(i) = stack.pop() {
            fan.push(tris[i]);
            for j in 0..tris.len() {
                if !assigned[j] && shares_edge(&triangles[tris[i]], &triangles[tris[j]]) {
                    assigned[j] = true;
                    stack.push(j);
                }
            }
        }
        fans.push(fan);
    }
    fans
}

/// Planar straight-line graph handed to the triangulator.
struct Pslg {
    pool: VertexPool,
    segments: HashSet<(usize, usize)>,
    holes: Vec<Point2>,
    /// Per polygon: global vertex index of each ring point, one list per ring
    polygons: Vec<Vec<Vec<usize>>>,
}

impl Pslg {
    fn build(shape: &StencilShape, tolerance: f64) -> Self {
        let mut pslg = Self {
            pool: VertexPool::new(tolerance),
            segments: HashSet::new(),
            holes: Vec::new(),
            polygons: Vec::with_capacity(shape.polygons.len()),
        };

        for polygon in &shape.polygons {
            let mut rings = Vec::new();
            for ring in polygon.rings() {
                let indices: Vec<usize> = ring.iter().map(|&p| pslg.pool.insert(p)).collect();
                for i in 0..indices.len() {
                    let a = indices[i];
                    let b = indices[(i + 1) % indices.len()];
                    if a != b {
                        pslg.segments.insert((a.min(b), a.max(b)));
                    }
                }
                rings.push(indices);
            }
            pslg.holes.extend(polygon.holes.iter().filter_map(|h| representative_point(h)));
            pslg.polygons.push(rings);
        }

        pslg
    }
}

/// Triangulate every polygon of `shape`, excluding holes.
pub fn triangulate_shape(shape: &StencilShape, tolerance: f64) -> CarveResult<TriangulatedShape> {
    let pslg = Pslg::build(shape, tolerance);
    if pslg.pool.is_empty() || pslg.segments.is_empty() {
        return Err(CarveError::NotTriangulable("shape has no vertices or segments".into()));
    }

    let mut triangles: Vec<[usize; 3]> = Vec::new();
    for rings in &pslg.polygons {
        if rings.first().map_or(true, |ext| ext.len() < 3) {
            continue;
        }

        let mut coords: Vec<f64> = Vec::new();
        let mut hole_indices: Vec<usize> = Vec::new();
        let mut local_to_global: Vec<usize> = Vec::new();
        for (ring_idx, ring) in rings.iter().enumerate() {
            if ring_idx > 0 {
                if ring.len() < 3 {
                    continue;
                }
                hole_indices.push(local_to_global.len());
            }
            for &v in ring {
                let p = pslg.pool.get(v);
                coords.push(p[0]);
                coords.push(p[1]);
                local_to_global.push(v);
            }
        }

        let local = earcutr::earcut(&coords, &hole_indices, 2)
            .map_err(|e| CarveError::InvalidShape(format!("ear clipping failed: {:?}", e)))?;
        triangles.extend(
            local
                .chunks_exact(3)
                .map(|t| [local_to_global[t[0]], local_to_global[t[1]], local_to_global[t[2]]]),
        );
    }

    let vertices = pslg.pool.points();

    // Drop index-degenerate triangles and orient the rest CCW.
    let mut triangles: Vec<[usize; 3]> = triangles
        .into_iter()
        .filter(|t| t[0] != t[1] && t[1] != t[2] && t[2] != t[0])
        .map(|[a, b, c]| {
            if orient(vertices[a], vertices[b], vertices[c]) < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect();

    remove_hole_regions(&mut triangles, vertices, &pslg.segments, &pslg.holes);

    let triangulated = compact(vertices, triangles);
    debug!(
        vertices = triangulated.vertices.len(),
        triangles = triangulated.triangles.len(),
        holes = pslg.holes.len(),
        "triangulated shape"
    );
    Ok(triangulated)
}

fn contains(tri: &[usize; 3], vertices: &[Point2], p: Point2) -> bool {
    let [a, b, c] = tri.map(|i| vertices[i]);
    orient(a, b, p) > 0.0 && orient(b, c, p) > 0.0 && orient(c, a, p) > 0.0
}

/// Remove every triangle reachable from a hole point without crossing a
/// constraint segment.
fn remove_hole_regions(
    triangles: &mut Vec<[usize; 3]>,
    vertices: &[Point2],
    segments: &HashSet<(usize, usize)>,
    holes: &[Point2],
) {
    let mut removed = vec![false; triangles.len()];
    let mut queue: VecDeque<usize> = triangles
        .iter()
        .enumerate()
        .filter(|(_, t)| holes.iter().any(|&h| contains(t, vertices, h)))
        .map(|(i, _)| i)
        .collect();
    if queue.is_empty() {
        return;
    }

    let mut edge_triangles: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (i, tri) in triangles.iter().enumerate() {
        for (a, b) in triangle_edges(tri) {
            edge_triangles.entry((a.min(b), a.max(b))).or_default().push(i);
        }
    }

    while let Some(i) = queue.pop_front() {
        if removed[i] {
            continue;
        }
        removed[i] = true;
        for (a, b) in triangle_edges(&triangles[i]) {
            let key = (a.min(b), a.max(b));
            if segments.contains(&key) {
                continue;
            }
            if let Some(neighbors) = edge_triangles.get(&key) {
                queue.extend(neighbors.iter().copied().filter(|&n| !removed[n]));
            }
        }
    }

    let mut idx = 0;
    triangles.retain(|_| {
        let keep = !removed[idx];
        idx += 1;
        keep
    });
}

/// Drop vertices no triangle references, keeping their order.
fn compact(vertices: &[Point2], triangles: Vec<[usize; 3]>) -> TriangulatedShape {
    let mut remap: Vec<Option<usize>> = vec![None; vertices.len()];
    let mut used = vec![false; vertices.len()];
    for tri in &triangles {
        for &v in tri {
            used[v] = true;
        }
    }

    let mut kept = Vec::new();
    for (i, &p) in vertices.iter().enumerate() {
        if used[i] {
            remap[i] = Some(kept.len());
            kept.push(p);
        }
    }

    let triangles = triangles
        .into_iter()
        .filter_map(|t| Some([remap[t[0]]?, remap[t[1]]?, remap[t[2]]?]))
        .collect();

    TriangulatedShape {
        vertices: kept,
        triangles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::utils_2d::polygon_area;
    use crate::shape::StencilPolygon;

    fn triangle_area_sum(t: &TriangulatedShape) -> f64 {
        t.triangles
            .iter()
            .map(|tri| polygon_area(&tri.map(|i| t.vertices[i])))
            .sum()
    }

    #[test]
    fn test_unit_square() {
        let shape = StencilShape::new(vec![StencilPolygon::new(vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
        ])]);
        let t = triangulate_shape(&shape, 1e-9).unwrap();
        assert_eq!(t.vertices.len(), 4);
        assert_eq!(t.triangles.len(), 2);
        assert_eq!(t.boundary_edges().len(), 4);
    }

    #[test]
    fn test_square_with_hole() {
        let shape = StencilShape::new(vec![StencilPolygon::with_holes(
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
            vec![vec![[3.0, 4.0], [3.0, 7.0], [6.0, 7.0], [6.0, 4.0]]],
        )]);
        let t = triangulate_shape(&shape, 1e-9).unwrap();
        assert_eq!(t.vertices.len(), 8);
        assert_eq!(t.triangles.len(), 8);
        assert_eq!(t.boundary_edges().len(), shape.point_count());
        assert!((triangle_area_sum(&t) - 91.0).abs() < 1e-9);

        for tri in &t.triangles {
            assert!(orient(t.vertices[tri[0]], t.vertices[tri[1]], t.vertices[tri[2]]) > 0.0);
        }
    }

    #[test]
    fn test_shared_vertices_are_deduplicated() {
        // Two squares touching at a corner share one vertex.
        let shape = StencilShape::new(vec![
            StencilPolygon::new(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
            StencilPolygon::new(vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0]]),
        ]);
        let t = triangulate_shape(&shape, 1e-9).unwrap();
        assert_eq!(t.vertices.len(), 7);
        assert_eq!(t.triangles.len(), 4);
    }

    #[test]
    fn test_split_pinch_vertices() {
        // Two triangles touching at vertex 2.
        let t = TriangulatedShape {
            vertices: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [2.0, 1.0], [2.0, 2.0]],
            triangles: vec![[0, 1, 2], [2, 3, 4]],
        };
        let split = t.split_pinch_vertices();
        assert_eq!(split.vertices.len(), 6);
        assert_eq!(split.vertices[5], [1.0, 1.0]);
        assert_eq!(split.triangles, vec![[0, 1, 2], [5, 3, 4]]);
        assert_eq!(split.boundary_edges().len(), 6);
    }

    #[test]
    fn test_split_keeps_connected_fans() {
        let shape = StencilShape::new(vec![StencilPolygon::new(vec![
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 2.0],
            [0.0, 2.0],
        ])]);
        let t = triangulate_shape(&shape, 1e-9).unwrap();
        assert_eq!(t.split_pinch_vertices(), t);
    }

    #[test]
    fn test_hole_flood_stops_at_segments() {
        let vertices = vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        let mut triangles = vec![[0, 1, 2], [0, 2, 3]];
        let segments: HashSet<(usize, usize)> = [(0, 2)].into_iter().collect();
        remove_hole_regions(&mut triangles, &vertices, &segments, &[[1.5, 0.5]]);
        assert_eq!(triangles, vec![[0, 2, 3]]);
    }

    #[test]
    fn test_empty_shape_is_not_triangulable() {
        let err = triangulate_shape(&StencilShape::default(), 1e-9).unwrap_err();
        assert!(matches!(err, CarveError::NotTriangulable(_)));
    }
}
