//! Planar arrangement of camera-plane segments.
//!
//! Turns arbitrary (self-intersecting, overlapping, open) outlines into
//! valid polygons-with-holes by:
//! 1. Noding all segments so they only meet at shared vertices
//! 2. Extracting bounded faces from the half-edge graph (polygonize)
//! 3. Tracing the boundary of a fill predicate over the noded graph (union)

use std::collections::HashSet;
use std::f64::consts::TAU;

use tracing::debug;

use super::{Ring, StencilPolygon, StencilShape};
use crate::error::{CarveError, CarveResult};
use crate::geometry::intersection::{point_on_line_parameter, segment_intersections};
use crate::geometry::utils_2d::{
    direction_angle, distance, perpendicular_ccw, point_in_polygon, polygon_area,
    polygon_signed_area, representative_point, ring_is_simple, simplify_ring, winding_number,
};
use crate::geometry::{Point2, VertexPool};

/// Side samples are taken this fraction of the edge length away from it.
const SAMPLE_OFFSET: f64 = 1e-4;

/// Noded segment soup: edges meet only at shared vertices.
#[derive(Debug, Clone, Default)]
pub struct PlanarGraph {
    pub vertices: Vec<Point2>,
    /// Undirected edges `(a, b)` with `a < b`, each stored once.
    pub edges: Vec<(usize, usize)>,
}

/// Split every segment at its intersections with every other segment
/// (crossings, T-junctions and collinear overlaps), merge vertices within
/// `tolerance` and drop duplicate and zero-length edges.
pub fn node_segments(segments: &[(Point2, Point2)], tolerance: f64) -> PlanarGraph {
    let mut pool = VertexPool::new(tolerance);
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut edges = Vec::new();

    for (i, &(a0, a1)) in segments.iter().enumerate() {
        // Collect all points on this segment (endpoints + intersections)
        let mut splits: Vec<(f64, Point2)> = vec![(0.0, a0), (1.0, a1)];
        for (j, &(b0, b1)) in segments.iter().enumerate() {
            if i == j {
                continue;
            }
            for p in segment_intersections(a0, a1, b0, b1, tolerance) {
                splits.push((point_on_line_parameter(a0, a1, p), p));
            }
        }

        // Sort by parameter along the segment
        splits.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut prev: Option<usize> = None;
        for (_, p) in splits {
            let idx = pool.insert(p);
            if let Some(prev_idx) = prev {
                if prev_idx != idx {
                    let key = (prev_idx.min(idx), prev_idx.max(idx));
                    if seen.insert(key) {
                        edges.push(key);
                    }
                }
            }
            prev = Some(idx);
        }
    }

    PlanarGraph {
        vertices: pool.into_points(),
        edges,
    }
}

// =============================================================================
// Polygonize
// =============================================================================

/// A half-edge in the planar graph
#[derive(Debug, Clone)]
struct HalfEdge {
    start: usize,
    end: usize,
    /// Opposite half-edge
    twin: usize,
    /// Next half-edge in face traversal
    next: Option<usize>,
    /// Removed as part of a filament
    deleted: bool,
    /// Consumed by face extraction
    used: bool,
}

/// Bounded faces of a noded graph as CCW rings.
///
/// Dangling chains are pruned first, so open polylines enclose nothing and a
/// figure-eight yields one ring per lobe.
pub fn polygonize(graph: &PlanarGraph, tolerance: f64) -> Vec<Ring> {
    let mut edges: Vec<HalfEdge> = Vec::with_capacity(graph.edges.len() * 2);
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); graph.vertices.len()];

    for &(a, b) in &graph.edges {
        let e1 = edges.len();
        let e2 = e1 + 1;
        edges.push(HalfEdge { start: a, end: b, twin: e2, next: None, deleted: false, used: false });
        edges.push(HalfEdge { start: b, end: a, twin: e1, next: None, deleted: false, used: false });
        outgoing[a].push(e1);
        outgoing[b].push(e2);
    }

    prune_filaments(&mut outgoing, &mut edges);
    link_half_edges(&graph.vertices, &outgoing, &mut edges);

    let mut rings = Vec::new();
    for face in extract_faces(&mut edges) {
        let mut ring: Ring = face.iter().map(|&e| graph.vertices[edges[e].start]).collect();
        // Bounded faces are CW in this half-edge structure; the unbounded
        // face of each component comes out CCW and is skipped.
        if polygon_signed_area(&ring) < -(tolerance * tolerance) {
            ring.reverse();
            rings.push(ring);
        }
    }
    rings
}

/// Iteratively remove degree-1 vertices (dead ends) and their incident edges
fn prune_filaments(outgoing: &mut [Vec<usize>], edges: &mut [HalfEdge]) {
    let mut changed = true;
    while changed {
        changed = false;
        for v in 0..outgoing.len() {
            let live: Vec<usize> = outgoing[v].iter().copied().filter(|&e| !edges[e].deleted).collect();
            if let [e] = live[..] {
                edges[e].deleted = true;
                let twin = edges[e].twin;
                edges[twin].deleted = true;
                changed = true;
            }
        }
    }

    for list in outgoing.iter_mut() {
        list.retain(|&e| !edges[e].deleted);
    }
}

/// Link half-edges by sorting edges around each vertex by angle
fn link_half_edges(vertices: &[Point2], outgoing: &[Vec<usize>], edges: &mut [HalfEdge]) {
    for (v, list) in outgoing.iter().enumerate() {
        if list.is_empty() {
            continue;
        }

        let mut sorted = list.clone();
        sorted.sort_by(|&a, &b| {
            let angle_a = direction_angle(vertices[v], vertices[edges[a].end]);
            let angle_b = direction_angle(vertices[v], vertices[edges[b].end]);
            angle_a.total_cmp(&angle_b)
        });

        // Incoming edge's next = CCW next outgoing edge
        for i in 0..sorted.len() {
            let twin = edges[sorted[i]].twin;
            edges[twin].next = Some(sorted[(i + 1) % sorted.len()]);
        }
    }
}

/// Extract faces by following half-edge chains
fn extract_faces(edges: &mut [HalfEdge]) -> Vec<Vec<usize>> {
    let mut faces = Vec::new();

    for start in 0..edges.len() {
        if edges[start].used || edges[start].deleted {
            continue;
        }

        let mut face = Vec::new();
        let mut current = start;
        for _ in 0..=edges.len() {
            if edges[current].used {
                break;
            }
            edges[current].used = true;
            face.push(current);

            match edges[current].next {
                Some(next) if next == start => {
                    faces.push(face);
                    break;
                }
                Some(next) => current = next,
                None => break,
            }
        }
    }

    faces
}

// =============================================================================
// Union
// =============================================================================

/// Whether `p` is filled by `polygon`: inside the exterior by winding rule
/// and outside every hole. Rings do not need to be simple.
fn polygon_fills(polygon: &StencilPolygon, p: Point2) -> bool {
    winding_number(p, &polygon.exterior) != 0
        && polygon.holes.iter().all(|hole| winding_number(p, hole) == 0)
}

/// Planar union of possibly overlapping, possibly non-simple polygons.
///
/// Every resulting ring is simple: exteriors CCW, holes CW. Fails with
/// `InvalidShape` when the traced boundary cannot be resolved into valid
/// rings.
pub fn union_polygons(polygons: &[StencilPolygon], tolerance: f64) -> CarveResult<StencilShape> {
    let segments: Vec<(Point2, Point2)> = polygons.iter().flat_map(|p| p.segments()).collect();
    let graph = node_segments(&segments, tolerance);
    let fills = |p: Point2| polygons.iter().any(|poly| polygon_fills(poly, p));

    // Keep edges with fill on exactly one side, oriented fill-on-left.
    let mut kept: Vec<(usize, usize)> = Vec::new();
    for &(a, b) in &graph.edges {
        let pa = graph.vertices[a];
        let pb = graph.vertices[b];
        let len = distance(pa, pb);
        if len <= tolerance {
            continue;
        }
        let delta = (len * SAMPLE_OFFSET).max(tolerance * 10.0);
        let n = perpendicular_ccw([(pb[0] - pa[0]) / len, (pb[1] - pa[1]) / len]);
        let mid = [(pa[0] + pb[0]) / 2.0, (pa[1] + pb[1]) / 2.0];
        let left = fills([mid[0] + n[0] * delta, mid[1] + n[1] * delta]);
        let right = fills([mid[0] - n[0] * delta, mid[1] - n[1] * delta]);
        match (left, right) {
            (true, false) => kept.push((a, b)),
            (false, true) => kept.push((b, a)),
            _ => {}
        }
    }

    let rings = trace_boundary(&graph.vertices, &kept)?;

    let mut exteriors: Vec<(Ring, f64)> = Vec::new();
    let mut holes: Vec<Ring> = Vec::new();
    for ring in rings {
        let ring = simplify_ring(&ring, tolerance);
        let area = polygon_signed_area(&ring);
        if area.abs() <= tolerance * tolerance {
            continue;
        }
        if area > 0.0 {
            exteriors.push((ring, area));
        } else {
            holes.push(ring);
        }
    }

    let mut polygons: Vec<StencilPolygon> = exteriors
        .iter()
        .map(|(ring, _)| StencilPolygon::new(ring.clone()))
        .collect();

    // Each hole belongs to the smallest exterior around it. Exteriors
    // nested inside the hole are smaller than the hole itself.
    for hole in holes {
        let hole_area = polygon_area(&hole);
        let probe = representative_point(&hole)
            .ok_or_else(|| CarveError::InvalidShape("hole has no interior point".into()))?;
        let parent = exteriors
            .iter()
            .enumerate()
            .filter(|(_, (ring, area))| *area > hole_area && point_in_polygon(probe, ring))
            .min_by(|(_, (_, a)), (_, (_, b))| a.total_cmp(b))
            .map(|(i, _)| i)
            .ok_or_else(|| CarveError::InvalidShape("hole outside every exterior".into()))?;
        polygons[parent].holes.push(hole);
    }

    for polygon in &polygons {
        if polygon.rings().any(|ring| !ring_is_simple(ring, tolerance)) {
            return Err(CarveError::InvalidShape("union produced a non-simple ring".into()));
        }
    }

    debug!(
        polygons = polygons.len(),
        vertices = graph.vertices.len(),
        boundary_edges = kept.len(),
        "planar union resolved"
    );

    Ok(StencilShape::new(polygons))
}

/// Trace closed rings through directed boundary edges.
///
/// At each vertex the walk leaves along the outgoing edge with the smallest
/// clockwise angle from the arrival direction, which keeps regions that only
/// touch at a pinch vertex in separate rings.
fn trace_boundary(vertices: &[Point2], kept: &[(usize, usize)]) -> CarveResult<Vec<Ring>> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];
    for (i, &(a, _)) in kept.iter().enumerate() {
        outgoing[a].push(i);
    }

    let next_edge = |current: usize| -> Option<usize> {
        let (u, v) = kept[current];
        let back = direction_angle(vertices[v], vertices[u]);
        outgoing[v].iter().copied().min_by(|&x, &y| {
            let cw = |e: usize| {
                let turn = (back - direction_angle(vertices[v], vertices[kept[e].1])).rem_euclid(TAU);
                if turn == 0.0 { TAU } else { turn }
            };
            cw(x).total_cmp(&cw(y))
        })
    };

    let mut used = vec![false; kept.len()];
    let mut rings = Vec::new();
    for start in 0..kept.len() {
        if used[start] {
            continue;
        }
        let mut ring: Ring = Vec::new();
        let mut current = start;
        loop {
            if used[current] || ring.len() > kept.len() {
                return Err(CarveError::InvalidShape("boundary does not close".into()));
            }
            used[current] = true;
            ring.push(vertices[kept[current].0]);
            match next_edge(current) {
                Some(next) if next == start => break,
                Some(next) => current = next,
                None => return Err(CarveError::InvalidShape("boundary dead end".into())),
            }
        }
        rings.push(ring);
    }
    Ok(rings)
}
