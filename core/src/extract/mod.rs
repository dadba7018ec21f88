//! Shape extraction: project one carver into the camera plane and resolve it
//! into a valid polygon-with-holes shape.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::{project_point, CameraFrame, ProjectionMode};
use crate::config::{CarveConfig, MeshOutline, PathClosing};
use crate::error::{CarveError, CarveResult};
use crate::geometry::utils_2d::{
    polygon_area, polygon_signed_area, polyline_is_simple, ring_is_simple, simplify_ring,
};
use crate::geometry::{convex_hull, Matrix4, Point2, Point3};
use crate::shape::{node_segments, polygonize, union_polygons, StencilPolygon, StencilShape};

pub mod chains;

pub use chains::{trace_chains, VertexChain};

/// An ordered point sequence from a carver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point3>,
    #[serde(default)]
    pub closed: bool,
}

impl Path {
    pub fn open(points: Vec<Point3>) -> Self {
        Self { points, closed: false }
    }

    pub fn closed(points: Vec<Point3>) -> Self {
        Self { points, closed: true }
    }
}

/// Polygon mesh in model space. Faces are vertex index loops; `edges` is
/// only consulted when there are no faces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetedMesh {
    pub vertices: Vec<Point3>,
    #[serde(default)]
    pub faces: Vec<Vec<usize>>,
    #[serde(default)]
    pub edges: Vec<(usize, usize)>,
}

/// Source geometry of one carver, already discretized by the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Carver {
    FacetedMesh(FacetedMesh),
    PathSet(Vec<Path>),
}

/// A carver together with its model to world transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCarver {
    pub geometry: Carver,
    pub model_matrix: Matrix4,
}

impl SourceCarver {
    pub fn new(geometry: Carver) -> Self {
        Self {
            geometry,
            model_matrix: Matrix4::identity(),
        }
    }

    pub fn with_model_matrix(mut self, model_matrix: Matrix4) -> Self {
        self.model_matrix = model_matrix;
        self
    }

    /// Extract this carver's shape as seen through `camera`.
    pub fn extract(&self, camera: &CameraFrame, config: &CarveConfig) -> CarveResult<StencilShape> {
        extract_shape(&self.geometry, &camera.to_camera(&self.model_matrix), camera.mode, config)
    }
}

/// Project a carver into the camera plane and resolve its outline.
///
/// `BehindCamera` must abort the batch; `NoGeometry` and `NotPathShaped`
/// only skip this carver.
pub fn extract_shape(
    carver: &Carver,
    to_cam: &Matrix4,
    mode: ProjectionMode,
    config: &CarveConfig,
) -> CarveResult<StencilShape> {
    match carver {
        Carver::FacetedMesh(mesh) if !mesh.faces.is_empty() => faced_mesh_shape(mesh, to_cam, mode, config),
        Carver::FacetedMesh(mesh) => {
            let paths = mesh_paths(mesh)?;
            paths_shape(&paths, to_cam, mode, config)
        }
        Carver::PathSet(paths) => paths_shape(paths, to_cam, mode, config),
    }
}

fn project_all(
    points: &[Point3],
    to_cam: &Matrix4,
    mode: ProjectionMode,
    config: &CarveConfig,
) -> CarveResult<Vec<Point2>> {
    points
        .iter()
        .map(|p| project_point(to_cam, mode, p, config.epsilon_behind_camera))
        .collect()
}

fn hull_shape(points: &[Point2], tolerance: f64) -> CarveResult<StencilShape> {
    let hull = convex_hull(points, tolerance);
    if hull.len() < 3 || polygon_area(&hull) <= tolerance * tolerance {
        return Err(CarveError::NoGeometry("convex hull is degenerate".into()));
    }
    Ok(StencilShape::new(vec![StencilPolygon::new(hull)]))
}

fn faced_mesh_shape(
    mesh: &FacetedMesh,
    to_cam: &Matrix4,
    mode: ProjectionMode,
    config: &CarveConfig,
) -> CarveResult<StencilShape> {
    let tol = config.merge_tolerance;

    // Loose vertices are never projected.
    let mut projected: Vec<Option<Point2>> = vec![None; mesh.vertices.len()];
    let mut loops: Vec<Vec<Point2>> = Vec::with_capacity(mesh.faces.len());
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        let mut ring = Vec::with_capacity(face.len());
        for &vi in face {
            let slot = projected.get_mut(vi).ok_or_else(|| {
                CarveError::NoGeometry(format!("face {} references missing vertex {}", face_idx, vi))
            })?;
            let p = match *slot {
                Some(p) => p,
                None => {
                    let p = project_point(to_cam, mode, &mesh.vertices[vi], config.epsilon_behind_camera)?;
                    *slot = Some(p);
                    p
                }
            };
            ring.push(p);
        }
        loops.push(ring);
    }

    if config.mesh_outline == MeshOutline::ConvexHull {
        let points: Vec<Point2> = projected.into_iter().flatten().collect();
        return hull_shape(&points, tol);
    }

    let mut polygons = Vec::with_capacity(loops.len());
    for ring in loops {
        // Edge-on and non-planar faces project to invalid polygons.
        let mut ring = simplify_ring(&ring, tol);
        if !ring_is_simple(&ring, tol) {
            continue;
        }
        if polygon_signed_area(&ring) < 0.0 {
            ring.reverse();
        }
        polygons.push(StencilPolygon::new(ring));
    }

    debug!(
        faces = mesh.faces.len(),
        valid_faces = polygons.len(),
        "projected faced carver"
    );

    if polygons.is_empty() {
        return Err(CarveError::NoGeometry("no face projects to a valid polygon".into()));
    }

    let shape = union_polygons(&polygons, tol)?;
    if shape.is_empty() {
        return Err(CarveError::NoGeometry("face union is empty".into()));
    }
    Ok(shape)
}

/// Recover paths from an edge-only mesh.
fn mesh_paths(mesh: &FacetedMesh) -> CarveResult<Vec<Path>> {
    if mesh.vertices.is_empty() {
        return Err(CarveError::NoGeometry("carver mesh has no vertices".into()));
    }

    let chains = trace_chains(mesh.vertices.len(), &mesh.edges)?;
    debug!(chains = chains.len(), "recovered edge chains");

    Ok(chains
        .into_iter()
        .map(|chain| Path {
            points: chain.vertices.iter().map(|&v| mesh.vertices[v]).collect(),
            closed: chain.closed,
        })
        .collect())
}

/// Close a path whose endpoints (nearly) coincide.
///
/// Returns the points without a repeated closing point and whether the path
/// is closed.
fn close_path(path: &Path, epsilon_close: f64) -> (&[Point3], bool) {
    let points = &path.points[..];
    match points {
        [first, .., last] if (last - first).norm_squared() < epsilon_close => {
            (&points[..points.len() - 1], true)
        }
        _ => (points, path.closed),
    }
}

fn paths_shape(
    paths: &[Path],
    to_cam: &Matrix4,
    mode: ProjectionMode,
    config: &CarveConfig,
) -> CarveResult<StencilShape> {
    let tol = config.merge_tolerance;
    let mut polygons = Vec::new();
    let mut hull_points = Vec::new();

    for path in paths {
        let (points, closed) = close_path(path, config.epsilon_close);
        let projected = project_all(points, to_cam, mode, config)?;

        if config.path_closing == PathClosing::ConvexHull {
            hull_points.extend(projected);
        } else {
            polygons.extend(path_polygons(&projected, closed, config.path_closing, tol));
        }
    }

    if config.path_closing == PathClosing::ConvexHull {
        return hull_shape(&hull_points, tol);
    }

    debug!(paths = paths.len(), polygons = polygons.len(), "projected path carver");

    if polygons.is_empty() {
        return Err(CarveError::NoGeometry("paths enclose no area".into()));
    }

    let shape = union_polygons(&polygons, tol)?;
    if shape.is_empty() {
        return Err(CarveError::NoGeometry("path union is empty".into()));
    }
    Ok(shape)
}

/// Polygons enclosed by one projected path.
///
/// A closed simple ring is used directly; anything else is noded against
/// itself and every bounded region becomes a polygon.
fn path_polygons(points: &[Point2], closed: bool, policy: PathClosing, tolerance: f64) -> Vec<StencilPolygon> {
    if points.len() < 3 {
        return Vec::new();
    }

    let treat_closed =
        closed || (policy == PathClosing::AutoClose && polyline_is_simple(points, tolerance));

    if treat_closed {
        let mut ring = simplify_ring(points, tolerance);
        if ring_is_simple(&ring, tolerance) {
            if polygon_signed_area(&ring) < 0.0 {
                ring.reverse();
            }
            return vec![StencilPolygon::new(ring)];
        }
    }

    let mut segments: Vec<(Point2, Point2)> = points.windows(2).map(|w| (w[0], w[1])).collect();
    if treat_closed {
        segments.push((points[points.len() - 1], points[0]));
    }

    polygonize(&node_segments(&segments, tolerance), tolerance)
        .into_iter()
        .map(StencilPolygon::new)
        .collect()
}
