//! Solid extrusion: lift a triangulated camera-plane shape into a closed 3D
//! stencil solid.
//!
//! Orthographic cameras produce a prism between the near and far caps;
//! perspective cameras produce a cone from the eye through the cross-section
//! at the far distance. Silhouette edges (edges of exactly one triangle) are
//! bridged by side faces so the solid is watertight.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::{unproject_point, ProjectionMode};
use crate::error::{CarveError, CarveResult};
use crate::geometry::{Matrix4, Point3};
use crate::triangulate::TriangulatedShape;

pub mod orient;

pub use orient::{make_normals_consistent, signed_volume};
use orient::face_edges;

/// Closed 3D mesh in world space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StencilSolid {
    pub vertices: Vec<Point3>,
    /// Undirected edges `(a, b)` with `a < b`, in first-use order.
    pub edges: Vec<(usize, usize)>,
    pub faces: Vec<Vec<usize>>,
}

impl StencilSolid {
    /// Build a solid from faces, deriving the edge list.
    pub fn from_faces(vertices: Vec<Point3>, faces: Vec<Vec<usize>>) -> Self {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for face in &faces {
            for (a, b) in face_edges(face) {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    edges.push(key);
                }
            }
        }
        Self { vertices, edges, faces }
    }

    pub fn edge_face_counts(&self) -> HashMap<(usize, usize), usize> {
        edge_face_counts(&self.faces)
    }

    pub fn is_closed(&self) -> bool {
        is_closed_surface(&self.faces)
    }

    pub fn signed_volume(&self) -> f64 {
        signed_volume(&self.vertices, &self.faces)
    }
}

/// Number of faces adjacent to each undirected edge.
pub fn edge_face_counts(faces: &[Vec<usize>]) -> HashMap<(usize, usize), usize> {
    let mut counts = HashMap::new();
    for face in faces {
        for (a, b) in face_edges(face) {
            *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }
    counts
}

/// Every edge is shared by exactly two faces.
pub fn is_closed_surface(faces: &[Vec<usize>]) -> bool {
    !faces.is_empty() && edge_face_counts(faces).values().all(|&c| c == 2)
}

/// Lift `shape` into a closed solid.
///
/// `from_cam` is the camera to world transform; `far_dist` places the far
/// cap (and, under orthographic projection, the near cap at `+far_dist`).
pub fn extrude_shape(
    shape: &TriangulatedShape,
    from_cam: &Matrix4,
    mode: ProjectionMode,
    far_dist: f64,
) -> CarveResult<StencilSolid> {
    if shape.is_empty() {
        return Err(CarveError::NoGeometry("triangulation is empty".into()));
    }

    let split = shape.split_pinch_vertices();
    let pinch_copies = split.vertices.len() - shape.vertices.len();
    let shape = &split;

    let n = shape.vertices.len();
    let silhouette = shape.boundary_edges();

    let mut vertices: Vec<Point3> = shape
        .vertices
        .iter()
        .map(|&p| unproject_point(from_cam, mode, far_dist, p, true))
        .collect();
    let mut faces: Vec<Vec<usize>> = Vec::with_capacity(shape.triangles.len() * 2 + silhouette.len());

    match mode {
        ProjectionMode::Orthographic => {
            vertices.extend(
                shape
                    .vertices
                    .iter()
                    .map(|&p| unproject_point(from_cam, mode, far_dist, p, false)),
            );
            faces.extend(shape.triangles.iter().map(|t| t.to_vec()));
            faces.extend(shape.triangles.iter().map(|&[i, j, k]| vec![k + n, j + n, i + n]));
            faces.extend(silhouette.iter().map(|&(a, b)| vec![b, a, a + n, b + n]));
        }
        ProjectionMode::Perspective => {
            vertices.push(from_cam.transform_point(&Point3::origin()));
            let apex = n;
            faces.extend(shape.triangles.iter().map(|&[i, j, k]| vec![k, j, i]));
            faces.extend(silhouette.iter().map(|&(a, b)| vec![a, b, apex]));
        }
    }

    let flipped = make_normals_consistent(&vertices, &mut faces);
    let solid = StencilSolid::from_faces(vertices, faces);

    debug!(
        vertices = solid.vertices.len(),
        faces = solid.faces.len(),
        silhouette_edges = silhouette.len(),
        pinch_copies,
        flipped,
        "extruded stencil solid"
    );

    Ok(solid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector3;

    fn unit_square() -> TriangulatedShape {
        TriangulatedShape {
            vertices: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    #[test]
    fn test_orthographic_prism() {
        let solid = extrude_shape(&unit_square(), &Matrix4::identity(), ProjectionMode::Orthographic, 10.0).unwrap();
        assert_eq!(solid.vertices.len(), 8);
        assert_eq!(solid.faces.len(), 8);
        assert!(solid.is_closed());
        assert!((solid.signed_volume() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_perspective_cone() {
        let solid = extrude_shape(&unit_square(), &Matrix4::identity(), ProjectionMode::Perspective, 2.0).unwrap();
        assert_eq!(solid.vertices.len(), 5);
        assert_eq!(solid.faces.len(), 6);
        assert!(solid.is_closed());
        // Pyramid with a 2x2 base at depth 2
        assert!((solid.signed_volume() - 8.0 / 3.0).abs() < 1e-9);
        assert_eq!(solid.vertices[4], Point3::origin());
    }

    #[test]
    fn test_pinched_triangles_stay_closed() {
        // Two triangles touching at vertex 2.
        let shape = TriangulatedShape {
            vertices: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [2.0, 1.0], [2.0, 2.0]],
            triangles: vec![[0, 1, 2], [2, 3, 4]],
        };

        let prism = extrude_shape(&shape, &Matrix4::identity(), ProjectionMode::Orthographic, 5.0).unwrap();
        assert_eq!(prism.vertices.len(), 12);
        assert_eq!(prism.faces.len(), 10);
        assert!(prism.is_closed());
        assert!(prism.edge_face_counts().values().all(|&c| c == 2));
        assert!((prism.signed_volume() - 10.0).abs() < 1e-9);

        let cone = extrude_shape(&shape, &Matrix4::identity(), ProjectionMode::Perspective, 3.0).unwrap();
        assert_eq!(cone.vertices.len(), 7);
        assert_eq!(cone.faces.len(), 8);
        assert!(cone.is_closed());
        assert!(cone.signed_volume() > 0.0);
    }

    #[test]
    fn test_mirrored_camera_still_outward() {
        let from_cam = Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0));
        let solid = extrude_shape(&unit_square(), &from_cam, ProjectionMode::Orthographic, 1.0).unwrap();
        assert!(solid.signed_volume() > 0.0);
    }

    #[test]
    fn test_empty_triangulation_is_rejected() {
        let err = extrude_shape(
            &TriangulatedShape::default(),
            &Matrix4::identity(),
            ProjectionMode::Orthographic,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, CarveError::NoGeometry(_)));
    }
}
