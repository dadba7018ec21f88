//! Mesh emission: validate a stencil solid and package it for the boolean
//! engine.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CarveConfig;
use crate::error::{CarveError, CarveResult};
use crate::geometry::{Point3, Vector3};
use crate::solid::{is_closed_surface, StencilSolid};

/// Stable identifier of an emitted stencil mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolidId(pub Uuid);

impl SolidId {
    /// Create a deterministic ID based on a string seed (e.g. "stencil_0").
    pub fn new_deterministic(seed: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()))
    }
}

impl fmt::Display for SolidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated stencil solid ready for hand-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StencilMesh {
    pub id: SolidId,
    pub vertices: Vec<Point3>,
    pub edges: Vec<(usize, usize)>,
    pub faces: Vec<Vec<usize>>,
}

impl StencilMesh {
    /// Fan-triangulated faces for engines that only accept triangles.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        self.faces
            .iter()
            .flat_map(|face| (1..face.len().saturating_sub(1)).map(move |i| [face[0], face[i], face[i + 1]]))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        is_closed_surface(&self.faces)
    }
}

/// Area of a polygon face from its Newell normal.
fn newell_area(vertices: &[Point3], face: &[usize]) -> f64 {
    let mut normal = Vector3::zeros();
    for i in 0..face.len() {
        let a = vertices[face[i]].coords;
        let b = vertices[face[(i + 1) % face.len()]].coords;
        normal += a.cross(&b);
    }
    normal.norm() / 2.0
}

fn validate(solid: &StencilSolid, epsilon: f64) -> CarveResult<()> {
    let n = solid.vertices.len();

    if let Some(i) = solid.vertices.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
        return Err(CarveError::InvalidGeometry(format!("vertex {} is not finite", i)));
    }

    for &(a, b) in &solid.edges {
        if a >= n || b >= n {
            return Err(CarveError::InvalidGeometry(format!("edge ({}, {}) is out of range", a, b)));
        }
        if (solid.vertices[a] - solid.vertices[b]).norm() <= epsilon {
            return Err(CarveError::InvalidGeometry(format!("edge ({}, {}) has zero length", a, b)));
        }
    }

    for (f, face) in solid.faces.iter().enumerate() {
        if face.len() < 3 {
            return Err(CarveError::InvalidGeometry(format!("face {} has fewer than 3 vertices", f)));
        }
        if let Some(&v) = face.iter().find(|&&v| v >= n) {
            return Err(CarveError::InvalidGeometry(format!("face {} references missing vertex {}", f, v)));
        }
        let distinct: HashSet<usize> = face.iter().copied().collect();
        if distinct.len() != face.len() {
            return Err(CarveError::InvalidGeometry(format!("face {} repeats a vertex", f)));
        }
        if newell_area(&solid.vertices, face) <= epsilon {
            return Err(CarveError::InvalidGeometry(format!("face {} is degenerate", f)));
        }
    }

    Ok(())
}

/// Validate `solid` and package it under a deterministic id derived from
/// `seed`.
pub fn emit_mesh(solid: StencilSolid, seed: &str, config: &CarveConfig) -> CarveResult<StencilMesh> {
    validate(&solid, config.degenerate_epsilon)?;

    if !solid.is_closed() {
        warn!(seed, faces = solid.faces.len(), "emitted stencil mesh is not closed");
    }

    let mesh = StencilMesh {
        id: SolidId::new_deterministic(seed),
        vertices: solid.vertices,
        edges: solid.edges,
        faces: solid.faces,
    };
    debug!(id = %mesh.id, vertices = mesh.vertices.len(), faces = mesh.faces.len(), "emitted stencil mesh");
    Ok(mesh)
}
