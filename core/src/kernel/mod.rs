//! Host abstraction layer for applying stencils.
//!
//! This module provides a trait-based abstraction over the scene host and
//! its boolean mesh engine, so the carve driver never depends on a specific
//! application. Host objects created during a carve are owned by an
//! [`ObjectScope`], which releases them on every exit path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::emit::StencilMesh;
use crate::error::CarveResult;
use crate::extract::SourceCarver;

/// Boolean operation requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanOp {
    /// Target minus stencil (A - B).
    Difference,
    /// Target intersected with stencil (A ∩ B).
    Intersection,
    /// Target joined with stencil (A ∪ B).
    Union,
}

/// Abstract interface for the application hosting the target mesh.
///
/// Adapters report their own failures as `CarveError::Host`.
pub trait CarveHost {
    /// Host-side handle of a linked stencil mesh.
    type Object;

    /// The host's mesh representation for carve targets.
    type Mesh: Clone;

    /// Make a stencil mesh available to the boolean engine.
    fn link_stencil(&mut self, mesh: &StencilMesh) -> CarveResult<Self::Object>;

    /// Remove a linked object from the host.
    fn release(&mut self, object: Self::Object);

    /// Apply `op` with `stencil` to a copy of `target`.
    fn apply_boolean(
        &mut self,
        target: &Self::Mesh,
        stencil: &Self::Object,
        op: BooleanOp,
        overlap_threshold: f64,
    ) -> CarveResult<Self::Mesh>;

    /// Whether a boolean result has no geometry left.
    fn is_empty(&self, mesh: &Self::Mesh) -> bool;

    /// Remove the carvers a batch was built from.
    fn delete_sources(&mut self, sources: &[SourceCarver]) -> CarveResult<()>;
}

/// Owns every host object linked during one carve and releases them when
/// dropped, whether the carve succeeded or not.
pub struct ObjectScope<'h, H: CarveHost> {
    host: &'h mut H,
    objects: Vec<H::Object>,
}

impl<'h, H: CarveHost> ObjectScope<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        Self {
            host,
            objects: Vec::new(),
        }
    }

    /// Link a stencil and return its slot in this scope.
    pub fn link(&mut self, mesh: &StencilMesh) -> CarveResult<usize> {
        let object = self.host.link_stencil(mesh)?;
        self.objects.push(object);
        Ok(self.objects.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Apply `op` between `target` and the object in `slot`.
    pub fn apply(
        &mut self,
        target: &H::Mesh,
        slot: usize,
        op: BooleanOp,
        overlap_threshold: f64,
    ) -> CarveResult<H::Mesh> {
        self.host.apply_boolean(target, &self.objects[slot], op, overlap_threshold)
    }

    pub fn host(&self) -> &H {
        self.host
    }
}

impl<'h, H: CarveHost> Drop for ObjectScope<'h, H> {
    fn drop(&mut self) {
        let count = self.objects.len();
        for object in self.objects.drain(..) {
            self.host.release(object);
        }
        if count > 0 {
            debug!(released = count, "released linked stencil objects");
        }
    }
}
