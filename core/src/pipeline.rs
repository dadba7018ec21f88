//! Carve driver: runs every carver through the stencil pipeline and applies
//! the resulting solids to a target through a [`CarveHost`].
//!
//! Stage order per batch:
//! extract -> combine -> triangulate -> extrude -> emit -> boolean.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::camera::CameraFrame;
use crate::combine::combine_shapes;
use crate::config::CarveConfig;
use crate::emit::{emit_mesh, StencilMesh};
use crate::error::{CarveError, CarveResult};
use crate::extract::SourceCarver;
use crate::geometry::Point3;
use crate::kernel::{BooleanOp, CarveHost, ObjectScope};
use crate::shape::StencilShape;
use crate::solid::extrude_shape;
use crate::triangulate::triangulate_shape;

/// Per-request switches chosen by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarveFlags {
    /// Union all carver shapes into one stencil before extrusion.
    pub union_stencils: bool,
    /// Remove the source carvers after a successful carve.
    pub delete_sources: bool,
    /// Only subtract; do not keep the intersected pieces.
    pub subtract_only: bool,
}

/// One carve batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarveRequest {
    pub carvers: Vec<SourceCarver>,
    pub camera: CameraFrame,
    #[serde(default)]
    pub flags: CarveFlags,
}

impl CarveRequest {
    pub fn new(carvers: Vec<SourceCarver>, camera: CameraFrame) -> Self {
        Self {
            carvers,
            camera,
            flags: CarveFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: CarveFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Fit the camera's far distance so stencils cut all the way through a
    /// target with world-space bounds `[min, max]`.
    pub fn fit_to_target(mut self, min: &Point3, max: &Point3, config: &CarveConfig) -> CarveResult<Self> {
        self.camera = self.camera.fitted_to_bounds(min, max, config.far_dist_padding)?;
        debug!(far_dist = self.camera.far_dist, "fitted projection distance to target");
        Ok(self)
    }
}

fn log_skip(stage: &str, index: usize, err: &CarveError) {
    match err {
        CarveError::InvalidShape(_) => warn!(stage, index, error = %err, "skipping invalid shape"),
        _ => debug!(stage, index, error = %err, "skipping"),
    }
}

/// Build one validated stencil mesh per resulting shape.
///
/// Local failures skip the affected carver or shape. `BehindCamera`,
/// `InvalidCamera` and `InvalidGeometry` abort the whole batch.
pub fn build_stencils(
    carvers: &[SourceCarver],
    camera: &CameraFrame,
    flags: CarveFlags,
    config: &CarveConfig,
) -> CarveResult<Vec<StencilMesh>> {
    camera.validate()?;
    let from_cam = camera.inverse_view()?;
    let tol = config.merge_tolerance;

    let mut shapes: Vec<StencilShape> = Vec::with_capacity(carvers.len());
    for (index, carver) in carvers.iter().enumerate() {
        match carver.extract(camera, config) {
            Ok(shape) => {
                debug!(carver = index, polygons = shape.polygons.len(), area = shape.area(), "extracted shape");
                shapes.push(shape);
            }
            Err(err) if err.is_skippable() => log_skip("extract", index, &err),
            Err(err) => return Err(err),
        }
    }

    let extracted = shapes.len();
    let shapes = if flags.union_stencils {
        match combine_shapes(shapes.clone(), true, tol) {
            Ok(combined) => combined,
            Err(err) => {
                warn!(error = %err, "stencil union failed, keeping separate shapes");
                shapes
            }
        }
    } else {
        shapes
    };

    let mut meshes = Vec::with_capacity(shapes.len());
    for (index, shape) in shapes.iter().enumerate() {
        let solid = match triangulate_shape(shape, tol)
            .and_then(|t| extrude_shape(&t, &from_cam, camera.mode, camera.far_dist))
        {
            Ok(solid) => solid,
            Err(err) if err.is_skippable() => {
                log_skip("extrude", index, &err);
                continue;
            }
            Err(err) => return Err(err),
        };
        let seed = format!("stencil_{}", meshes.len());
        meshes.push(emit_mesh(solid, &seed, config)?);
    }

    info!(
        carvers = carvers.len(),
        extracted,
        stencils = meshes.len(),
        "built stencil solids"
    );
    Ok(meshes)
}

/// Carve `target` with every carver of `request`.
///
/// Each stencil splits every current piece into the part outside it
/// (`Difference`) and, unless `subtract_only`, the part inside it
/// (`Intersection`). Empty pieces are dropped. Linked stencils are released
/// before returning, on success or failure; sources are deleted only after
/// the boolean pass succeeded.
pub fn carve<H: CarveHost>(
    host: &mut H,
    target: H::Mesh,
    request: &CarveRequest,
    config: &CarveConfig,
) -> CarveResult<Vec<H::Mesh>> {
    let stencils = build_stencils(&request.carvers, &request.camera, request.flags, config)?;
    let threshold = config.boolean_overlap_threshold;

    let pieces = {
        let mut scope = ObjectScope::new(host);
        let mut slots = Vec::with_capacity(stencils.len());
        for stencil in &stencils {
            slots.push(scope.link(stencil)?);
        }

        let mut pieces = vec![target];
        for (stencil, &slot) in stencils.iter().zip(&slots) {
            let mut split = Vec::with_capacity(pieces.len() * 2);
            for piece in &pieces {
                let outside = scope.apply(piece, slot, BooleanOp::Difference, threshold)?;
                split.push(outside);
                if !request.flags.subtract_only {
                    let inside = scope.apply(piece, slot, BooleanOp::Intersection, threshold)?;
                    split.push(inside);
                }
            }
            debug!(stencil = %stencil.id, pieces = split.len(), "applied stencil");
            pieces = split;
        }

        let host = scope.host();
        let before = pieces.len();
        pieces.retain(|p| !host.is_empty(p));
        if pieces.len() < before {
            debug!(removed = before - pieces.len(), "dropped empty pieces");
        }
        pieces
    };

    if request.flags.delete_sources {
        host.delete_sources(&request.carvers)?;
    }

    info!(stencils = stencils.len(), pieces = pieces.len(), "carve finished");
    Ok(pieces)
}
