//! Optional merging of extracted shapes into a single stencil.

use tracing::debug;

use crate::error::CarveResult;
use crate::shape::{union_polygons, StencilShape};

/// Union every shape into one when `union` is set, otherwise pass the list
/// through unchanged. An empty union yields an empty list.
pub fn combine_shapes(shapes: Vec<StencilShape>, union: bool, tolerance: f64) -> CarveResult<Vec<StencilShape>> {
    if !union || shapes.is_empty() {
        return Ok(shapes);
    }

    let polygons: Vec<_> = shapes.into_iter().flat_map(|s| s.polygons).collect();
    let merged = union_polygons(&polygons, tolerance)?;
    debug!(
        inputs = polygons.len(),
        outputs = merged.polygons.len(),
        "combined stencil shapes"
    );

    if merged.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![merged])
    }
}
