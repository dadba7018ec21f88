//! Camera frame and camera-plane projection.
//!
//! Camera space follows the usual view convention: the eye sits at the
//! origin looking down `-Z`, so visible points have negative depth.

use serde::{Deserialize, Serialize};

use crate::error::{CarveError, CarveResult};
use crate::geometry::{Matrix4, Point2, Point3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

/// View parameters shared by every carver of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    /// World to camera transform.
    pub view_matrix: Matrix4,
    pub mode: ProjectionMode,
    /// Depth of the far stencil cap, in camera units.
    pub far_dist: f64,
}

impl CameraFrame {
    pub fn new(view_matrix: Matrix4, mode: ProjectionMode, far_dist: f64) -> CarveResult<Self> {
        let frame = Self { view_matrix, mode, far_dist };
        frame.validate()?;
        Ok(frame)
    }

    /// Orthographic camera at the world origin looking down `-Z`.
    pub fn orthographic(far_dist: f64) -> CarveResult<Self> {
        Self::new(Matrix4::identity(), ProjectionMode::Orthographic, far_dist)
    }

    /// Perspective camera at the world origin looking down `-Z`.
    pub fn perspective(far_dist: f64) -> CarveResult<Self> {
        Self::new(Matrix4::identity(), ProjectionMode::Perspective, far_dist)
    }

    pub fn validate(&self) -> CarveResult<()> {
        if !(self.far_dist > 0.0) || !self.far_dist.is_finite() {
            return Err(CarveError::InvalidCamera(format!(
                "far distance must be positive, got {}",
                self.far_dist
            )));
        }
        self.inverse_view().map(|_| ())
    }

    /// Camera to world transform.
    pub fn inverse_view(&self) -> CarveResult<Matrix4> {
        self.view_matrix
            .try_inverse()
            .ok_or_else(|| CarveError::InvalidCamera("view matrix is not invertible".into()))
    }

    /// Model to camera transform for a carver with the given model matrix.
    pub fn to_camera(&self, model_matrix: &Matrix4) -> Matrix4 {
        self.view_matrix * model_matrix
    }

    /// World-space position of the eye.
    pub fn eye(&self) -> CarveResult<Point3> {
        Ok(self.inverse_view()?.transform_point(&Point3::origin()))
    }

    /// Far distance that carries a stencil through the axis-aligned box
    /// `[min, max]`: the largest eye to corner distance plus `padding`.
    pub fn far_dist_through_bounds(&self, min: &Point3, max: &Point3, padding: f64) -> CarveResult<f64> {
        let eye = self.eye()?;
        let farthest = bounding_box_corners(min, max)
            .iter()
            .map(|corner| (corner - eye).norm_squared())
            .fold(0.0, f64::max)
            .sqrt();
        let far_dist = farthest + padding;
        if !(far_dist > 0.0) || !far_dist.is_finite() {
            return Err(CarveError::InvalidCamera(format!(
                "bounds give no usable far distance ({})",
                far_dist
            )));
        }
        Ok(far_dist)
    }

    /// This frame with `far_dist` fitted to the box `[min, max]`.
    pub fn fitted_to_bounds(mut self, min: &Point3, max: &Point3, padding: f64) -> CarveResult<Self> {
        self.far_dist = self.far_dist_through_bounds(min, max, padding)?;
        Ok(self)
    }
}

fn bounding_box_corners(min: &Point3, max: &Point3) -> [Point3; 8] {
    let pick = |i: usize, axis: usize| if i & (1 << axis) == 0 { min[axis] } else { max[axis] };
    std::array::from_fn(|i| Point3::new(pick(i, 0), pick(i, 1), pick(i, 2)))
}

/// Project a model-space point into the camera plane.
///
/// Perspective projection divides by depth and rejects points whose
/// camera-space `z` is not below `-epsilon_behind_camera`.
pub fn project_point(
    to_cam: &Matrix4,
    mode: ProjectionMode,
    p: &Point3,
    epsilon_behind_camera: f64,
) -> CarveResult<Point2> {
    let c = to_cam.transform_point(p);
    match mode {
        ProjectionMode::Orthographic => Ok([c.x, c.y]),
        ProjectionMode::Perspective => {
            if c.z >= -epsilon_behind_camera {
                return Err(CarveError::BehindCamera { depth: c.z });
            }
            let depth = -c.z;
            Ok([c.x / depth, c.y / depth])
        }
    }
}

/// Lift a camera-plane point back into world space.
///
/// Orthographic points land on the near (`+far_dist`) or far (`-far_dist`)
/// cap. Perspective points land on the view ray at depth `far_dist`; `near`
/// is ignored since the other end of the cone is the eye.
pub fn unproject_point(
    from_cam: &Matrix4,
    mode: ProjectionMode,
    far_dist: f64,
    p: Point2,
    near: bool,
) -> Point3 {
    let c = match mode {
        ProjectionMode::Orthographic => {
            let z = if near { far_dist } else { -far_dist };
            Point3::new(p[0], p[1], z)
        }
        ProjectionMode::Perspective => Point3::new(p[0] * far_dist, p[1] * far_dist, -far_dist),
    };
    from_cam.transform_point(&c)
}
