//! Tunable tolerances and policies for the carve pipeline.

use serde::{Deserialize, Serialize};

/// How open paths are turned into fillable outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathClosing {
    /// Close open paths that do not cross themselves.
    #[default]
    AutoClose,
    /// Keep open paths open; only self-crossing loops enclose area.
    ExplicitOnly,
    /// Use the convex hull of the projected path points.
    ConvexHull,
}

/// How faced meshes are outlined in the camera plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeshOutline {
    /// Union of every projected face.
    #[default]
    Faces,
    /// Convex hull of every projected vertex.
    ConvexHull,
}

/// Configuration threaded through every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarveConfig {
    /// Squared endpoint distance below which an open path is closed.
    pub epsilon_close: f64,
    /// Perspective points need camera-space depth below `-epsilon_behind_camera`.
    pub epsilon_behind_camera: f64,
    /// Passed through to the boolean engine.
    pub boolean_overlap_threshold: f64,
    /// Camera-plane distance under which vertices are merged.
    pub merge_tolerance: f64,
    /// Edge length and face area below which an emitted mesh is rejected.
    pub degenerate_epsilon: f64,
    /// Added to the eye to target distance when fitting `far_dist`.
    pub far_dist_padding: f64,
    pub path_closing: PathClosing,
    pub mesh_outline: MeshOutline,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            epsilon_close: 1e-9,
            epsilon_behind_camera: 0.0,
            boolean_overlap_threshold: 1e-6,
            merge_tolerance: 1e-9,
            degenerate_epsilon: 1e-12,
            far_dist_padding: 0.1,
            path_closing: PathClosing::default(),
            mesh_outline: MeshOutline::default(),
        }
    }
}

impl CarveConfig {
    pub fn with_epsilon_close(mut self, epsilon: f64) -> Self {
        self.epsilon_close = epsilon;
        self
    }

    pub fn with_epsilon_behind_camera(mut self, epsilon: f64) -> Self {
        self.epsilon_behind_camera = epsilon;
        self
    }

    pub fn with_boolean_overlap_threshold(mut self, threshold: f64) -> Self {
        self.boolean_overlap_threshold = threshold;
        self
    }

    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    pub fn with_degenerate_epsilon(mut self, epsilon: f64) -> Self {
        self.degenerate_epsilon = epsilon;
        self
    }

    pub fn with_far_dist_padding(mut self, padding: f64) -> Self {
        self.far_dist_padding = padding;
        self
    }

    pub fn with_path_closing(mut self, policy: PathClosing) -> Self {
        self.path_closing = policy;
        self
    }

    pub fn with_mesh_outline(mut self, policy: MeshOutline) -> Self {
        self.mesh_outline = policy;
        self
    }
}
