use nalgebra as na;

pub type Point3 = na::Point3<f64>;
pub type Vector3 = na::Vector3<f64>;
pub type Matrix4 = na::Matrix4<f64>;

/// A point in the camera plane.
pub type Point2 = [f64; 2];

pub const EPSILON: f64 = 1e-6;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Point3 {
    fn approx_eq(&self, other: &Self) -> bool {
        na::distance_squared(self, other) < EPSILON * EPSILON
    }
}

impl ApproxEq for Point2 {
    fn approx_eq(&self, other: &Self) -> bool {
        utils_2d::distance_squared(*self, *other) < EPSILON * EPSILON
    }
}

pub mod utils_2d;
pub mod intersection;
pub use intersection::*;

pub mod vertex_pool;
pub use vertex_pool::VertexPool;

pub mod hull;
pub use hull::convex_hull;
