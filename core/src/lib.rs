pub mod geometry;
pub mod config;
pub mod error;
pub mod camera;
pub mod shape;
pub mod extract;
pub mod combine;
pub mod triangulate;
pub mod solid;
pub mod emit;
pub mod kernel;
pub mod pipeline;

pub use camera::{CameraFrame, ProjectionMode};
pub use config::{CarveConfig, MeshOutline, PathClosing};
pub use emit::{emit_mesh, SolidId, StencilMesh};
pub use error::{CarveError, CarveResult};
pub use extract::{extract_shape, Carver, FacetedMesh, Path, SourceCarver};
pub use kernel::{BooleanOp, CarveHost, ObjectScope};
pub use pipeline::{build_stencils, carve, CarveFlags, CarveRequest};
pub use shape::{StencilPolygon, StencilShape};
pub use solid::{extrude_shape, StencilSolid};
pub use triangulate::{triangulate_shape, TriangulatedShape};
