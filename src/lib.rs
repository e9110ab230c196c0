pub mod camera;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod pipeline;
pub mod render;
pub mod scene;
pub mod types;

pub use camera::{CameraEvent, CameraSnapshot, Direction, OrbitCamera, Viewport};
pub use config::{ExportConfig, PipelineConfig};
pub use error::{Result, ShapeError};
pub use geometry::{Disk, Geometry, Grid, Line, Shape, Torus, TrefoilKnot, UvSphere};
pub use pipeline::Pipeline;
pub use render::{CameraUniform, Renderable, ShaderHandle};
pub use scene::SceneDescription;
pub use types::IndexedMesh;
