pub mod bounds;
pub mod mesh;

pub use bounds::BoundingBox;
pub use mesh::{IndexedMesh, Topology, VertexLayout};
