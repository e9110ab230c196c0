//! Procedural mesh generators.
//!
//! Every shape is an immutable parameter record implementing [`Geometry`];
//! [`Shape`] closes the set so scenes can name any of them.

pub mod disk;
pub mod helpers;
pub mod sphere;
pub mod topology;
pub mod torus;
pub mod trefoil;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::IndexedMesh;

pub use disk::Disk;
pub use helpers::{Grid, Line};
pub use sphere::UvSphere;
pub use topology::Winding;
pub use torus::Torus;
pub use trefoil::TrefoilKnot;

/// Capability shared by all shape generators: parameters in, buffers out.
pub trait Geometry {
    /// Short lowercase name used in logs and manifests.
    fn kind(&self) -> &'static str;

    /// Check construction parameters without generating anything.
    fn check(&self) -> Result<()>;

    /// Build the vertex and index buffers. Fails on invalid parameters.
    fn generate(&self) -> Result<IndexedMesh>;
}

/// The closed set of shapes a scene can contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Disk(Disk),
    UvSphere(UvSphere),
    Torus(Torus),
    TrefoilKnot(TrefoilKnot),
    Line(Line),
    Grid(Grid),
}

impl Shape {
    fn as_geometry(&self) -> &dyn Geometry {
        match self {
            Shape::Disk(g) => g,
            Shape::UvSphere(g) => g,
            Shape::Torus(g) => g,
            Shape::TrefoilKnot(g) => g,
            Shape::Line(g) => g,
            Shape::Grid(g) => g,
        }
    }

    /// Line helpers are drawn as segments rather than shaded surfaces.
    pub fn is_helper(&self) -> bool {
        matches!(self, Shape::Line(_) | Shape::Grid(_))
    }
}

impl Geometry for Shape {
    fn kind(&self) -> &'static str {
        self.as_geometry().kind()
    }

    fn check(&self) -> Result<()> {
        self.as_geometry().check()
    }

    fn generate(&self) -> Result<IndexedMesh> {
        self.as_geometry().generate()
    }
}
