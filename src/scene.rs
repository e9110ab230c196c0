//! Scene descriptions: named shapes plus a scripted camera.

use std::collections::HashSet;
use std::path::Path;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::camera::{CameraEvent, OrbitCamera, Viewport};
use crate::error::{Result, ShapeError};
use crate::geometry::{Disk, Geometry, Grid, Line, Shape, Torus, TrefoilKnot, UvSphere};
use crate::render::{Renderable, ShaderHandle};

/// Eye offset used when a scene does not specify one.
pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 0.0, -6.0);

fn default_eye() -> Vec3 {
    DEFAULT_EYE
}

/// Initial eye offset and the input events replayed on top of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraScript {
    #[serde(default = "default_eye")]
    pub position: Vec3,
    #[serde(default)]
    pub events: Vec<CameraEvent>,
}

impl Default for CameraScript {
    fn default() -> Self {
        Self {
            position: DEFAULT_EYE,
            events: Vec::new(),
        }
    }
}

/// Model rotation applied to an object after generation, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRotation {
    pub axis: Vec3,
    pub angle: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub shape: Shape,
    #[serde(default)]
    pub color: Option<Vec4>,
    #[serde(default)]
    pub line_width: Option<f32>,
    #[serde(default)]
    pub rotation: Option<ModelRotation>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            color: None,
            line_width: None,
            rotation: None,
        }
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = Some(width);
        self
    }

    /// Generate and validate the mesh and wrap it with its draw state.
    pub fn build(&self) -> Result<Renderable> {
        let mesh = self.shape.generate()?;
        mesh.validate().map_err(|e| {
            ShapeError::Topology(format!("{} ({}): {e}", self.name, self.shape.kind()))
        })?;

        let mut renderable = Renderable::new(self.name.clone(), mesh);
        let shader = if self.shape.is_helper() {
            ShaderHandle::LINES
        } else {
            ShaderHandle::SURFACE
        };
        renderable.set_shader(shader, self.color);

        if let Some(width) = self.line_width {
            renderable.set_line_width(width);
        }
        if let Some(rotation) = self.rotation {
            renderable.rotate(rotation.axis, rotation.angle);
        }

        debug!(
            name = %self.name,
            kind = self.shape.kind(),
            vertices = renderable.mesh().vertex_count(),
            primitives = renderable.mesh().primitive_count(),
            "Built scene object"
        );

        Ok(renderable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub camera: CameraScript,
    pub objects: Vec<SceneObject>,
}

impl SceneDescription {
    /// The stock scene: sphere, torus and trefoil knot around a disk, with
    /// coloured axes over a translucent floor grid, viewed from above at 45°.
    pub fn demo() -> Self {
        let objects = vec![
            SceneObject::new("disk", Shape::Disk(Disk::new(0.5, 100))),
            SceneObject::new(
                "sphere",
                Shape::UvSphere(UvSphere::new(0.75, 128, 64).with_center(Vec3::new(-2.0, 0.0, 0.0))),
            ),
            SceneObject::new(
                "torus",
                Shape::Torus(Torus::new(0.2, 0.5, 32, 96).with_center(Vec3::new(2.0, 0.0, 0.0))),
            ),
            SceneObject::new(
                "trefoil",
                Shape::TrefoilKnot(TrefoilKnot::new(0.17, 1.0, 256, 32)),
            ),
            SceneObject::new(
                "y_axis",
                Shape::Line(Line::new(Vec3::new(0.0, -100.0, 0.0), Vec3::new(0.0, 100.0, 0.0))),
            )
            .with_color(Vec4::new(0.0, 1.0, 0.0, 1.0))
            .with_line_width(2.0),
            SceneObject::new(
                "x_axis",
                Shape::Line(Line::new(Vec3::new(-100.0, 0.0, 0.0), Vec3::new(100.0, 0.0, 0.0))),
            )
            .with_color(Vec4::new(1.0, 0.0, 0.0, 1.0))
            .with_line_width(2.0),
            SceneObject::new("floor", Shape::Grid(Grid::new(1.0, 100)))
                .with_color(Vec4::new(0.7, 0.7, 0.7, 0.25))
                .with_line_width(0.5),
        ];

        Self {
            viewport: Viewport::default(),
            camera: CameraScript {
                position: DEFAULT_EYE,
                events: vec![
                    CameraEvent::Rotate {
                        angle: -45.0,
                        axis: Vec3::X,
                    },
                    CameraEvent::Rotate {
                        angle: -45.0,
                        axis: Vec3::Z,
                    },
                ],
            },
            objects,
        }
    }

    /// Parse and check a scene from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        scene.check()?;
        Ok(scene)
    }

    /// Load a scene file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading scene");
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Structural checks that do not need any geometry to be generated.
    ///
    /// Names become output file stems, so they must be non-empty, unique and
    /// free of path separators.
    pub fn check(&self) -> Result<()> {
        if self.objects.is_empty() {
            return Err(ShapeError::Scene("scene contains no objects".into()));
        }
        if self.viewport.aspect().is_none() {
            return Err(ShapeError::Scene(format!(
                "viewport must be non-empty (got {}x{})",
                self.viewport.width, self.viewport.height
            )));
        }

        let mut seen = HashSet::new();
        for object in &self.objects {
            let name = object.name.as_str();
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ShapeError::Scene(format!(
                    "invalid object name {name:?}"
                )));
            }
            if !seen.insert(name) {
                return Err(ShapeError::Scene(format!("duplicate object name {name:?}")));
            }
            object.shape.check()?;
        }

        Ok(())
    }

    /// Camera after replaying the scripted events.
    pub fn build_camera(&self) -> OrbitCamera {
        let mut camera = OrbitCamera::new(self.camera.position, self.viewport);
        for event in &self.camera.events {
            camera.apply(event);
        }
        camera
    }
}
