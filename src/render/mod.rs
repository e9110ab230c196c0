//! Hand-off between generated meshes and whatever draws them.
//!
//! A [`Renderable`] pairs an immutable mesh with the state a draw call needs:
//! an opaque shading-program handle, an optional flat color, a line width for
//! helpers and a rigid-body model transform.

pub mod uniform;

use glam::{Mat3, Mat4, Vec3, Vec4};
use tracing::debug;

use crate::camera::OrbitCamera;
use crate::types::{IndexedMesh, Topology};

pub use uniform::CameraUniform;

/// Opaque handle to a compiled shading program owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

impl ShaderHandle {
    /// Lit program used for shaded surfaces.
    pub const SURFACE: ShaderHandle = ShaderHandle(0);
    /// Flat-color program used for line helpers.
    pub const LINES: ShaderHandle = ShaderHandle(1);
}

/// Value of one named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Mat3(Mat3),
    Float(f32),
    Vec4(Vec4),
}

pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct Renderable {
    name: String,
    mesh: IndexedMesh,
    shader: Option<ShaderHandle>,
    color: Option<Vec4>,
    model: Mat4,
    line_width: f32,
}

impl Renderable {
    pub fn new(name: impl Into<String>, mesh: IndexedMesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            shader: None,
            color: None,
            model: Mat4::IDENTITY,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &IndexedMesh {
        &self.mesh
    }

    pub fn shader(&self) -> Option<ShaderHandle> {
        self.shader
    }

    pub fn color(&self) -> Option<Vec4> {
        self.color
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn is_helper(&self) -> bool {
        self.mesh.topology() == Topology::Lines
    }

    /// Bind a shading program and optionally a flat color.
    pub fn set_shader(&mut self, shader: ShaderHandle, color: Option<Vec4>) {
        self.shader = Some(shader);
        self.color = color;
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color = Some(color);
    }

    /// Widths that are not positive and finite are ignored.
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.line_width = width;
        } else {
            debug!(name = %self.name, width, "Ignoring invalid line width");
        }
    }

    /// Post-multiply the model transform by a rotation of `angle` degrees
    /// about `axis`. A zero axis or non-finite angle leaves the transform
    /// untouched.
    pub fn rotate(&mut self, axis: Vec3, angle: f32) {
        match axis.try_normalize() {
            Some(axis) if angle.is_finite() => {
                self.model *= Mat4::from_axis_angle(axis, angle.to_radians());
            }
            _ => debug!(name = %self.name, ?axis, angle, "Ignoring invalid model rotation"),
        }
    }

    /// Named uniforms for drawing this object under `camera`.
    ///
    /// Surfaces get `projection`, `view` and `normal_mat`; line helpers get
    /// `projection`, `view` and `worldScale`. A set color adds `vertColor`.
    pub fn uniforms(&self, camera: &OrbitCamera) -> Vec<(&'static str, UniformValue)> {
        let mut values = vec![
            ("projection", UniformValue::Mat4(camera.projection_matrix())),
            ("view", UniformValue::Mat4(camera.view_matrix())),
        ];

        match self.mesh.topology() {
            Topology::Triangles => {
                values.push(("normal_mat", UniformValue::Mat3(camera.normal_matrix())));
            }
            Topology::Lines => {
                values.push(("worldScale", UniformValue::Float(camera.zoom_scale())));
            }
        }

        if let Some(color) = self.color {
            values.push(("vertColor", UniformValue::Vec4(color)));
        }

        values
    }
}
