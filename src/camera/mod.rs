//! Orbit viewport camera.
//!
//! The camera never moves its own eye. It accumulates rotations and zoom into
//! one matrix and slides the orbit target underneath it; the view matrix is
//! that accumulator followed by a translation to the target.

pub mod event;

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use event::{CameraEvent, Direction};

/// Vertical field of view of the projection, in degrees.
pub const FIELD_OF_VIEW_DEG: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 1000.0;

/// Window size the projection is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

impl Viewport {
    /// `None` when either side is zero (minimised window).
    pub fn aspect(&self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

/// Per-frame copy of everything a renderer reads from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraSnapshot {
    pub position: Vec3,
    pub zoom_scale: f32,
    pub euler_rotation: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Wrap an angle in degrees into `(-360, 360)`.
fn wrap_degrees(angle: f32) -> f32 {
    angle % 360.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    position: Vec3,
    target: Vec3,
    euler_rotation: Vec3,
    zoom_scale: f32,
    accumulated: Mat4,
    projection: Mat4,
    viewport: Viewport,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Viewport::default())
    }
}

impl OrbitCamera {
    /// Camera whose eye sits at `position` relative to the orbit target.
    ///
    /// An empty `viewport` falls back to [`Viewport::default`], so the stored
    /// viewport always matches the projection.
    pub fn new(position: Vec3, viewport: Viewport) -> Self {
        let fallback = Viewport::default();
        let mut camera = Self {
            position,
            target: Vec3::ZERO,
            euler_rotation: Vec3::ZERO,
            zoom_scale: 1.0,
            accumulated: Mat4::from_translation(position),
            projection: perspective(fallback.width as f32 / fallback.height as f32),
            viewport: fallback,
        };
        camera.resize(viewport.width, viewport.height);
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The point the camera orbits, in world space.
    pub fn target(&self) -> Vec3 {
        -self.target
    }

    pub fn zoom_scale(&self) -> f32 {
        self.zoom_scale
    }

    /// Tracked Euler angles in degrees, each in `(-360, 360)`.
    pub fn euler_rotation(&self) -> Vec3 {
        self.euler_rotation
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Accumulated rotation/scale followed by the orbit-target translation.
    pub fn view_matrix(&self) -> Mat4 {
        self.accumulated * Mat4::from_translation(self.target)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Inverse-transpose of the view's upper 3x3, for transforming normals.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.view_matrix().inverse().transpose())
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            position: self.position,
            zoom_scale: self.zoom_scale,
            euler_rotation: self.euler_rotation,
            view: self.view_matrix(),
            projection: self.projection,
        }
    }

    /// Dispatch one input delta.
    pub fn apply(&mut self, event: &CameraEvent) {
        match *event {
            CameraEvent::Translate { offset } => self.translate(offset),
            CameraEvent::TranslateLocal { amount, direction } => {
                self.translate_local(amount, direction)
            }
            CameraEvent::Rotate { angle, axis } => self.rotate(angle, axis),
            CameraEvent::RotateLocalX { angle } => self.rotate_local_x(angle),
            CameraEvent::Scale { factor } => self.scale(factor),
            CameraEvent::Resize { width, height } => self.resize(width, height),
        }
    }

    /// Slide the scene by `offset` (the target moves the opposite way).
    pub fn translate(&mut self, offset: Vec3) {
        self.target -= offset;
    }

    /// Drag the scene along the current heading.
    ///
    /// Directions come from the Z Euler angle only, so "front" stays in the
    /// ground plane however far the view is tilted. A positive amount moves
    /// the target backwards, which reads as the camera moving forwards.
    pub fn translate_local(&mut self, amount: f32, direction: Direction) {
        let heading = match direction {
            Direction::Front => self.euler_rotation.z,
            Direction::Right => self.euler_rotation.z + 90.0,
        }
        .to_radians();

        let dir = Vec3::new(heading.sin(), heading.cos(), 0.0);
        self.target += -amount * dir;
    }

    /// Compose a rotation of `angle` degrees about `axis`.
    ///
    /// The matrix rotates about the normalized axis, while the Euler
    /// tracker adds `axis * angle` as given. Zero axes and non-finite
    /// angles are ignored.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        if !angle.is_finite() {
            debug!(angle, "Ignoring non-finite rotation angle");
            return;
        }
        let Some(unit) = axis.try_normalize() else {
            debug!(angle, "Ignoring rotation about a zero axis");
            return;
        };
        let delta = axis * angle;
        if !delta.is_finite() {
            debug!(angle, ?axis, "Ignoring rotation that overflows the Euler tracker");
            return;
        }

        self.accumulated *= Mat4::from_axis_angle(unit, angle.to_radians());

        let euler = self.euler_rotation + delta;
        self.euler_rotation = Vec3::new(
            wrap_degrees(euler.x),
            wrap_degrees(euler.y),
            wrap_degrees(euler.z),
        );
    }

    /// Tilt about the camera's local X axis independently of the heading.
    pub fn rotate_local_x(&mut self, angle: f32) {
        let heading = self.euler_rotation.z;

        // Tilt is applied in the heading-free frame.
        self.rotate(-heading, Vec3::Z);
        self.rotate(angle, Vec3::X);
        self.rotate(heading, Vec3::Z);
    }

    /// Multiply the zoom by `factor`. Non-positive or non-finite factors
    /// are ignored so the zoom stays positive.
    pub fn scale(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            debug!(factor, "Ignoring non-positive zoom factor");
            return;
        }

        self.zoom_scale *= factor;
        self.accumulated *= Mat4::from_scale(Vec3::splat(factor));
    }

    /// Rebuild the projection for a new window size. Zero sizes keep the
    /// previous projection.
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport { width, height };
        let Some(aspect) = viewport.aspect() else {
            debug!(width, height, "Ignoring resize to an empty viewport");
            return;
        };

        self.viewport = viewport;
        self.projection = perspective(aspect);
    }
}

fn perspective(aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(
        FIELD_OF_VIEW_DEG.to_radians(),
        aspect,
        NEAR_PLANE,
        FAR_PLANE,
    )
}
