use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Geometry;
use super::topology::{self, MIN_RING_SIZE, Winding};
use crate::error::{Result, ensure_at_least, ensure_indexable, ensure_placement, ensure_positive};
use crate::types::{IndexedMesh, Topology, VertexLayout};

/// Ring torus around the Z axis.
///
/// Vertex `(i, j)` is the tube-circle point at angle `θ_j` (in the XZ plane,
/// offset `outer_radius` along X) rotated by the loop angle `φ_i` about Z.
/// Rings are tube circles, stored loop-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Torus {
    /// Tube (minor) radius.
    pub inner_radius: f32,
    /// Loop (major) radius.
    pub outer_radius: f32,
    /// Samples around the tube.
    pub divisions_r: u32,
    /// Samples along the loop.
    pub divisions_t: u32,
    pub center: Vec3,
}

impl Default for Torus {
    fn default() -> Self {
        Self {
            inner_radius: 0.5,
            outer_radius: 1.0,
            divisions_r: 8,
            divisions_t: 32,
            center: Vec3::ZERO,
        }
    }
}

impl Torus {
    pub fn new(inner_radius: f32, outer_radius: f32, divisions_r: u32, divisions_t: u32) -> Self {
        Self {
            inner_radius,
            outer_radius,
            divisions_r,
            divisions_t,
            ..Default::default()
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.divisions_r as usize * self.divisions_t as usize
    }

    pub fn triangle_count(&self) -> usize {
        2 * self.vertex_count()
    }
}

impl Geometry for Torus {
    fn kind(&self) -> &'static str {
        "torus"
    }

    fn check(&self) -> Result<()> {
        ensure_positive("Torus", "inner_radius", self.inner_radius)?;
        ensure_positive("Torus", "outer_radius", self.outer_radius)?;
        ensure_at_least("Torus", "divisions_r", self.divisions_r, MIN_RING_SIZE)?;
        ensure_at_least("Torus", "divisions_t", self.divisions_t, MIN_RING_SIZE)?;
        ensure_indexable("Torus", self.vertex_count())?;
        ensure_placement("Torus", self.center, self.outer_radius + self.inner_radius)
    }

    fn generate(&self) -> Result<IndexedMesh> {
        self.check()?;

        if self.outer_radius <= self.inner_radius {
            warn!(
                inner = self.inner_radius,
                outer = self.outer_radius,
                "Torus tube radius reaches the axis; surface self-intersects"
            );
        }

        let (div_r, div_t) = (self.divisions_r, self.divisions_t);
        let tube_step = 360.0 / div_r as f32;
        let loop_step = 360.0 / div_t as f32;

        let mut vertices = Vec::with_capacity(self.vertex_count() * 6);
        for i in 0..div_t {
            let spin = Quat::from_rotation_z((i as f32 * loop_step).to_radians());
            let loop_point = self.center + spin * Vec3::new(self.outer_radius, 0.0, 0.0);

            for j in 0..div_r {
                let theta = (j as f32 * tube_step).to_radians();
                let local = Vec3::new(
                    self.outer_radius + self.inner_radius * theta.cos(),
                    0.0,
                    self.inner_radius * theta.sin(),
                );
                let point = self.center + spin * local;
                let normal = (point - loop_point).normalize();

                vertices.extend(point.to_array());
                vertices.extend(normal.to_array());
            }
        }

        // Tube circles run counter-clockwise about the loop tangent's
        // opposite, so the lattice is stitched reversed to face outward.
        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        topology::stitch_closed_lattice(0, div_t, div_r, Winding::Reverse, &mut indices)?;

        debug!(
            divisions_r = div_r,
            divisions_t = div_t,
            vertices = self.vertex_count(),
            triangles = self.triangle_count(),
            "Generated torus"
        );

        Ok(IndexedMesh::from_parts(
            vertices,
            indices,
            VertexLayout::PositionNormal,
            Topology::Triangles,
        ))
    }
}
