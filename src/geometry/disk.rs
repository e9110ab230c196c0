use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Geometry;
use super::topology::{self, MIN_RING_SIZE, Winding};
use crate::error::{Result, ensure_at_least, ensure_indexable, ensure_placement, ensure_positive};
use crate::types::{IndexedMesh, Topology, VertexLayout};

/// Flat disk in the local XY plane, fanned from its center.
///
/// Position-only: flat shading is left to the consuming shader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disk {
    pub radius: f32,
    /// Number of rim samples.
    pub resolution: u32,
    pub center: Vec3,
}

impl Default for Disk {
    fn default() -> Self {
        Self {
            radius: 1.0,
            resolution: 16,
            center: Vec3::ZERO,
        }
    }
}

impl Disk {
    pub fn new(radius: f32, resolution: u32) -> Self {
        Self {
            radius,
            resolution,
            ..Default::default()
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.resolution as usize + 1
    }
}

impl Geometry for Disk {
    fn kind(&self) -> &'static str {
        "disk"
    }

    fn check(&self) -> Result<()> {
        ensure_positive("Disk", "radius", self.radius)?;
        ensure_at_least("Disk", "resolution", self.resolution, MIN_RING_SIZE)?;
        ensure_indexable("Disk", self.vertex_count())?;
        ensure_placement("Disk", self.center, self.radius)
    }

    fn generate(&self) -> Result<IndexedMesh> {
        self.check()?;

        let n = self.resolution;
        let step = TAU / n as f32;

        let mut vertices = Vec::with_capacity(self.vertex_count() * 3);
        vertices.extend(self.center.to_array());
        for i in 0..n {
            let theta = i as f32 * step;
            let rim = self.center + self.radius * Vec3::new(theta.cos(), theta.sin(), 0.0);
            vertices.extend(rim.to_array());
        }

        let mut indices = Vec::with_capacity(n as usize * 3);
        topology::pole_fan(0, 1, n, Winding::Forward, &mut indices)?;

        debug!(resolution = n, vertices = self.vertex_count(), triangles = n, "Generated disk");

        Ok(IndexedMesh::from_parts(
            vertices,
            indices,
            VertexLayout::Position,
            Topology::Triangles,
        ))
    }
}
