//! Line-list helpers drawn as overlays (axes, floor grid).

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Geometry;
use crate::error::{
    Result, ShapeError, ensure_at_least, ensure_indexable, ensure_placement, ensure_positive,
};
use crate::types::{IndexedMesh, Topology, VertexLayout};

/// A single segment, e.g. one coordinate axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Vec3,
    pub end: Vec3,
}

impl Line {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }
}

impl Geometry for Line {
    fn kind(&self) -> &'static str {
        "line"
    }

    fn check(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(ShapeError::InvalidParameter(format!(
                "Line: endpoints must be finite (got {} -> {})",
                self.start, self.end
            )));
        }
        if self.start == self.end {
            return Err(ShapeError::InvalidParameter(format!(
                "Line: start and end coincide at {}",
                self.start
            )));
        }
        Ok(())
    }

    fn generate(&self) -> Result<IndexedMesh> {
        self.check()?;

        let mut vertices = Vec::with_capacity(6);
        vertices.extend(self.start.to_array());
        vertices.extend(self.end.to_array());

        Ok(IndexedMesh::from_parts(
            vertices,
            vec![0, 1],
            VertexLayout::Position,
            Topology::Lines,
        ))
    }
}

/// Square floor grid in the XY plane.
///
/// Lines sit at `±spacing * k` for `k = 1..count` along both axes and span
/// `±spacing * count`. The centre lines are omitted; axis helpers draw them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid {
    pub spacing: f32,
    pub count: u32,
    pub center: Vec3,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            count: 10,
            center: Vec3::ZERO,
        }
    }
}

impl Grid {
    pub fn new(spacing: f32, count: u32) -> Self {
        Self {
            spacing,
            count,
            ..Default::default()
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn vertex_count(&self) -> usize {
        (self.count as usize).saturating_sub(1) * 8
    }
}

impl Geometry for Grid {
    fn kind(&self) -> &'static str {
        "grid"
    }

    fn check(&self) -> Result<()> {
        ensure_positive("Grid", "spacing", self.spacing)?;
        ensure_at_least("Grid", "count", self.count, 2)?;
        ensure_indexable("Grid", self.vertex_count())?;
        ensure_placement("Grid", self.center, self.spacing * self.count as f32)
    }

    fn generate(&self) -> Result<IndexedMesh> {
        self.check()?;

        // Lines span the outermost offset, so the extent follows `spacing`
        // instead of staying at `count` world units.
        let bound = self.spacing * self.count as f32;
        let mut vertices = Vec::with_capacity(self.vertex_count() * 3);

        for k in 1..self.count {
            for side in [-1.0_f32, 1.0] {
                let offset = side * self.spacing * k as f32;
                let segment = [
                    Vec3::new(-bound, offset, 0.0),
                    Vec3::new(bound, offset, 0.0),
                    Vec3::new(offset, -bound, 0.0),
                    Vec3::new(offset, bound, 0.0),
                ];
                for p in segment {
                    vertices.extend((self.center + p).to_array());
                }
            }
        }

        let vertex_count = u32::try_from(self.vertex_count()).map_err(|_| {
            ShapeError::InvalidParameter(format!("Grid: count {} is too large", self.count))
        })?;
        let indices: Vec<u32> = (0..vertex_count).collect();

        debug!(count = self.count, segments = vertex_count / 2, "Generated grid");

        Ok(IndexedMesh::from_parts(
            vertices,
            indices,
            VertexLayout::Position,
            Topology::Lines,
        ))
    }
}
