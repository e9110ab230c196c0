use glam::Vec3;
use serde::Serialize;

use crate::error::{Result, ShapeError};

/// Tolerance used when checking that stored normals are unit length.
const NORMAL_LENGTH_EPSILON: f32 = 1e-3;

/// Per-vertex attribute layout of an interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// `[x, y, z]`
    Position,
    /// `[x, y, z, nx, ny, nz]`
    PositionNormal,
}

impl VertexLayout {
    /// Number of floats per vertex.
    pub fn stride(self) -> usize {
        match self {
            VertexLayout::Position => 3,
            VertexLayout::PositionNormal => 6,
        }
    }

    pub fn has_normals(self) -> bool {
        matches!(self, VertexLayout::PositionNormal)
    }
}

/// How the index buffer is grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Index triplets, counter-clockwise seen from outside.
    Triangles,
    /// Index pairs, one segment each.
    Lines,
}

impl Topology {
    /// Indices per primitive.
    pub fn arity(self) -> usize {
        match self {
            Topology::Triangles => 3,
            Topology::Lines => 2,
        }
    }
}

/// The fundamental geometry container.
///
/// The vertex buffer is interleaved with a uniform stride and both buffers are
/// plain `Vec<f32>` / `Vec<u32>` so they can be uploaded or cast verbatim.
/// Buffers are allocated once by a generator and never touched afterwards;
/// there are only read accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedMesh {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    layout: VertexLayout,
    topology: Topology,
}

impl IndexedMesh {
    pub(crate) fn from_parts(
        vertices: Vec<f32>,
        indices: Vec<u32>,
        layout: VertexLayout,
        topology: Topology,
    ) -> Self {
        Self {
            vertices,
            indices,
            layout,
            topology,
        }
    }

    /// Interleaved vertex data.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Flat index buffer (triplets or pairs, see [`IndexedMesh::topology`]).
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Floats per vertex (3 or 6).
    pub fn stride(&self) -> usize {
        self.layout.stride()
    }

    /// Number of vertices (vertex floats / stride).
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.stride()
    }

    /// Number of triangles; zero for line meshes.
    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Lines => 0,
        }
    }

    /// Number of primitives of the mesh's topology.
    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.topology.arity()
    }

    /// Whether normals are interleaved into the vertex buffer.
    pub fn has_normals(&self) -> bool {
        self.layout.has_normals()
    }

    /// Whether the mesh contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Position of vertex `index`.
    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * self.stride();
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    /// Normal of vertex `index`, if the layout carries normals.
    pub fn normal(&self, index: usize) -> Option<Vec3> {
        if !self.has_normals() {
            return None;
        }
        let base = index * self.stride() + 3;
        Some(Vec3::from_slice(&self.vertices[base..base + 3]))
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices
            .chunks_exact(self.stride())
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }

    /// Iterates normals; empty for position-only meshes.
    pub fn normals(&self) -> impl Iterator<Item = Vec3> + '_ {
        let take = if self.has_normals() { usize::MAX } else { 0 };
        self.vertices
            .chunks_exact(self.stride())
            .take(take)
            .map(|v| Vec3::new(v[3], v[4], v[5]))
    }

    /// De-interleaved positions as `[x, y, z, x, y, z, ...]`.
    pub fn position_buffer(&self) -> Vec<f32> {
        self.positions().flat_map(|p| p.to_array()).collect()
    }

    /// De-interleaved normals as `[nx, ny, nz, ...]`, empty without normals.
    pub fn normal_buffer(&self) -> Vec<f32> {
        self.normals().flat_map(|n| n.to_array()).collect()
    }

    /// Triangles as index triplets; empty for line meshes.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let take = match self.topology {
            Topology::Triangles => usize::MAX,
            Topology::Lines => 0,
        };
        self.indices
            .chunks_exact(3)
            .take(take)
            .map(|t| [t[0], t[1], t[2]])
    }

    /// Check the buffer invariants every generator promises.
    ///
    /// - vertex buffer length is a multiple of the stride
    /// - index buffer length is a multiple of the primitive arity
    /// - every index is below the vertex count
    /// - no primitive repeats an index
    /// - all floats are finite and normals are unit length
    pub fn validate(&self) -> Result<()> {
        let stride = self.stride();
        if self.vertices.len() % stride != 0 {
            return Err(ShapeError::Topology(format!(
                "vertex buffer length {} is not a multiple of stride {stride}",
                self.vertices.len()
            )));
        }

        let arity = self.topology.arity();
        if self.indices.len() % arity != 0 {
            return Err(ShapeError::Topology(format!(
                "index buffer length {} is not a multiple of {arity}",
                self.indices.len()
            )));
        }

        if let Some(pos) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(ShapeError::Topology(format!(
                "non-finite value at vertex float {pos}"
            )));
        }

        let vertex_count = self.vertex_count();
        for (prim, group) in self.indices.chunks_exact(arity).enumerate() {
            if let Some(&bad) = group.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(ShapeError::Topology(format!(
                    "primitive {prim} references vertex {bad} of {vertex_count}"
                )));
            }
            let degenerate = match *group {
                [a, b, c] => a == b || b == c || a == c,
                [a, b] => a == b,
                _ => false,
            };
            if degenerate {
                return Err(ShapeError::Topology(format!(
                    "primitive {prim} is degenerate: {group:?}"
                )));
            }
        }

        for (i, n) in self.normals().enumerate() {
            if (n.length() - 1.0).abs() > NORMAL_LENGTH_EPSILON {
                return Err(ShapeError::Topology(format!(
                    "normal {i} has length {}",
                    n.length()
                )));
            }
        }

        Ok(())
    }
}
