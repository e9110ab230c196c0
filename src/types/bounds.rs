use glam::Vec3;
use serde::Serialize;

/// Axis-aligned bounds of a mesh, as written to GLB accessors and the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    /// Smallest box around `points`, or `None` when there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<BoundingBox> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(BoundingBox {
            min: min.to_array(),
            max: max.to_array(),
        })
    }
}
