use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Geometry;
use super::topology::{self, MIN_RING_SIZE, Winding};
use crate::error::{Result, ensure_at_least, ensure_indexable, ensure_placement, ensure_positive};
use crate::types::{IndexedMesh, Topology, VertexLayout};

/// Latitude/longitude sphere with a vertex at each pole.
///
/// Layout: south pole (index 0), `divisions_y` rings of `divisions_x`
/// samples from south to north, north pole (last index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UvSphere {
    pub radius: f32,
    /// Samples per ring (azimuth).
    pub divisions_x: u32,
    /// Number of rings between the poles (polar angle).
    pub divisions_y: u32,
    pub center: Vec3,
}

impl Default for UvSphere {
    fn default() -> Self {
        Self {
            radius: 1.0,
            divisions_x: 16,
            divisions_y: 16,
            center: Vec3::ZERO,
        }
    }
}

impl UvSphere {
    pub fn new(radius: f32, divisions_x: u32, divisions_y: u32) -> Self {
        Self {
            radius,
            divisions_x,
            divisions_y,
            ..Default::default()
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.divisions_x as usize * self.divisions_y as usize + 2
    }

    pub fn triangle_count(&self) -> usize {
        let x = self.divisions_x as usize;
        2 * x * (self.divisions_y as usize).saturating_sub(1) + 2 * x
    }

    fn push(&self, vertices: &mut Vec<f32>, unit: Vec3) {
        vertices.extend((self.center + self.radius * unit).to_array());
        vertices.extend(unit.to_array());
    }
}

impl Geometry for UvSphere {
    fn kind(&self) -> &'static str {
        "uv_sphere"
    }

    fn check(&self) -> Result<()> {
        ensure_positive("UvSphere", "radius", self.radius)?;
        ensure_at_least("UvSphere", "divisions_x", self.divisions_x, MIN_RING_SIZE)?;
        ensure_at_least("UvSphere", "divisions_y", self.divisions_y, 2)?;
        ensure_indexable("UvSphere", self.vertex_count())?;
        ensure_placement("UvSphere", self.center, self.radius)
    }

    fn generate(&self) -> Result<IndexedMesh> {
        self.check()?;

        let (div_x, div_y) = (self.divisions_x, self.divisions_y);
        let polar_step = 180.0 / (div_y + 1) as f32;
        let azimuth_step = 360.0 / div_x as f32;

        let mut vertices = Vec::with_capacity(self.vertex_count() * 6);
        self.push(&mut vertices, Vec3::NEG_Z);

        for ring in 1..=div_y {
            // Latitude measured from the equator, -90 at the south pole.
            let latitude = (ring as f32 * polar_step - 90.0).to_radians();
            let (z, ring_radius) = latitude.sin_cos();
            for j in 0..div_x {
                let phi = (j as f32 * azimuth_step).to_radians();
                let unit = Vec3::new(ring_radius * phi.cos(), ring_radius * phi.sin(), z);
                self.push(&mut vertices, unit);
            }
        }

        self.push(&mut vertices, Vec3::Z);

        let north = div_x * div_y + 1;
        let last_ring = 1 + (div_y - 1) * div_x;

        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        // Ring order runs counter-clockwise seen from +Z, so the south cap
        // needs the reversed fan to face -Z.
        topology::pole_fan(0, 1, div_x, Winding::Reverse, &mut indices)?;
        for ring in 0..div_y - 1 {
            topology::stitch_rings(
                1 + ring * div_x,
                1 + (ring + 1) * div_x,
                div_x,
                Winding::Forward,
                &mut indices,
            )?;
        }
        topology::pole_fan(north, last_ring, div_x, Winding::Forward, &mut indices)?;

        debug!(
            divisions_x = div_x,
            divisions_y = div_y,
            vertices = self.vertex_count(),
            triangles = self.triangle_count(),
            "Generated UV sphere"
        );

        Ok(IndexedMesh::from_parts(
            vertices,
            indices,
            VertexLayout::PositionNormal,
            Topology::Triangles,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::test_support::{assert_non_degenerate, assert_outward_winding};
    use approx::assert_relative_eq;

    #[test]
    fn coarse_sphere_counts() {
        let mesh = UvSphere::new(1.0, 4, 2).generate().unwrap();
        assert_eq!(mesh.vertex_count(), 10);
        assert_eq!(mesh.triangle_count(), 16);
        assert_eq!(mesh.stride(), 6);
    }

    #[test]
    fn vertices_on_surface_with_radial_normals() {
        let sphere = UvSphere::new(0.75, 24, 11).with_center(Vec3::new(-2.0, 0.0, 0.0));
        let mesh = sphere.generate().unwrap();
        assert_eq!(mesh.vertex_count(), sphere.vertex_count());
        assert_eq!(mesh.triangle_count(), sphere.triangle_count());

        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            let n = mesh.normal(i).unwrap();
            let radial = p - sphere.center;
            assert_relative_eq!(radial.length(), 0.75, epsilon = 1e-5);
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-5);
            assert!(n.cross(radial).length() < 1e-5);
            assert!(n.dot(radial) > 0.0);
        }
    }

    #[test]
    fn poles_sit_on_polar_axis() {
        let mesh = UvSphere::new(2.0, 8, 3).generate().unwrap();
        let last = mesh.vertex_count() - 1;
        assert_eq!(mesh.position(0), Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(mesh.position(last), Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(mesh.normal(0), Some(Vec3::NEG_Z));
        assert_eq!(mesh.normal(last), Some(Vec3::Z));
    }

    #[test]
    fn caps_and_bands_face_outward() {
        for (x, y) in [(4, 2), (16, 16), (7, 5)] {
            let mesh = UvSphere::new(1.0, x, y).generate().unwrap();
            assert_non_degenerate(&mesh);
            assert_outward_winding(&mesh);
            assert!(mesh.validate().is_ok());
        }
    }

    #[test]
    fn caps_reference_their_pole() {
        let mesh = UvSphere::new(1.0, 5, 3).generate().unwrap();
        let tris: Vec<_> = mesh.triangles().collect();
        assert!(tris[..5].iter().all(|t| t[0] == 0));
        let north = (mesh.vertex_count() - 1) as u32;
        assert!(tris[tris.len() - 5..].iter().all(|t| t[0] == north));
    }

    #[test]
    fn invalid_spheres_are_rejected() {
        assert!(UvSphere::new(0.0, 8, 8).generate().is_err());
        assert!(UvSphere::new(1.0, 2, 8).generate().is_err());
        assert!(UvSphere::new(1.0, 8, 1).generate().is_err());
    }

    #[test]
    fn infinite_center_is_rejected() {
        let sphere = UvSphere::new(1.0, 4, 2).with_center(Vec3::new(f32::INFINITY, 0.0, 0.0));
        let err = sphere.generate().unwrap_err();
        assert!(err.to_string().contains("center"));
        assert!(UvSphere::new(1.0, 4, 2).with_center(Vec3::splat(f32::NAN)).check().is_err());
    }

    #[test]
    fn divisions_must_fit_u32_indices() {
        // 70000 * 70000 + 2 vertices is past u32::MAX.
        assert!(UvSphere::new(1.0, 70_000, 70_000).check().is_err());
        assert!(UvSphere::new(1.0, 65_535, 65_535).check().is_ok());
    }
}
