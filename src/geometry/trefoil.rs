//! Tube swept along a trefoil knot.
//!
//! The knot curve is sampled into a closed polyline. At every sample a
//! rotation carries the reference axis (+Z) onto the local tangent, and a
//! circle drawn in the XY plane is rotated into place around the sample.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Geometry;
use super::topology::{self, MIN_RING_SIZE, Winding};
use crate::error::{Result, ensure_at_least, ensure_indexable, ensure_placement, ensure_positive};
use crate::types::{IndexedMesh, Topology, VertexLayout};

/// Scale applied to the unit trefoil so `loop_radius` is roughly its extent.
const CURVE_SCALE: f32 = 0.33;

/// Below this length a cross product or tangent is treated as zero.
const PARALLEL_EPSILON: f32 = 1e-6;

/// The axis tube circles are drawn around before orientation.
const REFERENCE_AXIS: Vec3 = Vec3::Z;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrefoilKnot {
    /// Radius of the swept tube.
    pub tube_radius: f32,
    /// Scale of the knot curve.
    pub loop_radius: f32,
    /// Samples along the knot.
    pub divisions_loop: u32,
    /// Samples around the tube.
    pub divisions_tube: u32,
    pub center: Vec3,
}

impl Default for TrefoilKnot {
    fn default() -> Self {
        Self {
            tube_radius: 0.125,
            loop_radius: 1.0,
            divisions_loop: 256,
            divisions_tube: 32,
            center: Vec3::ZERO,
        }
    }
}

impl TrefoilKnot {
    pub fn new(
        tube_radius: f32,
        loop_radius: f32,
        divisions_loop: u32,
        divisions_tube: u32,
    ) -> Self {
        Self {
            tube_radius,
            loop_radius,
            divisions_loop,
            divisions_tube,
            ..Default::default()
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.divisions_loop as usize * self.divisions_tube as usize
    }

    pub fn triangle_count(&self) -> usize {
        2 * self.vertex_count()
    }

    /// Point on the knot at parameter `theta` (radians).
    pub fn curve_point(&self, theta: f32) -> Vec3 {
        let unit = Vec3::new(
            theta.sin() + 2.0 * (2.0 * theta).sin(),
            theta.cos() - 2.0 * (2.0 * theta).cos(),
            -(3.0 * theta).sin(),
        );
        self.center + self.loop_radius * CURVE_SCALE * unit
    }

    /// The closed polyline of `divisions_loop` curve samples.
    pub fn curve_samples(&self) -> Vec<Vec3> {
        let step = 2.0 * PI / self.divisions_loop as f32;
        (0..self.divisions_loop)
            .map(|i| self.curve_point(i as f32 * step))
            .collect()
    }
}

/// Averaged direction through `cur`, from the unit directions into and out
/// of it. Falls back to the outgoing direction at a cusp and to zero when
/// the neighbours coincide with the sample.
pub fn sample_tangent(prev: Vec3, cur: Vec3, next: Vec3) -> Vec3 {
    let incoming = (cur - prev).try_normalize();
    let outgoing = (next - cur).try_normalize();
    match (incoming, outgoing) {
        (Some(a), Some(b)) => (a + b).try_normalize().unwrap_or(b),
        (None, Some(d)) | (Some(d), None) => d,
        (None, None) => Vec3::ZERO,
    }
}

/// Rotation carrying [`REFERENCE_AXIS`] onto `tangent`.
///
/// Axis is `Z × tangent`, angle is the angle between them. When the two are
/// parallel the cross product vanishes and the rotation is chosen
/// explicitly: identity for `+Z`, a half turn about `+X` for `-Z`. A zero
/// tangent also yields the identity.
pub fn orientation_for(tangent: Vec3) -> Quat {
    let Some(tangent) = tangent.try_normalize() else {
        return Quat::IDENTITY;
    };

    let axis = REFERENCE_AXIS.cross(tangent);
    let cos_angle = REFERENCE_AXIS.dot(tangent).clamp(-1.0, 1.0);

    if axis.length() < PARALLEL_EPSILON {
        return if cos_angle > 0.0 {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(Vec3::X, PI)
        };
    }

    Quat::from_axis_angle(axis.normalize(), cos_angle.acos())
}

impl Geometry for TrefoilKnot {
    fn kind(&self) -> &'static str {
        "trefoil_knot"
    }

    fn check(&self) -> Result<()> {
        ensure_positive("TrefoilKnot", "tube_radius", self.tube_radius)?;
        ensure_positive("TrefoilKnot", "loop_radius", self.loop_radius)?;
        ensure_at_least(
            "TrefoilKnot",
            "divisions_loop",
            self.divisions_loop,
            MIN_RING_SIZE,
        )?;
        ensure_at_least(
            "TrefoilKnot",
            "divisions_tube",
            self.divisions_tube,
            MIN_RING_SIZE,
        )?;
        ensure_indexable("TrefoilKnot", self.vertex_count())?;
        // Unit curve coordinates stay within [-3, 3]; tangents difference
        // two samples, so twice that span must stay finite.
        let curve = 3.0 * CURVE_SCALE * self.loop_radius;
        ensure_placement("TrefoilKnot", self.center, 2.0 * curve + self.tube_radius)
    }

    fn generate(&self) -> Result<IndexedMesh> {
        self.check()?;

        let samples = self.curve_samples();
        let count = samples.len();
        let tube_step = 2.0 * PI / self.divisions_tube as f32;

        let mut vertices = Vec::with_capacity(self.vertex_count() * 6);
        for (i, &cur) in samples.iter().enumerate() {
            let prev = samples[(i + count - 1) % count];
            let next = samples[(i + 1) % count];
            let orientation = orientation_for(sample_tangent(prev, cur, next));

            for j in 0..self.divisions_tube {
                let phi = j as f32 * tube_step;
                let normal = orientation * Vec3::new(phi.cos(), phi.sin(), 0.0);
                let point = cur + self.tube_radius * normal;

                vertices.extend(point.to_array());
                vertices.extend(normal.normalize().to_array());
            }
        }

        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        topology::stitch_closed_lattice(
            0,
            self.divisions_loop,
            self.divisions_tube,
            Winding::Forward,
            &mut indices,
        )?;

        debug!(
            divisions_loop = self.divisions_loop,
            divisions_tube = self.divisions_tube,
            vertices = self.vertex_count(),
            triangles = self.triangle_count(),
            "Generated trefoil knot"
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
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn counts_follow_divisions() {
        let knot = TrefoilKnot::new(0.17, 1.0, 64, 8);
        let mesh = knot.generate().unwrap();
        assert_eq!(mesh.vertex_count(), 64 * 8);
        assert_eq!(mesh.triangle_count(), 2 * 64 * 8);
        assert_eq!(mesh.indices().len(), 3 * mesh.triangle_count());
        assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn curve_starts_at_known_point() {
        let knot = TrefoilKnot::new(0.1, 3.0, 16, 4);
        let p = knot.curve_point(0.0);
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 3.0 * 0.33 * -1.0);
        assert_relative_eq!(p.z, 0.0);
    }

    #[test]
    fn rings_surround_their_samples() {
        let knot = TrefoilKnot::new(0.17, 1.0, 48, 6).with_center(Vec3::new(0.0, 0.0, 1.0));
        let mesh = knot.generate().unwrap();
        let samples = knot.curve_samples();
        for (i, sample) in samples.iter().enumerate() {
            for j in 0..6 {
                let v = i * 6 + j;
                let p = mesh.position(v);
                let n = mesh.normal(v).unwrap();
                assert_relative_eq!(p.distance(*sample), 0.17, epsilon = 1e-5);
                assert_relative_eq!(n.length(), 1.0, epsilon = 1e-5);
                assert!((p - *sample).dot(n) > 0.0);
            }
        }
    }

    #[test]
    fn tube_circles_are_perpendicular_to_tangent() {
        let knot = TrefoilKnot::new(0.2, 1.0, 40, 5);
        let mesh = knot.generate().unwrap();
        let samples = knot.curve_samples();
        let n = samples.len();
        for i in 0..n {
            let tangent = sample_tangent(samples[(i + n - 1) % n], samples[i], samples[(i + 1) % n]);
            for j in 0..5 {
                let radial = mesh.position(i * 5 + j) - samples[i];
                assert_abs_diff_eq!(radial.dot(tangent), 0.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn closed_in_both_directions_and_faces_outward() {
        let mesh = TrefoilKnot::new(0.17, 1.0, 128, 12).generate().unwrap();
        assert_non_degenerate(&mesh);
        assert_outward_winding(&mesh);
        assert!(mesh.validate().is_ok());

        // The last ring is stitched to the first and the last column to the
        // first column of each ring.
        let last_ring = 127 * 12;
        let tris: Vec<_> = mesh.triangles().collect();
        assert!(tris.iter().any(|t| t.contains(&last_ring) && t.contains(&0)));
        assert!(tris.iter().any(|t| t.contains(&11) && t.contains(&0)));
    }

    #[test]
    fn orientation_maps_reference_onto_tangent() {
        for tangent in [
            Vec3::X,
            Vec3::new(0.3, -0.4, 0.5).normalize(),
            Vec3::new(-1.0, 2.0, -3.0).normalize(),
        ] {
            let q = orientation_for(tangent);
            assert!((q * Vec3::Z).abs_diff_eq(tangent, 1e-5));
        }
    }

    #[test]
    fn parallel_tangents_use_explicit_fallback() {
        assert_eq!(orientation_for(Vec3::Z), Quat::IDENTITY);

        let flipped = orientation_for(Vec3::NEG_Z);
        assert!(flipped.is_finite());
        assert!((flipped * Vec3::Z).abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!((flipped * Vec3::X).abs_diff_eq(Vec3::X, 1e-6));

        assert_eq!(orientation_for(Vec3::ZERO), Quat::IDENTITY);
        assert!(orientation_for(Vec3::new(0.0, 1e-9, 1.0)).is_finite());
    }

    #[test]
    fn tangent_handles_coincident_and_cusp_samples() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(sample_tangent(p, p, p), Vec3::ZERO);
        assert_eq!(sample_tangent(p, p, p + Vec3::X), Vec3::X);
        // Going out and straight back: averaged direction vanishes.
        assert_eq!(sample_tangent(p - Vec3::Y, p, p - Vec3::Y), Vec3::NEG_Y);
    }

    #[test]
    fn invalid_knots_are_rejected() {
        assert!(TrefoilKnot::new(0.0, 1.0, 16, 8).generate().is_err());
        assert!(TrefoilKnot::new(0.1, 0.0, 16, 8).generate().is_err());
        assert!(TrefoilKnot::new(0.1, 1.0, 2, 8).generate().is_err());
        assert!(TrefoilKnot::new(0.1, 1.0, 16, 2).generate().is_err());
    }

    #[test]
    fn placement_must_stay_finite() {
        let knot = TrefoilKnot::new(0.1, 1.0, 16, 8).with_center(Vec3::new(0.0, 0.0, f32::NAN));
        assert!(knot.generate().is_err());
        let huge = TrefoilKnot::new(0.1, f32::MAX, 16, 8);
        assert!(huge.check().is_err());
    }

    #[test]
    fn divisions_must_fit_u32_indices() {
        assert!(TrefoilKnot::new(0.1, 1.0, u32::MAX, 3).check().is_err());
    }
}
