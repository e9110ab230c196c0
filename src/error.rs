use std::io;

use glam::Vec3;

/// All error types for mesh generation, scene loading and export.
#[derive(thiserror::Error, Debug)]
pub enum ShapeError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Topology error: {0}")]
    Topology(String),
    #[error("Scene error: {0}")]
    Scene(String),
    #[error("Output error: {0}")]
    Output(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Reject anything that is not a finite, strictly positive length.
pub(crate) fn ensure_positive(shape: &str, field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::InvalidParameter(format!(
            "{shape}: {field} must be a positive finite number (got {value})"
        )))
    }
}

/// Reject division counts below `min`.
pub(crate) fn ensure_at_least(shape: &str, field: &str, value: u32, min: u32) -> Result<()> {
    if value >= min {
        Ok(())
    } else {
        Err(ShapeError::InvalidParameter(format!(
            "{shape}: {field} must be at least {min} (got {value})"
        )))
    }
}

/// Reject a non-finite `center`, or one whose placement of a shape spanning
/// `extent` around it leaves the `f32` range.
pub(crate) fn ensure_placement(shape: &str, center: Vec3, extent: f32) -> Result<()> {
    if !center.is_finite() {
        return Err(ShapeError::InvalidParameter(format!(
            "{shape}: center must be finite (got {center})"
        )));
    }
    if !(center.abs() + Vec3::splat(extent)).is_finite() {
        return Err(ShapeError::InvalidParameter(format!(
            "{shape}: extent {extent} around center {center} overflows f32"
        )));
    }
    Ok(())
}

/// Reject meshes whose vertices cannot all be addressed by `u32` indices.
pub(crate) fn ensure_indexable(shape: &str, vertex_count: usize) -> Result<()> {
    if u32::try_from(vertex_count).is_ok() {
        Ok(())
    } else {
        Err(ShapeError::InvalidParameter(format!(
            "{shape}: {vertex_count} vertices exceed the u32 index range"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_strings() {
        let e = ShapeError::InvalidParameter("radius".into());
        assert_eq!(e.to_string(), "Invalid parameter: radius");

        let e = ShapeError::Topology("index out of range".into());
        assert_eq!(e.to_string(), "Topology error: index out of range");

        let e = ShapeError::Scene("duplicate name".into());
        assert_eq!(e.to_string(), "Scene error: duplicate name");

        let e = ShapeError::Output("disk full".into());
        assert_eq!(e.to_string(), "Output error: disk full");
    }

    #[test]
    fn from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let e: ShapeError = io_err.into();
        assert!(matches!(e, ShapeError::Io(_)));
        assert!(e.to_string().contains("file missing"));
    }

    #[test]
    fn positive_guard() {
        assert!(ensure_positive("Disk", "radius", 0.5).is_ok());
        assert!(ensure_positive("Disk", "radius", 0.0).is_err());
        assert!(ensure_positive("Disk", "radius", -1.0).is_err());
        assert!(ensure_positive("Disk", "radius", f32::NAN).is_err());
        assert!(ensure_positive("Disk", "radius", f32::INFINITY).is_err());
    }

    #[test]
    fn placement_guard() {
        assert!(ensure_placement("Disk", Vec3::new(5.0, -2.0, 0.0), 1.0).is_ok());
        assert!(ensure_placement("Disk", Vec3::new(f32::INFINITY, 0.0, 0.0), 1.0).is_err());
        assert!(ensure_placement("Disk", Vec3::new(0.0, f32::NAN, 0.0), 1.0).is_err());
        assert!(ensure_placement("Disk", Vec3::new(f32::MAX, 0.0, 0.0), f32::MAX).is_err());
        assert!(ensure_placement("Disk", Vec3::ZERO, f32::INFINITY).is_err());
    }

    #[test]
    fn index_range_guard() {
        assert!(ensure_indexable("Grid", u32::MAX as usize).is_ok());
        let err = ensure_indexable("Grid", u32::MAX as usize + 1).unwrap_err();
        assert!(err.to_string().contains("u32 index range"));
    }

    #[test]
    fn count_guard_message() {
        let err = ensure_at_least("Torus", "divisions_r", 2, 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter: Torus: divisions_r must be at least 3 (got 2)"
        );
    }
}
