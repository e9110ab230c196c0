use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::info;

use crate::camera::OrbitCamera;
use crate::error::{Result, ShapeError};
use crate::render::Renderable;
use crate::types::BoundingBox;

pub const MANIFEST_FILE: &str = "scene.json";

/// Manifest entry for one exported object.
///
/// `file` is the GLB file name relative to the manifest, `None` on a dry run.
pub fn object_entry(
    kind: &str,
    renderable: &Renderable,
    camera: &OrbitCamera,
    file: Option<&str>,
) -> serde_json::Value {
    let mesh = renderable.mesh();
    let bounds = BoundingBox::from_points(mesh.positions());
    let uniforms: Vec<&str> = renderable
        .uniforms(camera)
        .iter()
        .map(|(name, _)| *name)
        .collect();

    let mut entry = json!({
        "name": renderable.name(),
        "kind": kind,
        "topology": mesh.topology(),
        "vertexCount": mesh.vertex_count(),
        "primitiveCount": mesh.primitive_count(),
        "triangleCount": mesh.triangle_count(),
        "hasNormals": mesh.has_normals(),
        "bounds": bounds,
        "lineWidth": renderable.line_width(),
        "model": renderable.model().to_cols_array(),
        "uniforms": uniforms,
    });

    if let Some(color) = renderable.color() {
        entry["color"] = json!(color.to_array());
    }
    if let Some(file) = file {
        entry["uri"] = json!(file);
    }

    entry
}

/// Final camera state as plain column-major arrays.
pub fn camera_entry(camera: &OrbitCamera) -> serde_json::Value {
    json!({
        "position": camera.position().to_array(),
        "target": camera.target().to_array(),
        "zoomScale": camera.zoom_scale(),
        "eulerRotation": camera.euler_rotation().to_array(),
        "viewport": camera.viewport(),
        "view": camera.view_matrix().to_cols_array(),
        "projection": camera.projection_matrix().to_cols_array(),
        "normalMatrix": camera.normal_matrix().to_cols_array(),
    })
}

/// Assemble the manifest document.
pub fn build_manifest(camera: &OrbitCamera, objects: Vec<serde_json::Value>) -> serde_json::Value {
    let total_vertices: u64 = objects
        .iter()
        .filter_map(|o| o["vertexCount"].as_u64())
        .sum();
    let total_triangles: u64 = objects
        .iter()
        .filter_map(|o| o["triangleCount"].as_u64())
        .sum();

    json!({
        "asset": {
            "generator": "orbit-shapes",
            "version": env!("CARGO_PKG_VERSION")
        },
        "camera": camera_entry(camera),
        "totals": {
            "objects": objects.len(),
            "vertices": total_vertices,
            "triangles": total_triangles
        },
        "objects": objects
    })
}

/// Write the manifest next to the GLB files.
pub fn write_manifest(manifest: &serde_json::Value, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(MANIFEST_FILE);
    let json_string = serde_json::to_string_pretty(manifest)
        .map_err(|e| ShapeError::Output(format!("Failed to serialize {MANIFEST_FILE}: {e}")))?;

    fs::write(&path, json_string)
        .map_err(|e| ShapeError::Output(format!("Failed to write {}: {e}", path.display())))?;

    info!(path = %path.display(), "Wrote scene manifest");
    Ok(path)
}
