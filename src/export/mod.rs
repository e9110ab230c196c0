//! Writing generated objects to disk: one GLB per object plus a manifest.

pub mod glb;
pub mod manifest;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::ExportConfig;
use crate::error::{Result, ShapeError};
use crate::render::Renderable;

/// GLB file name for an object, relative to the output directory.
pub fn glb_file_name(renderable: &Renderable) -> String {
    format!("{}.glb", renderable.name())
}

/// Write one object's GLB into `out_dir` and return its file name.
pub fn write_object(renderable: &Renderable, config: &ExportConfig, out_dir: &Path) -> Result<String> {
    let glb_data = if config.compress {
        glb::write_glb_compressed(renderable)?
    } else {
        glb::write_glb(renderable)?
    };

    let file_name = glb_file_name(renderable);
    let path = out_dir.join(&file_name);
    fs::write(&path, &glb_data)
        .map_err(|e| ShapeError::Output(format!("Failed to write {}: {e}", path.display())))?;

    debug!(path = %path.display(), bytes = glb_data.len(), "Wrote GLB");
    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Disk, Geometry};

    #[test]
    fn write_object_creates_named_glb() {
        let tmp = tempfile::tempdir().unwrap();
        let disk = Renderable::new("plate", Disk::new(1.0, 12).generate().unwrap());

        let name = write_object(&disk, &ExportConfig::default(), tmp.path()).unwrap();
        assert_eq!(name, "plate.glb");

        let bytes = fs::read(tmp.path().join(&name)).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");
    }

    #[test]
    fn compressed_export_is_smaller() {
        let tmp = tempfile::tempdir().unwrap();
        let disk = Renderable::new("plate", Disk::new(1.0, 256).generate().unwrap());

        write_object(&disk, &ExportConfig { compress: false }, tmp.path()).unwrap();
        let plain = fs::metadata(tmp.path().join("plate.glb")).unwrap().len();
        write_object(&disk, &ExportConfig { compress: true }, tmp.path()).unwrap();
        let packed = fs::metadata(tmp.path().join("plate.glb")).unwrap().len();
        assert!(packed < plain);
    }
}
