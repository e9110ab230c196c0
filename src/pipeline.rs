use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::info;

use crate::camera::OrbitCamera;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::export::{self, manifest};
use crate::geometry::Geometry;
use crate::render::Renderable;
use crate::scene::SceneDescription;

/// Summary of a completed pipeline run.
#[derive(Debug)]
pub struct ProcessingResult {
    pub object_count: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Every file written, GLBs first and the manifest last. Empty on a dry run.
    pub files: Vec<PathBuf>,
    pub duration: Duration,
}

/// Pipeline orchestrator -- drives the four stages from scene to disk.
pub struct Pipeline;

impl Pipeline {
    /// Run the full pipeline.
    pub fn run(config: &PipelineConfig) -> Result<ProcessingResult> {
        let start = Instant::now();

        info!(
            scene = %config.scene.as_ref().map_or("<demo>".into(), |p| p.display().to_string()),
            output = %config.output.display(),
            "Starting pipeline"
        );

        info!("Stage 1/4: Scene");
        let mut scene = match &config.scene {
            Some(path) => SceneDescription::load(path)?,
            None => SceneDescription::demo(),
        };
        scene.viewport = config.resolve_viewport(scene.viewport);

        info!("Stage 2/4: Generation");
        let renderables = Self::generate(&scene)?;

        info!("Stage 3/4: Camera");
        let camera = scene.build_camera();
        info!(
            events = scene.camera.events.len(),
            zoom = camera.zoom_scale(),
            euler = ?camera.euler_rotation(),
            "Camera script replayed"
        );

        let vertex_count: usize = renderables.iter().map(|r| r.mesh().vertex_count()).sum();
        let triangle_count: usize = renderables.iter().map(|r| r.mesh().triangle_count()).sum();

        if config.dry_run {
            info!("--dry-run: skipping export");
            print_summary(&scene, &renderables, &camera);
            return Ok(ProcessingResult {
                object_count: renderables.len(),
                vertex_count,
                triangle_count,
                files: Vec::new(),
                duration: start.elapsed(),
            });
        }

        info!("Stage 4/4: Export");
        let files = Self::export(config, &scene, &renderables, &camera)?;
        print_summary(&scene, &renderables, &camera);

        let duration = start.elapsed();
        info!(
            objects = renderables.len(),
            vertices = vertex_count,
            triangles = triangle_count,
            elapsed = ?duration,
            "Pipeline complete"
        );

        Ok(ProcessingResult {
            object_count: renderables.len(),
            vertex_count,
            triangle_count,
            files,
            duration,
        })
    }

    /// Generate and validate every object on the rayon pool, keeping scene order.
    fn generate(scene: &SceneDescription) -> Result<Vec<Renderable>> {
        let renderables = scene
            .objects
            .par_iter()
            .map(|object| {
                let renderable = object.build()?;
                info!(
                    name = %object.name,
                    kind = object.shape.kind(),
                    vertices = renderable.mesh().vertex_count(),
                    primitives = renderable.mesh().primitive_count(),
                    "Generated object"
                );
                Ok(renderable)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(objects = renderables.len(), "Generation complete");
        Ok(renderables)
    }

    fn export(
        config: &PipelineConfig,
        scene: &SceneDescription,
        renderables: &[Renderable],
        camera: &OrbitCamera,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&config.output)?;

        let names = renderables
            .par_iter()
            .map(|r| export::write_object(r, &config.export, &config.output))
            .collect::<Result<Vec<_>>>()?;

        let entries = scene
            .objects
            .iter()
            .zip(renderables)
            .zip(&names)
            .map(|((object, renderable), file)| {
                manifest::object_entry(object.shape.kind(), renderable, camera, Some(file.as_str()))
            })
            .collect();

        let manifest_path =
            manifest::write_manifest(&manifest::build_manifest(camera, entries), &config.output)?;

        info!(
            files = names.len(),
            compressed = config.export.compress,
            output = %config.output.display(),
            "Export complete"
        );

        let mut files: Vec<PathBuf> = names.iter().map(|n| config.output.join(n)).collect();
        files.push(manifest_path);
        Ok(files)
    }
}

/// Print per-object stats and the final camera state.
fn print_summary(scene: &SceneDescription, renderables: &[Renderable], camera: &OrbitCamera) {
    println!("=== Scene ===");
    for (object, renderable) in scene.objects.iter().zip(renderables) {
        let mesh = renderable.mesh();
        println!(
            "  {:<12} {:<13} {:>7} vertices {:>7} {}",
            object.name,
            object.shape.kind(),
            mesh.vertex_count(),
            mesh.primitive_count(),
            if object.shape.is_helper() { "segments" } else { "triangles" }
        );
    }
    println!();

    let viewport = camera.viewport();
    let euler = camera.euler_rotation();
    println!("=== Camera ===");
    println!("  Viewport:  {}x{}", viewport.width, viewport.height);
    println!(
        "  Euler:     ({:.1}, {:.1}, {:.1})°",
        euler.x, euler.y, euler.z
    );
    println!("  Zoom:      {:.3}", camera.zoom_scale());
    let target = camera.target();
    println!(
        "  Target:    ({:.3}, {:.3}, {:.3})",
        target.x, target.y, target.z
    );
}
