use std::path::PathBuf;

use clap::Parser;

use crate::camera::Viewport;

/// Export parameters.
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    /// Apply EXT_meshopt_compression to the GLB buffers.
    pub compress: bool,
}

/// Fully resolved pipeline configuration (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Scene description; the stock demo scene when absent.
    pub scene: Option<PathBuf>,
    pub output: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub export: ExportConfig,
    pub dry_run: bool,
    pub verbose: bool,
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scene: None,
            output: PathBuf::from("out"),
            width: None,
            height: None,
            export: ExportConfig::default(),
            dry_run: false,
            verbose: false,
            threads: None,
        }
    }
}

impl PipelineConfig {
    /// The scene's viewport with any command-line overrides applied.
    pub fn resolve_viewport(&self, scene: Viewport) -> Viewport {
        Viewport {
            width: self.width.unwrap_or(scene.width),
            height: self.height.unwrap_or(scene.height),
        }
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "orbit-shapes",
    about = "Generate parametric meshes under an orbit camera and export them as GLB",
    version
)]
pub struct CliArgs {
    /// Output directory
    #[arg(short = 'o', long, default_value = "out")]
    pub output: PathBuf,

    /// Scene description (JSON); defaults to the built-in demo scene
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Viewport height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Write GLB files with EXT_meshopt_compression
    #[arg(long)]
    pub compress: bool,

    /// Generate and validate meshes and report stats only
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for PipelineConfig {
    fn from(args: CliArgs) -> Self {
        PipelineConfig {
            scene: args.scene,
            output: args.output,
            width: args.width,
            height: args.height,
            export: ExportConfig {
                compress: args.compress,
            },
            dry_run: args.dry_run,
            verbose: args.verbose,
            threads: args.threads,
        }
    }
}
