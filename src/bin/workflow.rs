//! Image to voxel workflow
//!
//! ```bash
//! workflow chair.png --output-dir output/workflow --pitch 0.02
//! ```
//!
//! Stage failures are printed and the process still exits with code 0.

use clap::Parser;
use mesh_voxelizer::{LogFile, Workflow, WorkflowConfig};
use std::path::PathBuf;

/// Image to voxel workflow
#[derive(Parser)]
#[command(name = "workflow")]
#[command(about = "Image to Voxel Workflow", long_about = None)]
#[command(version)]
struct Args {
    /// Input image path
    image: PathBuf,

    /// Output directory
    #[arg(long, default_value = "output/workflow")]
    output_dir: PathBuf,

    /// Voxel size
    #[arg(long, default_value_t = 0.02, allow_negative_numbers = true)]
    pitch: f32,

    /// Python interpreter for the reconstruction script [default: $PYTHON or python3]
    #[arg(long)]
    python: Option<PathBuf>,

    /// Reconstruction script
    #[arg(long, default_value = "run.py")]
    reconstruct_script: PathBuf,

    /// Voxelizer executable [default: voxelize next to this binary]
    #[arg(long)]
    voxelizer: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let mut config = WorkflowConfig::default()
        .with_output_dir(args.output_dir)
        .with_pitch(args.pitch)
        .with_reconstruct_script(args.reconstruct_script);
    if let Some(python) = args.python {
        config = config.with_python(python);
    }
    if let Some(voxelizer) = args.voxelizer {
        config = config.with_voxelizer(voxelizer);
    }

    let log = match LogFile::new(args.log.as_deref(), true) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error: {}", e);
            LogFile::console()
        }
    };

    // Completion is reported through the log
    if let Err(e) = Workflow::new(config).with_log(log).run(&args.image) {
        eprintln!("Error: {}", e);
    }
}
