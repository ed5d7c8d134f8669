//! Voxelize a mesh file into one box per occupied cell
//!
//! ```bash
//! voxelize mesh.obj --pitch 0.02 --output mesh_voxels.obj
//! ```

use clap::Parser;
use mesh_voxelizer::{LogFile, Utils, VoxelizeOptions, Voxelizer};
use std::path::PathBuf;
use std::process::ExitCode;

/// Voxelize a mesh file
#[derive(Parser)]
#[command(name = "voxelize")]
#[command(about = "Voxelize a mesh file.", long_about = None)]
#[command(version)]
struct Args {
    /// Input mesh file (e.g., .obj, .stl)
    input: PathBuf,

    /// Voxel size (pitch)
    #[arg(long, default_value_t = 0.01, allow_negative_numbers = true)]
    pitch: f32,

    /// Output mesh file for voxels [default: <input>_voxels.obj]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

fn run(args: Args) -> mesh_voxelizer::Result<()> {
    let output = args
        .output
        .unwrap_or_else(|| Utils::default_voxel_output_path(&args.input));
    let log = LogFile::new(args.log.as_deref(), true)?;

    let options = VoxelizeOptions::default()
        .with_pitch(args.pitch)
        .with_output(output);
    Voxelizer::new(options)?.with_log(log).run(&args.input)?;
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
