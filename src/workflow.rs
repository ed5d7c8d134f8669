//! Image to voxel pipeline
//!
//! Runs the image-to-mesh reconstruction script and then the `voxelize`
//! binary as two sequential child processes. The stages hand off through the
//! filesystem: reconstruction writes `<output_dir>/0/mesh.obj`, voxelization
//! writes `<output_dir>/0/mesh_voxels.obj`.

use crate::{Error, LogFile, Result, Utils};
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Environment set on the reconstruction child only
pub const RECONSTRUCTION_ENV: [(&str, &str); 1] = [("PYTORCH_ENABLE_MPS_FALLBACK", "1")];

const RECONSTRUCTION_STAGE: &str = "reconstruction";
const VOXELIZATION_STAGE: &str = "voxelization";

/// Programs and paths used by [`Workflow`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkflowConfig {
    /// Interpreter that runs the reconstruction script
    pub python: PathBuf,
    pub reconstruct_script: PathBuf,
    /// Voxelizer executable
    pub voxelizer: PathBuf,
    pub output_dir: PathBuf,
    pub pitch: f32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let voxelizer = Utils::executable_folder()
            .map(|dir| dir.join(voxelizer_binary_name()))
            .unwrap_or_else(|_| PathBuf::from(voxelizer_binary_name()));
        Self {
            python: std::env::var_os("PYTHON")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("python3")),
            reconstruct_script: PathBuf::from("run.py"),
            voxelizer,
            output_dir: PathBuf::from("output/workflow"),
            pitch: 0.02,
        }
    }
}

fn voxelizer_binary_name() -> String {
    format!("voxelize{}", std::env::consts::EXE_SUFFIX)
}

impl WorkflowConfig {
    pub fn with_python<P: Into<PathBuf>>(mut self, python: P) -> Self {
        self.python = python.into();
        self
    }

    pub fn with_reconstruct_script<P: Into<PathBuf>>(mut self, script: P) -> Self {
        self.reconstruct_script = script.into();
        self
    }

    pub fn with_voxelizer<P: Into<PathBuf>>(mut self, voxelizer: P) -> Self {
        self.voxelizer = voxelizer.into();
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, output_dir: P) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    /// Directory the reconstruction step writes its first result into
    pub fn result_dir(&self) -> PathBuf {
        self.output_dir.join("0")
    }

    pub fn mesh_path(&self) -> PathBuf {
        self.result_dir().join("mesh.obj")
    }

    pub fn voxel_path(&self) -> PathBuf {
        self.result_dir().join("mesh_voxels.obj")
    }
}

/// Paths produced by a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    pub result_dir: PathBuf,
    pub mesh_path: PathBuf,
    pub voxel_path: PathBuf,
}

/// Two-stage image to voxel driver
pub struct Workflow {
    config: WorkflowConfig,
    log: LogFile,
}

impl Workflow {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            log: LogFile::silent(),
        }
    }

    pub fn with_log(mut self, log: LogFile) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Run reconstruction then voxelization for one image
    ///
    /// Stops at the first failing stage; the voxelizer is never started when
    /// reconstruction fails or leaves no mesh behind.
    pub fn run<P: AsRef<Path>>(&self, image: P) -> Result<WorkflowReport> {
        let image = image.as_ref();
        let config = &self.config;
        if !config.pitch.is_finite() || config.pitch <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "pitch must be positive, got {}",
                config.pitch
            )));
        }

        self.log
            .log(format!("=== Starting workflow for {} ===", image.display()))?;

        self.log.log("--- Step 1: Image to 3D ---")?;
        let mut reconstruct = Command::new(&config.python);
        reconstruct
            .arg(&config.reconstruct_script)
            .arg(image)
            .arg("--output-dir")
            .arg(&config.output_dir)
            .envs(RECONSTRUCTION_ENV);
        run_stage(RECONSTRUCTION_STAGE, &mut reconstruct)?;

        let mesh_path = config.mesh_path();
        if !mesh_path.is_file() {
            return Err(Error::MissingArtifact { path: mesh_path });
        }
        self.log.log(format!("Mesh written to {}", mesh_path.display()))?;

        self.log.log("--- Step 2: Voxelization ---")?;
        let voxel_path = config.voxel_path();
        let mut voxelize = Command::new(&config.voxelizer);
        voxelize
            .arg(&mesh_path)
            .arg("--pitch")
            .arg(config.pitch.to_string())
            .arg("--output")
            .arg(&voxel_path);
        run_stage(VOXELIZATION_STAGE, &mut voxelize)?;

        let report = WorkflowReport {
            result_dir: config.result_dir(),
            mesh_path,
            voxel_path,
        };
        self.log.log("=== Workflow complete ===")?;
        self.log
            .log(format!("Results are in: {}", report.result_dir.display()))?;
        self.log
            .log(format!("Voxel mesh: {}", report.voxel_path.display()))?;
        Ok(report)
    }
}

/// Run a child to completion, inheriting stdio
fn run_stage(stage: &'static str, command: &mut Command) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    let status = command
        .status()
        .map_err(|source| Error::ProcessSpawn { program, source })?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::StageFailed {
            stage,
            code: status.code(),
        })
    }
}
