//! Error types for mesh-voxelizer

use std::path::PathBuf;
use thiserror::Error;

/// mesh-voxelizer error types
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File load error
    #[error("File load error: {0}")]
    FileLoad(String),

    /// File save error
    #[error("File save error: {0}")]
    FileSave(String),

    /// File extension not handled by any mesh codec
    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    /// Voxelization produced no occupied cells
    #[error("Voxelization is empty: {0}")]
    EmptyVoxelization(String),

    /// A file a previous stage should have produced is absent
    #[error("Expected artifact not found: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// A child process exited unsuccessfully
    #[error("Stage '{stage}' failed with exit code {}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    StageFailed {
        stage: &'static str,
        code: Option<i32>,
    },

    /// A child process could not be started
    #[error("Failed to start '{program}': {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Operation failed
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type alias for mesh-voxelizer operations
pub type Result<T> = std::result::Result<T, Error>;
