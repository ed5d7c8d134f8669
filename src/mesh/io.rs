//! Mesh file format dispatch

use super::{obj, stl, Mesh};
use crate::{Error, LoadedGeometry, Result};
use std::path::Path;

/// Mesh file formats understood by the loader and writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// Wavefront OBJ, with optional per-vertex colors
    Obj,
    /// Stereolithography, geometry only
    Stl,
}

impl MeshFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "obj" => Ok(MeshFormat::Obj),
            "stl" => Ok(MeshFormat::Stl),
            "" => Err(Error::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(Error::UnsupportedFormat(format!(".{}", other))),
        }
    }

    /// Whether the format can store per-vertex colors
    pub fn supports_vertex_colors(self) -> bool {
        matches!(self, MeshFormat::Obj)
    }
}

pub(super) fn load(path: &Path) -> Result<LoadedGeometry> {
    match MeshFormat::from_path(path)? {
        MeshFormat::Obj => obj::load_obj(path),
        MeshFormat::Stl => Ok(LoadedGeometry::Mesh(stl::load_stl(path)?)),
    }
}

pub(super) fn save(mesh: &Mesh, path: &Path) -> Result<()> {
    match MeshFormat::from_path(path)? {
        MeshFormat::Obj => obj::save_obj(mesh, path),
        MeshFormat::Stl => stl::save_stl(mesh, path),
    }
}
