//! Multi-part geometry

use crate::Mesh;

/// Named mesh parts loaded from one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    parts: Vec<(String, Mesh)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_part(&mut self, name: impl Into<String>, mesh: Mesh) {
        self.parts.push((name.into(), mesh));
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn parts(&self) -> impl Iterator<Item = (&str, &Mesh)> {
        self.parts.iter().map(|(name, mesh)| (name.as_str(), mesh))
    }

    /// Concatenate every part into one mesh, discarding names
    pub fn dump(&self) -> Mesh {
        Mesh::concatenate(self.parts.iter().map(|(_, mesh)| mesh))
    }
}

/// What a mesh file turned out to contain
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedGeometry {
    Mesh(Mesh),
    Scene(Scene),
}

impl LoadedGeometry {
    pub fn is_scene(&self) -> bool {
        matches!(self, LoadedGeometry::Scene(_))
    }

    /// Single mesh, flattening a scene if needed
    pub fn into_mesh(self) -> Mesh {
        match self {
            LoadedGeometry::Mesh(mesh) => mesh,
            LoadedGeometry::Scene(scene) => scene.dump(),
        }
    }
}
