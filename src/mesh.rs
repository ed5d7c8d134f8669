//! Triangle mesh representation

use crate::{BBox3, ColorRgba32, Error, LoadedGeometry, Result, Triangle};
use nalgebra::Vector3;
use std::path::Path;

mod io; // Format dispatch
mod math; // Mesh math helpers
mod nearest; // Closest-point queries
mod obj; // Wavefront OBJ codec
mod stl; // STL codec
mod triangle_voxelization; // Surface voxelization

pub use io::MeshFormat;
pub use nearest::{closest_point_on_triangle, SurfaceHit, SurfaceQuery};

/// Color given to vertices added to a colored mesh without an explicit color
pub const DEFAULT_VERTEX_COLOR: ColorRgba32 = ColorRgba32 {
    r: 102,
    g: 102,
    b: 102,
    a: 255,
};

/// Triangle mesh
///
/// Vertex positions, index triangles and an optional per-vertex color
/// attribute. When present, the color attribute holds exactly one entry per
/// vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vector3<f32>>,
    triangles: Vec<Triangle>,
    vertex_colors: Option<Vec<ColorRgba32>>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from raw buffers, validating indices and color length
    pub fn from_parts(
        vertices: Vec<Vector3<f32>>,
        triangles: Vec<Triangle>,
        vertex_colors: Option<Vec<ColorRgba32>>,
    ) -> Result<Self> {
        let count = vertices.len();
        if let Some(bad) = triangles
            .iter()
            .find(|t| t.indices().iter().any(|&i| i as usize >= count))
        {
            return Err(Error::InvalidParameter(format!(
                "Triangle {} references a vertex outside 0..{}",
                bad, count
            )));
        }
        if let Some(colors) = vertex_colors.as_ref() {
            if colors.len() != count {
                return Err(Error::InvalidParameter(format!(
                    "Expected {} vertex colors, got {}",
                    count,
                    colors.len()
                )));
            }
        }
        Ok(Self {
            vertices,
            triangles,
            vertex_colors: vertex_colors.filter(|c| !c.is_empty()),
        })
    }

    /// Create a cube mesh from a bounding box
    ///
    /// 8 vertices and 12 outward-facing triangles.
    pub fn from_bbox(bbox: &BBox3) -> Self {
        let mut mesh = Mesh::new();

        let size = bbox.size();
        let center = bbox.center();
        let half = size * 0.5;

        let vertices = [
            Vector3::new(-half.x, -half.y, -half.z) + center,
            Vector3::new(-half.x, -half.y, half.z) + center,
            Vector3::new(-half.x, half.y, -half.z) + center,
            Vector3::new(-half.x, half.y, half.z) + center,
            Vector3::new(half.x, -half.y, -half.z) + center,
            Vector3::new(half.x, -half.y, half.z) + center,
            Vector3::new(half.x, half.y, -half.z) + center,
            Vector3::new(half.x, half.y, half.z) + center,
        ];

        let indices: Vec<u32> = vertices.iter().map(|v| mesh.add_vertex(*v)).collect();

        let add_tri = |mesh: &mut Mesh, a: usize, b: usize, c: usize| {
            mesh.add_triangle(Triangle::new(indices[a], indices[b], indices[c]));
        };

        // -X
        add_tri(&mut mesh, 0, 1, 3);
        add_tri(&mut mesh, 0, 3, 2);

        // +X
        add_tri(&mut mesh, 4, 6, 7);
        add_tri(&mut mesh, 4, 7, 5);

        // -Y
        add_tri(&mut mesh, 0, 4, 5);
        add_tri(&mut mesh, 0, 5, 1);

        // +Y
        add_tri(&mut mesh, 2, 3, 7);
        add_tri(&mut mesh, 2, 7, 6);

        // -Z
        add_tri(&mut mesh, 0, 2, 6);
        add_tri(&mut mesh, 0, 6, 4);

        // +Z
        add_tri(&mut mesh, 1, 5, 7);
        add_tri(&mut mesh, 1, 7, 3);

        mesh
    }

    /// Axis-aligned box centered at the origin
    pub fn box_with_extents(extents: Vector3<f32>) -> Self {
        Self::from_bbox(&BBox3::from_center_size(Vector3::zeros(), extents))
    }

    /// Add a vertex
    ///
    /// Returns the vertex index. On a colored mesh the new vertex receives
    /// [`DEFAULT_VERTEX_COLOR`].
    pub fn add_vertex(&mut self, pos: Vector3<f32>) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(pos);
        if let Some(colors) = self.vertex_colors.as_mut() {
            colors.push(DEFAULT_VERTEX_COLOR);
        }
        index
    }

    /// Add a triangle
    ///
    /// Returns the triangle index.
    pub fn add_triangle(&mut self, tri: Triangle) -> u32 {
        let index = self.triangles.len() as u32;
        self.triangles.push(tri);
        index
    }

    /// Add a triangle by vertex indices
    pub fn add_triangle_indices(&mut self, a: u32, b: u32, c: u32) -> u32 {
        self.add_triangle(Triangle::new(a, b, c))
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertices(&self) -> &[Vector3<f32>] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Get a vertex by index
    pub fn get_vertex(&self, index: usize) -> Option<Vector3<f32>> {
        self.vertices.get(index).copied()
    }

    /// Get a triangle by index
    pub fn get_triangle(&self, index: usize) -> Option<Triangle> {
        self.triangles.get(index).copied()
    }

    /// Get the three corner positions of a triangle
    pub fn get_triangle_vertices(
        &self,
        index: usize,
    ) -> Result<(Vector3<f32>, Vector3<f32>, Vector3<f32>)> {
        let tri = self.get_triangle(index).ok_or_else(|| {
            Error::InvalidParameter(format!("Triangle index {} out of range", index))
        })?;
        let corner = |i: u32| {
            self.get_vertex(i as usize)
                .ok_or_else(|| Error::OperationFailed("Invalid vertex index".to_string()))
        };
        Ok((corner(tri.v0)?, corner(tri.v1)?, corner(tri.v2)?))
    }

    /// Per-vertex colors, if the mesh carries them
    pub fn vertex_colors(&self) -> Option<&[ColorRgba32]> {
        self.vertex_colors.as_deref()
    }

    /// True when a non-empty per-vertex color attribute is attached
    pub fn has_vertex_colors(&self) -> bool {
        self.vertex_colors
            .as_ref()
            .is_some_and(|c| !c.is_empty() && c.len() == self.vertices.len())
    }

    /// Attach per-vertex colors (one per vertex)
    pub fn set_vertex_colors(&mut self, colors: Vec<ColorRgba32>) -> Result<()> {
        if colors.len() != self.vertices.len() {
            return Err(Error::InvalidParameter(format!(
                "Expected {} vertex colors, got {}",
                self.vertices.len(),
                colors.len()
            )));
        }
        self.vertex_colors = Some(colors);
        Ok(())
    }

    /// Color every vertex the same
    pub fn set_uniform_color(&mut self, color: ColorRgba32) {
        self.vertex_colors = Some(vec![color; self.vertices.len()]);
    }

    /// Remove the color attribute
    pub fn clear_vertex_colors(&mut self) {
        self.vertex_colors = None;
    }

    /// Move every vertex by `offset`
    pub fn translate(&mut self, offset: Vector3<f32>) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Append another mesh, re-indexing its triangles
    ///
    /// Colors survive only when both meshes carry them (or this mesh is empty).
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        let colors = match (self.vertices.is_empty(), self.vertex_colors.take(), &other.vertex_colors) {
            (true, _, Some(theirs)) => Some(theirs.clone()),
            (false, Some(mut ours), Some(theirs)) => {
                ours.extend_from_slice(theirs);
                Some(ours)
            }
            _ => None,
        };

        self.vertices.extend_from_slice(&other.vertices);
        self.triangles
            .extend(other.triangles.iter().map(|t| t.offset(base)));
        self.vertex_colors = colors;
    }

    /// Concatenate meshes into one
    pub fn concatenate<'a, I>(meshes: I) -> Mesh
    where
        I: IntoIterator<Item = &'a Mesh>,
    {
        let mut result = Mesh::new();
        for mesh in meshes {
            result.append(mesh);
        }
        result
    }

    /// Get the bounding box of the mesh
    pub fn bounding_box(&self) -> BBox3 {
        let mut bbox = BBox3::empty();
        for v in &self.vertices {
            bbox.include_point(*v);
        }
        bbox
    }

    /// Load a mesh file, format chosen by extension
    ///
    /// Multi-object files come back as [`LoadedGeometry::Scene`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LoadedGeometry> {
        io::load(path.as_ref())
    }

    /// Load a mesh file and flatten any scene into a single mesh
    pub fn load_flattened<P: AsRef<Path>>(path: P) -> Result<Mesh> {
        Ok(Self::load(path)?.into_mesh())
    }

    /// Save to a file, format chosen by extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        io::save(self, path.as_ref())
    }

    /// Save to a Wavefront OBJ file
    pub fn save_obj<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        obj::save_obj(self, path.as_ref())
    }

    /// Save to a binary STL file
    pub fn save_stl<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        stl::save_stl(self, path.as_ref())
    }

    /// Load from an STL file (binary or ASCII)
    pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<Self> {
        stl::load_stl(path.as_ref())
    }
}
