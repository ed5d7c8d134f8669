//! Mesh to colored voxel conversion
//!
//! Loads a mesh file, voxelizes its surface, fills the interior and writes one
//! box per occupied cell. When the mesh carries per-vertex colors every box
//! takes the averaged color of the nearest surface triangle.

use crate::{
    ColorRgb24, Error, LoadedGeometry, LogFile, Mesh, MeshFormat, Result, SurfaceQuery, VoxelGrid,
};
use nalgebra::Vector3;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for a voxelization run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoxelizeOptions {
    /// Voxel edge length, in mesh units
    pub pitch: f32,
    /// Where to write the box mesh; nothing is written when `None`
    pub output: Option<PathBuf>,
}

impl Default for VoxelizeOptions {
    fn default() -> Self {
        Self {
            pitch: 0.01,
            output: None,
        }
    }
}

impl VoxelizeOptions {
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Voxelization driver
///
/// ```rust,no_run
/// use mesh_voxelizer::{LogFile, VoxelizeOptions, Voxelizer};
///
/// let options = VoxelizeOptions::default()
///     .with_pitch(0.02)
///     .with_output("mesh_voxels.obj");
/// let grid = Voxelizer::new(options)?
///     .with_log(LogFile::console())
///     .run("mesh.obj")?;
/// println!("{} voxels", grid.filled_count());
/// # Ok::<(), mesh_voxelizer::Error>(())
/// ```
pub struct Voxelizer {
    options: VoxelizeOptions,
    log: LogFile,
}

impl Voxelizer {
    pub fn new(options: VoxelizeOptions) -> Result<Self> {
        if !options.pitch.is_finite() || options.pitch <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "pitch must be positive, got {}",
                options.pitch
            )));
        }
        if let Some(output) = options.output.as_ref() {
            MeshFormat::from_path(output)?;
        }
        Ok(Self {
            options,
            log: LogFile::silent(),
        })
    }

    pub fn with_log(mut self, log: LogFile) -> Self {
        self.log = log;
        self
    }

    pub fn options(&self) -> &VoxelizeOptions {
        &self.options
    }

    /// Voxelize `input` and write the box mesh if an output path is set
    ///
    /// The filled grid is returned in every case.
    pub fn run<P: AsRef<Path>>(&self, input: P) -> Result<VoxelGrid> {
        let input = input.as_ref();
        let pitch = self.options.pitch;

        self.log.log(format!("Loading mesh from {}", input.display()))?;
        let loaded = Mesh::load(input)?;
        if let LoadedGeometry::Scene(scene) = &loaded {
            self.log.log(format!(
                "Input is a scene with {} parts, flattening",
                scene.part_count()
            ))?;
        }
        let mesh = loaded.into_mesh();
        self.log.log(format!(
            "Loaded {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        ))?;

        let has_colors = mesh.has_vertex_colors();
        self.log.log(format!("Mesh has vertex colors: {}", has_colors))?;

        self.log.log(format!("Voxelizing with pitch {}", pitch))?;
        let grid = mesh.voxelized(pitch)?.fill();
        let filled = grid.filled_count();
        if filled == 0 {
            return Err(Error::EmptyVoxelization(format!(
                "no occupied cells at pitch {}",
                pitch
            )));
        }
        let [nx, ny, nz] = grid.shape();
        self.log.log(format!("Voxel grid shape: {} x {} x {}", nx, ny, nz))?;
        self.log.log(format!("Filled voxels: {}", filled))?;

        let points = grid.points();
        self.log.log(format!("Voxel centers: {}", points.len()))?;

        let Some(output) = self.options.output.as_ref() else {
            self.log.log("No output path, skipping box mesh")?;
            return Ok(grid);
        };

        let boxes = if has_colors {
            self.log.log("Sampling surface colors at voxel centers")?;
            let colors = sample_face_colors(&mesh, &points)?;
            let boxes = grid.as_colored_boxes(&colors)?;
            self.log.log(format!("Created {} colored cubes", colors.len()))?;
            boxes
        } else {
            self.log.log("No vertex colors, writing uncolored boxes")?;
            let boxes = grid.as_boxes()?;
            self.log.log(format!("Created {} boxes", filled))?;
            boxes
        };

        if has_colors && !MeshFormat::from_path(output)?.supports_vertex_colors() {
            self.log.log(format!(
                "{} cannot store vertex colors, colors are dropped",
                output.display()
            ))?;
        }
        boxes.save(output)?;
        self.log.log(format!("Saved voxel mesh to {}", output.display()))?;

        Ok(grid)
    }
}

/// RGB color of the nearest surface triangle for every point
///
/// Each color is the componentwise mean of the triangle's three vertex colors,
/// truncated to 8 bits. Equidistant triangles resolve to the lowest index.
pub fn sample_face_colors(mesh: &Mesh, points: &[Vector3<f32>]) -> Result<Vec<ColorRgb24>> {
    let vertex_colors = mesh
        .vertex_colors()
        .filter(|_| mesh.has_vertex_colors())
        .ok_or_else(|| Error::InvalidParameter("mesh has no vertex colors".to_string()))?;

    let query = SurfaceQuery::new(mesh)?;
    points
        .iter()
        .map(|&point| {
            let hit = query.nearest(point).ok_or_else(|| {
                Error::OperationFailed(format!(
                    "no surface found near ({}, {}, {})",
                    point.x, point.y, point.z
                ))
            })?;
            let triangle = mesh.get_triangle(hit.face).ok_or_else(|| {
                Error::OperationFailed(format!("face {} out of range", hit.face))
            })?;
            let [a, b, c] = triangle
                .indices()
                .map(|i| vertex_colors[i as usize].rgb());
            Ok(ColorRgb24::mean3(a, b, c))
        })
        .collect()
}

/// Voxelize a mesh file with a silent log
pub fn voxelize<P: AsRef<Path>>(input: P, pitch: f32, output: Option<&Path>) -> Result<VoxelGrid> {
    let options = VoxelizeOptions {
        pitch,
        output: output.map(Path::to_path_buf),
    };
    Voxelizer::new(options)?.run(input)
}
