//! # mesh-voxelizer
//!
//! Colored voxelization of triangle meshes, plus a driver that chains an
//! external image-to-mesh reconstruction step with voxelization.
//!
//! ## Features
//!
//! - **Mesh I/O**: Wavefront OBJ with per-vertex colors and multi-object
//!   scenes, binary and ASCII STL
//! - **Voxelization**: surface voxelization on a bounding-box aligned grid with
//!   interior fill
//! - **Color sampling**: every voxel takes the color of the nearest surface
//!   triangle
//! - **Workflow**: reconstruction and voxelization as sequential child
//!   processes
//!
//! ## Example
//!
//! ```rust,no_run
//! use mesh_voxelizer::{voxelize, Mesh};
//! use std::path::Path;
//!
//! let grid = voxelize("mesh.obj", 0.02, Some(Path::new("mesh_voxels.obj")))?;
//! println!("{} voxels in a {:?} grid", grid.filled_count(), grid.shape());
//!
//! let boxes = Mesh::load_flattened("mesh_voxels.obj")?;
//! assert_eq!(boxes.vertex_count(), 8 * grid.filled_count());
//! # Ok::<(), mesh_voxelizer::Error>(())
//! ```

pub mod error;
pub mod log;
pub mod mesh;
pub mod scene;
pub mod types;
pub mod utils;
pub mod voxelize;
pub mod voxels;
pub mod workflow;

// Re-exports
pub use error::{Error, Result};
pub use log::LogFile;
pub use mesh::{closest_point_on_triangle, Mesh, MeshFormat, SurfaceHit, SurfaceQuery};
pub use scene::{LoadedGeometry, Scene};
pub use types::{BBox3, ColorFloat, ColorRgb24, ColorRgba32, Triangle};
pub use utils::{TempFolder, Utils};
pub use voxelize::{sample_face_colors, voxelize, VoxelizeOptions, Voxelizer};
pub use voxels::VoxelGrid;
pub use workflow::{Workflow, WorkflowConfig, WorkflowReport};
