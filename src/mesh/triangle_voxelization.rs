//! Triangle voxelization helpers

use crate::{Error, Result, VoxelGrid};
use nalgebra::Vector3;

use super::Mesh;

/// Cells are grown by this fraction of the pitch when testing overlap, so
/// triangles lying on a cell face are never lost to rounding
const CELL_SLACK: f32 = 2e-4;

impl Mesh {
    /// Voxelize the mesh surface at the given pitch
    ///
    /// The grid is aligned to the mesh bounding box: cell `(0, 0, 0)` starts at
    /// the box minimum and each axis gets `ceil(extent / pitch)` cells (at least
    /// one). A cell is occupied when any triangle overlaps it. Interior cells
    /// are left empty; see [`VoxelGrid::fill`].
    pub fn voxelized(&self, pitch: f32) -> Result<VoxelGrid> {
        if !pitch.is_finite() || pitch <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "pitch must be positive, got {}",
                pitch
            )));
        }
        if self.triangle_count() == 0 {
            return Err(Error::EmptyVoxelization(
                "mesh has no triangles".to_string(),
            ));
        }

        let bbox = self.bounding_box();
        let min = bbox.min();
        let extent = bbox.size();
        let cells = |e: f32| ((e / pitch - 1e-4).ceil() as usize).max(1);
        let shape = [cells(extent.x), cells(extent.y), cells(extent.z)];
        let origin = min + Vector3::repeat(pitch * 0.5);

        let mut grid = VoxelGrid::new(pitch, origin, shape)?;
        let half = pitch * (0.5 + CELL_SLACK);

        let cell_range = |lo: f32, hi: f32, axis: usize| {
            let first = ((lo - min[axis]) / pitch - CELL_SLACK).floor().max(0.0) as usize;
            let last = ((hi - min[axis]) / pitch + CELL_SLACK).floor().max(0.0) as usize;
            let limit = shape[axis] - 1;
            (first.min(limit), last.min(limit))
        };

        for index in 0..self.triangle_count() {
            let (a, b, c) = self.get_triangle_vertices(index)?;
            let lo = a.inf(&b).inf(&c);
            let hi = a.sup(&b).sup(&c);
            let (x0, x1) = cell_range(lo.x, hi.x, 0);
            let (y0, y1) = cell_range(lo.y, hi.y, 1);
            let (z0, z1) = cell_range(lo.z, hi.z, 2);

            for i in x0..=x1 {
                for j in y0..=y1 {
                    for k in z0..=z1 {
                        if grid.is_filled([i, j, k]) {
                            continue;
                        }
                        let center = grid.index_to_point([i, j, k]);
                        if triangle_box_overlap(center, half, a, b, c) {
                            grid.set([i, j, k], true);
                        }
                    }
                }
            }
        }

        Ok(grid)
    }
}

/// Separating-axis test between triangle `abc` and the cube at `center` with
/// half edge length `half`
pub fn triangle_box_overlap(
    center: Vector3<f32>,
    half: f32,
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
) -> bool {
    let v0 = a - center;
    let v1 = b - center;
    let v2 = c - center;

    // Box face normals
    for axis in 0..3 {
        let lo = v0[axis].min(v1[axis]).min(v2[axis]);
        let hi = v0[axis].max(v1[axis]).max(v2[axis]);
        if lo > half || hi < -half {
            return false;
        }
    }

    let e0 = v1 - v0;
    let e1 = v2 - v1;
    let e2 = v0 - v2;

    // Triangle plane
    let normal = e0.cross(&e1);
    let radius = half * normal.abs().sum();
    if normal.dot(&v0).abs() > radius {
        return false;
    }

    // Box axes crossed with triangle edges
    for edge in [e0, e1, e2] {
        for axis in 0..3 {
            let direction = Vector3::ith(axis, 1.0).cross(&edge);
            if direction.norm_squared() < 1e-20 {
                continue;
            }
            let p0 = direction.dot(&v0);
            let p1 = direction.dot(&v1);
            let p2 = direction.dot(&v2);
            let radius = half * direction.abs().sum();
            if p0.min(p1).min(p2) > radius || p0.max(p1).max(p2) < -radius {
                return false;
            }
        }
    }

    true
}
