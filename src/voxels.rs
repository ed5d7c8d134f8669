//! Dense voxel occupancy grid

use crate::{BBox3, ColorRgb24, ColorRgba32, Error, Mesh, Result, Triangle};
use nalgebra::Vector3;
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest grid accepted, in cells
pub const MAX_GRID_CELLS: usize = 1 << 31;

/// Regular lattice of cubic cells with a boolean occupancy matrix
///
/// The matrix is stored in C order (`k` fastest). `origin` is the world-space
/// center of cell `(0, 0, 0)`; cell `(i, j, k)` is centered at
/// `origin + pitch * (i, j, k)`.
///
/// # Example
///
/// ```rust
/// use mesh_voxelizer::{BBox3, Mesh};
/// use nalgebra::Vector3;
///
/// let cube = Mesh::from_bbox(&BBox3::new(Vector3::zeros(), Vector3::repeat(1.0)));
/// let grid = cube.voxelized(0.25)?.fill();
/// assert_eq!(grid.filled_count(), 64);
/// assert_eq!(grid.points().len(), grid.filled_count());
/// # Ok::<(), mesh_voxelizer::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoxelGrid {
    pitch: f32,
    origin: Vector3<f32>,
    shape: [usize; 3],
    matrix: Vec<bool>,
}

impl VoxelGrid {
    /// Create an empty grid
    pub fn new(pitch: f32, origin: Vector3<f32>, shape: [usize; 3]) -> Result<Self> {
        if !pitch.is_finite() || pitch <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "pitch must be positive, got {}",
                pitch
            )));
        }
        let cells = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .filter(|&n| n > 0 && n <= MAX_GRID_CELLS)
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "grid of {}x{}x{} cells is empty or too large; increase the pitch",
                    shape[0], shape[1], shape[2]
                ))
            })?;
        Ok(Self {
            pitch,
            origin,
            shape,
            matrix: vec![false; cells],
        })
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn origin(&self) -> Vector3<f32> {
        self.origin
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Occupancy in C order
    pub fn matrix(&self) -> &[bool] {
        &self.matrix
    }

    fn linear_index(&self, [i, j, k]: [usize; 3]) -> Option<usize> {
        let [nx, ny, nz] = self.shape;
        if i < nx && j < ny && k < nz {
            Some((i * ny + j) * nz + k)
        } else {
            None
        }
    }

    fn cell_index(&self, linear: usize) -> [usize; 3] {
        let [_, ny, nz] = self.shape;
        [linear / (ny * nz), (linear / nz) % ny, linear % nz]
    }

    /// Occupancy of a cell; cells outside the grid are empty
    pub fn is_filled(&self, index: [usize; 3]) -> bool {
        self.linear_index(index)
            .is_some_and(|linear| self.matrix[linear])
    }

    /// Set a cell; indices outside the grid are ignored
    pub fn set(&mut self, index: [usize; 3], value: bool) {
        if let Some(linear) = self.linear_index(index) {
            self.matrix[linear] = value;
        }
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.matrix.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.matrix.iter().any(|&v| v)
    }

    /// Indices of occupied cells in C order
    pub fn filled_indices(&self) -> Vec<[usize; 3]> {
        self.matrix
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(|(linear, _)| self.cell_index(linear))
            .collect()
    }

    /// World-space center of a cell
    pub fn index_to_point(&self, [i, j, k]: [usize; 3]) -> Vector3<f32> {
        self.origin + Vector3::new(i as f32, j as f32, k as f32) * self.pitch
    }

    /// World-space centers of occupied cells, in C order
    pub fn points(&self) -> Vec<Vector3<f32>> {
        self.filled_indices()
            .into_iter()
            .map(|index| self.index_to_point(index))
            .collect()
    }

    /// Outer bounds of the whole lattice
    pub fn bounds(&self) -> BBox3 {
        let half = Vector3::repeat(self.pitch * 0.5);
        let last = self.index_to_point([
            self.shape[0] - 1,
            self.shape[1] - 1,
            self.shape[2] - 1,
        ]);
        BBox3::new(self.origin - half, last + half)
    }

    /// Mark enclosed empty cells as occupied
    ///
    /// Empty cells reachable from the grid boundary through face-adjacent
    /// empty cells are exterior; every other cell ends up occupied.
    pub fn fill(mut self) -> Self {
        let [nx, ny, nz] = self.shape;
        let mut exterior = vec![false; self.matrix.len()];
        let mut queue = VecDeque::new();

        for linear in 0..self.matrix.len() {
            let [i, j, k] = self.cell_index(linear);
            let on_boundary =
                i == 0 || j == 0 || k == 0 || i == nx - 1 || j == ny - 1 || k == nz - 1;
            if on_boundary && !self.matrix[linear] {
                exterior[linear] = true;
                queue.push_back(linear);
            }
        }

        while let Some(linear) = queue.pop_front() {
            let [i, j, k] = self.cell_index(linear);
            let neighbors = [
                i.checked_sub(1).map(|i| [i, j, k]),
                Some([i + 1, j, k]),
                j.checked_sub(1).map(|j| [i, j, k]),
                Some([i, j + 1, k]),
                k.checked_sub(1).map(|k| [i, j, k]),
                Some([i, j, k + 1]),
            ];
            for neighbor in neighbors.into_iter().flatten() {
                if let Some(n) = self.linear_index(neighbor) {
                    if !self.matrix[n] && !exterior[n] {
                        exterior[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }

        for (cell, outside) in self.matrix.iter_mut().zip(exterior) {
            *cell = !outside;
        }
        self
    }

    /// One uncolored box per occupied cell
    pub fn as_boxes(&self) -> Result<Mesh> {
        boxes_at(&self.points(), self.pitch, None)
    }

    /// One box per occupied cell, colored with the matching entry of `colors`
    /// (alpha 255)
    pub fn as_colored_boxes(&self, colors: &[ColorRgb24]) -> Result<Mesh> {
        let points = self.points();
        if colors.len() != points.len() {
            return Err(Error::InvalidParameter(format!(
                "Expected {} voxel colors, got {}",
                points.len(),
                colors.len()
            )));
        }
        let rgba: Vec<ColorRgba32> = colors.iter().map(|c| c.with_alpha(255)).collect();
        boxes_at(&points, self.pitch, Some(&rgba))
    }
}

/// Concatenate a pitch-sized cube at every center
fn boxes_at(
    centers: &[Vector3<f32>],
    pitch: f32,
    colors: Option<&[ColorRgba32]>,
) -> Result<Mesh> {
    let cube = Mesh::box_with_extents(Vector3::repeat(pitch));
    let per_box = cube.vertex_count();

    let mut vertices = Vec::with_capacity(centers.len() * per_box);
    let mut triangles = Vec::with_capacity(centers.len() * cube.triangle_count());
    let mut vertex_colors = colors.map(|_| Vec::with_capacity(centers.len() * per_box));

    for (n, center) in centers.iter().enumerate() {
        let base = vertices.len() as u32;
        vertices.extend(cube.vertices().iter().map(|v| v + center));
        triangles.extend(cube.triangles().iter().map(|t: &Triangle| t.offset(base)));
        if let (Some(out), Some(colors)) = (vertex_colors.as_mut(), colors) {
            out.extend(std::iter::repeat(colors[n]).take(per_box));
        }
    }

    Mesh::from_parts(vertices, triangles, vertex_colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hollow_shell(n: usize) -> VoxelGrid {
        let mut grid = VoxelGrid::new(1.0, Vector3::zeros(), [n, n, n]).unwrap();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let edge = |x: usize| x == 0 || x == n - 1;
                    if edge(i) || edge(j) || edge(k) {
                        grid.set([i, j, k], true);
                    }
                }
            }
        }
        grid
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(VoxelGrid::new(0.0, Vector3::zeros(), [1, 1, 1]).is_err());
        assert!(VoxelGrid::new(1.0, Vector3::zeros(), [0, 1, 1]).is_err());
        assert!(VoxelGrid::new(1.0, Vector3::zeros(), [usize::MAX, 2, 2]).is_err());
        assert!(VoxelGrid::new(1.0, Vector3::zeros(), [2048, 2048, 2048]).is_err());
    }

    #[test]
    fn test_index_order_and_points() {
        let mut grid = VoxelGrid::new(0.5, Vector3::new(1.0, 2.0, 3.0), [2, 3, 4]).unwrap();
        grid.set([1, 2, 3], true);
        grid.set([0, 0, 1], true);
        assert_eq!(grid.filled_indices(), vec![[0, 0, 1], [1, 2, 3]]);
        let points = grid.points();
        assert_eq!(points[0], Vector3::new(1.0, 2.0, 3.5));
        assert_eq!(points[1], Vector3::new(1.5, 3.0, 4.5));
        assert!(!grid.is_filled([5, 0, 0]));
    }

    #[test]
    fn test_fill_closes_hollow_shell() {
        let grid = hollow_shell(5);
        assert_eq!(grid.filled_count(), 125 - 27);
        let filled = grid.fill();
        assert_eq!(filled.filled_count(), 125);
        assert_eq!(filled.points().len(), filled.filled_count());
    }

    #[test]
    fn test_fill_leaves_open_shell() {
        let mut grid = hollow_shell(5);
        // Punch a hole through one wall
        grid.set([0, 2, 2], false);
        let filled = grid.fill();
        assert_eq!(filled.filled_count(), 125 - 27 - 1);
    }

    #[test]
    fn test_as_boxes_one_box_per_cell() {
        let grid = hollow_shell(3).fill();
        let boxes = grid.as_boxes().unwrap();
        assert_eq!(boxes.vertex_count(), 27 * 8);
        assert_eq!(boxes.triangle_count(), 27 * 12);
        assert!(!boxes.has_vertex_colors());

        let bounds = boxes.bounding_box();
        assert_eq!(bounds, grid.bounds());
    }

    #[test]
    fn test_as_colored_boxes() {
        let mut grid = VoxelGrid::new(0.5, Vector3::zeros(), [2, 1, 1]).unwrap();
        grid.set([0, 0, 0], true);
        grid.set([1, 0, 0], true);
        let colors = [ColorRgb24::new(255, 0, 0), ColorRgb24::new(0, 0, 255)];
        let mesh = grid.as_colored_boxes(&colors).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        let vertex_colors = mesh.vertex_colors().unwrap();
        assert_eq!(vertex_colors[0], ColorRgba32::new(255, 0, 0, 255));
        assert_eq!(vertex_colors[15], ColorRgba32::new(0, 0, 255, 255));
        assert_eq!(vertex_colors.len(), mesh.vertex_count());
        assert!(mesh.has_vertex_colors());
        assert_eq!(mesh.get_triangle(12), Some(Triangle::new(8, 9, 11)));

        assert!(grid.as_colored_boxes(&colors[..1]).is_err());
    }
}
