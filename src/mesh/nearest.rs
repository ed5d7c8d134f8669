//! Closest-point queries against a mesh surface

use crate::{BBox3, Error, Mesh, Result};
use nalgebra::Vector3;

const LEAF_SIZE: usize = 8;

/// Closest point on triangle `abc` to `point`
pub fn closest_point_on_triangle(
    point: Vector3<f32>,
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
) -> Vector3<f32> {
    let ab = b - a;
    let ac = c - a;
    let ap = point - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = point - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + v * ab;
    }

    let cp = point - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + w * ac;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + w * (c - b);
    }

    let denom = 1.0 / (va + vb + vc);
    let v_ab = vb * denom;
    let v_ac = vc * denom;
    a + v_ab * ab + v_ac * ac
}

/// Result of a nearest-surface query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Closest point on the surface
    pub point: Vector3<f32>,
    /// Distance from the query point
    pub distance: f32,
    /// Index of the triangle the point lies on
    pub face: usize,
}

enum Node {
    Leaf {
        bounds: BBox3,
        start: usize,
        end: usize,
    },
    Branch {
        bounds: BBox3,
        left: usize,
        right: usize,
    },
}

impl Node {
    fn bounds(&self) -> &BBox3 {
        match self {
            Node::Leaf { bounds, .. } | Node::Branch { bounds, .. } => bounds,
        }
    }
}

/// Bounding-volume tree over the triangles of a mesh
///
/// Among equidistant triangles the one with the lowest index wins, so results
/// do not depend on tree layout.
pub struct SurfaceQuery {
    corners: Vec<[Vector3<f32>; 3]>,
    order: Vec<u32>,
    nodes: Vec<Node>,
}

impl SurfaceQuery {
    pub fn new(mesh: &Mesh) -> Result<Self> {
        let mut corners = Vec::with_capacity(mesh.triangle_count());
        for index in 0..mesh.triangle_count() {
            let (a, b, c) = mesh.get_triangle_vertices(index)?;
            corners.push([a, b, c]);
        }
        if corners.len() > u32::MAX as usize {
            return Err(Error::InvalidParameter(
                "Too many triangles for a surface query".to_string(),
            ));
        }

        let mut bounds = Vec::with_capacity(corners.len());
        let mut centroids = Vec::with_capacity(corners.len());
        for [a, b, c] in &corners {
            let mut bbox = BBox3::empty();
            bbox.include_point(*a);
            bbox.include_point(*b);
            bbox.include_point(*c);
            bounds.push(bbox);
            centroids.push((a + b + c) / 3.0);
        }

        let mut query = Self {
            order: (0..corners.len() as u32).collect(),
            corners,
            nodes: Vec::new(),
        };
        if !query.corners.is_empty() {
            query.build(0, query.order.len(), &bounds, &centroids);
        }
        Ok(query)
    }

    fn build(
        &mut self,
        start: usize,
        end: usize,
        tri_bounds: &[BBox3],
        centroids: &[Vector3<f32>],
    ) -> usize {
        let mut bounds = BBox3::empty();
        let mut centroid_bounds = BBox3::empty();
        for &t in &self.order[start..end] {
            bounds.include_bbox(&tri_bounds[t as usize]);
            centroid_bounds.include_point(centroids[t as usize]);
        }

        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { bounds, start, end });
        if end - start <= LEAF_SIZE {
            return index;
        }

        let size = centroid_bounds.size();
        let axis = if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        };
        let mid = (start + end) / 2;
        self.order[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
            centroids[a as usize][axis]
                .total_cmp(&centroids[b as usize][axis])
                .then(a.cmp(&b))
        });

        let left = self.build(start, mid, tri_bounds, centroids);
        let right = self.build(mid, end, tri_bounds, centroids);
        self.nodes[index] = Node::Branch {
            bounds,
            left,
            right,
        };
        index
    }

    pub fn triangle_count(&self) -> usize {
        self.corners.len()
    }

    /// Nearest point on the surface, `None` for a mesh without triangles
    pub fn nearest(&self, point: Vector3<f32>) -> Option<SurfaceHit> {
        if self.nodes.is_empty() {
            return None;
        }

        // (squared distance, face, closest point)
        let mut best: Option<(f32, usize, Vector3<f32>)> = None;
        let mut stack = vec![0usize];

        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            if let Some((best_d2, _, _)) = best {
                if node.bounds().distance_squared(point) > best_d2 {
                    continue;
                }
            }

            match node {
                Node::Leaf { start, end, .. } => {
                    for &t in &self.order[*start..*end] {
                        let face = t as usize;
                        let [a, b, c] = self.corners[face];
                        let closest = closest_point_on_triangle(point, a, b, c);
                        let d2 = (point - closest).norm_squared();
                        if !d2.is_finite() {
                            continue;
                        }
                        let better = match best {
                            None => true,
                            Some((best_d2, best_face, _)) => {
                                d2 < best_d2 || (d2 == best_d2 && face < best_face)
                            }
                        };
                        if better {
                            best = Some((d2, face, closest));
                        }
                    }
                }
                Node::Branch { left, right, .. } => {
                    let dl = self.nodes[*left].bounds().distance_squared(point);
                    let dr = self.nodes[*right].bounds().distance_squared(point);
                    // Nearer child is popped first
                    if dl <= dr {
                        stack.push(*right);
                        stack.push(*left);
                    } else {
                        stack.push(*left);
                        stack.push(*right);
                    }
                }
            }
        }

        best.map(|(d2, face, point)| SurfaceHit {
            point,
            distance: d2.sqrt(),
            face,
        })
    }
}
