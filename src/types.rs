//! Basic types for mesh-voxelizer

use nalgebra::Vector3;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Floating-point RGBA color
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorFloat {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorFloat {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn gray(value: f32, alpha: f32) -> Self {
        Self {
            r: value,
            g: value,
            b: value,
            a: alpha,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorRgb24 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorRgb24 {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Componentwise mean of three colors, truncated to 8 bits
    pub fn mean3(a: ColorRgb24, b: ColorRgb24, c: ColorRgb24) -> ColorRgb24 {
        let avg = |x: u8, y: u8, z: u8| ((x as f32 + y as f32 + z as f32) / 3.0) as u8;
        ColorRgb24 {
            r: avg(a.r, b.r, c.r),
            g: avg(a.g, b.g, c.g),
            b: avg(a.b, b.b, c.b),
        }
    }

    /// Attach an alpha channel
    pub fn with_alpha(self, a: u8) -> ColorRgba32 {
        ColorRgba32 {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

impl From<ColorFloat> for ColorRgb24 {
    fn from(value: ColorFloat) -> Self {
        Self {
            r: (value.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            g: (value.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            b: (value.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }
}

impl From<ColorRgb24> for ColorFloat {
    fn from(value: ColorRgb24) -> Self {
        ColorFloat::new(
            value.r as f32 / 255.0,
            value.g as f32 / 255.0,
            value.b as f32 / 255.0,
            1.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorRgba32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba32 {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Drop the alpha channel
    pub fn rgb(self) -> ColorRgb24 {
        ColorRgb24 {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

impl From<ColorFloat> for ColorRgba32 {
    fn from(value: ColorFloat) -> Self {
        Self {
            r: (value.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            g: (value.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            b: (value.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            a: (value.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }
}

impl From<ColorRgba32> for ColorFloat {
    fn from(value: ColorRgba32) -> Self {
        ColorFloat::new(
            value.r as f32 / 255.0,
            value.g as f32 / 255.0,
            value.b as f32 / 255.0,
            value.a as f32 / 255.0,
        )
    }
}

/// 3D Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BBox3 {
    min: Vector3<f32>,
    max: Vector3<f32>,
}

impl BBox3 {
    /// Create a new bounding box
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        debug_assert!(min.x <= max.x);
        debug_assert!(min.y <= max.y);
        debug_assert!(min.z <= max.z);
        Self { min, max }
    }

    /// Get minimum corner
    pub fn min(&self) -> Vector3<f32> {
        self.min
    }

    /// Get maximum corner
    pub fn max(&self) -> Vector3<f32> {
        self.max
    }

    /// Create an empty bounding box
    pub fn empty() -> Self {
        Self {
            min: Vector3::repeat(f32::MAX),
            max: Vector3::repeat(f32::MIN),
        }
    }

    /// Create a bounding box from center and size
    pub fn from_center_size(center: Vector3<f32>, size: Vector3<f32>) -> Self {
        let half_size = size * 0.5;
        Self::new(center - half_size, center + half_size)
    }

    /// Get the size of the bounding box
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Get the center of the bounding box
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Check if the bounding box is empty
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Check if a point is inside the bounding box
    pub fn contains(&self, point: Vector3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Expand the bounding box to include a point
    pub fn include_point(&mut self, point: Vector3<f32>) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Expand the bounding box to include another bounding box
    pub fn include_bbox(&mut self, other: &BBox3) {
        if other.is_empty() {
            return;
        }
        self.include_point(other.min());
        self.include_point(other.max());
    }

    /// Squared distance from a point to the box (zero inside)
    pub fn distance_squared(&self, point: Vector3<f32>) -> f32 {
        let below = (self.min - point).sup(&Vector3::zeros());
        let above = (point - self.max).sup(&Vector3::zeros());
        (below + above).norm_squared()
    }
}

impl fmt::Display for BBox3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Min: <{:.2}, {:.2}, {:.2}> | Max: <{:.2}, {:.2}, {:.2}>>",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    pub v0: u32,
    pub v1: u32,
    pub v2: u32,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self { v0, v1, v2 }
    }

    /// Get the indices as an array
    pub fn indices(&self) -> [u32; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Shift all indices by a constant
    pub fn offset(&self, by: u32) -> Triangle {
        Triangle::new(self.v0 + by, self.v1 + by, self.v2 + by)
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.v0, self.v1, self.v2)
    }
}
