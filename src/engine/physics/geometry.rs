use std::f64::consts::TAU;

use super::body::Transform;
use crate::core::math::Vector2;

/// Generate the local-space vertices of a regular polygon centered on the origin.
///
/// Vertex `i` sits at angle `2π·i/point_count` on a circle of radius `size`,
/// so the winding is counter-clockwise. A zero `point_count` yields no vertices.
pub fn generate_polygon(point_count: usize, size: f64) -> Vec<Vector2> {
    (0..point_count)
        .map(|i| {
            let angle = TAU * i as f64 / point_count as f64;
            Vector2::new(angle.cos() * size, angle.sin() * size)
        })
        .collect()
}

/// Map local-space points to world space: scale, then rotate, then translate.
pub fn apply_transform(points: &[Vector2], transform: &Transform) -> Vec<Vector2> {
    let (sin, cos) = transform.rotation.to_radians().sin_cos();
    points
        .iter()
        .map(|p| {
            let x = p.x() * transform.scale;
            let y = p.y() * transform.scale;
            Vector2::new(x * cos - y * sin, x * sin + y * cos) + transform.position
        })
        .collect()
}

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector2,
    pub max: Vector2,
}

impl Aabb {
    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` for an empty slice
    pub fn from_points(points: &[Vector2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    /// Box around a circle of `radius` centered at `center`
    pub fn from_circle(center: Vector2, radius: f64) -> Self {
        let extent = Vector2::new(radius, radius);
        Self {
            min: center - extent,
            max: center + extent,
        }
    }

    /// Touching boxes count as overlapping.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x() < other.min.x()
            || other.max.x() < self.min.x()
            || self.max.y() < other.min.y()
            || other.max.y() < self.min.y())
    }

    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f64 {
        self.max.x() - self.min.x()
    }

    pub fn height(&self) -> f64 {
        self.max.y() - self.min.y()
    }
}
