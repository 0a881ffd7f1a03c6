//! Core geometric types shared by grids, spaces and evaluators.

use serde::{Deserialize, Serialize};

/// A point (or vector) in 3D space
pub type Point3 = [f64; 3];

/// Component-wise difference `a - b`
#[inline]
pub fn sub(a: &Point3, b: &Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Dot product
#[inline]
pub fn dot(a: &Point3, b: &Point3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product
#[inline]
pub fn cross(a: &Point3, b: &Point3) -> Point3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean norm
#[inline]
pub fn norm(a: &Point3) -> f64 {
    dot(a, a).sqrt()
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: &Point3, b: &Point3) -> f64 {
    norm(&sub(a, b))
}

/// Geometry of a flat triangular element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementGeometry {
    /// Centroid
    pub center: Point3,
    /// Unit normal, following the vertex ordering (right-hand rule)
    pub normal: Point3,
    /// Element area
    pub area: f64,
    /// Longest edge length
    pub diameter: f64,
}

impl ElementGeometry {
    /// Compute the geometry of the triangle `(v0, v1, v2)`.
    ///
    /// Returns `None` for degenerate (zero-area) triangles.
    pub fn from_vertices(v0: &Point3, v1: &Point3, v2: &Point3) -> Option<Self> {
        let e1 = sub(v1, v0);
        let e2 = sub(v2, v0);
        let n = cross(&e1, &e2);
        let twice_area = norm(&n);

        let diameter = norm(&e1).max(norm(&e2)).max(distance(v2, v1));
        if twice_area.is_nan() || twice_area <= 1e-14 * diameter * diameter {
            return None;
        }

        Some(Self {
            center: [
                (v0[0] + v1[0] + v2[0]) / 3.0,
                (v0[1] + v1[1] + v2[1]) / 3.0,
                (v0[2] + v1[2] + v2[2]) / 3.0,
            ],
            normal: [n[0] / twice_area, n[1] / twice_area, n[2] / twice_area],
            area: 0.5 * twice_area,
            diameter,
        })
    }
}
