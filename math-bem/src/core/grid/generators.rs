//! Grid generators for standard geometries
//!
//! Spheres (icosahedral and latitude/longitude), flat structured
//! rectangles, and grids assembled from raw element data. All generated
//! triangles are oriented counter-clockwise when seen from outside, so the
//! element normals point outward.

use std::collections::HashMap;
use std::f64::consts::PI;

use ndarray::Array2;

use crate::core::error::{BemError, Result};
use crate::core::grid::Grid;
use crate::core::types::Point3;

/// Generate an icosphere grid (subdivided icosahedron)
///
/// Element sizes are more uniform than on a UV-sphere.
///
/// # Arguments
/// * `subdivisions` - Number of refinement steps (0 = 20 triangles, each step ×4)
/// * `radius` - Sphere radius
/// * `origin` - Sphere centre
pub fn grid_from_sphere(subdivisions: usize, radius: f64, origin: Point3) -> Result<Grid> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(BemError::InvalidParameters(format!(
            "sphere radius must be positive, got {}",
            radius
        )));
    }

    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let mut vertices: Vec<Point3> = vec![
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ];
    for v in &mut vertices {
        *v = normalized(v);
    }

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut refined = Vec::with_capacity(faces.len() * 4);
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();

        for &[v0, v1, v2] in &faces {
            let m01 = sphere_midpoint(&mut vertices, &mut midpoints, v0, v1);
            let m12 = sphere_midpoint(&mut vertices, &mut midpoints, v1, v2);
            let m20 = sphere_midpoint(&mut vertices, &mut midpoints, v2, v0);

            refined.push([v0, m01, m20]);
            refined.push([v1, m12, m01]);
            refined.push([v2, m20, m12]);
            refined.push([m01, m12, m20]);
        }

        faces = refined;
    }

    let points: Vec<Point3> = vertices
        .iter()
        .map(|v| {
            [
                origin[0] + radius * v[0],
                origin[1] + radius * v[1],
                origin[2] + radius * v[2],
            ]
        })
        .collect();

    Grid::new(to_array(&points), faces, vec![])
}

/// Get or create the unit-sphere midpoint of edge `(v0, v1)`
fn sphere_midpoint(
    vertices: &mut Vec<Point3>,
    cache: &mut HashMap<(usize, usize), usize>,
    v0: usize,
    v1: usize,
) -> usize {
    let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let a = vertices[v0];
    let b = vertices[v1];
    let mid = normalized(&[
        (a[0] + b[0]) / 2.0,
        (a[1] + b[1]) / 2.0,
        (a[2] + b[2]) / 2.0,
    ]);

    let idx = vertices.len();
    vertices.push(mid);
    cache.insert(key, idx);
    idx
}

fn normalized(v: &Point3) -> Point3 {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Generate a sphere grid with vertices on latitude/longitude lines
///
/// # Arguments
/// * `radius` - Sphere radius (centred at the origin)
/// * `n_theta` - Number of polar divisions (>= 2)
/// * `n_phi` - Number of azimuthal divisions (>= 3)
pub fn uv_sphere_grid(radius: f64, n_theta: usize, n_phi: usize) -> Result<Grid> {
    if n_theta < 2 || n_phi < 3 {
        return Err(BemError::InvalidParameters(format!(
            "UV sphere needs n_theta >= 2 and n_phi >= 3, got {} x {}",
            n_theta, n_phi
        )));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(BemError::InvalidParameters(format!(
            "sphere radius must be positive, got {}",
            radius
        )));
    }

    let mut points = Vec::with_capacity(2 + (n_theta - 1) * n_phi);
    let mut faces = Vec::new();

    // North pole
    points.push([0.0, 0.0, radius]);

    for i in 1..n_theta {
        let theta = PI * i as f64 / n_theta as f64;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for j in 0..n_phi {
            let phi = 2.0 * PI * j as f64 / n_phi as f64;
            points.push([
                radius * sin_theta * phi.cos(),
                radius * sin_theta * phi.sin(),
                radius * cos_theta,
            ]);
        }
    }

    // South pole
    points.push([0.0, 0.0, -radius]);
    let south_pole = points.len() - 1;

    for j in 0..n_phi {
        let j_next = (j + 1) % n_phi;
        faces.push([0, 1 + j, 1 + j_next]);
    }

    for i in 0..(n_theta - 2) {
        let row_start = 1 + i * n_phi;
        let next_row_start = 1 + (i + 1) * n_phi;

        for j in 0..n_phi {
            let j_next = (j + 1) % n_phi;

            let n0 = row_start + j;
            let n1 = row_start + j_next;
            let n2 = next_row_start + j;
            let n3 = next_row_start + j_next;

            faces.push([n0, n2, n1]);
            faces.push([n1, n2, n3]);
        }
    }

    let last_row_start = 1 + (n_theta - 2) * n_phi;
    for j in 0..n_phi {
        let j_next = (j + 1) % n_phi;
        faces.push([last_row_start + j, south_pole, last_row_start + j_next]);
    }

    Grid::new(to_array(&points), faces, vec![])
}

/// Generate a flat rectangular grid in the z = 0 plane
///
/// Each of the `nx × ny` cells is split into two triangles; normals point
/// in +z.
///
/// # Arguments
/// * `lower_left` - `(x, y)` of the lower left corner
/// * `upper_right` - `(x, y)` of the upper right corner
/// * `subdivisions` - `(nx, ny)` cells along each axis
pub fn structured_grid(
    lower_left: (f64, f64),
    upper_right: (f64, f64),
    subdivisions: (usize, usize),
) -> Result<Grid> {
    let (nx, ny) = subdivisions;
    if nx == 0 || ny == 0 {
        return Err(BemError::InvalidParameters(format!(
            "structured grid needs at least one cell per axis, got {} x {}",
            nx, ny
        )));
    }
    let (x0, y0) = lower_left;
    let (x1, y1) = upper_right;
    if !(x1 > x0 && y1 > y0) {
        return Err(BemError::InvalidParameters(format!(
            "upper right corner ({}, {}) must exceed lower left ({}, {})",
            x1, y1, x0, y0
        )));
    }

    let mut points = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        let y = y0 + (y1 - y0) * j as f64 / ny as f64;
        for i in 0..=nx {
            let x = x0 + (x1 - x0) * i as f64 / nx as f64;
            points.push([x, y, 0.0]);
        }
    }

    let stride = nx + 1;
    let mut faces = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let a = j * stride + i;
            let b = a + 1;
            let c = a + stride + 1;
            let d = a + stride;
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }

    Grid::new(to_array(&points), faces, vec![])
}

/// Build a grid from raw vertex and element data
///
/// # Arguments
/// * `vertices` - Vertex coordinates
/// * `elements` - Triangle connectivity (indices into `vertices`)
/// * `domain_indices` - Per-element tag, or empty for all zeros
pub fn grid_from_element_data(
    vertices: &[Point3],
    elements: &[[usize; 3]],
    domain_indices: &[usize],
) -> Result<Grid> {
    Grid::new(
        to_array(vertices),
        elements.to_vec(),
        domain_indices.to_vec(),
    )
}

fn to_array(points: &[Point3]) -> Array2<f64> {
    let mut array = Array2::zeros((points.len(), 3));
    for (i, p) in points.iter().enumerate() {
        for d in 0..3 {
            array[[i, d]] = p[d];
        }
    }
    array
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{dot, sub};

    #[test]
    fn test_icosphere_counts() {
        let grid = grid_from_sphere(0, 1.0, [0.0; 3]).unwrap();
        assert_eq!(grid.vertex_count(), 12);
        assert_eq!(grid.element_count(), 20);

        let refined = grid_from_sphere(2, 1.0, [0.0; 3]).unwrap();
        assert_eq!(refined.vertex_count(), 162);
        assert_eq!(refined.element_count(), 320);
    }

    #[test]
    fn test_icosphere_outward_normals() {
        let origin = [1.0, -2.0, 0.5];
        let grid = grid_from_sphere(1, 2.0, origin).unwrap();

        for geom in grid.geometries() {
            let radial = sub(&geom.center, &origin);
            assert!(dot(&radial, &geom.normal) > 0.0);
        }
        for v in grid.vertices().rows() {
            let r = ((v[0] - origin[0]).powi(2)
                + (v[1] - origin[1]).powi(2)
                + (v[2] - origin[2]).powi(2))
            .sqrt();
            assert!((r - 2.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_icosphere_area_converges() {
        let grid = grid_from_sphere(3, 1.0, [0.0; 3]).unwrap();
        let exact = 4.0 * PI;
        assert!((grid.surface_area() - exact).abs() / exact < 0.01);
    }

    #[test]
    fn test_uv_sphere() {
        let grid = uv_sphere_grid(1.0, 8, 16).unwrap();
        assert_eq!(grid.vertex_count(), 2 + 7 * 16);
        assert_eq!(grid.element_count(), 2 * 16 + 2 * 6 * 16);

        for geom in grid.geometries() {
            assert!(dot(&geom.center, &geom.normal) > 0.0);
        }
    }

    #[test]
    fn test_uv_sphere_rejects_coarse() {
        assert!(uv_sphere_grid(1.0, 1, 16).is_err());
        assert!(uv_sphere_grid(1.0, 4, 2).is_err());
    }

    #[test]
    fn test_structured_grid() {
        let grid = structured_grid((0.0, 0.0), (2.0, 1.0), (4, 2)).unwrap();
        assert_eq!(grid.vertex_count(), 15);
        assert_eq!(grid.element_count(), 16);
        assert!((grid.surface_area() - 2.0).abs() < 1e-12);

        for geom in grid.geometries() {
            assert_eq!(geom.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_structured_grid_invalid_corners() {
        assert!(structured_grid((1.0, 0.0), (0.0, 1.0), (2, 2)).is_err());
        assert!(structured_grid((0.0, 0.0), (1.0, 1.0), (0, 2)).is_err());
    }

    #[test]
    fn test_grid_from_element_data() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let elements = [[0, 2, 1], [0, 1, 3]];
        let grid = grid_from_element_data(&vertices, &elements, &[4, 7]).unwrap();

        assert_eq!(grid.element_count(), 2);
        assert_eq!(grid.domain_indices(), &[4, 7]);
    }
}
