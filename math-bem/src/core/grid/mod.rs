//! Triangular surface grids
//!
//! A [`Grid`] is a flat-triangle surface mesh with cached per-element
//! geometry. Grids are immutable once built and are shared between
//! function spaces through `Arc`.

pub mod generators;

pub use generators::*;

use ndarray::Array2;

use crate::core::error::{BemError, Result};
use crate::core::types::{ElementGeometry, Point3, cross, sub};

/// Triangular surface grid
#[derive(Debug, Clone)]
pub struct Grid {
    vertices: Array2<f64>,
    elements: Vec<[usize; 3]>,
    domain_indices: Vec<usize>,
    geometry: Vec<ElementGeometry>,
}

impl Grid {
    /// Build a grid from vertex coordinates (N × 3) and triangle connectivity.
    ///
    /// `domain_indices` tags each element (e.g. a Gmsh physical group); when
    /// empty every element is assigned domain 0.
    pub fn new(
        vertices: Array2<f64>,
        elements: Vec<[usize; 3]>,
        domain_indices: Vec<usize>,
    ) -> Result<Self> {
        if vertices.ncols() != 3 {
            return Err(BemError::DimensionMismatch {
                what: "vertex coordinates",
                expected: 3,
                got: vertices.ncols(),
            });
        }
        if elements.is_empty() {
            return Err(BemError::InvalidGrid("grid has no elements".to_string()));
        }
        if vertices.iter().any(|c| !c.is_finite()) {
            return Err(BemError::InvalidGrid(
                "vertex coordinates must be finite".to_string(),
            ));
        }

        let domain_indices = if domain_indices.is_empty() {
            vec![0; elements.len()]
        } else if domain_indices.len() != elements.len() {
            return Err(BemError::DimensionMismatch {
                what: "domain indices",
                expected: elements.len(),
                got: domain_indices.len(),
            });
        } else {
            domain_indices
        };

        let n_vertices = vertices.nrows();
        let mut geometry = Vec::with_capacity(elements.len());

        for (index, element) in elements.iter().enumerate() {
            if let Some(&bad) = element.iter().find(|&&v| v >= n_vertices) {
                return Err(BemError::InvalidGrid(format!(
                    "element {} references vertex {} but the grid has {} vertices",
                    index, bad, n_vertices
                )));
            }
            if element[0] == element[1] || element[1] == element[2] || element[0] == element[2] {
                return Err(BemError::InvalidGrid(format!(
                    "element {} repeats a vertex: {:?}",
                    index, element
                )));
            }

            let [v0, v1, v2] = element.map(|v| row(&vertices, v));
            let geom = ElementGeometry::from_vertices(&v0, &v1, &v2).ok_or_else(|| {
                BemError::InvalidGrid(format!("element {} is degenerate", index))
            })?;
            geometry.push(geom);
        }

        Ok(Self {
            vertices,
            elements,
            domain_indices,
            geometry,
        })
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.nrows()
    }

    /// Number of triangles
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Vertex coordinates (N × 3)
    pub fn vertices(&self) -> &Array2<f64> {
        &self.vertices
    }

    /// Coordinates of one vertex
    pub fn vertex(&self, index: usize) -> Point3 {
        row(&self.vertices, index)
    }

    /// Triangle connectivity
    pub fn elements(&self) -> &[[usize; 3]] {
        &self.elements
    }

    /// Domain index of every element
    pub fn domain_indices(&self) -> &[usize] {
        &self.domain_indices
    }

    /// Corner coordinates of one element
    pub fn element_vertices(&self, element: usize) -> [Point3; 3] {
        self.elements[element].map(|v| self.vertex(v))
    }

    /// Cached geometry of one element
    pub fn geometry(&self, element: usize) -> &ElementGeometry {
        &self.geometry[element]
    }

    /// Cached geometry of all elements
    pub fn geometries(&self) -> &[ElementGeometry] {
        &self.geometry
    }

    /// Map reference coordinates `(xi, eta)` of an element to physical space
    pub fn local_to_global(&self, element: usize, xi: f64, eta: f64) -> Point3 {
        let [v0, v1, v2] = self.element_vertices(element);
        let w0 = 1.0 - xi - eta;
        [
            w0 * v0[0] + xi * v1[0] + eta * v2[0],
            w0 * v0[1] + xi * v1[1] + eta * v2[1],
            w0 * v0[2] + xi * v1[2] + eta * v2[2],
        ]
    }

    /// Total surface area
    pub fn surface_area(&self) -> f64 {
        self.geometry.iter().map(|g| g.area).sum()
    }

    /// Axis-aligned bounding box `(min, max)`
    pub fn bounding_box(&self) -> (Point3, Point3) {
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for v in self.vertices.rows() {
            for d in 0..3 {
                lo[d] = lo[d].min(v[d]);
                hi[d] = hi[d].max(v[d]);
            }
        }
        (lo, hi)
    }

    /// Area-weighted vertex normals (N × 3, unit length)
    ///
    /// Vertices not attached to any element get a zero normal.
    pub fn vertex_normals(&self) -> Array2<f64> {
        let mut normals = Array2::<f64>::zeros((self.vertex_count(), 3));
        for (element, corners) in self.elements.iter().enumerate() {
            let [v0, v1, v2] = self.element_vertices(element);
            // |e1 x e2| = 2 * area, so the raw cross product is already area weighted
            let n = cross(&sub(&v1, &v0), &sub(&v2, &v0));
            for &v in corners {
                for d in 0..3 {
                    normals[[v, d]] += n[d];
                }
            }
        }
        for mut n in normals.rows_mut() {
            let len = n.dot(&n).sqrt();
            if len > 0.0 {
                n /= len;
            }
        }
        normals
    }
}

fn row(array: &Array2<f64>, index: usize) -> Point3 {
    [array[[index, 0]], array[[index, 1]], array[[index, 2]]]
}
