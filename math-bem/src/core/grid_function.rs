//! Grid functions: coefficient vectors attached to a function space
//!
//! A grid function is the density a potential operator acts on. It is
//! stored by its expansion coefficients in the basis of its space.

use std::sync::Arc;

use ndarray::Array1;
use num_complex::Complex64;

use crate::core::error::{BemError, Result};
use crate::core::integration::triangle_quadrature;
use crate::core::space::{FunctionSpace, SpaceKind};
use crate::core::types::Point3;

/// Discretised scalar function on a grid
#[derive(Debug, Clone)]
pub struct GridFunction {
    space: Arc<FunctionSpace>,
    coefficients: Array1<Complex64>,
}

impl GridFunction {
    /// Create from expansion coefficients
    ///
    /// The number of coefficients must match the space's global DOF count.
    pub fn from_coefficients(
        space: Arc<FunctionSpace>,
        coefficients: Array1<Complex64>,
    ) -> Result<Self> {
        check_length(&space, coefficients.len())?;
        Ok(Self {
            space,
            coefficients,
        })
    }

    /// Constant function
    pub fn constant(space: Arc<FunctionSpace>, value: Complex64) -> Self {
        let n = space.global_dof_count();
        Self {
            space,
            coefficients: Array1::from_elem(n, value),
        }
    }

    /// Interpolate a function `f(point, normal, domain_index)`
    ///
    /// DP0 spaces sample `f` at element centroids with the element normal;
    /// P1 spaces sample at vertices with area-weighted vertex normals and
    /// the domain index of the first element touching the vertex.
    pub fn from_fn<F>(space: Arc<FunctionSpace>, f: F) -> Self
    where
        F: Fn(&Point3, &Point3, usize) -> Complex64,
    {
        let grid = space.grid();
        let coefficients = match space.kind() {
            SpaceKind::Dp0 => grid
                .geometries()
                .iter()
                .zip(grid.domain_indices())
                .map(|(g, &domain)| f(&g.center, &g.normal, domain))
                .collect(),
            SpaceKind::P1 => {
                let normals = grid.vertex_normals();
                let mut vertex_domain = vec![0usize; grid.vertex_count()];
                for (element, corners) in grid.elements().iter().enumerate().rev() {
                    for &v in corners {
                        vertex_domain[v] = grid.domain_indices()[element];
                    }
                }
                (0..grid.vertex_count())
                    .map(|v| {
                        let n = [normals[[v, 0]], normals[[v, 1]], normals[[v, 2]]];
                        f(&grid.vertex(v), &n, vertex_domain[v])
                    })
                    .collect()
            }
        };
        Self {
            space,
            coefficients,
        }
    }

    /// The function space
    pub fn space(&self) -> &Arc<FunctionSpace> {
        &self.space
    }

    /// Expansion coefficients
    pub fn coefficients(&self) -> &Array1<Complex64> {
        &self.coefficients
    }

    /// Replace the coefficients (length-checked)
    pub fn set_coefficients(&mut self, coefficients: Array1<Complex64>) -> Result<()> {
        check_length(&self.space, coefficients.len())?;
        self.coefficients = coefficients;
        Ok(())
    }

    /// Number of components of the represented function
    pub fn codomain_dimension(&self) -> usize {
        1
    }

    /// Evaluate at reference point `(xi, eta)` of an element
    #[inline]
    pub fn evaluate_local(&self, element: usize, xi: f64, eta: f64) -> Complex64 {
        self.space.evaluate(&self.coefficients, element, xi, eta)
    }

    /// Value at every element centroid
    pub fn element_values(&self) -> Array1<Complex64> {
        (0..self.space.grid().element_count())
            .map(|e| self.evaluate_local(e, 1.0 / 3.0, 1.0 / 3.0))
            .collect()
    }

    /// L2 norm over the grid
    pub fn l2_norm(&self) -> f64 {
        let grid = self.space.grid();
        let rule = triangle_quadrature(4);
        let mut sum = 0.0;
        for (element, geom) in grid.geometries().iter().enumerate() {
            let local: f64 = rule
                .iter()
                .map(|q| q.weight * self.evaluate_local(element, q.xi, q.eta).norm_sqr())
                .sum();
            sum += local * 2.0 * geom.area;
        }
        sum.sqrt()
    }

    /// Sum of two grid functions on the same space
    pub fn checked_add(&self, other: &GridFunction) -> Result<GridFunction> {
        self.check_compatible(other)?;
        Ok(Self {
            space: self.space.clone(),
            coefficients: &self.coefficients + &other.coefficients,
        })
    }

    /// Difference of two grid functions on the same space
    pub fn checked_sub(&self, other: &GridFunction) -> Result<GridFunction> {
        self.check_compatible(other)?;
        Ok(Self {
            space: self.space.clone(),
            coefficients: &self.coefficients - &other.coefficients,
        })
    }

    /// Multiply by a scalar
    pub fn scale(&self, factor: Complex64) -> GridFunction {
        Self {
            space: self.space.clone(),
            coefficients: self.coefficients.mapv(|c| c * factor),
        }
    }

    fn check_compatible(&self, other: &GridFunction) -> Result<()> {
        if self.space.is_compatible(&other.space) {
            Ok(())
        } else {
            Err(BemError::InvalidSpace(format!(
                "grid functions live on different spaces ({} vs {})",
                self.space.kind(),
                other.space.kind()
            )))
        }
    }
}

fn check_length(space: &FunctionSpace, got: usize) -> Result<()> {
    let expected = space.global_dof_count();
    if got != expected {
        return Err(BemError::DimensionMismatch {
            what: "grid function coefficients",
            expected,
            got,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::{Grid, grid_from_sphere, structured_grid};
    use crate::core::space::function_space;
    use std::f64::consts::PI;

    fn square() -> Arc<Grid> {
        Arc::new(structured_grid((0.0, 0.0), (1.0, 1.0), (4, 4)).unwrap())
    }

    #[test]
    fn test_from_coefficients_checks_length() {
        let space = function_space(square(), "DP", 0).unwrap();
        let err = GridFunction::from_coefficients(space.clone(), Array1::zeros(3)).unwrap_err();
        assert!(matches!(err, BemError::DimensionMismatch { expected: 32, got: 3, .. }));

        assert!(GridFunction::from_coefficients(space, Array1::zeros(32)).is_ok());
    }

    #[test]
    fn test_l2_norm_of_constant() {
        let space = function_space(square(), "P", 1).unwrap();
        let f = GridFunction::constant(space, Complex64::new(2.0, 0.0));
        // ||2|| over the unit square
        assert!((f.l2_norm() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_fn_p1_is_exact_for_linear() {
        let space = function_space(square(), "P", 1).unwrap();
        let f = GridFunction::from_fn(space, |p, _, _| Complex64::new(p[0] + 2.0 * p[1], 0.0));

        let grid = f.space().grid().clone();
        let c = grid.geometry(5).center;
        let value = f.evaluate_local(5, 1.0 / 3.0, 1.0 / 3.0);
        assert!((value.re - (c[0] + 2.0 * c[1])).abs() < 1e-12);
    }

    #[test]
    fn test_from_fn_dp0_uses_normals() {
        let grid = Arc::new(grid_from_sphere(1, 1.0, [0.0; 3]).unwrap());
        let space = function_space(grid, "DP", 0).unwrap();
        let f = GridFunction::from_fn(space, |p, n, _| {
            Complex64::new(p[0] * n[0] + p[1] * n[1] + p[2] * n[2], 0.0)
        });
        // Centroid dotted with the outward normal is positive on a sphere
        assert!(f.coefficients().iter().all(|c| c.re > 0.0));
    }

    #[test]
    fn test_sphere_surface_l2_norm() {
        let grid = Arc::new(grid_from_sphere(3, 1.0, [0.0; 3]).unwrap());
        let space = function_space(grid, "DP", 0).unwrap();
        let f = GridFunction::constant(space, Complex64::new(1.0, 0.0));
        let exact = (4.0 * PI).sqrt();
        assert!((f.l2_norm() - exact).abs() / exact < 0.01);
    }

    #[test]
    fn test_arithmetic() {
        let space = function_space(square(), "DP", 0).unwrap();
        let a = GridFunction::constant(space.clone(), Complex64::new(1.0, 0.0));
        let b = GridFunction::constant(space, Complex64::new(0.0, 2.0));

        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.coefficients()[0], Complex64::new(1.0, 2.0));

        let diff = a.checked_sub(&b).unwrap();
        assert_eq!(diff.coefficients()[0], Complex64::new(1.0, -2.0));

        let scaled = b.scale(Complex64::new(0.0, 1.0));
        assert_eq!(scaled.coefficients()[0], Complex64::new(-2.0, 0.0));
    }

    #[test]
    fn test_arithmetic_rejects_other_space() {
        let a = GridFunction::constant(
            function_space(square(), "DP", 0).unwrap(),
            Complex64::new(1.0, 0.0),
        );
        let b = GridFunction::constant(
            function_space(square(), "DP", 0).unwrap(),
            Complex64::new(1.0, 0.0),
        );
        assert!(a.checked_add(&b).is_err());
    }

    #[test]
    fn test_set_coefficients() {
        let space = function_space(square(), "P", 1).unwrap();
        let mut f = GridFunction::constant(space, Complex64::new(0.0, 0.0));
        assert!(f.set_coefficients(Array1::zeros(2)).is_err());
        assert!(f.set_coefficients(Array1::from_elem(25, Complex64::new(3.0, 0.0))).is_ok());
        assert_eq!(f.codomain_dimension(), 1);
    }
}
