//! Function spaces on triangular grids
//!
//! Two families are supported:
//!
//! - `DP0`: discontinuous piecewise constants, one DOF per element
//! - `P1`: continuous piecewise linears, one DOF per vertex

use std::fmt;
use std::sync::Arc;

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::error::{BemError, Result};
use crate::core::grid::Grid;

/// Kind of function space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceKind {
    /// Discontinuous piecewise constant
    #[serde(rename = "DP0")]
    Dp0,
    /// Continuous piecewise linear
    #[serde(rename = "P1")]
    P1,
}

impl SpaceKind {
    /// Parse a `(family, order)` pair such as `("DP", 0)` or `("P", 1)`
    pub fn from_family(family: &str, order: usize) -> Result<Self> {
        match (family.to_ascii_uppercase().as_str(), order) {
            ("DP", 0) => Ok(SpaceKind::Dp0),
            ("P", 1) => Ok(SpaceKind::P1),
            (f, o) => Err(BemError::InvalidSpace(format!(
                "unsupported space family {}{}, expected DP0 or P1",
                f, o
            ))),
        }
    }

    /// Number of local basis functions on one triangle
    pub fn local_dof_count(&self) -> usize {
        match self {
            SpaceKind::Dp0 => 1,
            SpaceKind::P1 => 3,
        }
    }
}

impl fmt::Display for SpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceKind::Dp0 => write!(f, "DP0"),
            SpaceKind::P1 => write!(f, "P1"),
        }
    }
}

/// A scalar function space on a grid
#[derive(Debug, Clone)]
pub struct FunctionSpace {
    grid: Arc<Grid>,
    kind: SpaceKind,
}

impl FunctionSpace {
    /// Create a space of the given kind on `grid`
    pub fn new(grid: Arc<Grid>, kind: SpaceKind) -> Self {
        Self { grid, kind }
    }

    /// Underlying grid
    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// Space kind
    pub fn kind(&self) -> SpaceKind {
        self.kind
    }

    /// Total number of degrees of freedom
    pub fn global_dof_count(&self) -> usize {
        match self.kind {
            SpaceKind::Dp0 => self.grid.element_count(),
            SpaceKind::P1 => self.grid.vertex_count(),
        }
    }

    /// Global DOFs attached to an element, in local basis order
    pub fn element_dofs(&self, element: usize) -> Vec<usize> {
        match self.kind {
            SpaceKind::Dp0 => vec![element],
            SpaceKind::P1 => self.grid.elements()[element].to_vec(),
        }
    }

    /// Values of the local basis functions at reference point `(xi, eta)`
    pub fn local_basis(&self, xi: f64, eta: f64) -> Vec<f64> {
        match self.kind {
            SpaceKind::Dp0 => vec![1.0],
            SpaceKind::P1 => vec![1.0 - xi - eta, xi, eta],
        }
    }

    /// Evaluate a coefficient vector at reference point `(xi, eta)` of an element
    pub fn evaluate(
        &self,
        coefficients: &Array1<Complex64>,
        element: usize,
        xi: f64,
        eta: f64,
    ) -> Complex64 {
        match self.kind {
            SpaceKind::Dp0 => coefficients[element],
            SpaceKind::P1 => {
                let [v0, v1, v2] = self.grid.elements()[element];
                coefficients[v0] * (1.0 - xi - eta) + coefficients[v1] * xi + coefficients[v2] * eta
            }
        }
    }

    /// Whether two spaces share the same grid instance and kind
    pub fn is_compatible(&self, other: &FunctionSpace) -> bool {
        self.kind == other.kind && Arc::ptr_eq(&self.grid, &other.grid)
    }
}

/// Create a function space from a family name and order, e.g. `("DP", 0)`
pub fn function_space(grid: Arc<Grid>, family: &str, order: usize) -> Result<Arc<FunctionSpace>> {
    let kind = SpaceKind::from_family(family, order)?;
    Ok(Arc::new(FunctionSpace::new(grid, kind)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::structured_grid;

    fn grid() -> Arc<Grid> {
        Arc::new(structured_grid((0.0, 0.0), (1.0, 1.0), (2, 2)).unwrap())
    }

    #[test]
    fn test_from_family() {
        assert_eq!(SpaceKind::from_family("DP", 0).unwrap(), SpaceKind::Dp0);
        assert_eq!(SpaceKind::from_family("p", 1).unwrap(), SpaceKind::P1);
        assert!(SpaceKind::from_family("RT", 0).is_err());
        assert!(SpaceKind::from_family("P", 2).is_err());
    }

    #[test]
    fn test_dof_counts() {
        let grid = grid();
        let dp0 = function_space(grid.clone(), "DP", 0).unwrap();
        let p1 = function_space(grid, "P", 1).unwrap();

        assert_eq!(dp0.global_dof_count(), 8);
        assert_eq!(p1.global_dof_count(), 9);
        assert_eq!(dp0.element_dofs(3), vec![3]);
        assert_eq!(p1.element_dofs(0).len(), 3);
    }

    #[test]
    fn test_p1_partition_of_unity() {
        let space = FunctionSpace::new(grid(), SpaceKind::P1);
        let basis = space.local_basis(0.2, 0.3);
        assert!((basis.iter().sum::<f64>() - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_p1_evaluate_interpolates_vertices() {
        let grid = grid();
        let space = FunctionSpace::new(grid.clone(), SpaceKind::P1);
        let coeffs: Array1<Complex64> = (0..space.global_dof_count())
            .map(|i| Complex64::new(i as f64, 0.0))
            .collect();

        let [v0, v1, v2] = grid.elements()[1];
        assert_eq!(space.evaluate(&coeffs, 1, 0.0, 0.0), coeffs[v0]);
        assert_eq!(space.evaluate(&coeffs, 1, 1.0, 0.0), coeffs[v1]);
        assert_eq!(space.evaluate(&coeffs, 1, 0.0, 1.0), coeffs[v2]);
    }

    #[test]
    fn test_compatibility() {
        let grid = grid();
        let a = FunctionSpace::new(grid.clone(), SpaceKind::Dp0);
        let b = FunctionSpace::new(grid.clone(), SpaceKind::Dp0);
        let c = FunctionSpace::new(grid, SpaceKind::P1);
        let other = FunctionSpace::new(self::grid(), SpaceKind::Dp0);

        assert!(a.is_compatible(&b));
        assert!(!a.is_compatible(&c));
        assert!(!a.is_compatible(&other));
    }
}
