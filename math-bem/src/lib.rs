//! # BEM potentials: field evaluation for boundary element densities
//!
//! Evaluates boundary potentials of Laplace, Helmholtz and modified
//! Helmholtz kernels away from a triangulated surface, with a convenience
//! layer for sampling them on a plane.
//!
//! ## Features
//!
//! - DP0 and P1 densities on flat triangular grids
//! - Adaptive near-field quadrature
//! - Parallel execution with Rayon (`parallel` feature, on by default)
//! - Gmsh input, VTK and JSON output
//!
//! ## Example
//!
//! ```ignore
//! use math_audio_bem_potential::core::*;
//! use num_complex::Complex64;
//! use std::sync::Arc;
//!
//! let grid = Arc::new(grid_from_sphere(3, 1.0, [0.0; 3])?);
//! let space = function_space(grid, "DP", 0)?;
//! let density = GridFunction::constant(space, Complex64::new(1.0, 0.0));
//!
//! let potential = laplace_single_layer_potential(&Context::default());
//! let limits = PlaneLimits::horizontal(-2.0, 2.0, -2.0, 2.0, 0.0);
//! let field = evaluate_potential_on_plane(&potential, &density, &limits, (41, 41), None, None)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)] // Scientific code often has many parameters

pub mod core;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
