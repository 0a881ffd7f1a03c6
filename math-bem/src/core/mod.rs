//! Potential evaluation on triangular surface grids
//!
//! This module provides the pieces needed to evaluate boundary potentials
//! (single layer, double layer and single-layer gradient) of Laplace,
//! Helmholtz and modified Helmholtz kernels at arbitrary points, and the
//! plane sampling built on top of them.
//!
//! ## Architecture
//!
//! - `types`: Point helpers and per-element geometry
//! - `error`: Library error type
//! - `grid`: Triangular surface grids and grid generators
//! - `space`: DP0 and P1 function spaces
//! - `grid_function`: Densities living in a function space
//! - `integration`: Triangle quadrature and adaptive subdivision
//! - `kernels`: Radial Green's functions
//! - `context`: Quadrature strategy, evaluation options, operator context
//! - `potential`: Potential operators and the quadrature evaluator
//! - `postprocess`: Plane, line and sphere sampling
//! - `io`: Job configuration (JSON/TOML), Gmsh meshes, VTK/JSON export
//! - `parallel`: Rayon or sequential iteration over target points

pub mod context;
pub mod error;
pub mod grid;
pub mod grid_function;
pub mod integration;
pub mod io;
pub mod kernels;
pub mod parallel;
pub mod postprocess;
pub mod potential;
pub mod space;
pub mod types;

// Re-exports for convenience
pub use context::{
    Context, EvaluationOptions, GlobalParameters, Parallelization, QuadratureStrategy,
    create_evaluation_options,
};
pub use error::{BemError, Result};
pub use grid::{
    Grid, grid_from_element_data, grid_from_sphere, structured_grid, uv_sphere_grid,
};
pub use grid_function::GridFunction;
pub use kernels::{HelmholtzKernel, Kernel, LaplaceKernel, ModifiedHelmholtzKernel};
pub use postprocess::{
    PlaneEvaluation, PlaneLimits, evaluate_potential_on_plane, line_points, plane_points,
    sphere_points,
};
pub use potential::*;
pub use space::{FunctionSpace, SpaceKind, function_space};
pub use types::Point3;
