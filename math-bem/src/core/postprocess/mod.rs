//! Post-processing: sampling potentials at points in space
//!
//! - `plane`: parametric plane sampling and [`evaluate_potential_on_plane`]
//! - `points`: line and sphere point generators

pub mod plane;
pub mod points;

pub use plane::*;
pub use points::*;
