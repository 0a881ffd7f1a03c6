//! Numerical integration over triangular elements
//!
//! - [`gauss`] - Gauss rules on the reference triangle
//! - [`subdivision`] - Adaptive element subdivision for near-field targets

pub mod gauss;
pub mod subdivision;

pub use gauss::{MAX_TRIANGLE_ORDER, QuadraturePoint, triangle_quadrature, triangle_rule_size};
pub use subdivision::{
    ElementQuadraturePoint, MAX_NEAR_FIELD_RATIO, MAX_SUBDIVISION_DEPTH, SubTriangle,
    SubdivisionRule, element_quadrature,
};
