//! Evaluation options, quadrature strategy and operator context
//!
//! These are the knobs that control how a potential operator computes
//! values at target points. [`GlobalParameters`] bundles the defaults and
//! can be loaded from JSON or TOML together with the rest of a job
//! configuration.

use serde::{Deserialize, Serialize};

use crate::core::error::{BemError, Result};
use crate::core::integration::{
    MAX_NEAR_FIELD_RATIO, MAX_SUBDIVISION_DEPTH, MAX_TRIANGLE_ORDER, SubdivisionRule,
};

/// Quadrature strategy for potential evaluation
///
/// For a target `x` and a (sub)triangle `T`, `T` is in the near field when
/// `|x - centre(T)| < near_field_ratio * diam(T)`. Near-field triangles are
/// split into four until they leave the near field or `max_subdivisions`
/// is reached, then integrated with `near_order`; all others use
/// `far_order`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureStrategy {
    /// Triangle rule order away from the target (1..=4)
    pub far_order: usize,
    /// Triangle rule order in the near field (1..=4)
    pub near_order: usize,
    /// Near-field radius in units of the element diameter
    pub near_field_ratio: f64,
    /// Maximum adaptive subdivision depth
    pub max_subdivisions: usize,
    /// Quadrature points closer than this to the target are skipped
    pub singular_cutoff: f64,
}

impl Default for QuadratureStrategy {
    fn default() -> Self {
        Self {
            far_order: 2,
            near_order: 4,
            near_field_ratio: 2.0,
            max_subdivisions: 4,
            singular_cutoff: 1e-12,
        }
    }
}

impl QuadratureStrategy {
    /// Set the far-field rule order
    pub fn with_far_order(mut self, order: usize) -> Self {
        self.far_order = order;
        self
    }

    /// Set the near-field rule order
    pub fn with_near_order(mut self, order: usize) -> Self {
        self.near_order = order;
        self
    }

    /// Set the near-field radius factor
    pub fn with_near_field_ratio(mut self, ratio: f64) -> Self {
        self.near_field_ratio = ratio;
        self
    }

    /// Set the maximum subdivision depth
    pub fn with_max_subdivisions(mut self, levels: usize) -> Self {
        self.max_subdivisions = levels;
        self
    }

    /// Check that all parameters are in range
    pub fn validate(&self) -> Result<()> {
        for (name, order) in [("far_order", self.far_order), ("near_order", self.near_order)] {
            if !(1..=MAX_TRIANGLE_ORDER).contains(&order) {
                return Err(BemError::InvalidParameters(format!(
                    "{} must be in 1..={}, got {}",
                    name, MAX_TRIANGLE_ORDER, order
                )));
            }
        }
        if !(0.0..=MAX_NEAR_FIELD_RATIO).contains(&self.near_field_ratio) {
            return Err(BemError::InvalidParameters(format!(
                "near_field_ratio must be in [0, {}], got {}",
                MAX_NEAR_FIELD_RATIO, self.near_field_ratio
            )));
        }
        if !(self.singular_cutoff.is_finite() && self.singular_cutoff >= 0.0) {
            return Err(BemError::InvalidParameters(format!(
                "singular_cutoff must be finite and >= 0, got {}",
                self.singular_cutoff
            )));
        }
        if self.max_subdivisions > MAX_SUBDIVISION_DEPTH {
            return Err(BemError::InvalidParameters(format!(
                "max_subdivisions must be <= {}, got {}",
                MAX_SUBDIVISION_DEPTH, self.max_subdivisions
            )));
        }
        Ok(())
    }

    /// Subdivision parameters for the integration layer
    pub fn subdivision_rule(&self) -> SubdivisionRule {
        SubdivisionRule {
            far_order: self.far_order,
            near_order: self.near_order,
            near_field_ratio: self.near_field_ratio,
            max_subdivisions: self.max_subdivisions,
        }
    }
}

/// How target points are distributed over threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parallelization {
    /// Evaluate on the calling thread
    Sequential,
    /// Evaluate with rayon, optionally on a dedicated pool of `max_threads`
    Parallel {
        /// Thread limit (`None` = global rayon pool)
        #[serde(default)]
        max_threads: Option<usize>,
    },
}

impl Default for Parallelization {
    fn default() -> Self {
        Parallelization::Parallel { max_threads: None }
    }
}

/// Options for evaluating a potential at points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationOptions {
    /// Thread usage
    pub parallelization: Parallelization,
    /// Log a summary of every evaluation
    pub verbose: bool,
}

impl EvaluationOptions {
    /// Evaluate on the calling thread only
    pub fn sequential() -> Self {
        Self {
            parallelization: Parallelization::Sequential,
            ..Self::default()
        }
    }

    /// Set the thread usage
    pub fn with_parallelization(mut self, parallelization: Parallelization) -> Self {
        self.parallelization = parallelization;
        self
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Default evaluation options (parallel on all threads, quiet)
pub fn create_evaluation_options() -> EvaluationOptions {
    EvaluationOptions::default()
}

/// Library-wide default parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalParameters {
    /// Default quadrature strategy for new operators
    pub quadrature: QuadratureStrategy,
    /// Default evaluation options
    pub evaluation: EvaluationOptions,
}

impl GlobalParameters {
    /// Validate all nested parameters
    pub fn validate(&self) -> Result<()> {
        self.quadrature.validate()
    }
}

/// Context shared by the operators created from it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    quadrature_strategy: QuadratureStrategy,
}

impl Context {
    /// Create a context with an explicit quadrature strategy
    pub fn new(quadrature_strategy: QuadratureStrategy) -> Result<Self> {
        quadrature_strategy.validate()?;
        Ok(Self {
            quadrature_strategy,
        })
    }

    /// Create a context from global parameters
    pub fn from_parameters(parameters: &GlobalParameters) -> Result<Self> {
        Self::new(parameters.quadrature)
    }

    /// Quadrature strategy used by operators of this context
    pub fn quadrature_strategy(&self) -> &QuadratureStrategy {
        &self.quadrature_strategy
    }
}
