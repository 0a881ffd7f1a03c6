//! Potential operators
//!
//! A potential operator maps a density on the boundary (a [`GridFunction`])
//! to values at arbitrary points in space. Every operator carries the
//! [`Context`] it was created with, whose quadrature strategy is used when
//! the caller does not supply one.
//!
//! # Example
//!
//! ```ignore
//! use math_audio_bem_potential::core::*;
//!
//! let context = Context::default();
//! let potential = laplace_single_layer_potential(&context);
//! let values = potential.evaluate_at_points(
//!     &density,
//!     &points,
//!     potential.quadrature_strategy(),
//!     &create_evaluation_options(),
//! )?;
//! ```

pub mod evaluator;

pub use evaluator::evaluate_kernel_potential;

use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::context::{Context, EvaluationOptions, QuadratureStrategy};
use crate::core::error::Result;
use crate::core::grid_function::GridFunction;
use crate::core::kernels::{HelmholtzKernel, Kernel, LaplaceKernel, ModifiedHelmholtzKernel};

/// An operator that evaluates a potential at points in space
pub trait PotentialOperator: Send + Sync {
    /// Human readable name, e.g. `"laplace single layer"`
    fn label(&self) -> String;

    /// Context the operator was created with
    fn context(&self) -> &Context;

    /// Number of values per evaluation point (1 for scalar potentials)
    fn component_count(&self) -> usize;

    /// Default quadrature strategy (the one of the operator's context)
    fn quadrature_strategy(&self) -> &QuadratureStrategy {
        self.context().quadrature_strategy()
    }

    /// Evaluate the potential generated by `grid_function` at `points` (N × 3)
    ///
    /// Returns an `N × component_count()` array: row `i` holds the value at
    /// point `i`.
    fn evaluate_at_points(
        &self,
        grid_function: &GridFunction,
        points: &Array2<f64>,
        quadrature: &QuadratureStrategy,
        options: &EvaluationOptions,
    ) -> Result<Array2<Complex64>>;
}

/// Which boundary integral a kernel potential computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialKind {
    /// `∫ G(x,y) φ(y) dS_y`
    SingleLayer,
    /// `∫ ∂G/∂n_y(x,y) φ(y) dS_y`
    DoubleLayer,
    /// `∫ ∇_x G(x,y) φ(y) dS_y`
    SingleLayerGradient,
}

impl PotentialKind {
    /// Number of values per point
    pub fn component_count(&self) -> usize {
        match self {
            PotentialKind::SingleLayer | PotentialKind::DoubleLayer => 1,
            PotentialKind::SingleLayerGradient => 3,
        }
    }
}

impl fmt::Display for PotentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PotentialKind::SingleLayer => write!(f, "single layer"),
            PotentialKind::DoubleLayer => write!(f, "double layer"),
            PotentialKind::SingleLayerGradient => write!(f, "single layer gradient"),
        }
    }
}

/// Potential operator defined by a radial kernel
#[derive(Debug, Clone)]
pub struct KernelPotential<K: Kernel> {
    kernel: K,
    kind: PotentialKind,
    context: Context,
}

impl<K: Kernel> KernelPotential<K> {
    /// Create a potential of the given kind
    pub fn new(kernel: K, kind: PotentialKind, context: &Context) -> Self {
        Self {
            kernel,
            kind,
            context: context.clone(),
        }
    }

    /// The kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The potential kind
    pub fn kind(&self) -> PotentialKind {
        self.kind
    }
}

impl<K: Kernel> PotentialOperator for KernelPotential<K> {
    fn label(&self) -> String {
        format!("{} {}", self.kernel.name().replace('_', " "), self.kind)
    }

    fn context(&self) -> &Context {
        &self.context
    }

    fn component_count(&self) -> usize {
        self.kind.component_count()
    }

    fn evaluate_at_points(
        &self,
        grid_function: &GridFunction,
        points: &Array2<f64>,
        quadrature: &QuadratureStrategy,
        options: &EvaluationOptions,
    ) -> Result<Array2<Complex64>> {
        evaluate_kernel_potential(
            &self.kernel,
            self.kind,
            grid_function,
            points,
            quadrature,
            options,
        )
    }
}

/// Laplace single-layer potential
pub fn laplace_single_layer_potential(context: &Context) -> KernelPotential<LaplaceKernel> {
    KernelPotential::new(LaplaceKernel, PotentialKind::SingleLayer, context)
}

/// Laplace double-layer potential
pub fn laplace_double_layer_potential(context: &Context) -> KernelPotential<LaplaceKernel> {
    KernelPotential::new(LaplaceKernel, PotentialKind::DoubleLayer, context)
}

/// Gradient of the Laplace single-layer potential (3 components)
pub fn laplace_single_layer_gradient_potential(
    context: &Context,
) -> KernelPotential<LaplaceKernel> {
    KernelPotential::new(LaplaceKernel, PotentialKind::SingleLayerGradient, context)
}

/// Helmholtz single-layer potential for wave number `k`
pub fn helmholtz_single_layer_potential(
    context: &Context,
    wavenumber: f64,
) -> KernelPotential<HelmholtzKernel> {
    KernelPotential::new(
        HelmholtzKernel::new(wavenumber),
        PotentialKind::SingleLayer,
        context,
    )
}

/// Helmholtz double-layer potential for wave number `k`
pub fn helmholtz_double_layer_potential(
    context: &Context,
    wavenumber: f64,
) -> KernelPotential<HelmholtzKernel> {
    KernelPotential::new(
        HelmholtzKernel::new(wavenumber),
        PotentialKind::DoubleLayer,
        context,
    )
}

/// Gradient of the Helmholtz single-layer potential (3 components)
pub fn helmholtz_single_layer_gradient_potential(
    context: &Context,
    wavenumber: f64,
) -> KernelPotential<HelmholtzKernel> {
    KernelPotential::new(
        HelmholtzKernel::new(wavenumber),
        PotentialKind::SingleLayerGradient,
        context,
    )
}

/// Modified Helmholtz single-layer potential for decay rate `ω`
pub fn modified_helmholtz_single_layer_potential(
    context: &Context,
    omega: f64,
) -> KernelPotential<ModifiedHelmholtzKernel> {
    KernelPotential::new(
        ModifiedHelmholtzKernel::new(omega),
        PotentialKind::SingleLayer,
        context,
    )
}

/// Modified Helmholtz double-layer potential for decay rate `ω`
pub fn modified_helmholtz_double_layer_potential(
    context: &Context,
    omega: f64,
) -> KernelPotential<ModifiedHelmholtzKernel> {
    KernelPotential::new(
        ModifiedHelmholtzKernel::new(omega),
        PotentialKind::DoubleLayer,
        context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let context = Context::default();
        assert_eq!(
            laplace_single_layer_potential(&context).label(),
            "laplace single layer"
        );
        assert_eq!(
            modified_helmholtz_double_layer_potential(&context, 1.0).label(),
            "modified helmholtz double layer"
        );
    }

    #[test]
    fn test_component_counts() {
        let context = Context::default();
        assert_eq!(helmholtz_double_layer_potential(&context, 2.0).component_count(), 1);
        assert_eq!(
            helmholtz_single_layer_gradient_potential(&context, 2.0).component_count(),
            3
        );
    }

    #[test]
    fn test_quadrature_strategy_comes_from_context() {
        let strategy = QuadratureStrategy::default().with_far_order(3);
        let context = Context::new(strategy).unwrap();
        let potential = laplace_double_layer_potential(&context);
        assert_eq!(potential.quadrature_strategy().far_order, 3);
    }

    #[test]
    fn test_operators_are_object_safe() {
        let context = Context::default();
        let operators: Vec<Box<dyn PotentialOperator>> = vec![
            Box::new(laplace_single_layer_potential(&context)),
            Box::new(helmholtz_single_layer_potential(&context, 1.0)),
            Box::new(laplace_single_layer_gradient_potential(&context)),
        ];
        let counts: Vec<usize> = operators.iter().map(|op| op.component_count()).collect();
        assert_eq!(counts, vec![1, 1, 3]);
    }
}
