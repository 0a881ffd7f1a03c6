//! Quadrature-based potential evaluation at arbitrary points
//!
//! For every target `x` the density is integrated over each element with
//! the rule chosen by the quadrature strategy:
//!
//! - single layer: `∫ G(x,y) φ(y) dS_y`
//! - double layer: `∫ ∂G/∂n_y(x,y) φ(y) dS_y`
//! - single-layer gradient: `∫ ∇_x G(x,y) φ(y) dS_y`

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::context::{EvaluationOptions, QuadratureStrategy};
use crate::core::error::{BemError, Result};
use crate::core::grid_function::GridFunction;
use crate::core::integration::{SubdivisionRule, element_quadrature};
use crate::core::kernels::Kernel;
use crate::core::parallel::map_indexed;
use crate::core::potential::PotentialKind;
use crate::core::types::{Point3, dot, norm, sub};

/// Evaluate a kernel potential at `points` (N × 3)
///
/// Returns an `N × components` array.
pub fn evaluate_kernel_potential<K: Kernel>(
    kernel: &K,
    kind: PotentialKind,
    grid_function: &GridFunction,
    points: &Array2<f64>,
    quadrature: &QuadratureStrategy,
    options: &EvaluationOptions,
) -> Result<Array2<Complex64>> {
    check_points(points)?;
    quadrature.validate()?;

    let n_points = points.nrows();
    let components = kind.component_count();
    let rule = quadrature.subdivision_rule();
    let cutoff = quadrature.singular_cutoff;

    log::debug!(
        "{} {} potential: {} targets, far order {}, near order {}, max {} subdivisions",
        kernel.name(),
        kind,
        n_points,
        rule.far_order,
        rule.near_order,
        rule.max_subdivisions
    );

    let start = std::time::Instant::now();

    let rows = map_indexed(n_points, options.parallelization, |i| {
        let x = [points[[i, 0]], points[[i, 1]], points[[i, 2]]];
        evaluate_at_point(kernel, kind, grid_function, &x, &rule, cutoff)
    })?;

    let mut values = Array2::zeros((n_points, components));
    for (i, row) in rows.iter().enumerate() {
        for c in 0..components {
            values[[i, c]] = row[c];
        }
    }

    if options.verbose {
        log::info!(
            "Evaluated {} {} potential at {} points over {} elements in {:.3?}",
            kernel.name(),
            kind,
            n_points,
            grid_function.space().grid().element_count(),
            start.elapsed()
        );
    }

    Ok(values)
}

/// Integrate the potential at one target over all elements
fn evaluate_at_point<K: Kernel>(
    kernel: &K,
    kind: PotentialKind,
    grid_function: &GridFunction,
    x: &Point3,
    rule: &SubdivisionRule,
    cutoff: f64,
) -> [Complex64; 3] {
    let grid = grid_function.space().grid();
    let zero = Complex64::new(0.0, 0.0);
    let mut acc = [zero; 3];

    for (element, geom) in grid.geometries().iter().enumerate() {
        let jacobian = 2.0 * geom.area;
        let points = element_quadrature(x, geom.diameter, rule, |xi, eta| {
            grid.local_to_global(element, xi, eta)
        });

        for q in points {
            let y = grid.local_to_global(element, q.xi, q.eta);
            // d = x - y
            let d = sub(x, &y);
            let r = norm(&d);
            if r < cutoff {
                continue;
            }

            let density =
                grid_function.evaluate_local(element, q.xi, q.eta) * (q.weight * jacobian);
            if density == zero {
                continue;
            }

            match kind {
                PotentialKind::SingleLayer => {
                    acc[0] += kernel.value(r) * density;
                }
                PotentialKind::DoubleLayer => {
                    // (y - x)·n_y / r
                    let cos_angle = -dot(&d, &geom.normal) / r;
                    acc[0] += kernel.radial_derivative(r) * (cos_angle * density);
                }
                PotentialKind::SingleLayerGradient => {
                    let scaled = kernel.radial_derivative(r) * density / r;
                    for c in 0..3 {
                        acc[c] += scaled * d[c];
                    }
                }
            }
        }
    }

    acc
}

fn check_points(points: &Array2<f64>) -> Result<()> {
    if points.ncols() != 3 {
        return Err(BemError::DimensionMismatch {
            what: "evaluation point coordinates",
            expected: 3,
            got: points.ncols(),
        });
    }
    if let Some(i) = points
        .rows()
        .into_iter()
        .position(|p| p.iter().any(|c| !c.is_finite()))
    {
        return Err(BemError::InvalidParameters(format!(
            "evaluation point {} has non-finite coordinates",
            i
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::structured_grid;
    use crate::core::kernels::LaplaceKernel;
    use crate::core::space::function_space;
    use ndarray::array;
    use std::sync::Arc;

    fn unit_density() -> GridFunction {
        let grid = Arc::new(structured_grid((-0.5, -0.5), (0.5, 0.5), (4, 4)).unwrap());
        let space = function_space(grid, "DP", 0).unwrap();
        GridFunction::constant(space, Complex64::new(1.0, 0.0))
    }

    #[test]
    fn test_rejects_wrong_point_shape() {
        let points = Array2::<f64>::zeros((4, 2));
        let err = evaluate_kernel_potential(
            &LaplaceKernel,
            PotentialKind::SingleLayer,
            &unit_density(),
            &points,
            &QuadratureStrategy::default(),
            &EvaluationOptions::sequential(),
        )
        .unwrap_err();
        assert!(matches!(err, BemError::DimensionMismatch { got: 2, .. }));
    }

    #[test]
    fn test_rejects_non_finite_points() {
        let points = array![[0.0, 0.0, 1.0], [f64::NAN, 0.0, 0.0]];
        let result = evaluate_kernel_potential(
            &LaplaceKernel,
            PotentialKind::SingleLayer,
            &unit_density(),
            &points,
            &QuadratureStrategy::default(),
            &EvaluationOptions::sequential(),
        );
        assert!(matches!(result, Err(BemError::InvalidParameters(_))));
    }

    #[test]
    fn test_far_field_behaves_like_point_charge() {
        // A unit square of unit density seen from far away is a unit charge
        let points = array![[0.0, 0.0, 50.0]];
        let values = evaluate_kernel_potential(
            &LaplaceKernel,
            PotentialKind::SingleLayer,
            &unit_density(),
            &points,
            &QuadratureStrategy::default(),
            &EvaluationOptions::sequential(),
        )
        .unwrap();

        let expected = 1.0 / (4.0 * std::f64::consts::PI * 50.0);
        assert!((values[[0, 0]].re - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn test_double_layer_of_flat_sheet_is_antisymmetric() {
        let points = array![[0.1, 0.0, 0.3], [0.1, 0.0, -0.3]];
        let values = evaluate_kernel_potential(
            &LaplaceKernel,
            PotentialKind::DoubleLayer,
            &unit_density(),
            &points,
            &QuadratureStrategy::default(),
            &EvaluationOptions::sequential(),
        )
        .unwrap();

        // Positive on the side the normal points to
        assert!(values[[0, 0]].re > 0.0);
        assert!((values[[0, 0]] + values[[1, 0]]).norm() < 1e-12);
    }

    #[test]
    fn test_gradient_has_three_components() {
        let points = array![[0.0, 0.0, 2.0]];
        let values = evaluate_kernel_potential(
            &LaplaceKernel,
            PotentialKind::SingleLayerGradient,
            &unit_density(),
            &points,
            &QuadratureStrategy::default(),
            &EvaluationOptions::sequential(),
        )
        .unwrap();

        assert_eq!(values.dim(), (1, 3));
        // The potential decreases away from the sheet
        assert!(values[[0, 2]].re < 0.0);
        assert!(values[[0, 0]].norm() < 1e-12);
        assert!(values[[0, 1]].norm() < 1e-12);
    }
}
