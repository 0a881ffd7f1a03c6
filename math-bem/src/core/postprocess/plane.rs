//! Potential evaluation on a plane (for field maps)
//!
//! A `nx × ny` parametric grid on the unit square `(s, t) ∈ [0,1]²` is
//! mapped into 3D by
//!
//! ```text
//! x = xmin + s (xmax - xmin)
//! y = ymin + t (ymax - ymin)
//! z = zmin + (s + t) (zmax - zmin) / 2
//! ```
//!
//! so the plane runs from `(xmin, ymin, zmin)` to `(xmax, ymax, zmax)`.
//! Points are ordered with `s` varying fastest: point `k = j * nx + i`
//! sits at `(s_i, t_j)`.

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::context::{EvaluationOptions, QuadratureStrategy, create_evaluation_options};
use crate::core::error::{BemError, Result};
use crate::core::grid_function::GridFunction;
use crate::core::potential::PotentialOperator;
use crate::core::types::Point3;

/// Extent of a sampling plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneLimits {
    /// x at `s = 0`
    pub xmin: f64,
    /// x at `s = 1`
    pub xmax: f64,
    /// y at `t = 0`
    pub ymin: f64,
    /// y at `t = 1`
    pub ymax: f64,
    /// z at `s = t = 0`
    pub zmin: f64,
    /// z at `s = t = 1`
    pub zmax: f64,
}

impl PlaneLimits {
    /// Create limits from `(xmin, xmax, ymin, ymax, zmin, zmax)`
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64, zmin: f64, zmax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            zmin,
            zmax,
        }
    }

    /// Horizontal plane `z = height` over `[xmin, xmax] × [ymin, ymax]`
    pub fn horizontal(xmin: f64, xmax: f64, ymin: f64, ymax: f64, height: f64) -> Self {
        Self::new(xmin, xmax, ymin, ymax, height, height)
    }

    /// Bounds as `[xmin, xmax, ymin, ymax, zmin, zmax]`
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.xmin, self.xmax, self.ymin, self.ymax, self.zmin, self.zmax,
        ]
    }

    /// Check that all bounds are finite
    pub fn validate(&self) -> Result<()> {
        if self.to_array().iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(BemError::InvalidParameters(format!(
                "plane limits must be finite, got {:?}",
                self.to_array()
            )))
        }
    }

    /// Map parametric coordinates `(s, t)` to a point in space
    #[inline]
    pub fn map(&self, s: f64, t: f64) -> Point3 {
        [
            self.xmin + s * (self.xmax - self.xmin),
            self.ymin + t * (self.ymax - self.ymin),
            self.zmin + (s + t) * (self.zmax - self.zmin) / 2.0,
        ]
    }
}

impl From<[f64; 6]> for PlaneLimits {
    fn from(v: [f64; 6]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }
}

impl From<(f64, f64, f64, f64, f64, f64)> for PlaneLimits {
    fn from(v: (f64, f64, f64, f64, f64, f64)) -> Self {
        Self::new(v.0, v.1, v.2, v.3, v.4, v.5)
    }
}

/// `i`-th of `n` equally spaced parameters on `[0, 1]`
///
/// A single sample sits at 0.
#[inline]
fn unit_parameter(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.0
    } else {
        i as f64 / (n - 1) as f64
    }
}

/// `nx * ny` when an `(nx * ny) × 3` array can be addressed
pub(crate) fn point_count(nx: usize, ny: usize) -> Option<usize> {
    nx.checked_mul(ny)
        .filter(|n| n.checked_mul(3).is_some_and(|len| len <= isize::MAX as usize))
}

/// Sample points on a plane
///
/// # Arguments
/// * `limits` - Plane extent
/// * `dimensions` - `(nx, ny)` samples along the two parametric axes
///
/// # Returns
/// `(nx * ny) × 3` array of points, first parametric axis varying fastest
pub fn plane_points(limits: &PlaneLimits, dimensions: (usize, usize)) -> Result<Array2<f64>> {
    limits.validate()?;
    let (nx, ny) = dimensions;
    let count = point_count(nx, ny).ok_or_else(|| {
        BemError::InvalidParameters(format!("plane of {} x {} points is too large", nx, ny))
    })?;

    let mut points = Array2::zeros((count, 3));
    for j in 0..ny {
        let t = unit_parameter(j, ny);
        for i in 0..nx {
            let s = unit_parameter(i, nx);
            let p = limits.map(s, t);
            let k = j * nx + i;
            points[[k, 0]] = p[0];
            points[[k, 1]] = p[1];
            points[[k, 2]] = p[2];
        }
    }
    Ok(points)
}

/// Result of sampling a potential on a plane
#[derive(Debug, Clone)]
pub struct PlaneEvaluation {
    /// Sample points (`nx * ny` × 3)
    pub points: Array2<f64>,
    /// Potential values (`nx * ny` × components)
    pub values: Array2<Complex64>,
    /// `(nx, ny)`
    pub dimensions: (usize, usize),
    /// Plane extent
    pub limits: PlaneLimits,
}

impl PlaneEvaluation {
    /// Number of sample points
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// Whether the plane has no samples
    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// Number of values per point
    pub fn component_count(&self) -> usize {
        self.values.ncols()
    }

    /// Values of one component at every point
    pub fn component(&self, component: usize) -> Option<ArrayView1<'_, Complex64>> {
        (component < self.values.ncols()).then(|| self.values.column(component))
    }

    /// Magnitude per point: `|v|` for scalars, Euclidean norm for vectors
    pub fn magnitudes(&self) -> Array1<f64> {
        self.values
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt())
            .collect()
    }

    /// One component laid out as an image (`ny` rows × `nx` columns)
    pub fn component_grid(&self, component: usize) -> Option<Array2<Complex64>> {
        let (nx, ny) = self.dimensions;
        let column = self.component(component)?;
        Array2::from_shape_vec((ny, nx), column.to_vec()).ok()
    }
}

/// Evaluate a potential operator on a plane
///
/// # Arguments
/// * `potential` - Potential operator
/// * `grid_function` - Density the potential acts on
/// * `limits` - Plane extent
/// * `dimensions` - `(nx, ny)` samples along the two parametric axes
/// * `evaluation_options` - Defaults to [`create_evaluation_options`]
/// * `quadrature` - Defaults to the operator's own strategy
///
/// # Returns
/// The sample points and one row of values per point. Errors from the
/// operator are returned unchanged.
pub fn evaluate_potential_on_plane<P>(
    potential: &P,
    grid_function: &GridFunction,
    limits: &PlaneLimits,
    dimensions: (usize, usize),
    evaluation_options: Option<&EvaluationOptions>,
    quadrature: Option<&QuadratureStrategy>,
) -> Result<PlaneEvaluation>
where
    P: PotentialOperator + ?Sized,
{
    let points = plane_points(limits, dimensions)?;

    let default_options;
    let options = match evaluation_options {
        Some(options) => options,
        None => {
            default_options = create_evaluation_options();
            &default_options
        }
    };
    let quadrature = quadrature.unwrap_or_else(|| potential.quadrature_strategy());

    if options.verbose {
        log::info!(
            "Sampling {} on a {} x {} plane from ({}, {}, {}) to ({}, {}, {})",
            potential.label(),
            dimensions.0,
            dimensions.1,
            limits.xmin,
            limits.ymin,
            limits.zmin,
            limits.xmax,
            limits.ymax,
            limits.zmax
        );
    }

    let values = potential.evaluate_at_points(grid_function, &points, quadrature, options)?;
    if values.nrows() != points.nrows() {
        return Err(BemError::DimensionMismatch {
            what: "potential values",
            expected: points.nrows(),
            got: values.nrows(),
        });
    }

    Ok(PlaneEvaluation {
        points,
        values,
        dimensions,
        limits: *limits,
    })
}
