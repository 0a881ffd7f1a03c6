//! Evaluation point generators for lines and spheres

use std::f64::consts::PI;

use ndarray::Array2;

use crate::core::error::{BemError, Result};
use crate::core::types::Point3;

use super::plane::point_count;

/// Generate evaluation points along a line
///
/// # Arguments
/// * `start` - Start point
/// * `end` - End point
/// * `n_points` - Number of points (a single point sits at `start`)
///
/// # Returns
/// Array of points along the line (N × 3)
pub fn line_points(start: Point3, end: Point3, n_points: usize) -> Result<Array2<f64>> {
    if start.iter().chain(end.iter()).any(|c| !c.is_finite()) {
        return Err(BemError::InvalidParameters(
            "line end points must be finite".to_string(),
        ));
    }

    let mut points = Array2::zeros((n_points, 3));
    let denom = n_points.saturating_sub(1).max(1) as f64;
    for i in 0..n_points {
        let t = i as f64 / denom;
        for d in 0..3 {
            points[[i, d]] = start[d] + t * (end[d] - start[d]);
        }
    }
    Ok(points)
}

/// Generate evaluation points on a sphere
///
/// Polar angles sit at the centres of `n_theta` equal bands, so no point
/// lands on a pole.
///
/// # Arguments
/// * `center` - Sphere centre
/// * `radius` - Sphere radius
/// * `n_theta` - Number of polar divisions
/// * `n_phi` - Number of azimuthal divisions
///
/// # Returns
/// Array of points on the sphere (`n_theta * n_phi` × 3)
pub fn sphere_points(
    center: Point3,
    radius: f64,
    n_theta: usize,
    n_phi: usize,
) -> Result<Array2<f64>> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(BemError::InvalidParameters(format!(
            "sphere radius must be positive, got {}",
            radius
        )));
    }

    let count = point_count(n_theta, n_phi).ok_or_else(|| {
        BemError::InvalidParameters(format!(
            "sphere of {} x {} points is too large",
            n_theta, n_phi
        ))
    })?;

    let mut points = Array2::zeros((count, 3));
    for i in 0..n_theta {
        let theta = PI * (i as f64 + 0.5) / n_theta as f64;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for j in 0..n_phi {
            let phi = 2.0 * PI * j as f64 / n_phi as f64;
            let k = i * n_phi + j;
            points[[k, 0]] = center[0] + radius * sin_theta * phi.cos();
            points[[k, 1]] = center[1] + radius * sin_theta * phi.sin();
            points[[k, 2]] = center[2] + radius * cos_theta;
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_end_points() {
        let points = line_points([0.0, 0.0, 0.0], [2.0, 4.0, -6.0], 5).unwrap();
        assert_eq!(points.nrows(), 5);
        assert_eq!(points.row(4).to_vec(), vec![2.0, 4.0, -6.0]);
        assert!((points[[2, 1]] - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_line_single_point() {
        let points = line_points([1.0, 2.0, 3.0], [4.0, 5.0, 6.0], 1).unwrap();
        assert_eq!(points.row(0).to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(line_points([0.0; 3], [1.0; 3], 0).unwrap().nrows(), 0);
    }

    #[test]
    fn test_sphere_points_on_surface() {
        let center = [1.0, -1.0, 0.5];
        let points = sphere_points(center, 3.0, 6, 8).unwrap();
        assert_eq!(points.nrows(), 48);
        for row in points.rows() {
            let r = ((row[0] - center[0]).powi(2)
                + (row[1] - center[1]).powi(2)
                + (row[2] - center[2]).powi(2))
            .sqrt();
            assert!((r - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sphere_rejects_bad_radius() {
        assert!(sphere_points([0.0; 3], -1.0, 4, 4).is_err());
        assert!(sphere_points([0.0; 3], f64::NAN, 4, 4).is_err());
    }

    #[test]
    fn test_sphere_rejects_oversized_sampling() {
        assert!(matches!(
            sphere_points([0.0; 3], 1.0, usize::MAX, 3),
            Err(BemError::InvalidParameters(_))
        ));
    }
}
