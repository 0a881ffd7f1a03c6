//! Gauss quadrature rules on the reference triangle
//!
//! Rules of degree 1, 2, 3 and 4 on the triangle with vertices (0,0),
//! (1,0), (0,1). Weights sum to 0.5, the area of the reference triangle.

/// Highest supported rule order
pub const MAX_TRIANGLE_ORDER: usize = 4;

/// Quadrature point on the reference triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraturePoint {
    /// First reference coordinate
    pub xi: f64,
    /// Second reference coordinate
    pub eta: f64,
    /// Weight (reference triangle area convention)
    pub weight: f64,
}

/// Triangle quadrature points for a rule order in `1..=4`
///
/// | order | points | exact for degree |
/// |-------|--------|------------------|
/// | 1     | 1      | 1                |
/// | 2     | 4      | 3                |
/// | 3     | 7      | 5                |
/// | 4     | 13     | 7                |
///
/// Orders above 4 use the 13-point rule; order 0 uses the centroid rule.
pub fn triangle_quadrature(order: usize) -> Vec<QuadraturePoint> {
    // Tables are normalised to the unit simplex (weights sum to 1)
    const AREA_SCALE: f64 = 0.5;
    let table: &[[f64; 3]] = match order {
        0 | 1 => &GAUCORWEI_TR1,
        2 => &GAUCORWEI_TR4,
        3 => &GAUCORWEI_TR7,
        _ => &GAUCORWEI_TR13,
    };
    table
        .iter()
        .map(|&[xi, eta, w]| QuadraturePoint {
            xi,
            eta,
            weight: w * AREA_SCALE,
        })
        .collect()
}

/// Number of points used by a rule order
pub fn triangle_rule_size(order: usize) -> usize {
    match order {
        0 | 1 => 1,
        2 => 4,
        3 => 7,
        _ => 13,
    }
}

static GAUCORWEI_TR1: [[f64; 3]; 1] = [[1.0 / 3.0, 1.0 / 3.0, 1.0]];

static GAUCORWEI_TR4: [[f64; 3]; 4] = [
    [1.0 / 3.0, 1.0 / 3.0, -0.5625],
    [0.6, 0.2, 0.520833333333333],
    [0.2, 0.6, 0.520833333333333],
    [0.2, 0.2, 0.520833333333333],
];

static GAUCORWEI_TR7: [[f64; 3]; 7] = [
    [1.0 / 3.0, 1.0 / 3.0, 0.225],
    [0.797426985353087, 0.101286507323456, 0.125939180544827],
    [0.101286507323456, 0.797426985353087, 0.125939180544827],
    [0.101286507323456, 0.101286507323456, 0.125939180544827],
    [0.470142064105115, 0.059715871789770, 0.132394152788506],
    [0.059715871789770, 0.470142064105115, 0.132394152788506],
    [0.470142064105115, 0.470142064105115, 0.132394152788506],
];

static GAUCORWEI_TR13: [[f64; 3]; 13] = [
    [1.0 / 3.0, 1.0 / 3.0, -0.149570044467682],
    [0.260345966079040, 0.260345966079040, 0.175615257433208],
    [0.260345966079040, 0.479308067841920, 0.175615257433208],
    [0.479308067841920, 0.260345966079040, 0.175615257433208],
    [0.065130102902216, 0.065130102902216, 0.053347235608838],
    [0.065130102902216, 0.869739794195568, 0.053347235608838],
    [0.869739794195568, 0.065130102902216, 0.053347235608838],
    [0.638444188569810, 0.048690315425316, 0.077113760890257],
    [0.048690315425316, 0.638444188569810, 0.077113760890257],
    [0.638444188569810, 0.312865496004874, 0.077113760890257],
    [0.312865496004874, 0.638444188569810, 0.077113760890257],
    [0.048690315425316, 0.312865496004874, 0.077113760890257],
    [0.312865496004874, 0.048690315425316, 0.077113760890257],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_reference_area() {
        for order in 1..=MAX_TRIANGLE_ORDER {
            let rule = triangle_quadrature(order);
            assert_eq!(rule.len(), triangle_rule_size(order));

            let sum: f64 = rule.iter().map(|q| q.weight).sum();
            assert!((sum - 0.5).abs() < 1e-10, "order {}: sum={}", order, sum);
        }
    }

    #[test]
    fn test_points_inside_reference_triangle() {
        for order in 1..=MAX_TRIANGLE_ORDER {
            for q in triangle_quadrature(order) {
                assert!(q.xi >= 0.0 && q.eta >= 0.0 && q.xi + q.eta <= 1.0 + 1e-12);
            }
        }
    }

    #[test]
    fn test_polynomial_exactness() {
        // Integral of xi^2 over the reference triangle is 1/12
        let rule = triangle_quadrature(3);
        let integral: f64 = rule.iter().map(|q| q.weight * q.xi * q.xi).sum();
        assert!((integral - 1.0 / 12.0).abs() < 1e-10);

        // Integral of xi * eta is 1/24
        let rule = triangle_quadrature(2);
        let integral: f64 = rule.iter().map(|q| q.weight * q.xi * q.eta).sum();
        assert!((integral - 1.0 / 24.0).abs() < 1e-10);
    }
}
