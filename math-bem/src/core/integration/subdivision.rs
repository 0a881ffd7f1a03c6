//! Adaptive subdivision of elements close to an evaluation point
//!
//! Near-field targets see a rapidly varying kernel, so the element is split
//! in reference coordinates into four congruent sub-triangles until each
//! piece is far enough away (relative to its own size) or the subdivision
//! limit is reached. Each leaf carries the rule order it should be
//! integrated with.

use crate::core::integration::gauss::triangle_quadrature;
use crate::core::types::{Point3, distance};

/// A triangle in the reference coordinates of its parent element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubTriangle {
    /// Corners as `(xi, eta)`
    pub corners: [(f64, f64); 3],
    /// Subdivision depth (0 = whole element)
    pub level: usize,
}

impl SubTriangle {
    /// The whole reference triangle
    pub fn reference() -> Self {
        Self {
            corners: [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)],
            level: 0,
        }
    }

    /// Split into four congruent children through the edge midpoints
    pub fn split(&self) -> [SubTriangle; 4] {
        let [a, b, c] = self.corners;
        let mid = |p: (f64, f64), q: (f64, f64)| ((p.0 + q.0) / 2.0, (p.1 + q.1) / 2.0);
        let ab = mid(a, b);
        let bc = mid(b, c);
        let ca = mid(c, a);
        let level = self.level + 1;
        [
            SubTriangle { corners: [a, ab, ca], level },
            SubTriangle { corners: [ab, b, bc], level },
            SubTriangle { corners: [ca, bc, c], level },
            SubTriangle { corners: [ab, bc, ca], level },
        ]
    }

    /// Centroid in reference coordinates
    pub fn centroid(&self) -> (f64, f64) {
        let [a, b, c] = self.corners;
        ((a.0 + b.0 + c.0) / 3.0, (a.1 + b.1 + c.1) / 3.0)
    }

    /// `|det|` of the affine map from the reference triangle, i.e. twice
    /// the sub-triangle area in reference coordinates
    pub fn jacobian(&self) -> f64 {
        let [a, b, c] = self.corners;
        ((b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)).abs()
    }

    /// Map a point of the reference triangle into this sub-triangle
    pub fn map(&self, xi: f64, eta: f64) -> (f64, f64) {
        let [a, b, c] = self.corners;
        let l0 = 1.0 - xi - eta;
        (
            l0 * a.0 + xi * b.0 + eta * c.0,
            l0 * a.1 + xi * b.1 + eta * c.1,
        )
    }
}

/// A quadrature point expressed in the parent element's reference coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementQuadraturePoint {
    /// Parent reference coordinate
    pub xi: f64,
    /// Parent reference coordinate
    pub eta: f64,
    /// Weight in the parent reference triangle (sums to 0.5 over the element)
    pub weight: f64,
}

/// Deepest subdivision a strategy may request (at most `4^8` leaves per element)
pub const MAX_SUBDIVISION_DEPTH: usize = 8;

/// Largest near-field radius, in element diameters, a strategy may request
pub const MAX_NEAR_FIELD_RATIO: f64 = 10.0;

/// Subdivision parameters derived from a quadrature strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubdivisionRule {
    /// Rule order away from the target
    pub far_order: usize,
    /// Rule order inside the near field
    pub near_order: usize,
    /// Near-field radius as a multiple of the (sub)element diameter
    pub near_field_ratio: f64,
    /// Maximum subdivision depth
    pub max_subdivisions: usize,
}

/// Build quadrature points on one element for a target point.
///
/// `to_global` maps parent reference coordinates to physical space and
/// `diameter` is the physical diameter of the parent element.
pub fn element_quadrature<F>(
    target: &Point3,
    diameter: f64,
    rule: &SubdivisionRule,
    to_global: F,
) -> Vec<ElementQuadraturePoint>
where
    F: Fn(f64, f64) -> Point3,
{
    let mut points = Vec::new();
    let mut stack = vec![SubTriangle::reference()];

    while let Some(tri) = stack.pop() {
        // Every split halves the physical diameter
        let sub_diameter = diameter / (1u64 << tri.level.min(62)) as f64;
        let (cx, cy) = tri.centroid();
        let dist = distance(target, &to_global(cx, cy));
        let near = dist < rule.near_field_ratio * sub_diameter;

        if near && tri.level < rule.max_subdivisions {
            stack.extend(tri.split());
            continue;
        }

        let order = if near { rule.near_order } else { rule.far_order };
        let jac = tri.jacobian();
        for q in triangle_quadrature(order) {
            let (xi, eta) = tri.map(q.xi, q.eta);
            points.push(ElementQuadraturePoint {
                xi,
                eta,
                weight: q.weight * jac,
            });
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(xi: f64, eta: f64) -> Point3 {
        [xi, eta, 0.0]
    }

    fn rule(max_subdivisions: usize) -> SubdivisionRule {
        SubdivisionRule {
            far_order: 2,
            near_order: 4,
            near_field_ratio: 2.0,
            max_subdivisions,
        }
    }

    #[test]
    fn test_split_preserves_area() {
        let tri = SubTriangle::reference();
        let children = tri.split();
        let total: f64 = children.iter().map(|c| c.jacobian()).sum();
        assert!((total - tri.jacobian()).abs() < 1e-14);
        assert!(children.iter().all(|c| c.level == 1));
    }

    #[test]
    fn test_far_target_uses_single_rule() {
        let points = element_quadrature(&[0.0, 0.0, 100.0], 1.5, &rule(4), flat);
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn test_near_target_subdivides() {
        let points = element_quadrature(&[0.3, 0.3, 0.01], 1.5, &rule(3), flat);
        assert!(points.len() > 13);

        // Weights must still integrate the constant function exactly
        let sum: f64 = points.iter().map(|p| p.weight).sum();
        assert!((sum - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_no_subdivision_when_disabled() {
        let points = element_quadrature(&[0.3, 0.3, 0.01], 1.5, &rule(0), flat);
        assert_eq!(points.len(), 13);
    }
}
