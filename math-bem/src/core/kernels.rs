//! Green's functions of the 3D Laplace and Helmholtz equations
//!
//! All kernels are radial: they are described by their value `G(r)` and
//! radial derivative `dG/dr`. The potential evaluators derive the normal
//! and gradient kernels from these two quantities:
//!
//! - `∂G/∂n_y = dG/dr · (y - x)·n_y / r`
//! - `∇_x G = dG/dr · (x - y) / r`

use std::f64::consts::PI;
use std::fmt::Debug;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A radially symmetric Green's function
pub trait Kernel: Debug + Clone + Send + Sync {
    /// Short kernel name used in labels and logs
    fn name(&self) -> &'static str;

    /// `G(r)` for `r > 0`
    fn value(&self, r: f64) -> Complex64;

    /// `dG/dr` for `r > 0`
    fn radial_derivative(&self, r: f64) -> Complex64;
}

/// Laplace kernel `G(r) = 1 / (4πr)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaplaceKernel;

impl Kernel for LaplaceKernel {
    fn name(&self) -> &'static str {
        "laplace"
    }

    #[inline]
    fn value(&self, r: f64) -> Complex64 {
        Complex64::new(1.0 / (4.0 * PI * r), 0.0)
    }

    #[inline]
    fn radial_derivative(&self, r: f64) -> Complex64 {
        Complex64::new(-1.0 / (4.0 * PI * r * r), 0.0)
    }
}

/// Helmholtz kernel `G(r) = e^{ikr} / (4πr)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelmholtzKernel {
    /// Wave number `k`
    pub wavenumber: f64,
}

impl HelmholtzKernel {
    /// Create a Helmholtz kernel for wave number `k`
    pub fn new(wavenumber: f64) -> Self {
        Self { wavenumber }
    }
}

impl Kernel for HelmholtzKernel {
    fn name(&self) -> &'static str {
        "helmholtz"
    }

    #[inline]
    fn value(&self, r: f64) -> Complex64 {
        let kr = self.wavenumber * r;
        let re1 = 4.0 * PI * r;
        Complex64::new(kr.cos() / re1, kr.sin() / re1)
    }

    #[inline]
    fn radial_derivative(&self, r: f64) -> Complex64 {
        // dG/dr = G * (ik - 1/r)
        self.value(r) * Complex64::new(-1.0 / r, self.wavenumber)
    }
}

/// Modified Helmholtz (Yukawa) kernel `G(r) = e^{-ωr} / (4πr)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifiedHelmholtzKernel {
    /// Decay rate `ω`
    pub omega: f64,
}

impl ModifiedHelmholtzKernel {
    /// Create a modified Helmholtz kernel with decay rate `ω`
    pub fn new(omega: f64) -> Self {
        Self { omega }
    }
}

impl Kernel for ModifiedHelmholtzKernel {
    fn name(&self) -> &'static str {
        "modified_helmholtz"
    }

    #[inline]
    fn value(&self, r: f64) -> Complex64 {
        Complex64::new((-self.omega * r).exp() / (4.0 * PI * r), 0.0)
    }

    #[inline]
    fn radial_derivative(&self, r: f64) -> Complex64 {
        // dG/dr = -G * (ω + 1/r)
        -self.value(r) * (self.omega + 1.0 / r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finite_difference<K: Kernel>(kernel: &K, r: f64) -> Complex64 {
        let h = 1e-6;
        (kernel.value(r + h) - kernel.value(r - h)) / (2.0 * h)
    }

    #[test]
    fn test_laplace_value() {
        let g = LaplaceKernel.value(1.0);
        assert!((g.re - 1.0 / (4.0 * PI)).abs() < 1e-14);
        assert_eq!(g.im, 0.0);
    }

    #[test]
    fn test_helmholtz_reduces_to_laplace() {
        let helmholtz = HelmholtzKernel::new(0.0);
        let r = 0.7;
        assert!((helmholtz.value(r) - LaplaceKernel.value(r)).norm() < 1e-14);
        assert!(
            (helmholtz.radial_derivative(r) - LaplaceKernel.radial_derivative(r)).norm() < 1e-14
        );
    }

    #[test]
    fn test_radial_derivatives_match_finite_differences() {
        let r = 0.8;
        let laplace = LaplaceKernel;
        let helmholtz = HelmholtzKernel::new(3.0);
        let modified = ModifiedHelmholtzKernel::new(2.0);

        assert!((laplace.radial_derivative(r) - finite_difference(&laplace, r)).norm() < 1e-6);
        assert!((helmholtz.radial_derivative(r) - finite_difference(&helmholtz, r)).norm() < 1e-6);
        assert!((modified.radial_derivative(r) - finite_difference(&modified, r)).norm() < 1e-6);
    }

    #[test]
    fn test_helmholtz_magnitude_decays_as_inverse_distance() {
        let kernel = HelmholtzKernel::new(5.0);
        let ratio = kernel.value(1.0).norm() / kernel.value(2.0).norm();
        assert!((ratio - 2.0).abs() < 1e-12);
    }
}
