//! Four-momentum algebra
//!
//! Components are stored as `(p_x, p_y, p_z, E)`, following the
//! ordering used throughout the kinematics mappings in
//! [`crate::process`]. The transverse momentum is cached since it is
//! read far more often than it changes.

use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

/// A four-momentum `(p_x, p_y, p_z, E)`
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct FourMomentum {
    p: [N64; 4],
    pt: N64,
}

const PX: usize = 0;
const PY: usize = 1;
const PZ: usize = 2;
const E: usize = 3;

impl FourMomentum {
    /// Construct from Cartesian components
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self::from_n64([n64(px), n64(py), n64(pz), n64(e)])
    }

    /// Construct from Cartesian components already wrapped in [N64]
    pub fn from_n64(p: [N64; 4]) -> Self {
        let mut res = Self {
            p,
            pt: n64(0.),
        };
        res.update_pt();
        res
    }

    /// Construct from cylindrical coordinates `(p_T, eta, phi, E)`
    pub fn from_cylindrical(pt: f64, eta: f64, phi: f64, e: f64) -> Self {
        let pt = n64(pt);
        let px = pt * n64(phi).cos();
        let py = pt * n64(phi).sin();
        let pz = pt * n64(eta).sinh();
        Self::from_n64([px, py, pz, n64(e)])
    }

    /// Construct from spherical coordinates `(|p|, theta, phi, E)`
    pub fn from_spherical(p_mag: f64, theta: f64, phi: f64, e: f64) -> Self {
        let p_mag = n64(p_mag);
        let theta = n64(theta);
        let phi = n64(phi);
        let px = p_mag * theta.sin() * phi.cos();
        let py = p_mag * theta.sin() * phi.sin();
        let pz = p_mag * theta.cos();
        Self::from_n64([px, py, pz, n64(e)])
    }

    /// Build an on-shell four-momentum along +z with the given energy and mass
    pub fn on_shell_along_z(e: f64, mass: f64, forward: bool) -> Self {
        let p = (e * e - mass * mass).max(0.).sqrt();
        let pz = if forward { p } else { -p };
        Self::new(0., 0., pz, e)
    }

    fn update_pt(&mut self) {
        self.pt = (self.p[PX] * self.p[PX] + self.p[PY] * self.p[PY]).sqrt();
    }

    /// x component
    pub fn px(&self) -> N64 {
        self.p[PX]
    }
    /// y component
    pub fn py(&self) -> N64 {
        self.p[PY]
    }
    /// z component
    pub fn pz(&self) -> N64 {
        self.p[PZ]
    }
    /// energy component
    pub fn e(&self) -> N64 {
        self.p[E]
    }

    /// Transverse momentum `p_T = sqrt(p_x^2 + p_y^2)`
    pub fn pt(&self) -> N64 {
        self.pt
    }

    /// Squared three-momentum `|p|^2`
    pub fn p_sq(&self) -> N64 {
        self.p[PX] * self.p[PX] + self.p[PY] * self.p[PY] + self.p[PZ] * self.p[PZ]
    }

    /// Three-momentum magnitude `|p|`
    pub fn p_mag(&self) -> N64 {
        self.p_sq().sqrt()
    }

    /// Invariant mass squared `E^2 - |p|^2`
    pub fn mass_sq(&self) -> N64 {
        self.p[E] * self.p[E] - self.p_sq()
    }

    /// Invariant mass `sqrt(max(0, E^2 - |p|^2))`
    pub fn mass(&self) -> N64 {
        self.mass_sq().max(n64(0.)).sqrt()
    }

    /// Force this momentum on shell with the given mass by rescaling the energy,
    /// keeping the three-momentum fixed
    pub fn set_mass(&mut self, mass: N64) {
        self.p[E] = (self.p_sq() + mass * mass).sqrt();
    }

    /// Pseudorapidity `eta = atanh(p_z / |p|)`
    pub fn eta(&self) -> N64 {
        let p = self.p_mag();
        if p == self.p[PZ].abs() {
            return if self.p[PZ] >= 0. {
                n64(f64::INFINITY)
            } else {
                n64(f64::NEG_INFINITY)
            };
        }
        n64(0.5) * ((p + self.p[PZ]) / (p - self.p[PZ])).ln()
    }

    /// Rapidity `y = 0.5 ln((E + p_z) / (E - p_z))`
    pub fn rapidity(&self) -> N64 {
        n64(0.5) * ((self.p[E] + self.p[PZ]) / (self.p[E] - self.p[PZ])).ln()
    }

    /// Azimuthal angle in `(-pi, pi]`
    pub fn phi(&self) -> N64 {
        n64(self.p[PY].raw().atan2(self.p[PX].raw()))
    }

    /// Three-vector scalar product
    pub fn dot3(&self, rhs: &Self) -> N64 {
        self.p[PX] * rhs.p[PX] + self.p[PY] * rhs.p[PY] + self.p[PZ] * rhs.p[PZ]
    }

    /// Four-vector (Minkowski) scalar product, metric `(+,-,-,-)`
    pub fn dot4(&self, rhs: &Self) -> N64 {
        self.p[E] * rhs.p[E] - self.dot3(rhs)
    }

    /// Scale all components by a scalar factor
    pub fn scale(mut self, factor: N64) -> Self {
        for c in self.p.iter_mut() {
            *c *= factor;
        }
        self.update_pt();
        self
    }

    /// Rotate around the z axis by `phi`, optionally reflected by `sign`
    ///
    /// `sign = -1` is not a rotation by any angle, it's a reflection
    /// composed with the rotation (determinant `-1`), so it can't be
    /// folded into `phi` itself.
    pub fn rotate_phi(mut self, phi: N64, sign: N64) -> Self {
        let (s, c) = phi.raw().sin_cos();
        let (s, c) = (n64(s), n64(c));
        let (px, py) = (self.p[PX], self.p[PY]);
        self.p[PX] = c * px + s * py * sign;
        self.p[PY] = -s * px + c * py * sign;
        self.update_pt();
        self
    }

    /// Rotate by polar angle `theta` then azimuth `phi`
    pub fn rotate(mut self, theta: N64, phi: N64) -> Self {
        let (st, ct) = theta.raw().sin_cos();
        let (st, ct) = (n64(st), n64(ct));
        let (px, py, pz) = (self.p[PX], self.p[PY], self.p[PZ]);
        // rotate around y by theta
        let px1 = ct * px + st * pz;
        let pz1 = -st * px + ct * pz;
        self.p[PX] = px1;
        self.p[PZ] = pz1;
        self.p[PY] = py;
        self = self.rotate_phi(phi, n64(1.));
        self
    }

    /// Boost along z by rapidity-equivalent `(beta, gamma)`
    pub fn boost_z(mut self, beta: N64, gamma: N64) -> Self {
        let (e, pz) = (self.p[E], self.p[PZ]);
        self.p[E] = gamma * (e + beta * pz);
        self.p[PZ] = gamma * (pz + beta * e);
        self.update_pt();
        self
    }

    /// General Lorentz boost into the rest frame of `frame`
    ///
    /// Follows the textbook construction used throughout the LPAIR-style
    /// kinematics: `frame` need not be normalised to its own mass, the
    /// boost parameters are derived from `frame.e()`/`frame.mass()`.
    pub fn boost_by(mut self, frame: &Self) -> Self {
        let m = frame.mass();
        if m <= 0. {
            return self;
        }
        let e_f = frame.e();
        let betax = frame.px() / e_f;
        let betay = frame.py() / e_f;
        let betaz = frame.pz() / e_f;
        let beta2 = betax * betax + betay * betay + betaz * betaz;
        let gamma = n64(1.) / (n64(1.) - beta2).max(n64(1e-16)).sqrt();
        let bp = betax * self.p[PX] + betay * self.p[PY] + betaz * self.p[PZ];
        let gamma2 = if beta2 > 0. {
            (gamma - n64(1.)) / beta2
        } else {
            n64(0.)
        };
        let e0 = self.p[E];
        self.p[PX] += gamma2 * bp * betax + gamma * betax * e0;
        self.p[PY] += gamma2 * bp * betay + gamma * betay * e0;
        self.p[PZ] += gamma2 * bp * betaz + gamma * betaz * e0;
        self.p[E] = gamma * (e0 + bp);
        self.update_pt();
        self
    }
}

impl std::ops::Index<usize> for FourMomentum {
    type Output = N64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl std::ops::Add for FourMomentum {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        for i in 0..4 {
            self.p[i] += rhs.p[i];
        }
        self.update_pt();
        self
    }
}

impl std::ops::AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..4 {
            self.p[i] += rhs.p[i];
        }
        self.update_pt();
    }
}

impl std::ops::Sub for FourMomentum {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self::Output {
        for i in 0..4 {
            self.p[i] -= rhs.p[i];
        }
        self.update_pt();
        self
    }
}

impl std::ops::Neg for FourMomentum {
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        for c in self.p.iter_mut() {
            *c = -*c;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: N64, b: N64, eps: f64) -> bool {
        (a - b).abs() < n64(eps)
    }

    #[test]
    fn mass_shell() {
        let p = FourMomentum::on_shell_along_z(100., 0.10566, true);
        assert!(approx_eq(p.mass_sq(), n64(0.10566 * 0.10566), 1e-6));
    }

    #[test]
    fn addition_conserves_energy() {
        let a = FourMomentum::new(1., 2., 3., 10.);
        let b = FourMomentum::new(-1., 0.5, 1., 5.);
        let sum = a + b;
        assert!(approx_eq(sum.e(), n64(15.), 1e-12));
        assert!(approx_eq(sum.px(), n64(0.), 1e-12));
    }

    #[test]
    fn boost_z_roundtrip() {
        let p = FourMomentum::new(1., 1., 5., 10.);
        let beta = n64(0.3);
        let gamma = n64(1.) / (n64(1.) - beta * beta).sqrt();
        let boosted = p.boost_z(beta, gamma);
        let back = boosted.boost_z(-beta, gamma);
        assert!(approx_eq(back.e(), p.e(), 1e-9));
        assert!(approx_eq(back.pz(), p.pz(), 1e-9));
    }

    #[test]
    fn boost_by_preserves_mass() {
        let frame = FourMomentum::new(1., 0., 2., 5.);
        let p = FourMomentum::new(0.5, 0.2, 0.1, 1.0);
        let boosted = p.boost_by(&frame);
        assert!(approx_eq(boosted.mass_sq(), p.mass_sq(), 1e-9));
    }

    #[test]
    fn pt_eta_phi() {
        let p = FourMomentum::from_cylindrical(20., 1.0, 0.5, 40.);
        assert!(approx_eq(p.pt(), n64(20.), 1e-9));
        assert!(approx_eq(p.eta(), n64(1.0), 1e-6));
        assert!(approx_eq(p.phi(), n64(0.5), 1e-9));
    }
}
