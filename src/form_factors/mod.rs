//! Elastic form factors and inelastic structure functions
//!
//! Four parametrisations are selectable per incoming leg, each with the
//! same constants and algebraic form as the standard references below,
//! restructured into free functions plus a small dispatch enum rather
//! than functions returning through output parameters.

mod fiore_brasse;
mod suri_yennie;
mod szczurek_uleshchenko;

pub use fiore_brasse::fiore_brasse;
pub use suri_yennie::suri_yennie;
pub use szczurek_uleshchenko::{szczurek_uleshchenko, PartonDensities};

use serde::{Deserialize, Serialize};

/// Electric and magnetic form factors for one incoming leg
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormFactors {
    /// Electric form factor
    pub fe: f64,
    /// Magnetic form factor
    pub fm: f64,
}

/// Inelastic structure functions `F1, F2` for one incoming leg
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StructureFunctionValue {
    pub f1: f64,
    pub f2: f64,
}

/// Selectable structure-function parametrisation for inelastic legs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureFunctions {
    /// Point-like, `F_E = F_M = 1` (used for lepton beams)
    Trivial,
    /// Suri-Yennie low-Q² fit
    SuriYennie,
    /// Fiore-Brasse 56-bin resonance fit
    FioreBrasse,
    /// Szczurek-Uleshchenko PDF-based parametrisation
    SzczurekUleshchenko,
}

/// A parton distribution callback: `(x, Q^2) -> densities`
pub trait PartonDistributionFn: Fn(f64, f64) -> PartonDensities + Send + Sync {}
impl<F: Fn(f64, f64) -> PartonDensities + Send + Sync> PartonDistributionFn for F {}

/// `F_E = F_M = 1`, used for point-like (leptonic) vertices
pub fn trivial() -> FormFactors {
    FormFactors { fe: 1., fm: 1. }
}

/// Elastic dipole form factor
///
/// `q2` is the (positive) space-like virtuality `-t`, `mi2` the squared
/// mass of the incoming elastic leg.
pub fn elastic_dipole(q2: f64, mi2: f64) -> FormFactors {
    let ge = (1. + q2 / 0.71).powi(-2);
    let gm = 2.79 * ge;
    FormFactors {
        fe: (4. * mi2 * ge * ge + q2 * gm * gm) / (4. * mi2 + q2),
        fm: gm * gm,
    }
}

impl StructureFunctions {
    /// Evaluate the inelastic structure-function-derived form factors
    ///
    /// `q2` is `-t` (positive), `mi2` the incoming proton mass squared,
    /// `mx2` the dissociated remnant's squared invariant mass. `pdf` is
    /// consulted only by [`StructureFunctions::SzczurekUleshchenko`].
    pub fn form_factors(
        &self,
        q2: f64,
        mi2: f64,
        mx2: f64,
        pdf: Option<&dyn PartonDistributionFn>,
    ) -> FormFactors {
        match self {
            Self::Trivial => trivial(),
            Self::SuriYennie => suri_yennie(q2, mi2, mx2),
            Self::FioreBrasse => fiore_brasse(q2, mx2)
                .map(|(_sigma_t, f1, f2)| structure_function_to_form_factors(mi2, q2, f1, f2))
                .unwrap_or_default(),
            Self::SzczurekUleshchenko => {
                let pdf = pdf.expect(
                    "Szczurek-Uleshchenko structure functions require a parton-distribution callback",
                );
                let sf = szczurek_uleshchenko(q2, mi2, mx2, pdf);
                structure_function_to_form_factors(mi2, q2, sf.f1, sf.f2)
            }
        }
    }
}

/// Convert `F1, F2` structure functions into the `F_E, F_M` pair the
/// peripheral matrix element consumes, via the standard `W1, W2 -> FE,
/// FM` substitution.
fn structure_function_to_form_factors(mi2: f64, q2: f64, f1: f64, f2: f64) -> FormFactors {
    let k = 2. * mi2.sqrt();
    FormFactors {
        fe: f2 / k,
        fm: -f1 * k / q2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTON_MASS2: f64 = 0.880_354_5; // 0.938272^2

    #[test]
    fn trivial_is_unity() {
        let ff = trivial();
        assert_eq!(ff.fe, 1.);
        assert_eq!(ff.fm, 1.);
    }

    #[test]
    fn dipole_at_q2_zero_reduces_to_static_values() {
        let ff = elastic_dipole(0., PROTON_MASS2);
        assert!((ff.fe - 1.).abs() < 1e-9);
        assert!((ff.fm - 2.79 * 2.79).abs() < 1e-6);
    }

    #[test]
    fn dipole_form_factor_decreases_with_q2() {
        let low = elastic_dipole(0.1, PROTON_MASS2);
        let high = elastic_dipole(5., PROTON_MASS2);
        assert!(high.fm < low.fm);
    }
}
