//! Equivalent-photon flux integrands
//!
//! The flux is evaluated once per incoming leg per phase-space point.
//! Kept as free functions rather than a trait since the
//! elastic/inelastic split is a value, not a type, decided per event by
//! [`crate::kinematics::ProcessMode`].

use crate::form_factors::{PartonDistributionFn, StructureFunctions};

const ALPHA_EM: f64 = 1. / 137.035_999_139;
/// Fluxes below this value are treated as zero to avoid blow-ups in `1/flux`
/// style downstream divisions.
const FLUX_FLOOR: f64 = 1e-20;

/// Elastic equivalent-photon flux `f_ela(x, k_T^2)`
///
/// `mp2` is the squared proton (or other elastically scattering beam)
/// mass, `structure_functions` supplies `F_E` via the elastic dipole form
/// factor.
pub fn elastic(x: f64, kt2: f64, mp2: f64) -> f64 {
    if !(0. ..1.).contains(&x) {
        return 0.;
    }
    let q2_ela = (kt2 + x * x * mp2) / (1. - x);
    let ff = crate::form_factors::elastic_dipole(q2_ela, mp2);
    let flux = (ALPHA_EM / std::f64::consts::PI)
        * (kt2 / (kt2 + x * x * mp2)).powi(2)
        * ff.fe
        / q2_ela;
    floor(flux)
}

/// Inelastic equivalent-photon flux `f_ine(x, k_T^2, m_X^2)`
///
/// `structure_functions` selects the `F2(x_Bj, Q^2)` parametrisation;
/// `pdf` is forwarded to the Szczurek-Uleshchenko variant only.
#[allow(clippy::too_many_arguments)]
pub fn inelastic(
    x: f64,
    kt2: f64,
    mx2: f64,
    mp2: f64,
    structure_functions: StructureFunctions,
    pdf: Option<&dyn PartonDistributionFn>,
) -> f64 {
    if !(0. ..1.).contains(&x) {
        return 0.;
    }
    let dm2 = mx2 - mp2;
    let q2_min = (x * dm2 + x * x * mp2) / (1. - x);
    let q2 = kt2 / (1. - x) + q2_min;

    let ff = structure_functions.form_factors(q2, mp2, mx2, pdf);
    // `form_factors` returns FE/FM derived from F1/F2; recover F2 via
    // `F2 = FE * 2 sqrt(mp2)`.
    let f2 = ff.fe * 2. * mp2.sqrt();

    let flux = (ALPHA_EM / std::f64::consts::PI)
        * (1. - x)
        * f2
        / (mx2 + q2 - mp2)
        * (1. - (q2 - kt2) / q2)
        * (kt2 / (kt2 + x * dm2 + x * x * mp2)).powi(2)
        / kt2;
    floor(flux)
}

fn floor(flux: f64) -> f64 {
    if flux.is_finite() && flux > FLUX_FLOOR {
        flux
    } else {
        0.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTON_MASS2: f64 = 0.880_354_5;

    #[test]
    fn elastic_flux_is_nonnegative_and_finite() {
        let f = elastic(0.01, 0.5, PROTON_MASS2);
        assert!(f.is_finite());
        assert!(f >= 0.);
    }

    #[test]
    fn elastic_flux_vanishes_outside_unit_interval() {
        assert_eq!(elastic(1.5, 0.5, PROTON_MASS2), 0.);
        assert_eq!(elastic(-0.1, 0.5, PROTON_MASS2), 0.);
    }

    #[test]
    fn tiny_fluxes_are_floored_to_zero() {
        assert_eq!(floor(1e-30), 0.);
        assert_eq!(floor(1e-10), 1e-10);
    }

    #[test]
    fn inelastic_flux_with_suri_yennie_is_finite() {
        let f = inelastic(
            0.01,
            0.5,
            4.,
            PROTON_MASS2,
            StructureFunctions::SuriYennie,
            None,
        );
        assert!(f.is_finite());
    }
}
