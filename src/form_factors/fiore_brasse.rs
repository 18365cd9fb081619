//! Fiore-Brasse 56-bin resonance fit
//!
//! Fit coefficients `a`, `b`, `c` come from ep scattering data, valid for
//! `1.11 GeV <= W <= 1.99 GeV` (Nucl. Phys. B106, 1976).

use crate::physics::pdg;

const ALPHA_EM: f64 = 1. / 137.035_999_139;
const GEV2_TO_BARN: f64 = 0.389_351_824_952e-3;
const PION_ZERO_MASS: f64 = 0.134_977;

#[rustfmt::skip]
const A_BRASS: [f64; 56] = [
    5.045, 5.126, 5.390, 5.621, 5.913, 5.955, 6.139, 6.178, 6.125, 5.999,
    5.769, 5.622, 5.431, 5.288, 5.175, 5.131, 5.003, 5.065, 5.045, 5.078,
    5.145, 5.156, 5.234, 5.298, 5.371, 5.457, 5.543, 5.519, 5.465, 5.384,
    5.341, 5.320, 5.275, 5.290, 5.330, 5.375, 5.428, 5.478, 5.443, 5.390,
    5.333, 5.296, 5.223, 5.159, 5.146, 5.143, 5.125, 5.158, 5.159, 5.178,
    5.182, 5.195, 5.160, 5.195, 5.163, 5.172,
];
#[rustfmt::skip]
const B_BRASS: [f64; 56] = [
    0.798, 1.052, 1.213, 1.334, 1.397, 1.727, 1.750, 1.878, 1.887, 1.927,
    2.041, 2.089, 2.148, 2.205, 2.344, 2.324, 2.535, 2.464, 2.564, 2.610,
    2.609, 2.678, 2.771, 2.890, 2.982, 3.157, 3.183, 3.315, 3.375, 3.450,
    3.477, 3.471, 3.554, 3.633, 3.695, 3.804, 3.900, 4.047, 4.290, 4.519,
    4.709, 4.757, 4.840, 5.017, 5.015, 5.129, 5.285, 5.322, 5.545, 5.623,
    5.775, 5.894, 6.138, 6.151, 6.301, 6.542,
];
#[rustfmt::skip]
const C_BRASS: [f64; 56] = [
     0.043,  0.024,  0.000, -0.013, -0.023, -0.069, -0.060, -0.080, -0.065, -0.056,
    -0.065, -0.056, -0.043, -0.034, -0.054, -0.018, -0.046, -0.015, -0.029, -0.048,
    -0.032, -0.045, -0.084, -0.115, -0.105, -0.159, -0.164, -0.181, -0.203, -0.223,
    -0.245, -0.254, -0.239, -0.302, -0.299, -0.318, -0.383, -0.393, -0.466, -0.588,
    -0.622, -0.568, -0.574, -0.727, -0.665, -0.704, -0.856, -0.798, -1.048, -0.980,
    -1.021, -1.092, -1.313, -1.341, -1.266, -1.473,
];

/// Photo-absorption cross section and `F1, F2` structure functions for
/// virtuality `q2` (positive, `-t`) and remnant mass² `mx2`.
///
/// Returns `(sigma_t, f1, f2)`, or `None` outside the fit's validity range
/// `1.11 GeV <= sqrt(mx2) <= 1.99 GeV` (extended down to the single-pion
/// threshold for the lowest bin).
///
/// A naive guard of the form `mx < m_min || mx < 1.99` collapses to
/// `mx < 1.99` (since `m_min < 1.99` always holds) and would make every
/// bin below the fit's own upper edge unreachable. Implemented here as
/// the intended two-sided window; see `DESIGN.md` (Open Question:
/// Fiore-Brasse validity window).
pub fn fiore_brasse(q2: f64, mx2: f64) -> Option<(f64, f64, f64)> {
    let m_proton = pdg::on_shell_mass(pdg::PROTON).unwrap_or(0.938_272);
    let m2_proton = m_proton * m_proton;
    let m_min = m_proton + PION_ZERO_MASS;
    let mx = mx2.sqrt();

    if mx < m_min || mx > 1.99 {
        return None;
    }

    let (n_bin, x_bin, dx) = if mx < 1.11 {
        (0usize, mx - m_min, 1.11 - m_min)
    } else if mx < 1.77 {
        let dx = 0.015;
        (
            (((mx - 1.11) / dx) as usize + 1).min(55),
            (mx - 1.11) % dx,
            dx,
        )
    } else {
        let dx = 0.02;
        (
            (((mx - 1.77) / dx) as usize + 45).min(55),
            (mx - 1.77) % dx,
            dx,
        )
    };

    // The fit's internal `q2` convention is negative (`-t`, passed as
    // `-q2` by the elastic/inelastic dispatcher); keep that sign local.
    let q2 = -q2;

    let nu2 = ((mx2 - q2 - m2_proton) / (2. * m_proton)).powi(2);
    let logqq0 = ((nu2 - q2) / ((mx2 - m2_proton) / (2. * m_proton)).powi(2)).ln() / 2.;
    let gd2 = (1. / (1. - q2 / 0.71)).powi(4);

    let fit = |bin: usize| -> f64 {
        (A_BRASS[bin] + B_BRASS[bin] * logqq0 + C_BRASS[bin] * logqq0.abs().powi(3)).exp() * gd2
    };
    let sig_low = if n_bin == 0 { 0. } else { fit(n_bin - 1) };
    let sig_high = fit(n_bin);

    let sigma_t = sig_low + x_bin * (sig_high - sig_low) / dx;
    let f1 = (mx2 - m2_proton) / (8. * std::f64::consts::PI.powi(2) * m_proton * ALPHA_EM)
        / GEV2_TO_BARN
        * 1.0e6
        * sigma_t;
    let f2 = f1 * q2 / (q2 - nu2);

    Some((sigma_t, f1, f2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_returns_none() {
        assert!(fiore_brasse(1., 0.9).is_none());
    }

    #[test]
    fn above_fit_range_returns_none() {
        assert!(fiore_brasse(1., 4.5).is_none());
    }

    #[test]
    fn mid_range_is_finite_and_positive_cross_section() {
        let (sigma_t, _f1, _f2) = fiore_brasse(0.5, 1.5 * 1.5).unwrap();
        assert!(sigma_t.is_finite());
        assert!(sigma_t >= 0.);
    }
}
