//! Suri-Yennie low-Q² inelastic form factors

use super::FormFactors;

const CC1: f64 = 0.869_26;
const CC2: f64 = 2.234_22;
const DD1: f64 = 0.125_49;
const CP: f64 = 0.96;
const BP: f64 = 0.63;
const RHO: f64 = 0.585;

/// `q2` is the (positive) virtuality `-t`, `mi2` the incoming proton mass²,
/// `mf2` the dissociated remnant's mass².
pub fn suri_yennie(q2: f64, mi2: f64, mf2: f64) -> FormFactors {
    let x = q2 / (q2 + mf2);
    let dm2 = mf2 - mi2;
    let en = dm2 + q2;
    let tau = -q2 / 4. / mi2;
    let rhot = RHO + q2;
    let rho_norm = RHO / rhot;

    let fm = (-1. / q2)
        * (-CC1 * rho_norm * rho_norm * dm2
            - CC2 * mi2 * (1. - x).powi(4) / (x * (x * CP - 2. * BP) + 1.));
    let fe = (-tau * fm + DD1 * dm2 * q2 * rho_norm * (dm2 / en).powi(2) / (rhot * mi2))
        / (1. + en * en / (4. * mi2 * q2));

    FormFactors { fe, fm }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTON_MASS2: f64 = 0.880_354_5;

    #[test]
    fn finite_away_from_elastic_limit() {
        let ff = suri_yennie(0.5, PROTON_MASS2, 1.8);
        assert!(ff.fe.is_finite());
        assert!(ff.fm.is_finite());
    }
}
