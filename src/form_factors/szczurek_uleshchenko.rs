//! Szczurek-Uleshchenko PDF-based structure functions
//!
//! A hardcoded GRV95LO-style PDF lookup is replaced by an injected
//! [`super::PartonDistributionFn`] callback, so the crate carries no
//! dependency on a specific PDF set or FFI binding.

use super::StructureFunctionValue;

const Q2_0: f64 = 0.8;

/// Parton momentum densities `x f(x)` at a given `(x, Q²)`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartonDensities {
    pub x_uv: f64,
    pub x_dv: f64,
    pub x_us: f64,
    pub x_ds: f64,
    pub x_ss: f64,
    pub x_g: f64,
}

/// `q2` is the (positive) virtuality `-t`, `mi2` the incoming proton mass²,
/// `mf2` the dissociated remnant's mass².
pub fn szczurek_uleshchenko(
    q2: f64,
    mi2: f64,
    mf2: f64,
    pdf: &dyn super::PartonDistributionFn,
) -> StructureFunctionValue {
    let x = q2 / (mf2 + q2 + mi2);
    let amu2 = q2 + Q2_0;

    let densities = pdf(x, amu2);
    let f2_aux = 4. / 9. * (densities.x_uv + 2. * densities.x_us)
        + 1. / 9. * (densities.x_dv + 2. * densities.x_ds)
        + 1. / 9. * 2. * densities.x_ss;

    let f2_corr = q2 / amu2 * f2_aux;
    let f1 = f2_corr / (2. * x);

    let k = 2. * mi2.sqrt();
    let w2 = k * x / q2 * f2_corr;
    let w1 = 2. * f1 / k;

    StructureFunctionValue { f1: w1, f2: w2 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTON_MASS2: f64 = 0.880_354_5;

    fn flat_pdf(_x: f64, _q2: f64) -> PartonDensities {
        PartonDensities {
            x_uv: 0.3,
            x_dv: 0.15,
            x_us: 0.05,
            x_ds: 0.05,
            x_ss: 0.02,
            x_g: 0.4,
        }
    }

    #[test]
    fn evaluates_finite_structure_functions() {
        let sf = szczurek_uleshchenko(0.3, PROTON_MASS2, 2.0, &flat_pdf);
        assert!(sf.f1.is_finite());
        assert!(sf.f2.is_finite());
    }
}
