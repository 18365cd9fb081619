//! Process abstraction and concrete kT- and LPAIR-style kernels
//!
//! A process owns the change-of-variables from the unit hypercube to
//! physical phase space, the cut evaluation, and the matrix element,
//! and reports back through a four-call contract: `set_point` ->
//! `before_compute_weight` -> `compute_weight` -> `fill_kinematics`.

pub mod gamgamll;
pub mod kt;
pub mod pptoll;
pub mod pptoww;

use crate::error::Result;
use crate::kinematics::{KinematicsConfiguration, ProcessMode};
use crate::physics::Event;

pub use gamgamll::GamGamLL;
pub use pptoll::PPtoLL;
pub use pptoww::PPtoWW;

/// Extra hypercube axis a process reserves for the symmetrisation
/// mirror decision, on top of its own dimensions, when `kin.symmetrise`
/// is set and `kin.mode` has a single-dissociative mirror
///
/// The coin flip has to be a function of `x`, not of an independent RNG
/// draw inside `compute_weight`, or two calls with the same `x` could
/// resolve to different modes and break the
/// `compute_weight` determinism contract.
pub(crate) fn symmetrisation_extra_dimensions(kin: &KinematicsConfiguration) -> usize {
    if kin.symmetrise && kin.mode.sd_mirror().is_some() {
        1
    } else {
        0
    }
}

/// Resolve the mode a single sample is actually evaluated in, and the
/// cross-section multiplier that resolution implies, from the trailing
/// hypercube coordinate `symmetrisation_extra_dimensions` reserved
///
/// When `kin.symmetrise` is set and `kin.mode` is single-dissociative,
/// `u < 0.5` evaluates the mirror instead of the configured mode, and
/// either way the multiplier is `2.0`: evaluating the mirror with the
/// same probability as the configured mode and doubling both
/// contributions has the same expectation as integrating `σ(EI) +
/// σ(IE)`, which by the elastic/inelastic mirror symmetry equals
/// `2·σ(configured)`.
pub(crate) fn resolve_symmetrisation(kin: &KinematicsConfiguration, u: f64) -> (ProcessMode, f64) {
    match (kin.symmetrise, kin.mode.sd_mirror()) {
        (true, Some(mirror)) if u < 0.5 => (mirror, 2.),
        (true, Some(_)) => (kin.mode, 2.),
        _ => (kin.mode, 1.),
    }
}

/// Non-linear variable mapping for a `[0,1]` coordinate onto `[xmin, xmax]`
///
/// Ported from `Map()` in `core/utils.cpp`. Returns `(value, jacobian)`.
pub(crate) fn log_map(expo: f64, xmin: f64, xmax: f64) -> (f64, f64) {
    let y = xmax / xmin;
    let out = xmin * y.powf(expo);
    (out, out * y.ln())
}

/// Mixed log/arctan-like mapping used for the optimised `s2` branch
///
/// The exponent parameter `u` is kept as `f64` rather than truncated to
/// an integer, since truncating every `x(2) in [0,1)` coordinate to `0`
/// would silently disable the mapping (see `DESIGN.md`, Open Question:
/// `Mapla` exponent truncation).
pub(crate) fn mapla(y: f64, z: f64, u: f64, xm: f64, xp: f64) -> (f64, f64) {
    let xmb = xm - y - z;
    let xpb = xp - y - z;
    let c = -4. * y * z;
    let alp = (xpb * xpb + c).sqrt();
    let alm = (xmb * xmb + c).sqrt();
    let am = xmb + alm;
    let ap = xpb + alp;
    let yy = ap / am;
    let zz = yy.powf(u);
    let x = y + z + (am * zz - c / (am * zz)) / 2.;
    let ax = ((x - y - z).powi(2) + c).sqrt();
    let d = ax * yy.ln();
    (x, d)
}

/// `GeV^-2 -> barn` conversion, shared by every process's final weight
pub(crate) const GEV2_TO_BARN: f64 = 0.389_351_824_952e-3;

/// A differential cross-section kernel over a fixed-dimension unit hypercube
///
/// Cut failures and out-of-range mappings return a weight of `0.0`,
/// never an `Err`; only a structurally invalid configuration (unset
/// beams, an unsupported mode) is fatal.
pub trait Process: Send + Sync {
    /// Register this process's initial- and final-state roles in `event`
    fn add_event_content(&self, event: &mut Event);

    /// Hypercube dimension required for the given elastic/inelastic mode
    fn num_dimensions(&self) -> usize;

    /// Install the beam, cut and structure-function configuration
    fn set_kinematics(&mut self, kinematics: KinematicsConfiguration) -> Result<()>;

    /// Commit the current hypercube coordinate
    fn set_point(&mut self, point: &[f64]);

    /// Evaluate mode-dependent remnant-mass mappings ahead of the first
    /// `compute_weight` call on this point
    fn before_compute_weight(&mut self);

    /// Evaluate the integrand at the committed point; `0.0` on any cut
    /// failure or out-of-range mapping
    fn compute_weight(&mut self) -> f64;

    /// Populate `event`'s four-momenta from the committed point
    ///
    /// Must reuse the same effective mode `compute_weight` resolved for
    /// this point (symmetrisation flips the mode per sample), so that
    /// remnant bookkeeping stays consistent with the weight that was
    /// actually accepted.
    fn fill_kinematics(&mut self, event: &mut Event);
}
