//! γγ → ℓ⁺ℓ⁻ LPAIR-style 2→3 process
//!
//! The two-photon system is resolved as an explicit intermediate state
//! with its own invariant mass `w4`, rather than folded into the
//! kT-factorised scaffolding used by [`super::pptoww::PPtoWW`] /
//! [`super::pptoll::PPtoLL`]. `pickin` sets up the Vermaseren invariants
//! (`t1, t2, s1, s2` and the `dd1..dd5` Gram-determinant-adjacent
//! quantities), `orient` places the two outgoing beams in the lab frame,
//! and `peri_pp` assembles the peripheral (multi-Regge) matrix element
//! from the `t11..t22` magnetic/electric products.

use rand::Rng;

use crate::error::{Error, ErrorKind, Result};
use crate::form_factors::{FormFactors, PartonDistributionFn};
use crate::kinematics::{KinematicsConfiguration, ProcessMode};
use crate::physics::{pdg, Event, FourMomentum, Particle, Role, Status};

use super::{log_map, mapla, resolve_symmetrisation, Process, GEV2_TO_BARN};

/// `s2` optimisation strategy
///
/// Mirrors the `n_opt_` switch in a `pickin()`-style kinematic setup:
/// `n_opt < -1` maps `s2` with the plain logarithmic [`log_map`],
/// `n_opt == -1` with the non-linear [`mapla`], `n_opt == 0` maps `s2`
/// once up front and reuses it as `sig1`, `n_opt == 1` uses [`mapla`]
/// again on the lower-bound branch, and `n_opt > 1` falls back to
/// [`log_map`]. See `DESIGN.md` for why all five branches are kept
/// rather than collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisationMode(pub i32);

impl Default for OptimisationMode {
    fn default() -> Self {
        Self(0)
    }
}

/// γγ → ℓ⁺ℓ⁻ LPAIR-style kernel
pub struct GamGamLL {
    kin: Option<KinematicsConfiguration>,
    n_opt: i32,
    pdf: Option<Box<dyn PartonDistributionFn>>,
    x: Vec<f64>,

    /// Mode this sample is actually evaluated in, resolved fresh by
    /// `before_compute_weight` each call; equal to `kin.mode` unless
    /// symmetrisation flipped it to its mirror for this sample
    effective_mode: ProcessMode,
    /// Cross-section multiplier `resolve_symmetrisation` paired with
    /// `effective_mode`
    symmetrisation_factor: f64,

    w1: f64,
    w2: f64,
    mx2: f64,
    my2: f64,
    mx: f64,
    my: f64,
    ml2: f64,
    dw31: f64,
    dw52: f64,

    ep1: f64,
    ep2: f64,
    p_cm: f64,
    w12: f64,
    w31: f64,
    w52: f64,
    ec4: f64,
    pc4: f64,
    mc4: f64,
    w4: f64,
    p12: f64,
    p1k2: f64,
    p2k1: f64,
    p13: f64,
    p14: f64,
    p25: f64,
    q1dq: f64,
    q1dq2: f64,
    s1: f64,
    s2: f64,
    epsi: f64,
    g4: f64,
    g5: f64,
    g6: f64,
    a5: f64,
    a6: f64,
    bb: f64,
    gram: f64,
    dd1: f64,
    dd2: f64,
    dd3: f64,
    dd4: f64,
    dd5: f64,
    delta: f64,
    sa1: f64,
    sa2: f64,
    sl1: f64,
    t1: f64,
    t2: f64,
    cos_theta4: f64,
    sin_theta4: f64,
    al4: f64,
    be4: f64,
    de3: f64,
    de5: f64,
    pt4: f64,
    jacobian: f64,

    p3_lab: FourMomentum,
    p5_lab: FourMomentum,
    p6_cm: FourMomentum,
    p7_cm: FourMomentum,
}

impl GamGamLL {
    pub fn new(mode: OptimisationMode) -> Self {
        Self {
            kin: None,
            n_opt: mode.0,
            pdf: None,
            x: Vec::new(),
            effective_mode: ProcessMode::ElasticElastic,
            symmetrisation_factor: 1.,
            w1: 0.,
            w2: 0.,
            mx2: 0.,
            my2: 0.,
            mx: 0.,
            my: 0.,
            ml2: 0.,
            dw31: 0.,
            dw52: 0.,
            ep1: 0.,
            ep2: 0.,
            p_cm: 0.,
            w12: 0.,
            w31: 0.,
            w52: 0.,
            ec4: 0.,
            pc4: 0.,
            mc4: 0.,
            w4: 0.,
            p12: 0.,
            p1k2: 0.,
            p2k1: 0.,
            p13: 0.,
            p14: 0.,
            p25: 0.,
            q1dq: 0.,
            q1dq2: 0.,
            s1: 0.,
            s2: 0.,
            epsi: 0.,
            g4: 0.,
            g5: 0.,
            g6: 0.,
            a5: 0.,
            a6: 0.,
            bb: 0.,
            gram: 0.,
            dd1: 0.,
            dd2: 0.,
            dd3: 0.,
            dd4: 0.,
            dd5: 0.,
            delta: 0.,
            sa1: 0.,
            sa2: 0.,
            sl1: 0.,
            t1: 0.,
            t2: 0.,
            cos_theta4: 0.,
            sin_theta4: 0.,
            al4: 0.,
            be4: 0.,
            de3: 0.,
            de5: 0.,
            pt4: 0.,
            jacobian: 0.,
            p3_lab: FourMomentum::default(),
            p5_lab: FourMomentum::default(),
            p6_cm: FourMomentum::default(),
            p7_cm: FourMomentum::default(),
        }
    }

    /// Inject a parton-distribution callback for Szczurek-Uleshchenko legs
    pub fn with_pdf(mut self, pdf: Box<dyn PartonDistributionFn>) -> Self {
        self.pdf = Some(pdf);
        self
    }

    fn kin(&self) -> &KinematicsConfiguration {
        self.kin.as_ref().expect("set_kinematics not called")
    }

    /// Vermaseren phase-space mapping: unit hypercube axes 0,1,2,3 onto
    /// `t1, t2, s2, yy4`. Returns `false` on any non-physical region.
    fn pickin(&mut self) -> bool {
        let kin = self.kin().clone();
        self.jacobian = 0.;
        self.w4 = self.mc4 * self.mc4;

        let sig = self.mc4 + self.my;
        let mut sig1 = sig * sig;
        let sig2 = sig1;

        self.w31 = self.mx2 - self.w1;
        self.w52 = self.my2 - self.w2;
        self.w12 = self.w1 - self.w2;
        let d6 = self.w4 - self.my2;

        let s = kin.s();
        let ss = s + self.w12;

        let rl1 = ss * ss - 4. * self.w1 * s;
        if rl1 <= 0. {
            return false;
        }
        self.sl1 = rl1.sqrt();

        self.s2 = 0.;
        let mut ds2 = 0.;
        if self.n_opt == 0 {
            let smax = s + self.mx2 - 2. * self.mx * s.sqrt();
            let (val, d) = log_map(self.x[2], sig1, smax);
            self.s2 = val;
            ds2 = d;
            sig1 = self.s2;
        }

        let sp = s + self.mx2 - sig1;
        let d3 = sig1 - self.w2;

        let rl2 = sp * sp - 4. * s * self.mx2;
        if rl2 <= 0. {
            return false;
        }
        let sl2 = rl2.sqrt();

        let mut t1_max = self.w1 + self.mx2 - (ss * sp + self.sl1 * sl2) / (2. * s);
        let mut t1_min = (self.w31 * d3 + (d3 - self.w31) * (d3 * self.w1 - self.w31 * self.w2) / s) / t1_max;

        let q2_limits = kin.initial.q2;
        if t1_max > -q2_limits.min() {
            return false;
        }
        if t1_min < -q2_limits.max() && q2_limits.has_max() {
            return false;
        }
        if t1_max < -q2_limits.max() && q2_limits.has_max() {
            t1_max = -q2_limits.max();
        }
        if t1_min > -q2_limits.min() {
            t1_min = -q2_limits.min();
        }

        self.t1 = 0.;
        let (t1_val, mut dt1) = log_map(self.x[0], t1_min, t1_max);
        self.t1 = t1_val;
        dt1 = -dt1;

        self.dd4 = self.w4 - self.t1;
        let d8 = self.t1 - self.w2;
        let t13 = self.t1 - self.w1 - self.mx2;

        self.sa1 = -(self.t1 - self.w31).powi(2) / 4. + self.w1 * self.t1;
        if self.sa1 >= 0. {
            return false;
        }
        let sl3 = (-self.sa1).sqrt();

        let splus;
        let mut s2max;
        if self.w1 != 0. {
            let sb = (s * (self.t1 - self.w31) + self.w12 * t13) / (2. * self.w1) + self.mx2;
            let sd = self.sl1 * sl3 / self.w1;
            let se = (s * (self.t1 * (s + t13 - self.w2) - self.w2 * self.w31)
                + self.mx2 * (self.w12 * d8 + self.w2 * self.mx2))
                / self.w1;
            if ((sb - sd) / sd).abs() >= 1. {
                splus = sb - sd;
                s2max = se / splus;
            } else {
                s2max = sb + sd;
                splus = se / s2max;
            }
        } else {
            s2max = (s * (self.t1 * (s + d8 - self.mx2) - self.w2 * self.mx2) + self.w2 * self.mx2 * (self.w2 + self.mx2 - self.t1))
                / (ss * t13);
            splus = sig2;
        }

        let mut s2x = s2max;
        let mut sig2 = sig2;
        if self.n_opt < 0 {
            if splus > sig2 {
                sig2 = splus;
            }
            let (val, d) = if self.n_opt < -1 {
                log_map(self.x[2], sig2, s2max)
            } else {
                mapla(self.t1, self.w2, self.x[2], sig2, s2max)
            };
            self.s2 = val;
            ds2 = d;
            s2x = self.s2;
        } else if self.n_opt == 0 {
            s2x = self.s2;
        }

        let r1 = s2x - d8;
        let r2 = s2x - d6;

        let rl4 = (r1 * r1 - 4. * self.w2 * s2x) * (r2 * r2 - 4. * self.my2 * s2x);
        if rl4 <= 0. {
            return false;
        }
        let sl4 = rl4.sqrt();

        let t2_max = self.w2 + self.my2 - (r1 * r2 + sl4) / s2x * 0.5;
        let t2_min = (self.w52 * self.dd4 + (self.dd4 - self.w52) * (self.dd4 * self.w2 - self.w52 * self.t1) / s2x) / t2_max;

        self.t2 = 0.;
        let (t2_val, mut dt2) = log_map(self.x[1], t2_min, t2_max);
        self.t2 = t2_val;
        dt2 = -dt2;

        let tau = self.t1 - self.t2;
        let r3 = self.dd4 - self.t2;
        let r4 = self.w52 - self.t2;

        let b = r3 * r4 - 2. * (self.t1 + self.w2) * self.t2;
        let c = self.t2 * d6 * d8 + (d6 - d8) * (d6 * self.w2 - d8 * self.my2);

        let t25 = self.t2 - self.w2 - self.my2;

        self.sa2 = -r4 * r4 / 4. + self.w2 * self.t2;
        if self.sa2 >= 0. {
            return false;
        }
        let sl6 = 2. * (-self.sa2).sqrt();

        self.g4 = -r3 * r3 / 4. + self.t1 * self.t2;
        if self.g4 >= 0. {
            return false;
        }
        let sl7 = 2. * (-self.g4).sqrt();
        let sl5 = sl6 * sl7;

        let s2p;
        let s2min;
        if ((sl5 - b) / sl5).abs() >= 1. {
            s2p = (sl5 - b) / self.t2 * 0.5;
            s2min = c / (self.t2 * s2p);
        } else {
            s2min = (-sl5 - b) / self.t2 * 0.5;
            s2p = c / (self.t2 * s2min);
        }

        if self.n_opt > 1 {
            let (val, d) = log_map(self.x[2], s2min, s2max);
            self.s2 = val;
            ds2 = d;
        } else if self.n_opt == 1 {
            let (val, d) = mapla(self.t1, self.w2, self.x[2], s2min, s2max);
            self.s2 = val;
            ds2 = d;
        }

        let ap = -0.25 * (self.s2 + d8).powi(2) + self.s2 * self.t1;

        if self.w1 != 0. {
            self.dd1 = -0.25 * (self.s2 - s2max) * (self.s2 - splus) * self.w1;
        } else {
            self.dd1 = 0.25 * (self.s2 - s2max) * ss * t13;
        }
        self.dd2 = -self.t2 * (self.s2 - s2p) * (self.s2 - s2min) * 0.25;

        let yy4 = (std::f64::consts::PI * self.x[3]).cos();
        let dd = self.dd1 * self.dd2;
        self.p12 = (s - self.w1 - self.w2) * 0.5;
        let st = self.s2 - self.t1 - self.w2;
        let delb = (2. * self.w2 * r3 + r4 * st) * (4. * self.p12 * self.t1 - (self.t1 - self.w31) * st) / (16. * ap);

        if dd <= 0. {
            return false;
        }

        self.delta = delb - yy4 * st * dd.sqrt() / ap * 0.5;
        self.s1 = self.t2 + self.w1 + (2. * self.p12 * r3 - 4. * self.delta) / st;

        if ap >= 0. {
            return false;
        }

        self.jacobian = ds2 * dt1 * dt2 * std::f64::consts::PI.powi(2) / (8. * self.sl1 * (-ap).sqrt());

        self.gram = (1. - yy4 * yy4) * dd / ap;

        self.p13 = -t13 * 0.5;
        self.p14 = (tau + self.s1 - self.mx2) * 0.5;
        self.p25 = -t25 * 0.5;

        self.p1k2 = (self.s1 - self.t2 - self.w1) * 0.5;
        self.p2k1 = st * 0.5;

        let s1p;
        let s1m;
        if self.w2 != 0. {
            let sbb = (s * (self.t2 - self.w52) - self.w12 * t25) / self.w2 * 0.5 + self.my2;
            let sdd = self.sl1 * sl6 / self.w2 * 0.5;
            let see = (s * (self.t2 * (s + t25 - self.w1) - self.w1 * self.w52)
                + self.my2 * (self.w1 * self.my2 - self.w12 * (self.t2 - self.w1)))
                / self.w2;
            if sbb / sdd >= 0. {
                s1p = sbb + sdd;
                s1m = see / s1p;
            } else {
                s1m = sbb - sdd;
                s1p = see / s1m;
            }
            self.dd3 = -self.w2 * (s1p - self.s1) * (s1m - self.s1) * 0.25;
        } else {
            s1p = (s * (self.t2 * (s - self.my2 + self.t2 - self.w1) - self.w1 * self.my2)
                + self.w1 * self.my2 * (self.w1 + self.my2 - self.t2))
                / (t25 * (s - self.w12));
            self.dd3 = -t25 * (s - self.w12) * (s1p - self.s1) * 0.25;
        }

        let ssb = self.t2 + self.w1 - r3 * (self.w31 - self.t1) / self.t1 * 0.5;
        let ssd = sl3 * sl7 / self.t1;
        let sse = (self.t2 - self.w1) * (self.w4 - self.mx2)
            + (self.t2 - self.w4 + self.w31) * ((self.t2 - self.w1) * self.mx2 - (self.w4 - self.mx2) * self.w1) / self.t1;

        let s1pp;
        let s1pm;
        if ssb / ssd >= 0. {
            s1pp = ssb + ssd;
            s1pm = sse / s1pp;
        } else {
            s1pm = ssb - ssd;
            s1pp = sse / s1pm;
        }

        self.dd4 = -self.t1 * (self.s1 - s1pp) * (self.s1 - s1pm) * 0.25;
        self.dd5 = self.dd1
            + self.dd3
            + ((self.p12 * (self.t1 - self.w31) * 0.5 - self.w1 * self.p2k1) * (self.p2k1 * (self.t2 - self.w52) - self.w2 * r3)
                - self.delta * (2. * self.p12 * self.p2k1 - self.w2 * (self.t1 - self.w31)))
                / self.p2k1;

        true
    }

    /// Places the two outgoing beam remnants in the lab frame
    fn orient(&mut self) -> bool {
        if !self.pickin() || self.jacobian == 0. {
            return false;
        }

        let kin = self.kin().clone();
        let sqs = kin.s().sqrt();
        let re = 0.5 / sqs;
        self.ep1 = re * (kin.s() + self.w12);
        self.ep2 = re * (kin.s() - self.w12);
        self.p_cm = re * self.sl1;

        self.de3 = re * (self.s2 - self.mx2 + self.w12);
        self.de5 = re * (self.s1 - self.my2 - self.w12);

        let ep3 = self.ep1 - self.de3;
        let ep5 = self.ep2 - self.de5;
        self.ec4 = self.de3 + self.de5;

        if self.ec4 < self.mc4 {
            return false;
        }
        self.pc4 = (self.ec4 * self.ec4 - self.mc4 * self.mc4).sqrt();
        if self.pc4 == 0. {
            return false;
        }

        let pp3 = (ep3 * ep3 - self.mx2).sqrt();
        let pt3 = (self.dd1 / kin.s()).sqrt() / self.p_cm;
        let pp5 = (ep5 * ep5 - self.my2).sqrt();
        let pt5 = (self.dd3 / kin.s()).sqrt() / self.p_cm;

        let sin_theta3 = pt3 / pp3;
        let sin_theta5 = pt5 / pp5;
        if sin_theta3 > 1. || sin_theta5 > 1. {
            return false;
        }

        let mut ct3 = (1. - sin_theta3 * sin_theta3).sqrt();
        let mut ct5 = (1. - sin_theta5 * sin_theta5).sqrt();
        if self.ep1 * ep3 < self.p13 {
            ct3 *= -1.;
        }
        if self.ep2 * ep5 > self.p25 {
            ct5 *= -1.;
        }

        if self.dd5 < 0. {
            return false;
        }

        self.pt4 = (self.dd5 / kin.s()).sqrt() / self.p_cm;
        self.sin_theta4 = self.pt4 / self.pc4;
        if self.sin_theta4 > 1. {
            return false;
        }
        self.cos_theta4 = (1. - self.sin_theta4 * self.sin_theta4).sqrt();
        if self.ep1 * self.ec4 < self.p14 {
            self.cos_theta4 *= -1.;
        }

        self.al4 = 1. - self.cos_theta4;
        self.be4 = 1. + self.cos_theta4;
        if self.cos_theta4 < 0. {
            self.be4 = self.sin_theta4 * self.sin_theta4 / self.al4;
        } else {
            self.al4 = self.sin_theta4 * self.sin_theta4 / self.be4;
        }

        let rr = (-self.gram / kin.s()).sqrt() / (self.p_cm * self.pt4);
        let sin_phi3 = rr / pt3;
        let sin_phi5 = -rr / pt5;
        if sin_phi3.abs() > 1. || sin_phi5.abs() > 1. {
            return false;
        }
        let cos_phi3 = -(1. - sin_phi3 * sin_phi3).sqrt();
        let cos_phi5 = -(1. - sin_phi5 * sin_phi5).sqrt();

        self.p3_lab = FourMomentum::new(pp3 * sin_theta3 * cos_phi3, pp3 * sin_theta3 * sin_phi3, pp3 * ct3, ep3);
        self.p5_lab = FourMomentum::new(pp5 * sin_theta5 * cos_phi5, pp5 * sin_theta5 * sin_phi5, pp5 * ct5, ep5);

        let a1 = self.p3_lab.px().raw() - self.p5_lab.px().raw();
        if (self.pt4 + self.p3_lab.px().raw() + self.p5_lab.px().raw()).abs()
            < (a1.abs() - self.pt4).abs()
        {
            return true;
        }
        if a1 < 0. {
            let p = self.p5_lab;
            self.p5_lab = FourMomentum::new(-p.px().raw(), p.py().raw(), p.pz().raw(), p.e().raw());
        } else {
            let p = self.p3_lab;
            self.p3_lab = FourMomentum::new(-p.px().raw(), p.py().raw(), p.pz().raw(), p.e().raw());
        }
        true
    }

    /// Remnant-mass mapping shared by the inelastic-leg branches of
    /// `before_compute_weight`
    fn remnant_mass(&self, xi: f64, outmass: f64, lepmass: f64) -> (f64, f64) {
        const MX0: f64 = 0.938_272_08 + 0.139_570_39; // proton + charged pion
        let kin = self.kin();
        let mx_limits = kin.initial.remnant_mass;
        let sqs = kin.s().sqrt();
        let wx2min = MX0.max(mx_limits.min()).powi(2);
        let wx2max = (sqs - outmass - 2. * lepmass).min(mx_limits.max()).powi(2);
        let (mx2, dmx2) = log_map(xi, wx2min, wx2max);
        (mx2.sqrt(), dmx2.sqrt())
    }

    fn leg_form_factors(&self, leg1: bool, q2: f64) -> FormFactors {
        let kin = self.kin();
        let m1 = pdg::on_shell_mass(kin.beam1_pdg).unwrap_or(0.938_272_08);
        let m2 = pdg::on_shell_mass(kin.beam2_pdg).unwrap_or(0.938_272_08);
        let pdf = self.pdf.as_deref();
        if leg1 {
            if self.effective_mode.leg1_inelastic() {
                kin.structure_functions.form_factors(q2, m1 * m1, self.mx2, pdf)
            } else {
                crate::form_factors::elastic_dipole(q2, m1 * m1)
            }
        } else if self.effective_mode.leg2_inelastic() {
            kin.structure_functions.form_factors(q2, m2 * m2, self.my2, pdf)
        } else {
            crate::form_factors::elastic_dipole(q2, m2 * m2)
        }
    }

    /// Peripheral (multi-Regge) matrix element: `nup`/`ndown` name the
    /// dissociation multiplicities, though the magnetic/electric product
    /// formula itself does not depend on them.
    fn peri_pp(&self) -> f64 {
        let fp1 = self.leg_form_factors(true, -self.t1);
        let fp2 = self.leg_form_factors(false, -self.t2);

        let qqq = self.q1dq * self.q1dq;
        let qdq = 4. * self.ml2 - self.w4;

        let t11 = 64. * (self.bb * (qqq - self.g4 - qdq * (self.t1 + self.t2 + 2. * self.ml2))
            - 2. * (self.t1 + 2. * self.ml2) * (self.t2 + 2. * self.ml2) * qqq)
            * self.t1
            * self.t2;
        let t12 = 128. * (-self.bb * (self.dd2 + self.g6) - 2. * (self.t1 + 2. * self.ml2) * (self.sa2 * qqq + self.a6 * self.a6)) * self.t1;
        let t21 = 128. * (-self.bb * (self.dd4 + self.g5) - 2. * (self.t2 + 2. * self.ml2) * (self.sa1 * qqq + self.a5 * self.a5)) * self.t2;
        let t22 = 512.
            * (self.bb * (self.delta * self.delta - self.gram)
                - (self.epsi - self.delta * (qdq + self.q1dq2)).powi(2)
                - self.sa1 * self.a6 * self.a6
                - self.sa2 * self.a5 * self.a5
                - self.sa1 * self.sa2 * qqq);

        (fp1.fm * fp2.fm * t11 + fp1.fe * fp2.fm * t21 + fp1.fm * fp2.fe * t12 + fp1.fe * fp2.fe * t22)
            / (2. * self.t1 * self.t2 * self.bb).powi(2)
    }
}

impl Process for GamGamLL {
    fn add_event_content(&self, event: &mut Event) {
        let kin = self.kin();
        event.add_particle(Particle::new(0, Role::IncomingBeam1, kin.beam1_pdg, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::IncomingBeam2, kin.beam2_pdg, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::Parton1, pdg::PHOTON, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::Parton2, pdg::PHOTON, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::OutgoingBeam1, kin.beam1_pdg, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::OutgoingBeam2, kin.beam2_pdg, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::CentralSystem, kin.central_system[0], FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::CentralSystem, kin.central_system[1], FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::Intermediate, pdg::PHOTON, FourMomentum::default()));
    }

    fn num_dimensions(&self) -> usize {
        use crate::kinematics::ProcessMode::*;
        let kin = self.kin();
        let base = match kin.mode {
            ElasticElastic | LeptonElasticProtonElastic => 7,
            ElasticInelastic | InelasticElastic | LeptonElasticProtonInelastic => 8,
            InelasticInelastic => 9,
        };
        base + super::symmetrisation_extra_dimensions(kin)
    }

    fn set_kinematics(&mut self, kinematics: KinematicsConfiguration) -> Result<()> {
        if kinematics.central_system.len() != 2
            || kinematics.central_system.iter().any(|p| ![11, 13, 15].contains(&p.id().abs()))
        {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "GamGamLL requires a pair of same-species charged leptons as central system",
            ));
        }
        self.w1 = pdg::on_shell_mass(kinematics.beam1_pdg).unwrap_or(0.938_272_08).powi(2);
        self.w2 = pdg::on_shell_mass(kinematics.beam2_pdg).unwrap_or(0.938_272_08).powi(2);
        self.kin = Some(kinematics);
        Ok(())
    }

    fn set_point(&mut self, point: &[f64]) {
        self.x = point.to_vec();
    }

    fn before_compute_weight(&mut self) {
        use crate::kinematics::ProcessMode::*;
        let kin = self.kin().clone();
        let u = self.x.last().copied().unwrap_or(0.5);
        let (effective_mode, factor) = resolve_symmetrisation(&kin, u);
        self.effective_mode = effective_mode;
        self.symmetrisation_factor = factor;

        let m1 = pdg::on_shell_mass(kin.beam1_pdg).unwrap_or(0.938_272_08);
        let m2 = pdg::on_shell_mass(kin.beam2_pdg).unwrap_or(0.938_272_08);
        let lepmass = pdg::on_shell_mass(kin.central_system[0]).unwrap_or(0.105_658_375_5);
        self.ml2 = lepmass * lepmass;

        match self.effective_mode {
            ElasticElastic | LeptonElasticProtonElastic => {
                self.dw31 = 0.;
                self.dw52 = 0.;
                self.mx = m1;
                self.my = m2;
            }
            InelasticElastic | LeptonElasticProtonInelastic => {
                let (mx, dw) = self.remnant_mass(self.x[7], m1, lepmass);
                self.mx = mx;
                self.dw31 = dw;
                self.my = m2;
            }
            ElasticInelastic => {
                let (my, dw) = self.remnant_mass(self.x[7], m2, lepmass);
                self.mx = m1;
                self.my = my;
                self.dw52 = dw;
            }
            InelasticInelastic => {
                let (mx, dw31) = self.remnant_mass(self.x[7], m2, lepmass);
                let (my, dw52) = self.remnant_mass(self.x[8], m1, lepmass);
                self.mx = mx;
                self.dw31 = dw31;
                self.my = my;
                self.dw52 = dw52;
            }
        }
        self.mx2 = self.mx * self.mx;
        self.my2 = self.my * self.my;
    }

    fn compute_weight(&mut self) -> f64 {
        let kin = self.kin().clone();
        let s = kin.s();
        let sqs = s.sqrt();

        let mut w_max = (sqs - self.mx - self.my).powi(2);
        if kin.initial.w.has_max() {
            w_max = w_max.min(kin.initial.w.max());
        } else {
            w_max = w_max.min(s);
        }
        let w_min = (4. * self.ml2).max(kin.initial.w.min());
        if w_min >= w_max {
            return 0.;
        }

        let (w4, dw4) = log_map(self.x[4], w_min, w_max);
        self.w4 = w4;
        self.mc4 = w4.sqrt();

        if !self.orient() {
            return 0.;
        }
        if self.jacobian == 0. {
            return 0.;
        }
        if self.t1 > 0. || self.t2 > 0. {
            return 0.;
        }

        let ecm6 = self.w4 / (2. * self.mc4);
        let pp6cm = (ecm6 * ecm6 - self.ml2).sqrt();
        self.jacobian *= dw4 * pp6cm / (self.mc4 * 4. * std::f64::consts::PI.powi(2) * s);

        let e1mp1 = self.w1 / (self.ep1 + self.p_cm);
        let e3mp3 = self.mx2 / (self.p3_lab.e().raw() + self.p3_lab.p_mag().raw());
        let theta3 = self.p3_lab.p_mag().raw().max(1e-300);
        let sin_theta3 = (self.p3_lab.pt().raw() / theta3).min(1.);
        let al3 = sin_theta3 * sin_theta3 / (1. + (self.p3_lab.pz().raw() / theta3).acos());

        let eg = (self.w4 + self.t1 - self.t2) / (2. * self.mc4);
        let mut pg = (eg * eg - self.t1).sqrt();

        let pgx = -self.p3_lab.px().raw() * self.cos_theta4
            - self.sin_theta4 * (self.de3 - e1mp1 + e3mp3 + self.p3_lab.p_mag().raw() * al3);
        let pgy = -self.p3_lab.py().raw();
        let pgz = self.mc4 * self.de3 / (self.ec4 + self.pc4) - self.ec4 * self.de3 * self.al4 / self.mc4
            - self.p3_lab.px().raw() * self.ec4 * self.sin_theta4 / self.mc4
            + self.ec4 * self.cos_theta4 / self.mc4 * (self.p3_lab.p_mag().raw() * al3 + e3mp3 - e1mp1);

        let pgp = (pgx * pgx + pgy * pgy).sqrt();
        let pgg = (pgp * pgp + pgz * pgz).sqrt();
        if pgg > pgp * 0.9 && pgg > pg {
            pg = pgg;
        }

        let cpg = pgx / pgp;
        let spg = pgy / pgp;
        let stg = pgp / pg;
        let theta_sign = if pgz > 0. { 1. } else { -1. };
        let ctg = theta_sign * (1. - stg * stg).sqrt();

        let amap = 0.5 * (self.w4 - self.t1 - self.t2);
        let bmap = 0.5
            * (((self.w4 - self.t1 - self.t2).powi(2) - 4. * self.t1 * self.t2) * (1. - 4. * self.ml2 / self.w4)).sqrt();
        let ymap = (amap + bmap) / (amap - bmap);
        let beta = ymap.powf(2. * self.x[5] - 1.);
        let mut xx6 = 0.5 * (1. + amap / bmap * (beta - 1.) / (beta + 1.));
        xx6 = xx6.clamp(0., 1.);

        let theta6cm = (1. - 2. * xx6).acos();

        self.jacobian *= (amap + bmap * theta6cm.cos()) * (amap - bmap * theta6cm.cos()) / (amap * bmap) * ymap.ln() * 0.5;

        let phi6cm = 2. * std::f64::consts::PI * self.x[6];
        let p6cm = FourMomentum::from_spherical(pp6cm, theta6cm, phi6cm, ecm6);

        let h1 = stg * p6cm.pz().raw() + ctg * p6cm.px().raw();
        let pc6z = ctg * p6cm.pz().raw() - stg * p6cm.px().raw();
        let pc6x = cpg * h1 - spg * p6cm.py().raw();

        let qcx = 2. * pc6x;
        let qcz = 2. * pc6z;

        let el6 = (self.ec4 * ecm6 + self.pc4 * pc6z) / self.mc4;
        let h2 = (self.ec4 * pc6z + self.pc4 * ecm6) / self.mc4;

        let p6x = self.cos_theta4 * pc6x + self.sin_theta4 * h2;
        let p6y = cpg * p6cm.py().raw() + spg * h1;
        let p6z = self.cos_theta4 * h2 - self.sin_theta4 * pc6x;
        self.p6_cm = FourMomentum::new(p6x, p6y, p6z, el6);

        let hq = self.ec4 * qcz / self.mc4;
        let qve = FourMomentum::new(
            self.cos_theta4 * qcx + self.sin_theta4 * hq,
            2. * p6y,
            self.cos_theta4 * hq - self.sin_theta4 * qcx,
            self.pc4 * qcz / self.mc4,
        );

        let el7 = self.ec4 - el6;
        let p7x = -p6x + self.pt4;
        let p7y = -p6y;
        let p7z = -p6z + self.pc4 * self.cos_theta4;
        self.p7_cm = FourMomentum::new(p7x, p7y, p7z, el7);

        self.q1dq = eg * (2. * ecm6 - self.mc4) - 2. * pg * p6cm.pz().raw();
        self.q1dq2 = (self.w4 - self.t1 - self.t2) * 0.5;

        let phi3 = self.p3_lab.phi().raw();
        let (sin_phi3, cos_phi3) = phi3.sin_cos();
        let phi5 = self.p5_lab.phi().raw();
        let (sin_phi5, cos_phi5) = phi5.sin_cos();

        self.bb = self.t1 * self.t2
            + (self.w4 * theta6cm.sin().powi(2) + 4. * self.ml2 * theta6cm.cos().powi(2)) * pg * pg;

        let pt3 = self.p3_lab.pt().raw();
        let pt5 = self.p5_lab.pt().raw();
        let c1 = pt3 * (qve.px().raw() * sin_phi3 - qve.py().raw() * cos_phi3);
        let c2 = pt3 * (qve.pz().raw() * self.ep1 - qve.e().raw() * self.p_cm);
        let c3 = (self.w31 * self.ep1 * self.ep1 + 2. * self.w1 * self.de3 * self.ep1 - self.w1 * self.de3 * self.de3
            + self.p3_lab.pt().raw().powi(2) * self.ep1 * self.ep1)
            / (self.p3_lab.e().raw() * self.p_cm + self.p3_lab.pz().raw() * self.ep1);

        let b1 = pt5 * (qve.px().raw() * sin_phi5 - qve.py().raw() * cos_phi5);
        let b2 = pt5 * (qve.pz().raw() * self.ep2 + qve.e().raw() * self.p_cm);
        let b3 = (self.w52 * self.ep2 * self.ep2 + 2. * self.w2 * self.de5 * self.ep2 - self.w2 * self.de5 * self.de5
            + self.p5_lab.pt().raw().powi(2) * self.ep2 * self.ep2)
            / (self.ep2 * self.p5_lab.pz().raw() - self.p5_lab.e().raw() * self.p_cm);

        let r12 = c2 * sin_phi3 + qve.py().raw() * c3;
        let r13 = -c2 * cos_phi3 - qve.px().raw() * c3;
        let r22 = b2 * sin_phi5 + qve.py().raw() * b3;
        let r23 = -b2 * cos_phi5 - qve.px().raw() * b3;

        self.epsi = self.p12 * c1 * b1 + r12 * r22 + r13 * r23;
        self.g5 = self.w1 * c1 * c1 + r12 * r12 + r13 * r13;
        self.g6 = self.w2 * b1 * b1 + r22 * r22 + r23 * r23;

        self.a5 = -(qve.px().raw() * cos_phi3 + qve.py().raw() * sin_phi3) * pt3 * self.p1k2
            - (self.ep1 * qve.e().raw() - self.p_cm * qve.pz().raw()) * (cos_phi3 * cos_phi5 + sin_phi3 * sin_phi5) * pt3 * pt5
            + (self.de5 * qve.pz().raw() + qve.e().raw() * (self.p_cm + self.p5_lab.pz().raw())) * c3;
        self.a6 = -(qve.px().raw() * cos_phi5 + qve.py().raw() * sin_phi5) * pt5 * self.p2k1
            - (self.ep2 * qve.e().raw() + self.p_cm * qve.pz().raw()) * (cos_phi3 * cos_phi5 + sin_phi3 * sin_phi5) * pt3 * pt5
            + (self.de3 * qve.pz().raw() - qve.e().raw() * (self.p_cm - self.p3_lab.pz().raw())) * b3;

        let e1 = (kin.beam1_pz * kin.beam1_pz + self.w1).sqrt();
        let e2 = (kin.beam2_pz * kin.beam2_pz + self.w2).sqrt();
        let cm_e = e1 + e2;
        let cm_pz = kin.beam1_pz + kin.beam2_pz;
        let gamma = cm_e / sqs;
        let betgam = cm_pz / sqs;
        let beta = if gamma != 0. { betgam / gamma } else { 0. };

        self.p6_cm = self.p6_cm.boost_z(noisy_float::prelude::n64(beta), noisy_float::prelude::n64(gamma));
        self.p7_cm = self.p7_cm.boost_z(noisy_float::prelude::n64(beta), noisy_float::prelude::n64(gamma));

        use crate::kinematics::ProcessMode::*;
        let mx_limits = kin.initial.remnant_mass;
        if matches!(self.effective_mode, InelasticElastic | InelasticInelastic)
            && ((mx_limits.has_min() && self.mx < mx_limits.min()) || (mx_limits.has_max() && self.mx > mx_limits.max()))
        {
            return 0.;
        }
        if matches!(self.effective_mode, ElasticInelastic | InelasticInelastic)
            && ((mx_limits.has_min() && self.my < mx_limits.min()) || (mx_limits.has_max() && self.my > mx_limits.max()))
        {
            return 0.;
        }

        let q2_limits = kin.initial.q2;
        if q2_limits.has_max() && self.t1 < -q2_limits.max() {
            return 0.;
        }
        if q2_limits.has_min() && self.t1 > -q2_limits.min() {
            return 0.;
        }

        let psum = self.p6_cm + self.p7_cm;
        let m_limits = kin.central.mass_sum;
        if m_limits.has_min() && psum.mass().raw() < m_limits.min() {
            return 0.;
        }
        if m_limits.has_max() && psum.mass().raw() > m_limits.max() {
            return 0.;
        }

        let pt_limits = kin.single.pt;
        if pt_limits.has_min() && (self.p6_cm.pt().raw() < pt_limits.min() || self.p7_cm.pt().raw() < pt_limits.min()) {
            return 0.;
        }
        if pt_limits.has_max() && (self.p6_cm.pt().raw() > pt_limits.max() || self.p7_cm.pt().raw() > pt_limits.max()) {
            return 0.;
        }

        let energy_limits = kin.single.energy;
        if energy_limits.has_min()
            && (self.p6_cm.e().raw() < energy_limits.min() || self.p7_cm.e().raw() < energy_limits.min())
        {
            return 0.;
        }
        if energy_limits.has_max()
            && (self.p6_cm.e().raw() > energy_limits.max() || self.p7_cm.e().raw() > energy_limits.max())
        {
            return 0.;
        }

        let eta_limits = kin.single.eta;
        if eta_limits.has_min() && (self.p6_cm.eta().raw() < eta_limits.min() || self.p7_cm.eta().raw() < eta_limits.min()) {
            return 0.;
        }
        if eta_limits.has_max() && (self.p6_cm.eta().raw() > eta_limits.max() || self.p7_cm.eta().raw() > eta_limits.max()) {
            return 0.;
        }

        let mut peripp = self.peri_pp();
        match self.effective_mode {
            InelasticElastic => peripp *= self.dw31 * self.dw31,
            ElasticInelastic => peripp *= self.dw52 * self.dw52,
            InelasticInelastic => peripp *= self.dw31 * self.dw31 * self.dw52 * self.dw52,
            _ => {}
        }
        self.jacobian *= peripp;

        self.symmetrisation_factor * GEV2_TO_BARN * self.jacobian
    }

    fn fill_kinematics(&mut self, event: &mut Event) {
        let kin = self.kin().clone();
        let sqs = kin.s().sqrt();

        let e1 = (kin.beam1_pz * kin.beam1_pz + self.w1).sqrt();
        let e2 = (kin.beam2_pz * kin.beam2_pz + self.w2).sqrt();
        let cm_e = e1 + e2;
        let cm_pz = kin.beam1_pz + kin.beam2_pz;
        let gamma = cm_e / sqs;
        let betgam = cm_pz / sqs;
        let beta = if gamma != 0. { betgam / gamma } else { 0. };
        let (n64_beta, n64_gamma) = (noisy_float::prelude::n64(beta), noisy_float::prelude::n64(gamma));

        let plab_ip1 = FourMomentum::new(0., 0., self.p_cm, self.ep1).boost_z(n64_beta, n64_gamma);
        let plab_ip2 = FourMomentum::new(0., 0., -self.p_cm, self.ep2).boost_z(n64_beta, n64_gamma);
        self.p3_lab = self.p3_lab.boost_z(n64_beta, n64_gamma);
        self.p5_lab = self.p5_lab.boost_z(n64_beta, n64_gamma);

        let mut rng = rand::thread_rng();
        let rany = if rng.gen::<f64>() >= 0.5 { 1. } else { -1. };
        let ransign = if rng.gen::<f64>() >= 0.5 { 1 } else { -1 };
        let ranphi = rng.gen::<f64>() * 2. * std::f64::consts::PI;
        let phi = noisy_float::prelude::n64(ranphi);
        let sign = noisy_float::prelude::n64(rany);

        let plab_ph1 = (plab_ip1 - self.p3_lab).rotate_phi(phi, sign);
        let plab_ph2 = (plab_ip2 - self.p5_lab).rotate_phi(phi, sign);

        self.p3_lab = self.p3_lab.rotate_phi(phi, sign);
        self.p5_lab = self.p5_lab.rotate_phi(phi, sign);
        self.p6_cm = self.p6_cm.rotate_phi(phi, sign);
        self.p7_cm = self.p7_cm.rotate_phi(phi, sign);

        if let Some(id) = event.one(Role::IncomingBeam1).map(|p| p.id()) {
            event.particle_mut(id).unwrap().set_momentum(plab_ip1);
        }
        if let Some(id) = event.one(Role::IncomingBeam2).map(|p| p.id()) {
            event.particle_mut(id).unwrap().set_momentum(plab_ip2);
        }

        use crate::kinematics::ProcessMode::*;
        if let Some(id) = event.one(Role::OutgoingBeam1).map(|p| p.id()) {
            let p = event.particle_mut(id).unwrap();
            p.set_momentum(self.p3_lab);
            if matches!(self.effective_mode, InelasticElastic | InelasticInelastic) {
                p.set_status(Status::Undecayed);
                p.set_mass(self.mx);
            } else {
                p.set_status(Status::FinalState);
            }
        }
        if let Some(id) = event.one(Role::OutgoingBeam2).map(|p| p.id()) {
            let p = event.particle_mut(id).unwrap();
            p.set_momentum(self.p5_lab);
            if matches!(self.effective_mode, ElasticInelastic | InelasticInelastic) {
                p.set_status(Status::Undecayed);
                p.set_mass(self.my);
            } else {
                p.set_status(Status::FinalState);
            }
        }

        if let Some(id) = event.one(Role::Parton1).map(|p| p.id()) {
            let p = event.particle_mut(id).unwrap();
            p.set_momentum(plab_ph1);
            p.set_status(Status::Incoming);
        }
        if let Some(id) = event.one(Role::Parton2).map(|p| p.id()) {
            let p = event.particle_mut(id).unwrap();
            p.set_momentum(plab_ph2);
            p.set_status(Status::Incoming);
        }

        let ids: Vec<usize> = event.by_role(Role::CentralSystem).map(|p| p.id()).collect();
        if let Some(&id1) = ids.first() {
            let p = event.particle_mut(id1).unwrap();
            p.set_charge(ransign);
            p.set_momentum(self.p6_cm);
            p.set_status(Status::FinalState);
        }
        if let Some(&id2) = ids.get(1) {
            let p = event.particle_mut(id2).unwrap();
            p.set_charge(-ransign);
            p.set_momentum(self.p7_cm);
            p.set_status(Status::FinalState);
        }

        if let Some(id) = event.one(Role::Intermediate).map(|p| p.id()) {
            event.particle_mut(id).unwrap().set_momentum(self.p6_cm + self.p7_cm);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::KinematicsConfiguration;

    #[test]
    fn rejects_non_lepton_central_system() {
        let mut proc = GamGamLL::new(OptimisationMode(0));
        let mut kin = KinematicsConfiguration::default();
        kin.central_system = vec![pdg::PROTON, pdg::PROTON];
        assert!(proc.set_kinematics(kin).is_err());
    }

    #[test]
    fn dimension_count_matches_mode() {
        let mut proc = GamGamLL::new(OptimisationMode(0));
        proc.set_kinematics(KinematicsConfiguration::default()).unwrap();
        assert_eq!(proc.num_dimensions(), 7);
    }

    #[test]
    fn elastic_elastic_weight_is_finite_at_a_generic_point() {
        let mut proc = GamGamLL::new(OptimisationMode(0));
        proc.set_kinematics(KinematicsConfiguration::default()).unwrap();
        proc.set_point(&[0.3, 0.4, 0.5, 0.2, 0.6, 0.7, 0.1]);
        proc.before_compute_weight();
        let w = proc.compute_weight();
        assert!(w.is_finite());
        assert!(w >= 0.);
    }
}
