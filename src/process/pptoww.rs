//! γγ → W⁺W⁻ kT-factorised process

use particle_id::ParticleID;
use rand::Rng;

use crate::error::{Error, ErrorKind, Result};
use crate::kinematics::{KinematicsConfiguration, ProcessMode};
use crate::physics::{pdg, Event, FourMomentum, Particle, Role, Status};

use super::kt::KtProcessState;
use super::{resolve_symmetrisation, Process, GEV2_TO_BARN};

const NUM_USER_DIMENSIONS: usize = 4;

/// Subprocess matrix-element choice for γγ → W⁺W⁻
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixElementMethod {
    /// On-shell Denner-Dittmaier-Schuster form
    OnShell,
    /// Off-shell Nachtmann helicity amplitudes
    Offshell,
}

/// γγ → W⁺W⁻ kT-factorised kernel
pub struct PPtoWW {
    kin: Option<KinematicsConfiguration>,
    method: MatrixElementMethod,
    state: KtProcessState,
    x: Vec<f64>,
    y1: f64,
    y2: f64,
    pt_diff: f64,
    phi_pt_diff: f64,
    p_w1: FourMomentum,
    p_w2: FourMomentum,
    p_x: FourMomentum,
    p_y: FourMomentum,

    /// Mode this sample is actually evaluated in, resolved fresh by
    /// `before_compute_weight` each call
    effective_mode: ProcessMode,
    /// Cross-section multiplier paired with `effective_mode`
    symmetrisation_factor: f64,
}

impl PPtoWW {
    pub fn new(method: MatrixElementMethod) -> Self {
        Self {
            kin: None,
            method,
            state: KtProcessState::default(),
            x: Vec::new(),
            y1: 0.,
            y2: 0.,
            pt_diff: 0.,
            phi_pt_diff: 0.,
            p_w1: FourMomentum::default(),
            p_w2: FourMomentum::default(),
            p_x: FourMomentum::default(),
            p_y: FourMomentum::default(),
            effective_mode: ProcessMode::ElasticElastic,
            symmetrisation_factor: 1.,
        }
    }

    fn kin(&self) -> &KinematicsConfiguration {
        self.kin.as_ref().expect("set_kinematics not called")
    }

    /// The kinematics configuration as seen by this sample: identical to
    /// `kin()` except `mode`, which may be `effective_mode`'s mirror when
    /// symmetrisation flipped it
    fn effective_kin(&self) -> KinematicsConfiguration {
        let mut kin = self.kin().clone();
        kin.mode = self.effective_mode;
        kin
    }

    fn prepare_kt_kinematics(&mut self) {
        let kin = self.kin().clone();
        let rap = kin.single.rapidity;
        self.y1 = rap.min() + (rap.max() - rap.min()) * self.x[4];
        self.y2 = rap.min() + (rap.max() - rap.min()) * self.x[5];

        let pt_diff_max = if kin.central.pt_diff.has_max() {
            kin.central.pt_diff.max()
        } else {
            500.
        };
        let pt_diff_min = kin.central.pt_diff.min();
        self.pt_diff = pt_diff_min + (pt_diff_max - pt_diff_min) * self.x[6];
        self.phi_pt_diff = 2. * std::f64::consts::PI * self.x[7];
    }

    fn compute_jacobian(&self) -> f64 {
        let kin = self.kin();
        let mut jac = self.state.minimal_jacobian(&self.effective_kin());
        jac *= kin.single.rapidity.max() - kin.single.rapidity.min();
        jac *= kin.single.rapidity.max() - kin.single.rapidity.min();
        jac *= kin.central.pt_diff.max() - kin.central.pt_diff.min();
        jac *= 2. * std::f64::consts::PI;
        jac
    }

    fn w_amplitude(shat: f64, that: f64, uhat: f64, lam1: i32, lam2: i32, lam3: i32, lam4: i32) -> f64 {
        let mw2 = pdg::on_shell_mass(pdg::W_BOSON).unwrap_or(80.379).powi(2);
        let sqrt2 = std::f64::consts::SQRT_2;

        let cos_theta = (that - uhat) / shat / (1. + 1e-10 - 4. * mw2 / shat).sqrt();
        let cos_theta2 = cos_theta * cos_theta;
        let sin_theta2 = 1. - cos_theta2;
        let sin_theta = sin_theta2.sqrt();
        let beta = (1. - 4. * mw2 / shat).sqrt();
        let beta2 = beta * beta;
        let gamma = 1. / (1. - beta2).sqrt();
        let gamma2 = gamma * gamma;
        let inv_a = 1. / (1. - beta2 * cos_theta2);

        let l1 = lam1 as f64;
        let l2 = lam2 as f64;
        let l3 = lam3 as f64;
        let l4 = lam4 as f64;

        if lam3 == 0 && lam4 == 0 {
            let term1 = 1. / gamma2 * ((gamma2 + 1.) * (1. - l1 * l2) * sin_theta2 - (1. + l1 * l2));
            return inv_a * term1;
        }
        if lam4 == 0 {
            let term2 = -sqrt2 / gamma * (l1 - l2) * (1. + l1 * l3 * cos_theta) * sin_theta;
            return inv_a * term2;
        }
        if lam3 == 0 {
            let term4 = -sqrt2 / gamma * (l2 - l1) * (1. + l2 * l4 * cos_theta) * sin_theta;
            return inv_a * term4;
        }
        let term3 = -0.5
            * (2. * beta * (l1 + l2) * (l3 + l4)
                - (1. / gamma2) * (1. + l3 * l4) * (2. * l1 * l2 + (1. - l1 * l2) * cos_theta2)
                + (1. + l1 * l2 * l3 * l4) * (3. + l1 * l2)
                + 2. * (l1 - l2) * (l3 - l4) * cos_theta
                + (1. - l1 * l2) * (1. - l3 * l4) * cos_theta2);
        inv_a * term3
    }
}

impl Process for PPtoWW {
    fn add_event_content(&self, event: &mut Event) {
        let kin = self.kin();
        event.add_particle(Particle::new(0, Role::IncomingBeam1, kin.beam1_pdg, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::IncomingBeam2, kin.beam2_pdg, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::Parton1, pdg::PHOTON, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::Parton2, pdg::PHOTON, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::OutgoingBeam1, kin.beam1_pdg, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::OutgoingBeam2, kin.beam2_pdg, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::CentralSystem, pdg::W_BOSON, FourMomentum::default()));
        event.add_particle(Particle::new(0, Role::CentralSystem, pdg::W_BOSON, FourMomentum::default()));
    }

    fn num_dimensions(&self) -> usize {
        let kin = self.kin();
        KtProcessState::num_dimensions(kin.mode, NUM_USER_DIMENSIONS) + super::symmetrisation_extra_dimensions(kin)
    }

    fn set_kinematics(&mut self, kinematics: KinematicsConfiguration) -> Result<()> {
        if kinematics.central_system.iter().any(|p| p.id().abs() != ParticleID::new(24).id()) {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "PPtoWW requires a W+W- central system",
            ));
        }
        self.kin = Some(kinematics);
        Ok(())
    }

    fn set_point(&mut self, point: &[f64]) {
        self.x = point.to_vec();
    }

    fn before_compute_weight(&mut self) {
        let kin = self.kin().clone();
        let u = self.x.last().copied().unwrap_or(0.5);
        let (effective_mode, factor) = resolve_symmetrisation(&kin, u);
        self.effective_mode = effective_mode;
        self.symmetrisation_factor = factor;
        self.state.fill_remnant_masses(&self.effective_kin(), &self.x, NUM_USER_DIMENSIONS);
    }

    fn compute_weight(&mut self) -> f64 {
        let kin = self.kin().clone();
        self.state.fill_parton_content(&self.x);
        self.prepare_kt_kinematics();

        let s = kin.s();
        let sqs = s.sqrt();
        let mw2 = pdg::on_shell_mass(pdg::W_BOSON).unwrap_or(80.379).powi(2);

        let (q1tx, q1ty) = (self.state.qt1 * self.state.phi_qt1.cos(), self.state.qt1 * self.state.phi_qt1.sin());
        let (q2tx, q2ty) = (self.state.qt2 * self.state.phi_qt2.cos(), self.state.qt2 * self.state.phi_qt2.sin());

        let ptsumx = q1tx + q2tx;
        let ptsumy = q1ty + q2ty;
        let ptsum = (ptsumx * ptsumx + ptsumy * ptsumy).sqrt();

        let ptdiffx = self.pt_diff * self.phi_pt_diff.cos();
        let ptdiffy = self.pt_diff * self.phi_pt_diff.sin();

        let pt1x = 0.5 * (ptsumx + ptdiffx);
        let pt1y = 0.5 * (ptsumy + ptdiffy);
        let pt1 = (pt1x * pt1x + pt1y * pt1y).sqrt();
        let pt2x = 0.5 * (ptsumx - ptdiffx);
        let pt2y = 0.5 * (ptsumy - ptdiffy);
        let pt2 = (pt2x * pt2x + pt2y * pt2y).sqrt();

        if kin.single.pt.has_min() && (pt1 < kin.single.pt.min() || pt2 < kin.single.pt.min()) {
            return 0.;
        }
        if kin.single.pt.has_max() && (pt1 > kin.single.pt.max() || pt2 > kin.single.pt.max()) {
            return 0.;
        }

        let amt1 = (pt1 * pt1 + mw2).sqrt();
        let amt2 = (pt2 * pt2 + mw2).sqrt();

        let invm = (amt1 * amt1 + amt2 * amt2 + 2. * amt1 * amt2 * (self.y1 - self.y2).cosh() - ptsum * ptsum).sqrt();
        if kin.central.mass_sum.has_min() && invm < kin.central.mass_sum.min() {
            return 0.;
        }
        if kin.central.mass_sum.has_max() && invm > kin.central.mass_sum.max() {
            return 0.;
        }

        if kin.central.pt_diff.has_max() && (pt1 - pt2).abs() > kin.central.pt_diff.max() {
            return 0.;
        }

        let dely = (self.y1 - self.y2).abs();
        if kin.central.rapidity_diff.has_min() && dely < kin.central.rapidity_diff.min() {
            return 0.;
        }
        if kin.central.rapidity_diff.has_max() && dely > kin.central.rapidity_diff.max() {
            return 0.;
        }

        let alpha1 = amt1 / sqs * self.y1.exp();
        let alpha2 = amt2 / sqs * self.y2.exp();
        let beta1 = amt1 / sqs * (-self.y1).exp();
        let beta2 = amt2 / sqs * (-self.y2).exp();

        let q1t2 = q1tx * q1tx + q1ty * q1ty;
        let q2t2 = q2tx * q2tx + q2ty * q2ty;

        let x1 = alpha1 + alpha2;
        let x2 = beta1 + beta2;
        if x1 > 1. || x2 > 1. {
            return 0.;
        }

        let s1_eff = x1 * s - self.state.qt1 * self.state.qt1;
        let s2_eff = x2 * s - self.state.qt2 * self.state.qt2;
        // The unswitched dissociation cuts: any mode but elastic-elastic
        // applies both the s1 and s2 checks, not just the one matching
        // the leg that actually dissociates.
        if self.effective_mode != ProcessMode::ElasticElastic {
            if s1_eff.sqrt() <= self.state.my + invm {
                return 0.;
            }
            if s2_eff.sqrt() <= self.state.mx + invm {
                return 0.;
            }
        }

        let ak1z = kin.beam1_pz;
        let ak2z = kin.beam2_pz;
        let ak10 = (ak1z * ak1z + pdg::on_shell_mass(kin.beam1_pdg).unwrap_or(0.).powi(2)).sqrt();
        let ak20 = (ak2z * ak2z + pdg::on_shell_mass(kin.beam2_pdg).unwrap_or(0.).powi(2)).sqrt();

        let px_plus = (1. - x1) * ak1z.abs() * std::f64::consts::SQRT_2;
        let px_minus = (self.state.mx * self.state.mx + q1t2) * 0.5 / px_plus;
        let py_minus = (1. - x2) * ak2z.abs() * std::f64::consts::SQRT_2;
        let py_plus = (self.state.my * self.state.my + q2t2) * 0.5 / py_minus;

        self.p_x = FourMomentum::new(
            -q1tx,
            -q1ty,
            (px_plus - px_minus) / std::f64::consts::SQRT_2,
            (px_plus + px_minus) / std::f64::consts::SQRT_2,
        );
        self.p_y = FourMomentum::new(
            -q2tx,
            -q2ty,
            (py_plus - py_minus) / std::f64::consts::SQRT_2,
            (py_plus + py_minus) / std::f64::consts::SQRT_2,
        );

        self.p_w1 = FourMomentum::new(pt1x, pt1y, alpha1 * ak1z + beta1 * ak2z, alpha1 * ak10 + beta1 * ak20);
        self.p_w2 = FourMomentum::new(pt2x, pt2y, alpha2 * ak1z + beta2 * ak2z, alpha2 * ak10 + beta2 * ak20);

        let ww = 0.5 * (1. + (1. - 4. * pdg::on_shell_mass(pdg::PROTON).unwrap_or(0.938_272).powi(2) / s).sqrt());
        let q1 = FourMomentum::new(
            q1tx,
            q1ty,
            0.5 * x1 * ww * sqs * (1. - q1t2 / (x1 * x1 * ww * ww * s)),
            0.5 * x1 * ww * sqs * (1. + q1t2 / (x1 * x1 * ww * ww * s)),
        );
        let q2 = FourMomentum::new(
            q2tx,
            q2ty,
            -0.5 * x2 * ww * sqs * (1. - q2t2 / (x2 * x2 * ww * ww * s)),
            0.5 * x2 * ww * sqs * (1. + q2t2 / (x2 * x2 * ww * ww * s)),
        );

        let shat = (q1 + q2).mass_sq().raw();
        let that1 = (q1 - self.p_w1).mass_sq().raw();
        let that2 = (q2 - self.p_w2).mass_sq().raw();
        let uhat1 = (q1 - self.p_w2).mass_sq().raw();
        let uhat2 = (q2 - self.p_w1).mass_sq().raw();
        let that = 0.5 * (that1 + that2);
        let uhat = 0.5 * (uhat1 + uhat2);

        let amat2 = match self.method {
            MatrixElementMethod::OnShell => {
                let mw4 = mw2 * mw2;
                let term1 = 2. * shat * (2. * shat + 3. * mw2) / (3. * (mw2 - that) * (mw2 - uhat));
                let term2 = 2. * shat * shat * (shat * shat + 3. * mw4)
                    / (3. * (mw2 - that).powi(2) * (mw2 - uhat).powi(2));
                let auxil = 1. - term1 + term2;
                let beta = (1. - 4. * mw2 / shat).sqrt();
                const ALPHA_EM: f64 = 1. / 137.035_999_139;
                3. * ALPHA_EM * ALPHA_EM * beta / (2. * shat) * auxil / (beta / (64. * std::f64::consts::PI.powi(2) * shat))
            }
            MatrixElementMethod::Offshell => {
                const ALPHA_EM: f64 = 1. / 137.035_999_139;
                let e2 = 4. * std::f64::consts::PI * ALPHA_EM;
                let phi_diff = self.state.phi_qt1 - self.state.phi_qt2;
                let phi_sum = self.state.phi_qt1 + self.state.phi_qt2;
                let mut amat2_0 = 0.;
                let mut amat2_1 = 0.;
                let mut amat2_interf = 0.;
                for lam3 in [-1, 0, 1] {
                    for lam4 in [-1, 0, 1] {
                        let pp = Self::w_amplitude(shat, that, uhat, 1, 1, lam3, lam4);
                        let mm = Self::w_amplitude(shat, that, uhat, -1, -1, lam3, lam4);
                        let pm = Self::w_amplitude(shat, that, uhat, 1, -1, lam3, lam4);
                        let mp = Self::w_amplitude(shat, that, uhat, -1, 1, lam3, lam4);
                        amat2_0 += pp * pp + mm * mm + 2. * (2. * phi_diff).cos() * pp * mm;
                        amat2_1 += pm * pm + mp * mp + 2. * (2. * phi_sum).cos() * pm * mp;
                        amat2_interf -= 2.
                            * ((phi_sum + phi_diff).cos() * (pp * pm + mm * mp)
                                + (phi_sum - phi_diff).cos() * (pp * mp + mm * pm));
                    }
                }
                e2 * e2 * (amat2_0 + amat2_1 + amat2_interf)
            }
        };

        self.state.fill_fluxes(&self.effective_kin(), x1, q1t2, x2, q2t2, None);
        if self.state.flux1 <= 0. || self.state.flux2 <= 0. {
            return 0.;
        }

        let jac = self.compute_jacobian();
        let pi = std::f64::consts::PI;
        let aintegral = amat2 * (2. * pi) / (16. * pi * pi * (x1 * x2 * s).powi(2)) * self.state.flux1 / pi
            * self.state.flux2
            / pi
            * 0.25
            * GEV2_TO_BARN
            * 0.5
            / pi;

        self.symmetrisation_factor * jac * aintegral * self.state.qt1 * self.state.qt2 * self.pt_diff
    }

    fn fill_kinematics(&mut self, event: &mut Event) {
        let sign = if rand::thread_rng().gen::<f64>() > 0.5 { 1 } else { -1 };

        let ids: Vec<usize> = event.by_role(Role::CentralSystem).map(|p| p.id()).collect();
        if let Some(&id1) = ids.first() {
            let p = event.particle_mut(id1).unwrap();
            p.set_charge(sign);
            p.set_status(Status::Undecayed);
            p.set_momentum(self.p_w1);
        }
        if let Some(&id2) = ids.get(1) {
            let p = event.particle_mut(id2).unwrap();
            p.set_charge(-sign);
            p.set_status(Status::Undecayed);
            p.set_momentum(self.p_w2);
        }

        if let Some(id) = event.one(Role::OutgoingBeam1).map(|p| p.id()) {
            let p = event.particle_mut(id).unwrap();
            p.set_momentum(self.p_x);
            if self.effective_mode.leg1_inelastic() {
                p.set_mass(self.state.mx);
                p.set_status(Status::Undecayed);
            } else {
                p.set_status(Status::FinalState);
            }
        }
        if let Some(id) = event.one(Role::OutgoingBeam2).map(|p| p.id()) {
            let p = event.particle_mut(id).unwrap();
            p.set_momentum(self.p_y);
            if self.effective_mode.leg2_inelastic() {
                p.set_mass(self.state.my);
                p.set_status(Status::Undecayed);
            } else {
                p.set_status(Status::FinalState);
            }
        }
    }
}
