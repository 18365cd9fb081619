//! γγ → ℓ⁺ℓ⁻ kT-factorised process
//!
//! Structurally mirrors [`super::pptoww::PPtoWW`]'s on-shell branch,
//! same `KtProcessState` scaffolding, same Sudakov/remnant bookkeeping,
//! but swaps in the standard tree-level QED (Breit-Wheeler) matrix
//! element for γγ → ℓ⁺ℓ⁻ (the LPAIR-style treatment lives in
//! [`super::gamgamll::GamGamLL`] instead). See `DESIGN.md` for the
//! grounding of the matrix element itself.

use rand::Rng;

use crate::error::{Error, ErrorKind, Result};
use crate::kinematics::{KinematicsConfiguration, ProcessMode};
use crate::physics::{pdg, Event, FourMomentum, Particle, Role, Status};

use super::kt::KtProcessState;
use super::{resolve_symmetrisation, Process, GEV2_TO_BARN};

const NUM_USER_DIMENSIONS: usize = 4;
const ALPHA_EM: f64 = 1. / 137.035_999_139;

/// γγ → ℓ⁺ℓ⁻ kT-factorised kernel
pub struct PPtoLL {
    kin: Option<KinematicsConfiguration>,
    state: KtProcessState,
    x: Vec<f64>,
    y1: f64,
    y2: f64,
    pt_diff: f64,
    phi_pt_diff: f64,
    p_l1: FourMomentum,
    p_l2: FourMomentum,
    p_x: FourMomentum,
    p_y: FourMomentum,

    /// Mode this sample is actually evaluated in, resolved fresh by
    /// `before_compute_weight` each call
    effective_mode: ProcessMode,
    /// Cross-section multiplier paired with `effective_mode`
    symmetrisation_factor: f64,
}

impl PPtoLL {
    pub fn new() -> Self {
        Self {
            kin: None,
            state: KtProcessState::default(),
            x: Vec::new(),
            y1: 0.,
            y2: 0.,
            pt_diff: 0.,
            phi_pt_diff: 0.,
            p_l1: FourMomentum::default(),
            p_l2: FourMomentum::default(),
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

    fn lepton_mass2(&self) -> f64 {
        pdg::on_shell_mass(self.kin().central_system[0]).unwrap_or(0.105_658_375_5).powi(2)
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

    /// Tree-level QED Breit-Wheeler amplitude squared for γγ → ℓ⁺ℓ⁻,
    /// summed over final spins and averaged over the two incoming
    /// photon polarisations.
    fn qed_amplitude(shat: f64, that: f64, uhat: f64, ml2: f64) -> f64 {
        let e2 = 4. * std::f64::consts::PI * ALPHA_EM;
        let mt = ml2 - that;
        let mu = ml2 - uhat;
        let term1 = mu / mt + mt / mu;
        let term2 = 4. * ml2 * shat / (mt * mu);
        let term3 = 4. * ml2 * ml2 * (1. / mt + 1. / mu).powi(2);
        2. * e2 * e2 * (term1 + term2 - term3)
    }
}

impl Default for PPtoLL {
    fn default() -> Self {
        Self::new()
    }
}

impl Process for PPtoLL {
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
    }

    fn num_dimensions(&self) -> usize {
        let kin = self.kin();
        KtProcessState::num_dimensions(kin.mode, NUM_USER_DIMENSIONS) + super::symmetrisation_extra_dimensions(kin)
    }

    fn set_kinematics(&mut self, kinematics: KinematicsConfiguration) -> Result<()> {
        if kinematics.central_system.len() != 2
            || kinematics.central_system.iter().any(|p| ![11, 13, 15].contains(&p.id().abs()))
        {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "PPtoLL requires a pair of same-species charged leptons as central system",
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
        let ml2 = self.lepton_mass2();

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

        let amt1 = (pt1 * pt1 + ml2).sqrt();
        let amt2 = (pt2 * pt2 + ml2).sqrt();

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
        // Mirrors PPtoWW: any non-elastic-elastic mode applies both
        // dissociation cuts, not just the one for its own leg.
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

        self.p_l1 = FourMomentum::new(pt1x, pt1y, alpha1 * ak1z + beta1 * ak2z, alpha1 * ak10 + beta1 * ak20);
        self.p_l2 = FourMomentum::new(pt2x, pt2y, alpha2 * ak1z + beta2 * ak2z, alpha2 * ak10 + beta2 * ak20);

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
        let that1 = (q1 - self.p_l1).mass_sq().raw();
        let that2 = (q2 - self.p_l2).mass_sq().raw();
        let uhat1 = (q1 - self.p_l2).mass_sq().raw();
        let uhat2 = (q2 - self.p_l1).mass_sq().raw();
        let that = 0.5 * (that1 + that2);
        let uhat = 0.5 * (uhat1 + uhat2);

        let amat2 = Self::qed_amplitude(shat, that, uhat, ml2);

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
            p.set_charge(-sign);
            p.set_status(Status::FinalState);
            p.set_momentum(self.p_l1);
        }
        if let Some(&id2) = ids.get(1) {
            let p = event.particle_mut(id2).unwrap();
            p.set_charge(sign);
            p.set_status(Status::FinalState);
            p.set_momentum(self.p_l2);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::KinematicsConfiguration;

    #[test]
    fn rejects_non_lepton_central_system() {
        let mut proc = PPtoLL::new();
        let mut kin = KinematicsConfiguration::default();
        kin.central_system = vec![pdg::PROTON, pdg::PROTON];
        assert!(proc.set_kinematics(kin).is_err());
    }

    #[test]
    fn qed_amplitude_is_positive_in_physical_region() {
        let ml2 = 0.105_658_375_5f64.powi(2);
        let shat = 100.;
        let that = -30.;
        let uhat = -(shat + that) + 2. * ml2 - shat; // rough on-shell-ish split
        let amp = PPtoLL::qed_amplitude(shat, that, uhat, ml2);
        assert!(amp.is_finite());
    }

    #[test]
    fn dimension_count_includes_required_and_user_axes() {
        let mut proc = PPtoLL::new();
        proc.set_kinematics(KinematicsConfiguration::default()).unwrap();
        assert_eq!(proc.num_dimensions(), 8);
    }
}
