//! Shared kT-factorised phase-space scaffolding
//!
//! The four common hypercube axes (two transverse
//! virtualities and their azimuths), the remnant-mass axes, the photon
//! fluxes and the minimal (pre-subprocess) part of the Jacobian are
//! identical across every kT-factorised process, so they live here once
//! and [`crate::process::pptoll::PPtoLL`] /
//! [`crate::process::pptoww::PPtoWW`] build their subprocess-specific
//! kinematics and matrix element on top.

use crate::form_factors::PartonDistributionFn;
use crate::kinematics::{KinematicsConfiguration, ProcessMode};
use crate::photon_flux;
use crate::physics::pdg;

/// Number of hypercube axes every kT-factorised process consumes before
/// its own subprocess-specific coordinates
pub const NUM_REQUIRED_DIMENSIONS: usize = 4;

/// `log(Q_min), log(Q_max)` window for the two transverse-virtuality axes
const LOG_QT_MIN: f64 = -6. * std::f64::consts::LN_10 / 2.; // ~ log(1e-3 GeV)
const LOG_QT_MAX: f64 = 2. * std::f64::consts::LN_10; // ~ log(100 GeV)

/// The common kT-factorised scratch state: incoming parton virtualities,
/// remnant masses and photon fluxes
#[derive(Debug, Default, Clone)]
pub struct KtProcessState {
    pub qt1: f64,
    pub qt2: f64,
    pub phi_qt1: f64,
    pub phi_qt2: f64,
    pub mx: f64,
    pub my: f64,
    pub flux1: f64,
    pub flux2: f64,
}

impl KtProcessState {
    /// Hypercube dimension for this process mode given its own extra axes
    pub fn num_dimensions(mode: ProcessMode, num_user_dimensions: usize) -> usize {
        let extra = match mode {
            ProcessMode::ElasticElastic => 0,
            ProcessMode::ElasticInelastic
            | ProcessMode::InelasticElastic
            | ProcessMode::LeptonElasticProtonInelastic => 1,
            ProcessMode::InelasticInelastic => 2,
            ProcessMode::LeptonElasticProtonElastic => 0,
        };
        NUM_REQUIRED_DIMENSIONS + num_user_dimensions + extra
    }

    /// Populate `qt1, qt2, phi_qt1, phi_qt2` from hypercube axes 0..3
    pub fn fill_parton_content(&mut self, x: &[f64]) {
        self.qt1 = (LOG_QT_MIN + (LOG_QT_MAX - LOG_QT_MIN) * x[0]).exp();
        self.qt2 = (LOG_QT_MIN + (LOG_QT_MAX - LOG_QT_MIN) * x[1]).exp();
        self.phi_qt1 = 2. * std::f64::consts::PI * x[2];
        self.phi_qt2 = 2. * std::f64::consts::PI * x[3];
    }

    /// Resolve outgoing-remnant masses from the mode and the (optional)
    /// trailing hypercube axes
    pub fn fill_remnant_masses(
        &mut self,
        kin: &KinematicsConfiguration,
        x: &[f64],
        num_user_dimensions: usize,
    ) {
        let op_index = NUM_REQUIRED_DIMENSIONS + num_user_dimensions;
        let m1 = pdg::on_shell_mass(kin.beam1_pdg).unwrap_or(0.);
        let m2 = pdg::on_shell_mass(kin.beam2_pdg).unwrap_or(0.);
        let mx_min = kin.initial.remnant_mass.min();
        let mx_max = kin.initial.remnant_mass.max();
        match kin.mode {
            ProcessMode::ElasticElastic | ProcessMode::LeptonElasticProtonElastic => {
                self.mx = m1;
                self.my = m2;
            }
            ProcessMode::ElasticInelastic => {
                self.mx = m1;
                self.my = mx_min + (mx_max - mx_min) * x[op_index];
            }
            ProcessMode::InelasticElastic | ProcessMode::LeptonElasticProtonInelastic => {
                self.mx = mx_min + (mx_max - mx_min) * x[op_index];
                self.my = m2;
            }
            ProcessMode::InelasticInelastic => {
                self.mx = mx_min + (mx_max - mx_min) * x[op_index];
                self.my = mx_min + (mx_max - mx_min) * x[op_index + 1];
            }
        }
    }

    /// Evaluate both incoming-photon fluxes for the given `(x, k_T^2)` pairs
    pub fn fill_fluxes(
        &mut self,
        kin: &KinematicsConfiguration,
        x1: f64,
        q1t2: f64,
        x2: f64,
        q2t2: f64,
        pdf: Option<&dyn PartonDistributionFn>,
    ) {
        let mp1_2 = pdg::on_shell_mass(kin.beam1_pdg).unwrap_or(0.).powi(2);
        let mp2_2 = pdg::on_shell_mass(kin.beam2_pdg).unwrap_or(0.).powi(2);

        self.flux1 = if kin.mode.leg1_inelastic() {
            photon_flux::inelastic(x1, q1t2, self.mx * self.mx, mp1_2, kin.structure_functions, pdf)
        } else {
            photon_flux::elastic(x1, q1t2, mp1_2)
        };
        self.flux2 = if kin.mode.leg2_inelastic() {
            photon_flux::inelastic(x2, q2t2, self.my * self.my, mp2_2, kin.structure_functions, pdf)
        } else {
            photon_flux::elastic(x2, q2t2, mp2_2)
        };
    }

    /// The common part of the Jacobian: `d(qt1) d(qt2) d(phi1) d(phi2)`
    /// times the remnant-mass-window factors for whichever legs dissociate
    pub fn minimal_jacobian(&self, kin: &KinematicsConfiguration) -> f64 {
        let mut jac = (LOG_QT_MAX - LOG_QT_MIN) * self.qt1;
        jac *= (LOG_QT_MAX - LOG_QT_MIN) * self.qt2;
        jac *= 2. * std::f64::consts::PI;
        jac *= 2. * std::f64::consts::PI;

        let mx_range = kin.initial.remnant_mass.max() - kin.initial.remnant_mass.min();
        if kin.mode.leg1_inelastic() {
            jac *= mx_range * 2. * self.mx;
        }
        if kin.mode.leg2_inelastic() {
            jac *= mx_range * 2. * self.my;
        }
        jac
    }
}
