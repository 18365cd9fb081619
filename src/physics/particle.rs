//! Single-particle bookkeeping: role, status, charge and parent/child links
//!
//! Parent/child relations are stored as plain id sets rather than
//! pointers or indices into a shared arena, avoiding cyclic references:
//! [`super::event::Event`] is the only thing that resolves an id to a
//! live [`Particle`].

use std::collections::BTreeSet;

use particle_id::ParticleID;
use serde::{Deserialize, Serialize};

use super::four_vector::FourMomentum;
use super::pdg;

/// A particle's position in the process graph
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Role {
    /// First incoming beam particle
    IncomingBeam1,
    /// Second incoming beam particle
    IncomingBeam2,
    /// First outgoing (possibly dissociated) beam particle
    OutgoingBeam1,
    /// Second outgoing (possibly dissociated) beam particle
    OutgoingBeam2,
    /// Photon (or other parton) radiated off beam 1
    Parton1,
    /// Photon (or other parton) radiated off beam 2
    Parton2,
    /// A particle of the central (hard) system
    CentralSystem,
    /// An internal, non-final-state propagator
    Intermediate,
}

/// Lifecycle status of a particle within an event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Status {
    /// No status has been assigned yet
    #[default]
    Undefined,
    /// Incoming beam particle
    Incoming,
    /// Produced but not yet decayed/hadronised (e.g. a beam remnant)
    Undecayed,
    /// Stable, final-state particle
    FinalState,
    /// An intermediate resonance kept for bookkeeping
    Resonance,
    /// A resonance kept only for debugging output
    DebugResonance,
}

/// A single particle within an [`super::event::Event`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    id: usize,
    role: Role,
    pdg_id: ParticleID,
    status: Status,
    charge: i32,
    helicity: f64,
    momentum: FourMomentum,
    mass_override: Option<f64>,
    parents: BTreeSet<usize>,
    children: BTreeSet<usize>,
}

impl Particle {
    /// Construct a new particle, its on-shell mass is taken from the PDG table
    /// unless later overridden with [`Particle::set_mass`]
    pub fn new(id: usize, role: Role, pdg_id: ParticleID, momentum: FourMomentum) -> Self {
        Self {
            id,
            role,
            pdg_id,
            status: Status::Undefined,
            charge: default_charge(pdg_id),
            helicity: 0.,
            momentum,
            mass_override: None,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    /// Event-local id, unique within the owning [`super::event::Event`]
    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// Role within the process graph
    pub fn role(&self) -> Role {
        self.role
    }

    /// Set the role
    pub fn set_role(&mut self, role: Role) -> &mut Self {
        self.role = role;
        self
    }

    /// PDG id signed by the stored electric charge for charged leptons
    ///
    /// The species-level id (e.g. "a muon") is kept unsigned internally,
    /// the sign carried only by `charge`.
    pub fn pdg_id(&self) -> ParticleID {
        if is_charged_lepton(self.pdg_id) {
            pdg::signed_lepton_id(self.pdg_id, self.charge)
        } else {
            self.pdg_id
        }
    }

    /// The unsigned species id, ignoring the stored charge
    pub fn base_pdg_id(&self) -> ParticleID {
        self.pdg_id
    }

    /// Lifecycle status
    pub fn status(&self) -> Status {
        self.status
    }

    /// Set the lifecycle status
    pub fn set_status(&mut self, status: Status) -> &mut Self {
        self.status = status;
        self
    }

    /// Electric charge in units of `e`
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Set the electric charge
    pub fn set_charge(&mut self, charge: i32) -> &mut Self {
        self.charge = charge;
        self
    }

    /// Helicity
    pub fn helicity(&self) -> f64 {
        self.helicity
    }

    /// Set the helicity
    pub fn set_helicity(&mut self, helicity: f64) -> &mut Self {
        self.helicity = helicity;
        self
    }

    /// Four-momentum
    pub fn momentum(&self) -> FourMomentum {
        self.momentum
    }

    /// Set the four-momentum
    pub fn set_momentum(&mut self, momentum: FourMomentum) -> &mut Self {
        self.momentum = momentum;
        self
    }

    /// On-shell mass: the override if one was set, otherwise the PDG table value
    pub fn mass(&self) -> f64 {
        self.mass_override
            .or_else(|| pdg::on_shell_mass(self.pdg_id))
            .unwrap_or(0.)
    }

    /// Override the on-shell mass (e.g. for a dissociated-beam remnant)
    pub fn set_mass(&mut self, mass: f64) -> &mut Self {
        self.mass_override = Some(mass);
        self
    }

    /// Parent particle ids
    pub fn parents(&self) -> &BTreeSet<usize> {
        &self.parents
    }

    /// Child particle ids
    pub fn children(&self) -> &BTreeSet<usize> {
        &self.children
    }

    pub(crate) fn add_parent(&mut self, parent: usize) {
        self.parents.insert(parent);
    }

    pub(crate) fn add_child(&mut self, child: usize) {
        self.children.insert(child);
    }
}

fn is_charged_lepton(pid: ParticleID) -> bool {
    matches!(pid.id().abs(), 11 | 13 | 15)
}

fn default_charge(pid: ParticleID) -> i32 {
    match pid.id().abs() {
        11 | 13 | 15 => -1,
        24 => 1,
        2212 => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_pdg_id_follows_charge() {
        let mut p = Particle::new(
            0,
            Role::CentralSystem,
            pdg::MUON,
            FourMomentum::default(),
        );
        p.set_charge(-1);
        assert_eq!(p.pdg_id().id(), 13);
        p.set_charge(1);
        assert_eq!(p.pdg_id().id(), -13);
    }

    #[test]
    fn mass_override_takes_precedence() {
        let mut p = Particle::new(0, Role::OutgoingBeam1, pdg::PROTON, FourMomentum::default());
        assert!((p.mass() - 0.938_272_08).abs() < 1e-9);
        p.set_mass(1.5);
        assert!((p.mass() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn parent_child_bookkeeping_is_symmetric_via_event() {
        // Event::add_daughter enforces the invariant; here we only check
        // the low-level accessors used by it.
        let mut mother = Particle::new(0, Role::IncomingBeam1, pdg::PROTON, FourMomentum::default());
        let mut daughter = Particle::new(1, Role::OutgoingBeam1, pdg::PROTON, FourMomentum::default());
        mother.add_child(daughter.id());
        daughter.add_parent(mother.id());
        assert!(mother.children().contains(&1));
        assert!(daughter.parents().contains(&0));
    }
}
