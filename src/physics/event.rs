//! Scattering event: an append-only particle table with auxiliary indices
//!
//! Particles are looked up by role through a `HashMap<Role, Vec<usize>>`
//! index rather than a genuine multimap type, since the key domain
//! (eight roles) is small and fixed, so a hash index beats a sorted-vec
//! binary search for the `one`/`by_role`-style lookups the rest of the
//! crate needs.

use std::collections::HashMap;

use log::warn;

use super::particle::{Particle, Role, Status};

/// Scalar timing metadata attached to a generated event
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventMetadata {
    /// Wall-clock time spent generating this one event, in seconds
    pub generation_time: f64,
    /// Cumulative wall-clock time spent in the run up to and including this event
    pub total_time: f64,
}

/// A Monte Carlo event: an ordered, role-indexed set of particles
#[derive(Debug, Clone, Default)]
pub struct Event {
    particles: Vec<Particle>,
    by_role: HashMap<Role, Vec<usize>>,
    primordial_len: usize,
    pub metadata: EventMetadata,
    /// The sign of the differential weight this event was sampled with
    ///
    /// `1.0`/`-1.0` for the unweighted events this generator produces,
    /// matching the sign of the raw `Process::compute_weight` output
    /// at the accepted point.
    pub weight: f64,
}

impl Event {
    /// Construct an empty event
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a particle, returning the id it was assigned
    ///
    /// Ids are assigned densely in insertion order, so the table stays
    /// contiguous even after a hadroniser appends fragmentation products.
    pub fn add_particle(&mut self, mut particle: Particle) -> usize {
        let id = self.particles.len();
        particle.set_id(id);
        self.by_role.entry(particle.role()).or_default().push(id);
        self.particles.push(particle);
        id
    }

    /// Record that `child` is a daughter of `parent`
    ///
    /// Keeps the mutual invariant: adding `child` as a daughter of
    /// `parent` also registers `parent` as a mother of `child`.
    pub fn add_daughter(&mut self, parent: usize, child: usize) {
        assert!(parent != child, "a particle cannot be its own parent");
        assert!(parent < self.particles.len() && child < self.particles.len());
        self.particles[parent].add_child(child);
        self.particles[child].add_parent(parent);
    }

    /// Look up a particle by id
    pub fn particle(&self, id: usize) -> Option<&Particle> {
        self.particles.get(id)
    }

    /// Mutably look up a particle by id
    pub fn particle_mut(&mut self, id: usize) -> Option<&mut Particle> {
        self.particles.get_mut(id)
    }

    /// All particles, in id (insertion) order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// All particles with the given role, in id order
    pub fn by_role(&self, role: Role) -> impl Iterator<Item = &Particle> {
        let ids = self.by_role.get(&role).map(Vec::as_slice).unwrap_or(&[]);
        ids.iter().map(move |&id| &self.particles[id])
    }

    /// The single particle with the given role
    ///
    /// Logs a warning (rather than failing) if the role is ambiguous.
    /// Returns `None` if no particle carries the role.
    pub fn one(&self, role: Role) -> Option<&Particle> {
        let ids = self.by_role.get(&role).map(Vec::as_slice).unwrap_or(&[]);
        if ids.len() > 1 {
            warn!(
                "role {:?} is ambiguous: {} particles carry it, returning the first",
                role,
                ids.len()
            );
        }
        ids.first().map(|&id| &self.particles[id])
    }

    /// All particles in `FinalState` status
    pub fn final_state(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.status() == Status::FinalState)
    }

    /// Sum of the four-momenta of all incoming particles
    pub fn incoming_momentum_sum(&self) -> super::four_vector::FourMomentum {
        self.by_role(Role::IncomingBeam1)
            .chain(self.by_role(Role::IncomingBeam2))
            .fold(super::four_vector::FourMomentum::default(), |acc, p| {
                acc + p.momentum()
            })
    }

    /// Sum of the four-momenta of all final-state particles
    pub fn outgoing_momentum_sum(&self) -> super::four_vector::FourMomentum {
        self.final_state()
            .fold(super::four_vector::FourMomentum::default(), |acc, p| {
                acc + p.momentum()
            })
    }

    /// Mark the current table length as "primordial": a later call to
    /// [`Event::restore_primordial`] truncates back to this point.
    ///
    /// Used by the generation loop to reuse one `Event` across many
    /// weight evaluations without reallocating.
    pub fn mark_primordial(&mut self) {
        self.primordial_len = self.particles.len();
    }

    /// Truncate the event back to its primordial state
    ///
    /// Drops every particle added after the last [`Event::mark_primordial`]
    /// call and rebuilds the role index accordingly.
    pub fn restore_primordial(&mut self) {
        if self.particles.len() == self.primordial_len {
            return;
        }
        self.particles.truncate(self.primordial_len);
        for ids in self.by_role.values_mut() {
            ids.retain(|&id| id < self.primordial_len);
        }
    }

    /// Number of particles currently in the event
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the event holds no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::four_vector::FourMomentum;
    use crate::physics::pdg;
    use noisy_float::prelude::Float;

    fn muon(role: Role) -> Particle {
        Particle::new(0, role, pdg::MUON, FourMomentum::new(0., 0., 10., 10.1))
    }

    #[test]
    fn role_lookup_and_ambiguity() {
        let mut ev = Event::new();
        ev.add_particle(muon(Role::CentralSystem));
        ev.add_particle(muon(Role::CentralSystem));
        assert_eq!(ev.by_role(Role::CentralSystem).count(), 2);
        assert!(ev.one(Role::CentralSystem).is_some());
        assert!(ev.one(Role::Parton1).is_none());
    }

    #[test]
    fn contiguous_ids_after_insertion() {
        let mut ev = Event::new();
        let id0 = ev.add_particle(muon(Role::Parton1));
        let id1 = ev.add_particle(muon(Role::Parton2));
        assert_eq!(id0, 0);
        assert_eq!(id1, 1);
        assert_eq!(ev.particle(1).unwrap().id(), 1);
    }

    #[test]
    fn parent_child_invariant() {
        let mut ev = Event::new();
        let parent = ev.add_particle(muon(Role::Intermediate));
        let child = ev.add_particle(muon(Role::CentralSystem));
        ev.add_daughter(parent, child);
        assert!(ev.particle(parent).unwrap().children().contains(&child));
        assert!(ev.particle(child).unwrap().parents().contains(&parent));
    }

    #[test]
    fn primordial_roundtrip() {
        let mut ev = Event::new();
        ev.add_particle(muon(Role::IncomingBeam1));
        ev.add_particle(muon(Role::IncomingBeam2));
        ev.mark_primordial();
        ev.add_particle(muon(Role::CentralSystem));
        ev.add_particle(muon(Role::CentralSystem));
        assert_eq!(ev.len(), 4);
        ev.restore_primordial();
        assert_eq!(ev.len(), 2);
        assert!(ev.by_role(Role::CentralSystem).next().is_none());
    }

    #[test]
    fn momentum_sum_conservation() {
        let mut ev = Event::new();
        let mut in1 = muon(Role::IncomingBeam1);
        in1.set_momentum(FourMomentum::new(0., 0., 100., 100.));
        let mut in2 = muon(Role::IncomingBeam2);
        in2.set_momentum(FourMomentum::new(0., 0., -100., 100.));
        ev.add_particle(in1);
        ev.add_particle(in2);
        let mut out1 = muon(Role::CentralSystem);
        out1.set_status(Status::FinalState);
        out1.set_momentum(FourMomentum::new(1., 1., 100., 100.1));
        let mut out2 = muon(Role::CentralSystem);
        out2.set_status(Status::FinalState);
        out2.set_momentum(FourMomentum::new(-1., -1., -100., 99.9));
        ev.add_particle(out1);
        ev.add_particle(out2);
        let total_in = ev.incoming_momentum_sum();
        let total_out = ev.outgoing_momentum_sum();
        assert!((total_in.e() - total_out.e()).abs() < 1e-9);
        assert!((total_in.pz() - total_out.pz()).abs() < 1e-9);
    }
}
