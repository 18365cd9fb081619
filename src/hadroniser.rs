//! Hadronisation interface
//!
//! The core never fragments a proton remnant itself, that's Pythia6/8's
//! job, reached through this interface, but it does own the contract a
//! plugin satisfies: a narrow, fallible, in-place transform over a
//! single event.

use crate::error::{Error, ErrorKind};
use crate::physics::particle::{Role, Status};
use crate::physics::Event;

/// Dresses proton-remnant placeholders (`OutgoingBeam1`/`OutgoingBeam2`,
/// [`Status::Undecayed`]) into fully fragmented final-state particles
///
/// Implementations may append daughters via [`Event::add_daughter`]; the
/// core only requires that every remnant placeholder ends up consumed
/// (its status moved on from `Undecayed`) or explicitly left alone.
pub trait Hadroniser: Send + Sync {
    /// Fragment the remnants of a single event in place
    fn hadronise(&self, event: &mut Event) -> Result<(), Error>;
}

/// A hadroniser that performs no fragmentation
///
/// Promotes every `Undecayed` remnant straight to `FinalState`, treating
/// the dissociated system as a single pseudo-hadron. This is the default
/// used by `generator::Generator` when no external plugin is configured,
/// and the only hadroniser this repository can implement without an
/// external physics library.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHadroniser;

impl Hadroniser for NoOpHadroniser {
    fn hadronise(&self, event: &mut Event) -> Result<(), Error> {
        for role in [Role::OutgoingBeam1, Role::OutgoingBeam2] {
            let ids: Vec<usize> = event
                .by_role(role)
                .filter(|p| p.status() == Status::Undecayed)
                .map(|p| p.id())
                .collect();
            for id in ids {
                let particle = event.particle_mut(id).ok_or_else(|| {
                    Error::new(ErrorKind::HadroniserFailure, "remnant id vanished mid-hadronisation")
                })?;
                particle.set_status(Status::FinalState);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::four_vector::FourMomentum;
    use crate::physics::particle::Particle;
    use crate::physics::pdg;

    #[test]
    fn noop_hadroniser_promotes_remnants_to_final_state() {
        let mut event = Event::new();
        let mut remnant = Particle::new(0, Role::OutgoingBeam1, pdg::PROTON, FourMomentum::new(0., 0., 100., 101.));
        remnant.set_status(Status::Undecayed);
        event.add_particle(remnant);

        NoOpHadroniser.hadronise(&mut event).unwrap();

        let p = event.one(Role::OutgoingBeam1).unwrap();
        assert_eq!(p.status(), Status::FinalState);
    }
}
