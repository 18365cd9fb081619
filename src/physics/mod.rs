//! Kinematics primitives: four-momenta, particles and events
//!
//! A mutable, role-indexed event graph that the generator builds
//! incrementally while evaluating a process weight, rather than a
//! read-mostly event record assembled once from file input.

/// Four-momentum algebra
pub mod four_vector;
/// Single-particle bookkeeping
pub mod particle;
/// PDG ids and the on-shell mass table
pub mod pdg;
/// Event container
pub mod event;

pub use event::{Event, EventMetadata};
pub use four_vector::FourMomentum;
pub use particle::{Particle, Role, Status};
