//! `cepgen` is a Monte Carlo event generator for central exclusive
//! two-photon processes in hadron-hadron, lepton-hadron and lepton-lepton
//! collisions (γγ → ℓ⁺ℓ⁻, γγ → W⁺W⁻).
//!
//! # How to use
//!
//! Build a [`kinematics::KinematicsConfiguration`], install it on a
//! [`process::Process`] (e.g. [`process::GamGamLL`] or
//! [`process::PPtoLL`]), hand both to a [`generator::Generator`] together
//! with an [`integrator::Integrator`], run [`generator::Generator::integrate`]
//! once to tune the grid, then [`generator::Generator::generate`] as many
//! times as needed.
//!
//! ## Most relevant modules
//!
//! - [prelude] exports the most commonly needed types
//! - [generator] contains the main driver and lists the steps performed
//! - [process] for the concrete 2→3/2→4 phase-space mappings
//! - [integrator] for the VEGAS/MISER cross-section estimators
//! - [physics] for four-vectors, particles and events
//! - [form_factors] and [photon_flux] for the proton-structure layer

/// Cooperative cancellation for long-running integration/generation passes
pub mod abort;
/// Fatal, structured errors
pub mod error;
/// Electromagnetic form factors and structure functions
pub mod form_factors;
/// Monte Carlo event generator driver
pub mod generator;
/// Pluggable hadronisation interface
pub mod hadroniser;
/// Adaptive Monte-Carlo integration (VEGAS/MISER)
pub mod integrator;
/// Beam, cut and structure-function configuration
pub mod kinematics;
/// Equivalent-photon-approximation incoming fluxes
pub mod photon_flux;
/// Four-vectors, particles, events and the PDG table
pub mod physics;
/// Most important exports
pub mod prelude;
/// Progress bar
pub mod progress_bar;
/// Process abstraction and concrete kT- and LPAIR-style kernels
pub mod process;
/// Named scalar taming functions
pub mod taming;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
