pub use crate::{
    abort::AbortFlag,
    error::{Error, ErrorKind},
    generator::{Generator, GeneratorBuilder, GeneratorError, RunSummary},
    hadroniser::{Hadroniser, NoOpHadroniser},
    integrator::{IntegrationResult, Integrator, MiserIntegrator, VegasIntegrator},
    kinematics::{KinematicsConfiguration, Limits, ProcessMode},
    physics::{Event, FourMomentum, Particle, Role, Status},
    process::{GamGamLL, PPtoLL, PPtoWW, Process},
};
