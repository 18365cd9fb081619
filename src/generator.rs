//! Generator driver
//!
//! Owns the process, the integrator and the RNG, runs an integration
//! pass to tune the grid maximum, then an acceptance/rejection
//! generation pass that replays accepted points through the process to
//! populate events. The acceptance-rejection rule is a running-maximum
//! generalisation of a fixed-`min_wt` unweighting scheme: the threshold
//! is raised on the fly whenever a larger weight is actually observed,
//! since this driver discovers its maximum during the very sampling
//! pass it drives rather than from a prior run (see `DESIGN.md`).

use std::time::Instant;

use derive_builder::Builder;
use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use thiserror::Error;

use crate::abort::AbortFlag;
use crate::error::{Error as FatalError, ErrorKind};
use crate::hadroniser::{Hadroniser, NoOpHadroniser};
use crate::integrator::{IntegrationResult, Integrator};
use crate::kinematics::KinematicsConfiguration;
use crate::physics::Event;
use crate::process::Process;
use crate::progress_bar::ProgressBar;
use crate::taming::NamedTamingFunction;

/// Errors raised while driving a generation run
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("configuration or integration failure")]
    Setup(#[source] FatalError),
    #[error("hadronisation failed after {0} consecutive events")]
    HadroniserRetryBudgetExceeded(usize),
}

/// Summary statistics produced by one generation run
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub cross_section: IntegrationResult,
    pub num_events_requested: usize,
    pub num_events_accepted: usize,
    pub num_trials: u64,
    pub total_time: f64,
}

/// Owns process + integrator + RNG and drives the two-pass generation loop
#[derive(Builder)]
#[builder(build_fn(skip), pattern = "owned")]
pub struct Generator<P, I, H> {
    process: P,
    integrator: I,
    #[builder(default = "NoOpHadroniser")]
    hadroniser: H,
    #[builder(default)]
    taming: Vec<NamedTamingFunction>,
    #[builder(default = "0")]
    seed: u64,
    #[builder(default = "10")]
    max_hadroniser_retries: usize,
    #[builder(setter(skip))]
    rng: Xoshiro256Plus,
    #[builder(setter(skip))]
    grid_max: f64,
    #[builder(setter(skip))]
    cross_section: IntegrationResult,
}

impl<P, I> GeneratorBuilder<P, I, NoOpHadroniser>
where
    P: Process,
    I: Integrator,
{
    pub fn build(&mut self) -> Result<Generator<P, I, NoOpHadroniser>, String> {
        let process = self.process.take().ok_or("process is required")?;
        let integrator = self.integrator.take().ok_or("integrator is required")?;
        let seed = self.seed.unwrap_or(0);
        Ok(Generator {
            process,
            integrator,
            hadroniser: self.hadroniser.clone().unwrap_or(NoOpHadroniser),
            taming: self.taming.take().unwrap_or_default(),
            seed,
            max_hadroniser_retries: self.max_hadroniser_retries.unwrap_or(10),
            rng: Xoshiro256Plus::seed_from_u64(seed),
            grid_max: 0.,
            cross_section: IntegrationResult {
                value: 0.,
                error: 0.,
                num_evaluations: 0,
            },
        })
    }
}

impl<P, I, H> Generator<P, I, H>
where
    P: Process,
    I: Integrator,
    H: Hadroniser,
{
    /// Install the beam/cut/structure-function configuration on the process
    pub fn set_kinematics(&mut self, kinematics: KinematicsConfiguration) -> Result<(), GeneratorError> {
        self.process
            .set_kinematics(kinematics)
            .map_err(GeneratorError::Setup)
    }

    /// Integration phase: tune the grid and estimate the total cross section
    pub fn integrate(&mut self, abort: &AbortFlag) -> Result<IntegrationResult, GeneratorError> {
        let result = self
            .integrator
            .integrate(&mut self.process, abort)
            .map_err(GeneratorError::Setup)?;
        self.grid_max = estimate_grid_maximum(&result);
        self.cross_section = result;
        info!(
            "Integration complete: sigma = {:.4e} +- {:.4e}, working maximum {:.4e}",
            result.value, result.error, self.grid_max
        );
        Ok(result)
    }

    /// Generation phase: sample `num_events` unweighted events by
    /// acceptance/rejection against the running grid maximum
    pub fn generate(&mut self, num_events: usize, abort: &AbortFlag) -> Result<(Vec<Event>, RunSummary), GeneratorError> {
        if self.grid_max <= 0. {
            return Err(GeneratorError::Setup(FatalError::new(
                ErrorKind::IntegratorFailure,
                "generate() called before a successful integrate()",
            )));
        }

        let start = Instant::now();
        let mut events = Vec::with_capacity(num_events);
        let progress = ProgressBar::new(num_events as u64, "events generated:");
        let mut num_trials = 0u64;
        let ndim = self.process.num_dimensions();
        let mut point = vec![0.; ndim];

        while events.len() < num_events {
            if abort.is_set() {
                break;
            }
            for x in &mut point {
                *x = self.rng.gen::<f64>();
            }
            self.process.set_point(&point);
            self.process.before_compute_weight();
            let weight = self.process.compute_weight();
            num_trials += 1;

            if weight.abs() > self.grid_max {
                self.grid_max = weight.abs();
                warn!(
                    "Grid maximum exceeded at trial {num_trials}: raising to {:.4e}",
                    self.grid_max
                );
            }
            if self.rng.gen::<f64>() * self.grid_max > weight.abs() {
                continue;
            }

            let event_start = Instant::now();
            let mut event = Event::new();
            self.process.add_event_content(&mut event);
            event.mark_primordial();
            self.process.fill_kinematics(&mut event);

            let taming = crate::taming::combined_factor(&self.taming, &event);
            if taming < 1. && self.rng.gen::<f64>() > taming {
                continue;
            }

            event.weight = weight.signum();
            self.hadronise_with_retries(&mut event)?;
            event.metadata.generation_time = event_start.elapsed().as_secs_f64();
            event.metadata.total_time = start.elapsed().as_secs_f64();

            progress.inc(1);
            events.push(event);
        }
        progress.finish();

        let total_time = start.elapsed().as_secs_f64();
        info!(
            "Generated {} events from {} trials (efficiency {:.3}) in {:.2}s",
            events.len(),
            num_trials,
            events.len() as f64 / num_trials.max(1) as f64,
            total_time
        );

        let summary = RunSummary {
            cross_section: self.cross_section,
            num_events_requested: num_events,
            num_events_accepted: events.len(),
            num_trials,
            total_time,
        };
        Ok((events, summary))
    }

    fn hadronise_with_retries(&mut self, event: &mut Event) -> Result<(), GeneratorError> {
        for attempt in 0..self.max_hadroniser_retries {
            match self.hadroniser.hadronise(event) {
                Ok(()) => return Ok(()),
                Err(err) => warn!("hadronisation attempt {attempt} failed: {err}"),
            }
        }
        Err(GeneratorError::HadroniserRetryBudgetExceeded(self.max_hadroniser_retries))
    }
}

/// Derive a conservative starting grid maximum from the integration
/// result: the mean plus a multiple of its standard error, refined
/// upward during generation whenever a larger weight is actually seen
fn estimate_grid_maximum(result: &IntegrationResult) -> f64 {
    (result.value.abs() + 5. * result.error).max(f64::MIN_POSITIVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::VegasIntegrator;
    use crate::kinematics::KinematicsConfiguration;

    struct ConstantProcess;
    impl Process for ConstantProcess {
        fn add_event_content(&self, _event: &mut Event) {}
        fn num_dimensions(&self) -> usize {
            2
        }
        fn set_kinematics(&mut self, _kinematics: KinematicsConfiguration) -> crate::error::Result<()> {
            Ok(())
        }
        fn set_point(&mut self, _point: &[f64]) {}
        fn before_compute_weight(&mut self) {}
        fn compute_weight(&mut self) -> f64 {
            1.
        }
        fn fill_kinematics(&mut self, _event: &mut Event) {}
    }

    #[test]
    fn integrate_then_generate_round_trip() {
        let integrator = VegasIntegrator::builder()
            .num_iterations(2)
            .points_per_iteration(100)
            .build();
        let mut generator = GeneratorBuilder::default()
            .process(ConstantProcess)
            .integrator(integrator)
            .build()
            .unwrap();
        let abort = AbortFlag::new();
        let integration = generator.integrate(&abort).unwrap();
        let (events, summary) = generator.generate(5, &abort).unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(summary.num_events_accepted, 5);
        assert_eq!(summary.cross_section, integration);
    }
}
