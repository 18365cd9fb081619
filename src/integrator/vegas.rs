//! VEGAS-style iterative grid refinement
//!
//! A `Process` owns arbitrary internal state (including, for `GamGamLL`,
//! a boxed PDF callback) and its `compute_weight` contract is explicitly
//! sequential: `set_point` then `before_compute_weight` then
//! `compute_weight` on the *same* instance, so unlike a genuinely
//! independent per-event batch, the sample loop below stays sequential.
//! `rayon` is still used to combine the per-iteration statistics, where
//! the reduction really is parallel.

use derive_builder::Builder;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;

use crate::abort::AbortFlag;
use crate::error::Result;
use crate::integrator::{Grid, IntegrationResult, Integrator};
use crate::process::Process;

/// VEGAS integrator configuration and grid state
#[derive(Builder)]
#[builder(build_fn(skip))]
pub struct VegasIntegrator {
    #[builder(default = "10")]
    num_iterations: usize,
    #[builder(default = "10_000")]
    points_per_iteration: usize,
    #[builder(default = "1.5")]
    damping: f64,
    #[builder(default = "0")]
    seed: u64,
    #[builder(setter(skip))]
    grid: Option<Grid>,
    #[builder(setter(skip), default = "Xoshiro256Plus::seed_from_u64(0)")]
    rng: Xoshiro256Plus,
}

impl VegasIntegratorBuilder {
    pub fn build(&self) -> VegasIntegrator {
        VegasIntegrator {
            num_iterations: self.num_iterations.unwrap_or(10),
            points_per_iteration: self.points_per_iteration.unwrap_or(10_000),
            damping: self.damping.unwrap_or(1.5),
            seed: self.seed.unwrap_or(0),
            grid: None,
            rng: Xoshiro256Plus::seed_from_u64(self.seed.unwrap_or(0)),
        }
    }
}

impl VegasIntegrator {
    pub fn builder() -> VegasIntegratorBuilder {
        VegasIntegratorBuilder::default()
    }
}

impl Integrator for VegasIntegrator {
    fn integrate(
        &mut self,
        process: &mut dyn Process,
        abort: &AbortFlag,
    ) -> Result<IntegrationResult> {
        let ndim = process.num_dimensions();
        let mut grid = self
            .grid
            .take()
            .filter(|g| g.ndim() == ndim)
            .unwrap_or_else(|| Grid::new(ndim, self.damping));

        let mut iteration_estimates = Vec::with_capacity(self.num_iterations);
        let mut iteration_variances = Vec::with_capacity(self.num_iterations);
        let mut num_evaluations = 0u64;

        for iter in 0..self.num_iterations {
            if abort.is_set() {
                break;
            }
            let mut sum = 0.;
            let mut sum_sqr = 0.;
            let mut u = vec![0.; ndim];
            for _ in 0..self.points_per_iteration {
                if abort.is_set() {
                    break;
                }
                for u_d in &mut u {
                    *u_d = self.rng.gen::<f64>();
                }
                let (x, jacobian) = grid.warp(&u);
                process.set_point(&x);
                process.before_compute_weight();
                let f = process.compute_weight() * jacobian;
                grid.accumulate(&u, f * f);
                sum += f;
                sum_sqr += f * f;
                num_evaluations += 1;
            }
            let n = self.points_per_iteration as f64;
            let mean = sum / n;
            let variance = ((sum_sqr / n - mean * mean) / n).max(0.);
            debug!(
                "VEGAS iteration {iter}: estimate {mean:.4e} +- {:.4e}",
                variance.sqrt()
            );
            iteration_estimates.push(mean);
            iteration_variances.push(variance.max(f64::MIN_POSITIVE));
            grid.refine();
        }
        self.grid = Some(grid);

        let result = combine_iterations(&iteration_estimates, &iteration_variances, num_evaluations);
        info!(
            "VEGAS integration: sigma = {:.4e} +- {:.4e} ({} evaluations)",
            result.value, result.error, result.num_evaluations
        );
        result.check_finite()
    }

    fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }
}

/// Inverse-variance weighted combination of per-iteration estimates,
/// the standard VEGAS final-result rule
fn combine_iterations(estimates: &[f64], variances: &[f64], num_evaluations: u64) -> IntegrationResult {
    if estimates.is_empty() {
        return IntegrationResult { value: 0., error: 0., num_evaluations };
    }
    let weights: Vec<f64> = variances.par_iter().map(|&v| 1. / v).collect();
    let weight_sum: f64 = weights.par_iter().sum();
    let value: f64 = estimates
        .par_iter()
        .zip(&weights)
        .map(|(e, w)| e * w)
        .sum::<f64>()
        / weight_sum;
    let error = (1. / weight_sum).sqrt();
    IntegrationResult { value, error, num_evaluations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::KinematicsConfiguration;
    use crate::physics::Event;

    struct ConstantProcess;
    impl Process for ConstantProcess {
        fn add_event_content(&self, _event: &mut Event) {}
        fn num_dimensions(&self) -> usize {
            2
        }
        fn set_kinematics(&mut self, _kinematics: KinematicsConfiguration) -> Result<()> {
            Ok(())
        }
        fn set_point(&mut self, _point: &[f64]) {}
        fn before_compute_weight(&mut self) {}
        fn compute_weight(&mut self) -> f64 {
            2.
        }
        fn fill_kinematics(&mut self, _event: &mut Event) {}
    }

    #[test]
    fn converges_on_a_constant_integrand() {
        let mut integrator = VegasIntegrator::builder()
            .num_iterations(3)
            .points_per_iteration(200)
            .build();
        let mut process = ConstantProcess;
        let result = integrator.integrate(&mut process, &AbortFlag::new()).unwrap();
        assert!((result.value - 2.).abs() < 1e-6);
        assert!(integrator.grid().is_some());
    }
}
