//! MISER recursive stratified sampling
//!
//! A fallback for integrands VEGAS's per-dimension grid handles poorly
//! (strong correlations between axes), following the standard recursive
//! bisection scheme (Press & Farrar 1990 / `gsl_monte_miser`): split the
//! current sub-volume along the axis that most reduces the combined
//! variance estimate, explore each half with a small pilot sample, then
//! recurse.

use log::info;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

use crate::abort::AbortFlag;
use crate::error::Result;
use crate::integrator::{Grid, IntegrationResult, Integrator};
use crate::process::Process;

/// MISER integrator configuration
///
/// Has no persistent [`Grid`]: [`Integrator::grid`] always returns `None`,
/// so a generator wired to `MiserIntegrator` falls back to flat sampling
/// in its generation phase.
pub struct MiserIntegrator {
    min_points_to_bisect: usize,
    pilot_fraction: f64,
    max_depth: usize,
    total_points: usize,
    rng: Xoshiro256Plus,
}

impl Default for MiserIntegrator {
    fn default() -> Self {
        Self {
            min_points_to_bisect: 64,
            pilot_fraction: 0.1,
            max_depth: 20,
            total_points: 20_000,
            rng: Xoshiro256Plus::seed_from_u64(0),
        }
    }
}

impl MiserIntegrator {
    pub fn new(total_points: usize, seed: u64) -> Self {
        Self {
            total_points,
            rng: Xoshiro256Plus::seed_from_u64(seed),
            ..Default::default()
        }
    }

    fn sample_flat(
        &mut self,
        process: &mut dyn Process,
        lo: &[f64],
        hi: &[f64],
        npoints: usize,
        evaluations: &mut u64,
    ) -> (f64, f64) {
        let ndim = lo.len();
        let mut u = vec![0.; ndim];
        let mut sum = 0.;
        let mut sum_sqr = 0.;
        for _ in 0..npoints {
            for d in 0..ndim {
                u[d] = lo[d] + self.rng.gen::<f64>() * (hi[d] - lo[d]);
            }
            process.set_point(&u);
            process.before_compute_weight();
            let f = process.compute_weight();
            sum += f;
            sum_sqr += f * f;
            *evaluations += 1;
        }
        let n = npoints as f64;
        let mean = sum / n;
        let variance = ((sum_sqr / n - mean * mean) / n).max(0.);
        (mean, variance)
    }

    #[allow(clippy::too_many_arguments)]
    fn recurse(
        &mut self,
        process: &mut dyn Process,
        lo: &[f64],
        hi: &[f64],
        npoints: usize,
        depth: usize,
        abort: &AbortFlag,
        evaluations: &mut u64,
    ) -> (f64, f64) {
        let volume: f64 = lo.iter().zip(hi).map(|(l, h)| h - l).product();
        if abort.is_set() || npoints < self.min_points_to_bisect || depth >= self.max_depth {
            let (mean, variance) = self.sample_flat(process, lo, hi, npoints.max(2), evaluations);
            return (mean * volume, variance * volume * volume);
        }

        let ndim = lo.len();
        let pilot_n = ((npoints as f64 * self.pilot_fraction) as usize / (2 * ndim)).max(2);

        let mut best_dim = 0;
        let mut best_variance = f64::INFINITY;
        let mut best_split = (0., 0.);
        for dim in 0..ndim {
            let mid = 0.5 * (lo[dim] + hi[dim]);
            let mut hi_lo = hi.to_vec();
            hi_lo[dim] = mid;
            let mut lo_hi = lo.to_vec();
            lo_hi[dim] = mid;

            let (_m1, v1) = self.sample_flat(process, lo, &hi_lo, pilot_n, evaluations);
            let (_m2, v2) = self.sample_flat(process, &lo_hi, hi, pilot_n, evaluations);
            let combined = v1.sqrt() + v2.sqrt();
            if combined < best_variance {
                best_variance = combined;
                best_dim = dim;
                best_split = (v1, v2);
            }
        }

        let mid = 0.5 * (lo[best_dim] + hi[best_dim]);
        let mut hi_lo = hi.to_vec();
        hi_lo[best_dim] = mid;
        let mut lo_hi = lo.to_vec();
        lo_hi[best_dim] = mid;

        let remaining = npoints.saturating_sub(2 * pilot_n * ndim);
        let (v1, v2) = best_split;
        let frac1 = if v1 + v2 > 0. { v1.sqrt() / (v1.sqrt() + v2.sqrt()) } else { 0.5 };
        let n1 = ((remaining as f64 * frac1) as usize).max(1);
        let n2 = remaining.saturating_sub(n1).max(1);

        let (sum1, var1) = self.recurse(process, lo, &hi_lo, n1, depth + 1, abort, evaluations);
        let (sum2, var2) = self.recurse(process, &lo_hi, hi, n2, depth + 1, abort, evaluations);
        (sum1 + sum2, var1 + var2)
    }
}

impl Integrator for MiserIntegrator {
    fn integrate(
        &mut self,
        process: &mut dyn Process,
        abort: &AbortFlag,
    ) -> Result<IntegrationResult> {
        let ndim = process.num_dimensions();
        let lo = vec![0.; ndim];
        let hi = vec![1.; ndim];
        let mut evaluations = 0u64;
        let (value, variance) =
            self.recurse(process, &lo, &hi, self.total_points, 0, abort, &mut evaluations);
        let result = IntegrationResult {
            value,
            error: variance.sqrt(),
            num_evaluations: evaluations,
        };
        info!(
            "MISER integration: sigma = {:.4e} +- {:.4e} ({} evaluations)",
            result.value, result.error, result.num_evaluations
        );
        result.check_finite()
    }

    fn grid(&self) -> Option<&Grid> {
        None
    }
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
            3.
        }
        fn fill_kinematics(&mut self, _event: &mut Event) {}
    }

    #[test]
    fn converges_on_a_constant_integrand() {
        let mut integrator = MiserIntegrator::new(4000, 42);
        let mut process = ConstantProcess;
        let result = integrator.integrate(&mut process, &AbortFlag::new()).unwrap();
        assert!((result.value - 3.).abs() < 1e-6);
        assert!(integrator.grid().is_none());
    }
}
