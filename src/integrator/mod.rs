//! Adaptive Monte-Carlo integration over the process hypercube
//!
//! VEGAS-style iterative grid refinement is the primary algorithm,
//! MISER recursive stratified sampling a fallback for integrands the
//! grid struggles with. Both share the same entry point so
//! `generator::Generator` can be generic over either.

pub mod grid;
pub mod miser;
pub mod vegas;

pub use grid::Grid;
pub use miser::MiserIntegrator;
pub use vegas::VegasIntegrator;

use crate::abort::AbortFlag;
use crate::error::{Error, ErrorKind, Result};
use crate::process::Process;

/// Outcome of an integration run: the cross section estimate and its
/// standard error, in the same units `Process::compute_weight` returns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationResult {
    pub value: f64,
    pub error: f64,
    pub num_evaluations: u64,
}

impl IntegrationResult {
    fn check_finite(self) -> Result<Self> {
        if !self.value.is_finite() || !self.error.is_finite() {
            return Err(Error::new(
                ErrorKind::IntegratorFailure,
                format!(
                    "non-finite estimate after {} evaluations (value={}, error={})",
                    self.num_evaluations, self.value, self.error
                ),
            ));
        }
        Ok(self)
    }
}

/// A Monte-Carlo integration algorithm over `[0,1]^N`
pub trait Integrator {
    /// Integrate `process`'s weight function, polling `abort` between batches
    fn integrate(
        &mut self,
        process: &mut dyn Process,
        abort: &AbortFlag,
    ) -> Result<IntegrationResult>;

    /// The adaptive grid backing this run, if the algorithm keeps one
    ///
    /// `generator::Generator` uses this to drive the acceptance/rejection
    /// sampling of the generation phase; algorithms without a persistent
    /// grid (MISER) return `None` and the generator falls back to flat
    /// sampling.
    fn grid(&self) -> Option<&Grid>;
}
