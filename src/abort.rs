//! Cooperative cancellation
//!
//! Both the integrator's per-sample loop and the generator's acceptance
//! loop poll a shared flag every iteration rather than spawning anything
//! that cannot be interrupted between samples.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cooperative abort signal, cheaply cloned and shared across threads
#[derive(Clone, Debug, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    /// A flag that starts unset
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request an abort; observable by every clone of this flag
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Has an abort been requested?
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_observes_set() {
        let flag = AbortFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_set());
        flag.set();
        assert!(clone.is_set());
    }
}
