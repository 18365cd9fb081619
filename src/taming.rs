//! Named scalar taming functions
//!
//! An optional, named multiplicative correction applied to the raw
//! process weight before it reaches the integrator or the acceptance
//! test, keyed by an event observable (e.g. damping very forward
//! remnants or very soft central-system transverse momenta). Shaped
//! after `form_factors::PartonDistributionFn`: a plain `Fn` trait
//! object, no state, registered by name rather than by type.

use crate::physics::particle::Role;
use crate::physics::Event;

/// A named observable-to-factor taming function
pub trait TamingFunction: Fn(&Event) -> f64 + Send + Sync {}
impl<F: Fn(&Event) -> f64 + Send + Sync> TamingFunction for F {}

/// A taming function together with the name it is registered under
pub struct NamedTamingFunction {
    pub name: &'static str,
    pub function: Box<dyn TamingFunction>,
}

impl NamedTamingFunction {
    pub fn new(name: &'static str, function: impl TamingFunction + 'static) -> Self {
        Self { name, function: Box::new(function) }
    }

    pub fn apply(&self, event: &Event) -> f64 {
        (self.function)(event)
    }
}

/// Smoothly suppresses events whose central-system transverse-momentum
/// sum exceeds `cutoff`, rather than hard-cutting them
///
/// `factor = (cutoff / pt)^4` for `pt > cutoff`, `1.0` otherwise, the
/// same quartic falloff a `PPtoWW` cut uses as a variance-reduction aid
/// when the raw cross section has a long tail.
pub fn central_system_pt_taming(cutoff: f64) -> impl TamingFunction {
    move |event: &Event| {
        let pt_sum = event
            .by_role(Role::CentralSystem)
            .fold((0., 0.), |(px, py), p| {
                let mom = p.momentum();
                (px + mom.px().raw(), py + mom.py().raw())
            });
        let pt = (pt_sum.0 * pt_sum.0 + pt_sum.1 * pt_sum.1).sqrt();
        if pt > cutoff && cutoff > 0. {
            (cutoff / pt).powi(4)
        } else {
            1.
        }
    }
}

/// Product of every registered taming factor, `1.0` if none are registered
pub fn combined_factor(taming: &[NamedTamingFunction], event: &Event) -> f64 {
    taming.iter().fold(1., |acc, t| acc * t.apply(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::four_vector::FourMomentum;
    use crate::physics::particle::Particle;
    use crate::physics::pdg;

    fn event_with_pt(pt: f64) -> Event {
        let mut ev = Event::new();
        ev.add_particle(Particle::new(
            0,
            Role::CentralSystem,
            pdg::MUON,
            FourMomentum::new(pt, 0., 0., pt),
        ));
        ev
    }

    #[test]
    fn taming_is_unity_below_cutoff() {
        let taming = central_system_pt_taming(100.);
        assert_eq!(taming(&event_with_pt(10.)), 1.);
    }

    #[test]
    fn taming_suppresses_above_cutoff() {
        let taming = central_system_pt_taming(10.);
        let factor = taming(&event_with_pt(100.));
        assert!(factor > 0. && factor < 1.);
    }
}
