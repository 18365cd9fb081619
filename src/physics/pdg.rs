//! PDG particle identifiers and the on-shell mass table
//!
//! Masses are consulted by [`super::particle::Particle::mass`] whenever
//! an explicit override has not been set.

use lazy_static::lazy_static;
use particle_id::ParticleID;
use std::collections::HashMap;

/// Proton, PDG id 2212
pub const PROTON: ParticleID = ParticleID::new(2212);
/// Electron, PDG id 11
pub const ELECTRON: ParticleID = ParticleID::new(11);
/// Muon, PDG id 13
pub const MUON: ParticleID = ParticleID::new(13);
/// Tau, PDG id 15
pub const TAU: ParticleID = ParticleID::new(15);
/// Photon, PDG id 22
pub const PHOTON: ParticleID = ParticleID::new(22);
/// W boson, PDG id 24
pub const W_BOSON: ParticleID = ParticleID::new(24);

lazy_static! {
    /// On-shell masses in GeV, keyed by the unsigned PDG id
    static ref ON_SHELL_MASS: HashMap<i32, f64> = HashMap::from([
        (ELECTRON.id().abs(), 0.000_510_998_95),
        (MUON.id().abs(), 0.105_658_375_5),
        (TAU.id().abs(), 1.776_86),
        (PHOTON.id().abs(), 0.),
        (PROTON.id().abs(), 0.938_272_08),
        (W_BOSON.id().abs(), 80.379),
    ]);
}

/// Look up the on-shell mass (GeV) for a PDG id, `None` if not tabulated
pub fn on_shell_mass(pid: ParticleID) -> Option<f64> {
    ON_SHELL_MASS.get(&pid.id().abs()).copied()
}

/// Flip the sign of a charged-lepton PDG id according to an explicit electric charge
///
/// The absolute value of a charged lepton's PDG id is kept unsigned in
/// our internal tables, but the emitted PDG id must carry the physical
/// sign, which is `-charge` for leptons (PDG convention: the particle,
/// e.g. `e^-`, has id `+11`).
pub fn signed_lepton_id(base: ParticleID, charge: i32) -> ParticleID {
    let mag = base.id().abs();
    ParticleID::new(if charge > 0 { -mag } else { mag })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proton_mass() {
        assert!((on_shell_mass(PROTON).unwrap() - 0.938_272_08).abs() < 1e-9);
    }

    #[test]
    fn photon_is_massless() {
        assert_eq!(on_shell_mass(PHOTON), Some(0.));
    }

    #[test]
    fn lepton_sign_flip() {
        let mu_minus = signed_lepton_id(MUON, -1);
        let mu_plus = signed_lepton_id(MUON, 1);
        assert_eq!(mu_minus.id(), 13);
        assert_eq!(mu_plus.id(), -13);
    }
}
