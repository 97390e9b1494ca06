use std::time::Duration;

use crystal_defence_core::{
    Element, EnemyKind, Event, PlacementError, StatusKind, UpgradeError, UpgradeTrack,
};
use crystal_defence_simulation::{Simulation, SimulationConfig};
use glam::Vec2;

const STEP: Duration = Duration::from_millis(50);

fn calm_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        seed,
        weather_enabled: false,
        ..SimulationConfig::default()
    }
}

/// First legal spot beside the opening leg of the path.
fn spot_near_entrance(simulation: &Simulation, element: Element) -> Vec2 {
    let entrance = simulation.path()[0];
    [60.0, -60.0, 80.0, -80.0]
        .into_iter()
        .flat_map(|dy| [30.0, 50.0, 70.0].map(|x| Vec2::new(x, entrance.y + dy)))
        .find(|spot| simulation.placement_check(element, *spot).is_ok())
        .expect("a legal spot beside the entrance")
}

#[test]
fn fire_tower_damages_and_burns_the_first_wave() {
    let mut simulation = Simulation::new(calm_config(11));
    let spot = spot_near_entrance(&simulation, Element::Fire);
    let tower = simulation
        .create_tower(Element::Fire, spot)
        .expect("tower placed");
    assert_eq!(simulation.economy().money, 100);

    assert!(simulation.start_wave());
    assert!(!simulation.start_wave(), "a wave is already running");

    let mut events = Vec::new();
    for _ in 0..600 {
        simulation.advance(STEP);
        events.extend(simulation.drain_events());
    }

    let first_hit = events
        .iter()
        .find_map(|event| match event {
            Event::EnemyDamaged { amount, source, .. } => Some((*amount, *source)),
            _ => None,
        })
        .expect("the tower hit something");
    assert!((first_hit.0 - 20.0).abs() < 1e-4, "{first_hit:?}");
    assert_eq!(first_hit.1, Some(tower));

    let burns: Vec<f32> = events
        .iter()
        .filter_map(|event| match event {
            Event::StatusApplied {
                status: StatusKind::Burn,
                duration,
                ..
            } => Some(*duration),
            _ => None,
        })
        .collect();
    assert!(!burns.is_empty(), "no shot ignited its target");
    assert!(burns.iter().all(|duration| (*duration - 3.0).abs() < 1e-6));
}

#[test]
fn first_wave_runs_to_completion() {
    let mut simulation = Simulation::new(calm_config(3));
    assert_eq!(simulation.wave_progress(), 0.0);
    assert!(simulation.start_wave());

    let mut spawned = 0;
    let mut completed = None;
    for _ in 0..2400 {
        simulation.advance(STEP);
        for event in simulation.drain_events() {
            match event {
                Event::EnemySpawned { kind, .. } => {
                    assert_eq!(kind, EnemyKind::Normal);
                    spawned += 1;
                }
                Event::WaveCompleted { wave, bonus } => completed = Some((wave, bonus)),
                _ => {}
            }
        }
        if completed.is_some() {
            break;
        }
    }

    assert_eq!(spawned, 8);
    assert_eq!(completed, Some((1, 20)));
    assert_eq!(simulation.wave_progress(), 0.0);
    assert!(!simulation.wave_active());
    let economy = simulation.economy();
    assert_eq!(economy.lives, 2, "every unopposed enemy escaped");
    assert_eq!(economy.money, 170);
    assert!(simulation.start_wave(), "the next wave can start");
    assert_eq!(simulation.wave(), 2);
}

#[test]
fn requests_report_synchronous_results() {
    let mut simulation = Simulation::new(calm_config(5));
    let entrance = simulation.path()[0];

    assert_eq!(
        simulation.create_tower(Element::Fire, entrance),
        Err(PlacementError::TooCloseToPath)
    );
    assert_eq!(
        simulation.create_tower(Element::Fire, Vec2::new(-10.0, 10.0)),
        Err(PlacementError::OutOfBounds)
    );

    let spot = spot_near_entrance(&simulation, Element::Water);
    let tower = simulation
        .create_tower(Element::Water, spot)
        .expect("tower placed");
    assert_eq!(simulation.economy().money, 110);

    assert_eq!(simulation.upgrade_tower(tower, UpgradeTrack::Damage), Ok(()));
    assert_eq!(simulation.upgrade_tower(tower, UpgradeTrack::Damage), Ok(()));
    assert_eq!(simulation.economy().money, 30);
    assert_eq!(
        simulation.upgrade_tower(tower, UpgradeTrack::Damage),
        Err(UpgradeError::InsufficientFunds {
            required: 80,
            available: 30,
        })
    );
    assert!(simulation.evolve_tower(tower, 0).is_err());
    assert!(simulation.set_targeting_mode(tower, None));

    assert_eq!(simulation.sell_tower(tower), Some(84));
    assert_eq!(simulation.sell_tower(tower), None);
    assert_eq!(simulation.economy().money, 114);
    assert!(!simulation.set_targeting_mode(tower, None));
}

#[test]
fn reset_restores_the_starting_state() {
    let mut simulation = Simulation::new(calm_config(9));
    let spot = spot_near_entrance(&simulation, Element::Earth);
    let _ = simulation.create_tower(Element::Earth, spot);
    assert!(simulation.start_wave());
    simulation.advance(STEP);

    let path = simulation.path().to_vec();
    simulation.reset();

    assert_eq!(simulation.economy().money, 150);
    assert_eq!(simulation.wave(), 0);
    assert!(simulation.towers().into_vec().is_empty());
    assert!(simulation.enemies().is_empty());
    assert_eq!(simulation.path(), path.as_slice());
}
