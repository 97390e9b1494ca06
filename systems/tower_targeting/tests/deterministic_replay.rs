use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use crystal_defence_core::{Command, Element, EnemyKind, Event, TowerId};
use crystal_defence_system_tower_targeting::TowerTargeting;
use crystal_defence_world::{self as world, query, World, WorldConfig};
use glam::Vec2;

#[test]
fn deterministic_replay_assigns_identical_targets() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());

    let targets: Vec<_> = first
        .events
        .iter()
        .filter(|event| event.starts_with("TargetChanged"))
        .collect();
    assert!(!targets.is_empty(), "tower never acquired a target");
    assert!(
        targets[0].contains("EnemyId(0)"),
        "first assignment should pick the leading enemy: {}",
        targets[0]
    );
}

#[test]
fn targets_clear_once_the_enemy_leaves_range() {
    let outcome = replay(scripted_commands());
    let last_assignment = outcome
        .events
        .iter()
        .rev()
        .find(|event| event.starts_with("TargetChanged"))
        .expect("assignments recorded");
    assert!(
        last_assignment.contains("target: None"),
        "stale target was not cleared: {last_assignment}"
    );
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<String>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.events.hash(&mut hasher);
        hasher.finish()
    }
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let config = WorldConfig {
        weather_enabled: false,
        ..WorldConfig::default()
    };
    let mut world = World::new(
        config,
        vec![Vec2::new(0.0, 300.0), Vec2::new(800.0, 300.0)],
    );
    let mut targeting = TowerTargeting::new();
    let mut events = Vec::new();

    for command in commands {
        let mut generated = Vec::new();
        world::apply(&mut world, command, &mut generated);
        record(&mut events, &generated);

        let mut assignments = Vec::new();
        targeting.handle(
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut assignments,
        );
        for assignment in assignments {
            let mut generated = Vec::new();
            world::apply(&mut world, assignment, &mut generated);
            record(&mut events, &generated);
        }
    }

    ReplayOutcome { events }
}

fn record(events: &mut Vec<String>, generated: &[Event]) {
    events.extend(generated.iter().map(|event| format!("{event:?}")));
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::PlaceTower {
            element: Element::Earth,
            position: Vec2::new(120.0, 360.0),
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Tank,
            wave: 1,
        },
        Command::Tick {
            dt: Duration::from_millis(500),
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Normal,
            wave: 1,
        },
        Command::SetTargetingMode {
            tower: TowerId::new(0),
            mode: None,
        },
    ];
    commands.extend((0..240).map(|_| Command::Tick {
        dt: Duration::from_millis(50),
    }));
    commands
}
