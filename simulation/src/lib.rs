#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestrator that owns the Crystal Defence world and its systems.
//!
//! [`Simulation`] is the surface presentation layers talk to: it advances
//! time through the world and the pure systems in a fixed order, exposes
//! read-only views, and turns player requests into world commands with
//! synchronous results.

mod config;
mod snapshot;

use std::time::Duration;

use crystal_defence_core::{
    Command, Element, EnemyView, EvolutionError, Event, Path, PlacementError,
    ProjectileSnapshot, SynergySnapshot, TargetingRule, TowerId, TowerView, UpgradeError,
    UpgradeTrack, Weather,
};
use crystal_defence_system_path_generation::generate_path;
use crystal_defence_system_spawning::{Config as SpawningConfig, Spawning};
use crystal_defence_system_tower_combat::TowerCombat;
use crystal_defence_system_tower_targeting::TowerTargeting;
use crystal_defence_system_wave_generation::WaveGeneration;
use crystal_defence_world::{self as world, query, Economy, TowerRecord, World};
use glam::Vec2;
use tracing::{info, warn};

pub use config::{ConfigError, SimulationConfig};
pub use snapshot::{CameraState, SavedTower, SimulationSnapshot, SnapshotError};

/// Owns the authoritative world together with every system that drives it.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    path_seed: u64,
    path: Path,
    world: World,
    waves: WaveGeneration,
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    camera: CameraState,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a fresh simulation on the path derived from the configuration.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let path_seed = config.path_seed();
        let path = generate_path(path_seed);
        let world = World::new(
            config.world_config(),
            path.denormalize(config.width, config.height),
        );
        Self {
            config,
            path_seed,
            path,
            world,
            waves: WaveGeneration::new(config.seed),
            spawning: Spawning::new(SpawningConfig::new(config.seed)),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            camera: CameraState::default(),
            events: Vec::new(),
        }
    }

    /// Advances the simulation by `dt`.
    ///
    /// The world ticks first, then spawning reacts to the elapsed time,
    /// targeting reads the fresh views, and combat fires ready towers.
    pub fn advance(&mut self, dt: Duration) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.events.extend(events.iter().cloned());
        self.run_spawning(events);

        let mut commands = Vec::new();
        self.targeting.handle(
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.execute_all(commands);

        let mut commands = Vec::new();
        self.combat.handle(
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.execute_all(commands);
    }

    /// Places a tower and pays for it.
    pub fn create_tower(
        &mut self,
        element: Element,
        position: Vec2,
    ) -> Result<TowerId, PlacementError> {
        let events = self.execute(Command::PlaceTower { element, position });
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::OutOfBounds))
    }

    /// Sells a tower, returning the refund, or `None` when it does not exist.
    pub fn sell_tower(&mut self, tower: TowerId) -> Option<u32> {
        let events = self.execute(Command::SellTower { tower });
        events.iter().find_map(|event| match event {
            Event::TowerSold { refund, .. } => Some(*refund),
            _ => None,
        })
    }

    /// Buys the next level on an upgrade track.
    pub fn upgrade_tower(
        &mut self,
        tower: TowerId,
        track: UpgradeTrack,
    ) -> Result<(), UpgradeError> {
        let events = self.execute(Command::UpgradeTower { tower, track });
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerUpgraded { .. } => Some(Ok(())),
                Event::UpgradeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(UpgradeError::MissingTower))
    }

    /// Evolves a tower into the form at `option` of its element's list.
    pub fn evolve_tower(&mut self, tower: TowerId, option: u32) -> Result<(), EvolutionError> {
        let events = self.execute(Command::EvolveTower { tower, option });
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerEvolved { .. } => Some(Ok(())),
                Event::EvolutionRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(EvolutionError::MissingTower))
    }

    /// Overrides the tower's targeting rule, or restores its element default
    /// with `None`. Returns whether the tower exists.
    pub fn set_targeting_mode(&mut self, tower: TowerId, mode: Option<TargetingRule>) -> bool {
        if query::tower_view(&self.world).get(tower).is_none() {
            return false;
        }
        let _ = self.execute(Command::SetTargetingMode { tower, mode });
        true
    }

    /// Starts the next wave. Returns `false` while a wave is running or after
    /// the game ended.
    pub fn start_wave(&mut self) -> bool {
        if query::wave_active(&self.world) || query::is_game_over(&self.world) {
            return false;
        }
        let wave = query::wave(&self.world) + 1;
        let config = self.waves.generate(wave);
        let events = self.execute(Command::StartWave { wave, config });
        let started = events
            .iter()
            .any(|event| matches!(event, Event::WaveStarted { .. }));
        self.run_spawning(events);
        started
    }

    /// Discards all progress and starts over with the same configuration.
    pub fn reset(&mut self) {
        info!(seed = self.config.seed, "simulation reset");
        *self = Self::new(self.config);
    }

    /// Captures the persistent state of the simulation.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        let economy = query::economy(&self.world);
        SimulationSnapshot {
            wave: query::wave(&self.world),
            lives: economy.lives,
            money: economy.money,
            score: economy.score,
            path_seed: self.path_seed,
            towers: query::tower_records(&self.world)
                .into_iter()
                .map(|record| SavedTower {
                    element: record.element,
                    position: record.position,
                    upgrades: record.upgrades,
                    kills: record.kills,
                    evolution: record.evolution,
                })
                .collect(),
            camera: self.camera,
        }
    }

    /// Rebuilds the simulation from a snapshot.
    ///
    /// The snapshot is validated first; on failure the running simulation is
    /// left untouched.
    pub fn restore(&mut self, snapshot: &SimulationSnapshot) -> Result<(), SnapshotError> {
        if let Err(error) = snapshot.validate(self.config.width, self.config.height) {
            warn!(%error, "snapshot rejected");
            return Err(error);
        }

        let path = generate_path(snapshot.path_seed);
        let records: Vec<TowerRecord> = snapshot
            .towers
            .iter()
            .map(|tower| TowerRecord {
                element: tower.element,
                position: tower.position,
                upgrades: tower.upgrades,
                kills: tower.kills,
                evolution: tower.evolution,
            })
            .collect();
        let economy = Economy {
            money: snapshot.money,
            lives: snapshot.lives,
            score: snapshot.score,
            ward: 0,
        };

        let mut restored = Self::new(self.config);
        restored.world = World::restore(
            self.config.world_config(),
            path.denormalize(self.config.width, self.config.height),
            economy,
            snapshot.wave,
            &records,
        );
        restored.path_seed = snapshot.path_seed;
        restored.path = path;
        restored.camera = snapshot.camera;
        *self = restored;
        info!(
            wave = snapshot.wave,
            towers = snapshot.towers.len(),
            "snapshot restored"
        );
        Ok(())
    }

    /// Decodes and restores an encoded snapshot string.
    pub fn restore_encoded(&mut self, encoded: &str) -> Result<(), SnapshotError> {
        let snapshot = SimulationSnapshot::decode(encoded).map_err(|error| {
            warn!(%error, "snapshot rejected");
            error
        })?;
        self.restore(&snapshot)
    }

    /// Drains every event broadcast since the previous call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Live enemies.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Placed towers.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        query::projectiles(&self.world)
    }

    /// Active synergy fields.
    #[must_use]
    pub fn synergies(&self) -> Vec<SynergySnapshot> {
        query::synergies(&self.world)
    }

    /// Player resources.
    #[must_use]
    pub fn economy(&self) -> Economy {
        query::economy(&self.world)
    }

    /// Current weather.
    #[must_use]
    pub fn weather(&self) -> Weather {
        query::weather(&self.world)
    }

    /// Most recently started wave.
    #[must_use]
    pub fn wave(&self) -> u32 {
        query::wave(&self.world)
    }

    /// Reports whether a wave is in progress.
    #[must_use]
    pub fn wave_active(&self) -> bool {
        query::wave_active(&self.world)
    }

    /// Fraction of the current wave already spawned.
    #[must_use]
    pub fn wave_progress(&self) -> f32 {
        self.spawning.progress()
    }

    /// Reports whether the player has run out of lives.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        query::is_game_over(&self.world)
    }

    /// Enemy route in world units.
    #[must_use]
    pub fn path(&self) -> &[Vec2] {
        query::path(&self.world)
    }

    /// Normalized route the world path was built from.
    #[must_use]
    pub fn normalized_path(&self) -> &Path {
        &self.path
    }

    /// Checks whether a tower could be placed without committing to it.
    pub fn placement_check(&self, element: Element, position: Vec2) -> Result<(), PlacementError> {
        query::placement_check(&self.world, element, position)
    }

    /// Parameters the simulation was created with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Presentation camera persisted with snapshots.
    #[must_use]
    pub fn camera(&self) -> CameraState {
        self.camera
    }

    /// Replaces the persisted camera.
    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = camera;
    }

    fn execute(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.events.extend(events.iter().cloned());
        events
    }

    fn execute_all(&mut self, commands: Vec<Command>) {
        for command in commands {
            let _ = self.execute(command);
        }
    }

    /// Feeds events to the spawning system until it stops reacting.
    fn run_spawning(&mut self, events: Vec<Event>) {
        let mut pending = events;
        loop {
            let mut commands = Vec::new();
            self.spawning
                .handle(&pending, query::enemy_count(&self.world), &mut commands);
            if commands.is_empty() {
                break;
            }

            pending.clear();
            for command in commands {
                pending.extend(self.execute(command));
            }
        }
    }
}
