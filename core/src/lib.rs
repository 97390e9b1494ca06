#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crystal Defence engine.
//!
//! This crate defines the message surface that connects the orchestrator,
//! the authoritative world, and pure systems. Callers submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems
//! to react to deterministically. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.
//!
//! The element, enemy, upgrade, and evolution catalogues live here as well so
//! every crate reads the same tables.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod element;
mod enemy;
mod error;
mod evolution;
mod modifier;
mod status;
mod upgrade;
mod view;
mod wave;

pub use element::{
    BaseStats, Element, ParseElementError, SpecialAbility, TargetPreference, TargetingRule,
    CHAIN_RADIUS,
};
pub use enemy::{CloakCycle, EnemyKind, HealAura, BASE_ENEMY_HEALTH, BASE_ENEMY_SPEED};
pub use error::{EvolutionError, PlacementError, UpgradeError};
pub use evolution::{
    EvolutionForm, EvolutionMultipliers, EvolvedAbility, EVOLUTION_KILL_THRESHOLD,
    EVOLUTION_LEVEL_THRESHOLD,
};
pub use modifier::{SynergyKind, Weather, SYNERGY_PAIR_RADIUS, WEATHER_PERIOD};
pub use status::StatusKind;
pub use upgrade::{UpgradeLevels, UpgradeTrack, MAX_UPGRADE_LEVEL};
pub use view::{
    EnemySnapshot, EnemyView, ProjectileSnapshot, SynergySnapshot, TowerSnapshot, TowerView,
};
pub use wave::{Path, WaveConfig, WaveEntry};

/// Tenths of the purchase and upgrade spend returned when a tower is sold.
pub const SELL_REFUND_TENTHS: u32 = 7;

/// Minimum clearance between a tower and the path or another tower.
pub const PLACEMENT_CLEARANCE: f32 = 40.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enter the path.
    SpawnEnemy {
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Wave the enemy belongs to, used for health scaling.
        wave: u32,
    },
    /// Requests placement of a tower.
    PlaceTower {
        /// Element of the tower.
        element: Element,
        /// Requested position in world units.
        position: Vec2,
    },
    /// Requests that a tower be sold for a partial refund.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Requests one level on an upgrade track.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
        /// Track to raise.
        track: UpgradeTrack,
    },
    /// Requests a permanent evolution.
    EvolveTower {
        /// Identifier of the tower to evolve.
        tower: TowerId,
        /// Index into the element's evolution options.
        option: u32,
    },
    /// Overrides or restores the tower's targeting rule.
    SetTargetingMode {
        /// Identifier of the tower.
        tower: TowerId,
        /// Explicit rule, or `None` to restore the element default.
        mode: Option<TargetingRule>,
    },
    /// Replaces the tower's target and restarts its lock timer.
    AssignTarget {
        /// Identifier of the tower.
        tower: TowerId,
        /// New target, or `None` to clear it.
        target: Option<EnemyId>,
    },
    /// Requests that a tower fire at its target.
    FireProjectile {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Enemy the projectile should home on.
        target: EnemyId,
    },
    /// Marks a wave as active.
    StartWave {
        /// One-based wave index.
        wave: u32,
        /// Composition of the wave.
        config: WaveConfig,
    },
    /// Marks the active wave as cleared and pays its bonus.
    CompleteWave {
        /// One-based wave index.
        wave: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Spawn position.
        position: Vec2,
    },
    /// Reports damage applied to an enemy.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        enemy: EnemyId,
        /// Damage removed from shield and health combined.
        amount: f32,
        /// Tower credited with the damage, if any.
        source: Option<TowerId>,
    },
    /// Reports that an incoming hit was evaded.
    HitEvaded {
        /// Identifier of the evading enemy.
        enemy: EnemyId,
    },
    /// Reports that a status effect was attached to an enemy.
    StatusApplied {
        /// Identifier of the affected enemy.
        enemy: EnemyId,
        /// Kind of the status effect.
        status: StatusKind,
        /// Duration of the effect in seconds.
        duration: f32,
    },
    /// Reports that an enemy died.
    EnemyKilled {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Money and score granted.
        reward: u32,
        /// Tower credited with the kill, if it still exists.
        credited: Option<TowerId>,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyEscaped {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Whether a ward charge absorbed the escape instead of a life.
        warded: bool,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Element of the tower.
        element: Element,
        /// Position of the tower.
        position: Vec2,
    },
    /// Reports that a placement request was rejected.
    TowerPlacementRejected {
        /// Element requested for placement.
        element: Element,
        /// Position provided in the request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the sold tower.
        tower: TowerId,
        /// Money returned to the player.
        refund: u32,
    },
    /// Reports that a sell request named a missing tower.
    SaleRejected {
        /// Identifier provided in the request.
        tower: TowerId,
    },
    /// Confirms an upgrade purchase.
    TowerUpgraded {
        /// Identifier of the tower.
        tower: TowerId,
        /// Track that was raised.
        track: UpgradeTrack,
        /// New level of the track.
        level: u8,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Identifier of the tower.
        tower: TowerId,
        /// Requested track.
        track: UpgradeTrack,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms a tower evolution.
    TowerEvolved {
        /// Identifier of the tower.
        tower: TowerId,
        /// Selected form.
        form: EvolutionForm,
    },
    /// Reports that an evolution request was rejected.
    EvolutionRejected {
        /// Identifier of the tower.
        tower: TowerId,
        /// Specific reason the evolution failed.
        reason: EvolutionError,
    },
    /// Reports that a tower's target changed.
    TargetChanged {
        /// Identifier of the tower.
        tower: TowerId,
        /// New target, if any.
        target: Option<EnemyId>,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Tower that fired it.
        tower: TowerId,
        /// Enemy the projectile homes on.
        target: EnemyId,
    },
    /// Reports that a projectile struck its target.
    ProjectileImpact {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage carried by the projectile.
        damage: f32,
    },
    /// Reports that a chain follow-up projectile was scheduled.
    ChainScheduled {
        /// Enemy the chain jumped from.
        origin: EnemyId,
        /// Enemy the follow-up homes on.
        target: EnemyId,
        /// One-based hop index.
        hop: u32,
        /// Damage carried by the follow-up.
        damage: f32,
    },
    /// Reports that a tower's passive ability activated.
    PassiveActivated {
        /// Identifier of the tower.
        tower: TowerId,
        /// Element of the tower.
        element: Element,
    },
    /// Reports that a synergy field formed.
    SynergyActivated {
        /// Named field effect.
        kind: SynergyKind,
        /// Lower identifier of the pair.
        first: TowerId,
        /// Higher identifier of the pair.
        second: TowerId,
    },
    /// Reports that a synergy field dissolved.
    SynergyExpired {
        /// Named field effect.
        kind: SynergyKind,
        /// Lower identifier of the pair.
        first: TowerId,
        /// Higher identifier of the pair.
        second: TowerId,
    },
    /// Reports money generated by a tower.
    GoldGenerated {
        /// Identifier of the tower.
        tower: TowerId,
        /// Money granted.
        amount: u32,
    },
    /// Reports lives restored by a tower or field.
    LivesRestored {
        /// Lives granted.
        amount: u32,
    },
    /// Reports a weather change.
    WeatherChanged {
        /// Weather that became active.
        weather: Weather,
    },
    /// Announces that a wave became active.
    WaveStarted {
        /// One-based wave index.
        wave: u32,
        /// Composition of the wave.
        config: WaveConfig,
    },
    /// Announces that a wave was cleared.
    WaveCompleted {
        /// One-based wave index.
        wave: u32,
        /// Money granted for clearing it.
        bonus: u32,
    },
    /// Announces that the player ran out of lives.
    GameOver {
        /// Wave during which the game ended.
        wave: u32,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Money returned when selling a tower with the provided upgrades.
#[must_use]
pub fn sell_refund(element: Element, upgrades: &UpgradeLevels) -> u32 {
    let invested = element.cost() + upgrades.spent();
    invested * SELL_REFUND_TENTHS / 10
}
