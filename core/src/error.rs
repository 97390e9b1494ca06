//! Synchronous rejection reasons surfaced to callers and broadcast as events.

use serde::{Deserialize, Serialize};

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// The position lies outside the playing field.
    #[error("tower position lies outside the field")]
    OutOfBounds,
    /// The position overlaps the enemy path corridor.
    #[error("tower is too close to the enemy path")]
    TooCloseToPath,
    /// The position overlaps another tower.
    #[error("tower is too close to another tower")]
    TooCloseToTower,
    /// The player cannot afford the tower.
    #[error("tower costs {required} but only {available} is available")]
    InsufficientFunds {
        /// Price of the tower.
        required: u32,
        /// Money held by the player.
        available: u32,
    },
}

/// Reasons an upgrade request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("tower does not exist")]
    MissingTower,
    /// The requested track already reached its final level.
    #[error("upgrade track is already maxed")]
    TrackMaxed,
    /// The player cannot afford the next level.
    #[error("upgrade costs {required} but only {available} is available")]
    InsufficientFunds {
        /// Price of the next level.
        required: u32,
        /// Money held by the player.
        available: u32,
    },
}

/// Reasons an evolution request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum EvolutionError {
    /// No tower with the provided identifier exists.
    #[error("tower does not exist")]
    MissingTower,
    /// The tower already evolved.
    #[error("tower has already evolved")]
    AlreadyEvolved,
    /// The tower lacks the kills or level required to evolve.
    #[error("tower needs more kills or upgrades to evolve ({kills} kills, level {level})")]
    NotEligible {
        /// Kills scored by the tower.
        kills: u32,
        /// Current tower level.
        level: u32,
    },
    /// The option index does not name an evolution for the tower's element.
    #[error("evolution option {index} does not exist")]
    InvalidOption {
        /// Requested option index.
        index: u32,
    },
}
