//! Upgrade tracks, their per-level factors, and purchase costs.

use serde::{Deserialize, Serialize};

/// Highest level any upgrade track may reach.
pub const MAX_UPGRADE_LEVEL: u8 = 3;

/// Independent stat track that can be upgraded on a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeTrack {
    /// Multiplies projectile damage.
    Damage,
    /// Multiplies targeting range.
    Range,
    /// Multiplies the cooldown; lower values fire faster.
    Speed,
    /// Scales the element's special ability and unlocks passives.
    Special,
}

impl UpgradeTrack {
    /// Every track in declaration order.
    pub const ALL: [UpgradeTrack; 4] = [Self::Damage, Self::Range, Self::Speed, Self::Special];

    const fn table(self) -> ([f32; 3], [u32; 3]) {
        match self {
            Self::Damage => ([1.25, 1.25, 1.3], [30, 50, 80]),
            Self::Range => ([1.15, 1.15, 1.2], [25, 40, 60]),
            Self::Speed => ([0.85, 0.85, 0.8], [35, 55, 85]),
            Self::Special => ([1.2, 1.25, 1.3], [40, 60, 100]),
        }
    }

    /// Cumulative multiplier after purchasing `level` levels.
    #[must_use]
    pub fn multiplier(self, level: u8) -> f32 {
        let (factors, _) = self.table();
        factors
            .iter()
            .take(usize::from(level.min(MAX_UPGRADE_LEVEL)))
            .product()
    }

    /// Price of raising the track from `current_level` to the next level.
    ///
    /// Returns `None` once the track is maxed.
    #[must_use]
    pub fn next_cost(self, current_level: u8) -> Option<u32> {
        let (_, costs) = self.table();
        costs.get(usize::from(current_level)).copied()
    }

    /// Total price paid for the first `level` levels.
    #[must_use]
    pub fn spent(self, level: u8) -> u32 {
        let (_, costs) = self.table();
        costs
            .iter()
            .take(usize::from(level.min(MAX_UPGRADE_LEVEL)))
            .sum()
    }
}

/// Per-track upgrade levels of a tower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeLevels {
    /// Damage track level.
    pub damage: u8,
    /// Range track level.
    pub range: u8,
    /// Speed track level.
    pub speed: u8,
    /// Special track level.
    pub special: u8,
}

impl UpgradeLevels {
    /// Level of the provided track.
    #[must_use]
    pub const fn get(&self, track: UpgradeTrack) -> u8 {
        match track {
            UpgradeTrack::Damage => self.damage,
            UpgradeTrack::Range => self.range,
            UpgradeTrack::Speed => self.speed,
            UpgradeTrack::Special => self.special,
        }
    }

    /// Raises the track by one level, returning the new level.
    ///
    /// Maxed tracks are left untouched and yield `None`.
    pub fn raise(&mut self, track: UpgradeTrack) -> Option<u8> {
        let slot = match track {
            UpgradeTrack::Damage => &mut self.damage,
            UpgradeTrack::Range => &mut self.range,
            UpgradeTrack::Speed => &mut self.speed,
            UpgradeTrack::Special => &mut self.special,
        };
        if *slot >= MAX_UPGRADE_LEVEL {
            return None;
        }
        *slot += 1;
        Some(*slot)
    }

    /// Sum of all track levels.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.damage as u32 + self.range as u32 + self.speed as u32 + self.special as u32
    }

    /// Tower level derived from the number of purchased upgrades.
    #[must_use]
    pub const fn tower_level(&self) -> u32 {
        1 + self.total() / 2
    }

    /// Total price paid across every track.
    #[must_use]
    pub fn spent(&self) -> u32 {
        UpgradeTrack::ALL
            .iter()
            .map(|track| track.spent(self.get(*track)))
            .sum()
    }

    /// Reports whether every track is within the allowed range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        UpgradeTrack::ALL
            .iter()
            .all(|track| self.get(*track) <= MAX_UPGRADE_LEVEL)
    }
}
