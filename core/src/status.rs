//! Names of the timed modifiers that can be attached to an enemy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a status effect. At most one entry of each kind lives on an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    /// Fire damage over time.
    Burn,
    /// Nature damage over time.
    Poison,
    /// Speed multiplier.
    Slow,
    /// Stronger speed multiplier from fields.
    SuperSlow,
    /// Complete movement lock.
    Freeze,
    /// Short movement lock.
    Stun,
    /// Damage-taken multiplier from darkness projectiles.
    Weaken,
    /// Damage-taken multiplier from evolved darkness towers.
    Curse,
    /// Damage-taken multiplier from darkness passives.
    Mark,
    /// Damage-taken multiplier from twilight fields.
    Amplify,
    /// Suppresses cloaking.
    Reveal,
    /// Pulls movement toward an anchor point.
    Vortex,
    /// Bends movement tangentially around an anchor point.
    Spin,
    /// Chance to negate incoming hits.
    Evasion,
}

impl StatusKind {
    /// Stable lowercase name exposed to presentation layers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Burn => "burn",
            Self::Poison => "poison",
            Self::Slow => "slow",
            Self::SuperSlow => "super_slow",
            Self::Freeze => "freeze",
            Self::Stun => "stun",
            Self::Weaken => "weaken",
            Self::Curse => "curse",
            Self::Mark => "mark",
            Self::Amplify => "amplify",
            Self::Reveal => "reveal",
            Self::Vortex => "vortex",
            Self::Spin => "spin",
            Self::Evasion => "evasion",
        }
    }

    /// Reports whether the effect changes movement speed.
    #[must_use]
    pub const fn affects_speed(self) -> bool {
        matches!(self, Self::Slow | Self::SuperSlow)
    }

    /// Reports whether the effect locks movement.
    #[must_use]
    pub const fn locks_movement(self) -> bool {
        matches!(self, Self::Freeze | Self::Stun)
    }

    /// Reports whether the effect deals damage every tick.
    #[must_use]
    pub const fn deals_damage_over_time(self) -> bool {
        matches!(self, Self::Burn | Self::Poison)
    }

    /// Reports whether the effect multiplies incoming damage.
    #[must_use]
    pub const fn amplifies_damage(self) -> bool {
        matches!(self, Self::Weaken | Self::Curse | Self::Mark | Self::Amplify)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
