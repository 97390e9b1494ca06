//! Elemental tower catalogue: base stats, costs, targeting bias, and the
//! special ability attached to every projectile.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::upgrade::UpgradeTrack;

/// Radius in world units searched when a chain hop picks its next targets.
pub const CHAIN_RADIUS: f32 = 100.0;

/// Elemental affinity that parameterizes a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    /// Burning damage over time.
    Fire,
    /// Slowing projectiles and whirlpools.
    Water,
    /// Rapid fire with chain propagation.
    Air,
    /// Heavy, long-ranged shots that stun.
    Earth,
    /// Weakening shots that amplify damage taken.
    Darkness,
    /// Reveals cloaked enemies.
    Light,
    /// Support tower that buffs neighbours and generates resources.
    Life,
}

impl Element {
    /// Every element in declaration order.
    pub const ALL: [Element; 7] = [
        Self::Fire,
        Self::Water,
        Self::Air,
        Self::Earth,
        Self::Darkness,
        Self::Light,
        Self::Life,
    ];

    /// Human readable element name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Air => "air",
            Self::Earth => "earth",
            Self::Darkness => "darkness",
            Self::Light => "light",
            Self::Life => "life",
        }
    }

    /// Unmodified combat statistics of a freshly placed tower.
    #[must_use]
    pub const fn base_stats(self) -> BaseStats {
        let (range, damage, cooldown, projectile_speed) = match self {
            Self::Fire => (150.0, 20.0, 1.0, 300.0),
            Self::Water => (150.0, 15.0, 0.8, 300.0),
            Self::Air => (175.0, 10.0, 0.4, 350.0),
            Self::Earth => (200.0, 25.0, 1.5, 250.0),
            Self::Darkness => (150.0, 30.0, 1.4, 300.0),
            Self::Light => (175.0, 25.0, 0.6, 350.0),
            Self::Life => (150.0, 15.0, 1.2, 300.0),
        };
        BaseStats {
            range,
            damage,
            cooldown,
            projectile_speed,
        }
    }

    /// Purchase price of the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Fire => 50,
            Self::Water => 40,
            Self::Air => 45,
            Self::Earth => 60,
            Self::Darkness => 55,
            Self::Light => 50,
            Self::Life => 45,
        }
    }

    /// Rule used to rank enemies when no explicit targeting mode is set.
    #[must_use]
    pub const fn targeting(self) -> TargetingRule {
        match self {
            Self::Fire | Self::Earth | Self::Darkness => TargetingRule::HighestHealth,
            Self::Water | Self::Light => TargetingRule::Closest,
            Self::Air => TargetingRule::FurthestAlong,
            Self::Life => TargetingRule::LowestHealth,
        }
    }

    /// Secondary bias applied before the targeting rule.
    #[must_use]
    pub const fn preference(self) -> TargetPreference {
        match self {
            Self::Darkness => TargetPreference::Unweakened,
            Self::Light => TargetPreference::Cloaked,
            Self::Life => TargetPreference::Healers,
            _ => TargetPreference::None,
        }
    }

    /// Reports whether the tower can see cloaked enemies.
    #[must_use]
    pub const fn detects_cloaked(self) -> bool {
        matches!(self, Self::Light)
    }

    /// Special ability carried by projectiles before any upgrades.
    #[must_use]
    pub const fn special(self) -> SpecialAbility {
        match self {
            Self::Fire => SpecialAbility::Burn {
                chance: 0.3,
                duration: 3.0,
                damage_per_second: 5.0,
            },
            Self::Water => SpecialAbility::Slow {
                chance: 0.4,
                duration: 2.0,
                multiplier: 0.5,
            },
            Self::Air => SpecialAbility::Chain {
                chance: 0.25,
                targets: 3,
                falloff: 0.7,
            },
            Self::Earth => SpecialAbility::Stun {
                chance: 0.15,
                duration: 1.0,
            },
            Self::Darkness => SpecialAbility::Weaken {
                chance: 0.3,
                duration: 4.0,
                multiplier: 1.5,
            },
            Self::Light => SpecialAbility::Reveal {
                chance: 0.5,
                duration: 3.0,
            },
            Self::Life => SpecialAbility::None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown element name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown element `{0}`")]
pub struct ParseElementError(pub String);

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|element| element.name() == normalized)
            .ok_or_else(|| ParseElementError(value.to_owned()))
    }
}

/// Combat statistics shared by base and derived tower values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    /// Targeting radius in world units.
    pub range: f32,
    /// Damage carried by each projectile.
    pub damage: f32,
    /// Seconds between shots.
    pub cooldown: f32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
}

/// Ranking rule used to choose among enemies in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingRule {
    /// Prefer the enemy with the most remaining health.
    HighestHealth,
    /// Prefer the enemy nearest to the tower.
    Closest,
    /// Prefer the enemy that has advanced furthest along the path.
    FurthestAlong,
    /// Prefer the enemy with the least remaining health.
    LowestHealth,
}

/// Bias that narrows the candidate set before the targeting rule ranks it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPreference {
    /// No bias.
    None,
    /// Prefer enemies of the cloaking kind.
    Cloaked,
    /// Prefer enemies that are not already weakened.
    Unweakened,
    /// Prefer enemies that heal their allies.
    Healers,
}

/// Effect a projectile may trigger on impact.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpecialAbility {
    /// The projectile carries no extra effect.
    None,
    /// Damage over time.
    Burn {
        /// Probability of applying the effect on impact.
        chance: f32,
        /// Seconds the burn lasts.
        duration: f32,
        /// Damage dealt per second while burning.
        damage_per_second: f32,
    },
    /// Movement speed reduction.
    Slow {
        /// Probability of applying the effect on impact.
        chance: f32,
        /// Seconds the slow lasts.
        duration: f32,
        /// Speed multiplier while slowed.
        multiplier: f32,
    },
    /// Follow-up projectiles hopping to nearby enemies.
    Chain {
        /// Probability of chaining on impact.
        chance: f32,
        /// Maximum number of follow-up targets.
        targets: u32,
        /// Damage factor applied per hop.
        falloff: f32,
    },
    /// Movement lock.
    Stun {
        /// Probability of applying the effect on impact.
        chance: f32,
        /// Seconds the stun lasts.
        duration: f32,
    },
    /// Increases damage the enemy takes.
    Weaken {
        /// Probability of applying the effect on impact.
        chance: f32,
        /// Seconds the weaken lasts.
        duration: f32,
        /// Damage-taken multiplier.
        multiplier: f32,
    },
    /// Makes cloaked enemies targetable.
    Reveal {
        /// Probability of applying the effect on impact.
        chance: f32,
        /// Seconds the reveal lasts.
        duration: f32,
    },
}

impl SpecialAbility {
    /// Probability that the ability triggers on impact.
    #[must_use]
    pub const fn chance(&self) -> f32 {
        match *self {
            Self::None => 0.0,
            Self::Burn { chance, .. }
            | Self::Slow { chance, .. }
            | Self::Chain { chance, .. }
            | Self::Stun { chance, .. }
            | Self::Weaken { chance, .. }
            | Self::Reveal { chance, .. } => chance,
        }
    }

    /// Applies the special upgrade track to trigger chance and magnitude.
    #[must_use]
    pub fn scaled(self, special_level: u8) -> Self {
        let factor = UpgradeTrack::Special.multiplier(special_level);
        let chance_of = |chance: f32| (chance * factor).min(1.0);
        match self {
            Self::None => Self::None,
            Self::Burn {
                chance,
                duration,
                damage_per_second,
            } => Self::Burn {
                chance: chance_of(chance),
                duration,
                damage_per_second: damage_per_second * factor,
            },
            Self::Slow {
                chance,
                duration,
                multiplier,
            } => Self::Slow {
                chance: chance_of(chance),
                duration,
                multiplier: (1.0 - (1.0 - multiplier) * factor).max(0.1),
            },
            Self::Chain {
                chance,
                targets,
                falloff,
            } => Self::Chain {
                chance: chance_of(chance),
                targets: targets + u32::from(special_level),
                falloff,
            },
            Self::Stun { chance, duration } => Self::Stun {
                chance: chance_of(chance),
                duration: duration * factor,
            },
            Self::Weaken {
                chance,
                duration,
                multiplier,
            } => Self::Weaken {
                chance: chance_of(chance),
                duration,
                multiplier: 1.0 + (multiplier - 1.0) * factor,
            },
            Self::Reveal { chance, duration } => Self::Reveal {
                chance: chance_of(chance),
                duration: duration * factor,
            },
        }
    }
}
