//! Enemy archetypes and their stat multipliers.

use serde::{Deserialize, Serialize};

/// Health of a normal enemy on the first wave.
pub const BASE_ENEMY_HEALTH: f32 = 100.0;

/// Speed of a normal enemy in world units per second.
pub const BASE_ENEMY_SPEED: f32 = 60.0;

const HEALTH_GROWTH_PER_WAVE: f32 = 0.12;

/// Closed set of enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline enemy.
    Normal,
    /// Quick and fragile.
    Fast,
    /// Slow with a damage-absorbing shield.
    Tank,
    /// Periodically heals nearby allies.
    Healer,
    /// Toggles a cloak that hides it from most towers.
    Invisible,
    /// Weak enemy that arrives in numbers.
    Swarm,
    /// Resistant, shielded wave leader.
    Boss,
}

impl EnemyKind {
    /// Every kind in declaration order.
    pub const ALL: [EnemyKind; 7] = [
        Self::Normal,
        Self::Fast,
        Self::Tank,
        Self::Healer,
        Self::Invisible,
        Self::Swarm,
        Self::Boss,
    ];

    /// Multiplier applied to [`BASE_ENEMY_HEALTH`].
    #[must_use]
    pub const fn health_multiplier(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Fast => 0.7,
            Self::Tank => 3.0,
            Self::Healer => 1.2,
            Self::Invisible => 0.9,
            Self::Swarm => 0.4,
            Self::Boss => 10.0,
        }
    }

    /// Multiplier applied to [`BASE_ENEMY_SPEED`].
    #[must_use]
    pub const fn speed_multiplier(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Fast => 1.6,
            Self::Tank => 0.6,
            Self::Healer => 0.9,
            Self::Invisible => 1.1,
            Self::Swarm => 1.3,
            Self::Boss => 0.5,
        }
    }

    /// Money and score granted when the enemy is killed.
    #[must_use]
    pub const fn reward(self) -> u32 {
        match self {
            Self::Normal => 10,
            Self::Fast => 12,
            Self::Tank => 25,
            Self::Healer => 20,
            Self::Invisible => 18,
            Self::Swarm => 5,
            Self::Boss => 100,
        }
    }

    /// Collision radius in world units.
    #[must_use]
    pub const fn radius(self) -> f32 {
        match self {
            Self::Normal => 10.0,
            Self::Fast => 8.0,
            Self::Tank => 14.0,
            Self::Healer => 11.0,
            Self::Invisible => 9.0,
            Self::Swarm => 6.0,
            Self::Boss => 22.0,
        }
    }

    /// Shield pool drained before health.
    #[must_use]
    pub const fn shield(self) -> f32 {
        match self {
            Self::Tank => 50.0,
            Self::Boss => 200.0,
            _ => 0.0,
        }
    }

    /// Multiplier applied to every incoming hit before other modifiers.
    #[must_use]
    pub const fn damage_resistance(self) -> f32 {
        match self {
            Self::Boss => 0.75,
            _ => 1.0,
        }
    }

    /// Healing aura carried by the kind, if any.
    #[must_use]
    pub const fn heal_aura(self) -> Option<HealAura> {
        match self {
            Self::Healer => Some(HealAura {
                amount: 10.0,
                interval: 2.0,
                radius: 80.0,
            }),
            _ => None,
        }
    }

    /// Cloak cycle carried by the kind, if any.
    #[must_use]
    pub const fn cloak(self) -> Option<CloakCycle> {
        match self {
            Self::Invisible => Some(CloakCycle {
                visible: 3.0,
                cloaked: 2.0,
            }),
            _ => None,
        }
    }

    /// Maximum health of the kind when spawned during `wave`.
    #[must_use]
    pub fn max_health(self, wave: u32) -> f32 {
        let growth = 1.0 + HEALTH_GROWTH_PER_WAVE * wave.saturating_sub(1) as f32;
        BASE_ENEMY_HEALTH * self.health_multiplier() * growth
    }

    /// Undisturbed movement speed of the kind.
    #[must_use]
    pub fn base_speed(self) -> f32 {
        BASE_ENEMY_SPEED * self.speed_multiplier()
    }
}

/// Periodic heal applied to allies around the carrier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealAura {
    /// Health restored to each ally per pulse.
    pub amount: f32,
    /// Seconds between pulses.
    pub interval: f32,
    /// Radius of the pulse in world units.
    pub radius: f32,
}

/// Alternating visible and cloaked phases.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloakCycle {
    /// Seconds spent visible.
    pub visible: f32,
    /// Seconds spent cloaked.
    pub cloaked: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_grows_with_wave_index() {
        assert!((EnemyKind::Normal.max_health(1) - 100.0).abs() < f32::EPSILON);
        assert!((EnemyKind::Normal.max_health(11) - 220.0).abs() < 1e-3);
    }

    #[test]
    fn only_armoured_kinds_carry_shields() {
        let shielded: Vec<_> = EnemyKind::ALL
            .into_iter()
            .filter(|kind| kind.shield() > 0.0)
            .collect();
        assert_eq!(shielded, vec![EnemyKind::Tank, EnemyKind::Boss]);
    }
}
