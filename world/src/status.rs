//! Per-enemy table of timed modifiers.

use std::{cmp::Ordering, collections::BTreeMap};

use crystal_defence_core::{StatusKind, TowerId};
use glam::Vec2;

/// Timed modifier attached to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusEffect {
    /// Seconds until the effect expires.
    pub remaining: f32,
    /// Kind-specific strength: damage per second, speed or damage multiplier,
    /// or evasion chance.
    pub magnitude: f32,
    /// Pivot for vortex and spin effects.
    pub anchor: Option<Vec2>,
    /// Radius around the anchor inside which the effect steers movement.
    pub radius: f32,
    /// Tower credited with damage dealt by the effect.
    pub source: Option<TowerId>,
}

impl StatusEffect {
    /// Creates an unanchored effect.
    #[must_use]
    pub const fn timed(duration: f32, magnitude: f32) -> Self {
        Self {
            remaining: duration,
            magnitude,
            anchor: None,
            radius: 0.0,
            source: None,
        }
    }

    /// Pins the effect to a pivot point.
    #[must_use]
    pub const fn anchored(mut self, anchor: Vec2, radius: f32) -> Self {
        self.anchor = Some(anchor);
        self.radius = radius;
        self
    }

    /// Credits damage dealt by the effect to a tower.
    #[must_use]
    pub const fn from_source(mut self, source: Option<TowerId>) -> Self {
        self.source = source;
        self
    }
}

/// Damage produced by a damage-over-time effect during one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PeriodicDamage {
    pub(crate) amount: f32,
    pub(crate) source: Option<TowerId>,
}

/// Outcome of advancing every effect by one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct StatusTick {
    /// Portion of the tick during which movement was locked.
    pub(crate) locked_for: f32,
    /// Damage-over-time produced during the tick.
    pub(crate) damage: Vec<PeriodicDamage>,
    /// Whether an expired effect changed movement speed.
    pub(crate) speed_changed: bool,
}

/// Kind-keyed map of the timed modifiers attached to one enemy.
#[derive(Clone, Debug, Default)]
pub struct StatusEffectTable {
    entries: BTreeMap<StatusKind, StatusEffect>,
}

impl StatusEffectTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an effect, replacing any entry of the same kind.
    ///
    /// A weaker effect never displaces a stronger one that is still running,
    /// and an equally strong one keeps the longer remaining duration. Returns
    /// whether the table changed.
    pub fn insert(&mut self, kind: StatusKind, mut effect: StatusEffect) -> bool {
        if effect.remaining <= 0.0 {
            return false;
        }
        if let Some(existing) = self.entries.get(&kind) {
            let ordering = if kind.affects_speed() {
                effect.magnitude.total_cmp(&existing.magnitude).reverse()
            } else {
                effect.magnitude.total_cmp(&existing.magnitude)
            };
            match ordering {
                Ordering::Less => return false,
                Ordering::Equal => effect.remaining = effect.remaining.max(existing.remaining),
                Ordering::Greater => {}
            }
        }
        let _ = self.entries.insert(kind, effect);
        true
    }

    /// Looks up the entry of the provided kind.
    #[must_use]
    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.entries.get(&kind)
    }

    /// Reports whether an entry of the provided kind is active.
    #[must_use]
    pub fn contains(&self, kind: StatusKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Kinds of all active entries in stable order.
    pub fn kinds(&self) -> impl Iterator<Item = StatusKind> + '_ {
        self.entries.keys().copied()
    }

    /// Reports whether no entries are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Strongest active speed multiplier, or `1.0` when none applies.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.entries
            .iter()
            .filter(|(kind, _)| kind.affects_speed())
            .map(|(_, effect)| effect.magnitude)
            .fold(1.0, f32::min)
    }

    /// Product of every damage-taken multiplier.
    #[must_use]
    pub fn damage_taken_multiplier(&self) -> f32 {
        self.entries
            .iter()
            .filter(|(kind, _)| kind.amplifies_damage())
            .map(|(_, effect)| effect.magnitude)
            .product()
    }

    /// Reports whether a freeze or stun is active.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.entries.keys().any(|kind| kind.locks_movement())
    }

    /// Decrements every duration by `dt` and drops expired entries.
    pub(crate) fn advance(&mut self, dt: f32) -> StatusTick {
        let mut tick = StatusTick::default();
        if dt <= 0.0 {
            return tick;
        }

        for (kind, effect) in &mut self.entries {
            let active = effect.remaining.min(dt).max(0.0);
            if kind.locks_movement() {
                tick.locked_for = tick.locked_for.max(active);
            }
            if kind.deals_damage_over_time() && active > 0.0 {
                tick.damage.push(PeriodicDamage {
                    amount: effect.magnitude * active,
                    source: effect.source,
                });
            }
            effect.remaining -= dt;
        }

        self.entries.retain(|kind, effect| {
            let keep = effect.remaining > 0.0;
            if !keep && kind.affects_speed() {
                tick.speed_changed = true;
            }
            keep
        });
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strongest_slow_wins_and_weaker_cannot_displace_it() {
        let mut table = StatusEffectTable::new();
        assert!(table.insert(StatusKind::Slow, StatusEffect::timed(2.0, 0.5)));
        assert!(!table.insert(StatusKind::Slow, StatusEffect::timed(5.0, 0.8)));
        assert!(table.insert(StatusKind::SuperSlow, StatusEffect::timed(1.0, 0.3)));
        assert!((table.speed_multiplier() - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn refreshes_keep_the_longer_duration_and_stronger_magnitude() {
        let mut table = StatusEffectTable::new();
        assert!(table.insert(StatusKind::Reveal, StatusEffect::timed(3.0, 1.0)));
        assert!(table.insert(StatusKind::Reveal, StatusEffect::timed(0.25, 1.0)));
        let reveal = table.get(StatusKind::Reveal).copied().expect("reveal");
        assert!((reveal.remaining - 3.0).abs() < f32::EPSILON);

        assert!(table.insert(StatusKind::Mark, StatusEffect::timed(6.0, 1.5)));
        assert!(!table.insert(StatusKind::Mark, StatusEffect::timed(0.25, 1.2)));
        assert!(table.insert(StatusKind::Mark, StatusEffect::timed(0.25, 1.8)));
        let mark = table.get(StatusKind::Mark).copied().expect("mark");
        assert!((mark.magnitude - 1.8).abs() < f32::EPSILON);
        assert!((mark.remaining - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn damage_multipliers_stack_multiplicatively() {
        let mut table = StatusEffectTable::new();
        let _ = table.insert(StatusKind::Weaken, StatusEffect::timed(4.0, 1.5));
        let _ = table.insert(StatusKind::Curse, StatusEffect::timed(5.0, 1.5));
        assert!((table.damage_taken_multiplier() - 2.25).abs() < 1e-6);
    }

    #[test]
    fn expiry_reports_speed_changes_and_lock_time() {
        let mut table = StatusEffectTable::new();
        let _ = table.insert(StatusKind::Slow, StatusEffect::timed(0.1, 0.5));
        let _ = table.insert(StatusKind::Stun, StatusEffect::timed(0.25, 1.0));

        let tick = table.advance(0.5);
        assert!(tick.speed_changed);
        assert!((tick.locked_for - 0.25).abs() < f32::EPSILON);
        assert!(table.is_empty());
    }

    #[test]
    fn burn_deals_its_full_damage_over_its_duration() {
        let mut table = StatusEffectTable::new();
        let _ = table.insert(StatusKind::Burn, StatusEffect::timed(3.0, 5.0));

        let mut total = 0.0;
        for _ in 0..16 {
            total += table
                .advance(0.25)
                .damage
                .iter()
                .map(|damage| damage.amount)
                .sum::<f32>();
        }
        assert!((total - 15.0).abs() < 1e-4);
        assert!(!table.contains(StatusKind::Burn));
    }
}
