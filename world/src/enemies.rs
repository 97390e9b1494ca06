//! Enemy movement, path progress, and damage resolution.

use crystal_defence_core::{
    CloakCycle, EnemyId, EnemyKind, EnemySnapshot, HealAura, StatusKind, TowerId,
};
use glam::Vec2;

use crate::status::{PeriodicDamage, StatusEffect, StatusEffectTable};

/// Speed of knockback displacement in world units per second.
const KNOCKBACK_SPEED: f32 = 300.0;

const VORTEX_HEADING_WEIGHT: f32 = 0.7;
const VORTEX_PULL_WEIGHT: f32 = 0.3;
const SPIN_HEADING_WEIGHT: f32 = 0.3;
const SPIN_TANGENT_WEIGHT: f32 = 0.7;

/// Result of a single damage call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DamageOutcome {
    /// The hit was negated by evasion.
    Evaded,
    /// Damage removed from shield and health combined.
    Applied(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Knockback {
    direction: Vec2,
    remaining: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CloakState {
    cycle: CloakCycle,
    cloaked: bool,
    elapsed: f32,
}

impl CloakState {
    fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        loop {
            let phase = if self.cloaked {
                self.cycle.cloaked
            } else {
                self.cycle.visible
            };
            if phase <= 0.0 || self.elapsed < phase {
                break;
            }
            self.elapsed -= phase;
            self.cloaked = !self.cloaked;
        }
    }
}

/// Enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    /// Index of the waypoint the enemy is walking toward.
    pub(crate) waypoint: usize,
    pub(crate) base_speed: f32,
    pub(crate) speed: f32,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) shield: f32,
    pub(crate) reward: u32,
    pub(crate) radius: f32,
    pub(crate) effects: StatusEffectTable,
    pub(crate) last_damage: Option<TowerId>,
    pub(crate) reached_end: bool,
    knockback: Option<Knockback>,
    heal_elapsed: f32,
    cloak: Option<CloakState>,
}

impl Enemy {
    pub(crate) fn spawn(id: EnemyId, kind: EnemyKind, wave: u32, path: &[Vec2]) -> Self {
        let position = path.first().copied().unwrap_or(Vec2::ZERO);
        let max_health = kind.max_health(wave);
        let base_speed = kind.base_speed();
        Self {
            id,
            kind,
            position,
            waypoint: 1,
            base_speed,
            speed: base_speed,
            health: max_health,
            max_health,
            shield: kind.shield(),
            reward: kind.reward(),
            radius: kind.radius(),
            effects: StatusEffectTable::new(),
            last_damage: None,
            reached_end: path.len() < 2,
            knockback: None,
            heal_elapsed: 0.0,
            cloak: kind.cloak().map(|cycle| CloakState {
                cycle,
                cloaked: false,
                elapsed: 0.0,
            }),
        }
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Whether towers without detection can see the enemy.
    pub(crate) fn is_visible(&self) -> bool {
        match self.cloak {
            Some(state) if state.cloaked => self.effects.contains(StatusKind::Reveal),
            _ => true,
        }
    }

    pub(crate) fn is_revealed(&self) -> bool {
        self.effects.contains(StatusKind::Reveal)
    }

    /// Attaches a status effect, recomputing speed when it changes movement.
    pub(crate) fn apply_status(&mut self, kind: StatusKind, effect: StatusEffect) -> bool {
        let changed = self.effects.insert(kind, effect);
        if changed && kind.affects_speed() {
            self.recompute_speed();
        }
        changed
    }

    fn recompute_speed(&mut self) {
        self.speed = self.base_speed * self.effects.speed_multiplier();
    }

    /// Advances every status effect, returning the locked share of the tick
    /// and the damage-over-time to resolve.
    pub(crate) fn tick_effects(&mut self, dt: f32) -> (f32, Vec<PeriodicDamage>) {
        let tick = self.effects.advance(dt);
        if tick.speed_changed {
            self.recompute_speed();
        }
        (tick.locked_for, tick.damage)
    }

    /// Resolves a hit. `evasion_roll` is a uniform sample in `[0, 1)`; pass
    /// `1.0` for damage that cannot be evaded.
    pub(crate) fn take_damage(
        &mut self,
        amount: f32,
        source: Option<TowerId>,
        evasion_roll: f32,
    ) -> DamageOutcome {
        if amount <= 0.0 || self.is_dead() {
            return DamageOutcome::Applied(0.0);
        }

        let mut amount = amount * self.kind.damage_resistance();
        amount *= self.effects.damage_taken_multiplier();

        if let Some(evasion) = self.effects.get(StatusKind::Evasion) {
            if evasion_roll < evasion.magnitude {
                return DamageOutcome::Evaded;
            }
        }

        let absorbed = self.shield.min(amount);
        self.shield -= absorbed;
        let lost = (amount - absorbed).min(self.health);
        self.health -= lost;
        if source.is_some() {
            self.last_damage = source;
        }
        DamageOutcome::Applied(absorbed + lost)
    }

    /// Kills the enemy outright, crediting the provided tower.
    pub(crate) fn execute(&mut self, source: Option<TowerId>) {
        self.health = 0.0;
        if source.is_some() {
            self.last_damage = source;
        }
    }

    pub(crate) fn heal(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Shrinks maximum health, keeping health within the new bound.
    pub(crate) fn wither(&mut self, factor: f32) {
        self.max_health *= factor;
        self.health = self.health.min(self.max_health);
    }

    /// Starts a knockback toward the previous waypoint.
    pub(crate) fn knock_back(&mut self, distance: f32, path: &[Vec2]) {
        let previous = self
            .waypoint
            .checked_sub(1)
            .and_then(|index| path.get(index))
            .copied();
        let direction = previous
            .map(|point| (point - self.position).normalize_or_zero())
            .unwrap_or(Vec2::ZERO);
        if direction == Vec2::ZERO || distance <= 0.0 {
            return;
        }
        self.knockback = Some(Knockback {
            direction,
            remaining: distance,
        });
    }

    /// Moves the enemy for `budget` seconds along the path.
    pub(crate) fn advance(&mut self, budget: f32, path: &[Vec2]) {
        if self.reached_end || budget <= 0.0 {
            return;
        }

        if let Some(mut knockback) = self.knockback.take() {
            let step = (KNOCKBACK_SPEED * budget).min(knockback.remaining);
            self.position += knockback.direction * step;
            knockback.remaining -= step;
            if knockback.remaining > f32::EPSILON {
                self.knockback = Some(knockback);
            }
        }

        let mut travel = self.speed * budget;
        while travel > 0.0 {
            let Some(target) = path.get(self.waypoint).copied() else {
                self.reached_end = true;
                break;
            };

            let offset = target - self.position;
            let distance = offset.length();
            if distance <= travel {
                self.position = target;
                self.waypoint += 1;
                travel -= distance;
                if self.waypoint >= path.len() {
                    self.reached_end = true;
                    break;
                }
                continue;
            }

            let heading = self.steer(offset / distance);
            self.position += heading * travel;
            break;
        }
    }

    fn steer(&self, heading: Vec2) -> Vec2 {
        let mut direction = heading;

        if let Some(vortex) = self.effects.get(StatusKind::Vortex) {
            if let Some(anchor) = vortex.anchor {
                let pull = anchor - self.position;
                let distance = pull.length();
                if distance > 0.0 && distance < vortex.radius {
                    let strength = 1.0 - distance / vortex.radius;
                    direction = (direction * VORTEX_HEADING_WEIGHT
                        + pull / distance * VORTEX_PULL_WEIGHT * strength)
                        .normalize_or_zero();
                }
            }
        }

        if let Some(spin) = self.effects.get(StatusKind::Spin) {
            if let Some(anchor) = spin.anchor {
                let offset = self.position - anchor;
                let distance = offset.length();
                if distance > 0.0 && distance < spin.radius {
                    let tangent = offset.perp() / distance;
                    direction = (direction * SPIN_HEADING_WEIGHT + tangent * SPIN_TANGENT_WEIGHT)
                        .normalize_or_zero();
                }
            }
        }

        if direction == Vec2::ZERO {
            heading
        } else {
            direction
        }
    }

    /// Completed segments plus the projection onto the current segment, or
    /// infinity once the path is complete.
    pub(crate) fn path_progress(&self, path: &[Vec2]) -> f32 {
        if self.reached_end {
            return f32::INFINITY;
        }
        let index = self.waypoint.max(1);
        let (Some(start), Some(end)) = (path.get(index - 1), path.get(index)) else {
            return 0.0;
        };
        let segment = *end - *start;
        let length_sq = segment.length_squared();
        let fraction = if length_sq <= 0.0 {
            0.0
        } else {
            ((self.position - *start).dot(segment) / length_sq).clamp(0.0, 1.0)
        };
        (index - 1) as f32 + fraction
    }

    pub(crate) fn tick_cloak(&mut self, dt: f32) {
        if let Some(state) = self.cloak.as_mut() {
            state.advance(dt);
        }
    }

    /// Accumulates time toward the next heal pulse, returning the aura when
    /// a pulse is due.
    pub(crate) fn heal_pulse(&mut self, dt: f32) -> Option<HealAura> {
        let aura = self.kind.heal_aura()?;
        self.heal_elapsed += dt;
        if self.heal_elapsed < aura.interval {
            return None;
        }
        self.heal_elapsed -= aura.interval;
        Some(aura)
    }

    pub(crate) fn snapshot(&self, path: &[Vec2]) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            radius: self.radius,
            health: self.health,
            max_health: self.max_health,
            shield: self.shield,
            speed: self.speed,
            progress: self.path_progress(path),
            visible: self.is_visible(),
            statuses: self.effects.kinds().collect(),
        }
    }
}
