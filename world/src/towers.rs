//! Authoritative tower state: derived stats, timers, upgrades, evolutions.

use std::collections::BTreeMap;

use crystal_defence_core::{
    BaseStats, Element, EnemyId, EvolutionForm, EvolutionMultipliers, EvolvedAbility,
    SpecialAbility, TargetingRule, TowerId, TowerSnapshot, UpgradeLevels, UpgradeTrack,
};
use glam::Vec2;

const LIGHT_PROJECTILE_SPEED_BONUS: f32 = 1.1;

/// Timers driving a tower's passive abilities.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PassiveTimers {
    /// Seconds until the elemental passive may activate again.
    pub(crate) cooldown: f32,
    /// Seconds the current activation keeps running.
    pub(crate) active: f32,
    /// Centre of the current activation.
    pub(crate) center: Vec2,
    /// Radius of the current activation.
    pub(crate) radius: f32,
    /// Accumulated time toward the next gold payout.
    pub(crate) gold: f32,
    /// Accumulated time toward the next life restoration.
    pub(crate) lives: f32,
    /// Accumulated time toward the next evolved pulse.
    pub(crate) evolved: f32,
    /// Accumulated time toward the next ward refresh.
    pub(crate) ward: f32,
}

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    pub(crate) id: TowerId,
    pub(crate) element: Element,
    pub(crate) position: Vec2,
    base: BaseStats,
    stats: BaseStats,
    stats_dirty: bool,
    pub(crate) upgrades: UpgradeLevels,
    pub(crate) kills: u32,
    pub(crate) evolution: Option<EvolutionForm>,
    pub(crate) cooldown_remaining: f32,
    pub(crate) target: Option<EnemyId>,
    pub(crate) lock_remaining: f32,
    pub(crate) targeting_override: Option<TargetingRule>,
    damage_buff: f32,
    weather_multiplier: f32,
    acceleration: f32,
    pub(crate) passive: PassiveTimers,
}

impl Tower {
    pub(crate) fn new(id: TowerId, element: Element, position: Vec2) -> Self {
        let base = element.base_stats();
        Self {
            id,
            element,
            position,
            base,
            stats: base,
            stats_dirty: true,
            upgrades: UpgradeLevels::default(),
            kills: 0,
            evolution: None,
            cooldown_remaining: 0.0,
            target: None,
            lock_remaining: 0.0,
            targeting_override: None,
            damage_buff: 1.0,
            weather_multiplier: 1.0,
            acceleration: 0.0,
            passive: PassiveTimers::default(),
        }
    }

    /// Effective stats. Callers refresh dirty towers before reading.
    pub(crate) fn stats(&self) -> BaseStats {
        debug_assert!(!self.stats_dirty, "tower stats read while dirty");
        self.stats
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.stats_dirty
    }

    /// Recomputes derived stats from base stats and every modifier source.
    pub(crate) fn refresh_stats(&mut self) {
        if !self.stats_dirty {
            return;
        }
        let evolution = self
            .evolution
            .map_or(EvolutionMultipliers::IDENTITY, EvolutionForm::multipliers);
        let speed_bonus = if self.element == Element::Light {
            LIGHT_PROJECTILE_SPEED_BONUS
        } else {
            1.0
        };

        self.stats = BaseStats {
            range: self.base.range
                * UpgradeTrack::Range.multiplier(self.upgrades.range)
                * evolution.range,
            damage: self.base.damage
                * UpgradeTrack::Damage.multiplier(self.upgrades.damage)
                * evolution.damage
                * self.damage_buff
                * self.weather_multiplier,
            cooldown: self.base.cooldown
                * UpgradeTrack::Speed.multiplier(self.upgrades.speed)
                * evolution.cooldown,
            projectile_speed: self.base.projectile_speed * speed_bonus,
        };
        self.stats_dirty = false;
    }

    pub(crate) fn level(&self) -> u32 {
        self.upgrades.tower_level()
    }

    pub(crate) fn special_level(&self) -> u8 {
        self.upgrades.special
    }

    pub(crate) fn lock_duration(&self) -> f32 {
        1.0 + 0.5 * self.level() as f32
    }

    pub(crate) fn targeting(&self) -> TargetingRule {
        self.targeting_override
            .unwrap_or_else(|| self.element.targeting())
    }

    pub(crate) fn evolved_ability(&self) -> Option<EvolvedAbility> {
        self.evolution.map(EvolutionForm::ability)
    }

    /// Projectile effect for the tower's element, special level, and form.
    pub(crate) fn special(&self) -> SpecialAbility {
        match self.evolved_ability() {
            Some(EvolvedAbility::SuperChain { targets, falloff }) => SpecialAbility::Chain {
                chance: 1.0,
                targets,
                falloff,
            },
            _ => self.element.special().scaled(self.upgrades.special),
        }
    }

    pub(crate) fn set_damage_buff(&mut self, buff: f32) {
        if (self.damage_buff - buff).abs() > f32::EPSILON {
            self.damage_buff = buff;
            self.stats_dirty = true;
        }
    }

    pub(crate) fn set_weather_multiplier(&mut self, multiplier: f32) {
        if (self.weather_multiplier - multiplier).abs() > f32::EPSILON {
            self.weather_multiplier = multiplier;
            self.stats_dirty = true;
        }
    }

    /// Raises a track, returning the new level or `None` when maxed.
    pub(crate) fn upgrade(&mut self, track: UpgradeTrack) -> Option<u8> {
        let level = self.upgrades.raise(track)?;
        self.stats_dirty = true;
        Some(level)
    }

    pub(crate) fn evolve(&mut self, form: EvolutionForm) {
        self.evolution = Some(form);
        self.stats_dirty = true;
    }

    /// Reinstates progress captured from an earlier session.
    pub(crate) fn restore(
        &mut self,
        upgrades: UpgradeLevels,
        kills: u32,
        evolution: Option<EvolutionForm>,
    ) {
        self.upgrades = upgrades;
        self.kills = kills;
        self.evolution = evolution;
        self.stats_dirty = true;
    }

    pub(crate) fn tick_timers(&mut self, dt: f32) {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        self.lock_remaining = (self.lock_remaining - dt).max(0.0);
    }

    /// Replaces the current target; a new lock lasts longer on higher levels.
    pub(crate) fn assign_target(&mut self, target: Option<EnemyId>) -> bool {
        let changed = self.target != target;
        if changed {
            self.acceleration = 0.0;
        }
        self.target = target;
        self.lock_remaining = if target.is_some() {
            self.lock_duration()
        } else {
            0.0
        };
        changed
    }

    /// Restarts the cooldown after a shot.
    pub(crate) fn start_cooldown(&mut self) {
        self.cooldown_remaining = self.stats().cooldown * (1.0 - self.acceleration);
        if let Some(EvolvedAbility::Accelerate { max, rate }) = self.evolved_ability() {
            self.acceleration = (self.acceleration + rate).min(max);
        }
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        let stats = self.stats();
        TowerSnapshot {
            id: self.id,
            element: self.element,
            position: self.position,
            range: stats.range,
            damage: stats.damage,
            cooldown: stats.cooldown,
            cooldown_remaining: self.cooldown_remaining,
            target: self.target,
            lock_remaining: self.lock_remaining,
            targeting: self.targeting(),
            targeting_overridden: self.targeting_override.is_some(),
            preference: self.element.preference(),
            detects_cloaked: self.element.detects_cloaked(),
            level: self.level(),
            upgrades: self.upgrades,
            kills: self.kills,
            evolution: self.evolution,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns its identifier.
    pub(crate) fn insert(&mut self, element: Element, position: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let mut tower = Tower::new(id, element, position);
        tower.refresh_stats();
        let _ = self.entries.insert(id, tower);
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<Tower> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn contains(&self, id: TowerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.entries.values_mut()
    }

    /// Recomputes stats of every tower whose modifiers changed.
    pub(crate) fn refresh_dirty(&mut self) {
        for tower in self.entries.values_mut().filter(|tower| tower.is_dirty()) {
            tower.refresh_stats();
        }
    }
}

/// Damage multiplier each tower receives from nearby Life towers.
pub(crate) fn life_buffs(towers: &TowerRegistry, radius: f32) -> Vec<(TowerId, f32)> {
    let sources: Vec<(TowerId, Vec2, u8)> = towers
        .iter()
        .filter(|tower| tower.element == Element::Life)
        .map(|tower| (tower.id, tower.position, tower.special_level()))
        .collect();

    towers
        .iter()
        .map(|tower| {
            let buff = sources
                .iter()
                .filter(|(id, position, _)| {
                    *id != tower.id && position.distance(tower.position) <= radius
                })
                .map(|(_, _, special)| 1.2 + 0.1 * f32::from(*special))
                .product();
            (tower.id, buff)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(Element::Fire, Vec2::new(10.0, 10.0));
        let second = registry.insert(Element::Water, Vec2::new(90.0, 10.0));
        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn derived_stats_multiply_upgrades_and_evolution() {
        let mut tower = Tower::new(TowerId::new(1), Element::Fire, Vec2::ZERO);
        let _ = tower.upgrade(UpgradeTrack::Damage);
        let _ = tower.upgrade(UpgradeTrack::Speed);
        tower.refresh_stats();
        assert!((tower.stats().damage - 25.0).abs() < 1e-4);
        assert!((tower.stats().cooldown - 0.85).abs() < 1e-4);

        tower.evolve(EvolutionForm::Volcano);
        tower.refresh_stats();
        assert!((tower.stats().damage - 32.5).abs() < 1e-4);
        assert!((tower.stats().cooldown - 0.935).abs() < 1e-4);
    }

    #[test]
    fn lock_duration_grows_with_level() {
        let mut tower = Tower::new(TowerId::new(1), Element::Earth, Vec2::ZERO);
        assert!((tower.lock_duration() - 1.5).abs() < f32::EPSILON);
        let _ = tower.upgrade(UpgradeTrack::Range);
        let _ = tower.upgrade(UpgradeTrack::Range);
        assert!((tower.lock_duration() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn lightning_form_guarantees_chains() {
        let mut tower = Tower::new(TowerId::new(1), Element::Air, Vec2::ZERO);
        tower.evolve(EvolutionForm::Lightning);
        assert_eq!(
            tower.special(),
            SpecialAbility::Chain {
                chance: 1.0,
                targets: 5,
                falloff: 0.8,
            }
        );
    }

    #[test]
    fn life_buffs_multiply_and_skip_the_source() {
        let mut registry = TowerRegistry::new();
        let life_a = registry.insert(Element::Life, Vec2::new(0.0, 0.0));
        let life_b = registry.insert(Element::Life, Vec2::new(50.0, 0.0));
        let fire = registry.insert(Element::Fire, Vec2::new(100.0, 0.0));
        let far = registry.insert(Element::Fire, Vec2::new(900.0, 0.0));

        let buffs: BTreeMap<TowerId, f32> = life_buffs(&registry, 200.0).into_iter().collect();
        assert!((buffs[&life_a] - 1.2).abs() < 1e-6);
        assert!((buffs[&life_b] - 1.2).abs() < 1e-6);
        assert!((buffs[&fire] - 1.44).abs() < 1e-5);
        assert!((buffs[&far] - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cyclone_accelerates_until_the_target_changes() {
        let mut tower = Tower::new(TowerId::new(1), Element::Air, Vec2::ZERO);
        tower.evolve(EvolutionForm::Cyclone);
        tower.refresh_stats();
        let _ = tower.assign_target(Some(EnemyId::new(3)));
        tower.start_cooldown();
        let first = tower.cooldown_remaining;
        tower.start_cooldown();
        assert!(tower.cooldown_remaining < first);

        let _ = tower.assign_target(Some(EnemyId::new(4)));
        tower.start_cooldown();
        assert!((tower.cooldown_remaining - first).abs() < 1e-6);
    }
}
