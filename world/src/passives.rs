//! Element passives, evolved periodic abilities, and lingering hazards.

use crystal_defence_core::{Element, Event, EvolvedAbility, StatusKind, TowerId};
use glam::Vec2;
use rand::Rng;

use crate::{
    combat::{within, Action},
    enemies::Enemy,
    status::StatusEffect,
    towers::{PassiveTimers, Tower},
    World,
};

/// Radius of the damage aura around Life towers.
pub(crate) const LIFE_AURA_RADIUS: f32 = 200.0;

/// Lifetime of aura statuses; sources refresh them every tick they persist.
const AURA_REFRESH: f32 = 0.25;

const FIELD_SLOW: f32 = 0.7;
const SHADOW_PERIOD: f32 = 6.0;
const SHADOW_DURATION: f32 = 2.0;
const ERUPTION_STUN: f32 = 0.5;
const PULSE_REVEAL: f32 = 1.0;

/// Damage zone left behind by a black hole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Hazard {
    pub(crate) center: Vec2,
    pub(crate) radius: f32,
    pub(crate) remaining: f32,
    pub(crate) damage_per_second: f32,
    pub(crate) source: Option<TowerId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Started,
    Running,
}

impl PassiveTimers {
    /// Runs an activation or counts down toward the next one. `trigger`
    /// carries the centre and radius to use if the passive fires now.
    fn cycle(
        &mut self,
        dt: f32,
        trigger: Option<(Vec2, f32)>,
        duration: f32,
        cooldown: f32,
    ) -> Phase {
        if self.active > 0.0 {
            self.active -= dt;
            return Phase::Running;
        }
        self.cooldown = (self.cooldown - dt).max(0.0);
        match trigger {
            Some((center, radius)) if self.cooldown <= 0.0 => {
                self.active = duration;
                self.cooldown = cooldown;
                self.center = center;
                self.radius = radius;
                Phase::Started
            }
            _ => Phase::Idle,
        }
    }
}

fn any_within(enemies: &[Enemy], center: Vec2, radius: f32) -> bool {
    enemies
        .iter()
        .any(|enemy| !enemy.is_dead() && within(enemy.position, center, radius))
}

fn target_position(tower: &Tower, enemies: &[Enemy]) -> Option<Vec2> {
    let target = tower.target?;
    let index = enemies.binary_search_by_key(&target, |enemy| enemy.id).ok()?;
    let enemy = &enemies[index];
    (!enemy.is_dead()).then_some(enemy.position)
}

fn aura(center: Vec2, radius: f32, kind: StatusKind, magnitude: f32) -> Action {
    let mut effect = StatusEffect::timed(AURA_REFRESH, magnitude);
    if matches!(kind, StatusKind::Vortex | StatusKind::Spin) {
        effect = effect.anchored(center, radius);
    }
    Action::AreaStatus {
        center,
        radius,
        kind,
        effect,
    }
}

fn element_passive(
    tower: &mut Tower,
    dt: f32,
    enemies: &[Enemy],
    actions: &mut Vec<Action>,
    activated: &mut Vec<(TowerId, Element)>,
) {
    let special = tower.upgrades.special;
    let level = f32::from(special);
    let stats = tower.stats();

    let phase = match tower.element {
        Element::Water if special >= 1 => {
            let radius = stats.range * 0.6;
            let trigger = any_within(enemies, tower.position, radius)
                .then_some((tower.position, radius));
            tower
                .passive
                .cycle(dt, trigger, 2.0 + 0.5 * level, (5.0 - 0.5 * level).max(2.0))
        }
        Element::Air if special >= 1 => {
            let trigger =
                target_position(tower, enemies).map(|center| (center, 30.0 + 10.0 * level));
            tower
                .passive
                .cycle(dt, trigger, 3.0 + 0.5 * level, (10.0 - level).max(3.0))
        }
        Element::Earth if special >= 1 => {
            let trigger =
                target_position(tower, enemies).map(|center| (center, 40.0 + 10.0 * level));
            tower
                .passive
                .cycle(dt, trigger, 3.0 + 0.5 * level, (8.0 - level).max(3.0))
        }
        Element::Darkness if special >= 3 => {
            let radius = stats.range * 0.5;
            let trigger = any_within(enemies, tower.position, radius)
                .then_some((tower.position, radius));
            tower
                .passive
                .cycle(dt, trigger, SHADOW_DURATION, SHADOW_PERIOD - SHADOW_DURATION)
        }
        Element::Light => {
            tower.passive.cooldown = (tower.passive.cooldown - dt).max(0.0);
            actions.push(aura(
                tower.position,
                stats.range * (0.8 + 0.05 * level),
                StatusKind::Reveal,
                1.0,
            ));
            Phase::Idle
        }
        Element::Life => {
            if special >= 2 {
                tower.passive.gold += dt;
                let interval = (15.0 - 2.0 * level).max(5.0);
                if tower.passive.gold >= interval {
                    tower.passive.gold -= interval;
                    actions.push(Action::Gold {
                        tower: tower.id,
                        amount: 5 + 3 * u32::from(special - 2),
                    });
                }
            }
            if special >= 3 {
                tower.passive.lives += dt;
                let interval = (25.0 - 3.0 * level).max(10.0);
                if tower.passive.lives >= interval {
                    tower.passive.lives -= interval;
                    actions.push(Action::Lives { amount: 1 });
                }
            }
            Phase::Idle
        }
        _ => Phase::Idle,
    };

    if phase == Phase::Idle {
        return;
    }
    if phase == Phase::Started {
        activated.push((tower.id, tower.element));
    }

    let center = tower.passive.center;
    let radius = tower.passive.radius;
    match tower.element {
        Element::Water => {
            actions.push(aura(center, radius, StatusKind::Vortex, 1.0));
            actions.push(aura(center, radius, StatusKind::Slow, FIELD_SLOW));
        }
        Element::Air => {
            let slow = if special >= 3 { 0.7 } else { 0.8 };
            actions.push(aura(center, radius, StatusKind::Spin, 1.0));
            actions.push(aura(center, radius, StatusKind::Slow, slow));
        }
        Element::Earth => {
            actions.push(Action::AreaDamage {
                center,
                radius,
                damage: 0.5 * stats.damage * dt,
                source: Some(tower.id),
                exclude: None,
            });
            actions.push(aura(center, radius, StatusKind::Slow, FIELD_SLOW));
            if phase == Phase::Started && special >= 3 {
                actions.push(Action::AreaStatus {
                    center,
                    radius,
                    kind: StatusKind::Stun,
                    effect: StatusEffect::timed(ERUPTION_STUN, 1.0),
                });
            }
        }
        Element::Darkness => {
            actions.push(aura(center, radius, StatusKind::Vortex, 1.0));
            actions.push(aura(center, radius, StatusKind::Mark, 1.2 + 0.1 * level));
        }
        _ => {}
    }
}

fn evolved_passive(
    tower: &mut Tower,
    dt: f32,
    enemies: &[Enemy],
    path: &[Vec2],
    actions: &mut Vec<Action>,
) {
    let Some(ability) = tower.evolved_ability() else {
        return;
    };
    let range = tower.stats().range;
    let timers = &mut tower.passive;

    match ability {
        EvolvedAbility::Eruption {
            radius,
            damage,
            interval,
        } => {
            timers.evolved += dt;
            while timers.evolved >= interval {
                timers.evolved -= interval;
                actions.push(Action::AreaDamage {
                    center: tower.position,
                    radius,
                    damage,
                    source: Some(tower.id),
                    exclude: None,
                });
            }
        }
        EvolvedAbility::Whirlpool { radius, strength } => {
            actions.push(aura(tower.position, radius, StatusKind::Vortex, 1.0));
            actions.push(aura(
                tower.position,
                radius,
                StatusKind::Slow,
                1.0 - strength / 100.0,
            ));
        }
        EvolvedAbility::Summon {
            interval,
            damage,
            stun,
        } => {
            timers.evolved = (timers.evolved + dt).min(interval);
            if timers.evolved < interval {
                return;
            }
            let lead = enemies
                .iter()
                .filter(|enemy| !enemy.is_dead() && within(enemy.position, tower.position, range))
                .max_by(|a, b| {
                    a.path_progress(path)
                        .total_cmp(&b.path_progress(path))
                        .then(b.id.cmp(&a.id))
                });
            if let Some(lead) = lead {
                timers.evolved = 0.0;
                actions.push(Action::Strike {
                    enemy: lead.id,
                    damage,
                    source: Some(tower.id),
                    stun,
                });
            }
        }
        EvolvedAbility::Pulse { damage, interval } => {
            timers.evolved += dt;
            while timers.evolved >= interval {
                timers.evolved -= interval;
                actions.push(Action::AreaDamage {
                    center: tower.position,
                    radius: range,
                    damage,
                    source: Some(tower.id),
                    exclude: None,
                });
                actions.push(Action::AreaStatus {
                    center: tower.position,
                    radius: range,
                    kind: StatusKind::Reveal,
                    effect: StatusEffect::timed(PULSE_REVEAL, 1.0),
                });
            }
        }
        EvolvedAbility::Sanctuary {
            ward,
            ward_interval,
            heal_interval,
        } => {
            timers.ward += dt;
            if timers.ward >= ward_interval {
                timers.ward -= ward_interval;
                actions.push(Action::Ward { charges: ward });
            }
            timers.evolved += dt;
            if timers.evolved >= heal_interval {
                timers.evolved -= heal_interval;
                actions.push(Action::Lives { amount: 1 });
            }
        }
        _ => {}
    }
}

impl World {
    /// Ticks every tower passive and applies the resulting effects.
    pub(crate) fn run_passives(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let mut actions = Vec::new();
        let mut activated = Vec::new();
        for tower in self.towers.iter_mut() {
            element_passive(tower, dt, &self.enemies, &mut actions, &mut activated);
            evolved_passive(tower, dt, &self.enemies, &self.path, &mut actions);
        }

        for (tower, element) in activated {
            out_events.push(Event::PassiveActivated { tower, element });
        }
        for action in actions {
            self.perform(action, out_events);
        }
    }

    /// Light towers with special level 2 or more may release a burst when
    /// they fire.
    pub(crate) fn light_burst(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(light) = self.towers.get_mut(tower) else {
            return;
        };
        let special = light.upgrades.special;
        if light.element != Element::Light || special < 2 || light.passive.cooldown > 0.0 {
            return;
        }
        let over = f32::from(special - 2);
        if self.rng.gen::<f32>() >= 0.2 + 0.1 * over {
            return;
        }

        let stats = light.stats();
        light.passive.cooldown = (5.0 - 0.5 * over).max(2.0);
        let action = Action::AreaDamage {
            center: light.position,
            radius: stats.range * 0.6,
            damage: stats.damage * (0.3 + 0.1 * over),
            source: Some(tower),
            exclude: None,
        };
        out_events.push(Event::PassiveActivated {
            tower,
            element: Element::Light,
        });
        self.perform(action, out_events);
    }

    /// Damages and pulls enemies inside black holes, dropping expired ones.
    pub(crate) fn tick_hazards(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let mut actions = Vec::new();
        for hazard in &mut self.hazards {
            let active = hazard.remaining.min(dt).max(0.0);
            hazard.remaining -= dt;
            actions.push(Action::AreaDamage {
                center: hazard.center,
                radius: hazard.radius,
                damage: hazard.damage_per_second * active,
                source: hazard.source,
                exclude: None,
            });
            actions.push(aura(hazard.center, hazard.radius, StatusKind::Vortex, 1.0));
        }
        self.hazards.retain(|hazard| hazard.remaining > 0.0);

        for action in actions {
            self.perform(action, out_events);
        }
    }
}
