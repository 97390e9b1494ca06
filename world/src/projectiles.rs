//! Projectile flight and impact resolution.

use crystal_defence_core::{
    Element, EnemyId, Event, EvolvedAbility, ProjectileId, ProjectileSnapshot, SpecialAbility,
    StatusKind, TowerId, CHAIN_RADIUS,
};
use glam::Vec2;
use rand::Rng;

use crate::{
    combat::{within, Action},
    enemies::DamageOutcome,
    passives::Hazard,
    status::StatusEffect,
    towers::Tower,
    World,
};

/// Seconds a projectile may fly before it fizzles.
const PROJECTILE_LIFETIME: f32 = 5.0;
const PROJECTILE_RADIUS: f32 = 5.0;
const FOLLOW_UP_RADIUS: f32 = 3.0;
const CHAIN_HOP_DELAY: f32 = 0.1;

const REVEALED_BONUS: f32 = 1.5;

const AIR_WOBBLE_FREQUENCY: f32 = 20.0;
const AIR_WOBBLE_AMPLITUDE: f32 = 0.3;
const WATER_SWAY_FREQUENCY: f32 = 8.0;
const WATER_SWAY_AMPLITUDE: f32 = 0.15;

const FIRE_EXPLOSION_CHANCE: f32 = 0.2;
const FIRE_EXPLOSION_FACTOR: f32 = 0.3;
const WATER_SPLASH_RADIUS: f32 = 40.0;

/// Elements whose effects a prismatic projectile may borrow.
const PRISMATIC_ELEMENTS: [Element; 5] = [
    Element::Fire,
    Element::Water,
    Element::Earth,
    Element::Darkness,
    Element::Light,
];

/// Outcome of moving a projectile for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    /// Still waiting out the launch delay.
    Waiting,
    /// Moving toward the target.
    Flying,
    /// Collided with the target.
    Hit,
    /// Exceeded its lifetime.
    Expired,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) source: Option<TowerId>,
    pub(crate) element: Element,
    pub(crate) position: Vec2,
    pub(crate) target: EnemyId,
    pub(crate) damage: f32,
    speed: f32,
    radius: f32,
    special: SpecialAbility,
    evolved: Option<EvolvedAbility>,
    special_level: u8,
    tower_level: u32,
    pub(crate) hop: u32,
    delay: f32,
    age: f32,
    can_chain: bool,
}

impl Projectile {
    /// Primary projectile fired by a tower.
    pub(crate) fn launch(id: ProjectileId, tower: &Tower, target: EnemyId) -> Self {
        let stats = tower.stats();
        Self {
            id,
            source: Some(tower.id),
            element: tower.element,
            position: tower.position,
            target,
            damage: stats.damage,
            speed: stats.projectile_speed,
            radius: PROJECTILE_RADIUS,
            special: tower.special(),
            evolved: tower.evolved_ability(),
            special_level: tower.upgrades.special,
            tower_level: tower.level(),
            hop: 0,
            delay: 0.0,
            age: 0.0,
            can_chain: true,
        }
    }

    /// Plain projectile spawned by an impact; it never chains and carries no
    /// evolved ability.
    fn follow_up(&self, id: ProjectileId, target: EnemyId, damage: f32, hop: u32) -> Self {
        Self {
            id,
            source: self.source,
            element: self.element,
            position: self.position,
            target,
            damage,
            speed: self.speed,
            radius: FOLLOW_UP_RADIUS,
            special: SpecialAbility::None,
            evolved: None,
            special_level: 0,
            tower_level: self.tower_level,
            hop,
            delay: CHAIN_HOP_DELAY * hop as f32,
            age: 0.0,
            can_chain: false,
        }
    }

    /// Moves the projectile toward `target` for `dt` seconds.
    pub(crate) fn advance(&mut self, dt: f32, target: Vec2, target_radius: f32) -> Flight {
        if self.delay > 0.0 {
            self.delay -= dt;
            if self.delay > 0.0 {
                return Flight::Waiting;
            }
        }

        self.age += dt;
        if self.age >= PROJECTILE_LIFETIME {
            return Flight::Expired;
        }

        let reach = self.radius + target_radius;
        let offset = target - self.position;
        let distance = offset.length();
        if distance < reach {
            return Flight::Hit;
        }

        let heading = self.perturb(offset / distance);
        self.position += heading * (self.speed * dt).min(distance);
        if self.position.distance(target) < reach {
            Flight::Hit
        } else {
            Flight::Flying
        }
    }

    fn perturb(&self, heading: Vec2) -> Vec2 {
        let sway = match self.element {
            Element::Air => (self.age * AIR_WOBBLE_FREQUENCY).sin() * AIR_WOBBLE_AMPLITUDE,
            Element::Water => (self.age * WATER_SWAY_FREQUENCY).sin() * WATER_SWAY_AMPLITUDE,
            _ => return heading,
        };
        (heading + heading.perp() * sway).normalize_or_zero()
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            element: self.element,
            target: self.target,
            damage: self.damage,
            hop: self.hop,
            pending: self.delay > 0.0,
        }
    }
}

impl World {
    /// Moves every projectile and resolves impacts. Follow-up projectiles
    /// join the flight list once the pass finishes.
    pub(crate) fn advance_projectiles(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let projectiles = std::mem::take(&mut self.projectiles);
        let mut in_flight = Vec::with_capacity(projectiles.len());
        let mut spawned = Vec::new();

        for mut projectile in projectiles {
            let Some(index) = self.enemy_index(projectile.target) else {
                continue;
            };
            let enemy = &self.enemies[index];
            if enemy.is_dead() {
                continue;
            }
            match projectile.advance(dt, enemy.position, enemy.radius) {
                Flight::Hit => self.resolve_impact(&projectile, index, &mut spawned, out_events),
                Flight::Expired => {}
                Flight::Waiting | Flight::Flying => in_flight.push(projectile),
            }
        }

        in_flight.extend(spawned);
        self.projectiles = in_flight;
    }

    fn resolve_impact(
        &mut self,
        projectile: &Projectile,
        index: usize,
        spawned: &mut Vec<Projectile>,
        out_events: &mut Vec<Event>,
    ) {
        let target = self.enemies[index].id;
        let impact = self.enemies[index].position;

        let mut damage = projectile.damage;
        if projectile.element == Element::Light && self.enemies[index].is_revealed() {
            damage *= match projectile.evolved {
                Some(EvolvedAbility::Sunfire { factor }) => factor,
                _ => REVEALED_BONUS,
            };
        }

        let dealt = match self.damage_enemy(index, damage, projectile.source, true, out_events) {
            DamageOutcome::Evaded => return,
            DamageOutcome::Applied(amount) => amount,
        };
        out_events.push(Event::ProjectileImpact {
            projectile: projectile.id,
            enemy: target,
            damage: dealt,
        });

        let special = projectile.special;
        if special.chance() > 0.0 && self.rng.gen::<f32>() < special.chance() {
            match special {
                SpecialAbility::Chain {
                    targets, falloff, ..
                } if projectile.can_chain => {
                    self.schedule_chain(projectile, index, targets, falloff, spawned, out_events);
                }
                SpecialAbility::Chain { .. } => {}
                other => self.apply_special(index, other, projectile.source, out_events),
            }
        }

        self.element_on_hit(projectile, index, impact, out_events);
        if let Some(ability) = projectile.evolved {
            self.evolved_on_hit(projectile, ability, index, impact, spawned, out_events);
        }
    }

    /// Attaches the status effect carried by a non-chain special ability.
    fn apply_special(
        &mut self,
        index: usize,
        special: SpecialAbility,
        source: Option<TowerId>,
        out_events: &mut Vec<Event>,
    ) {
        let (kind, effect) = match special {
            SpecialAbility::None | SpecialAbility::Chain { .. } => return,
            SpecialAbility::Burn {
                duration,
                damage_per_second,
                ..
            } => (StatusKind::Burn, StatusEffect::timed(duration, damage_per_second)),
            SpecialAbility::Slow {
                duration,
                multiplier,
                ..
            } => (StatusKind::Slow, StatusEffect::timed(duration, multiplier)),
            SpecialAbility::Stun { duration, .. } => {
                (StatusKind::Stun, StatusEffect::timed(duration, 1.0))
            }
            SpecialAbility::Weaken {
                duration,
                multiplier,
                ..
            } => (StatusKind::Weaken, StatusEffect::timed(duration, multiplier)),
            SpecialAbility::Reveal { duration, .. } => {
                (StatusKind::Reveal, StatusEffect::timed(duration, 1.0))
            }
        };
        self.apply_status(index, kind, effect.from_source(source), out_events);
    }

    /// Nearest visible enemies around `index`, ordered by distance then id.
    fn neighbours(&self, index: usize, radius: f32, limit: usize) -> Vec<EnemyId> {
        let origin = &self.enemies[index];
        let mut candidates: Vec<(f32, EnemyId)> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.id != origin.id && !enemy.is_dead() && enemy.is_visible())
            .filter(|enemy| within(enemy.position, origin.position, radius))
            .map(|enemy| (enemy.position.distance(origin.position), enemy.id))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        candidates.into_iter().take(limit).map(|(_, id)| id).collect()
    }

    fn schedule_chain(
        &mut self,
        projectile: &Projectile,
        index: usize,
        targets: u32,
        falloff: f32,
        spawned: &mut Vec<Projectile>,
        out_events: &mut Vec<Event>,
    ) {
        let origin = self.enemies[index].id;
        let position = self.enemies[index].position;
        for (offset, target) in self
            .neighbours(index, CHAIN_RADIUS, targets as usize)
            .into_iter()
            .enumerate()
        {
            let hop = offset as u32 + 1;
            let damage = projectile.damage * falloff.powi(hop as i32);
            let id = self.allocate_projectile_id();
            let mut follow_up = projectile.follow_up(id, target, damage, hop);
            follow_up.position = position;
            spawned.push(follow_up);
            out_events.push(Event::ChainScheduled {
                origin,
                target,
                hop,
                damage,
            });
        }
    }

    /// Element passives that trigger on impact.
    fn element_on_hit(
        &mut self,
        projectile: &Projectile,
        index: usize,
        impact: Vec2,
        out_events: &mut Vec<Event>,
    ) {
        let special = projectile.special_level;
        match projectile.element {
            Element::Fire if special >= 1 => {
                if self.rng.gen::<f32>() < FIRE_EXPLOSION_CHANCE {
                    self.perform(
                        Action::AreaDamage {
                            center: impact,
                            radius: 30.0 + 5.0 * projectile.tower_level as f32,
                            damage: projectile.damage * FIRE_EXPLOSION_FACTOR,
                            source: projectile.source,
                            exclude: Some(projectile.target),
                        },
                        out_events,
                    );
                }
            }
            Element::Water if special >= 2 => {
                if let SpecialAbility::Slow {
                    duration,
                    multiplier,
                    ..
                } = projectile.special
                {
                    self.perform(
                        Action::AreaStatus {
                            center: impact,
                            radius: WATER_SPLASH_RADIUS,
                            kind: StatusKind::Slow,
                            effect: StatusEffect::timed(duration, multiplier),
                        },
                        out_events,
                    );
                }
            }
            Element::Darkness if special >= 1 => {
                let level = f32::from(special);
                if self.rng.gen::<f32>() < 0.3 + 0.1 * level {
                    let effect = StatusEffect::timed(5.0 + level, 1.2 + 0.1 * level);
                    self.apply_status(index, StatusKind::Mark, effect, out_events);
                }
            }
            _ => {}
        }
    }

    fn evolved_on_hit(
        &mut self,
        projectile: &Projectile,
        ability: EvolvedAbility,
        index: usize,
        impact: Vec2,
        spawned: &mut Vec<Projectile>,
        out_events: &mut Vec<Event>,
    ) {
        let source = projectile.source;
        match ability {
            EvolvedAbility::Impact { radius, damage } => self.perform(
                Action::AreaDamage {
                    center: impact,
                    radius,
                    damage,
                    source,
                    exclude: Some(projectile.target),
                },
                out_events,
            ),
            EvolvedAbility::Multishot {
                burn_damage_per_second,
                burn_duration,
                ..
            } => {
                let effect =
                    StatusEffect::timed(burn_duration, burn_damage_per_second).from_source(source);
                self.apply_status(index, StatusKind::Burn, effect, out_events);
            }
            EvolvedAbility::Freeze { chance, duration } => {
                if self.rng.gen::<f32>() < chance {
                    let effect = StatusEffect::timed(duration, 1.0);
                    self.apply_status(index, StatusKind::Freeze, effect, out_events);
                }
            }
            EvolvedAbility::Push { distance, radius } => {
                for enemy in self
                    .enemies
                    .iter_mut()
                    .filter(|enemy| !enemy.is_dead() && within(enemy.position, impact, radius))
                {
                    enemy.knock_back(distance, &self.path);
                }
            }
            EvolvedAbility::Spin { duration, radius } => self.perform(
                Action::AreaStatus {
                    center: impact,
                    radius,
                    kind: StatusKind::Spin,
                    effect: StatusEffect::timed(duration, 1.0).anchored(impact, radius),
                },
                out_events,
            ),
            EvolvedAbility::Knockback { distance } => {
                self.enemies[index].knock_back(distance, &self.path);
            }
            EvolvedAbility::Shatter {
                shards,
                damage,
                range,
            } => {
                for target in self.neighbours(index, range, shards as usize) {
                    let id = self.allocate_projectile_id();
                    let mut shard = projectile.follow_up(id, target, damage, 1);
                    shard.position = impact;
                    shard.delay = 0.0;
                    spawned.push(shard);
                }
            }
            EvolvedAbility::BlackHole {
                radius,
                damage_per_second,
                duration,
            } => self.hazards.push(Hazard {
                center: impact,
                radius,
                remaining: duration,
                damage_per_second,
                source,
            }),
            EvolvedAbility::Curse {
                multiplier,
                duration,
            } => {
                let effect = StatusEffect::timed(duration, multiplier);
                self.apply_status(index, StatusKind::Curse, effect, out_events);
            }
            EvolvedAbility::Execute { threshold } => {
                let enemy = &mut self.enemies[index];
                if !enemy.is_dead() && enemy.health < enemy.max_health * threshold {
                    enemy.execute(source);
                }
            }
            EvolvedAbility::Prismatic { chance } => {
                if self.rng.gen::<f32>() < chance {
                    let pick = self.rng.gen_range(0..PRISMATIC_ELEMENTS.len());
                    let element = PRISMATIC_ELEMENTS[pick];
                    self.apply_special(index, element.special(), source, out_events);
                }
            }
            EvolvedAbility::Plant {
                targets,
                damage_per_second,
                duration,
            } => {
                let effect = StatusEffect::timed(duration, damage_per_second).from_source(source);
                self.apply_status(index, StatusKind::Poison, effect, out_events);
                let others = targets.saturating_sub(1) as usize;
                for neighbour in self.neighbours(index, CHAIN_RADIUS, others) {
                    if let Some(other) = self.enemy_index(neighbour) {
                        self.apply_status(other, StatusKind::Poison, effect, out_events);
                    }
                }
            }
            EvolvedAbility::Transform {
                chance,
                health_factor,
            } => {
                if self.rng.gen::<f32>() < chance {
                    self.enemies[index].wither(health_factor);
                }
            }
            EvolvedAbility::Eruption { .. }
            | EvolvedAbility::Whirlpool { .. }
            | EvolvedAbility::SuperChain { .. }
            | EvolvedAbility::Accelerate { .. }
            | EvolvedAbility::Summon { .. }
            | EvolvedAbility::Sunfire { .. }
            | EvolvedAbility::Pulse { .. }
            | EvolvedAbility::Sanctuary { .. } => {}
        }
    }
}
