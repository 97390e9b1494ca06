#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Crystal Defence.

mod combat;
mod enemies;
mod passives;
mod projectiles;
pub mod status;
mod synergy;
mod towers;
mod weather;

use std::time::Duration;

use crystal_defence_core::{
    sell_refund, Command, Element, EnemyId, EnemyKind, Event, EvolutionError, EvolutionForm,
    EvolvedAbility, PlacementError, ProjectileId, StatusKind, TowerId, UpgradeError,
    UpgradeLevels, UpgradeTrack, WaveConfig, EVOLUTION_KILL_THRESHOLD, EVOLUTION_LEVEL_THRESHOLD,
    PLACEMENT_CLEARANCE,
};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{
    combat::{distance_to_segment, within, Action},
    enemies::{DamageOutcome, Enemy},
    passives::{Hazard, LIFE_AURA_RADIUS},
    projectiles::Projectile,
    status::StatusEffect,
    synergy::SynergyRegistry,
    towers::{life_buffs, TowerRegistry},
    weather::WeatherState,
};

/// Static parameters a world is created with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    /// Width of the playing field in world units.
    pub width: f32,
    /// Height of the playing field in world units.
    pub height: f32,
    /// Money available before the first placement.
    pub starting_money: u32,
    /// Lives available at the start; also caps regeneration.
    pub starting_lives: u32,
    /// Seed of the world's random source.
    pub seed: u64,
    /// Whether weather rotates during play.
    pub weather_enabled: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            starting_money: 150,
            starting_lives: 10,
            seed: 7,
            weather_enabled: true,
        }
    }
}

/// Player resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Economy {
    /// Money available for placements and upgrades.
    pub money: u32,
    /// Escapes the player can still afford.
    pub lives: u32,
    /// Accumulated kill rewards.
    pub score: u32,
    /// Escapes absorbed without losing a life.
    pub ward: u32,
}

/// Persistent description of a tower, sufficient to rebuild it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerRecord {
    /// Element of the tower.
    pub element: Element,
    /// Position in world units.
    pub position: Vec2,
    /// Purchased upgrade levels.
    pub upgrades: UpgradeLevels,
    /// Kills credited to the tower.
    pub kills: u32,
    /// Evolved form, if any.
    pub evolution: Option<EvolutionForm>,
}

/// Represents the authoritative Crystal Defence world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    path: Vec<Vec2>,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    hazards: Vec<Hazard>,
    synergies: SynergyRegistry,
    weather: WeatherState,
    economy: Economy,
    rng: ChaCha8Rng,
    next_enemy_id: EnemyId,
    next_projectile_id: ProjectileId,
    wave: u32,
    wave_active: bool,
    wave_bonus: u32,
    game_over: bool,
}

impl World {
    /// Creates an empty world along the provided path, expressed in world
    /// units.
    #[must_use]
    pub fn new(config: WorldConfig, path: Vec<Vec2>) -> Self {
        Self {
            config,
            path,
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            hazards: Vec::new(),
            synergies: SynergyRegistry::new(),
            weather: WeatherState::new(config.weather_enabled),
            economy: Economy {
                money: config.starting_money,
                lives: config.starting_lives,
                score: 0,
                ward: 0,
            },
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_enemy_id: EnemyId::new(0),
            next_projectile_id: ProjectileId::new(0),
            wave: 0,
            wave_active: false,
            wave_bonus: 0,
            game_over: false,
        }
    }

    /// Rebuilds a world between waves from persisted progress.
    #[must_use]
    pub fn restore(
        config: WorldConfig,
        path: Vec<Vec2>,
        economy: Economy,
        wave: u32,
        towers: &[TowerRecord],
    ) -> Self {
        let mut world = Self::new(config, path);
        world.economy = economy;
        world.wave = wave;
        world.game_over = economy.lives == 0;
        for record in towers {
            let id = world.towers.insert(record.element, record.position);
            if let Some(tower) = world.towers.get_mut(id) {
                tower.restore(record.upgrades, record.kills, record.evolution);
            }
        }
        world.refresh_modifiers(&mut Vec::new());
        world
    }

    fn enemy_index(&self, id: EnemyId) -> Option<usize> {
        self.enemies
            .binary_search_by_key(&id, |enemy| enemy.id)
            .ok()
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        id
    }

    /// Routes damage through the enemy's resolution pipeline. Only projectile
    /// hits are `evadable`.
    fn damage_enemy(
        &mut self,
        index: usize,
        amount: f32,
        source: Option<TowerId>,
        evadable: bool,
        out_events: &mut Vec<Event>,
    ) -> DamageOutcome {
        let roll = if evadable && self.enemies[index].effects.contains(StatusKind::Evasion) {
            self.rng.gen::<f32>()
        } else {
            1.0
        };

        let enemy = &mut self.enemies[index];
        let outcome = enemy.take_damage(amount, source, roll);
        match outcome {
            DamageOutcome::Evaded => out_events.push(Event::HitEvaded { enemy: enemy.id }),
            DamageOutcome::Applied(dealt) if dealt > 0.0 => out_events.push(Event::EnemyDamaged {
                enemy: enemy.id,
                amount: dealt,
                source,
            }),
            DamageOutcome::Applied(_) => {}
        }
        outcome
    }

    fn apply_status(
        &mut self,
        index: usize,
        kind: StatusKind,
        effect: StatusEffect,
        out_events: &mut Vec<Event>,
    ) {
        let enemy = &mut self.enemies[index];
        if enemy.is_dead() {
            return;
        }
        let fresh = !enemy.effects.contains(kind);
        if enemy.apply_status(kind, effect) && fresh {
            out_events.push(Event::StatusApplied {
                enemy: enemy.id,
                status: kind,
                duration: effect.remaining,
            });
        }
    }

    fn perform(&mut self, action: Action, out_events: &mut Vec<Event>) {
        match action {
            Action::AreaDamage {
                center,
                radius,
                damage,
                source,
                exclude,
            } => {
                for index in self.indices_within(center, radius) {
                    if Some(self.enemies[index].id) != exclude {
                        let _ = self.damage_enemy(index, damage, source, false, out_events);
                    }
                }
            }
            Action::AreaStatus {
                center,
                radius,
                kind,
                effect,
            } => {
                for index in self.indices_within(center, radius) {
                    self.apply_status(index, kind, effect, out_events);
                }
            }
            Action::Strike {
                enemy,
                damage,
                source,
                stun,
            } => {
                if let Some(index) = self.enemy_index(enemy) {
                    let _ = self.damage_enemy(index, damage, source, false, out_events);
                    let effect = StatusEffect::timed(stun, 1.0);
                    self.apply_status(index, StatusKind::Stun, effect, out_events);
                }
            }
            Action::Gold { tower, amount } => {
                self.economy.money = self.economy.money.saturating_add(amount);
                out_events.push(Event::GoldGenerated { tower, amount });
            }
            Action::Lives { amount } => {
                let restored = self
                    .economy
                    .lives
                    .saturating_add(amount)
                    .min(self.config.starting_lives);
                let gained = restored.saturating_sub(self.economy.lives);
                if gained > 0 {
                    self.economy.lives = restored;
                    out_events.push(Event::LivesRestored { amount: gained });
                }
            }
            Action::Ward { charges } => {
                self.economy.ward = self.economy.ward.max(charges);
            }
        }
    }

    fn indices_within(&self, center: Vec2, radius: f32) -> Vec<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| !enemy.is_dead() && within(enemy.position, center, radius))
            .map(|(index, _)| index)
            .collect()
    }

    /// Recomputes synergy fields and Life buffs, then refreshes derived
    /// stats.
    fn refresh_modifiers(&mut self, out_events: &mut Vec<Event>) {
        self.synergies.recompute(&self.towers, out_events);
        for (id, buff) in life_buffs(&self.towers, LIFE_AURA_RADIUS) {
            if let Some(tower) = self.towers.get_mut(id) {
                tower.set_damage_buff(buff);
            }
        }
        self.towers.refresh_dirty();
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.game_over {
            return;
        }
        out_events.push(Event::TimeAdvanced { dt });
        let seconds = dt.as_secs_f32();

        self.tick_enemies(seconds, out_events);

        for tower in self.towers.iter_mut() {
            tower.tick_timers(seconds);
        }
        self.run_passives(seconds, out_events);
        self.tick_hazards(seconds, out_events);

        self.refresh_modifiers(out_events);
        for action in self.synergies.tick(seconds) {
            self.perform(action, out_events);
        }

        if let Some(weather) = self.weather.advance(seconds, &mut self.rng) {
            info!(?weather, "weather changed");
            for tower in self.towers.iter_mut() {
                tower.set_weather_multiplier(weather.damage_multiplier(tower.element));
            }
            out_events.push(Event::WeatherChanged { weather });
        }
        self.towers.refresh_dirty();

        self.advance_projectiles(seconds, out_events);
        self.resolve_casualties(out_events);
    }

    /// Expires effects, resolves damage over time, then moves enemies and
    /// runs their periodic abilities.
    fn tick_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        for index in 0..self.enemies.len() {
            let (locked, damage) = self.enemies[index].tick_effects(dt);
            for tick in damage {
                let _ = self.damage_enemy(index, tick.amount, tick.source, false, out_events);
            }

            let enemy = &mut self.enemies[index];
            if enemy.is_dead() {
                continue;
            }
            enemy.advance(dt - locked, &self.path);
            enemy.tick_cloak(dt);
        }

        let pulses: Vec<_> = self
            .enemies
            .iter_mut()
            .filter(|enemy| !enemy.is_dead())
            .filter_map(|enemy| {
                let aura = enemy.heal_pulse(dt)?;
                Some((enemy.id, enemy.position, aura))
            })
            .collect();
        for (healer, center, aura) in pulses {
            for enemy in self
                .enemies
                .iter_mut()
                .filter(|enemy| enemy.id != healer && within(enemy.position, center, aura.radius))
            {
                enemy.heal(aura.amount);
            }
        }
    }

    /// Removes dead and escaped enemies, paying rewards and charging lives.
    fn resolve_casualties(&mut self, out_events: &mut Vec<Event>) {
        let enemies = std::mem::take(&mut self.enemies);
        let mut survivors = Vec::with_capacity(enemies.len());

        for enemy in enemies {
            if enemy.is_dead() {
                self.economy.money = self.economy.money.saturating_add(enemy.reward);
                self.economy.score = self.economy.score.saturating_add(enemy.reward);
                let credited = enemy.last_damage.filter(|id| self.towers.contains(*id));
                if let Some(tower) = credited.and_then(|id| self.towers.get_mut(id)) {
                    tower.kills = tower.kills.saturating_add(1);
                }
                debug!(enemy = enemy.id.get(), kind = ?enemy.kind, ?credited, "enemy killed");
                out_events.push(Event::EnemyKilled {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    reward: enemy.reward,
                    credited,
                });
            } else if enemy.reached_end {
                let warded = self.economy.ward > 0;
                if warded {
                    self.economy.ward -= 1;
                } else {
                    self.economy.lives = self.economy.lives.saturating_sub(1);
                }
                debug!(enemy = enemy.id.get(), warded, lives = self.economy.lives, "enemy escaped");
                out_events.push(Event::EnemyEscaped {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    warded,
                });
            } else {
                survivors.push(enemy);
            }
        }
        self.enemies = survivors;

        if self.economy.lives == 0 && !self.game_over {
            self.game_over = true;
            info!(wave = self.wave, score = self.economy.score, "game over");
            out_events.push(Event::GameOver { wave: self.wave });
        }
    }

    fn check_placement(&self, element: Element, position: Vec2) -> Result<(), PlacementError> {
        if position.x < 0.0
            || position.y < 0.0
            || position.x > self.config.width
            || position.y > self.config.height
        {
            return Err(PlacementError::OutOfBounds);
        }
        if self
            .path
            .windows(2)
            .any(|leg| distance_to_segment(position, leg[0], leg[1]) < PLACEMENT_CLEARANCE)
        {
            return Err(PlacementError::TooCloseToPath);
        }
        if self
            .towers
            .iter()
            .any(|tower| tower.position.distance(position) < PLACEMENT_CLEARANCE)
        {
            return Err(PlacementError::TooCloseToTower);
        }
        let cost = element.cost();
        if self.economy.money < cost {
            return Err(PlacementError::InsufficientFunds {
                required: cost,
                available: self.economy.money,
            });
        }
        Ok(())
    }

    fn place_tower(&mut self, element: Element, position: Vec2, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.check_placement(element, position) {
            debug!(?element, %reason, "placement rejected");
            out_events.push(Event::TowerPlacementRejected {
                element,
                position,
                reason,
            });
            return;
        }

        self.economy.money -= element.cost();
        let multiplier = self.weather.current().damage_multiplier(element);
        let tower = self.towers.insert(element, position);
        if let Some(placed) = self.towers.get_mut(tower) {
            placed.set_weather_multiplier(multiplier);
        }
        debug!(tower = tower.get(), ?element, x = position.x, y = position.y, "tower placed");
        out_events.push(Event::TowerPlaced {
            tower,
            element,
            position,
        });
        self.refresh_modifiers(out_events);
    }

    fn sell_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(sold) = self.towers.remove(tower) else {
            out_events.push(Event::SaleRejected { tower });
            return;
        };
        let refund = sell_refund(sold.element, &sold.upgrades);
        self.economy.money = self.economy.money.saturating_add(refund);
        debug!(tower = tower.get(), refund, "tower sold");
        out_events.push(Event::TowerSold { tower, refund });
        self.refresh_modifiers(out_events);
    }

    fn upgrade_tower(&mut self, tower: TowerId, track: UpgradeTrack) -> Result<u8, UpgradeError> {
        let upgraded = self
            .towers
            .get_mut(tower)
            .ok_or(UpgradeError::MissingTower)?;
        let cost = track
            .next_cost(upgraded.upgrades.get(track))
            .ok_or(UpgradeError::TrackMaxed)?;
        if self.economy.money < cost {
            return Err(UpgradeError::InsufficientFunds {
                required: cost,
                available: self.economy.money,
            });
        }
        let level = upgraded.upgrade(track).ok_or(UpgradeError::TrackMaxed)?;
        self.economy.money -= cost;
        Ok(level)
    }

    fn evolve_tower(
        &mut self,
        tower: TowerId,
        option: u32,
    ) -> Result<EvolutionForm, EvolutionError> {
        let evolving = self
            .towers
            .get_mut(tower)
            .ok_or(EvolutionError::MissingTower)?;
        if evolving.evolution.is_some() {
            return Err(EvolutionError::AlreadyEvolved);
        }
        if evolving.kills < EVOLUTION_KILL_THRESHOLD || evolving.level() < EVOLUTION_LEVEL_THRESHOLD
        {
            return Err(EvolutionError::NotEligible {
                kills: evolving.kills,
                level: evolving.level(),
            });
        }
        let form = usize::try_from(option)
            .ok()
            .and_then(|index| EvolutionForm::option(evolving.element, index))
            .ok_or(EvolutionError::InvalidOption { index: option })?;
        evolving.evolve(form);
        Ok(form)
    }

    fn fire(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(shooter) = self.towers.get(tower) else {
            return;
        };
        if shooter.cooldown_remaining > 0.0 {
            return;
        }
        let Some(index) = self.enemy_index(target) else {
            return;
        };
        if self.enemies[index].is_dead() {
            return;
        }

        let mut targets = vec![target];
        if let Some(EvolvedAbility::Multishot { shots, .. }) = shooter.evolved_ability() {
            let range = shooter.stats().range;
            let mut extra: Vec<(f32, EnemyId)> = self
                .enemies
                .iter()
                .filter(|enemy| enemy.id != target && !enemy.is_dead() && enemy.is_visible())
                .filter(|enemy| within(enemy.position, shooter.position, range))
                .map(|enemy| (enemy.position.distance(shooter.position), enemy.id))
                .collect();
            extra.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            targets.extend(
                extra
                    .into_iter()
                    .take(shots.saturating_sub(1) as usize)
                    .map(|(_, id)| id),
            );
        }

        for target in targets {
            let id = self.allocate_projectile_id();
            let Some(shooter) = self.towers.get(tower) else {
                return;
            };
            self.projectiles.push(Projectile::launch(id, shooter, target));
            out_events.push(Event::ProjectileFired {
                projectile: id,
                tower,
                target,
            });
        }
        if let Some(shooter) = self.towers.get_mut(tower) {
            shooter.start_cooldown();
        }
        self.light_burst(tower, out_events);
    }

    fn start_wave(&mut self, wave: u32, config: WaveConfig, out_events: &mut Vec<Event>) {
        if self.wave_active || self.game_over {
            return;
        }
        self.wave = wave;
        self.wave_active = true;
        self.wave_bonus = config.reward_bonus;
        info!(wave, enemies = config.total_enemies(), "wave started");
        out_events.push(Event::WaveStarted { wave, config });
    }

    fn complete_wave(&mut self, wave: u32, out_events: &mut Vec<Event>) {
        if !self.wave_active || wave != self.wave {
            return;
        }
        self.wave_active = false;
        let bonus = self.wave_bonus;
        self.economy.money = self.economy.money.saturating_add(bonus);
        info!(wave, bonus, money = self.economy.money, "wave completed");
        out_events.push(Event::WaveCompleted { wave, bonus });
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, wave: u32, out_events: &mut Vec<Event>) {
        if self.game_over {
            return;
        }
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let enemy = Enemy::spawn(id, kind, wave.max(1), &self.path);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position: enemy.position,
        });
        self.enemies.push(enemy);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnEnemy { kind, wave } => world.spawn_enemy(kind, wave, out_events),
        Command::PlaceTower { element, position } => {
            world.place_tower(element, position, out_events);
        }
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::UpgradeTower { tower, track } => match world.upgrade_tower(tower, track) {
            Ok(level) => {
                debug!(tower = tower.get(), ?track, level, "tower upgraded");
                out_events.push(Event::TowerUpgraded {
                    tower,
                    track,
                    level,
                });
            }
            Err(reason) => out_events.push(Event::UpgradeRejected {
                tower,
                track,
                reason,
            }),
        },
        Command::EvolveTower { tower, option } => match world.evolve_tower(tower, option) {
            Ok(form) => {
                debug!(tower = tower.get(), form = form.name(), "tower evolved");
                out_events.push(Event::TowerEvolved { tower, form });
            }
            Err(reason) => out_events.push(Event::EvolutionRejected { tower, reason }),
        },
        Command::SetTargetingMode { tower, mode } => {
            if let Some(tower) = world.towers.get_mut(tower) {
                tower.targeting_override = mode;
                tower.lock_remaining = 0.0;
            }
        }
        Command::AssignTarget { tower, target } => {
            let valid = target.map_or(true, |enemy| {
                world
                    .enemy_index(enemy)
                    .is_some_and(|index| !world.enemies[index].is_dead())
            });
            if !valid {
                return;
            }
            if let Some(assigned) = world.towers.get_mut(tower) {
                if assigned.assign_target(target) {
                    out_events.push(Event::TargetChanged { tower, target });
                }
            }
        }
        Command::FireProjectile { tower, target } => world.fire(tower, target, out_events),
        Command::StartWave { wave, config } => world.start_wave(wave, config, out_events),
        Command::CompleteWave { wave } => world.complete_wave(wave, out_events),
    }
    world.towers.refresh_dirty();
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use crystal_defence_core::{
        Element, EnemyId, EnemyView, PlacementError, ProjectileSnapshot, StatusKind,
        SynergySnapshot, TowerView, Weather,
    };
    use glam::Vec2;

    use super::{Economy, TowerRecord, World, WorldConfig};
    use crate::status::StatusEffect;

    /// Captures a read-only view of the enemies currently on the field.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| enemy.snapshot(&world.path))
                .collect(),
        )
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Projectiles in flight, including chain hops waiting to launch.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Active synergy fields ordered by tower pair.
    #[must_use]
    pub fn synergies(world: &World) -> Vec<SynergySnapshot> {
        world.synergies.snapshots()
    }

    /// Current player resources.
    #[must_use]
    pub fn economy(world: &World) -> Economy {
        world.economy
    }

    /// Current weather.
    #[must_use]
    pub fn weather(world: &World) -> Weather {
        world.weather.current()
    }

    /// Waypoints of the enemy path in world units.
    #[must_use]
    pub fn path(world: &World) -> &[Vec2] {
        &world.path
    }

    /// Parameters the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Number of the most recently started wave.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Reports whether a wave is in progress.
    #[must_use]
    pub fn wave_active(world: &World) -> bool {
        world.wave_active
    }

    /// Reports whether the player has run out of lives.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Number of enemies currently on the field.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Persistent description of every placed tower in identifier order.
    #[must_use]
    pub fn tower_records(world: &World) -> Vec<TowerRecord> {
        world
            .towers
            .iter()
            .map(|tower| TowerRecord {
                element: tower.element,
                position: tower.position,
                upgrades: tower.upgrades,
                kills: tower.kills,
                evolution: tower.evolution,
            })
            .collect()
    }

    /// Active status effect of the provided kind on an enemy.
    #[must_use]
    pub fn status_effect(world: &World, enemy: EnemyId, kind: StatusKind) -> Option<StatusEffect> {
        let index = world.enemy_index(enemy)?;
        world.enemies[index].effects.get(kind).copied()
    }

    /// Checks whether a tower of `element` could be placed at `position`.
    pub fn placement_check(
        world: &World,
        element: Element,
        position: Vec2,
    ) -> Result<(), PlacementError> {
        world.check_placement(element, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 100.0), Vec2::new(800.0, 100.0)]
    }

    fn config(money: u32, seed: u64) -> WorldConfig {
        WorldConfig {
            starting_money: money,
            seed,
            weather_enabled: false,
            ..WorldConfig::default()
        }
    }

    fn tick(world: &mut World, seconds: f32, events: &mut Vec<Event>) {
        apply(
            world,
            Command::Tick {
                dt: Duration::from_secs_f32(seconds),
            },
            events,
        );
    }

    fn place(world: &mut World, element: Element, x: f32, y: f32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlaceTower {
                element,
                position: Vec2::new(x, y),
            },
            &mut events,
        );
        events
    }

    fn placed_id(events: &[Event]) -> TowerId {
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(*tower),
                _ => None,
            })
            .expect("tower placed")
    }

    #[test]
    fn placement_deducts_cost_and_rejects_invalid_positions() {
        let mut world = World::new(config(80, 1), straight_path());

        let events = place(&mut world, Element::Fire, 200.0, 200.0);
        let _ = placed_id(&events);
        assert_eq!(query::economy(&world).money, 30);

        let rejection = |events: Vec<Event>| match events.as_slice() {
            [Event::TowerPlacementRejected { reason, .. }] => *reason,
            other => panic!("unexpected events {other:?}"),
        };
        assert_eq!(
            rejection(place(&mut world, Element::Water, 900.0, 200.0)),
            PlacementError::OutOfBounds
        );
        assert_eq!(
            rejection(place(&mut world, Element::Water, 300.0, 120.0)),
            PlacementError::TooCloseToPath
        );
        assert_eq!(
            rejection(place(&mut world, Element::Water, 220.0, 210.0)),
            PlacementError::TooCloseToTower
        );
        assert_eq!(
            rejection(place(&mut world, Element::Earth, 400.0, 300.0)),
            PlacementError::InsufficientFunds {
                required: 60,
                available: 30,
            }
        );
        assert_eq!(
            query::placement_check(&world, Element::Air, Vec2::new(400.0, 300.0)),
            Err(PlacementError::InsufficientFunds {
                required: 45,
                available: 30,
            })
        );
        assert_eq!(query::economy(&world).money, 30);
    }

    #[test]
    fn fire_projectile_damages_and_eventually_burns() {
        let mut burned = false;
        for seed in 0..64 {
            let mut world = World::new(config(150, seed), straight_path());
            let tower = placed_id(&place(&mut world, Element::Fire, 100.0, 160.0));
            assert_eq!(query::economy(&world).money, 100);

            let mut events = Vec::new();
            apply(
                &mut world,
                Command::SpawnEnemy {
                    kind: EnemyKind::Normal,
                    wave: 1,
                },
                &mut events,
            );
            let enemy = EnemyId::new(0);
            apply(
                &mut world,
                Command::AssignTarget {
                    tower,
                    target: Some(enemy),
                },
                &mut events,
            );
            apply(
                &mut world,
                Command::FireProjectile {
                    tower,
                    target: enemy,
                },
                &mut events,
            );

            events.clear();
            for _ in 0..40 {
                tick(&mut world, 0.05, &mut events);
                if events
                    .iter()
                    .any(|event| matches!(event, Event::ProjectileImpact { .. }))
                {
                    break;
                }
            }
            assert!(events.contains(&Event::EnemyDamaged {
                enemy,
                amount: 20.0,
                source: Some(tower),
            }));
            let snapshot = query::enemy_view(&world).get(enemy).cloned().expect("alive");
            assert!((snapshot.health - 80.0).abs() < 1e-4);

            if let Some(burn) = query::status_effect(&world, enemy, StatusKind::Burn) {
                assert!((burn.remaining - 3.0).abs() < 1e-6);
                assert!((burn.magnitude - 5.0).abs() < 1e-6);
                assert!(events.contains(&Event::StatusApplied {
                    enemy,
                    status: StatusKind::Burn,
                    duration: 3.0,
                }));
                burned = true;
                break;
            }
        }
        assert!(burned, "no seed produced a burn");
    }

    #[test]
    fn selling_refunds_seventy_percent_of_investment() {
        let mut world = World::new(config(1_000, 1), straight_path());
        let tower = placed_id(&place(&mut world, Element::Fire, 200.0, 200.0));
        let mut events = Vec::new();
        for track in [UpgradeTrack::Damage, UpgradeTrack::Range, UpgradeTrack::Range] {
            apply(&mut world, Command::UpgradeTower { tower, track }, &mut events);
        }
        assert_eq!(query::economy(&world).money, 1_000 - 50 - 30 - 25 - 40);

        events.clear();
        apply(&mut world, Command::SellTower { tower }, &mut events);
        assert_eq!(events, vec![Event::TowerSold { tower, refund: 101 }]);
        assert_eq!(query::economy(&world).money, 956);

        events.clear();
        apply(&mut world, Command::SellTower { tower }, &mut events);
        assert_eq!(events, vec![Event::SaleRejected { tower }]);
    }

    #[test]
    fn projectiles_in_flight_outlive_their_sold_tower() {
        let mut world = World::new(config(150, 1), straight_path());
        let tower = placed_id(&place(&mut world, Element::Fire, 100.0, 160.0));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Normal,
                wave: 1,
            },
            &mut events,
        );
        let target = EnemyId::new(0);
        apply(&mut world, Command::FireProjectile { tower, target }, &mut events);
        apply(&mut world, Command::SellTower { tower }, &mut events);
        assert_eq!(query::projectiles(&world).len(), 1);

        events.clear();
        for _ in 0..20 {
            tick(&mut world, 0.05, &mut events);
        }
        assert!(events.contains(&Event::EnemyDamaged {
            enemy: target,
            amount: 20.0,
            source: Some(tower),
        }));
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn upgrades_reject_maxed_tracks_and_missing_funds() {
        let mut world = World::new(config(230, 1), straight_path());
        let tower = placed_id(&place(&mut world, Element::Fire, 200.0, 200.0));
        let mut events = Vec::new();
        for _ in 0..4 {
            apply(
                &mut world,
                Command::UpgradeTower {
                    tower,
                    track: UpgradeTrack::Damage,
                },
                &mut events,
            );
        }
        assert_eq!(
            events.last(),
            Some(&Event::UpgradeRejected {
                tower,
                track: UpgradeTrack::Damage,
                reason: UpgradeError::TrackMaxed,
            })
        );
        assert_eq!(query::economy(&world).money, 20);

        events.clear();
        apply(
            &mut world,
            Command::UpgradeTower {
                tower,
                track: UpgradeTrack::Range,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::UpgradeRejected {
                tower,
                track: UpgradeTrack::Range,
                reason: UpgradeError::InsufficientFunds {
                    required: 25,
                    available: 20,
                },
            }]
        );
    }

    #[test]
    fn evolution_requires_kills_and_level() {
        let mut upgrades = UpgradeLevels::default();
        let _ = upgrades.raise(UpgradeTrack::Damage);
        let _ = upgrades.raise(UpgradeTrack::Speed);
        let records = [
            TowerRecord {
                element: Element::Fire,
                position: Vec2::new(200.0, 200.0),
                upgrades,
                kills: 20,
                evolution: None,
            },
            TowerRecord {
                element: Element::Water,
                position: Vec2::new(400.0, 200.0),
                upgrades: UpgradeLevels::default(),
                kills: 50,
                evolution: None,
            },
        ];
        let economy = Economy {
            money: 100,
            lives: 10,
            score: 0,
            ward: 0,
        };
        let mut world = World::restore(config(0, 1), straight_path(), economy, 3, &records);
        let (fire, water) = (TowerId::new(0), TowerId::new(1));

        let mut events = Vec::new();
        apply(&mut world, Command::EvolveTower { tower: water, option: 0 }, &mut events);
        apply(&mut world, Command::EvolveTower { tower: fire, option: 7 }, &mut events);
        apply(&mut world, Command::EvolveTower { tower: fire, option: 1 }, &mut events);
        apply(&mut world, Command::EvolveTower { tower: fire, option: 0 }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::EvolutionRejected {
                    tower: water,
                    reason: EvolutionError::NotEligible { kills: 50, level: 1 },
                },
                Event::EvolutionRejected {
                    tower: fire,
                    reason: EvolutionError::InvalidOption { index: 7 },
                },
                Event::TowerEvolved {
                    tower: fire,
                    form: EvolutionForm::Meteor,
                },
                Event::EvolutionRejected {
                    tower: fire,
                    reason: EvolutionError::AlreadyEvolved,
                },
            ]
        );
    }

    #[test]
    fn chain_follow_ups_fall_off_per_hop() {
        let records = [TowerRecord {
            element: Element::Air,
            position: Vec2::new(60.0, 160.0),
            upgrades: UpgradeLevels::default(),
            kills: 0,
            evolution: Some(EvolutionForm::Lightning),
        }];
        let economy = Economy {
            money: 0,
            lives: 10,
            score: 0,
            ward: 0,
        };
        let mut world = World::restore(config(0, 5), straight_path(), economy, 1, &records);
        let tower = TowerId::new(0);
        let mut events = Vec::new();
        for _ in 0..3 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    kind: EnemyKind::Tank,
                    wave: 1,
                },
                &mut events,
            );
            tick(&mut world, 0.5, &mut events);
        }

        let base = query::tower_view(&world)
            .get(tower)
            .map(|snapshot| snapshot.damage)
            .expect("tower");
        let target = EnemyId::new(0);
        apply(&mut world, Command::FireProjectile { tower, target }, &mut events);

        events.clear();
        for _ in 0..20 {
            tick(&mut world, 0.05, &mut events);
        }
        let hops: Vec<(u32, f32)> = events
            .iter()
            .filter_map(|event| match event {
                Event::ChainScheduled { hop, damage, .. } => Some((*hop, *damage)),
                _ => None,
            })
            .collect();
        assert_eq!(hops.len(), 2);
        for (hop, damage) in hops {
            assert!((damage - base * 0.8f32.powi(hop as i32)).abs() < 1e-4);
        }
    }

    #[test]
    fn escapes_consume_lives_and_end_the_game() {
        let config = WorldConfig {
            starting_lives: 1,
            ..config(0, 1)
        };
        let path = vec![Vec2::new(0.0, 100.0), Vec2::new(30.0, 100.0)];
        let mut world = World::new(config, path);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Fast,
                wave: 1,
            },
            &mut events,
        );
        for _ in 0..10 {
            tick(&mut world, 0.1, &mut events);
        }
        assert!(events.contains(&Event::EnemyEscaped {
            enemy: EnemyId::new(0),
            kind: EnemyKind::Fast,
            warded: false,
        }));
        assert!(events.contains(&Event::GameOver { wave: 0 }));
        assert!(query::is_game_over(&world));
        assert_eq!(query::enemy_count(&world), 0);

        events.clear();
        tick(&mut world, 0.1, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn life_towers_buff_neighbours_and_synergies_activate() {
        let mut world = World::new(config(1_000, 1), straight_path());
        let life = placed_id(&place(&mut world, Element::Life, 200.0, 300.0));
        let fire = placed_id(&place(&mut world, Element::Fire, 300.0, 300.0));
        let events = place(&mut world, Element::Air, 300.0, 400.0);
        let air = placed_id(&events);
        assert!(events.contains(&Event::SynergyActivated {
            kind: crystal_defence_core::SynergyKind::LightningStorm,
            first: fire,
            second: air,
        }));

        let view = query::tower_view(&world);
        let damage = |id| view.get(id).map(|snapshot| snapshot.damage).expect("tower");
        assert!((damage(fire) - 24.0).abs() < 1e-4);
        assert!((damage(life) - 15.0).abs() < 1e-4);
        assert_eq!(query::synergies(&world).len(), 1);
    }

    #[test]
    fn wave_completion_pays_bonus_once() {
        let mut world = World::new(config(0, 1), straight_path());
        let mut events = Vec::new();
        let config = WaveConfig {
            entries: vec![crystal_defence_core::WaveEntry::new(EnemyKind::Normal, 1)],
            spawn_delay: Duration::from_secs(1),
            reward_bonus: 20,
        };
        apply(&mut world, Command::StartWave { wave: 1, config }, &mut events);
        assert!(query::wave_active(&world));
        apply(&mut world, Command::CompleteWave { wave: 1 }, &mut events);
        apply(&mut world, Command::CompleteWave { wave: 1 }, &mut events);
        assert_eq!(query::economy(&world).money, 20);
        assert!(!query::wave_active(&world));
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::WaveCompleted { .. }))
                .count(),
            1
        );
    }
}
