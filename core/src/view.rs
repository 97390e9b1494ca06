//! Immutable snapshots handed to systems and presentation layers.

use glam::Vec2;

use crate::{
    element::{Element, TargetPreference, TargetingRule},
    enemy::EnemyKind,
    evolution::EvolutionForm,
    modifier::SynergyKind,
    status::StatusKind,
    upgrade::UpgradeLevels,
    EnemyId, ProjectileId, TowerId,
};

/// Immutable representation of a single enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated by the world.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Position in world units.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Remaining health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Remaining shield pool.
    pub shield: f32,
    /// Current movement speed.
    pub speed: f32,
    /// Distance travelled along the path measured in segments.
    pub progress: f32,
    /// Whether towers without detection can currently see the enemy.
    pub visible: bool,
    /// Active status effects in stable order.
    pub statuses: Vec<StatusKind>,
}

impl EnemySnapshot {
    /// Remaining health as a fraction of maximum health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Reports whether the provided status is active.
    #[must_use]
    pub fn has_status(&self, status: StatusKind) -> bool {
        self.statuses.contains(&status)
    }
}

/// Read-only snapshot describing every live enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single enemy by identifier.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Element of the tower.
    pub element: Element,
    /// Position in world units.
    pub position: Vec2,
    /// Effective targeting range.
    pub range: f32,
    /// Effective projectile damage.
    pub damage: f32,
    /// Effective cooldown in seconds.
    pub cooldown: f32,
    /// Seconds until the tower may fire again.
    pub cooldown_remaining: f32,
    /// Current target, if any.
    pub target: Option<EnemyId>,
    /// Seconds until the current target lock expires.
    pub lock_remaining: f32,
    /// Rule used to rank candidate targets.
    pub targeting: TargetingRule,
    /// Whether the targeting rule comes from an explicit override.
    pub targeting_overridden: bool,
    /// Bias applied before ranking.
    pub preference: TargetPreference,
    /// Whether cloaked enemies are visible to the tower.
    pub detects_cloaked: bool,
    /// Tower level derived from upgrades.
    pub level: u32,
    /// Purchased upgrade levels.
    pub upgrades: UpgradeLevels,
    /// Kills credited to the tower.
    pub kills: u32,
    /// Evolved form, if any.
    pub evolution: Option<EvolutionForm>,
}

impl TowerSnapshot {
    /// Reports whether the tower can fire this tick.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }
}

/// Read-only snapshot describing every tower on the field.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single tower by identifier.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated by the world.
    pub id: ProjectileId,
    /// Position in world units.
    pub position: Vec2,
    /// Element of the firing tower.
    pub element: Element,
    /// Enemy the projectile homes on.
    pub target: EnemyId,
    /// Damage carried by the projectile.
    pub damage: f32,
    /// Chain hop index, zero for primary shots.
    pub hop: u32,
    /// Whether the projectile is still waiting out its launch delay.
    pub pending: bool,
}

/// Immutable representation of an active synergy field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynergySnapshot {
    /// Named field effect.
    pub kind: SynergyKind,
    /// Lower identifier of the tower pair.
    pub first: TowerId,
    /// Higher identifier of the tower pair.
    pub second: TowerId,
    /// Midpoint of the pair.
    pub center: Vec2,
    /// Radius of the field.
    pub radius: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(id: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Normal,
            position: Vec2::ZERO,
            radius: 10.0,
            health: 50.0,
            max_health: 100.0,
            shield: 0.0,
            speed: 60.0,
            progress: 0.0,
            visible: true,
            statuses: vec![StatusKind::Slow],
        }
    }

    #[test]
    fn enemy_view_sorts_and_finds_by_id() {
        let view = EnemyView::from_snapshots(vec![enemy(9), enemy(2), enemy(5)]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert!(view.get(EnemyId::new(5)).is_some());
        assert!(view.get(EnemyId::new(4)).is_none());
    }

    #[test]
    fn health_fraction_is_clamped() {
        let snapshot = enemy(1);
        assert!((snapshot.health_fraction() - 0.5).abs() < f32::EPSILON);
        assert!(snapshot.has_status(StatusKind::Slow));
    }
}
