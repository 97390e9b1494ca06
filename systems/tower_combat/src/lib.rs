#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands from targeting data.

use crystal_defence_core::{Command, EnemyView, TowerView};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for towers ready to fire.
    ///
    /// Targets are re-validated against the enemy view; a removed or
    /// out-of-range target is treated as no target.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<Command>) {
        if enemies.is_empty() {
            return;
        }

        self.scratch.clear();

        for tower in towers.iter().filter(|tower| tower.ready()) {
            let Some(target) = tower.target.and_then(|id| enemies.get(id)) else {
                continue;
            };
            if target.position.distance(tower.position) > tower.range {
                continue;
            }
            if !target.visible && !tower.detects_cloaked {
                continue;
            }
            self.scratch.push(Command::FireProjectile {
                tower: tower.id,
                target: target.id,
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystal_defence_core::{
        Element, EnemyId, EnemyKind, EnemySnapshot, TowerId, TowerSnapshot, UpgradeLevels,
    };
    use glam::Vec2;

    fn tower(id: u32, target: Option<u32>, cooldown_remaining: f32) -> TowerSnapshot {
        let stats = Element::Fire.base_stats();
        TowerSnapshot {
            id: TowerId::new(id),
            element: Element::Fire,
            position: Vec2::ZERO,
            range: stats.range,
            damage: stats.damage,
            cooldown: stats.cooldown,
            cooldown_remaining,
            target: target.map(EnemyId::new),
            lock_remaining: 1.0,
            targeting: Element::Fire.targeting(),
            targeting_overridden: false,
            preference: Element::Fire.preference(),
            detects_cloaked: false,
            level: 1,
            upgrades: UpgradeLevels::default(),
            kills: 0,
            evolution: None,
        }
    }

    fn enemy(id: u32, x: f32, visible: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Normal,
            position: Vec2::new(x, 0.0),
            radius: 10.0,
            health: 100.0,
            max_health: 100.0,
            shield: 0.0,
            speed: 60.0,
            progress: 0.0,
            visible,
            statuses: Vec::new(),
        }
    }

    #[test]
    fn fires_only_for_ready_towers_with_live_targets() {
        let towers = TowerView::from_snapshots(vec![
            tower(1, Some(1), 0.0),
            tower(2, Some(1), 0.4),
            tower(3, Some(9), 0.0),
            tower(4, None, 0.0),
            tower(5, Some(2), 0.0),
            tower(6, Some(3), 0.0),
        ]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, 50.0, true),
            enemy(2, 400.0, true),
            enemy(3, 20.0, false),
        ]);

        let mut out = Vec::new();
        TowerCombat::new().handle(&towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![Command::FireProjectile {
                tower: TowerId::new(1),
                target: EnemyId::new(1),
            }]
        );
    }

    #[test]
    fn preserves_existing_commands() {
        let towers = TowerView::from_snapshots(vec![tower(1, Some(1), 0.0)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(1, 10.0, true)]);
        let mut out = vec![Command::SellTower {
            tower: TowerId::new(8),
        }];

        TowerCombat::new().handle(&towers, &enemies, &mut out);

        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], Command::FireProjectile { .. }));
    }
}
