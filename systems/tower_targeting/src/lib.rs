#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use crystal_defence_core::{
    Command, EnemyId, EnemySnapshot, EnemyView, StatusKind, TargetPreference, TargetingRule,
    TowerSnapshot, TowerView,
};

/// Tower targeting system that reuses a scratch buffer to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<Candidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AssignTarget` for every tower whose target must change.
    ///
    /// A locked, still valid target is kept. Otherwise the tower rescans and
    /// either locks onto the best candidate or drops its stale target.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<Command>) {
        for tower in towers.iter() {
            let current = tower
                .target
                .and_then(|id| enemies.get(id))
                .filter(|enemy| can_engage(tower, enemy));
            if current.is_some() && tower.lock_remaining > 0.0 {
                continue;
            }

            match self.select(tower, enemies) {
                Some(target) => out.push(Command::AssignTarget {
                    tower: tower.id,
                    target: Some(target),
                }),
                None if tower.target.is_some() => out.push(Command::AssignTarget {
                    tower: tower.id,
                    target: None,
                }),
                None => {}
            }
        }
    }

    fn select(&mut self, tower: &TowerSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
        self.candidates.clear();
        for enemy in enemies.iter().filter(|enemy| can_engage(tower, enemy)) {
            self.candidates.push(Candidate {
                id: enemy.id,
                metric: metric(tower.targeting, tower, enemy),
                distance: enemy.position.distance(tower.position),
                preferred: prefers(tower.preference, enemy),
            });
        }

        let any_preferred = self.candidates.iter().any(|candidate| candidate.preferred);
        let mut best: Option<Candidate> = None;
        for candidate in self
            .candidates
            .iter()
            .filter(|candidate| candidate.preferred || !any_preferred)
        {
            match &mut best {
                Some(existing) => {
                    if candidate.precedes(existing) {
                        *existing = *candidate;
                    }
                }
                None => best = Some(*candidate),
            }
        }
        best.map(|candidate| candidate.id)
    }
}

/// Whether the tower may keep or pick the enemy as its target.
fn can_engage(tower: &TowerSnapshot, enemy: &EnemySnapshot) -> bool {
    (enemy.visible || tower.detects_cloaked)
        && enemy.health > 0.0
        && enemy.position.distance(tower.position) <= tower.range
}

fn prefers(preference: TargetPreference, enemy: &EnemySnapshot) -> bool {
    match preference {
        TargetPreference::None => false,
        TargetPreference::Cloaked => enemy.kind.cloak().is_some(),
        TargetPreference::Unweakened => !enemy.has_status(StatusKind::Weaken),
        TargetPreference::Healers => enemy.kind.heal_aura().is_some(),
    }
}

/// Ranking value where smaller is better.
fn metric(rule: TargetingRule, tower: &TowerSnapshot, enemy: &EnemySnapshot) -> f32 {
    match rule {
        TargetingRule::HighestHealth => -enemy.health,
        TargetingRule::LowestHealth => enemy.health,
        TargetingRule::Closest => enemy.position.distance(tower.position),
        TargetingRule::FurthestAlong => -enemy.progress,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    metric: f32,
    distance: f32,
    preferred: bool,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.metric != other.metric {
            return self.metric < other.metric;
        }

        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        self.id < other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystal_defence_core::{Element, EnemyKind, TowerId, UpgradeLevels};
    use glam::Vec2;

    fn tower(element: Element, x: f32, y: f32) -> TowerSnapshot {
        let stats = element.base_stats();
        TowerSnapshot {
            id: TowerId::new(1),
            element,
            position: Vec2::new(x, y),
            range: stats.range,
            damage: stats.damage,
            cooldown: stats.cooldown,
            cooldown_remaining: 0.0,
            target: None,
            lock_remaining: 0.0,
            targeting: element.targeting(),
            targeting_overridden: false,
            preference: element.preference(),
            detects_cloaked: element.detects_cloaked(),
            level: 1,
            upgrades: UpgradeLevels::default(),
            kills: 0,
            evolution: None,
        }
    }

    fn enemy(id: u32, kind: EnemyKind, x: f32, health: f32, progress: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind,
            position: Vec2::new(x, 0.0),
            radius: kind.radius(),
            health,
            max_health: 100.0,
            shield: 0.0,
            speed: 60.0,
            progress,
            visible: true,
            statuses: Vec::new(),
        }
    }

    fn assigned(out: &[Command]) -> Vec<Option<EnemyId>> {
        out.iter()
            .map(|command| match command {
                Command::AssignTarget { target, .. } => *target,
                other => panic!("unexpected command {other:?}"),
            })
            .collect()
    }

    #[test]
    fn each_rule_picks_its_candidate() {
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, EnemyKind::Normal, 20.0, 90.0, 1.0),
            enemy(2, EnemyKind::Normal, 60.0, 40.0, 3.0),
            enemy(3, EnemyKind::Normal, 100.0, 70.0, 2.0),
        ]);
        let mut system = TowerTargeting::new();
        let cases = [
            (TargetingRule::HighestHealth, 1),
            (TargetingRule::LowestHealth, 2),
            (TargetingRule::Closest, 1),
            (TargetingRule::FurthestAlong, 2),
        ];
        for (rule, expected) in cases {
            let mut snapshot = tower(Element::Fire, 0.0, 0.0);
            snapshot.targeting = rule;
            let mut out = Vec::new();
            system.handle(&TowerView::from_snapshots(vec![snapshot]), &enemies, &mut out);
            assert_eq!(assigned(&out), vec![Some(EnemyId::new(expected))], "{rule:?}");
        }
    }

    #[test]
    fn ties_break_by_distance_then_identifier() {
        let enemies = EnemyView::from_snapshots(vec![
            enemy(7, EnemyKind::Normal, -50.0, 80.0, 1.0),
            enemy(4, EnemyKind::Normal, 50.0, 80.0, 1.0),
            enemy(9, EnemyKind::Normal, 120.0, 80.0, 1.0),
        ]);
        let mut out = Vec::new();
        TowerTargeting::new().handle(
            &TowerView::from_snapshots(vec![tower(Element::Fire, 0.0, 0.0)]),
            &enemies,
            &mut out,
        );
        assert_eq!(assigned(&out), vec![Some(EnemyId::new(4))]);
    }

    #[test]
    fn cloaked_enemies_are_only_seen_by_detectors() {
        let mut hidden = enemy(1, EnemyKind::Invisible, 30.0, 50.0, 1.0);
        hidden.visible = false;
        let enemies = EnemyView::from_snapshots(vec![
            hidden,
            enemy(2, EnemyKind::Normal, 10.0, 50.0, 1.0),
        ]);

        let mut out = Vec::new();
        let mut system = TowerTargeting::new();
        system.handle(
            &TowerView::from_snapshots(vec![tower(Element::Water, 0.0, 0.0)]),
            &enemies,
            &mut out,
        );
        assert_eq!(assigned(&out), vec![Some(EnemyId::new(2))]);

        out.clear();
        system.handle(
            &TowerView::from_snapshots(vec![tower(Element::Light, 0.0, 0.0)]),
            &enemies,
            &mut out,
        );
        assert_eq!(assigned(&out), vec![Some(EnemyId::new(1))]);
    }

    #[test]
    fn darkness_prefers_unweakened_targets() {
        let mut weakened = enemy(1, EnemyKind::Normal, 30.0, 100.0, 1.0);
        weakened.statuses = vec![StatusKind::Weaken];
        let enemies = EnemyView::from_snapshots(vec![
            weakened,
            enemy(2, EnemyKind::Normal, 40.0, 20.0, 1.0),
        ]);
        let mut out = Vec::new();
        TowerTargeting::new().handle(
            &TowerView::from_snapshots(vec![tower(Element::Darkness, 0.0, 0.0)]),
            &enemies,
            &mut out,
        );
        assert_eq!(assigned(&out), vec![Some(EnemyId::new(2))]);
    }

    #[test]
    fn locked_targets_persist_and_stale_targets_clear() {
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, EnemyKind::Normal, 100.0, 100.0, 1.0),
            enemy(2, EnemyKind::Normal, 10.0, 100.0, 1.0),
        ]);
        let mut locked = tower(Element::Water, 0.0, 0.0);
        locked.target = Some(EnemyId::new(1));
        locked.lock_remaining = 1.0;

        let mut out = Vec::new();
        let mut system = TowerTargeting::new();
        system.handle(&TowerView::from_snapshots(vec![locked]), &enemies, &mut out);
        assert!(out.is_empty());

        let mut stale = tower(Element::Water, 0.0, 0.0);
        stale.target = Some(EnemyId::new(5));
        stale.lock_remaining = 1.0;
        system.handle(
            &TowerView::from_snapshots(vec![stale]),
            &EnemyView::default(),
            &mut out,
        );
        assert_eq!(assigned(&out), vec![None]);
    }

    #[test]
    fn enemies_out_of_range_are_ignored() {
        let enemies =
            EnemyView::from_snapshots(vec![enemy(1, EnemyKind::Normal, 400.0, 80.0, 1.0)]);
        let mut out = Vec::new();
        TowerTargeting::new().handle(
            &TowerView::from_snapshots(vec![tower(Element::Fire, 0.0, 0.0)]),
            &enemies,
            &mut out,
        );
        assert!(out.is_empty());
    }
}
