//! Field effects created by pairs of towers with complementary elements.

use std::collections::BTreeMap;

use crystal_defence_core::{
    Event, StatusKind, SynergyKind, SynergySnapshot, TowerId, SYNERGY_PAIR_RADIUS,
};
use glam::Vec2;
use tracing::debug;

use crate::{combat::Action, status::StatusEffect, towers::TowerRegistry};

const STORM_INTERVAL: f32 = 2.0;
const STORM_DAMAGE: f32 = 15.0;
const MUD_DURATION: f32 = 3.0;
const MUD_MULTIPLIER: f32 = 0.3;
const TWILIGHT_MULTIPLIER: f32 = 1.75;
const STEAM_EVASION: f32 = 0.3;
const FIELD_REFRESH: f32 = 0.5;
const BLESSING_INTERVAL: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct SynergyField {
    kind: SynergyKind,
    center: Vec2,
    elapsed: f32,
}

/// Active synergy fields keyed by the ordered tower pair.
#[derive(Clone, Debug, Default)]
pub(crate) struct SynergyRegistry {
    fields: BTreeMap<(TowerId, TowerId), SynergyField>,
}

impl SynergyRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Rescans every tower pair, keeping timers of fields that persist.
    pub(crate) fn recompute(&mut self, towers: &TowerRegistry, out_events: &mut Vec<Event>) {
        let placed: Vec<_> = towers
            .iter()
            .map(|tower| (tower.id, tower.element, tower.position))
            .collect();

        let mut live = BTreeMap::new();
        for (offset, (first, first_element, first_position)) in placed.iter().enumerate() {
            for (second, second_element, second_position) in &placed[offset + 1..] {
                let Some(kind) = SynergyKind::for_pair(*first_element, *second_element) else {
                    continue;
                };
                if first_position.distance(*second_position) > SYNERGY_PAIR_RADIUS {
                    continue;
                }
                let key = (*first, *second);
                let elapsed = self.fields.get(&key).map_or(0.0, |field| field.elapsed);
                let _ = live.insert(
                    key,
                    SynergyField {
                        kind,
                        center: (*first_position + *second_position) * 0.5,
                        elapsed,
                    },
                );
            }
        }

        for (&(first, second), field) in &self.fields {
            if !live.contains_key(&(first, second)) {
                out_events.push(Event::SynergyExpired {
                    kind: field.kind,
                    first,
                    second,
                });
            }
        }
        for (&(first, second), field) in &live {
            if !self.fields.contains_key(&(first, second)) {
                debug!(kind = field.kind.name(), ?first, ?second, "synergy activated");
                out_events.push(Event::SynergyActivated {
                    kind: field.kind,
                    first,
                    second,
                });
            }
        }
        self.fields = live;
    }

    /// Advances field timers and returns the effects due this tick.
    pub(crate) fn tick(&mut self, dt: f32) -> Vec<Action> {
        let mut actions = Vec::new();
        for (&(first, _), field) in &mut self.fields {
            let radius = field.kind.radius();
            let center = field.center;
            field.elapsed += dt;
            match field.kind {
                SynergyKind::LightningStorm => {
                    while field.elapsed >= STORM_INTERVAL {
                        field.elapsed -= STORM_INTERVAL;
                        actions.push(Action::AreaDamage {
                            center,
                            radius,
                            damage: STORM_DAMAGE,
                            source: Some(first),
                            exclude: None,
                        });
                    }
                }
                SynergyKind::MudTrap => actions.push(Action::AreaStatus {
                    center,
                    radius,
                    kind: StatusKind::SuperSlow,
                    effect: StatusEffect::timed(MUD_DURATION, MUD_MULTIPLIER),
                }),
                SynergyKind::TwilightField => actions.push(Action::AreaStatus {
                    center,
                    radius,
                    kind: StatusKind::Amplify,
                    effect: StatusEffect::timed(FIELD_REFRESH, TWILIGHT_MULTIPLIER),
                }),
                SynergyKind::SteamCloud => actions.push(Action::AreaStatus {
                    center,
                    radius,
                    kind: StatusKind::Evasion,
                    effect: StatusEffect::timed(FIELD_REFRESH, STEAM_EVASION),
                }),
                SynergyKind::NaturesBlessing => {
                    while field.elapsed >= BLESSING_INTERVAL {
                        field.elapsed -= BLESSING_INTERVAL;
                        actions.push(Action::Lives { amount: 1 });
                    }
                }
            }
        }
        actions
    }

    pub(crate) fn snapshots(&self) -> Vec<SynergySnapshot> {
        self.fields
            .iter()
            .map(|(&(first, second), field)| SynergySnapshot {
                kind: field.kind,
                first,
                second,
                center: field.center,
                radius: field.kind.radius(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystal_defence_core::Element;

    #[test]
    fn pairs_activate_within_radius_and_expire_on_removal() {
        let mut towers = TowerRegistry::new();
        let fire = towers.insert(Element::Fire, Vec2::new(100.0, 100.0));
        let air = towers.insert(Element::Air, Vec2::new(250.0, 100.0));
        let _far_water = towers.insert(Element::Water, Vec2::new(700.0, 500.0));

        let mut registry = SynergyRegistry::new();
        let mut events = Vec::new();
        registry.recompute(&towers, &mut events);
        assert_eq!(
            events,
            vec![Event::SynergyActivated {
                kind: SynergyKind::LightningStorm,
                first: fire,
                second: air,
            }]
        );
        let snapshots = registry.snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].center, Vec2::new(175.0, 100.0));

        events.clear();
        registry.recompute(&towers, &mut events);
        assert!(events.is_empty());

        let _ = towers.remove(air);
        registry.recompute(&towers, &mut events);
        assert_eq!(
            events,
            vec![Event::SynergyExpired {
                kind: SynergyKind::LightningStorm,
                first: fire,
                second: air,
            }]
        );
        assert!(registry.snapshots().is_empty());
    }

    #[test]
    fn storm_strikes_every_two_seconds() {
        let mut towers = TowerRegistry::new();
        let _ = towers.insert(Element::Fire, Vec2::new(100.0, 100.0));
        let _ = towers.insert(Element::Air, Vec2::new(150.0, 100.0));
        let mut registry = SynergyRegistry::new();
        registry.recompute(&towers, &mut Vec::new());

        let strikes: usize = (0..20).map(|_| registry.tick(0.25).len()).sum();
        assert_eq!(strikes, 2);
    }
}
