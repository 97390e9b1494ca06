//! Deferred effects produced by passives, fields, and impacts.

use crystal_defence_core::{EnemyId, StatusKind, TowerId};
use glam::Vec2;

use crate::status::StatusEffect;

/// Mutation queued while iterating one collection and applied afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    /// Damages every enemy inside a circle.
    AreaDamage {
        center: Vec2,
        radius: f32,
        damage: f32,
        source: Option<TowerId>,
        exclude: Option<EnemyId>,
    },
    /// Attaches a status effect to every enemy inside a circle.
    AreaStatus {
        center: Vec2,
        radius: f32,
        kind: StatusKind,
        effect: StatusEffect,
    },
    /// Damages and stuns a single enemy.
    Strike {
        enemy: EnemyId,
        damage: f32,
        source: Option<TowerId>,
        stun: f32,
    },
    /// Grants money.
    Gold { tower: TowerId, amount: u32 },
    /// Restores lives up to the starting amount.
    Lives { amount: u32 },
    /// Tops up escape wards.
    Ward { charges: u32 },
}

/// Whether a point lies inside a circle.
pub(crate) fn within(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) <= radius * radius
}

/// Shortest distance between `point` and the segment `start..end`.
pub(crate) fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_squared();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}
