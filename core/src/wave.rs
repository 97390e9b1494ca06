//! Wave composition and route descriptions shared by generators and the world.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enemy::EnemyKind;

/// Number of enemies of one kind contributed to a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Enemy archetype.
    pub kind: EnemyKind,
    /// Number of enemies of that archetype.
    pub count: u32,
}

impl WaveEntry {
    /// Creates a new wave entry.
    #[must_use]
    pub const fn new(kind: EnemyKind, count: u32) -> Self {
        Self { kind, count }
    }
}

/// Complete description of a single wave.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Ordered enemy groups.
    pub entries: Vec<WaveEntry>,
    /// Delay between consecutive spawns.
    pub spawn_delay: Duration,
    /// Money granted when the wave is cleared.
    pub reward_bonus: u32,
}

impl WaveConfig {
    /// Total number of enemies across every entry.
    #[must_use]
    pub fn total_enemies(&self) -> u32 {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    /// Number of enemies of the provided kind.
    #[must_use]
    pub fn count_of(&self, kind: EnemyKind) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.count)
            .sum()
    }
}

/// Route expressed in normalized field coordinates, both axes in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Creates a path from normalized waypoints.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints }
    }

    /// Normalized waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Scales the waypoints onto a field of the provided size.
    #[must_use]
    pub fn denormalize(&self, width: f32, height: f32) -> Vec<Vec2> {
        let scale = Vec2::new(width, height);
        self.waypoints.iter().map(|point| *point * scale).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denormalize_scales_both_axes() {
        let path = Path::new(vec![Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.25)]);
        assert_eq!(
            path.denormalize(800.0, 600.0),
            vec![Vec2::new(0.0, 300.0), Vec2::new(800.0, 150.0)]
        );
    }

    #[test]
    fn totals_sum_every_entry() {
        let config = WaveConfig {
            entries: vec![
                WaveEntry::new(EnemyKind::Normal, 4),
                WaveEntry::new(EnemyKind::Fast, 2),
                WaveEntry::new(EnemyKind::Normal, 1),
            ],
            spawn_delay: Duration::from_millis(500),
            reward_bonus: 10,
        };
        assert_eq!(config.total_enemies(), 7);
        assert_eq!(config.count_of(EnemyKind::Normal), 5);
    }
}
