#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave composition: a fixed opening campaign followed by
//! procedurally scaled waves.

use std::{collections::BTreeMap, time::Duration};

use crystal_defence_core::{EnemyKind, WaveConfig, WaveEntry};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Number of hand-authored waves before procedural generation takes over.
pub const TEMPLATE_WAVES: u32 = 10;

const BASE_PROCEDURAL_ENEMIES: u32 = 15;
const ENEMIES_PER_WAVE: u32 = 3;
const BASE_PROCEDURAL_DELAY: f64 = 0.8;
const DELAY_STEP: f64 = 0.02;
const MIN_SPAWN_DELAY: f64 = 0.25;
const BASE_PROCEDURAL_BONUS: u32 = 100;
const BONUS_PER_WAVE: u32 = 10;
const BOSS_INTERVAL: u32 = 10;

/// Kinds available to procedural waves with the wave that unlocks them and
/// the fraction of the wave each draw claims.
const POOL: [(EnemyKind, u32, f64); 6] = [
    (EnemyKind::Normal, 1, 0.3),
    (EnemyKind::Fast, 2, 0.3),
    (EnemyKind::Tank, 4, 0.2),
    (EnemyKind::Swarm, 5, 0.3),
    (EnemyKind::Healer, 6, 0.15),
    (EnemyKind::Invisible, 7, 0.15),
];

/// Wave generator bound to a global seed.
#[derive(Clone, Copy, Debug)]
pub struct WaveGeneration {
    global_seed: u64,
}

impl WaveGeneration {
    /// Creates a generator whose procedural waves derive from `global_seed`.
    #[must_use]
    pub const fn new(global_seed: u64) -> Self {
        Self { global_seed }
    }

    /// Composition of the one-based `wave`.
    ///
    /// Waves up to [`TEMPLATE_WAVES`] come from the fixed table. Later waves
    /// scale linearly and shuffle their groups with a generator derived from
    /// the global seed and wave index.
    #[must_use]
    pub fn generate(&self, wave: u32) -> WaveConfig {
        let wave = wave.max(1);
        match template(wave) {
            Some(config) => config,
            None => self.procedural(wave),
        }
    }

    fn procedural(&self, wave: u32) -> WaveConfig {
        let offset = wave - TEMPLATE_WAVES;
        let total = BASE_PROCEDURAL_ENEMIES + ENEMIES_PER_WAVE * offset;
        let bosses = if wave % BOSS_INTERVAL == 0 {
            wave / BOSS_INTERVAL
        } else {
            0
        };

        let mut counts: BTreeMap<EnemyKind, u32> = BTreeMap::new();
        if bosses > 0 {
            let _ = counts.insert(EnemyKind::Boss, bosses);
        }

        let pool: Vec<(EnemyKind, f64)> = POOL
            .iter()
            .filter(|(_, unlock, _)| *unlock <= wave)
            .map(|(kind, _, ratio)| (*kind, *ratio))
            .collect();
        let budget = total.saturating_sub(bosses);
        let mut remaining = budget;
        while remaining > 0 {
            for (kind, ratio) in &pool {
                if remaining == 0 {
                    break;
                }
                let share = ((f64::from(budget) * ratio).floor() as u32)
                    .max(1)
                    .min(remaining);
                *counts.entry(*kind).or_insert(0) += share;
                remaining -= share;
            }
        }

        let mut entries: Vec<WaveEntry> = counts
            .into_iter()
            .map(|(kind, count)| WaveEntry::new(kind, count))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.global_seed, wave));
        entries.shuffle(&mut rng);

        let delay = (BASE_PROCEDURAL_DELAY - DELAY_STEP * f64::from(offset)).max(MIN_SPAWN_DELAY);
        WaveConfig {
            entries,
            spawn_delay: Duration::from_secs_f64(delay),
            reward_bonus: BASE_PROCEDURAL_BONUS + BONUS_PER_WAVE * offset,
        }
    }
}

fn template(wave: u32) -> Option<WaveConfig> {
    use EnemyKind::{Boss, Fast, Healer, Invisible, Normal, Swarm, Tank};

    let (entries, delay_ms, bonus): (&[(EnemyKind, u32)], u64, u32) = match wave {
        1 => (&[(Normal, 8)], 1000, 20),
        2 => (&[(Normal, 10), (Fast, 3)], 900, 25),
        3 => (&[(Normal, 8), (Fast, 6)], 900, 30),
        4 => (&[(Normal, 10), (Tank, 2)], 850, 35),
        5 => (&[(Normal, 8), (Fast, 6), (Swarm, 10)], 700, 40),
        6 => (&[(Normal, 10), (Tank, 3), (Healer, 2)], 800, 45),
        7 => (&[(Fast, 10), (Invisible, 4), (Swarm, 10)], 700, 50),
        8 => (&[(Normal, 12), (Tank, 4), (Healer, 3)], 750, 60),
        9 => (
            &[(Fast, 10), (Invisible, 6), (Healer, 3), (Swarm, 12)],
            650,
            70,
        ),
        10 => (&[(Boss, 1), (Tank, 4), (Normal, 10)], 800, 100),
        _ => return None,
    };

    Some(WaveConfig {
        entries: entries
            .iter()
            .map(|(kind, count)| WaveEntry::new(*kind, *count))
            .collect(),
        spawn_delay: Duration::from_millis(delay_ms),
        reward_bonus: bonus,
    })
}

fn derive_wave_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
