#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that paces a wave's enemies onto the path.

use std::{collections::VecDeque, time::Duration};

use crystal_defence_core::{Command, EnemyKind, Event, WaveConfig};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WAVE_SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided shuffle seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that expands active waves into spawn commands.
#[derive(Debug)]
pub struct Spawning {
    rng_seed: u64,
    wave: Option<u32>,
    pending: VecDeque<EnemyKind>,
    total: usize,
    spawn_delay: Duration,
    accumulator: Duration,
    completion_requested: bool,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng_seed: config.rng_seed,
            wave: None,
            pending: VecDeque::new(),
            total: 0,
            spawn_delay: Duration::ZERO,
            accumulator: Duration::ZERO,
            completion_requested: false,
        }
    }

    /// Consumes world events and the live enemy count to emit spawn and
    /// completion commands.
    ///
    /// Completion is requested only when the queue was already drained before
    /// this call, so `enemies_remaining` always reflects every emitted spawn.
    pub fn handle(&mut self, events: &[Event], enemies_remaining: usize, out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::WaveStarted { wave, config } => self.begin(*wave, config),
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::WaveCompleted { .. } | Event::GameOver { .. } => self.stop(),
                _ => {}
            }
        }

        let Some(wave) = self.wave else {
            return;
        };

        if self.pending.is_empty() {
            if enemies_remaining == 0 && !self.completion_requested {
                self.completion_requested = true;
                out.push(Command::CompleteWave { wave });
            }
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        for _ in 0..self.resolve_spawn_attempts() {
            if let Some(kind) = self.pending.pop_front() {
                out.push(Command::SpawnEnemy { kind, wave });
            }
        }
    }

    /// Fraction of the active wave already spawned, `1 − pending / total`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            return if self.wave.is_some() { 1.0 } else { 0.0 };
        }
        1.0 - self.pending.len() as f32 / self.total as f32
    }

    /// Number of enemies still waiting to spawn.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Wave currently being spawned or awaiting completion.
    #[must_use]
    pub fn active_wave(&self) -> Option<u32> {
        self.wave
    }

    fn begin(&mut self, wave: u32, config: &WaveConfig) {
        let mut queue: Vec<EnemyKind> = config
            .entries
            .iter()
            .flat_map(|entry| std::iter::repeat(entry.kind).take(entry.count as usize))
            .collect();
        let seed = self
            .rng_seed
            .wrapping_add(u64::from(wave).wrapping_mul(WAVE_SEED_STRIDE));
        queue.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

        self.wave = Some(wave);
        self.total = queue.len();
        self.pending = queue.into();
        self.spawn_delay = config.spawn_delay;
        // The first enemy enters without waiting a full delay.
        self.accumulator = config.spawn_delay;
        self.completion_requested = false;
    }

    fn stop(&mut self) {
        self.wave = None;
        self.pending.clear();
        self.total = 0;
        self.accumulator = Duration::ZERO;
        self.completion_requested = false;
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_delay.is_zero() {
            let attempts = self.pending.len();
            self.accumulator = Duration::ZERO;
            return attempts;
        }

        let mut attempts = 0;
        while self.accumulator >= self.spawn_delay && attempts < self.pending.len() {
            self.accumulator -= self.spawn_delay;
            attempts += 1;
        }
        attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystal_defence_core::WaveEntry;

    fn wave(count: u32) -> WaveConfig {
        WaveConfig {
            entries: vec![WaveEntry::new(EnemyKind::Normal, count)],
            spawn_delay: Duration::ZERO,
            reward_bonus: 0,
        }
    }

    #[test]
    fn zero_delay_releases_the_whole_queue() {
        let mut spawning = Spawning::new(Config::new(1));
        let mut out = Vec::new();
        spawning.handle(
            &[Event::WaveStarted {
                wave: 1,
                config: wave(3),
            }],
            0,
            &mut out,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(spawning.pending(), 0);
    }

    #[test]
    fn idle_system_reports_no_progress() {
        let spawning = Spawning::new(Config::new(1));
        assert_eq!(spawning.progress(), 0.0);
        assert_eq!(spawning.active_wave(), None);
    }
}
