#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded route synthesis across a normalized field.
//!
//! Every call owns its generator, so identical seeds always produce identical
//! paths regardless of call order.

use crystal_defence_core::Path;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MAX_COMPLEXITY: u64 = 8;
const BAND_MIN: f32 = 0.2;
const BAND_MAX: f32 = 0.8;
const GRID_STEPS: f32 = 8.0;
const MIN_SEPARATION: f32 = 0.15;
const DIAGONAL_SEED_THRESHOLD: u64 = 50;
const DIAGONAL_CHANCE: f64 = 0.3;
const ROW_ATTEMPTS: usize = 16;

/// Number of turns the path derived from `seed` makes.
#[must_use]
pub fn complexity(seed: u64) -> usize {
    MAX_COMPLEXITY.min(3 + (seed % 5 + 1)) as usize
}

/// Generates the route for `seed` in normalized coordinates.
///
/// The route enters at the left edge, alternates horizontal runs with
/// vertical or occasionally diagonal turns inside the vertical band, and
/// leaves at the right edge.
#[must_use]
pub fn generate_path(seed: u64) -> Path {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let turns = complexity(seed);
    let step = 1.0 / (turns as f32 + 1.0);
    let diagonals = seed > DIAGONAL_SEED_THRESHOLD;

    let mut row = sample_row(&mut rng);
    let mut waypoints = vec![Vec2::new(0.0, row)];
    for turn in 0..turns {
        let x = step * (turn as f32 + 1.0);
        waypoints.push(Vec2::new(x, row));

        let next = next_row(&mut rng, row);
        let diagonal = diagonals && rng.gen_bool(DIAGONAL_CHANCE);
        let end_x = if diagonal { x + step * 0.5 } else { x };
        waypoints.push(Vec2::new(end_x, next));
        row = next;
    }
    waypoints.push(Vec2::new(1.0, row));

    Path::new(waypoints)
}

fn sample_row(rng: &mut ChaCha8Rng) -> f32 {
    snap(rng.gen_range(BAND_MIN..=BAND_MAX))
}

/// Snaps onto the grid and pulls the result back inside the band.
fn snap(value: f32) -> f32 {
    let snapped = (value * GRID_STEPS).round() / GRID_STEPS;
    let lowest = (BAND_MIN * GRID_STEPS).ceil() / GRID_STEPS;
    let highest = (BAND_MAX * GRID_STEPS).floor() / GRID_STEPS;
    snapped.clamp(lowest, highest)
}

fn next_row(rng: &mut ChaCha8Rng, current: f32) -> f32 {
    for _ in 0..ROW_ATTEMPTS {
        let candidate = sample_row(rng);
        if (candidate - current).abs() >= MIN_SEPARATION {
            return candidate;
        }
    }
    if current < 0.5 {
        current + 2.0 / GRID_STEPS
    } else {
        current - 2.0 / GRID_STEPS
    }
}
