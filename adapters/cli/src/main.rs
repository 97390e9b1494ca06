#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for Crystal Defence.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use crystal_defence_core::{Element, Event};
use crystal_defence_simulation::{Simulation, SimulationConfig};
use glam::Vec2;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Runs waves against a fixed tower layout and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "crystal-defence", version)]
struct Cli {
    /// Overrides the configured global seed.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of waves to clear before stopping.
    #[arg(long, default_value_t = 3)]
    waves: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Upper bound on simulated time.
    #[arg(long, default_value_t = 900)]
    max_seconds: u64,
    /// Tower to place before the first wave, written `element@x,y`.
    #[arg(long = "tower", value_parser = parse_tower)]
    towers: Vec<TowerPlacement>,
    /// Encoded snapshot to resume from.
    #[arg(long)]
    restore: Option<String>,
    /// Prints the encoded snapshot after the run.
    #[arg(long)]
    export: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerPlacement {
    element: Element,
    position: Vec2,
}

fn parse_tower(value: &str) -> Result<TowerPlacement, String> {
    let (element, coordinates) = value
        .split_once('@')
        .ok_or_else(|| format!("expected element@x,y, got `{value}`"))?;
    let element: Element = element.parse().map_err(|error| format!("{error}"))?;
    let (x, y) = coordinates
        .split_once(',')
        .ok_or_else(|| format!("expected x,y coordinates, got `{coordinates}`"))?;
    let parse = |axis: &str| {
        axis.trim()
            .parse::<f32>()
            .map_err(|error| format!("invalid coordinate `{axis}`: {error}"))
    };
    Ok(TowerPlacement {
        element,
        position: Vec2::new(parse(x)?, parse(y)?),
    })
}

/// Entry point for the Crystal Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    run(Cli::parse())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut simulation = Simulation::new(config);
    if let Some(encoded) = &cli.restore {
        simulation
            .restore_encoded(encoded)
            .context("restoring snapshot")?;
    }

    for placement in &cli.towers {
        match simulation.create_tower(placement.element, placement.position) {
            Ok(tower) => info!(tower = tower.get(), element = %placement.element, "tower ready"),
            Err(error) => warn!(element = %placement.element, %error, "tower skipped"),
        }
    }

    let tick = Duration::from_millis(cli.tick_ms.max(1));
    let budget = Duration::from_secs(cli.max_seconds);
    let mut elapsed = Duration::ZERO;
    let mut cleared = 0;
    while cleared < cli.waves && elapsed < budget && !simulation.is_game_over() {
        if !simulation.wave_active() && !simulation.start_wave() {
            break;
        }
        simulation.advance(tick);
        elapsed += tick;

        for event in simulation.drain_events() {
            match event {
                Event::WaveCompleted { .. } => cleared += 1,
                Event::GameOver { wave } => warn!(wave, "all lives lost"),
                _ => {}
            }
        }
    }

    let economy = simulation.economy();
    println!(
        "waves cleared: {cleared}, wave: {}, lives: {}, money: {}, score: {}, simulated: {:.1}s",
        simulation.wave(),
        economy.lives,
        economy.money,
        economy.score,
        elapsed.as_secs_f32()
    );

    if cli.export {
        let encoded = simulation
            .snapshot()
            .encode()
            .context("encoding snapshot")?;
        println!("{encoded}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tower_placements() {
        assert_eq!(
            parse_tower("fire@120, 80.5"),
            Ok(TowerPlacement {
                element: Element::Fire,
                position: Vec2::new(120.0, 80.5),
            })
        );
        assert!(parse_tower("fire").is_err());
        assert!(parse_tower("plasma@1,2").is_err());
        assert!(parse_tower("water@1").is_err());
        assert!(parse_tower("water@x,2").is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "crystal-defence",
            "--seed",
            "9",
            "--tower",
            "light@300,40",
            "--tower",
            "air@340,40",
            "--export",
        ])
        .expect("valid flags");
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.towers.len(), 2);
        assert_eq!(cli.waves, 3);
        assert!(cli.export);
    }
}
