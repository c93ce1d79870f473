//! Effects CLI
//!
//! Usage:
//!   effects-core <inventory.json> [--config <engine.json|engine.ron>]
//!   effects-core --simulate <count> [--seed <n>] [--items <n>]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use effects_core::balance::{run_loadout_simulation, LoadoutSimConfig};
use effects_core::logging::{init_tracing, init_tracing_default};
use effects_core::{parse_inventory, EffectsEngine, EngineConfig, EquipmentSummary, PlayerStats};

#[derive(Debug, PartialEq)]
enum Command {
    Inspect {
        inventory: PathBuf,
        config: Option<PathBuf>,
    },
    Simulate {
        samples: u64,
        seed: u64,
        items: usize,
    },
}

#[derive(Serialize)]
struct InspectOutput {
    stats: PlayerStats,
    summary: EquipmentSummary,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args)? {
        Command::Inspect { inventory, config } => inspect(&inventory, config.as_deref()),
        Command::Simulate {
            samples,
            seed,
            items,
        } => simulate(samples, seed, items),
    }
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut inventory = None;
    let mut config = None;
    let mut samples = None;
    let mut seed = LoadoutSimConfig::default().base_seed;
    let mut items = LoadoutSimConfig::default().items_per_loadout;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--simulate" => {
                samples = Some(
                    flag_value(&mut iter, arg)?
                        .parse::<u64>()
                        .context("--simulate expects a sample count")?,
                )
            }
            "--seed" => {
                seed = flag_value(&mut iter, arg)?
                    .parse::<u64>()
                    .context("--seed expects an integer")?
            }
            "--items" => {
                items = flag_value(&mut iter, arg)?
                    .parse::<usize>()
                    .context("--items expects an integer")?
            }
            "-h" | "--help" => bail!(usage()),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{}", usage()),
            path => {
                if inventory.replace(PathBuf::from(path)).is_some() {
                    bail!("only one inventory file may be given\n{}", usage());
                }
            }
        }
    }

    match (samples, inventory) {
        (Some(samples), None) => Ok(Command::Simulate {
            samples,
            seed,
            items,
        }),
        (None, Some(inventory)) => Ok(Command::Inspect { inventory, config }),
        (Some(_), Some(_)) => bail!("--simulate does not take an inventory file\n{}", usage()),
        (None, None) => bail!(usage()),
    }
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .with_context(|| format!("{flag} requires a value"))
}

fn usage() -> String {
    "usage: effects-core <inventory.json> [--config <engine.json|engine.ron>]\n       \
     effects-core --simulate <count> [--seed <n>] [--items <n>]"
        .to_string()
}

fn inspect(inventory: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    init_tracing(&config.tracing);

    let json = std::fs::read_to_string(inventory)
        .with_context(|| format!("failed to read inventory {}", inventory.display()))?;
    let records = parse_inventory(&json)
        .with_context(|| format!("failed to parse inventory {}", inventory.display()))?;

    let mut engine = EffectsEngine::new(&config).context("invalid engine config")?;
    let equipped = engine.auto_equip(&records);
    tracing::info!(records = records.len(), equipped, "inventory loaded");

    let output = InspectOutput {
        stats: *engine.recompute(),
        summary: engine.query().summary(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn simulate(samples: u64, seed: u64, items: usize) -> Result<()> {
    init_tracing_default();
    let config = LoadoutSimConfig {
        sample_count: samples,
        base_seed: seed,
        items_per_loadout: items,
        ..Default::default()
    };
    let report = run_loadout_simulation(&config);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.violations.total() > 0 {
        bail!("{} invariant violations", report.violations.total());
    }
    Ok(())
}
