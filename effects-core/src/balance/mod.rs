//! Monte-Carlo Loadout Simulation
//!
//! Generates deterministic synthetic loadouts, runs each through a fresh
//! engine and reports stat spreads, per-type headroom over the single-item
//! cap, and any breach of the aggregation invariants.
//! Uses rayon for parallel execution across CPU cores.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::aggregator::{BaseStats, EffectTotals, PlayerStats};
use crate::catalog::{EffectCatalog, EffectType, RarityTier};
use crate::constants::{CRITICAL_CHANCE_CAP, FIRE_RATE_FLOOR, MIN_PROJECTILE_COUNT};
use crate::engine::EffectsEngine;
use crate::item::{EffectDescriptor, ItemRecord};
use crate::logging::TimingSpan;

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct LoadoutSimConfig {
    pub sample_count: u64,
    pub base_seed: u64,
    pub items_per_loadout: usize,
    pub base_stats: BaseStats,
    pub catalog: EffectCatalog,
}

impl Default for LoadoutSimConfig {
    fn default() -> Self {
        Self {
            sample_count: 10_000,
            base_seed: 42,
            items_per_loadout: 6,
            base_stats: BaseStats::default(),
            catalog: EffectCatalog::default(),
        }
    }
}

/// Mean and maximum of one derived stat across all samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSpread {
    pub stat: String,
    pub mean: f64,
    pub max: f64,
}

/// Largest aggregate seen for a type against the single-item cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeHeadroom {
    pub effect_type: EffectType,
    pub max_total: f64,
    pub item_cap: f64,
    /// `max_total / item_cap`; above 1.0 means stacking beat the cap
    pub ratio: f64,
}

/// Samples breaking an aggregation invariant. All counts should be zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantViolations {
    pub fire_rate_floor: u64,
    pub critical_chance_cap: u64,
    pub projectile_sum: u64,
}

impl InvariantViolations {
    pub fn total(&self) -> u64 {
        self.fire_rate_floor + self.critical_chance_cap + self.projectile_sum
    }
}

/// Results of a loadout simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadoutReport {
    pub samples: u64,
    pub items_per_loadout: usize,
    pub stats: Vec<StatSpread>,
    pub headroom: Vec<TypeHeadroom>,
    pub violations: InvariantViolations,
}

struct SampleOutcome {
    stats: PlayerStats,
    totals: EffectTotals,
    violations: InvariantViolations,
}

/// Hash-derived 64-bit value for (seed, sample, slot)
fn sample_hash(seed: u64, sample: u64, slot: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(sample.to_le_bytes());
    hasher.update(slot.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Generate a deterministic synthetic item from a hash
fn generate_item(hash: u64, sample: u64, slot: usize) -> ItemRecord {
    let effect_type = EffectType::ALL[(hash % EffectType::ALL.len() as u64) as usize];
    let rarity = RarityTier::ALL[((hash >> 8) % RarityTier::ALL.len() as u64) as usize];
    let raw_range = match effect_type {
        EffectType::MultipleProjectiles => 3,
        _ => 40,
    };
    let raw = (1 + (hash >> 16) % raw_range) as f64;

    let mut item = ItemRecord::new(format!("sim-{sample}-{slot}"), rarity.as_str())
        .with_effect(EffectDescriptor::new(effect_type.as_str(), raw));
    // roughly one item in four also carries a crit trait
    if (hash >> 32) % 4 == 0 {
        item = item.with_trait("Critical Chance", format!("{}%", 1 + (hash >> 40) % 20));
    }
    item
}

fn simulate_sample(config: &LoadoutSimConfig, sample: u64) -> SampleOutcome {
    let items: Vec<ItemRecord> = (0..config.items_per_loadout)
        .map(|slot| {
            let hash = sample_hash(config.base_seed, sample, slot as u64);
            generate_item(hash, sample, slot)
        })
        .collect();

    let mut engine = EffectsEngine::with_catalog(config.catalog.clone(), config.base_stats);
    engine.auto_equip(&items);
    let stats = *engine.recompute();
    let totals = engine.query().totals();

    let largest_projectile = engine
        .registry()
        .effects()
        .filter(|e| e.effect_type == EffectType::MultipleProjectiles)
        .map(|e| e.value)
        .fold(0.0, f64::max);
    let expected_projectiles = if totals.contains(EffectType::MultipleProjectiles) {
        (largest_projectile.floor() as u32).max(MIN_PROJECTILE_COUNT)
    } else {
        config.base_stats.projectile_count
    };

    let violations = InvariantViolations {
        fire_rate_floor: u64::from(stats.fire_rate < FIRE_RATE_FLOOR),
        critical_chance_cap: u64::from(stats.critical_chance > CRITICAL_CHANCE_CAP),
        projectile_sum: u64::from(stats.projectile_count != expected_projectiles),
    };

    SampleOutcome {
        stats,
        totals,
        violations,
    }
}

fn stat_fields(stats: &PlayerStats) -> [(&'static str, f64); 11] {
    [
        ("max_health", stats.max_health),
        ("damage", stats.damage),
        ("speed", stats.speed),
        ("fire_rate", stats.fire_rate),
        ("projectile_count", f64::from(stats.projectile_count)),
        ("critical_chance", stats.critical_chance),
        ("shield_strength", stats.shield_strength),
        ("bullet_speed", stats.bullet_speed),
        ("bullet_lifetime", stats.bullet_lifetime),
        ("magnetic_range", stats.magnetic_range),
        ("experience_multiplier", stats.experience_multiplier),
    ]
}

/// Run the loadout simulation with rayon parallelism
pub fn run_loadout_simulation(config: &LoadoutSimConfig) -> LoadoutReport {
    let _timing = TimingSpan::new("loadout_simulation");
    let outcomes: Vec<SampleOutcome> = (0..config.sample_count)
        .into_par_iter()
        .map(|sample| simulate_sample(config, sample))
        .collect();

    let report = analyze_outcomes(&outcomes, config);
    if report.violations.total() > 0 {
        tracing::error!(violations = ?report.violations, "aggregation invariants violated");
    }
    tracing::info!(samples = report.samples, "loadout simulation finished");
    report
}

fn analyze_outcomes(outcomes: &[SampleOutcome], config: &LoadoutSimConfig) -> LoadoutReport {
    let count = outcomes.len().max(1) as f64;

    let mut sums = [0.0f64; 11];
    let mut maxima = [0.0f64; 11];
    let mut violations = InvariantViolations::default();
    for outcome in outcomes {
        for (i, (_, value)) in stat_fields(&outcome.stats).into_iter().enumerate() {
            sums[i] += value;
            maxima[i] = maxima[i].max(value);
        }
        violations.fire_rate_floor += outcome.violations.fire_rate_floor;
        violations.critical_chance_cap += outcome.violations.critical_chance_cap;
        violations.projectile_sum += outcome.violations.projectile_sum;
    }

    let names = stat_fields(&PlayerStats::from_base(&config.base_stats)).map(|(name, _)| name);
    let stats = names
        .iter()
        .enumerate()
        .map(|(i, name)| StatSpread {
            stat: name.to_string(),
            mean: sums[i] / count,
            max: maxima[i],
        })
        .collect();

    let headroom = EffectType::ALL
        .iter()
        .map(|&effect_type| {
            let max_total = outcomes
                .iter()
                .map(|o| o.totals.get(effect_type))
                .fold(0.0, f64::max);
            let item_cap = config.catalog.config(effect_type).max_value;
            TypeHeadroom {
                effect_type,
                max_total,
                item_cap,
                ratio: if item_cap > 0.0 { max_total / item_cap } else { 0.0 },
            }
        })
        .collect();

    LoadoutReport {
        samples: outcomes.len() as u64,
        items_per_loadout: config.items_per_loadout,
        stats,
        headroom,
        violations,
    }
}
