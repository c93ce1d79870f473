use criterion::{black_box, criterion_group, criterion_main, Criterion};
use effects_core::aggregator::recompute;
use effects_core::balance::{run_loadout_simulation, LoadoutSimConfig};
use effects_core::extractor::EffectExtractor;
use effects_core::{
    parse_inventory, BaseStats, EffectCatalog, EffectDescriptor, EffectType, EffectsEngine,
    ItemRecord,
};

fn loadout(size: usize) -> Vec<ItemRecord> {
    let tiers = ["common", "rare", "epic", "legendary"];
    (0..size)
        .map(|i| {
            let effect_type = EffectType::ALL[i % EffectType::ALL.len()];
            ItemRecord::new(format!("item-{i}"), tiers[i % tiers.len()])
                .with_effect(EffectDescriptor::new(effect_type.as_str(), (i % 30) as f64))
                .with_trait("Critical", format!("{}%", i % 7))
        })
        .collect()
}

fn bench_extraction(c: &mut Criterion) {
    let catalog = EffectCatalog::default();
    let item = ItemRecord::new("bench", "epic")
        .with_effect(EffectDescriptor::new("weaponDamageBoost", 25.0))
        .with_trait("Fire Rate", "10%")
        .with_trait("Pickup Range", 12)
        .with_trait("Background", "Gold");

    c.bench_function("extract_item", |b| {
        let extractor = EffectExtractor::new(&catalog);
        b.iter(|| extractor.extract(black_box(&item)))
    });
}

fn bench_aggregation(c: &mut Criterion) {
    let catalog = EffectCatalog::default();
    let base = BaseStats::default();

    for size in [6, 50] {
        let mut engine = EffectsEngine::default();
        engine.auto_equip(&loadout(size));
        c.bench_function(&format!("recompute_{size}_items"), |b| {
            b.iter(|| recompute(black_box(engine.registry()), &base, &catalog))
        });
    }
}

fn bench_equip_cycle(c: &mut Criterion) {
    let items = loadout(12);
    c.bench_function("auto_equip_and_recompute_12", |b| {
        b.iter(|| {
            let mut engine = EffectsEngine::default();
            engine.auto_equip(black_box(&items));
            *engine.recompute()
        })
    });
}

fn bench_inventory_parse(c: &mut Criterion) {
    let json = serde_json::to_string(&loadout(100)).unwrap_or_default();
    c.bench_function("parse_inventory_100", |b| {
        b.iter(|| parse_inventory(black_box(&json)))
    });
}

fn bench_simulation(c: &mut Criterion) {
    let config = LoadoutSimConfig {
        sample_count: 1_000,
        ..Default::default()
    };
    c.bench_function("loadout_simulation_1k", |b| {
        b.iter(|| run_loadout_simulation(black_box(&config)))
    });
}

criterion_group!(
    benches,
    bench_extraction,
    bench_aggregation,
    bench_equip_cycle,
    bench_inventory_parse,
    bench_simulation
);
criterion_main!(benches);
