//! Stat aggregation: equipped effects + base stats → derived player stats.
//!
//! Every pass recomputes from the full item set. Per type, non-stacking
//! effects take the maximum and stacking effects sum; the sum is not
//! re-capped. Values are sorted before summing so the result is bit-exact
//! regardless of equip order.

use bevy::prelude::Component;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{EffectCatalog, EffectType};
use crate::constants::*;
use crate::effects::Effect;
use crate::logging::TimingSpan;
use crate::registry::EquipmentRegistry;

/// Unmodified player attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    pub health: f64,
    pub damage: f64,
    pub speed: f64,
    /// Milliseconds between shots
    pub fire_rate: f64,
    pub projectile_count: u32,
    pub bullet_speed: f64,
    pub bullet_lifetime: f64,
    pub magnetic_range: f64,
    pub experience_multiplier: f64,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            health: BASE_HEALTH,
            damage: BASE_DAMAGE,
            speed: BASE_SPEED,
            fire_rate: BASE_FIRE_RATE,
            projectile_count: BASE_PROJECTILE_COUNT,
            bullet_speed: BASE_BULLET_SPEED,
            bullet_lifetime: BASE_BULLET_LIFETIME,
            magnetic_range: BASE_MAGNETIC_RANGE,
            experience_multiplier: BASE_EXPERIENCE_MULTIPLIER,
        }
    }
}

/// Derived stats, rebuilt wholesale on every aggregation pass
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub max_health: f64,
    pub current_health: f64,
    pub damage: f64,
    pub speed: f64,
    pub fire_rate: f64,
    pub projectile_count: u32,
    pub critical_chance: f64,
    pub shield_strength: f64,
    pub bullet_speed: f64,
    pub bullet_lifetime: f64,
    pub magnetic_range: f64,
    pub experience_multiplier: f64,
}

impl PlayerStats {
    /// Stats with no equipment applied
    pub fn from_base(base: &BaseStats) -> Self {
        Self {
            max_health: base.health,
            current_health: base.health,
            damage: base.damage,
            speed: base.speed,
            fire_rate: base.fire_rate,
            projectile_count: base.projectile_count,
            critical_chance: 0.0,
            shield_strength: 0.0,
            bullet_speed: base.bullet_speed,
            bullet_lifetime: base.bullet_lifetime,
            magnetic_range: base.magnetic_range,
            experience_multiplier: base.experience_multiplier,
        }
    }
}

/// Combined value per effect type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectTotals {
    totals: BTreeMap<EffectType, f64>,
}

impl EffectTotals {
    pub fn compute<'a>(
        effects: impl IntoIterator<Item = &'a Effect>,
        catalog: &EffectCatalog,
    ) -> Self {
        let totals = group_by_type(effects)
            .into_iter()
            .map(|(effect_type, group)| {
                let values: Vec<f64> = group.iter().map(|e| e.value).collect();
                let stackable = catalog.config(effect_type).stackable;
                (effect_type, combine(&values, stackable))
            })
            .collect();
        Self { totals }
    }

    /// Total for a type; 0 when nothing contributes
    pub fn get(&self, effect_type: EffectType) -> f64 {
        self.totals.get(&effect_type).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, effect_type: EffectType) -> bool {
        self.totals.contains_key(&effect_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectType, f64)> + '_ {
        self.totals.iter().map(|(t, v)| (*t, *v))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Group effects by type, keeping encounter order within each group
pub fn group_by_type<'a>(
    effects: impl IntoIterator<Item = &'a Effect>,
) -> BTreeMap<EffectType, Vec<Effect>> {
    let mut groups: BTreeMap<EffectType, Vec<Effect>> = BTreeMap::new();
    for effect in effects {
        groups
            .entry(effect.effect_type)
            .or_default()
            .push(effect.clone());
    }
    groups
}

/// Stacking rule: sum when stackable, otherwise the maximum
pub fn combine(values: &[f64], stackable: bool) -> f64 {
    if stackable {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted.iter().sum()
    } else {
        values.iter().copied().fold(0.0, f64::max)
    }
}

/// One full aggregation pass
pub fn recompute(
    registry: &EquipmentRegistry,
    base: &BaseStats,
    catalog: &EffectCatalog,
) -> PlayerStats {
    let _timing = TimingSpan::new("aggregation_pass");
    let totals = EffectTotals::compute(registry.effects(), catalog);
    let stats = apply_totals(&totals, base);
    tracing::debug!(items = registry.len(), types = totals.len(), "stats recomputed");
    stats
}

/// Apply per-type totals to base stats through the combination table
pub fn apply_totals(totals: &EffectTotals, base: &BaseStats) -> PlayerStats {
    let mut stats = PlayerStats::from_base(base);
    let boost = |value: f64, total: f64| value * (1.0 + total / PERCENT);

    for (effect_type, total) in totals.iter() {
        match effect_type {
            EffectType::HealthBoost => {
                stats.max_health = boost(base.health, total);
                stats.current_health = stats.max_health;
            }
            EffectType::WeaponDamageBoost => stats.damage = boost(base.damage, total),
            EffectType::MovementSpeed => stats.speed = boost(base.speed, total),
            EffectType::FireRate => {
                stats.fire_rate =
                    (base.fire_rate * (1.0 - total / PERCENT)).max(FIRE_RATE_FLOOR);
            }
            EffectType::MultipleProjectiles => {
                stats.projectile_count = (total.floor() as u32).max(MIN_PROJECTILE_COUNT);
            }
            EffectType::CriticalChance => stats.critical_chance = total.min(CRITICAL_CHANCE_CAP),
            EffectType::ShieldStrength => stats.shield_strength = total,
            EffectType::BulletSpeed => stats.bullet_speed = boost(base.bullet_speed, total),
            EffectType::BulletLifetime => {
                stats.bullet_lifetime = boost(base.bullet_lifetime, total)
            }
            EffectType::MagneticRange => stats.magnetic_range = boost(base.magnetic_range, total),
            EffectType::ExperienceBoost => {
                stats.experience_multiplier = base.experience_multiplier + total / PERCENT;
            }
            // Consumed by the mining loop through the query API
            EffectType::MiningEfficiency => {}
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{EffectDescriptor, ItemRecord};

    fn equip(registry: &mut EquipmentRegistry, id: &str, rarity: &str, ty: &str, raw: f64) {
        let catalog = EffectCatalog::default();
        let item = ItemRecord::new(id, rarity).with_effect(EffectDescriptor::new(ty, raw));
        assert!(registry.equip(&item, &catalog), "equip {id} failed");
    }

    fn stats_for(registry: &EquipmentRegistry) -> PlayerStats {
        recompute(registry, &BaseStats::default(), &EffectCatalog::default())
    }

    #[test]
    fn test_recompute_under_subscriber() {
        crate::logging::init_tracing_default();
        let mut registry = EquipmentRegistry::new();
        equip(&mut registry, "a", "rare", "magnetic_range", 10.0);
        let first = stats_for(&registry);
        assert_eq!(first, stats_for(&registry));
        assert!(first.magnetic_range > BaseStats::default().magnetic_range);
    }

    #[test]
    fn test_empty_registry_yields_base() {
        let registry = EquipmentRegistry::new();
        let stats = stats_for(&registry);
        assert_eq!(stats, PlayerStats::from_base(&BaseStats::default()));
        assert_eq!(stats.critical_chance, 0.0);
        assert_eq!(stats.shield_strength, 0.0);
    }

    #[test]
    fn test_health_boost_resets_current_health() {
        let mut registry = EquipmentRegistry::new();
        equip(&mut registry, "a", "common", "health_boost", 10.0);
        let stats = stats_for(&registry);
        assert!((stats.max_health - 115.0).abs() < 1e-9);
        assert_eq!(stats.current_health, stats.max_health);
    }

    #[test]
    fn test_stackable_sum_not_recapped() {
        let mut registry = EquipmentRegistry::new();
        for id in ["a", "b", "c"] {
            equip(&mut registry, id, "legendary", "weapon_damage_boost", 40.0);
        }
        // each capped at 100, total 300
        let stats = stats_for(&registry);
        assert!((stats.damage - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_fire_rate_floor() {
        let mut registry = EquipmentRegistry::new();
        for id in ["a", "b", "c"] {
            equip(&mut registry, id, "legendary", "fire_rate", 50.0);
        }
        assert_eq!(stats_for(&registry).fire_rate, FIRE_RATE_FLOOR);
    }

    #[test]
    fn test_fire_rate_reduction() {
        let mut registry = EquipmentRegistry::new();
        equip(&mut registry, "a", "common", "fire_rate", 10.0);
        // 500 x (1 - 0.12)
        assert!((stats_for(&registry).fire_rate - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_critical_chance_capped() {
        let mut registry = EquipmentRegistry::new();
        for id in ["a", "b", "c"] {
            equip(&mut registry, id, "legendary", "critical_chance", 20.0);
        }
        assert_eq!(stats_for(&registry).critical_chance, 100.0);
    }

    #[test]
    fn test_projectiles_take_max() {
        let mut registry = EquipmentRegistry::new();
        equip(&mut registry, "a", "rare", "multiple_projectiles", 2.0);
        equip(&mut registry, "b", "common", "multiple_projectiles", 2.0);
        // max(3, 2), not 5
        assert_eq!(stats_for(&registry).projectile_count, 3);
    }

    #[test]
    fn test_fractional_projectiles_floor() {
        let mut registry = EquipmentRegistry::new();
        equip(&mut registry, "a", "rare", "multiple_projectiles", 1.0);
        // 1.5 floors to 1
        assert_eq!(stats_for(&registry).projectile_count, 1);
    }

    #[test]
    fn test_flat_and_percent_fields() {
        let mut registry = EquipmentRegistry::new();
        equip(&mut registry, "s", "common", "shield_strength", 20.0);
        equip(&mut registry, "x", "common", "experience_boost", 25.0);
        equip(&mut registry, "m", "common", "magnetic_range", 10.0);
        let stats = stats_for(&registry);
        assert!((stats.shield_strength - 30.0).abs() < 1e-9);
        assert!((stats.experience_multiplier - 1.3).abs() < 1e-9);
        assert!((stats.magnetic_range - 50.0 * 1.13).abs() < 1e-9);
    }

    #[test]
    fn test_mining_only_in_totals() {
        let mut registry = EquipmentRegistry::new();
        equip(&mut registry, "m", "common", "mining_efficiency", 10.0);
        let catalog = EffectCatalog::default();
        let totals = EffectTotals::compute(registry.effects(), &catalog);
        assert!((totals.get(EffectType::MiningEfficiency) - 12.0).abs() < 1e-9);
        assert_eq!(
            stats_for(&registry),
            PlayerStats::from_base(&BaseStats::default())
        );
    }

    #[test]
    fn test_combine() {
        assert_eq!(combine(&[1.0, 2.0, 3.0], true), 6.0);
        assert_eq!(combine(&[1.0, 5.0, 3.0], false), 5.0);
        assert_eq!(combine(&[], true), 0.0);
        assert_eq!(combine(&[], false), 0.0);
    }

    #[test]
    fn test_group_by_type_keeps_order() {
        let mut registry = EquipmentRegistry::new();
        equip(&mut registry, "a", "common", "health_boost", 1.0);
        equip(&mut registry, "b", "common", "fire_rate", 1.0);
        equip(&mut registry, "c", "epic", "health_boost", 1.0);
        let groups = group_by_type(registry.effects());
        assert_eq!(groups.len(), 2);
        let health = &groups[&EffectType::HealthBoost];
        assert!((health[0].value - 1.5).abs() < 1e-9);
        assert!((health[1].value - 3.0).abs() < 1e-9);
    }
}
