//! Read-only views over equipped effects for UI and gameplay consumers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregator::{group_by_type, EffectTotals};
use crate::catalog::{EffectCatalog, EffectCategory, EffectType, EffectUnit};
use crate::effects::Effect;
use crate::registry::EquipmentRegistry;

pub struct EffectQuery<'a> {
    registry: &'a EquipmentRegistry,
    catalog: &'a EffectCatalog,
}

impl<'a> EffectQuery<'a> {
    pub fn new(registry: &'a EquipmentRegistry, catalog: &'a EffectCatalog) -> Self {
        Self { registry, catalog }
    }

    /// Effects grouped by type, in registry order within each group
    pub fn effects_by_type(&self) -> BTreeMap<EffectType, Vec<Effect>> {
        group_by_type(self.registry.effects())
    }

    /// Combined total for one type under the same max/sum rule as aggregation
    pub fn total_for(&self, effect_type: EffectType) -> f64 {
        let values: Vec<f64> = self
            .registry
            .effects()
            .filter(|e| e.effect_type == effect_type)
            .map(|e| e.value)
            .collect();
        crate::aggregator::combine(&values, self.catalog.config(effect_type).stackable)
    }

    pub fn has_any(&self, effect_type: EffectType) -> bool {
        self.registry
            .effects()
            .any(|e| e.effect_type == effect_type)
    }

    pub fn total_equipped_count(&self) -> usize {
        self.registry.len()
    }

    pub fn totals(&self) -> EffectTotals {
        EffectTotals::compute(self.registry.effects(), self.catalog)
    }

    /// Snapshot for the equipped-items panel
    pub fn summary(&self) -> EquipmentSummary {
        let items = self
            .registry
            .get_all()
            .iter()
            .map(|item| ItemSummary {
                id: item.id.clone(),
                rarity: item.rarity_label.clone(),
                effects: item.effects.iter().map(Effect::describe).collect(),
            })
            .collect();

        let totals = self
            .totals()
            .iter()
            .map(|(effect_type, total)| {
                let config = self.catalog.config(effect_type);
                TypeTotal {
                    effect_type,
                    total,
                    unit: config.unit,
                    category: config.category,
                    contributors: self
                        .registry
                        .get_all()
                        .iter()
                        .filter(|item| item.effects.iter().any(|e| e.effect_type == effect_type))
                        .count(),
                }
            })
            .collect();

        EquipmentSummary {
            equipped_count: self.total_equipped_count(),
            items,
            totals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub rarity: String,
    pub effects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeTotal {
    pub effect_type: EffectType,
    pub total: f64,
    pub unit: EffectUnit,
    pub category: EffectCategory,
    /// Number of equipped items granting this type
    pub contributors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSummary {
    pub equipped_count: usize,
    pub items: Vec<ItemSummary>,
    pub totals: Vec<TypeTotal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{EffectDescriptor, ItemRecord};

    fn loaded_registry(catalog: &EffectCatalog) -> EquipmentRegistry {
        let mut registry = EquipmentRegistry::new();
        let items = [
            ItemRecord::new("a", "common").with_effect(EffectDescriptor::new("health_boost", 10.0)),
            ItemRecord::new("b", "rare").with_effect(EffectDescriptor::new("health_boost", 15.0)),
            ItemRecord::new("c", "legendary")
                .with_effect(EffectDescriptor::new("multiple_projectiles", 3.0)),
            ItemRecord::new("d", "common")
                .with_effect(EffectDescriptor::new("multiple_projectiles", 1.0))
                .with_trait("Critical", "4%"),
        ];
        for item in &items {
            assert!(registry.equip(item, catalog));
        }
        registry
    }

    #[test]
    fn test_total_for_uses_stacking_rule() {
        let catalog = EffectCatalog::default();
        let registry = loaded_registry(&catalog);
        let query = EffectQuery::new(&registry, &catalog);
        assert!((query.total_for(EffectType::HealthBoost) - 48.75).abs() < 1e-9);
        assert_eq!(query.total_for(EffectType::MultipleProjectiles), 5.0);
        assert_eq!(query.total_for(EffectType::ShieldStrength), 0.0);
    }

    #[test]
    fn test_has_any_and_count() {
        let catalog = EffectCatalog::default();
        let registry = loaded_registry(&catalog);
        let query = EffectQuery::new(&registry, &catalog);
        assert!(query.has_any(EffectType::CriticalChance));
        assert!(!query.has_any(EffectType::MiningEfficiency));
        assert_eq!(query.total_equipped_count(), 4);
    }

    #[test]
    fn test_effects_by_type() {
        let catalog = EffectCatalog::default();
        let registry = loaded_registry(&catalog);
        let groups = EffectQuery::new(&registry, &catalog).effects_by_type();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&EffectType::HealthBoost].len(), 2);
        assert_eq!(groups[&EffectType::MultipleProjectiles].len(), 2);
        assert_eq!(groups[&EffectType::CriticalChance].len(), 1);
    }

    #[test]
    fn test_summary() {
        let catalog = EffectCatalog::default();
        let registry = loaded_registry(&catalog);
        let summary = EffectQuery::new(&registry, &catalog).summary();
        assert_eq!(summary.equipped_count, 4);
        assert_eq!(summary.items[0].effects, vec!["+15% Health Boost".to_string()]);
        assert_eq!(summary.items[3].effects.len(), 2);

        let projectiles = summary
            .totals
            .iter()
            .find(|t| t.effect_type == EffectType::MultipleProjectiles)
            .unwrap();
        assert_eq!(projectiles.total, 5.0);
        assert_eq!(projectiles.contributors, 2);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"multiple_projectiles\""));
    }
}
