//! Effects engine: one caller-owned bundle of catalog, registry and stats.
//!
//! Mutations only mark the cached stats stale. Callers batch their equip
//! changes and then run a single `recompute()`.

pub mod config;
pub mod plugin;

pub use config::EngineConfig;
pub use plugin::{EffectsPlugin, Loadout, RecomputeStats, StatsRecomputed};

use crate::aggregator::{self, BaseStats, PlayerStats};
use crate::catalog::EffectCatalog;
use crate::error::ConfigError;
use crate::item::ItemRecord;
use crate::query::EffectQuery;
use crate::registry::EquipmentRegistry;

#[derive(Debug, Clone)]
pub struct EffectsEngine {
    catalog: EffectCatalog,
    registry: EquipmentRegistry,
    base_stats: BaseStats,
    /// `None` while stale
    stats: Option<PlayerStats>,
}

impl Default for EffectsEngine {
    fn default() -> Self {
        Self::with_catalog(EffectCatalog::default(), BaseStats::default())
    }
}

impl EffectsEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = config.build_catalog()?;
        Ok(Self::with_catalog(catalog, config.base_stats))
    }

    pub fn with_catalog(catalog: EffectCatalog, base_stats: BaseStats) -> Self {
        Self {
            catalog,
            registry: EquipmentRegistry::new(),
            base_stats,
            stats: None,
        }
    }

    pub fn equip(&mut self, item: &ItemRecord) -> bool {
        let equipped = self.registry.equip(item, &self.catalog);
        if equipped {
            self.stats = None;
        }
        equipped
    }

    pub fn unequip(&mut self, id: &str) -> bool {
        let removed = self.registry.unequip(id);
        if removed {
            self.stats = None;
        }
        removed
    }

    pub fn refresh(&mut self, item: &ItemRecord) -> bool {
        self.stats = None;
        self.registry.refresh(item, &self.catalog)
    }

    pub fn auto_equip(&mut self, candidates: &[ItemRecord]) -> usize {
        let equipped = self.registry.auto_equip(candidates, &self.catalog);
        if equipped > 0 {
            self.stats = None;
        }
        equipped
    }

    pub fn clear(&mut self) {
        self.registry.clear();
        self.stats = None;
    }

    /// Run one aggregation pass and cache the result
    pub fn recompute(&mut self) -> &PlayerStats {
        let stats = aggregator::recompute(&self.registry, &self.base_stats, &self.catalog);
        self.stats.insert(stats)
    }

    /// Last computed stats, or `None` if anything changed since
    pub fn stats(&self) -> Option<&PlayerStats> {
        self.stats.as_ref()
    }

    pub fn is_stale(&self) -> bool {
        self.stats.is_none()
    }

    pub fn query(&self) -> EffectQuery<'_> {
        EffectQuery::new(&self.registry, &self.catalog)
    }

    pub fn registry(&self) -> &EquipmentRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    pub fn base_stats(&self) -> &BaseStats {
        &self.base_stats
    }

    pub fn set_base_stats(&mut self, base_stats: BaseStats) {
        self.base_stats = base_stats;
        self.stats = None;
    }
}
