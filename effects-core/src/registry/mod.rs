//! Equipment registry: the set of currently equipped collectibles.
//!
//! Items are stored in insertion order. Order carries no aggregation meaning;
//! it only keeps summaries stable for UI.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::{EffectCatalog, RarityTier};
use crate::effects::Effect;
use crate::error::EffectsError;
use crate::extractor::EffectExtractor;
use crate::item::ItemRecord;

/// An item held by the registry together with its extracted effects.
/// Never edited in place; re-extraction replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquippedItem {
    pub id: String,
    pub rarity: Option<RarityTier>,
    /// Tier text as supplied by the inventory service
    pub rarity_label: String,
    pub effects: Vec<Effect>,
    pub equipped_at_ms: u64,
}

/// Currently equipped items for one player session
#[derive(Debug, Clone, Default)]
pub struct EquipmentRegistry {
    items: Vec<EquippedItem>,
}

impl EquipmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equip one item. Returns `false` without storing anything when the id is
    /// already equipped or the record yields no effects.
    pub fn equip(&mut self, item: &ItemRecord, catalog: &EffectCatalog) -> bool {
        if item.id.is_empty() {
            let err = EffectsError::malformed("<missing>", "item has no id");
            tracing::warn!(%err, "equip rejected");
            return false;
        }
        if self.contains(&item.id) {
            tracing::debug!(item_id = %item.id, "already equipped");
            return false;
        }

        let report = EffectExtractor::new(catalog).extract_detailed(item);
        for issue in &report.skipped {
            tracing::warn!(item_id = %item.id, %issue, "effect skipped");
        }
        if report.effects.is_empty() {
            let err = EffectsError::malformed(&item.id, "no extractable effects");
            tracing::warn!(%err, "equip rejected");
            return false;
        }

        tracing::debug!(
            item_id = %item.id,
            effects = report.effects.len(),
            "equipped"
        );
        self.items.push(EquippedItem {
            id: item.id.clone(),
            rarity: report.rarity,
            rarity_label: item.rarity.clone(),
            effects: report.effects,
            equipped_at_ms: now_ms(),
        });
        true
    }

    /// Remove an item; returns whether anything was removed
    pub fn unequip(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            tracing::debug!(item_id = %id, "unequipped");
        }
        removed
    }

    /// Replace an equipped item by re-extracting its record.
    /// Returns whether the id is equipped afterwards.
    pub fn refresh(&mut self, item: &ItemRecord, catalog: &EffectCatalog) -> bool {
        self.unequip(&item.id);
        self.equip(item, catalog)
    }

    /// Equip every candidate that is not listed for trade and carries at least
    /// one effect. Returns the number of items newly equipped.
    pub fn auto_equip(&mut self, candidates: &[ItemRecord], catalog: &EffectCatalog) -> usize {
        let equipped = candidates
            .iter()
            .filter(|item| {
                if item.listed_for_trade {
                    tracing::trace!(item_id = %item.id, "listed for trade, not auto-equipped");
                }
                !item.listed_for_trade
            })
            .filter(|item| self.equip(item, catalog))
            .count();
        tracing::info!(
            candidates = candidates.len(),
            equipped,
            "auto-equip finished"
        );
        equipped
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Read-only snapshot of equipped items
    pub fn get_all(&self) -> &[EquippedItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&EquippedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All effects across all equipped items
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.items.iter().flat_map(|item| item.effects.iter())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
