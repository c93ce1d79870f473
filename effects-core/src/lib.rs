//! Collectible Effects - Core Library
//!
//! Turns owned collectible items into derived player combat stats:
//! - Effect catalog (per-type scaling, caps, stacking, rarity multipliers)
//! - Lenient item intake (declared effect descriptors + free-form traits)
//! - Effect extraction with rarity scaling and per-item caps
//! - Equipment registry (equip / unequip / refresh / auto-equip)
//! - Stat aggregation into `PlayerStats`
//! - Query views and UI summaries
//! - Bevy plugin for per-entity loadouts
//! - Monte-Carlo loadout balance simulation

pub mod aggregator;
pub mod balance;
pub mod catalog;
pub mod constants;
pub mod effects;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod item;
pub mod logging;
pub mod query;
pub mod registry;

pub use aggregator::{BaseStats, EffectTotals, PlayerStats};
pub use catalog::{EffectCatalog, EffectCategory, EffectConfig, EffectType, EffectUnit, RarityTier};
pub use effects::{Effect, EffectSource};
pub use engine::{EffectsEngine, EngineConfig};
pub use error::{ConfigError, EffectsError};
pub use item::{parse_inventory, EffectDescriptor, ItemRecord, ItemTrait};
pub use query::{EffectQuery, EquipmentSummary};
pub use registry::{EquipmentRegistry, EquippedItem};
