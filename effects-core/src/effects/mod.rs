//! Effect value objects.
//!
//! An [`Effect`] is produced once by the extractor and never mutated; a
//! re-extracted item yields fresh instances.

use serde::{Deserialize, Serialize};

use crate::catalog::{EffectCategory, EffectType, EffectUnit};
use crate::constants::{MAX_STACKS_CORE, MAX_STACKS_DEFAULT, MAX_STACKS_PROJECTILES};

/// Where an effect was read from on the item record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSource {
    /// The record's declared effect descriptor
    Declared,
    /// A free-form trait matched by keyword
    Trait(String),
}

/// A single gameplay modifier contributed by one equipped item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub effect_type: EffectType,
    /// Already rarity-scaled and capped to the catalog max
    pub value: f64,
    pub unit: EffectUnit,
    pub category: EffectCategory,
    pub stackable: bool,
    pub max_stacks: u32,
    /// Seconds; 0 = permanent
    pub duration: f64,
    /// Seconds between activations; 0 = always on
    pub cooldown: f64,
    pub source: EffectSource,
}

impl Effect {
    pub fn is_permanent(&self) -> bool {
        self.duration <= 0.0
    }

    /// Short label for summary UI, e.g. `+15% Health Boost`
    pub fn describe(&self) -> String {
        let amount = format_amount(self.value);
        match self.unit {
            EffectUnit::Percent => format!("+{amount}% {}", self.effect_type.display_name()),
            EffectUnit::Flat => format!("+{amount} {}", self.effect_type.display_name()),
            EffectUnit::Count => format!("{amount}x {}", self.effect_type.display_name()),
        }
    }
}

/// Stack limit carried on each effect instance
pub fn max_stacks_for(effect_type: EffectType) -> u32 {
    match effect_type {
        EffectType::MultipleProjectiles => MAX_STACKS_PROJECTILES,
        EffectType::HealthBoost | EffectType::WeaponDamageBoost => MAX_STACKS_CORE,
        _ => MAX_STACKS_DEFAULT,
    }
}

fn format_amount(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let s = format!("{value:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
