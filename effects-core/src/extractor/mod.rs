//! Effect extraction: raw item record → typed, scaled, capped effects.
//!
//! Two sources are read from a record:
//! - the declared effect descriptor (`{type, rawValue, unit}`)
//! - free-form traits whose names match a known keyword and carry a number
//!
//! Scaling: `min(raw × rarity_multiplier × scaling_factor, max_value)`.
//! An item yields at most one effect per type; the declared descriptor wins
//! over traits, earlier traits over later ones.

use serde_json::Value;

use crate::catalog::{normalize_key, EffectCatalog, EffectType, EffectUnit, RarityTier};
use crate::effects::{max_stacks_for, Effect, EffectSource};
use crate::error::EffectsError;
use crate::item::{parse_numeric, EffectDescriptor, ItemRecord};

/// Trait-name keywords, most specific first. Each keyword is a sequence of
/// word stems matched against consecutive words of the trait name.
const TRAIT_KEYWORDS: &[(&str, EffectType)] = &[
    ("bullet_speed", EffectType::BulletSpeed),
    ("projectile_speed", EffectType::BulletSpeed),
    ("bullet_lifetime", EffectType::BulletLifetime),
    ("lifetime", EffectType::BulletLifetime),
    ("fire_rate", EffectType::FireRate),
    ("attack_speed", EffectType::FireRate),
    ("cooldown", EffectType::FireRate),
    ("projectile", EffectType::MultipleProjectiles),
    ("multishot", EffectType::MultipleProjectiles),
    ("crit", EffectType::CriticalChance),
    ("magnet", EffectType::MagneticRange),
    ("pickup_range", EffectType::MagneticRange),
    ("experience", EffectType::ExperienceBoost),
    ("xp", EffectType::ExperienceBoost),
    ("mining", EffectType::MiningEfficiency),
    ("shield", EffectType::ShieldStrength),
    ("armor", EffectType::ShieldStrength),
    ("health", EffectType::HealthBoost),
    ("hp", EffectType::HealthBoost),
    ("vitality", EffectType::HealthBoost),
    ("damage", EffectType::WeaponDamageBoost),
    ("attack", EffectType::WeaponDamageBoost),
    ("power", EffectType::WeaponDamageBoost),
    ("speed", EffectType::MovementSpeed),
    ("agility", EffectType::MovementSpeed),
];

/// Effects pulled from one record plus the soft failures met on the way
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub effects: Vec<Effect>,
    pub skipped: Vec<EffectsError>,
    /// `None` when the record's tier label is not recognized
    pub rarity: Option<RarityTier>,
}

/// Stateless extractor bound to a catalog
#[derive(Debug, Clone, Copy)]
pub struct EffectExtractor<'a> {
    catalog: &'a EffectCatalog,
}

impl<'a> EffectExtractor<'a> {
    pub fn new(catalog: &'a EffectCatalog) -> Self {
        Self { catalog }
    }

    /// Extract effects, logging anything that had to be skipped
    pub fn extract(&self, item: &ItemRecord) -> Vec<Effect> {
        let report = self.extract_detailed(item);
        for issue in &report.skipped {
            tracing::warn!(item_id = %item.id, %issue, "effect skipped");
        }
        report.effects
    }

    pub fn extract_detailed(&self, item: &ItemRecord) -> ExtractionReport {
        let rarity = RarityTier::parse(&item.rarity).ok();
        let multiplier = self.catalog.rarity_multiplier_for(&item.rarity);
        let mut report = ExtractionReport {
            rarity,
            ..Default::default()
        };

        if let Some(descriptor) = &item.effect {
            match self.from_descriptor(&item.id, descriptor, multiplier) {
                Ok(effect) => report.effects.push(effect),
                Err(err) => report.skipped.push(err),
            }
        }

        for item_trait in &item.traits {
            let Some(effect_type) = match_trait_keyword(&item_trait.name) else {
                tracing::trace!(item_id = %item.id, name = %item_trait.name, "unrecognized trait");
                continue;
            };
            if report.effects.iter().any(|e| e.effect_type == effect_type) {
                continue;
            }
            let Some(raw) = item_trait.numeric_value().filter(|v| *v >= 0.0) else {
                tracing::trace!(item_id = %item.id, name = %item_trait.name, "trait has no usable amount");
                continue;
            };
            report.effects.push(self.build(
                effect_type,
                raw,
                multiplier,
                None,
                Timing::default(),
                EffectSource::Trait(item_trait.name.clone()),
            ));
        }

        report
    }

    /// Rarity-scaled value clamped to `[0, max_value]`
    pub fn scale(&self, effect_type: EffectType, raw: f64, rarity_multiplier: f64) -> f64 {
        let config = self.catalog.config(effect_type);
        (raw.max(0.0) * rarity_multiplier * config.scaling_factor).min(config.max_value)
    }

    fn from_descriptor(
        &self,
        item_id: &str,
        descriptor: &EffectDescriptor,
        multiplier: f64,
    ) -> Result<Effect, EffectsError> {
        let effect_type = EffectType::parse(&descriptor.effect_type)?;

        let raw = match &descriptor.value {
            None => self.catalog.config(effect_type).base_value,
            Some(value) => parse_numeric(value).ok_or_else(|| {
                EffectsError::malformed(item_id, format!("effect value {value} is not a number"))
            })?,
        };
        if raw < 0.0 {
            return Err(EffectsError::malformed(
                item_id,
                format!("negative effect value {raw}"),
            ));
        }

        let unit = descriptor.unit.as_deref().and_then(EffectUnit::parse);
        let timing = Timing {
            duration: non_negative(descriptor.duration.as_ref()),
            cooldown: non_negative(descriptor.cooldown.as_ref()),
        };

        Ok(self.build(
            effect_type,
            raw,
            multiplier,
            unit,
            timing,
            EffectSource::Declared,
        ))
    }

    fn build(
        &self,
        effect_type: EffectType,
        raw: f64,
        multiplier: f64,
        unit: Option<EffectUnit>,
        timing: Timing,
        source: EffectSource,
    ) -> Effect {
        let config = self.catalog.config(effect_type);
        Effect {
            effect_type,
            value: self.scale(effect_type, raw, multiplier),
            unit: unit.unwrap_or(config.unit),
            category: config.category,
            stackable: config.stackable,
            max_stacks: max_stacks_for(effect_type),
            duration: timing.duration,
            cooldown: timing.cooldown,
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Timing {
    duration: f64,
    cooldown: f64,
}

fn non_negative(value: Option<&Value>) -> f64 {
    value.and_then(parse_numeric).unwrap_or(0.0).max(0.0)
}

/// Map a free-form trait name to an effect type by keyword
pub fn match_trait_keyword(name: &str) -> Option<EffectType> {
    let key = normalize_key(name);
    let words: Vec<&str> = key.split('_').filter(|w| !w.is_empty()).collect();

    TRAIT_KEYWORDS.iter().find_map(|(keyword, effect_type)| {
        let stems: Vec<&str> = keyword.split('_').collect();
        words
            .windows(stems.len())
            .any(|window| window.iter().zip(&stems).all(|(w, s)| w.starts_with(s)))
            .then_some(*effect_type)
    })
}
