//! Owned-item records from the external inventory service.
//!
//! Records are semi-structured and produced by an independently evolving
//! content pipeline, so every field deserializes leniently: a malformed field
//! falls back to its default instead of rejecting the whole record. Feeds
//! often carry several spellings of one field (`id` next to `tokenId`); each
//! field is read from the first spelling that holds a usable value.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EffectsError;

const ID_KEYS: &[&str] = &["id", "tokenId", "token_id"];
const RARITY_KEYS: &[&str] = &["rarity", "tier"];
const EFFECT_KEYS: &[&str] = &["effect", "primaryEffect", "primary_effect"];
const TRAITS_KEYS: &[&str] = &["traits", "attributes"];
const LISTED_KEYS: &[&str] = &["listed_for_trade", "isListed", "listed"];

const EFFECT_TYPE_KEYS: &[&str] = &["type", "effect_type", "effectType"];
const EFFECT_VALUE_KEYS: &[&str] = &["value", "rawValue", "raw_value", "amount"];

const TRAIT_NAME_KEYS: &[&str] = &["name", "trait_type", "traitType", "key"];

/// Declared primary effect on an item
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectDescriptor {
    #[serde(rename = "type")]
    pub effect_type: String,
    /// Raw amount before rarity scaling; missing means the catalog base value
    pub value: Option<Value>,
    pub unit: Option<String>,
    pub duration: Option<Value>,
    pub cooldown: Option<Value>,
}

impl EffectDescriptor {
    pub fn new(effect_type: impl Into<String>, value: f64) -> Self {
        Self {
            effect_type: effect_type.into(),
            value: Some(Value::from(value)),
            ..Default::default()
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_timing(mut self, duration: f64, cooldown: f64) -> Self {
        self.duration = Some(Value::from(duration));
        self.cooldown = Some(Value::from(cooldown));
        self
    }
}

impl<'de> Deserialize<'de> for EffectDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let effect_type = first_string(&map, EFFECT_TYPE_KEYS)
            .ok_or_else(|| de::Error::missing_field("type"))?;
        Ok(Self {
            effect_type,
            value: first_present(&map, EFFECT_VALUE_KEYS).cloned(),
            unit: first_string(&map, &["unit"]),
            duration: first_present(&map, &["duration"]).cloned(),
            cooldown: first_present(&map, &["cooldown"]).cloned(),
        })
    }
}

/// Free-form key/value trait, e.g. `{"trait_type": "Critical", "value": "5%"}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTrait {
    pub name: String,
    pub value: Value,
}

impl ItemTrait {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn numeric_value(&self) -> Option<f64> {
        parse_numeric(&self.value)
    }
}

impl<'de> Deserialize<'de> for ItemTrait {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let name = first_string(&map, TRAIT_NAME_KEYS)
            .ok_or_else(|| de::Error::missing_field("name"))?;
        Ok(Self {
            name,
            value: map.get("value").cloned().unwrap_or(Value::Null),
        })
    }
}

/// One owned collectible as supplied by the inventory service
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemRecord {
    pub id: String,
    pub rarity: String,
    pub effect: Option<EffectDescriptor>,
    pub traits: Vec<ItemTrait>,
    pub listed_for_trade: bool,
}

impl ItemRecord {
    pub fn new(id: impl Into<String>, rarity: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rarity: rarity.into(),
            ..Default::default()
        }
    }

    pub fn with_effect(mut self, descriptor: EffectDescriptor) -> Self {
        self.effect = Some(descriptor);
        self
    }

    pub fn with_trait(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.traits.push(ItemTrait::new(name, value));
        self
    }

    pub fn listed(mut self, listed: bool) -> Self {
        self.listed_for_trade = listed;
        self
    }
}

impl<'de> Deserialize<'de> for ItemRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_map(&map))
    }
}

impl ItemRecord {
    /// Build a record from a raw JSON object. Never fails; unusable fields
    /// take their defaults.
    fn from_map(map: &Map<String, Value>) -> Self {
        let id = first_usable(map, ID_KEYS, |value| {
            Some(match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            })
            .filter(|id| !id.is_empty())
        })
        .unwrap_or_default();

        let rarity = first_usable(map, RARITY_KEYS, |value| {
            value.as_str().filter(|s| !s.trim().is_empty()).map(str::to_string)
        })
        .unwrap_or_default();

        let effect = first_usable(map, EFFECT_KEYS, |value| {
            serde_json::from_value::<EffectDescriptor>(value.clone()).ok()
        });

        let traits = first_usable(map, TRAITS_KEYS, |value| {
            Some(lenient_traits(value)).filter(|traits| !traits.is_empty())
        })
        .unwrap_or_default();

        let listed_for_trade = first_usable(map, LISTED_KEYS, |value| match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            Value::Number(n) => n.as_f64().map(|v| v != 0.0),
            _ => None,
        })
        .unwrap_or(false);

        Self {
            id,
            rarity,
            effect,
            traits,
            listed_for_trade,
        }
    }
}

/// First key, in precedence order, whose value `read` accepts
fn first_usable<T>(
    map: &Map<String, Value>,
    keys: &[&str],
    read: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(read)
}

fn first_present<'m>(map: &'m Map<String, Value>, keys: &[&str]) -> Option<&'m Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_usable(map, keys, |value| value.as_str().map(str::to_string))
}

fn lenient_traits(value: &Value) -> Vec<ItemTrait> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect(),
        // Some feeds ship traits as a flat object: {"Critical": "5%"}
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| ItemTrait::new(name.clone(), value.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse an inventory document into item records.
///
/// Accepts a bare JSON array or an object wrapping the array under `items`,
/// `nfts` or `data`. Elements that are not item objects are skipped with a
/// warning; only a document without any such array is an error.
pub fn parse_inventory(json: &str) -> Result<Vec<ItemRecord>, EffectsError> {
    let doc: Value =
        serde_json::from_str(json).map_err(|e| EffectsError::InventoryParse(e.to_string()))?;

    let elements = match doc {
        Value::Array(items) => items,
        Value::Object(mut map) => ["items", "nfts", "data"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                EffectsError::InventoryParse("no item array in inventory document".into())
            })?,
        other => {
            return Err(EffectsError::InventoryParse(format!(
                "expected array of items, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = elements.len();
    let records: Vec<ItemRecord> = elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| match element {
            Value::Object(map) => Some(ItemRecord::from_map(&map)),
            other => {
                tracing::warn!(index, kind = json_kind(&other), "skipping non-object inventory entry");
                None
            }
        })
        .collect();

    tracing::debug!(total, parsed = records.len(), "inventory parsed");
    Ok(records)
}

/// Read a number from a JSON number or a numeric string such as `"12.5%"`,
/// `"+3"` or `"2x"`
pub(crate) fn parse_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s
                .trim()
                .trim_end_matches('%')
                .trim_end_matches(|c: char| c == 'x' || c == 'X')
                .trim()
                .trim_start_matches('+');
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
