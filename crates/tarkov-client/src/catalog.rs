//! Trader catalog resolution
//!
//! A trader's stock arrives as three independently shaped documents:
//!
//! - the assortment (`items`, `barter_scheme`, `loyal_level_items`)
//! - the per-item currency price table
//!
//! [`resolve_trader_items`] joins them into one [`TraderItem`] per purchasable
//! item. Items that cannot be priced or gated by loyalty are reported as
//! [`CatalogGap`]s instead of failing the whole call; a cost line with the
//! wrong shape fails it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, error, warn};

use crate::error::{ClientError, Result};

/// Parent id of the items a trader actually sells
pub const TRADER_ROOT_CONTAINER: &str = "hideout";

/// One required template and quantity in a cost variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    #[serde(rename = "_tpl")]
    pub template_id: String,
    /// May be fractional before rounding at purchase time
    pub count: f64,
}

/// Where an item's cost lines came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostSource {
    /// Items surrendered in exchange (first barter-scheme variant)
    Barter,
    /// Currency price (first price-table variant)
    Currency,
}

/// Stock block (`upd`) of a trader offer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TraderStock {
    #[serde(default)]
    pub stack_objects_count: Option<i64>,
    #[serde(default)]
    pub unlimited_count: Option<bool>,
    #[serde(default)]
    pub buy_restriction_current: Option<i64>,
    #[serde(default)]
    pub buy_restriction_max: Option<i64>,
}

/// A resolved trader offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderItem {
    pub id: String,
    pub template_id: String,
    pub stock: Option<TraderStock>,
    /// Never empty; all lines share [`TraderItem::cost_source`]
    pub costs: Vec<CostLine>,
    pub cost_source: CostSource,
    pub loyalty_level: i64,
}

/// Why an item was left out of a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapReason {
    MissingTemplate,
    MissingLoyaltyLevel,
    MissingCosts,
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTemplate => f.write_str("item has no template id"),
            Self::MissingLoyaltyLevel => f.write_str("loyalty level could not be mapped"),
            Self::MissingCosts => f.write_str("no barter or price data"),
        }
    }
}

/// An assortment item that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogGap {
    pub item_id: String,
    /// Absent for [`GapReason::MissingTemplate`]
    pub template_id: Option<String>,
    pub reason: GapReason,
}

/// Resolved items in assortment order, plus the items that were skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogResolution {
    pub items: Vec<TraderItem>,
    pub gaps: Vec<CatalogGap>,
}

impl CatalogResolution {
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Resolved items, or [`ClientError::ResolutionGap`] if anything was skipped
    pub fn into_complete(self) -> Result<Vec<TraderItem>> {
        if self.gaps.is_empty() {
            Ok(self.items)
        } else {
            Err(ClientError::ResolutionGap { gaps: self.gaps })
        }
    }
}

/// Join a trader assortment with its price table
///
/// `prices` maps item id to price variants; `null` is treated as an empty
/// table.
pub fn resolve_trader_items(trader_id: &str, assort: &Value, prices: &Value) -> Result<CatalogResolution> {
    let raw_items = required_key(assort, "items")?;
    let barter_scheme = required_object(assort, "barter_scheme")?;
    let loyalty_levels = required_object(assort, "loyal_level_items")?;
    let empty = Map::new();
    let prices = match prices {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(ClientError::malformed(format!(
                "trader prices must be an object, got {}",
                type_name(other)
            )));
        }
    };

    let entries: Box<dyn Iterator<Item = &Value>> = match raw_items {
        Value::Array(list) => Box::new(list.iter()),
        Value::Object(map) => Box::new(map.values()),
        other => {
            return Err(ClientError::malformed(format!(
                "assortment 'items' must be a list, got {}",
                type_name(other)
            )));
        }
    };

    let mut resolution = CatalogResolution::default();
    for raw in entries {
        if raw.get("parentId").and_then(Value::as_str) != Some(TRADER_ROOT_CONTAINER) {
            continue;
        }
        let Some(id) = raw.get("_id").and_then(Value::as_str) else {
            warn!(trader = trader_id, "Assortment item without id: {raw}");
            continue;
        };
        let Some(template_id) = raw.get("_tpl").and_then(Value::as_str) else {
            warn!(trader = trader_id, item = id, "Assortment item without template");
            resolution.gaps.push(gap(id, None, GapReason::MissingTemplate));
            continue;
        };

        let Some(level) = loyalty_levels.get(id) else {
            warn!(trader = trader_id, item = id, "Loyalty level could not be mapped");
            resolution.gaps.push(gap(id, Some(template_id), GapReason::MissingLoyaltyLevel));
            continue;
        };
        let loyalty_level = level.as_i64().ok_or_else(|| {
            ClientError::malformed(format!("loyalty level of '{id}' is not an integer: {level}"))
        })?;

        let (variants, cost_source) = if let Some(variants) = barter_scheme.get(id) {
            (variants, CostSource::Barter)
        } else if let Some(variants) = prices.get(id) {
            (variants, CostSource::Currency)
        } else {
            error!(
                "No price or barter data found! Trader: {trader_id} Item: '{id}' - '{template_id}'"
            );
            resolution.gaps.push(gap(id, Some(template_id), GapReason::MissingCosts));
            continue;
        };

        let costs = parse_first_variant(id, variants)?;
        let stock = match raw.get("upd") {
            Some(upd) => Some(serde_json::from_value(upd.clone()).map_err(|e| {
                ClientError::malformed(format!("stock block of '{id}' is malformed: {e}"))
            })?),
            None => None,
        };

        resolution.items.push(TraderItem {
            id: id.to_string(),
            template_id: template_id.to_string(),
            stock,
            costs,
            cost_source,
            loyalty_level,
        });
    }

    debug!(
        trader = trader_id,
        resolved = resolution.items.len(),
        skipped = resolution.gaps.len(),
        "Resolved trader catalog"
    );
    Ok(resolution)
}

fn gap(item_id: &str, template_id: Option<&str>, reason: GapReason) -> CatalogGap {
    CatalogGap {
        item_id: item_id.to_string(),
        template_id: template_id.map(str::to_string),
        reason,
    }
}

fn required_key<'a>(document: &'a Value, key: &str) -> Result<&'a Value> {
    document
        .get(key)
        .ok_or_else(|| ClientError::malformed(format!("assortment is missing '{key}'")))
}

fn required_object<'a>(document: &'a Value, key: &str) -> Result<&'a Map<String, Value>> {
    match required_key(document, key)? {
        Value::Object(map) => Ok(map),
        // An empty list is how the backend spells an empty map
        Value::Array(list) if list.is_empty() => Ok(empty_map()),
        other => Err(ClientError::malformed(format!(
            "assortment '{key}' must be an object, got {}",
            type_name(other)
        ))),
    }
}

fn empty_map() -> &'static Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    EMPTY.get_or_init(Map::new)
}

/// Cost lines of the first variant; every line must be `{_tpl: string, count: number}`
fn parse_first_variant(item_id: &str, variants: &Value) -> Result<Vec<CostLine>> {
    let first = variants
        .as_array()
        .and_then(|v| v.first())
        .ok_or_else(|| ClientError::malformed(format!("cost variants of '{item_id}' are empty")))?;
    let lines = first
        .as_array()
        .filter(|lines| !lines.is_empty())
        .ok_or_else(|| ClientError::malformed(format!("first cost variant of '{item_id}' is empty")))?;

    lines
        .iter()
        .map(|line| {
            let template_id = line.get("_tpl").and_then(Value::as_str);
            let count = line.get("count").and_then(Value::as_f64);
            match (template_id, count) {
                (Some(template_id), Some(count)) => Ok(CostLine {
                    template_id: template_id.to_string(),
                    count,
                }),
                _ => Err(ClientError::malformed(format!(
                    "cost line of '{item_id}' needs '_tpl' and 'count': {line}"
                ))),
            }
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
