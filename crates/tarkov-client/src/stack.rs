//! Paying from a fragmented inventory
//!
//! Currency and barter items live in many stacks. [`find_covering_stacks`]
//! picks stacks in inventory order until a required quantity is met,
//! consuming only part of the last one.

use serde_json::Value;
use tracing::warn;

use crate::requests::PaymentLine;

pub const ROUBLE_TEMPLATE_ID: &str = "5449016a4bdc2d6f028b456f";
pub const DOLLAR_TEMPLATE_ID: &str = "5696686a4bdc2da3298b456a";
pub const EURO_TEMPLATE_ID: &str = "569668774bdc2da2298b4568";

/// One inventory record holding a quantity of identical items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedStack {
    pub id: String,
    pub template_id: String,
    pub count: u64,
}

impl OwnedStack {
    /// Read a stack from a raw inventory item
    ///
    /// Items without `upd.StackObjectsCount` hold a single unit; integral
    /// floats such as `500.0` are accepted. Returns `None` for entries lacking
    /// `_id` or `_tpl`, or whose count is not a non-negative whole number.
    pub fn from_item(item: &Value) -> Option<Self> {
        let id = item.get("_id")?.as_str()?;
        let template_id = item.get("_tpl")?.as_str()?;
        let count = match item.get("upd").and_then(|upd| upd.get("StackObjectsCount")) {
            None => 1,
            Some(raw) => {
                let Some(count) = stack_count(raw) else {
                    warn!(item = id, "Unreadable stack count: {raw}");
                    return None;
                };
                count
            }
        };
        Some(Self {
            id: id.to_string(),
            template_id: template_id.to_string(),
            count,
        })
    }
}

fn stack_count(raw: &Value) -> Option<u64> {
    if let Some(count) = raw.as_u64() {
        return Some(count);
    }
    let count = raw.as_f64()?;
    (count >= 0.0 && count.fract() == 0.0 && count <= u64::MAX as f64).then_some(count as u64)
}

/// Stacks of every well-formed item, in inventory order
pub fn owned_stacks(items: &[Value]) -> Vec<OwnedStack> {
    items.iter().filter_map(OwnedStack::from_item).collect()
}

/// Quantity taken from one stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackPick {
    pub id: String,
    pub count: u64,
}

/// Stacks chosen to cover a requirement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackSelection {
    pub picks: Vec<StackPick>,
    pub requested: u64,
    /// Quantity left uncovered once matching stacks ran out
    pub shortfall: u64,
}

impl StackSelection {
    pub fn is_covered(&self) -> bool {
        self.shortfall == 0
    }

    /// Total quantity across the picks
    pub fn covered(&self) -> u64 {
        self.picks.iter().map(|p| p.count).sum()
    }

    /// Picks as `{id, count}` payment lines
    pub fn into_payment(self) -> Vec<PaymentLine> {
        self.picks
            .into_iter()
            .map(|p| PaymentLine::new(p.id, p.count))
            .collect()
    }
}

/// Greedily select stacks of `template_id` covering `required`
///
/// Stacks are visited in the given order. A stack that can cover the rest of
/// the requirement is only partially consumed and ends the scan; smaller
/// stacks are taken whole. Empty stacks are ignored.
pub fn find_covering_stacks<'a, I>(stacks: I, template_id: &str, required: u64) -> StackSelection
where
    I: IntoIterator<Item = &'a OwnedStack>,
{
    let mut picks = Vec::new();
    let mut remaining = required;

    if remaining > 0 {
        for stack in stacks {
            if stack.template_id != template_id || stack.count == 0 {
                continue;
            }
            if stack.count >= remaining {
                picks.push(StackPick {
                    id: stack.id.clone(),
                    count: remaining,
                });
                remaining = 0;
                break;
            }
            picks.push(StackPick {
                id: stack.id.clone(),
                count: stack.count,
            });
            remaining -= stack.count;
        }
    }

    StackSelection {
        picks,
        requested: required,
        shortfall: remaining,
    }
}
