//! Per-session memoization of static game data
//!
//! Entries are keyed on presence, not content: an empty document that was
//! fetched successfully stays cached.

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct SessionCache {
    pub(crate) locales: HashMap<String, Value>,
    pub(crate) items: Option<Value>,
    pub(crate) item_prices: Option<Value>,
    pub(crate) locations: Option<Value>,
}

impl SessionCache {
    pub fn has_locale(&self, language: &str) -> bool {
        self.locales.contains_key(language)
    }

    pub fn has_items(&self) -> bool {
        self.items.is_some()
    }

    pub fn has_item_prices(&self) -> bool {
        self.item_prices.is_some()
    }

    pub fn has_locations(&self) -> bool {
        self.locations.is_some()
    }

    /// Drop everything; the next access refetches
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
