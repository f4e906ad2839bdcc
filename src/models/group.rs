use super::category::{Category, NEUTRAL_ACCENT};
use super::item::DocumentItem;

/// What a set of items was grouped by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Category(Category),
    Room(String),
}

impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            GroupKey::Category(c) => c.label().to_string(),
            GroupKey::Room(name) => name.clone(),
        }
    }

    /// Room groups carry no explicit color mapping and resolve to neutral.
    pub fn accent_color(&self) -> u32 {
        match self {
            GroupKey::Category(c) => c.accent_color(),
            GroupKey::Room(_) => NEUTRAL_ACCENT,
        }
    }
}

/// Derived per aggregation call, never persisted.
#[derive(Debug, Clone)]
pub struct CategoryGroup {
    pub key: GroupKey,
    pub label: String,
    pub color: u32,
    pub items: Vec<DocumentItem>,
    pub subtotal: f64,
    pub item_count: usize,
    /// Share of the aggregated set's grand total, 0.0 when that total is 0.
    pub percentage: f64,
}
