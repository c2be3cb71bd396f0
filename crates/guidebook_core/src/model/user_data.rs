//! Persisted user-data records.
//!
//! # Responsibility
//! - Define favorites, visits and itinerary plans as stored on device.
//! - Keep the camelCase JSON shape used by existing local storage payloads.
//!
//! # Invariants
//! - At most one `Favorite` / `Visit` per `(item_id, item_type)`.
//! - `Plan::items[i].order == i` after every mutation.
//! - No `(item_id, item_type)` appears twice in one plan.

use crate::model::catalog::{ItemKey, ItemType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Stable plan identifier.
pub type PlanId = Uuid;

/// User-marked interest in a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub item_id: String,
    pub item_type: ItemType,
    /// Unix epoch milliseconds of the first add.
    pub added_at: i64,
}

impl Favorite {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item_id.as_str(), self.item_type)
    }

    pub fn matches(&self, key: &ItemKey) -> bool {
        self.item_type == key.item_type && self.item_id == key.item_id
    }
}

/// User-recorded visit (or purchase, for souvenirs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub item_id: String,
    pub item_type: ItemType,
    /// Unix epoch milliseconds of the latest upsert.
    pub visited_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Visit {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item_id.as_str(), self.item_type)
    }

    pub fn matches(&self, key: &ItemKey) -> bool {
        self.item_type == key.item_type && self.item_id == key.item_id
    }
}

/// One stop in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub item_id: String,
    pub item_type: ItemType,
    pub order: u32,
}

impl PlanItem {
    /// Creates an item with placeholder order; callers renormalize.
    pub fn new(key: &ItemKey) -> Self {
        Self {
            item_id: key.item_id.clone(),
            item_type: key.item_type,
            order: 0,
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.item_id.as_str(), self.item_type)
    }

    pub fn matches(&self, key: &ItemKey) -> bool {
        self.item_type == key.item_type && self.item_id == key.item_id
    }
}

/// Named, ordered itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    #[serde(default)]
    pub items: Vec<PlanItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Plan {
    /// Creates an empty plan with a generated id.
    pub fn new(name: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: Vec::new(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items.iter().any(|item| item.matches(key))
    }
}

/// Partial plan update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub items: Option<Vec<PlanItem>>,
}

/// Aggregate counters for the home screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataStats {
    pub total_favorites: usize,
    pub total_visits: usize,
    pub total_plans: usize,
    pub visited_sights: usize,
    pub visited_souvenirs: usize,
}

/// Drops duplicate keys (first occurrence wins) and rewrites `order` to the
/// array position.
pub fn normalize_plan_items(items: Vec<PlanItem>) -> Vec<PlanItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.key()))
        .enumerate()
        .map(|(index, item)| PlanItem {
            order: index as u32,
            ..item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_plan_items, Favorite, Plan, PlanItem};
    use crate::model::catalog::{ItemKey, ItemType};

    #[test]
    fn favorite_serializes_with_camel_case_fields() {
        let favorite = Favorite {
            item_id: "42".to_string(),
            item_type: ItemType::Souvenir,
            added_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&favorite).expect("favorite should serialize");
        assert_eq!(json["itemId"], "42");
        assert_eq!(json["itemType"], "souvenir");
        assert_eq!(json["addedAt"], 1_700_000_000_000_i64);
    }

    #[test]
    fn normalize_rewrites_order_and_drops_duplicates() {
        let mut items = vec![
            PlanItem::new(&ItemKey::sight("b")),
            PlanItem::new(&ItemKey::sight("a")),
            PlanItem::new(&ItemKey::sight("b")),
            PlanItem::new(&ItemKey::souvenir("b")),
        ];
        items[0].order = 7;
        items[1].order = 7;

        let normalized = normalize_plan_items(items);
        let keys: Vec<_> = normalized.iter().map(PlanItem::key).collect();
        assert_eq!(
            keys,
            vec![
                ItemKey::sight("b"),
                ItemKey::sight("a"),
                ItemKey::souvenir("b")
            ]
        );
        let orders: Vec<_> = normalized.iter().map(|item| item.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn new_plan_starts_empty_with_equal_timestamps() {
        let plan = Plan::new("Day one", 10);
        assert!(plan.items.is_empty());
        assert_eq!(plan.created_at, plan.updated_at);
        assert!(!plan.contains(&ItemKey::sight("x")));
    }
}
