//! Value objects embedded in more than one entity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::EntityId;

/// Open key-value map (armor/weapon attributes, skill rank modifiers).
///
/// A `BTreeMap` always serializes as a JSON object, so an empty map is `{}`.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Decoration slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub rank: u8,
}

/// One material line in a crafting recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingCost {
    pub item: EntityId,
    pub quantity: u32,
}

/// Remove every cost line naming `item`, returning whether anything changed
pub fn remove_cost_item(costs: &mut Vec<CraftingCost>, item: EntityId) -> bool {
    let before = costs.len();
    costs.retain(|cost| cost.item != item);
    costs.len() != before
}

/// Remove `id` from an ID list, returning whether anything changed
pub fn remove_id(ids: &mut Vec<EntityId>, id: EntityId) -> bool {
    let before = ids.len();
    ids.retain(|existing| *existing != id);
    ids.len() != before
}
