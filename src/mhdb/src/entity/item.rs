use serde::{Deserialize, Serialize};

use super::EntityId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(skip)]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rarity: u8,
    #[serde(default)]
    pub carry_limit: u32,
    #[serde(default)]
    pub value: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, rarity: u8) -> Self {
        Self {
            name: name.into(),
            rarity,
            ..Default::default()
        }
    }
}
