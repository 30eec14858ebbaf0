use serde::{Deserialize, Serialize};

use super::EntityId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(skip)]
    pub id: EntityId,
    pub name: String,
    pub zone_count: u32,
    #[serde(default)]
    pub camps: Vec<Camp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camp {
    pub name: String,
    pub zone: u32,
}

impl Location {
    pub fn new(name: impl Into<String>, zone_count: u32) -> Self {
        Self {
            name: name.into(),
            zone_count,
            ..Default::default()
        }
    }
}
