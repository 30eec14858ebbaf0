use serde::{Deserialize, Serialize};

use super::EntityId;

/// A status ailment a monster can inflict
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ailment {
    #[serde(skip)]
    pub id: EntityId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub recovery: Recovery,
    #[serde(default)]
    pub protection: Protection,
}

/// How a hunter recovers from an ailment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recovery {
    /// Item IDs
    #[serde(default)]
    pub items: Vec<EntityId>,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// What prevents an ailment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protection {
    /// Item IDs
    #[serde(default)]
    pub items: Vec<EntityId>,
    /// Skill IDs
    #[serde(default)]
    pub skills: Vec<EntityId>,
}

impl Ailment {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}
