use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::game::Element;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    #[serde(skip)]
    pub id: EntityId,
    pub name: String,
    /// "small" or "large"
    #[serde(rename = "type")]
    pub monster_type: String,
    pub species: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Ailment IDs
    #[serde(default)]
    pub ailments: Vec<EntityId>,
    /// Location IDs
    #[serde(default)]
    pub locations: Vec<EntityId>,
    #[serde(default)]
    pub resistances: Vec<MonsterResistance>,
    #[serde(default)]
    pub weaknesses: Vec<MonsterWeakness>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterResistance {
    pub element: Element,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterWeakness {
    pub element: Element,
    pub stars: u8,
    #[serde(default)]
    pub condition: Option<String>,
}

impl Monster {
    pub fn new(
        name: impl Into<String>,
        monster_type: impl Into<String>,
        species: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            monster_type: monster_type.into(),
            species: species.into(),
            ..Default::default()
        }
    }
}
