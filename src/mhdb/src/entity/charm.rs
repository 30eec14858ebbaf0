use serde::{Deserialize, Serialize};

use super::common::CraftingCost;
use super::EntityId;
use crate::slug::slugify;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charm {
    #[serde(skip)]
    pub id: EntityId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub ranks: Vec<CharmRank>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharmRank {
    pub level: u8,
    pub rarity: u8,
    /// SkillRank IDs
    #[serde(default)]
    pub skills: Vec<EntityId>,
    #[serde(default)]
    pub crafting: Option<CharmCrafting>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharmCrafting {
    pub craftable: bool,
    #[serde(default)]
    pub materials: Vec<CraftingCost>,
}

impl Charm {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: 0,
            slug: slugify(&name),
            name,
            ranks: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = slugify(&self.name);
    }
}
