use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::slug::slugify;

/// A jewel slotted into equipment to grant skills
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    #[serde(skip)]
    pub id: EntityId,
    pub slug: String,
    pub name: String,
    pub slot: u8,
    pub rarity: u8,
    /// SkillRank IDs
    #[serde(default)]
    pub skills: Vec<EntityId>,
}

impl Decoration {
    pub fn new(name: impl Into<String>, slot: u8, rarity: u8) -> Self {
        let name = name.into();
        Self {
            id: 0,
            slug: slugify(&name),
            name,
            slot,
            rarity,
            skills: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = slugify(&self.name);
    }
}
