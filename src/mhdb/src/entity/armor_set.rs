use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::game::Rank;

/// A named group of armor pieces, optionally granting a set bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmorSet {
    #[serde(skip)]
    pub id: EntityId,
    pub name: String,
    pub rank: Rank,
    /// Armor IDs, in display order
    #[serde(default)]
    pub pieces: Vec<EntityId>,
    #[serde(default)]
    pub bonus: Option<ArmorSetBonus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorSetBonus {
    pub name: String,
    #[serde(default)]
    pub ranks: Vec<ArmorSetBonusRank>,
}

/// Skill granted once `pieces` pieces of the set are equipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorSetBonusRank {
    pub pieces: u8,
    /// SkillRank ID
    pub skill: EntityId,
}

impl ArmorSet {
    pub fn new(name: impl Into<String>, rank: Rank) -> Self {
        Self {
            id: 0,
            name: name.into(),
            rank,
            pieces: Vec::new(),
            bonus: None,
        }
    }
}
