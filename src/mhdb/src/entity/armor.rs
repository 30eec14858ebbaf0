use serde::{Deserialize, Serialize};

use super::common::{Attributes, CraftingCost, Slot};
use super::EntityId;
use crate::game::{ArmorType, Element, Rank};
use crate::slug::slugify;

/// A single armor piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Armor {
    #[serde(skip)]
    pub id: EntityId,
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub armor_type: ArmorType,
    pub rank: Rank,
    pub rarity: u8,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub defense: Defense,
    #[serde(default)]
    pub resistances: Resistances,
    #[serde(default)]
    pub slots: Vec<Slot>,
    /// SkillRank IDs
    #[serde(default)]
    pub skills: Vec<EntityId>,
    /// Owning ArmorSet ID
    #[serde(default)]
    pub armor_set: Option<EntityId>,
    #[serde(default)]
    pub crafting: Option<ArmorCrafting>,
    #[serde(default)]
    pub assets: Option<ArmorAssets>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defense {
    pub base: u32,
    pub max: u32,
    pub augmented: u32,
}

/// Elemental resistances, one value per element in [`Element::RESISTANCES`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resistances {
    pub fire: i32,
    pub water: i32,
    pub ice: i32,
    pub thunder: i32,
    pub dragon: i32,
}

impl Resistances {
    pub fn get(&self, element: Element) -> Option<i32> {
        match element {
            Element::Fire => Some(self.fire),
            Element::Water => Some(self.water),
            Element::Ice => Some(self.ice),
            Element::Thunder => Some(self.thunder),
            Element::Dragon => Some(self.dragon),
            _ => None,
        }
    }

    /// Returns false when `element` has no resistance value
    pub fn set(&mut self, element: Element, value: i32) -> bool {
        let slot = match element {
            Element::Fire => &mut self.fire,
            Element::Water => &mut self.water,
            Element::Ice => &mut self.ice,
            Element::Thunder => &mut self.thunder,
            Element::Dragon => &mut self.dragon,
            _ => return false,
        };
        *slot = value;
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorCrafting {
    #[serde(default)]
    pub materials: Vec<CraftingCost>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmorAssets {
    pub image_male: Option<String>,
    pub image_female: Option<String>,
}

impl ArmorAssets {
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.image_male
            .as_deref()
            .into_iter()
            .chain(self.image_female.as_deref())
    }
}

impl Armor {
    pub fn new(name: impl Into<String>, armor_type: ArmorType, rank: Rank, rarity: u8) -> Self {
        let name = name.into();
        Self {
            id: 0,
            slug: slugify(&name),
            name,
            armor_type,
            rank,
            rarity,
            attributes: Attributes::new(),
            defense: Defense::default(),
            resistances: Resistances::default(),
            slots: Vec::new(),
            skills: Vec::new(),
            armor_set: None,
            crafting: None,
            assets: None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = slugify(&self.name);
    }
}
