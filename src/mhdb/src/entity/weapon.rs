use serde::{Deserialize, Serialize};

use super::common::{Attributes, CraftingCost, Slot};
use super::EntityId;
use crate::game::{Element, WeaponType};
use crate::slug::slugify;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    #[serde(skip)]
    pub id: EntityId,
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub weapon_type: WeaponType,
    pub rarity: u8,
    #[serde(default)]
    pub attack: Attack,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub elements: Vec<WeaponElement>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub crafting: Option<WeaponCrafting>,
    #[serde(default)]
    pub assets: Option<WeaponAssets>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub display: u32,
    pub raw: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponElement {
    #[serde(rename = "type")]
    pub element: Element,
    pub damage: u32,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponCrafting {
    pub craftable: bool,
    /// Weapon ID this one is upgraded from
    #[serde(default)]
    pub previous: Option<EntityId>,
    /// Weapon IDs this one upgrades into
    #[serde(default)]
    pub branches: Vec<EntityId>,
    #[serde(default)]
    pub crafting_materials: Vec<CraftingCost>,
    #[serde(default)]
    pub upgrade_materials: Vec<CraftingCost>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponAssets {
    pub icon: Option<String>,
    pub image: Option<String>,
}

impl WeaponAssets {
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.icon.as_deref().into_iter().chain(self.image.as_deref())
    }
}

impl Weapon {
    pub fn new(name: impl Into<String>, weapon_type: WeaponType, rarity: u8) -> Self {
        let name = name.into();
        Self {
            id: 0,
            slug: slugify(&name),
            name,
            weapon_type,
            rarity,
            attack: Attack::default(),
            slots: Vec::new(),
            elements: Vec::new(),
            attributes: Attributes::new(),
            crafting: None,
            assets: None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = slugify(&self.name);
    }
}
