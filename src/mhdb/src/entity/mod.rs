//! Entity model.
//!
//! Every entity is persisted as one JSON document per row. Relationships are
//! ordered ID lists; owned value objects are embedded in the document and have
//! no identity of their own.

pub mod ailment;
pub mod armor;
pub mod armor_set;
pub mod charm;
pub mod common;
pub mod decoration;
pub mod item;
pub mod location;
pub mod monster;
pub mod motion_value;
pub mod skill;
pub mod weapon;

pub use ailment::{Ailment, Protection, Recovery};
pub use armor::{Armor, ArmorAssets, ArmorCrafting, Defense, Resistances};
pub use armor_set::{ArmorSet, ArmorSetBonus, ArmorSetBonusRank};
pub use charm::{Charm, CharmCrafting, CharmRank};
pub use common::{Attributes, CraftingCost, Slot};
pub use decoration::Decoration;
pub use item::Item;
pub use location::{Camp, Location};
pub use monster::{Monster, MonsterResistance, MonsterWeakness};
pub use motion_value::MotionValue;
pub use skill::{Skill, SkillRank};
pub use weapon::{Attack, Weapon, WeaponAssets, WeaponCrafting, WeaponElement};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric entity identifier, 0 until the entity is persisted
pub type EntityId = i64;

/// Every stored entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Ailment,
    Armor,
    ArmorSet,
    Charm,
    Decoration,
    Item,
    Location,
    Monster,
    MotionValue,
    Skill,
    SkillRank,
    Weapon,
}

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Ailment,
        EntityKind::Armor,
        EntityKind::ArmorSet,
        EntityKind::Charm,
        EntityKind::Decoration,
        EntityKind::Item,
        EntityKind::Location,
        EntityKind::Monster,
        EntityKind::MotionValue,
        EntityKind::Skill,
        EntityKind::SkillRank,
        EntityKind::Weapon,
    ];

    /// Kinds processed by an export run, in order. Skill ranks are embedded
    /// in their skill's document.
    pub const EXPORTED: &'static [EntityKind] = &[
        EntityKind::Ailment,
        EntityKind::Armor,
        EntityKind::ArmorSet,
        EntityKind::Charm,
        EntityKind::Decoration,
        EntityKind::Item,
        EntityKind::Location,
        EntityKind::Monster,
        EntityKind::MotionValue,
        EntityKind::Skill,
        EntityKind::Weapon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ailment => "Ailment",
            Self::Armor => "Armor",
            Self::ArmorSet => "ArmorSet",
            Self::Charm => "Charm",
            Self::Decoration => "Decoration",
            Self::Item => "Item",
            Self::Location => "Location",
            Self::Monster => "Monster",
            Self::MotionValue => "MotionValue",
            Self::Skill => "Skill",
            Self::SkillRank => "SkillRank",
            Self::Weapon => "Weapon",
        }
    }

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            Self::Ailment => "ailments",
            Self::Armor => "armor",
            Self::ArmorSet => "armor_sets",
            Self::Charm => "charms",
            Self::Decoration => "decorations",
            Self::Item => "items",
            Self::Location => "locations",
            Self::Monster => "monsters",
            Self::MotionValue => "motion_values",
            Self::Skill => "skills",
            Self::SkillRank => "skill_ranks",
            Self::Weapon => "weapons",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised entity name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity: {0}")]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    /// Accepts `Weapon`, `weapon`, `motion-value`, `motion_value` and friends
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .iter()
            .find(|kind| kind.name().to_ascii_lowercase() == wanted)
            .copied()
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}

/// Any entity, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Ailment(Ailment),
    Armor(Armor),
    ArmorSet(ArmorSet),
    Charm(Charm),
    Decoration(Decoration),
    Item(Item),
    Location(Location),
    Monster(Monster),
    MotionValue(MotionValue),
    Skill(Skill),
    SkillRank(SkillRank),
    Weapon(Weapon),
}

macro_rules! for_each_record {
    ($record:expr, $inner:ident => $body:expr) => {
        match $record {
            Record::Ailment($inner) => $body,
            Record::Armor($inner) => $body,
            Record::ArmorSet($inner) => $body,
            Record::Charm($inner) => $body,
            Record::Decoration($inner) => $body,
            Record::Item($inner) => $body,
            Record::Location($inner) => $body,
            Record::Monster($inner) => $body,
            Record::MotionValue($inner) => $body,
            Record::Skill($inner) => $body,
            Record::SkillRank($inner) => $body,
            Record::Weapon($inner) => $body,
        }
    };
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Ailment(_) => EntityKind::Ailment,
            Record::Armor(_) => EntityKind::Armor,
            Record::ArmorSet(_) => EntityKind::ArmorSet,
            Record::Charm(_) => EntityKind::Charm,
            Record::Decoration(_) => EntityKind::Decoration,
            Record::Item(_) => EntityKind::Item,
            Record::Location(_) => EntityKind::Location,
            Record::Monster(_) => EntityKind::Monster,
            Record::MotionValue(_) => EntityKind::MotionValue,
            Record::Skill(_) => EntityKind::Skill,
            Record::SkillRank(_) => EntityKind::SkillRank,
            Record::Weapon(_) => EntityKind::Weapon,
        }
    }

    pub fn id(&self) -> EntityId {
        for_each_record!(self, inner => inner.id)
    }

    pub fn set_id(&mut self, id: EntityId) {
        for_each_record!(self, inner => inner.id = id)
    }

    /// Serialize the stored body (the ID lives in its own column)
    pub fn to_document(&self) -> serde_json::Result<String> {
        for_each_record!(self, inner => serde_json::to_string(inner))
    }

    /// Rebuild a record from a stored body
    pub fn from_document(kind: EntityKind, id: EntityId, body: &str) -> serde_json::Result<Self> {
        let mut record = match kind {
            EntityKind::Ailment => Record::Ailment(serde_json::from_str(body)?),
            EntityKind::Armor => Record::Armor(serde_json::from_str(body)?),
            EntityKind::ArmorSet => Record::ArmorSet(serde_json::from_str(body)?),
            EntityKind::Charm => Record::Charm(serde_json::from_str(body)?),
            EntityKind::Decoration => Record::Decoration(serde_json::from_str(body)?),
            EntityKind::Item => Record::Item(serde_json::from_str(body)?),
            EntityKind::Location => Record::Location(serde_json::from_str(body)?),
            EntityKind::Monster => Record::Monster(serde_json::from_str(body)?),
            EntityKind::MotionValue => Record::MotionValue(serde_json::from_str(body)?),
            EntityKind::Skill => Record::Skill(serde_json::from_str(body)?),
            EntityKind::SkillRank => Record::SkillRank(serde_json::from_str(body)?),
            EntityKind::Weapon => Record::Weapon(serde_json::from_str(body)?),
        };
        record.set_id(id);
        Ok(record)
    }
}

/// Typed access to one entity variant of [`Record`]
pub trait Entity: Sized {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;
    fn set_id(&mut self, id: EntityId);
    fn into_record(self) -> Record;
    fn from_record(record: Record) -> Option<Self>;
    fn as_record_ref(record: &Record) -> Option<&Self>;
    fn as_record_mut(record: &mut Record) -> Option<&mut Self>;
}

macro_rules! impl_entity {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl Entity for $ty {
                const KIND: EntityKind = EntityKind::$ty;

                fn id(&self) -> EntityId {
                    self.id
                }

                fn set_id(&mut self, id: EntityId) {
                    self.id = id;
                }

                fn into_record(self) -> Record {
                    Record::$ty(self)
                }

                fn from_record(record: Record) -> Option<Self> {
                    match record {
                        Record::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn as_record_ref(record: &Record) -> Option<&Self> {
                    match record {
                        Record::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn as_record_mut(record: &mut Record) -> Option<&mut Self> {
                    match record {
                        Record::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Record {
                fn from(value: $ty) -> Self {
                    Record::$ty(value)
                }
            }
        )+
    };
}

impl_entity!(
    Ailment,
    Armor,
    ArmorSet,
    Charm,
    Decoration,
    Item,
    Location,
    Monster,
    MotionValue,
    Skill,
    SkillRank,
    Weapon,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ArmorType, Rank, WeaponType};

    #[test]
    fn test_kind_parse_is_lenient() {
        assert_eq!("Weapon".parse::<EntityKind>().unwrap(), EntityKind::Weapon);
        assert_eq!("weapon".parse::<EntityKind>().unwrap(), EntityKind::Weapon);
        assert_eq!(
            "motion-value".parse::<EntityKind>().unwrap(),
            EntityKind::MotionValue
        );
        assert_eq!(
            "armor_set".parse::<EntityKind>().unwrap(),
            EntityKind::ArmorSet
        );
        assert!("Dragon".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_exported_excludes_skill_rank() {
        assert_eq!(EntityKind::EXPORTED.len(), 11);
        assert!(!EntityKind::EXPORTED.contains(&EntityKind::SkillRank));
    }

    #[test]
    fn test_document_omits_id() {
        let mut weapon = Weapon::new("Buster Sword I", WeaponType::GreatSword, 1);
        weapon.id = 42;
        let record = Record::from(weapon);

        let body = record.to_document().unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["slug"], "buster-sword-i");
        assert_eq!(value["type"], "great-sword");

        let restored = Record::from_document(EntityKind::Weapon, 42, &body).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_empty_attributes_serialize_as_object() {
        let armor = Armor::new("Leather Headgear", ArmorType::Head, Rank::Low, 1);
        let value = serde_json::to_value(&armor).unwrap();
        assert_eq!(value["attributes"], serde_json::json!({}));
    }

    #[test]
    fn test_entity_downcast() {
        let mut record = Record::from(Item::new("Potion", 1));
        assert!(Item::as_record_ref(&record).is_some());
        assert!(Weapon::as_record_mut(&mut record).is_none());
        assert_eq!(record.kind(), EntityKind::Item);
    }
}
