use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::game::{DamageType, WeaponType};

/// Damage profile of a single weapon move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionValue {
    #[serde(skip)]
    pub id: EntityId,
    pub name: String,
    pub weapon_type: WeaponType,
    #[serde(default)]
    pub damage_type: Option<DamageType>,
    #[serde(default)]
    pub stun: Option<u32>,
    #[serde(default)]
    pub exhaust: Option<u32>,
    #[serde(default)]
    pub hits: Vec<u32>,
}

impl MotionValue {
    pub fn new(name: impl Into<String>, weapon_type: WeaponType) -> Self {
        Self {
            id: 0,
            name: name.into(),
            weapon_type,
            damage_type: None,
            stun: None,
            exhaust: None,
            hits: Vec::new(),
        }
    }
}
