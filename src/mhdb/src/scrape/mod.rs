//! Weapon detail scraping.
//!
//! A weapon page is a list of data blocks, each with a small muted caption
//! (`label`) and a lead value (`lead`). Every block is offered to the
//! interpreter chain; the first interpreter that supports it writes into a
//! [`WeaponData`], which becomes a Weapon transformer payload.

mod interpreters;

pub use interpreters::{
    default_interpreters, AffinityInterpreter, EldersealInterpreter, ElementInterpreter,
    PhialTypeInterpreter, ShellingTypeInterpreter, SlotsInterpreter,
};

use serde::Deserialize;
use serde_json::{json, Value};

use crate::entity::{Attack, Attributes, Slot, WeaponElement};
use crate::game::WeaponType;
use crate::transform::Payload;

/// Error type for scraping
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeError {
    #[error("Could not parse {label} value: {value}")]
    InvalidValue { label: String, value: String },
}

/// Result type for scraping
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Collapse runs of whitespace into single spaces and trim
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One captioned block of a weapon page
pub trait DataNode {
    /// Caption text
    fn label(&self) -> &str;

    /// Value text
    fn lead(&self) -> &str;
}

/// Handles one kind of weapon data block
pub trait WeaponDataInterpreter: Send + Sync {
    fn supports(&self, node: &dyn DataNode) -> bool;

    fn parse(&self, node: &dyn DataNode, target: &mut WeaponData) -> ScrapeResult<()>;
}

/// Fields collected from a weapon page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponData {
    pub name: String,
    pub weapon_type: Option<WeaponType>,
    pub rarity: Option<u8>,
    pub attack: Option<Attack>,
    pub slots: Vec<Slot>,
    pub elements: Vec<WeaponElement>,
    pub attributes: Attributes,
}

impl WeaponData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    /// Run every node through the first interpreter that supports it.
    /// Nodes nobody supports are ignored.
    pub fn interpret(
        &mut self,
        interpreters: &[Box<dyn WeaponDataInterpreter>],
        nodes: &[&dyn DataNode],
    ) -> ScrapeResult<()> {
        for node in nodes {
            match interpreters.iter().find(|i| i.supports(*node)) {
                Some(interpreter) => interpreter.parse(*node, self)?,
                None => tracing::debug!("No interpreter for weapon data '{}'", node.label()),
            }
        }
        Ok(())
    }

    /// Weapon transformer payload; only collected fields are set, so an
    /// update leaves everything else untouched
    pub fn into_payload(self) -> Payload {
        let mut payload = Payload::new();
        payload.set("name", self.name);

        if let Some(weapon_type) = self.weapon_type {
            payload.set("type", weapon_type.as_str());
        }
        if let Some(rarity) = self.rarity {
            payload.set("rarity", rarity);
        }
        if let Some(attack) = self.attack {
            payload.set("attack", json!(attack));
        }
        if !self.slots.is_empty() {
            payload.set("slots", json!(self.slots));
        }
        if !self.elements.is_empty() {
            payload.set("elements", json!(self.elements));
        }
        if !self.attributes.is_empty() {
            payload.set("attributes", json!(self.attributes));
        }

        payload
    }
}

/// A data block captured from a page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CapturedNode {
    pub label: String,
    pub lead: String,
}

impl DataNode for CapturedNode {
    fn label(&self) -> &str {
        &self.label
    }

    fn lead(&self) -> &str {
        &self.lead
    }
}

/// A weapon page captured as JSON, as read by `mhdb import-weapons`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CapturedWeapon {
    pub name: String,
    #[serde(rename = "type")]
    pub weapon_type: WeaponType,
    pub rarity: u8,
    #[serde(default)]
    pub attack: Option<Attack>,
    #[serde(default)]
    pub data: Vec<CapturedNode>,
}

impl CapturedWeapon {
    pub fn interpret(
        &self,
        interpreters: &[Box<dyn WeaponDataInterpreter>],
    ) -> ScrapeResult<WeaponData> {
        let mut data = WeaponData::new(clean(&self.name));
        data.weapon_type = Some(self.weapon_type);
        data.rarity = Some(self.rarity);
        data.attack = self.attack;

        let nodes: Vec<&dyn DataNode> = self.data.iter().map(|n| n as &dyn DataNode).collect();
        data.interpret(interpreters, &nodes)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Element;

    #[test]
    fn test_clean() {
        assert_eq!(clean("  Sever \n\t Phial "), "Sever Phial");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_captured_weapon_payload() {
        let captured: CapturedWeapon = serde_json::from_value(json!({
            "name": " Hidden  Gambit ",
            "type": "switch-axe",
            "rarity": 8,
            "attack": {"display": 1050, "raw": 300},
            "data": [
                {"label": "Phial", "lead": "Exhaust   Phial"},
                {"label": "Affinity", "lead": "-10%"},
                {"label": "Dragon", "lead": "(240)"},
                {"label": "Slots", "lead": "[3] [1]"},
                {"label": "Rarity", "lead": "8"}
            ]
        }))
        .unwrap();

        let data = captured.interpret(&default_interpreters()).unwrap();
        assert_eq!(data.name, "Hidden Gambit");
        assert_eq!(data.attributes["phialType"], "Exhaust Phial");
        assert_eq!(data.attributes["affinity"], -10);
        assert_eq!(data.slots, vec![Slot { rank: 3 }, Slot { rank: 1 }]);
        assert_eq!(data.elements[0].element, Element::Dragon);
        assert!(data.elements[0].hidden);

        let payload = data.into_payload().into_value();
        assert_eq!(payload["type"], "switch-axe");
        assert_eq!(payload["attack"], json!({"display": 1050, "raw": 300}));
        assert_eq!(payload["elements"], json!([{"type": "dragon", "damage": 240, "hidden": true}]));
        assert!(payload.get("crafting").is_none());
    }

    #[test]
    fn test_payload_feeds_weapon_transformer() {
        use crate::entity::{EntityKind, Weapon};
        use crate::repository::EntityRepositoryExt;
        use crate::transform::create_entity;
        use crate::transform::test_support::setup_db;

        let mut data = WeaponData::new("Buster Sword I");
        data.weapon_type = Some(WeaponType::GreatSword);
        data.rarity = Some(1);
        data.set_attribute("affinity", 0);

        let db = setup_db();
        let record = create_entity(&db, EntityKind::Weapon, &data.into_payload()).unwrap();
        let weapon: Weapon = db.require(record.id()).unwrap();
        assert_eq!(weapon.slug, "buster-sword-i");
        assert_eq!(weapon.attributes["affinity"], 0);
    }
}
