//! Per-kind exporters.
//!
//! Cross references are written as IDs, which are also the document file
//! names inside each group. Skill ranks are written as `{skill, level}` pairs
//! pointing into the owning skill's embedded rank list.

use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::{AssetRef, Export, ExportResult};
use crate::entity::{
    Ailment, Armor, ArmorSet, Charm, CraftingCost, Decoration, Entity, EntityId,
    EntityKind, Item, Location, Monster, MotionValue, Record, Skill, SkillRank, Weapon,
};
use crate::normalize::object;
use crate::repository::EntityRepository;

type Document = BTreeMap<String, Value>;

fn document<const N: usize>(fields: [(&str, Value); N]) -> Document {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Shared lookups for exporters
pub struct ExportHelper<'a> {
    repo: &'a dyn EntityRepository,
}

impl<'a> ExportHelper<'a> {
    pub fn new(repo: &'a dyn EntityRepository) -> Self {
        Self { repo }
    }

    /// `[{skill, level}]` for a list of skill rank IDs, in list order
    pub fn simple_skill_ranks(&self, ids: &[EntityId]) -> ExportResult<Vec<Value>> {
        let ranks: BTreeMap<EntityId, SkillRank> = self
            .repo
            .list_by_ids(EntityKind::SkillRank, ids)?
            .into_iter()
            .filter_map(SkillRank::from_record)
            .map(|rank| (rank.id, rank))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| ranks.get(id))
            .map(|rank| json!({ "skill": rank.skill, "level": rank.level }))
            .collect())
    }

    pub fn simple_skill_rank(&self, id: EntityId) -> ExportResult<Value> {
        Ok(self
            .simple_skill_ranks(&[id])?
            .into_iter()
            .next()
            .unwrap_or(Value::Null))
    }

    pub fn costs(&self, costs: &[CraftingCost]) -> Value {
        json!(costs)
    }

    /// Full rank documents for a skill, ordered as the skill lists them
    pub fn skill_ranks(&self, skill: &Skill) -> ExportResult<Vec<Value>> {
        let mut ranks: BTreeMap<EntityId, SkillRank> = self
            .repo
            .list_by_ids(EntityKind::SkillRank, &skill.ranks)?
            .into_iter()
            .filter_map(SkillRank::from_record)
            .map(|rank| (rank.id, rank))
            .collect();

        Ok(skill
            .ranks
            .iter()
            .filter_map(|id| ranks.remove(id))
            .map(|rank| {
                json!({
                    "slug": rank.slug,
                    "level": rank.level,
                    "description": rank.description,
                    "modifiers": object(&rank.modifiers),
                })
            })
            .collect())
    }
}

/// Turns one entity kind into export documents
pub trait Exporter {
    fn kind(&self) -> EntityKind;

    fn export(&self, helper: &ExportHelper<'_>, record: &Record) -> ExportResult<Option<Export>>;
}

macro_rules! exporter {
    ($name:ident, $entity:ident, |$helper:ident, $subject:ident| $body:block) => {
        pub struct $name;

        impl Exporter for $name {
            fn kind(&self) -> EntityKind {
                EntityKind::$entity
            }

            fn export(
                &self,
                #[allow(unused_variables)] $helper: &ExportHelper<'_>,
                record: &Record,
            ) -> ExportResult<Option<Export>> {
                let Some($subject) = $entity::as_record_ref(record) else {
                    return Ok(None);
                };
                Ok(Some($body))
            }
        }
    };
}

exporter!(AilmentExporter, Ailment, |helper, ailment| {
    let data = document([
        ("name", json!(ailment.name)),
        ("description", json!(ailment.description)),
        (
            "recovery",
            json!({
                "actions": ailment.recovery.actions,
                "items": ailment.recovery.items,
            }),
        ),
        (
            "protection",
            json!({
                "items": ailment.protection.items,
                "skills": ailment.protection.skills,
            }),
        ),
    ]);
    Export::new("ailments", data)
});

exporter!(ArmorExporter, Armor, |helper, armor| {
    let data = document([
        ("slug", json!(armor.slug)),
        ("name", json!(armor.name)),
        ("type", json!(armor.armor_type)),
        ("rank", json!(armor.rank)),
        ("rarity", json!(armor.rarity)),
        ("attributes", object(&armor.attributes)),
        ("defense", json!(armor.defense)),
        ("resistances", json!(armor.resistances)),
        ("slots", json!(armor.slots)),
        ("skills", json!(helper.simple_skill_ranks(&armor.skills)?)),
        ("armorSet", json!(armor.armor_set)),
        (
            "crafting",
            match &armor.crafting {
                Some(crafting) => json!({ "materials": helper.costs(&crafting.materials) }),
                None => Value::Null,
            },
        ),
        ("assets", json!(armor.assets)),
    ]);

    let assets = armor
        .assets
        .iter()
        .flat_map(|assets| assets.uris())
        .map(AssetRef::new)
        .collect();

    Export::new("armor", data).with_assets(assets)
});

exporter!(ArmorSetExporter, ArmorSet, |helper, set| {
    let bonus = match &set.bonus {
        Some(bonus) => {
            let mut ranks = Vec::with_capacity(bonus.ranks.len());
            for rank in &bonus.ranks {
                ranks.push(json!({
                    "pieces": rank.pieces,
                    "skill": helper.simple_skill_rank(rank.skill)?,
                }));
            }
            json!({ "name": bonus.name, "ranks": ranks })
        }
        None => Value::Null,
    };

    let data = document([
        ("name", json!(set.name)),
        ("rank", json!(set.rank)),
        ("pieces", json!(set.pieces)),
        ("bonus", bonus),
    ]);
    Export::new("armor-sets", data)
});

exporter!(CharmExporter, Charm, |helper, charm| {
    let mut ranks = Vec::with_capacity(charm.ranks.len());
    for rank in &charm.ranks {
        ranks.push(json!({
            "level": rank.level,
            "rarity": rank.rarity,
            "skills": helper.simple_skill_ranks(&rank.skills)?,
            "crafting": rank.crafting.as_ref().map(|crafting| json!({
                "craftable": crafting.craftable,
                "materials": helper.costs(&crafting.materials),
            })),
        }));
    }

    let data = document([
        ("slug", json!(charm.slug)),
        ("name", json!(charm.name)),
        ("ranks", json!(ranks)),
    ]);
    Export::new("charms", data)
});

exporter!(DecorationExporter, Decoration, |helper, decoration| {
    let data = document([
        ("slug", json!(decoration.slug)),
        ("name", json!(decoration.name)),
        ("slot", json!(decoration.slot)),
        ("rarity", json!(decoration.rarity)),
        ("skills", json!(helper.simple_skill_ranks(&decoration.skills)?)),
    ]);
    Export::new("decorations", data)
});

exporter!(ItemExporter, Item, |helper, item| {
    let data = document([
        ("name", json!(item.name)),
        ("description", json!(item.description)),
        ("rarity", json!(item.rarity)),
        ("carryLimit", json!(item.carry_limit)),
        ("value", json!(item.value)),
    ]);
    Export::new("items", data)
});

exporter!(LocationExporter, Location, |helper, location| {
    let data = document([
        ("name", json!(location.name)),
        ("zoneCount", json!(location.zone_count)),
        ("camps", json!(location.camps)),
    ]);
    Export::new("locations", data)
});

exporter!(MonsterExporter, Monster, |helper, monster| {
    let data = document([
        ("name", json!(monster.name)),
        ("type", json!(monster.monster_type)),
        ("species", json!(monster.species)),
        ("description", json!(monster.description)),
        ("elements", json!(monster.elements)),
        ("ailments", json!(monster.ailments)),
        ("locations", json!(monster.locations)),
        ("resistances", json!(monster.resistances)),
        ("weaknesses", json!(monster.weaknesses)),
    ]);
    Export::new("monsters", data)
});

exporter!(MotionValueExporter, MotionValue, |helper, motion_value| {
    let data = document([
        ("name", json!(motion_value.name)),
        ("weaponType", json!(motion_value.weapon_type)),
        ("damageType", json!(motion_value.damage_type)),
        ("stun", json!(motion_value.stun)),
        ("exhaust", json!(motion_value.exhaust)),
        ("hits", json!(motion_value.hits)),
    ]);
    let group = format!("motion-values/{}", motion_value.weapon_type);
    Export::new(group, data)
});

exporter!(SkillExporter, Skill, |helper, skill| {
    let data = document([
        ("slug", json!(skill.slug)),
        ("name", json!(skill.name)),
        ("description", json!(skill.description)),
        ("ranks", json!(helper.skill_ranks(skill)?)),
    ]);
    Export::new("skills", data)
});

exporter!(WeaponExporter, Weapon, |helper, weapon| {
    let crafting = match &weapon.crafting {
        Some(crafting) => json!({
            "craftable": crafting.craftable,
            "previous": crafting.previous,
            "branches": crafting.branches,
            "craftingMaterials": helper.costs(&crafting.crafting_materials),
            "upgradeMaterials": helper.costs(&crafting.upgrade_materials),
        }),
        None => Value::Null,
    };

    let data = document([
        ("slug", json!(weapon.slug)),
        ("name", json!(weapon.name)),
        ("type", json!(weapon.weapon_type)),
        ("rarity", json!(weapon.rarity)),
        ("attack", json!(weapon.attack)),
        ("slots", json!(weapon.slots)),
        ("elements", json!(weapon.elements)),
        ("attributes", object(&weapon.attributes)),
        ("crafting", crafting),
        ("assets", json!(weapon.assets)),
    ]);

    let assets = weapon
        .assets
        .iter()
        .flat_map(|assets| assets.uris())
        .map(AssetRef::new)
        .collect();

    let group = format!("weapons/{}", weapon.weapon_type);
    Export::new(group, data).with_assets(assets)
});

/// Dispatches records to the exporter for their kind
pub struct ExportManager {
    exporters: Vec<Box<dyn Exporter + Send + Sync>>,
}

impl Default for ExportManager {
    fn default() -> Self {
        Self {
            exporters: vec![
                Box::new(AilmentExporter),
                Box::new(ArmorExporter),
                Box::new(ArmorSetExporter),
                Box::new(CharmExporter),
                Box::new(DecorationExporter),
                Box::new(ItemExporter),
                Box::new(LocationExporter),
                Box::new(MonsterExporter),
                Box::new(MotionValueExporter),
                Box::new(SkillExporter),
                Box::new(WeaponExporter),
            ],
        }
    }
}

impl ExportManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exporter, replacing any existing one for the same kind
    pub fn register(&mut self, exporter: Box<dyn Exporter + Send + Sync>) {
        self.exporters.retain(|existing| existing.kind() != exporter.kind());
        self.exporters.push(exporter);
    }

    pub fn supports(&self, kind: EntityKind) -> bool {
        self.exporters.iter().any(|exporter| exporter.kind() == kind)
    }

    /// Export a record, `None` if no exporter handles its kind
    pub fn export(&self, helper: &ExportHelper<'_>, record: &Record) -> ExportResult<Option<Export>> {
        match self
            .exporters
            .iter()
            .find(|exporter| exporter.kind() == record.kind())
        {
            Some(exporter) => exporter.export(helper, record),
            None => Ok(None),
        }
    }
}
