//! Projection-aware response documents.
//!
//! Each normalizer emits a fixed set of always-visible fields, then adds each
//! optional subtree only when its dotted path is allowed by the projection.
//! Nested relationships are resolved through the repository.

mod equipment;
mod world;

use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::entity::{Attributes, CraftingCost, Entity, EntityId, Item, Record, Skill, SkillRank};
use crate::projection::Projection;
use crate::repository::{EntityRepository, EntityRepositoryExt, RepoResult};

/// Join a path prefix and a field name
pub(crate) fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// An open map, always as a JSON object
pub(crate) fn object(attributes: &Attributes) -> Value {
    Value::Object(
        attributes
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<Map<String, Value>>(),
    )
}

/// Walks records into response documents for one projection
pub struct Normalizer<'a> {
    repo: &'a dyn EntityRepository,
    projection: &'a Projection,
}

impl<'a> Normalizer<'a> {
    pub fn new(repo: &'a dyn EntityRepository, projection: &'a Projection) -> Self {
        Self { repo, projection }
    }

    pub(crate) fn allowed(&self, path: &str) -> bool {
        self.projection.is_allowed(path)
    }

    /// Normalize a single record; `None` in, `None` out
    pub fn normalize_one(&self, record: Option<&Record>) -> RepoResult<Option<Value>> {
        match record {
            Some(record) => self.normalize(record).map(Some),
            None => Ok(None),
        }
    }

    /// Normalize a list, keeping its order
    pub fn normalize_many(&self, records: &[Record]) -> RepoResult<Vec<Value>> {
        records.iter().map(|record| self.normalize(record)).collect()
    }

    pub fn normalize(&self, record: &Record) -> RepoResult<Value> {
        match record {
            Record::Ailment(ailment) => self.ailment(ailment),
            Record::Armor(armor) => self.armor(armor, ""),
            Record::ArmorSet(set) => self.armor_set(set),
            Record::Charm(charm) => self.charm(charm),
            Record::Decoration(decoration) => self.decoration(decoration),
            Record::Item(item) => Ok(self.item(item)),
            Record::Location(location) => Ok(self.location(location)),
            Record::Monster(monster) => self.monster(monster),
            Record::MotionValue(motion_value) => Ok(self.motion_value(motion_value)),
            Record::Skill(skill) => self.skill(skill),
            Record::SkillRank(rank) => self.skill_rank(rank, ""),
            Record::Weapon(weapon) => self.weapon(weapon),
        }
    }

    /// Load entities by ID in the given order, skipping dangling IDs
    pub(crate) fn load<E: Entity>(&self, ids: &[EntityId]) -> RepoResult<Vec<E>> {
        let mut by_id: HashMap<EntityId, E> = self
            .repo
            .list_by_ids(E::KIND, ids)?
            .into_iter()
            .filter_map(E::from_record)
            .map(|entity| (entity.id(), entity))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    pub(crate) fn item(&self, item: &Item) -> Value {
        json!({
            "id": item.id,
            "name": item.name,
            "description": item.description,
            "rarity": item.rarity,
            "carryLimit": item.carry_limit,
            "value": item.value,
        })
    }

    /// Skill rank document; `prefix` is the rank's own path
    pub(crate) fn skill_rank(&self, rank: &SkillRank, prefix: &str) -> RepoResult<Value> {
        let mut output = json!({
            "id": rank.id,
            "slug": rank.slug,
            "level": rank.level,
            "description": rank.description,
            "modifiers": object(&rank.modifiers),
        });

        if self.allowed(&join(prefix, "skill")) {
            output["skill"] = json!(rank.skill);
        }

        if self.allowed(&join(prefix, "skillName")) {
            let skill = self.repo.find::<Skill>(rank.skill)?;
            output["skillName"] = json!(skill.map(|skill| skill.name));
        }

        Ok(output)
    }

    pub(crate) fn skill_ranks(&self, ids: &[EntityId], prefix: &str) -> RepoResult<Vec<Value>> {
        self.load::<SkillRank>(ids)?
            .iter()
            .map(|rank| self.skill_rank(rank, prefix))
            .collect()
    }

    /// Crafting cost list; the item subtree is gated on `<prefix>.item`
    pub(crate) fn costs(&self, costs: &[CraftingCost], prefix: &str) -> RepoResult<Vec<Value>> {
        let with_item = self.allowed(&join(prefix, "item"));
        let items: HashMap<EntityId, Item> = if with_item {
            let ids: Vec<EntityId> = costs.iter().map(|cost| cost.item).collect();
            self.load::<Item>(&ids)?
                .into_iter()
                .map(|item| (item.id, item))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(costs
            .iter()
            .map(|cost| {
                let mut output = json!({ "quantity": cost.quantity });
                if with_item {
                    output["item"] = items
                        .get(&cost.item)
                        .map(|item| self.item(item))
                        .unwrap_or(Value::Null);
                }
                output
            })
            .collect())
    }
}
