use serde_json::{json, Value};

use super::Normalizer;
use crate::entity::{Ailment, Item, Location, Monster, MotionValue, Skill};
use crate::repository::RepoResult;

impl Normalizer<'_> {
    fn items(&self, ids: &[i64]) -> RepoResult<Vec<Value>> {
        Ok(self
            .load::<Item>(ids)?
            .iter()
            .map(|item| self.item(item))
            .collect())
    }

    pub(crate) fn ailment(&self, ailment: &Ailment) -> RepoResult<Value> {
        let mut output = json!({
            "id": ailment.id,
            "name": ailment.name,
            "description": ailment.description,
        });

        if self.allowed("recovery") {
            let mut recovery = json!({ "actions": ailment.recovery.actions });
            if self.allowed("recovery.items") {
                recovery["items"] = json!(self.items(&ailment.recovery.items)?);
            }
            output["recovery"] = recovery;
        }

        if self.allowed("protection") {
            let mut protection = json!({});
            if self.allowed("protection.items") {
                protection["items"] = json!(self.items(&ailment.protection.items)?);
            }
            if self.allowed("protection.skills") {
                let skills: Vec<Value> = self
                    .load::<Skill>(&ailment.protection.skills)?
                    .iter()
                    .map(|skill| {
                        json!({
                            "id": skill.id,
                            "slug": skill.slug,
                            "name": skill.name,
                            "description": skill.description,
                        })
                    })
                    .collect();
                protection["skills"] = json!(skills);
            }
            output["protection"] = protection;
        }

        Ok(output)
    }

    pub(crate) fn location(&self, location: &Location) -> Value {
        let mut output = json!({
            "id": location.id,
            "name": location.name,
            "zoneCount": location.zone_count,
        });

        if self.allowed("camps") {
            output["camps"] = json!(location.camps);
        }

        output
    }

    pub(crate) fn monster(&self, monster: &Monster) -> RepoResult<Value> {
        let mut output = json!({
            "id": monster.id,
            "name": monster.name,
            "type": monster.monster_type,
            "species": monster.species,
            "description": monster.description,
            "elements": monster.elements,
        });

        if self.allowed("ailments") {
            let ailments: Vec<Value> = self
                .load::<Ailment>(&monster.ailments)?
                .iter()
                .map(|ailment| {
                    json!({
                        "id": ailment.id,
                        "name": ailment.name,
                        "description": ailment.description,
                    })
                })
                .collect();
            output["ailments"] = json!(ailments);
        }

        if self.allowed("locations") {
            let locations: Vec<Value> = self
                .load::<Location>(&monster.locations)?
                .iter()
                .map(|location| {
                    json!({
                        "id": location.id,
                        "name": location.name,
                        "zoneCount": location.zone_count,
                    })
                })
                .collect();
            output["locations"] = json!(locations);
        }

        if self.allowed("resistances") {
            output["resistances"] = json!(monster.resistances);
        }

        if self.allowed("weaknesses") {
            output["weaknesses"] = json!(monster.weaknesses);
        }

        Ok(output)
    }

    pub(crate) fn motion_value(&self, motion_value: &MotionValue) -> Value {
        json!({
            "id": motion_value.id,
            "name": motion_value.name,
            "weaponType": motion_value.weapon_type,
            "damageType": motion_value.damage_type,
            "stun": motion_value.stun,
            "exhaust": motion_value.exhaust,
            "hits": motion_value.hits,
        })
    }

    pub(crate) fn skill(&self, skill: &Skill) -> RepoResult<Value> {
        let mut output = json!({
            "id": skill.id,
            "slug": skill.slug,
            "name": skill.name,
            "description": skill.description,
        });

        if self.allowed("ranks") {
            let ranks = self.skill_ranks(&skill.ranks, "ranks")?;
            output["ranks"] = json!(ranks);
        }

        Ok(output)
    }
}
