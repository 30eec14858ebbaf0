use serde_json::{json, Map, Value};

use super::{join, object, Normalizer};
use crate::entity::{Armor, ArmorSet, Charm, Decoration, Weapon};
use crate::repository::RepoResult;

impl Normalizer<'_> {
    /// Armor document; `prefix` is empty for the armor collection and
    /// `pieces` when embedded in a set
    pub(crate) fn armor(&self, armor: &Armor, prefix: &str) -> RepoResult<Value> {
        let defense = &armor.defense;
        let resists = &armor.resistances;

        let mut output = json!({
            "id": armor.id,
            "slug": armor.slug,
            "name": armor.name,
            "type": armor.armor_type,
            "rank": armor.rank,
            "rarity": armor.rarity,
            "attributes": object(&armor.attributes),
            "defense": {
                "base": defense.base,
                "max": defense.max,
                "augmented": defense.augmented,
            },
            "resistances": {
                "fire": resists.fire,
                "water": resists.water,
                "ice": resists.ice,
                "thunder": resists.thunder,
                "dragon": resists.dragon,
            },
        });

        if self.allowed(&join(prefix, "slots")) {
            output["slots"] = json!(armor.slots);
        }

        let skills = join(prefix, "skills");
        if self.allowed(&skills) {
            output["skills"] = json!(self.skill_ranks(&armor.skills, &skills)?);
        }

        if self.allowed(&join(prefix, "armorSet")) {
            output["armorSet"] = json!(armor.armor_set);
        }

        let assets_path = join(prefix, "assets");
        if self.allowed(&assets_path) {
            output["assets"] = match &armor.assets {
                Some(assets) => {
                    let mut doc = Map::new();
                    if self.allowed(&join(&assets_path, "imageMale")) {
                        doc.insert("imageMale".into(), json!(assets.image_male));
                    }
                    if self.allowed(&join(&assets_path, "imageFemale")) {
                        doc.insert("imageFemale".into(), json!(assets.image_female));
                    }
                    Value::Object(doc)
                }
                None => Value::Null,
            };
        }

        let crafting_path = join(prefix, "crafting");
        if self.allowed(&crafting_path) {
            output["crafting"] = match &armor.crafting {
                Some(crafting) => {
                    let mut doc = Map::new();
                    let materials = join(&crafting_path, "materials");
                    if self.allowed(&materials) {
                        doc.insert(
                            "materials".into(),
                            json!(self.costs(&crafting.materials, &materials)?),
                        );
                    }
                    Value::Object(doc)
                }
                None => Value::Null,
            };
        }

        Ok(output)
    }

    pub(crate) fn armor_set(&self, set: &ArmorSet) -> RepoResult<Value> {
        let mut output = json!({
            "id": set.id,
            "name": set.name,
            "rank": set.rank,
        });

        if self.allowed("pieces") {
            let pieces = self
                .load::<Armor>(&set.pieces)?
                .iter()
                .map(|armor| self.armor(armor, "pieces"))
                .collect::<RepoResult<Vec<_>>>()?;
            output["pieces"] = json!(pieces);
        }

        if self.allowed("bonus") {
            output["bonus"] = match &set.bonus {
                Some(bonus) => {
                    let mut doc = json!({ "name": bonus.name });
                    if self.allowed("bonus.ranks") {
                        let mut ranks = Vec::with_capacity(bonus.ranks.len());
                        for rank in &bonus.ranks {
                            let mut entry = json!({ "pieces": rank.pieces });
                            if self.allowed("bonus.ranks.skill") {
                                entry["skill"] = self
                                    .skill_ranks(&[rank.skill], "bonus.ranks.skill")?
                                    .into_iter()
                                    .next()
                                    .unwrap_or(Value::Null);
                            }
                            ranks.push(entry);
                        }
                        doc["ranks"] = json!(ranks);
                    }
                    doc
                }
                None => Value::Null,
            };
        }

        Ok(output)
    }

    pub(crate) fn charm(&self, charm: &Charm) -> RepoResult<Value> {
        let mut output = json!({
            "id": charm.id,
            "slug": charm.slug,
            "name": charm.name,
        });

        if self.allowed("ranks") {
            let mut ranks = Vec::with_capacity(charm.ranks.len());
            for rank in &charm.ranks {
                let mut entry = json!({
                    "level": rank.level,
                    "rarity": rank.rarity,
                });

                if self.allowed("ranks.skills") {
                    entry["skills"] = json!(self.skill_ranks(&rank.skills, "ranks.skills")?);
                }

                if self.allowed("ranks.crafting") {
                    entry["crafting"] = match &rank.crafting {
                        Some(crafting) => {
                            let mut doc = json!({ "craftable": crafting.craftable });
                            if self.allowed("ranks.crafting.materials") {
                                doc["materials"] = json!(self.costs(
                                    &crafting.materials,
                                    "ranks.crafting.materials"
                                )?);
                            }
                            doc
                        }
                        None => Value::Null,
                    };
                }

                ranks.push(entry);
            }
            output["ranks"] = json!(ranks);
        }

        Ok(output)
    }

    pub(crate) fn decoration(&self, decoration: &Decoration) -> RepoResult<Value> {
        let mut output = json!({
            "id": decoration.id,
            "slug": decoration.slug,
            "name": decoration.name,
            "rarity": decoration.rarity,
            "slot": decoration.slot,
        });

        if self.allowed("skills") {
            output["skills"] = json!(self.skill_ranks(&decoration.skills, "skills")?);
        }

        Ok(output)
    }

    pub(crate) fn weapon(&self, weapon: &Weapon) -> RepoResult<Value> {
        let mut output = json!({
            "id": weapon.id,
            "slug": weapon.slug,
            "name": weapon.name,
            "type": weapon.weapon_type,
            "rarity": weapon.rarity,
            "attack": {
                "display": weapon.attack.display,
                "raw": weapon.attack.raw,
            },
            "attributes": object(&weapon.attributes),
        });

        if self.allowed("slots") {
            output["slots"] = json!(weapon.slots);
        }

        if self.allowed("elements") {
            output["elements"] = json!(weapon.elements);
        }

        if self.allowed("crafting") {
            output["crafting"] = match &weapon.crafting {
                Some(crafting) => {
                    let mut doc = json!({
                        "craftable": crafting.craftable,
                        "previous": crafting.previous,
                        "branches": crafting.branches,
                    });
                    if self.allowed("crafting.craftingMaterials") {
                        doc["craftingMaterials"] = json!(self.costs(
                            &crafting.crafting_materials,
                            "crafting.craftingMaterials"
                        )?);
                    }
                    if self.allowed("crafting.upgradeMaterials") {
                        doc["upgradeMaterials"] = json!(self.costs(
                            &crafting.upgrade_materials,
                            "crafting.upgradeMaterials"
                        )?);
                    }
                    doc
                }
                None => Value::Null,
            };
        }

        if self.allowed("assets") {
            output["assets"] = match &weapon.assets {
                Some(assets) => {
                    let mut doc = Map::new();
                    if self.allowed("assets.icon") {
                        doc.insert("icon".into(), json!(assets.icon));
                    }
                    if self.allowed("assets.image") {
                        doc.insert("image".into(), json!(assets.image));
                    }
                    Value::Object(doc)
                }
                None => Value::Null,
            };
        }

        Ok(output)
    }
}
