use super::armor_set::release_piece;
use super::{
    populate_costs, populate_from_ids, resolve_id, subject_mut, subject_ref, Patch, Payload,
    TransformResult, Transformer,
};
use crate::entity::common::remove_id;
use crate::entity::{Armor, ArmorSet, Attributes, Entity, EntityKind, Record, Slot};
use crate::game::{ArmorType, Element, Rank};
use crate::repository::{EntityRepository, RepoError};

pub struct ArmorTransformer;

impl Transformer for ArmorTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Armor
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name", "type", "rank", "rarity"])?;

        let armor = Armor::new(
            payload.string("name")?.unwrap_or_default(),
            payload.parsed::<ArmorType>("type")?.unwrap_or(ArmorType::Head),
            payload.parsed::<Rank>("rank")?.unwrap_or(Rank::Low),
            payload.value::<u8>("rarity")?.unwrap_or_default(),
        );
        Ok(armor.into_record())
    }

    fn update(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let armor = subject_mut::<Armor>(record)?;

        if let Some(name) = payload.string("name")? {
            armor.set_name(name);
        }

        if let Some(armor_type) = payload.parsed::<ArmorType>("type")? {
            armor.armor_type = armor_type;
        }

        if let Some(rank) = payload.parsed::<Rank>("rank")? {
            armor.rank = rank;
        }

        if let Some(rarity) = payload.value::<u8>("rarity")? {
            armor.rarity = rarity;
        }

        if let Some(attributes) = payload.patch::<Attributes>("attributes")?.into_option() {
            armor.attributes = attributes.unwrap_or_default();
        }

        if let Patch::Set(defense) = payload.nested("defense")? {
            if let Some(base) = defense.value("base")? {
                armor.defense.base = base;
            }
            if let Some(max) = defense.value("max")? {
                armor.defense.max = max;
            }
            if let Some(augmented) = defense.value("augmented")? {
                armor.defense.augmented = augmented;
            }
        }

        if let Patch::Set(resistances) = payload.nested("resistances")? {
            for element in Element::RESISTANCES {
                if let Some(value) = resistances.value::<i32>(element.as_str())? {
                    armor.resistances.set(*element, value);
                }
            }
        }

        if let Some(slots) = payload.patch::<Vec<Slot>>("slots")?.into_option() {
            armor.slots = slots.unwrap_or_default();
        }

        if let Some(skills) = payload.ids("skills")? {
            armor.skills = populate_from_ids(repo, "skills", EntityKind::SkillRank, &skills)?;
        }

        match payload.patch::<i64>("armorSet")? {
            Patch::Set(set) => {
                armor.armor_set = Some(resolve_id(repo, "armorSet", EntityKind::ArmorSet, set)?);
            }
            Patch::Clear => armor.armor_set = None,
            Patch::Absent => {}
        }

        match payload.nested("crafting")? {
            Patch::Set(crafting) => {
                let target = armor.crafting.get_or_insert_with(Default::default);
                if let Some(materials) = crafting.list("materials")? {
                    target.materials = populate_costs(repo, "crafting.materials", &materials)?;
                }
            }
            Patch::Clear => armor.crafting = None,
            Patch::Absent => {}
        }

        match payload.nested("assets")? {
            Patch::Set(assets) => {
                let target = armor.assets.get_or_insert_with(Default::default);
                assets
                    .patch::<String>("imageMale")?
                    .apply_to(&mut target.image_male);
                assets
                    .patch::<String>("imageFemale")?
                    .apply_to(&mut target.image_female);
            }
            Patch::Clear => armor.assets = None,
            Patch::Absent => {}
        }

        Ok(())
    }

    /// Keep set membership in step with `armorSet`
    fn persist_owned(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<bool> {
        if !payload.has("armorSet") {
            return Ok(false);
        }

        let armor = subject_ref::<Armor>(record)?;
        release_piece(repo, armor.id, armor.armor_set.unwrap_or_default())?;

        if let Some(set_id) = armor.armor_set {
            let mut owner = repo
                .get(EntityKind::ArmorSet, set_id)?
                .ok_or(RepoError::NotFound {
                    kind: EntityKind::ArmorSet,
                    id: set_id,
                })?;
            if let Some(set) = ArmorSet::as_record_mut(&mut owner) {
                if !set.pieces.contains(&armor.id) {
                    set.pieces.push(armor.id);
                    repo.save(&owner)?;
                }
            }
        }

        Ok(false)
    }

    fn delete(&self, repo: &dyn EntityRepository, record: &Record) -> TransformResult<()> {
        let armor = subject_ref::<Armor>(record)?;

        for mut owner in repo.find_referencing(EntityKind::ArmorSet, "$.pieces", armor.id)? {
            if let Some(set) = ArmorSet::as_record_mut(&mut owner) {
                remove_id(&mut set.pieces, armor.id);
            }
            repo.save(&owner)?;
        }

        Ok(())
    }
}
