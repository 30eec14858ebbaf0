use super::{subject_mut, subject_ref, Payload, TransformResult, Transformer};
use crate::entity::common::{remove_cost_item, remove_id};
use crate::entity::{Ailment, Armor, Charm, Entity, EntityKind, Item, Record, Weapon};
use crate::repository::{EntityRepository, EntityRepositoryExt};

pub struct ItemTransformer;

impl Transformer for ItemTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Item
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name", "rarity"])?;

        let item = Item::new(
            payload.string("name")?.unwrap_or_default(),
            payload.value("rarity")?.unwrap_or_default(),
        );
        Ok(item.into_record())
    }

    fn update(
        &self,
        _repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let item = subject_mut::<Item>(record)?;

        if let Some(name) = payload.string("name")? {
            item.name = name;
        }

        if let Some(description) = payload.patch::<String>("description")?.into_option() {
            item.description = description.unwrap_or_default();
        }

        if let Some(rarity) = payload.value("rarity")? {
            item.rarity = rarity;
        }

        if let Some(carry_limit) = payload.value("carryLimit")? {
            item.carry_limit = carry_limit;
        }

        if let Some(value) = payload.value("value")? {
            item.value = value;
        }

        Ok(())
    }

    fn delete(&self, repo: &dyn EntityRepository, record: &Record) -> TransformResult<()> {
        let id = subject_ref::<Item>(record)?.id;

        for path in ["$.recovery.items", "$.protection.items"] {
            for mut owner in repo.find_referencing(EntityKind::Ailment, path, id)? {
                if let Some(ailment) = Ailment::as_record_mut(&mut owner) {
                    remove_id(&mut ailment.recovery.items, id);
                    remove_id(&mut ailment.protection.items, id);
                }
                repo.save(&owner)?;
            }
        }

        // Crafting costs are objects, so these are scanned rather than indexed
        for mut armor in repo.all::<Armor>()? {
            let changed = armor
                .crafting
                .as_mut()
                .is_some_and(|crafting| remove_cost_item(&mut crafting.materials, id));
            if changed {
                repo.save(&armor.into_record())?;
            }
        }

        for mut charm in repo.all::<Charm>()? {
            let mut changed = false;
            for crafting in charm.ranks.iter_mut().filter_map(|rank| rank.crafting.as_mut()) {
                changed |= remove_cost_item(&mut crafting.materials, id);
            }
            if changed {
                repo.save(&charm.into_record())?;
            }
        }

        for mut weapon in repo.all::<Weapon>()? {
            let changed = weapon.crafting.as_mut().is_some_and(|crafting| {
                let crafted = remove_cost_item(&mut crafting.crafting_materials, id);
                let upgraded = remove_cost_item(&mut crafting.upgrade_materials, id);
                crafted || upgraded
            });
            if changed {
                repo.save(&weapon.into_record())?;
            }
        }

        Ok(())
    }
}
