use super::{
    populate_costs, populate_from_ids, resolve_id, subject_mut, subject_ref, Patch, Payload,
    TransformResult, Transformer,
};
use crate::entity::common::remove_id;
use crate::entity::{
    Attributes, Entity, EntityId, EntityKind, Record, Slot, Weapon, WeaponElement,
};
use crate::game::WeaponType;
use crate::repository::{EntityFilter, EntityRepository};

pub struct WeaponTransformer;

impl Transformer for WeaponTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Weapon
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name", "type", "rarity"])?;

        let weapon = Weapon::new(
            payload.string("name")?.unwrap_or_default(),
            payload
                .parsed::<WeaponType>("type")?
                .unwrap_or(WeaponType::GreatSword),
            payload.value("rarity")?.unwrap_or_default(),
        );
        Ok(weapon.into_record())
    }

    fn update(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let weapon = subject_mut::<Weapon>(record)?;

        if let Some(name) = payload.string("name")? {
            weapon.set_name(name);
        }

        if let Some(weapon_type) = payload.parsed::<WeaponType>("type")? {
            weapon.weapon_type = weapon_type;
        }

        if let Some(rarity) = payload.value("rarity")? {
            weapon.rarity = rarity;
        }

        if let Patch::Set(attack) = payload.nested("attack")? {
            if let Some(display) = attack.value("display")? {
                weapon.attack.display = display;
            }
            if let Some(raw) = attack.value("raw")? {
                weapon.attack.raw = raw;
            }
        }

        if let Some(slots) = payload.patch::<Vec<Slot>>("slots")?.into_option() {
            weapon.slots = slots.unwrap_or_default();
        }

        if let Some(elements) = payload.patch::<Vec<WeaponElement>>("elements")?.into_option() {
            let mut unique: Vec<WeaponElement> = Vec::new();
            for element in elements.unwrap_or_default() {
                match unique.iter_mut().find(|e| e.element == element.element) {
                    Some(existing) => *existing = element,
                    None => unique.push(element),
                }
            }
            weapon.elements = unique;
        }

        if let Some(attributes) = payload.patch::<Attributes>("attributes")?.into_option() {
            weapon.attributes = attributes.unwrap_or_default();
        }

        match payload.nested("crafting")? {
            Patch::Set(crafting) => {
                let self_id = weapon.id;
                let target = weapon.crafting.get_or_insert_with(Default::default);

                if let Some(craftable) = crafting.value("craftable")? {
                    target.craftable = craftable;
                }

                match crafting.patch::<EntityId>("previous")? {
                    Patch::Set(previous) => {
                        target.previous = Some(resolve_id(
                            repo,
                            "crafting.previous",
                            EntityKind::Weapon,
                            previous,
                        )?);
                    }
                    Patch::Clear => target.previous = None,
                    Patch::Absent => {}
                }

                if let Some(mut branches) = crafting.ids("branches")? {
                    branches.retain(|id| *id != self_id);
                    target.branches =
                        populate_from_ids(repo, "crafting.branches", EntityKind::Weapon, &branches)?;
                }

                if let Some(materials) = crafting.list("craftingMaterials")? {
                    target.crafting_materials =
                        populate_costs(repo, "crafting.craftingMaterials", &materials)?;
                }

                if let Some(materials) = crafting.list("upgradeMaterials")? {
                    target.upgrade_materials =
                        populate_costs(repo, "crafting.upgradeMaterials", &materials)?;
                }
            }
            Patch::Clear => weapon.crafting = None,
            Patch::Absent => {}
        }

        match payload.nested("assets")? {
            Patch::Set(assets) => {
                let target = weapon.assets.get_or_insert_with(Default::default);
                assets.patch::<String>("icon")?.apply_to(&mut target.icon);
                assets.patch::<String>("image")?.apply_to(&mut target.image);
            }
            Patch::Clear => weapon.assets = None,
            Patch::Absent => {}
        }

        Ok(())
    }

    fn delete(&self, repo: &dyn EntityRepository, record: &Record) -> TransformResult<()> {
        let id = subject_ref::<Weapon>(record)?.id;

        for mut owner in repo.find_referencing(EntityKind::Weapon, "$.crafting.branches", id)? {
            if let Some(crafting) = Weapon::as_record_mut(&mut owner).and_then(|w| w.crafting.as_mut()) {
                remove_id(&mut crafting.branches, id);
            }
            repo.save(&owner)?;
        }

        let children = EntityFilter::new().with("crafting.previous", id);
        for mut owner in repo.list(EntityKind::Weapon, &children)? {
            if let Some(crafting) = Weapon::as_record_mut(&mut owner).and_then(|w| w.crafting.as_mut()) {
                crafting.previous = None;
            }
            repo.save(&owner)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{delete_entity, update_entity, TransformError};
    use crate::entity::{EntityKind, Weapon};
    use crate::game::{Element, WeaponType};
    use crate::repository::EntityRepositoryExt;
    use serde_json::json;

    fn sword(db: &crate::sqlite::SqliteDb, name: &str) -> i64 {
        create(
            db,
            EntityKind::Weapon,
            json!({"name": name, "type": "great-sword", "rarity": 1}),
        )
        .id()
    }

    #[test]
    fn test_create_full() {
        let db = setup_db();
        let record = create(
            &db,
            EntityKind::Weapon,
            json!({
                "name": "Flammenzahn",
                "type": "great-sword",
                "rarity": 6,
                "attack": {"display": 864, "raw": 270},
                "slots": [{"rank": 1}],
                "elements": [{"type": "fire", "damage": 300, "hidden": false}],
                "attributes": {"affinity": -10}
            }),
        );

        let weapon: Weapon = db.require(record.id()).unwrap();
        assert_eq!(weapon.weapon_type, WeaponType::GreatSword);
        assert_eq!(weapon.attack.raw, 270);
        assert_eq!(weapon.elements[0].element, Element::Fire);
        assert_eq!(weapon.attributes["affinity"], json!(-10));
        assert!(weapon.crafting.is_none());
    }

    #[test]
    fn test_crafting_tree_and_delete() {
        let db = setup_db();
        let first = sword(&db, "Buster Sword I");
        let second = sword(&db, "Buster Sword II");
        let branch = sword(&db, "Chrome Razor I");

        update_entity(
            &db,
            EntityKind::Weapon,
            first,
            &payload(json!({"crafting": {"craftable": true, "branches": [second, branch, first]}})),
        )
        .unwrap();
        update_entity(
            &db,
            EntityKind::Weapon,
            second,
            &payload(json!({"crafting": {"previous": first}})),
        )
        .unwrap();

        let weapon: Weapon = db.require(first).unwrap();
        assert_eq!(weapon.crafting.unwrap().branches, vec![second, branch]);

        delete_entity(&db, EntityKind::Weapon, first).unwrap();
        let weapon: Weapon = db.require(second).unwrap();
        assert_eq!(weapon.crafting.unwrap().previous, None);

        delete_entity(&db, EntityKind::Weapon, branch).unwrap();
        assert!(db.find::<Weapon>(branch).unwrap().is_none());
    }

    #[test]
    fn test_unknown_previous() {
        let db = setup_db();
        let id = sword(&db, "Buster Sword I");
        let err = update_entity(
            &db,
            EntityKind::Weapon,
            id,
            &payload(json!({"crafting": {"previous": 42}})),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Reference { kind: EntityKind::Weapon, id: 42, .. }));
    }
}
