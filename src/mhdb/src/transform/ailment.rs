use super::{populate_from_ids, subject_mut, subject_ref, Patch, Payload, TransformResult, Transformer};
use crate::entity::common::remove_id;
use crate::entity::{Ailment, Entity, EntityKind, Monster, Record};
use crate::repository::EntityRepository;

pub struct AilmentTransformer;

impl Transformer for AilmentTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Ailment
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name", "description"])?;

        let name = payload.string("name")?.unwrap_or_default();
        let description = payload.string("description")?.unwrap_or_default();
        Ok(Ailment::new(name, description).into_record())
    }

    fn update(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let ailment = subject_mut::<Ailment>(record)?;

        if let Some(name) = payload.string("name")? {
            ailment.name = name;
        }

        if let Some(description) = payload.string("description")? {
            ailment.description = description;
        }

        match payload.nested("recovery")? {
            Patch::Set(recovery) => {
                if let Some(items) = recovery.ids("items")? {
                    ailment.recovery.items =
                        populate_from_ids(repo, "recovery.items", EntityKind::Item, &items)?;
                }
                if let Some(actions) = recovery.patch::<Vec<String>>("actions")?.into_option() {
                    ailment.recovery.actions = actions.unwrap_or_default();
                }
            }
            Patch::Clear => ailment.recovery = Default::default(),
            Patch::Absent => {}
        }

        match payload.nested("protection")? {
            Patch::Set(protection) => {
                if let Some(items) = protection.ids("items")? {
                    ailment.protection.items =
                        populate_from_ids(repo, "protection.items", EntityKind::Item, &items)?;
                }
                if let Some(skills) = protection.ids("skills")? {
                    ailment.protection.skills =
                        populate_from_ids(repo, "protection.skills", EntityKind::Skill, &skills)?;
                }
            }
            Patch::Clear => ailment.protection = Default::default(),
            Patch::Absent => {}
        }

        Ok(())
    }

    fn delete(&self, repo: &dyn EntityRepository, record: &Record) -> TransformResult<()> {
        let ailment = subject_ref::<Ailment>(record)?;

        for mut owner in repo.find_referencing(EntityKind::Monster, "$.ailments", ailment.id)? {
            if let Some(monster) = Monster::as_record_mut(&mut owner) {
                remove_id(&mut monster.ailments, ailment.id);
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
    use crate::entity::{Ailment, EntityKind, Monster};
    use crate::repository::EntityRepositoryExt;
    use serde_json::json;

    #[test]
    fn test_create_with_recovery() {
        let db = setup_db();
        create(&db, EntityKind::Item, json!({"name": "Antidote", "rarity": 1}));

        let record = create(
            &db,
            EntityKind::Ailment,
            json!({
                "name": "Poison",
                "description": "Drains health",
                "recovery": {"items": [1], "actions": ["Wait it out"]}
            }),
        );

        let ailment: Ailment = db.require(record.id()).unwrap();
        assert_eq!(ailment.recovery.items, vec![1]);
        assert_eq!(ailment.recovery.actions, vec!["Wait it out"]);
        assert!(ailment.protection.items.is_empty());
    }

    #[test]
    fn test_relationship_replace_keeps_order() {
        let db = setup_db();
        for name in ["A", "B", "C", "D"] {
            create(&db, EntityKind::Item, json!({"name": name, "rarity": 1}));
        }
        let record = create(
            &db,
            EntityKind::Ailment,
            json!({"name": "Poison", "description": "x", "recovery": {"items": [4, 1]}}),
        );

        update_entity(
            &db,
            EntityKind::Ailment,
            record.id(),
            &payload(json!({"recovery": {"items": [3, 1, 2]}})),
        )
        .unwrap();

        let ailment: Ailment = db.require(record.id()).unwrap();
        assert_eq!(ailment.recovery.items, vec![3, 1, 2]);
    }

    #[test]
    fn test_unknown_item_is_reference_error() {
        let db = setup_db();
        let err = super::super::create_entity(
            &db,
            EntityKind::Ailment,
            &payload(json!({"name": "Poison", "description": "x", "protection": {"items": [9]}})),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Reference { id: 9, .. }));
    }

    #[test]
    fn test_delete_scrubs_monsters() {
        let db = setup_db();
        let poison = create(
            &db,
            EntityKind::Ailment,
            json!({"name": "Poison", "description": "x"}),
        );
        let stun = create(
            &db,
            EntityKind::Ailment,
            json!({"name": "Stun", "description": "y"}),
        );
        let monster = create(
            &db,
            EntityKind::Monster,
            json!({
                "name": "Pukei-Pukei",
                "type": "large",
                "species": "Bird Wyvern",
                "ailments": [poison.id(), stun.id()]
            }),
        );

        delete_entity(&db, EntityKind::Ailment, poison.id()).unwrap();

        let monster: Monster = db.require(monster.id()).unwrap();
        assert_eq!(monster.ailments, vec![stun.id()]);
        assert!(db.find::<Ailment>(poison.id()).unwrap().is_none());
    }
}
