use super::{populate_from_ids, subject_mut, Payload, TransformResult, Transformer};
use crate::entity::{Entity, EntityKind, Monster, MonsterResistance, MonsterWeakness, Record};
use crate::game::Element;
use crate::repository::EntityRepository;

pub struct MonsterTransformer;

impl Transformer for MonsterTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Monster
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name", "type", "species"])?;

        let monster = Monster::new(
            payload.string("name")?.unwrap_or_default(),
            payload.string("type")?.unwrap_or_default(),
            payload.string("species")?.unwrap_or_default(),
        );
        Ok(monster.into_record())
    }

    fn update(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let monster = subject_mut::<Monster>(record)?;

        if let Some(name) = payload.string("name")? {
            monster.name = name;
        }

        if let Some(monster_type) = payload.string("type")? {
            monster.monster_type = monster_type;
        }

        if let Some(species) = payload.string("species")? {
            monster.species = species;
        }

        payload
            .patch::<String>("description")?
            .apply_to(&mut monster.description);

        if let Some(elements) = payload.parsed_list::<Element>("elements")? {
            monster.elements.clear();
            for element in elements {
                if !monster.elements.contains(&element) {
                    monster.elements.push(element);
                }
            }
        }

        if let Some(ailments) = payload.ids("ailments")? {
            monster.ailments = populate_from_ids(repo, "ailments", EntityKind::Ailment, &ailments)?;
        }

        if let Some(locations) = payload.ids("locations")? {
            monster.locations =
                populate_from_ids(repo, "locations", EntityKind::Location, &locations)?;
        }

        if let Some(resistances) = payload
            .patch::<Vec<MonsterResistance>>("resistances")?
            .into_option()
        {
            monster.resistances = resistances.unwrap_or_default();
        }

        if let Some(weaknesses) = payload
            .patch::<Vec<MonsterWeakness>>("weaknesses")?
            .into_option()
        {
            monster.weaknesses = weaknesses.unwrap_or_default();
        }

        Ok(())
    }

    fn delete(&self, _repo: &dyn EntityRepository, _record: &Record) -> TransformResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{create_entity, TransformError};
    use crate::entity::{EntityKind, Monster};
    use crate::game::Element;
    use crate::repository::EntityRepositoryExt;
    use serde_json::json;

    #[test]
    fn test_elements_and_weaknesses() {
        let db = setup_db();
        let record = create(
            &db,
            EntityKind::Monster,
            json!({
                "name": "Rathalos",
                "type": "large",
                "species": "Flying Wyvern",
                "elements": ["fire", "poison", "fire"],
                "weaknesses": [{"element": "dragon", "stars": 3}]
            }),
        );

        let monster: Monster = db.require(record.id()).unwrap();
        assert_eq!(monster.elements, vec![Element::Fire, Element::Poison]);
        assert_eq!(monster.weaknesses[0].element, Element::Dragon);
        assert_eq!(monster.weaknesses[0].condition, None);
        assert_eq!(monster.description, None);
    }

    #[test]
    fn test_rejects_unknown_element() {
        let db = setup_db();
        let err = create_entity(
            &db,
            EntityKind::Monster,
            &payload(json!({"name": "Rathalos", "type": "large", "species": "Flying Wyvern", "elements": ["lava"]})),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::InvalidField { field, .. } if field == "elements"));
    }
}
