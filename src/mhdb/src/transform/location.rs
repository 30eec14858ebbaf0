use super::{subject_mut, subject_ref, Payload, TransformResult, Transformer};
use crate::entity::common::remove_id;
use crate::entity::{Camp, Entity, EntityKind, Location, Monster, Record};
use crate::repository::EntityRepository;

pub struct LocationTransformer;

impl Transformer for LocationTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Location
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name", "zoneCount"])?;

        let location = Location::new(
            payload.string("name")?.unwrap_or_default(),
            payload.value("zoneCount")?.unwrap_or_default(),
        );
        Ok(location.into_record())
    }

    fn update(
        &self,
        _repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let location = subject_mut::<Location>(record)?;

        if let Some(name) = payload.string("name")? {
            location.name = name;
        }

        if let Some(zone_count) = payload.value("zoneCount")? {
            location.zone_count = zone_count;
        }

        if let Some(camps) = payload.patch::<Vec<Camp>>("camps")?.into_option() {
            location.camps = camps.unwrap_or_default();
        }

        Ok(())
    }

    fn delete(&self, repo: &dyn EntityRepository, record: &Record) -> TransformResult<()> {
        let id = subject_ref::<Location>(record)?.id;

        for mut owner in repo.find_referencing(EntityKind::Monster, "$.locations", id)? {
            if let Some(monster) = Monster::as_record_mut(&mut owner) {
                remove_id(&mut monster.locations, id);
            }
            repo.save(&owner)?;
        }

        Ok(())
    }
}
