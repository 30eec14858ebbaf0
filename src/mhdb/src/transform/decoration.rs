use super::{populate_from_ids, subject_mut, Payload, TransformResult, Transformer};
use crate::entity::{Decoration, Entity, EntityKind, Record};
use crate::repository::EntityRepository;

pub struct DecorationTransformer;

impl Transformer for DecorationTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Decoration
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name", "slot", "rarity"])?;

        let decoration = Decoration::new(
            payload.string("name")?.unwrap_or_default(),
            payload.value("slot")?.unwrap_or_default(),
            payload.value("rarity")?.unwrap_or_default(),
        );
        Ok(decoration.into_record())
    }

    fn update(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let decoration = subject_mut::<Decoration>(record)?;

        if let Some(name) = payload.string("name")? {
            decoration.set_name(name);
        }

        if let Some(slot) = payload.value("slot")? {
            decoration.slot = slot;
        }

        if let Some(rarity) = payload.value("rarity")? {
            decoration.rarity = rarity;
        }

        if let Some(skills) = payload.ids("skills")? {
            decoration.skills = populate_from_ids(repo, "skills", EntityKind::SkillRank, &skills)?;
        }

        Ok(())
    }

    fn delete(&self, _repo: &dyn EntityRepository, _record: &Record) -> TransformResult<()> {
        Ok(())
    }
}
