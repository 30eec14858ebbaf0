use super::{
    populate_costs, populate_from_ids, subject_mut, Patch, Payload, TransformResult, Transformer,
};
use crate::entity::{Charm, CharmCrafting, CharmRank, Entity, EntityKind, Record};
use crate::repository::EntityRepository;

pub struct CharmTransformer;

impl CharmTransformer {
    fn rank(
        &self,
        repo: &dyn EntityRepository,
        definition: &Payload,
    ) -> TransformResult<CharmRank> {
        definition.require(&["level", "rarity"])?;

        let mut rank = CharmRank {
            level: definition.value("level")?.unwrap_or_default(),
            rarity: definition.value("rarity")?.unwrap_or_default(),
            ..Default::default()
        };

        if let Some(skills) = definition.ids("skills")? {
            rank.skills = populate_from_ids(
                repo,
                &definition.path("skills"),
                EntityKind::SkillRank,
                &skills,
            )?;
        }

        if let Patch::Set(crafting) = definition.nested("crafting")? {
            let materials = match crafting.list("materials")? {
                Some(entries) => populate_costs(repo, &crafting.path("materials"), &entries)?,
                None => Vec::new(),
            };
            rank.crafting = Some(CharmCrafting {
                craftable: crafting.value("craftable")?.unwrap_or(false),
                materials,
            });
        }

        Ok(rank)
    }
}

impl Transformer for CharmTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Charm
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name"])?;
        Ok(Charm::new(payload.string("name")?.unwrap_or_default()).into_record())
    }

    fn update(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let charm = subject_mut::<Charm>(record)?;

        if let Some(name) = payload.string("name")? {
            charm.set_name(name);
        }

        // Ranks are replaced wholesale, ordered by level
        if let Some(definitions) = payload.list("ranks")? {
            let mut ranks = definitions
                .iter()
                .map(|definition| self.rank(repo, definition))
                .collect::<TransformResult<Vec<_>>>()?;
            ranks.sort_by_key(|rank| rank.level);
            ranks.dedup_by_key(|rank| rank.level);
            charm.ranks = ranks;
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
    use super::super::{delete_entity, TransformError};
    use crate::entity::{Charm, CraftingCost, EntityKind};
    use crate::repository::EntityRepositoryExt;
    use serde_json::json;

    #[test]
    fn test_ranks_sorted_and_resolved() {
        let db = setup_db();
        create(&db, EntityKind::Item, json!({"name": "Iron Ore", "rarity": 1}));
        create(
            &db,
            EntityKind::Skill,
            json!({"name": "Poison Resistance", "ranks": [{"level": 1}, {"level": 2}]}),
        );

        let record = create(
            &db,
            EntityKind::Charm,
            json!({
                "name": "Poison Charm",
                "ranks": [
                    {"level": 2, "rarity": 4, "skills": [2]},
                    {"level": 1, "rarity": 3, "skills": [1], "crafting": {
                        "craftable": true,
                        "materials": [{"item": 1, "quantity": 3}]
                    }}
                ]
            }),
        );

        let charm: Charm = db.require(record.id()).unwrap();
        assert_eq!(charm.slug, "poison-charm");
        assert_eq!(charm.ranks.len(), 2);
        assert_eq!(charm.ranks[0].level, 1);
        assert_eq!(charm.ranks[0].skills, vec![1]);
        let crafting = charm.ranks[0].crafting.clone().unwrap();
        assert!(crafting.craftable);
        assert_eq!(crafting.materials, vec![CraftingCost { item: 1, quantity: 3 }]);
        assert!(charm.ranks[1].crafting.is_none());
    }

    #[test]
    fn test_rank_requires_level_and_rarity() {
        let db = setup_db();
        let err = super::super::create_entity(
            &db,
            EntityKind::Charm,
            &payload(json!({"name": "Poison Charm", "ranks": [{"skills": []}]})),
        )
        .unwrap_err();
        match err {
            TransformError::Validation { missing } => {
                assert_eq!(missing, vec!["ranks.0.level", "ranks.0.rarity"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_delete_is_plain() {
        let db = setup_db();
        let record = create(&db, EntityKind::Charm, json!({"name": "Poison Charm"}));
        delete_entity(&db, EntityKind::Charm, record.id()).unwrap();
        assert!(db.find::<Charm>(record.id()).unwrap().is_none());
    }
}
