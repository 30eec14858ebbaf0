use super::{scrub_skill_rank, subject_mut, subject_ref, Patch, Payload, TransformResult, Transformer};
use crate::entity::common::remove_id;
use crate::entity::skill::rank_slug;
use crate::entity::{Ailment, Attributes, Entity, EntityKind, Record, Skill, SkillRank};
use crate::repository::EntityRepository;

pub struct SkillTransformer;

/// One entry of a skill's `ranks` payload
struct RankDefinition {
    level: u8,
    description: Patch<String>,
    modifiers: Patch<Attributes>,
}

/// Parse and validate the `ranks` list, sorted by level with repeats dropped
fn rank_definitions(payload: &Payload) -> TransformResult<Option<Vec<RankDefinition>>> {
    let Some(entries) = payload.list("ranks")? else {
        return Ok(None);
    };

    let mut definitions = Vec::with_capacity(entries.len());
    for entry in &entries {
        entry.require(&["level"])?;
        definitions.push(RankDefinition {
            level: entry.value("level")?.unwrap_or_default(),
            description: entry.patch("description")?,
            modifiers: entry.patch("modifiers")?,
        });
    }

    definitions.sort_by_key(|definition| definition.level);
    definitions.dedup_by_key(|definition| definition.level);
    Ok(Some(definitions))
}

impl Transformer for SkillTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Skill
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name"])?;
        Ok(Skill::new(payload.string("name")?.unwrap_or_default()).into_record())
    }

    fn update(
        &self,
        _repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let skill = subject_mut::<Skill>(record)?;

        if let Some(name) = payload.string("name")? {
            skill.set_name(name);
        }

        if let Some(description) = payload.patch::<String>("description")?.into_option() {
            skill.description = description.unwrap_or_default();
        }

        // Rank rows need the skill's ID; they are written in persist_owned
        rank_definitions(payload)?;

        Ok(())
    }

    /// Match ranks by level, re-using existing rows and deleting levels that
    /// are no longer listed. Rank slugs follow the skill's slug.
    fn persist_owned(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<bool> {
        let skill = subject_mut::<Skill>(record)?;

        let mut existing: Vec<SkillRank> = repo
            .list_by_ids(EntityKind::SkillRank, &skill.ranks)?
            .into_iter()
            .filter_map(SkillRank::from_record)
            .collect();

        let Some(definitions) = rank_definitions(payload)? else {
            for mut rank in existing {
                let slug = rank_slug(&skill.slug, rank.level);
                if rank.slug != slug {
                    rank.slug = slug;
                    repo.save(&rank.into_record())?;
                }
            }
            return Ok(false);
        };

        let mut kept = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let mut rank = match existing.iter().position(|rank| rank.level == definition.level) {
                Some(index) => existing.remove(index),
                None => SkillRank::new(skill, definition.level),
            };

            rank.skill = skill.id;
            rank.slug = rank_slug(&skill.slug, rank.level);
            if let Some(description) = definition.description.into_option() {
                rank.description = description.unwrap_or_default();
            }
            if let Some(modifiers) = definition.modifiers.into_option() {
                rank.modifiers = modifiers.unwrap_or_default();
            }

            let mut rank = rank.into_record();
            if rank.id() == 0 {
                repo.insert(&mut rank)?;
            } else {
                repo.save(&rank)?;
            }
            kept.push(rank.id());
        }

        for leftover in existing {
            tracing::debug!(skill = skill.id, rank = leftover.id, "removing skill rank");
            scrub_skill_rank(repo, leftover.id)?;
            repo.delete(EntityKind::SkillRank, leftover.id)?;
        }

        let changed = skill.ranks != kept;
        skill.ranks = kept;
        Ok(changed)
    }

    fn delete(&self, repo: &dyn EntityRepository, record: &Record) -> TransformResult<()> {
        let skill = subject_ref::<Skill>(record)?;

        for rank in &skill.ranks {
            scrub_skill_rank(repo, *rank)?;
            repo.delete(EntityKind::SkillRank, *rank)?;
        }

        for mut owner in repo.find_referencing(EntityKind::Ailment, "$.protection.skills", skill.id)? {
            if let Some(ailment) = Ailment::as_record_mut(&mut owner) {
                remove_id(&mut ailment.protection.skills, skill.id);
            }
            repo.save(&owner)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{delete_entity, update_entity};
    use crate::entity::{Ailment, Armor, ArmorSet, EntityKind, Skill, SkillRank};
    use crate::repository::{EntityRepository, EntityRepositoryExt};
    use serde_json::json;

    fn attack_boost(db: &crate::sqlite::SqliteDb) -> Skill {
        let record = create(
            db,
            EntityKind::Skill,
            json!({
                "name": "Attack Boost",
                "description": "Increases attack power.",
                "ranks": [
                    {"level": 2, "description": "Attack +6", "modifiers": {"attack": 6}},
                    {"level": 1, "description": "Attack +3", "modifiers": {"attack": 3}}
                ]
            }),
        );
        db.require(record.id()).unwrap()
    }

    #[test]
    fn test_create_writes_ranks_in_level_order() {
        let db = setup_db();
        let skill = attack_boost(&db);
        assert_eq!(skill.ranks.len(), 2);

        let first: SkillRank = db.require(skill.ranks[0]).unwrap();
        assert_eq!(first.level, 1);
        assert_eq!(first.skill, skill.id);
        assert_eq!(first.slug, "attack-boost-rank-1");
        assert_eq!(first.modifiers["attack"], json!(3));
    }

    #[test]
    fn test_ranks_matched_by_level() {
        let db = setup_db();
        let skill = attack_boost(&db);
        let level_two = skill.ranks[1];

        update_entity(
            &db,
            EntityKind::Skill,
            skill.id,
            &payload(json!({"ranks": [{"level": 2}, {"level": 3, "description": "Attack +9"}]})),
        )
        .unwrap();

        let skill: Skill = db.require(skill.id).unwrap();
        assert_eq!(skill.ranks.len(), 2);
        assert_eq!(skill.ranks[0], level_two);

        let kept: SkillRank = db.require(level_two).unwrap();
        assert_eq!(kept.description, "Attack +6");
        assert_eq!(db.count(EntityKind::SkillRank).unwrap(), 2);
    }

    #[test]
    fn test_rename_reslugs_ranks() {
        let db = setup_db();
        let skill = attack_boost(&db);

        update_entity(
            &db,
            EntityKind::Skill,
            skill.id,
            &payload(json!({"name": "Offensive Guard"})),
        )
        .unwrap();

        let rank: SkillRank = db.require(skill.ranks[0]).unwrap();
        assert_eq!(rank.slug, "offensive-guard-rank-1");
    }

    #[test]
    fn test_delete_removes_ranks_and_references() {
        let db = setup_db();
        let skill = attack_boost(&db);
        let armor = create(
            &db,
            EntityKind::Armor,
            json!({"name": "Bone Helm", "type": "head", "rank": "low", "rarity": 1, "skills": [skill.ranks[0]]}),
        );
        let set = create(
            &db,
            EntityKind::ArmorSet,
            json!({"name": "Bone", "rank": "low", "bonus": {"name": "Bone Will", "ranks": [{"pieces": 2, "skill": skill.ranks[1]}]}}),
        );
        let ailment = create(
            &db,
            EntityKind::Ailment,
            json!({"name": "Poison", "description": "x", "protection": {"skills": [skill.id]}}),
        );

        delete_entity(&db, EntityKind::Skill, skill.id).unwrap();

        assert_eq!(db.count(EntityKind::SkillRank).unwrap(), 0);
        let armor: Armor = db.require(armor.id()).unwrap();
        assert!(armor.skills.is_empty());
        let set: ArmorSet = db.require(set.id()).unwrap();
        assert!(set.bonus.unwrap().ranks.is_empty());
        let ailment: Ailment = db.require(ailment.id()).unwrap();
        assert!(ailment.protection.skills.is_empty());
    }
}
