use super::{
    populate_from_ids, resolve_id, subject_mut, subject_ref, Patch, Payload, TransformResult,
    Transformer,
};
use crate::entity::common::remove_id;
use crate::entity::{Armor, ArmorSet, ArmorSetBonusRank, Entity, EntityId, EntityKind, Record};
use crate::game::Rank;
use crate::repository::{EntityFilter, EntityRepository};

pub struct ArmorSetTransformer;

/// Every armor piece whose `armorSet` points at `set`
fn pieces_pointing_at(repo: &dyn EntityRepository, set: EntityId) -> TransformResult<Vec<Armor>> {
    let filter = EntityFilter::new().with("armorSet", set);
    Ok(repo
        .list(EntityKind::Armor, &filter)?
        .into_iter()
        .filter_map(Armor::from_record)
        .collect())
}

/// Remove `piece` from the `pieces` of every set other than `keep`
pub(crate) fn release_piece(
    repo: &dyn EntityRepository,
    piece: EntityId,
    keep: EntityId,
) -> TransformResult<()> {
    for mut owner in repo.find_referencing(EntityKind::ArmorSet, "$.pieces", piece)? {
        if owner.id() == keep {
            continue;
        }
        if let Some(other) = ArmorSet::as_record_mut(&mut owner) {
            remove_id(&mut other.pieces, piece);
        }
        repo.save(&owner)?;
    }
    Ok(())
}

impl Transformer for ArmorSetTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::ArmorSet
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name", "rank"])?;

        let set = ArmorSet::new(
            payload.string("name")?.unwrap_or_default(),
            payload.parsed::<Rank>("rank")?.unwrap_or(Rank::Low),
        );
        Ok(set.into_record())
    }

    fn update(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let set = subject_mut::<ArmorSet>(record)?;

        if let Some(name) = payload.string("name")? {
            set.name = name;
        }

        if let Some(rank) = payload.parsed::<Rank>("rank")? {
            set.rank = rank;
        }

        if let Some(pieces) = payload.ids("pieces")? {
            set.pieces = populate_from_ids(repo, "pieces", EntityKind::Armor, &pieces)?;
        }

        match payload.nested("bonus")? {
            Patch::Set(bonus) => {
                let target = set.bonus.get_or_insert_with(Default::default);

                if let Some(name) = bonus.string("name")? {
                    target.name = name;
                }

                if let Some(ranks) = bonus.list("ranks")? {
                    let mut resolved = Vec::with_capacity(ranks.len());
                    for rank in &ranks {
                        rank.require(&["pieces", "skill"])?;
                        let skill = rank.value::<EntityId>("skill")?.unwrap_or_default();
                        resolved.push(ArmorSetBonusRank {
                            pieces: rank.value("pieces")?.unwrap_or_default(),
                            skill: resolve_id(
                                repo,
                                &rank.path("skill"),
                                EntityKind::SkillRank,
                                skill,
                            )?,
                        });
                    }
                    resolved.sort_by_key(|rank| rank.pieces);
                    target.ranks = resolved;
                }
            }
            Patch::Clear => set.bonus = None,
            Patch::Absent => {}
        }

        Ok(())
    }

    /// Point listed pieces at this set, detach pieces no longer listed, and
    /// take claimed pieces out of any other set's list
    fn persist_owned(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<bool> {
        if !payload.has("pieces") {
            return Ok(false);
        }

        let set = subject_ref::<ArmorSet>(record)?;

        for mut armor in pieces_pointing_at(repo, set.id)? {
            if !set.pieces.contains(&armor.id) {
                armor.armor_set = None;
                repo.save(&armor.into_record())?;
            }
        }

        for piece in &set.pieces {
            release_piece(repo, *piece, set.id)?;
        }

        for mut piece in repo.list_by_ids(EntityKind::Armor, &set.pieces)? {
            if let Some(armor) = Armor::as_record_mut(&mut piece) {
                if armor.armor_set == Some(set.id) {
                    continue;
                }
                armor.armor_set = Some(set.id);
            }
            repo.save(&piece)?;
        }

        Ok(false)
    }

    fn delete(&self, repo: &dyn EntityRepository, record: &Record) -> TransformResult<()> {
        let set = subject_ref::<ArmorSet>(record)?;

        for mut armor in pieces_pointing_at(repo, set.id)? {
            armor.armor_set = None;
            repo.save(&armor.into_record())?;
        }

        Ok(())
    }
}
