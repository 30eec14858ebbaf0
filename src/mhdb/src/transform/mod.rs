//! Create/update/delete logic per entity type.
//!
//! A [`Transformer`] validates payloads, applies them to a [`Record`] and
//! scrubs reverse references before a delete. The workflow functions
//! ([`create_entity`], [`update_entity`], [`delete_entity`]) run a transformer
//! and persist the result; each call commits as one unit or not at all.

mod ailment;
mod armor;
mod armor_set;
mod charm;
mod decoration;
mod item;
mod location;
mod monster;
mod motion_value;
pub mod payload;
mod skill;
mod weapon;

pub use ailment::AilmentTransformer;
pub use armor::ArmorTransformer;
pub use armor_set::ArmorSetTransformer;
pub use charm::CharmTransformer;
pub use decoration::DecorationTransformer;
pub use item::ItemTransformer;
pub use location::LocationTransformer;
pub use monster::MonsterTransformer;
pub use motion_value::MotionValueTransformer;
pub use payload::{Patch, Payload};
pub use skill::SkillTransformer;
pub use weapon::WeaponTransformer;

use std::collections::HashSet;

use crate::entity::{CraftingCost, Entity, EntityId, EntityKind, Record};
use crate::repository::{EntityRepository, RepoError};

/// Error type for transformer operations
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("Subject not supported: expected {expected}, got {actual}")]
    SubjectNotSupported {
        expected: EntityKind,
        actual: EntityKind,
    },

    #[error("No {kind} found for {field}: {id}")]
    Reference {
        field: String,
        kind: EntityKind,
        id: EntityId,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("{0} cannot be edited directly")]
    Unsupported(EntityKind),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Result type for transformer operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Create/update/delete logic for one entity type
pub trait Transformer: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Check required fields and build an unsaved entity from them
    fn construct(&self, payload: &Payload) -> TransformResult<Record>;

    /// Apply every key present in `payload`
    fn update(
        &self,
        repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()>;

    /// Detach `record` from every entity that references it. The row itself
    /// is removed by [`delete_entity`].
    fn delete(&self, repo: &dyn EntityRepository, record: &Record) -> TransformResult<()>;

    /// Sync rows owned by or pointing back at a saved record. Returns true
    /// when `record` itself changed and must be saved again.
    fn persist_owned(
        &self,
        _repo: &dyn EntityRepository,
        _record: &mut Record,
        _payload: &Payload,
    ) -> TransformResult<bool> {
        Ok(false)
    }

    /// Build a new entity: validate, construct, then apply the same payload
    fn create(&self, repo: &dyn EntityRepository, payload: &Payload) -> TransformResult<Record> {
        let mut record = self.construct(payload)?;
        self.update(repo, &mut record, payload)?;
        Ok(record)
    }
}

/// Look up the transformer for an editable kind
pub fn transformer_for(kind: EntityKind) -> Option<&'static dyn Transformer> {
    match kind {
        EntityKind::Ailment => Some(&AilmentTransformer),
        EntityKind::Armor => Some(&ArmorTransformer),
        EntityKind::ArmorSet => Some(&ArmorSetTransformer),
        EntityKind::Charm => Some(&CharmTransformer),
        EntityKind::Decoration => Some(&DecorationTransformer),
        EntityKind::Item => Some(&ItemTransformer),
        EntityKind::Location => Some(&LocationTransformer),
        EntityKind::Monster => Some(&MonsterTransformer),
        EntityKind::MotionValue => Some(&MotionValueTransformer),
        EntityKind::Skill => Some(&SkillTransformer),
        EntityKind::Weapon => Some(&WeaponTransformer),
        EntityKind::SkillRank => None,
    }
}

fn require_transformer(kind: EntityKind) -> TransformResult<&'static dyn Transformer> {
    transformer_for(kind).ok_or(TransformError::Unsupported(kind))
}

/// Run `work` as one unit; any error rolls back every write it made
fn atomically<T>(
    repo: &dyn EntityRepository,
    work: impl FnOnce() -> TransformResult<T>,
) -> TransformResult<T> {
    repo.begin()?;
    match work() {
        Ok(value) => {
            repo.commit()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = repo.rollback() {
                tracing::warn!(error = %rollback, "rollback failed");
            }
            Err(e)
        }
    }
}

/// Create and insert a new entity
pub fn create_entity(
    repo: &dyn EntityRepository,
    kind: EntityKind,
    payload: &Payload,
) -> TransformResult<Record> {
    let transformer = require_transformer(kind)?;
    let mut record = transformer.create(repo, payload)?;

    atomically(repo, || {
        repo.insert(&mut record)?;
        if transformer.persist_owned(repo, &mut record, payload)? {
            repo.save(&record)?;
        }
        Ok(())
    })?;

    tracing::info!(kind = %kind, id = record.id(), "created");
    Ok(record)
}

/// Apply a partial update to an existing entity
pub fn update_entity(
    repo: &dyn EntityRepository,
    kind: EntityKind,
    id: EntityId,
    payload: &Payload,
) -> TransformResult<Record> {
    let transformer = require_transformer(kind)?;
    let mut record = repo.get(kind, id)?.ok_or(RepoError::NotFound { kind, id })?;

    transformer.update(repo, &mut record, payload)?;
    atomically(repo, || {
        transformer.persist_owned(repo, &mut record, payload)?;
        repo.save(&record)?;
        Ok(())
    })?;

    tracing::info!(kind = %kind, id, "updated");
    Ok(record)
}

/// Scrub references to an entity, then delete it
pub fn delete_entity(
    repo: &dyn EntityRepository,
    kind: EntityKind,
    id: EntityId,
) -> TransformResult<()> {
    let transformer = require_transformer(kind)?;
    let record = repo.get(kind, id)?.ok_or(RepoError::NotFound { kind, id })?;

    atomically(repo, || {
        transformer.delete(repo, &record)?;
        repo.delete(kind, id)?;
        Ok(())
    })?;

    tracing::info!(kind = %kind, id, "deleted");
    Ok(())
}

/// Borrow the expected variant out of a record
pub(crate) fn subject_mut<E: Entity>(record: &mut Record) -> TransformResult<&mut E> {
    let actual = record.kind();
    E::as_record_mut(record).ok_or(TransformError::SubjectNotSupported {
        expected: E::KIND,
        actual,
    })
}

pub(crate) fn subject_ref<E: Entity>(record: &Record) -> TransformResult<&E> {
    E::as_record_ref(record).ok_or(TransformError::SubjectNotSupported {
        expected: E::KIND,
        actual: record.kind(),
    })
}

/// Resolve an ordered ID list against `kind`.
///
/// Duplicates are dropped (first occurrence wins) and the caller's order is
/// kept. The first ID with no matching row fails with a reference error.
pub fn populate_from_ids(
    repo: &dyn EntityRepository,
    field: &str,
    kind: EntityKind,
    ids: &[EntityId],
) -> TransformResult<Vec<EntityId>> {
    let mut seen = HashSet::new();
    let wanted: Vec<EntityId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    let found: HashSet<EntityId> = repo
        .list_by_ids(kind, &wanted)?
        .iter()
        .map(Record::id)
        .collect();

    if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
        return Err(TransformError::Reference {
            field: field.to_string(),
            kind,
            id: *missing,
        });
    }

    Ok(wanted)
}

/// Check a single reference
pub fn resolve_id(
    repo: &dyn EntityRepository,
    field: &str,
    kind: EntityKind,
    id: EntityId,
) -> TransformResult<EntityId> {
    if repo.exists(kind, id)? {
        Ok(id)
    } else {
        Err(TransformError::Reference {
            field: field.to_string(),
            kind,
            id,
        })
    }
}

/// Build a crafting cost list from `[{item, quantity}]` payloads.
///
/// A repeated item keeps its first position and takes the last quantity.
pub fn populate_costs(
    repo: &dyn EntityRepository,
    field: &str,
    entries: &[Payload],
) -> TransformResult<Vec<CraftingCost>> {
    let mut costs: Vec<CraftingCost> = Vec::with_capacity(entries.len());

    for entry in entries {
        entry.require(&["item", "quantity"])?;
        let item = entry.value::<EntityId>("item")?.unwrap_or_default();
        let quantity = entry.value::<u32>("quantity")?.unwrap_or_default();

        match costs.iter_mut().find(|cost| cost.item == item) {
            Some(existing) => existing.quantity = quantity,
            None => costs.push(CraftingCost { item, quantity }),
        }
    }

    let items: Vec<EntityId> = costs.iter().map(|cost| cost.item).collect();
    populate_from_ids(repo, field, EntityKind::Item, &items)?;

    Ok(costs)
}

/// Remove a skill rank ID from every entity that can reference one
pub(crate) fn scrub_skill_rank(repo: &dyn EntityRepository, rank: EntityId) -> TransformResult<()> {
    use crate::entity::common::remove_id;
    use crate::entity::{Armor, ArmorSet, Charm, Decoration};
    use crate::repository::{EntityFilter, EntityRepositoryExt};

    for mut record in repo.find_referencing(EntityKind::Armor, "$.skills", rank)? {
        if let Some(armor) = Armor::as_record_mut(&mut record) {
            remove_id(&mut armor.skills, rank);
        }
        repo.save(&record)?;
    }

    for mut record in repo.find_referencing(EntityKind::Decoration, "$.skills", rank)? {
        if let Some(decoration) = Decoration::as_record_mut(&mut record) {
            remove_id(&mut decoration.skills, rank);
        }
        repo.save(&record)?;
    }

    for mut charm in repo.all::<Charm>()? {
        let mut changed = false;
        for charm_rank in &mut charm.ranks {
            changed |= remove_id(&mut charm_rank.skills, rank);
        }
        if changed {
            repo.save(&charm.into_record())?;
        }
    }

    for record in repo.list(EntityKind::ArmorSet, &EntityFilter::default())? {
        let Some(mut set) = ArmorSet::from_record(record) else {
            continue;
        };
        let Some(bonus) = set.bonus.as_mut() else {
            continue;
        };
        let before = bonus.ranks.len();
        bonus.ranks.retain(|bonus_rank| bonus_rank.skill != rank);
        if bonus.ranks.len() != before {
            repo.save(&set.into_record())?;
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::entity::{EntityKind, Record};
    use crate::repository::EntityRepository;
    use crate::sqlite::SqliteDb;
    use crate::transform::{create_entity, Payload};
    use serde_json::Value;

    pub fn setup_db() -> SqliteDb {
        let db = SqliteDb::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    pub fn payload(value: Value) -> Payload {
        Payload::try_from(value).unwrap()
    }

    pub fn create(db: &SqliteDb, kind: EntityKind, value: Value) -> Record {
        create_entity(db, kind, &payload(value)).unwrap()
    }
}
