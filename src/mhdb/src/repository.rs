//! Repository trait for entity storage.
//!
//! Entities are stored as JSON documents, one table per kind. The trait
//! is synchronous; the API server serialises access behind a mutex.

use crate::entity::{Entity, EntityId, EntityKind, Record};
use serde::{Deserialize, Serialize};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid filter field: {0}")]
    InvalidFilter(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Equality filter over document fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityFilter {
    /// (dotted field path, expected value)
    pub conditions: Vec<(String, serde_json::Value)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl EntityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Check a document field path before it is interpolated into a JSON path
pub fn is_valid_field_path(field: &str) -> bool {
    let mut chars = field.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Row counts per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbStats {
    pub counts: Vec<(EntityKind, i64)>,
}

impl DbStats {
    pub fn total(&self) -> i64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn count(&self, kind: EntityKind) -> i64 {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Trait for entity storage (synchronous)
pub trait EntityRepository {
    /// Initialize the database schema
    fn init(&self) -> RepoResult<()>;

    // === CRUD ===

    /// Insert a new record, assigning and returning its ID
    fn insert(&self, record: &mut Record) -> RepoResult<EntityId>;

    /// Overwrite an existing record's document
    fn save(&self, record: &Record) -> RepoResult<()>;

    /// Get a record by kind and ID
    fn get(&self, kind: EntityKind, id: EntityId) -> RepoResult<Option<Record>>;

    /// Check whether a row exists
    fn exists(&self, kind: EntityKind, id: EntityId) -> RepoResult<bool>;

    /// List records ordered by ascending ID
    fn list(&self, kind: EntityKind, filter: &EntityFilter) -> RepoResult<Vec<Record>>;

    /// List the records whose ID is in `ids`, ordered by ascending ID
    fn list_by_ids(&self, kind: EntityKind, ids: &[EntityId]) -> RepoResult<Vec<Record>>;

    /// Count rows of a kind
    fn count(&self, kind: EntityKind) -> RepoResult<i64>;

    /// Delete a row, returning whether it existed
    fn delete(&self, kind: EntityKind, id: EntityId) -> RepoResult<bool>;

    // === Relationships ===

    /// Find every `owner` whose ID list at `json_path` contains `id`.
    ///
    /// `json_path` is a SQLite JSON path relative to the document root, for
    /// example `$.ailments` or `$.recovery.items`.
    fn find_referencing(
        &self,
        owner: EntityKind,
        json_path: &str,
        id: EntityId,
    ) -> RepoResult<Vec<Record>>;

    // === Transactions ===

    /// Open a unit of work. Units may nest.
    fn begin(&self) -> RepoResult<()>;

    /// Keep every write since the matching [`begin`](Self::begin)
    fn commit(&self) -> RepoResult<()>;

    /// Discard every write since the matching [`begin`](Self::begin)
    fn rollback(&self) -> RepoResult<()>;

    // === Statistics ===

    fn stats(&self) -> RepoResult<DbStats>;
}

/// Typed helpers over [`EntityRepository`]
pub trait EntityRepositoryExt: EntityRepository {
    /// Fetch a typed entity, `None` if absent
    fn find<E: Entity>(&self, id: EntityId) -> RepoResult<Option<E>> {
        Ok(self.get(E::KIND, id)?.and_then(E::from_record))
    }

    /// Fetch a typed entity, failing with `NotFound` if absent
    fn require<E: Entity>(&self, id: EntityId) -> RepoResult<E> {
        self.find(id)?.ok_or(RepoError::NotFound { kind: E::KIND, id })
    }

    /// Fetch every entity of a type
    fn all<E: Entity>(&self) -> RepoResult<Vec<E>> {
        Ok(self
            .list(E::KIND, &EntityFilter::default())?
            .into_iter()
            .filter_map(E::from_record)
            .collect())
    }
}

impl<T: EntityRepository + ?Sized> EntityRepositoryExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_validation() {
        assert!(is_valid_field_path("name"));
        assert!(is_valid_field_path("crafting.craftable"));
        assert!(is_valid_field_path("zone_count"));
        assert!(!is_valid_field_path(""));
        assert!(!is_valid_field_path("1name"));
        assert!(!is_valid_field_path("name') OR 1=1 --"));
        assert!(!is_valid_field_path("$.name"));
    }

    #[test]
    fn test_filter_builder() {
        let filter = EntityFilter::new().with("rank", "high").limit(5).offset(10);
        assert_eq!(filter.conditions.len(), 1);
        assert_eq!(filter.limit, Some(5));
        assert_eq!(filter.offset, Some(10));
    }

    #[test]
    fn test_stats_total() {
        let stats = DbStats {
            counts: vec![(EntityKind::Item, 3), (EntityKind::Weapon, 2)],
        };
        assert_eq!(stats.total(), 5);
        assert_eq!(stats.count(EntityKind::Weapon), 2);
        assert_eq!(stats.count(EntityKind::Armor), 0);
    }
}
