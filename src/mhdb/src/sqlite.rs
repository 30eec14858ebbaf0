//! SQLite implementation using rusqlite (synchronous).

use crate::entity::{EntityId, EntityKind, Record};
use crate::repository::*;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Default database location
pub const DEFAULT_DB_PATH: &str = "share/mhdb.db";

/// SQLite-backed entity store
pub struct SqliteDb {
    conn: Connection,
}

fn db_err(e: rusqlite::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

/// Bind a JSON value the way `json_extract` reports it back
fn filter_param(value: &serde_json::Value) -> Box<dyn rusqlite::ToSql> {
    use serde_json::Value;
    match value {
        Value::String(s) => Box::new(s.clone()),
        Value::Bool(b) => Box::new(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Box::new(i),
            None => Box::new(n.as_f64().unwrap_or_default()),
        },
        other => Box::new(other.to_string()),
    }
}

/// Build the WHERE/LIMIT tail and its parameters for a filter
fn build_filter_clause(
    filter: &EntityFilter,
) -> RepoResult<(String, Vec<Box<dyn rusqlite::ToSql>>)> {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    for (field, value) in &filter.conditions {
        if !is_valid_field_path(field) {
            return Err(RepoError::InvalidFilter(field.clone()));
        }
        if value.is_null() {
            conditions.push(format!("json_extract(body, '$.{}') IS NULL", field));
        } else {
            params.push(filter_param(value));
            conditions.push(format!(
                "json_extract(body, '$.{}') = ?{}",
                field,
                params.len()
            ));
        }
    }

    let mut sql = String::new();
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY id");

    match (filter.limit, filter.offset) {
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
        (None, None) => {}
    }

    Ok((sql, params))
}

impl SqliteDb {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path.as_ref())?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Decode `(id, body)` rows into records
    fn decode_rows(kind: EntityKind, rows: Vec<(EntityId, String)>) -> RepoResult<Vec<Record>> {
        rows.into_iter()
            .map(|(id, body)| Ok(Record::from_document(kind, id, &body)?))
            .collect()
    }

    fn query_records(
        &self,
        kind: EntityKind,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> RepoResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(db_err)?
            .collect::<Result<Vec<(EntityId, String)>, _>>()
            .map_err(db_err)?;
        Self::decode_rows(kind, rows)
    }
}

impl SqliteDb {
    /// Check if a migration has been applied
    fn is_migration_applied(&self, version: &str) -> RepoResult<bool> {
        let result: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM schema_migrations WHERE version = ?1",
                params![version],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        Ok(result.is_some())
    }

    /// Mark a migration as applied
    fn mark_migration_applied(&self, version: &str) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO schema_migrations (version) VALUES (?1)",
                params![version],
            )
            .map_err(db_err)?;
        Ok(())
    }

    /// Run pending migrations
    fn run_migrations(&self) -> RepoResult<()> {
        // Migration 0001: one document table per entity kind
        if !self.is_migration_applied("0001_entity_tables")? {
            let mut batch = String::new();
            for kind in EntityKind::ALL {
                batch.push_str(&format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        body TEXT NOT NULL
                    );\n",
                    kind.table()
                ));
            }
            self.conn.execute_batch(&batch).map_err(db_err)?;
            self.mark_migration_applied("0001_entity_tables")?;
            tracing::info!("SQLite: Applied migration 0001_entity_tables");
        }

        // Migration 0002: lookup indexes used by listing filters and rank resolution
        if !self.is_migration_applied("0002_document_indexes")? {
            self.conn
                .execute_batch(
                    r#"
                    CREATE INDEX IF NOT EXISTS idx_skill_ranks_skill
                        ON skill_ranks(json_extract(body, '$.skill'));
                    CREATE INDEX IF NOT EXISTS idx_weapons_type
                        ON weapons(json_extract(body, '$.type'));
                    CREATE INDEX IF NOT EXISTS idx_motion_values_weapon_type
                        ON motion_values(json_extract(body, '$.weaponType'));
                    "#,
                )
                .map_err(db_err)?;
            self.mark_migration_applied("0002_document_indexes")?;
            tracing::info!("SQLite: Applied migration 0002_document_indexes");
        }

        Ok(())
    }
}

impl EntityRepository for SqliteDb {
    fn init(&self) -> RepoResult<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS schema_migrations (
                    version TEXT PRIMARY KEY NOT NULL,
                    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )
            .map_err(db_err)?;

        self.run_migrations()
    }

    fn insert(&self, record: &mut Record) -> RepoResult<EntityId> {
        let body = record.to_document()?;
        self.conn
            .execute(
                &format!("INSERT INTO {} (body) VALUES (?1)", record.kind().table()),
                params![body],
            )
            .map_err(db_err)?;
        let id = self.conn.last_insert_rowid();
        record.set_id(id);
        tracing::debug!(kind = %record.kind(), id, "inserted");
        Ok(id)
    }

    fn save(&self, record: &Record) -> RepoResult<()> {
        let kind = record.kind();
        let body = record.to_document()?;
        let rows = self
            .conn
            .execute(
                &format!("UPDATE {} SET body = ?1 WHERE id = ?2", kind.table()),
                params![body, record.id()],
            )
            .map_err(db_err)?;
        if rows == 0 {
            return Err(RepoError::NotFound {
                kind,
                id: record.id(),
            });
        }
        Ok(())
    }

    fn get(&self, kind: EntityKind, id: EntityId) -> RepoResult<Option<Record>> {
        let body: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT body FROM {} WHERE id = ?1", kind.table()),
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        match body {
            Some(body) => Ok(Some(Record::from_document(kind, id, &body)?)),
            None => Ok(None),
        }
    }

    fn exists(&self, kind: EntityKind, id: EntityId) -> RepoResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", kind.table()),
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        Ok(found.is_some())
    }

    fn list(&self, kind: EntityKind, filter: &EntityFilter) -> RepoResult<Vec<Record>> {
        let (tail, params_vec) = build_filter_clause(filter)?;
        let sql = format!("SELECT id, body FROM {}{}", kind.table(), tail);
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        self.query_records(kind, &sql, params_refs.as_slice())
    }

    fn list_by_ids(&self, kind: EntityKind, ids: &[EntityId]) -> RepoResult<Vec<Record>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        // Build placeholders for IN clause
        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT id, body FROM {} WHERE id IN ({}) ORDER BY id",
            kind.table(),
            placeholders.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<(EntityId, String)>, _>>()
            .map_err(db_err)?;
        Self::decode_rows(kind, rows)
    }

    fn count(&self, kind: EntityKind) -> RepoResult<i64> {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", kind.table()), [], |row| {
                row.get(0)
            })
            .map_err(db_err)
    }

    fn delete(&self, kind: EntityKind, id: EntityId) -> RepoResult<bool> {
        let rows = self
            .conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
                params![id],
            )
            .map_err(db_err)?;
        Ok(rows > 0)
    }

    fn find_referencing(
        &self,
        owner: EntityKind,
        json_path: &str,
        id: EntityId,
    ) -> RepoResult<Vec<Record>> {
        let valid = json_path
            .strip_prefix("$.")
            .is_some_and(is_valid_field_path);
        if !valid {
            return Err(RepoError::InvalidFilter(json_path.to_string()));
        }

        let table = owner.table();
        let sql = format!(
            "SELECT id, body FROM {table}
             WHERE EXISTS (
                 SELECT 1 FROM json_each({table}.body, ?1) AS refs WHERE refs.value = ?2
             )
             ORDER BY id"
        );
        self.query_records(owner, &sql, params![json_path, id])
    }

    // Savepoints nest and open a transaction when none is active
    fn begin(&self) -> RepoResult<()> {
        self.conn.execute_batch("SAVEPOINT mutation").map_err(db_err)
    }

    fn commit(&self) -> RepoResult<()> {
        self.conn.execute_batch("RELEASE mutation").map_err(db_err)
    }

    fn rollback(&self) -> RepoResult<()> {
        self.conn
            .execute_batch("ROLLBACK TO mutation; RELEASE mutation")
            .map_err(db_err)
    }

    fn stats(&self) -> RepoResult<DbStats> {
        let counts = EntityKind::ALL
            .iter()
            .map(|kind| Ok((*kind, self.count(*kind)?)))
            .collect::<RepoResult<Vec<_>>>()?;
        Ok(DbStats { counts })
    }
}
