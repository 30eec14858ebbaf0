//! Game Reference Database Library
//!
//! Entity model, SQLite store, create/update/delete transformers,
//! projection-aware response documents and the static JSON export.
//!
//! # Features
//!
//! - `http-assets` (default) - Fetch referenced assets over HTTP during export
//!
//! # Example
//!
//! ```no_run
//! use mhdb::{create_entity, EntityKind, EntityRepository, Payload, SqliteDb};
//! use serde_json::json;
//!
//! let db = SqliteDb::open("mhdb.db").unwrap();
//! db.init().unwrap();
//!
//! let payload = Payload::try_from(json!({"name": "Potion", "rarity": 1})).unwrap();
//! let item = create_entity(&db, EntityKind::Item, &payload).unwrap();
//! println!("created item {}", item.id());
//! ```

pub mod entity;
pub mod export;
pub mod game;
pub mod normalize;
pub mod projection;
pub mod repository;
pub mod scrape;
pub mod slug;
pub mod sqlite;
pub mod transform;

pub use entity::{Entity, EntityId, EntityKind, Record, UnknownEntity};
pub use export::{
    ExportError, ExportManager, ExportOptions, ExportPipeline, ExportResult, ExportSummary,
    Target,
};
pub use normalize::Normalizer;
pub use projection::{Projection, ProjectionError};
pub use repository::{
    DbStats, EntityFilter, EntityRepository, EntityRepositoryExt, RepoError, RepoResult,
};
pub use sqlite::{SqliteDb, DEFAULT_DB_PATH};
pub use transform::{
    create_entity, delete_entity, update_entity, Payload, TransformError, TransformResult,
};
