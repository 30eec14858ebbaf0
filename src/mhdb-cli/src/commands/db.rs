//! Database command handlers

use anyhow::{bail, Context, Result};
use std::path::Path;

use mhdb::{EntityKind, EntityRepository, Normalizer, Projection, SqliteDb};

use crate::cli::DbCommand;

fn open(db: &Path) -> Result<SqliteDb> {
    let sdb = SqliteDb::open(db)
        .with_context(|| format!("Failed to open database {}", db.display()))?;
    sdb.init()?;
    Ok(sdb)
}

pub fn dispatch(db: &Path, command: DbCommand) -> Result<()> {
    match command {
        DbCommand::Init => init(db),
        DbCommand::Stats => stats(db),
        DbCommand::Show {
            entity,
            id,
            projection,
        } => show(db, &entity, id, projection.as_deref()),
    }
}

/// Handle `db init`
pub fn init(db: &Path) -> Result<()> {
    if let Some(parent) = db.parent() {
        std::fs::create_dir_all(parent)?;
    }
    open(db)?;
    println!("Your database is ready at {}", db.display());
    Ok(())
}

/// Handle `db stats`
pub fn stats(db: &Path) -> Result<()> {
    let stats = open(db)?.stats()?;
    println!("Database Statistics");
    for (kind, count) in &stats.counts {
        println!("  {:<12} {}", format!("{}:", kind), count);
    }
    println!("  {:<12} {}", "Total:", stats.total());
    Ok(())
}

/// Handle `db show`
pub fn show(db: &Path, entity: &str, id: i64, projection: Option<&str>) -> Result<()> {
    let kind: EntityKind = entity.parse()?;
    let projection = match projection {
        Some(raw) => Projection::from_json(raw)?,
        None => Projection::all(),
    };

    let sdb = open(db)?;
    let Some(record) = sdb.get(kind, id)? else {
        bail!("{} {} not found", kind, id);
    };

    let document = Normalizer::new(&sdb, &projection).normalize(&record)?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
