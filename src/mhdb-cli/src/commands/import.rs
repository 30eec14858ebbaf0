//! Scraped weapon import

use anyhow::{Context, Result};
use std::path::Path;

use mhdb::entity::EntityKind;
use mhdb::scrape::{default_interpreters, CapturedWeapon};
use mhdb::{create_entity, update_entity, EntityFilter, EntityRepository, Record, SqliteDb};

/// Counts from one import
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

/// Run captured weapons through the interpreters and the Weapon transformer,
/// updating weapons whose name already exists
pub fn import_weapons(repo: &dyn EntityRepository, weapons: &[CapturedWeapon]) -> Result<ImportSummary> {
    let interpreters = default_interpreters();
    let mut summary = ImportSummary::default();

    for captured in weapons {
        let data = captured
            .interpret(&interpreters)
            .with_context(|| format!("Failed to interpret {}", captured.name))?;

        let filter = EntityFilter::new().with("name", data.name.clone()).limit(1);
        let existing = repo.list(EntityKind::Weapon, &filter)?;
        let name = data.name.clone();
        let payload = data.into_payload();

        let record: Record = match existing.first() {
            Some(weapon) => {
                summary.updated += 1;
                update_entity(repo, EntityKind::Weapon, weapon.id(), &payload)
            }
            None => {
                summary.created += 1;
                create_entity(repo, EntityKind::Weapon, &payload)
            }
        }
        .with_context(|| format!("Failed to save {}", name))?;

        tracing::debug!("Imported weapon {} ({})", record.id(), name);
    }

    Ok(summary)
}

/// Handle `import-weapons`
pub fn handle(db: &Path, input: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let weapons: Vec<CapturedWeapon> =
        serde_json::from_str(&contents).context("Failed to parse captured weapons")?;

    let sdb = SqliteDb::open(db)
        .with_context(|| format!("Failed to open database {}", db.display()))?;
    sdb.init()?;

    let summary = import_weapons(&sdb, &weapons)?;
    println!(
        "Imported {} weapon(s): {} created, {} updated",
        weapons.len(),
        summary.created,
        summary.updated
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mhdb::entity::Weapon;
    use mhdb::EntityRepositoryExt;
    use serde_json::json;

    fn captured(value: serde_json::Value) -> Vec<CapturedWeapon> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_import_creates_then_updates() {
        let db = SqliteDb::open_in_memory().unwrap();
        db.init().unwrap();

        let first = captured(json!([{
            "name": "Hidden Gambit", "type": "switch-axe", "rarity": 8,
            "data": [{"label": "Phial", "lead": "Exhaust Phial"}]
        }]));
        assert_eq!(
            import_weapons(&db, &first).unwrap(),
            ImportSummary { created: 1, updated: 0 }
        );

        let second = captured(json!([{
            "name": "Hidden Gambit", "type": "switch-axe", "rarity": 8,
            "data": [{"label": "Affinity", "lead": "-10%"}]
        }]));
        assert_eq!(
            import_weapons(&db, &second).unwrap(),
            ImportSummary { created: 0, updated: 1 }
        );

        let weapons: Vec<Weapon> = db.all().unwrap();
        assert_eq!(weapons.len(), 1);
        assert_eq!(weapons[0].attributes["affinity"], -10);
    }
}
