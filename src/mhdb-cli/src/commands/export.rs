//! Export command handler

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mhdb::export::{
    is_non_empty_dir, ExportManager, ExportOptions, ExportPipeline, HttpFetcher, Target,
};
use mhdb::{EntityKind, EntityRepository, SqliteDb};

use crate::cli::ExportArgs;
use crate::config::Config;
use crate::progress::BarReporter;

/// Turn CLI arguments into pipeline options. Entity names and target
/// descriptors are validated here, before anything touches the disk.
pub fn build_options(root: PathBuf, args: &ExportArgs) -> Result<ExportOptions> {
    let entities = args
        .entities
        .iter()
        .map(|name| name.parse::<EntityKind>())
        .collect::<Result<Vec<_>, _>>()?;

    let targets = args
        .targets
        .iter()
        .map(|descriptor| Target::parse(descriptor))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExportOptions {
        root,
        entities,
        targets,
        journal_only: args.journal_only,
        skip_assets: args.skip_assets,
        no_clean: args.no_clean,
    })
}

/// Prompt user for confirmation
fn prompt_confirmation(root: &Path) -> Result<bool> {
    print!(
        "{} is not empty and its json/ and assets/ directories will be replaced. Continue? [y/N] ",
        root.display()
    );
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Strip trailing separators; `None` for an empty path or a filesystem root
fn export_root(path: &Path) -> Option<PathBuf> {
    let root: PathBuf = path.components().collect();
    root.parent().is_some().then_some(root)
}

/// Handle `export`
pub fn handle(database: &Path, config: &Config, args: ExportArgs) -> Result<()> {
    let configured = args.output_path.clone().or_else(|| config.export_path.clone());
    let root = match configured.as_deref().and_then(export_root) {
        Some(path) => path,
        None => {
            println!("Cannot export to an empty path or the filesystem root.");
            println!("Usage: mhdb export <OUTPUT_PATH>");
            println!("   or: mhdb configure --export-path <OUTPUT_PATH>");
            return Ok(());
        }
    };

    let options = build_options(root, &args)?;

    let confirm = options.should_clean() && !args.yes && is_non_empty_dir(&options.root)?;
    if confirm && !prompt_confirmation(&options.root)? {
        println!("Export cancelled");
        return Ok(());
    }

    let db = SqliteDb::open(database)
        .with_context(|| format!("Failed to open database {}", database.display()))?;
    db.init()?;

    let manager = ExportManager::new();
    let fetcher = HttpFetcher::new(config.asset_timeout());
    let mut progress = BarReporter::new();

    let summary = ExportPipeline::new(&db, &manager, &fetcher, &mut progress)
        .run(&options)
        .context("Export failed")?;

    println!("Export complete: {}", options.root.display());
    println!("  Documents:      {}", summary.documents);
    println!("  Journals:       {}", summary.journals);
    println!("  Assets fetched: {}", summary.assets_fetched);
    println!("  Assets skipped: {}", summary.assets_skipped);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(entities: &[&str], targets: &[&str]) -> ExportArgs {
        ExportArgs {
            entities: entities.iter().map(|s| s.to_string()).collect(),
            targets: targets.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_options() {
        let options = build_options(
            PathBuf::from("out"),
            &args(&["weapon", "ArmorSet"], &["Weapon:5", "Weapon:9"]),
        )
        .unwrap();
        assert_eq!(options.entities, vec![EntityKind::Weapon, EntityKind::ArmorSet]);
        assert_eq!(options.targets.len(), 2);
        assert!(!options.should_clean());
    }

    #[test]
    fn test_bad_descriptors_rejected() {
        assert!(build_options(PathBuf::from("out"), &args(&[], &["Weapon:five"])).is_err());
        assert!(build_options(PathBuf::from("out"), &args(&["Dragon"], &[])).is_err());
    }

    #[test]
    fn test_empty_path_returns_early() {
        let dir = tempfile::tempdir().unwrap();
        let database = dir.path().join("mhdb.db");
        handle(&database, &Config::default(), ExportArgs::default()).unwrap();
        assert!(!database.exists());
    }

    #[test]
    fn test_export_root() {
        assert_eq!(export_root(Path::new("out/")), Some(PathBuf::from("out")));
        assert_eq!(
            export_root(Path::new("/srv/mhdb//")),
            Some(PathBuf::from("/srv/mhdb"))
        );
        assert_eq!(export_root(Path::new("")), None);
        assert_eq!(export_root(Path::new("/")), None);
        assert_eq!(export_root(Path::new("///")), None);
    }

    #[test]
    fn test_filesystem_root_returns_early() {
        let dir = tempfile::tempdir().unwrap();
        let database = dir.path().join("mhdb.db");
        let args = ExportArgs {
            output_path: Some(PathBuf::from("/")),
            yes: true,
            ..Default::default()
        };
        handle(&database, &Config::default(), args).unwrap();
        assert!(!database.exists());
    }
}
