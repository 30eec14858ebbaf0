//! Writes exports to disk.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use super::{
    AssetFetcher, AssetRef, Export, ExportError, ExportHelper, ExportManager, ExportResult,
    ProgressReporter,
};
use crate::entity::{EntityId, EntityKind, Record};
use crate::repository::{EntityFilter, EntityRepository};

const JOURNAL_FILE: &str = ".journal.json";

/// A single row selected for export, written as `<Entity>:<id>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl Target {
    pub fn parse(descriptor: &str) -> ExportResult<Self> {
        let Some((kind, id)) = descriptor.split_once(':') else {
            return Err(ExportError::InvalidTarget(descriptor.to_string()));
        };

        let kind: EntityKind = kind
            .trim()
            .parse()
            .map_err(|_| ExportError::UnknownEntity(kind.trim().to_string()))?;

        let id: EntityId = id
            .trim()
            .parse()
            .map_err(|_| ExportError::InvalidTarget(descriptor.to_string()))?;

        if id <= 0 {
            return Err(ExportError::InvalidTarget(descriptor.to_string()));
        }

        Ok(Self { kind, id })
    }
}

impl FromStr for Target {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// What an export run does
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub root: PathBuf,
    /// Restrict to these kinds; empty means every exported kind
    pub entities: Vec<EntityKind>,
    pub targets: Vec<Target>,
    /// Compute and write journals only
    pub journal_only: bool,
    pub skip_assets: bool,
    pub no_clean: bool,
}

impl ExportOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn is_restricted(&self) -> bool {
        !self.entities.is_empty() || !self.targets.is_empty()
    }

    /// Whether previous `json/` and `assets/` output is deleted first
    pub fn should_clean(&self) -> bool {
        !self.is_restricted() && !self.journal_only && !self.skip_assets && !self.no_clean
    }

    /// Kinds visited by the run, in export order
    pub fn classes(&self) -> Vec<EntityKind> {
        if !self.is_restricted() {
            return EntityKind::EXPORTED.to_vec();
        }

        let mut classes: Vec<EntityKind> = self
            .entities
            .iter()
            .copied()
            .chain(self.targets.iter().map(|target| target.kind))
            .collect();
        classes.sort();
        classes.dedup();
        classes
    }

    fn target_ids(&self, kind: EntityKind) -> Vec<EntityId> {
        self.targets
            .iter()
            .filter(|target| target.kind == kind)
            .map(|target| target.id)
            .collect()
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub documents: usize,
    pub assets_fetched: usize,
    pub assets_skipped: usize,
    pub journals: usize,
}

/// Whether `path` is an existing directory with at least one entry
pub fn is_non_empty_dir(path: &Path) -> std::io::Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(path)?.next().is_some())
}

/// ID to path relative to the group's directory
type Journal = BTreeMap<EntityId, String>;

pub struct ExportPipeline<'a> {
    repo: &'a dyn EntityRepository,
    manager: &'a ExportManager,
    fetcher: &'a dyn AssetFetcher,
    progress: &'a mut dyn ProgressReporter,
}

impl<'a> ExportPipeline<'a> {
    pub fn new(
        repo: &'a dyn EntityRepository,
        manager: &'a ExportManager,
        fetcher: &'a dyn AssetFetcher,
        progress: &'a mut dyn ProgressReporter,
    ) -> Self {
        Self {
            repo,
            manager,
            fetcher,
            progress,
        }
    }

    pub fn run(&mut self, options: &ExportOptions) -> ExportResult<ExportSummary> {
        let classes = options.classes();
        if let Some(kind) = classes.iter().find(|kind| !self.manager.supports(**kind)) {
            return Err(ExportError::UnknownEntity(kind.name().to_string()));
        }

        let json_root = options.root.join("json");
        let asset_root = options.root.join("assets");

        if options.should_clean() {
            for dir in [&json_root, &asset_root] {
                if dir.exists() {
                    tracing::info!("Removing {}", dir.display());
                    fs::remove_dir_all(dir)?;
                }
            }
        }

        let helper = ExportHelper::new(self.repo);
        let mut summary = ExportSummary::default();
        let mut journals: BTreeMap<String, Journal> = BTreeMap::new();

        for kind in classes {
            let ids = options.target_ids(kind);
            let records = if ids.is_empty() {
                self.repo.list(kind, &EntityFilter::default())?
            } else {
                self.repo.list_by_ids(kind, &ids)?
            };

            tracing::info!("Exporting {} {} record(s)", records.len(), kind);
            self.progress.append(records.len() as u64);

            for record in &records {
                self.export_record(&helper, record, options, &mut journals, &mut summary)?;
                self.progress.advance();
            }
        }

        for (top, entries) in journals {
            write_journal(&json_root.join(&top), entries, !options.should_clean())?;
            summary.journals += 1;
        }

        self.progress.finish();
        tracing::info!(
            "Export complete: {} document(s), {} asset(s) fetched, {} skipped, {} journal(s)",
            summary.documents,
            summary.assets_fetched,
            summary.assets_skipped,
            summary.journals
        );

        Ok(summary)
    }

    fn export_record(
        &self,
        helper: &ExportHelper<'_>,
        record: &Record,
        options: &ExportOptions,
        journals: &mut BTreeMap<String, Journal>,
        summary: &mut ExportSummary,
    ) -> ExportResult<()> {
        let export = self
            .manager
            .export(helper, record)?
            .ok_or_else(|| ExportError::UnknownEntity(record.kind().name().to_string()))?;

        let (top, sub) = export.split_group().ok_or(ExportError::MissingGroup {
            kind: record.kind(),
            id: record.id(),
        })?;

        let file_name = format!("{}.json", record.id());
        let relative = if sub.is_empty() {
            file_name
        } else {
            format!("{}/{}", sub, file_name)
        };

        journals
            .entry(top.to_string())
            .or_default()
            .insert(record.id(), relative.clone());

        if options.journal_only {
            return Ok(());
        }

        let path = options.root.join("json").join(top).join(&relative);
        write_document(&path, &export)?;
        summary.documents += 1;

        if !options.skip_assets {
            for asset in &export.assets {
                if self.mirror_asset(&options.root.join("assets"), asset)? {
                    summary.assets_fetched += 1;
                } else {
                    summary.assets_skipped += 1;
                }
            }
        }

        Ok(())
    }

    /// Fetch an asset unless it is already on disk. Returns whether it was fetched.
    fn mirror_asset(&self, asset_root: &Path, asset: &AssetRef) -> ExportResult<bool> {
        let destination = asset_root.join(asset_path(&asset.uri)?);
        if destination.exists() {
            tracing::debug!("Asset exists, skipping: {}", destination.display());
            return Ok(false);
        }

        let bytes = self.fetcher.fetch(&asset.uri).map_err(|e| ExportError::Asset {
            uri: asset.uri.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&destination, bytes)?;
        tracing::debug!("Fetched {} -> {}", asset.uri, destination.display());

        Ok(true)
    }
}

/// Destination of an asset below the asset root: its URL path without the leading slash
fn asset_path(uri: &str) -> ExportResult<PathBuf> {
    let invalid = |reason: &str| ExportError::Asset {
        uri: uri.to_string(),
        reason: reason.to_string(),
    };

    let url = url::Url::parse(uri).map_err(|e| invalid(&e.to_string()))?;
    let relative = PathBuf::from(url.path().trim_start_matches('/'));

    if relative.as_os_str().is_empty() {
        return Err(invalid("URL has no path"));
    }
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return Err(invalid("path escapes the asset directory"));
    }

    Ok(relative)
}

fn write_document(path: &Path, export: &Export) -> ExportResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    export.data.serialize(&mut serializer)?;

    fs::write(path, bytes)?;
    Ok(())
}

fn write_journal(group_dir: &Path, mut entries: Journal, merge: bool) -> ExportResult<()> {
    let path = group_dir.join(JOURNAL_FILE);

    if merge && path.exists() {
        let existing: Journal = serde_json::from_slice(&fs::read(&path)?)?;
        for (id, relative) in existing {
            entries.entry(id).or_insert(relative);
        }
    }

    fs::create_dir_all(group_dir)?;
    fs::write(&path, serde_json::to_vec(&entries)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Exporter, FetchError, NoProgress};
    use crate::sqlite::SqliteDb;
    use crate::transform::test_support::*;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeFetcher {
        calls: RefCell<Vec<String>>,
    }

    impl AssetFetcher for FakeFetcher {
        fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.borrow_mut().push(uri.to_string());
            Ok(b"png".to_vec())
        }
    }

    fn run(db: &SqliteDb, fetcher: &FakeFetcher, options: &ExportOptions) -> ExportResult<ExportSummary> {
        let manager = ExportManager::new();
        let mut progress = NoProgress;
        ExportPipeline::new(db, &manager, fetcher, &mut progress).run(options)
    }

    fn weapon(db: &SqliteDb, name: &str) -> Record {
        create(
            db,
            EntityKind::Weapon,
            json!({"name": name, "type": "great-sword", "rarity": 1}),
        )
    }

    fn read_json(path: PathBuf) -> Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_target_parse() {
        assert_eq!(
            Target::parse("Weapon:5").unwrap(),
            Target {
                kind: EntityKind::Weapon,
                id: 5
            }
        );
        assert_eq!(Target::parse("armor-set:2").unwrap().kind, EntityKind::ArmorSet);

        for bad in ["Weapon", "Weapon:", "Weapon:abc", "Weapon:0", "Weapon:-3"] {
            assert!(
                matches!(Target::parse(bad), Err(ExportError::InvalidTarget(_))),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(
            Target::parse("Dragon:1"),
            Err(ExportError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_should_clean() {
        let options = ExportOptions::new("out");
        assert!(options.should_clean());
        assert_eq!(options.classes(), EntityKind::EXPORTED.to_vec());

        let mut restricted = ExportOptions::new("out");
        restricted.targets.push(Target::parse("Weapon:1").unwrap());
        assert!(!restricted.should_clean());
        assert_eq!(restricted.classes(), vec![EntityKind::Weapon]);

        let mut journal_only = ExportOptions::new("out");
        journal_only.journal_only = true;
        assert!(!journal_only.should_clean());
    }

    #[test]
    fn test_grouped_document_and_journal() {
        let db = setup_db();
        let record = weapon(&db, "Buster Sword I");
        let dir = tempfile::tempdir().unwrap();

        let mut options = ExportOptions::new(dir.path());
        options.skip_assets = true;
        let summary = run(&db, &FakeFetcher::default(), &options).unwrap();
        assert_eq!(summary.documents, 1);
        assert_eq!(summary.journals, 1);

        let id = record.id();
        let document = dir
            .path()
            .join(format!("json/weapons/great-sword/{}.json", id));
        let text = fs::read_to_string(&document).unwrap();
        assert!(text.contains("\n\t\"name\": \"Buster Sword I\""));

        let journal = read_json(dir.path().join("json/weapons/.journal.json"));
        assert_eq!(journal, json!({ id.to_string(): format!("great-sword/{}.json", id) }));
    }

    #[test]
    fn test_export_is_idempotent() {
        let db = setup_db();
        weapon(&db, "Buster Sword I");
        create(&db, EntityKind::Item, json!({"name": "Potion", "rarity": 1}));
        create(
            &db,
            EntityKind::Skill,
            json!({"name": "Attack Boost", "ranks": [{"level": 1}]}),
        );
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions::new(dir.path());
        let fetcher = FakeFetcher::default();

        run(&db, &fetcher, &options).unwrap();
        let first = fs::read(dir.path().join("json/skills/1.json")).unwrap();
        let first_journal = fs::read(dir.path().join("json/items/.journal.json")).unwrap();

        run(&db, &fetcher, &options).unwrap();
        assert_eq!(fs::read(dir.path().join("json/skills/1.json")).unwrap(), first);
        assert_eq!(
            fs::read(dir.path().join("json/items/.journal.json")).unwrap(),
            first_journal
        );
    }

    #[test]
    fn test_targets_restrict_rows() {
        let db = setup_db();
        for name in ["One", "Two", "Three"] {
            weapon(&db, name);
        }
        let dir = tempfile::tempdir().unwrap();

        let mut options = ExportOptions::new(dir.path());
        options.targets = vec![
            Target::parse("Weapon:1").unwrap(),
            Target::parse("Weapon:3").unwrap(),
        ];
        let summary = run(&db, &FakeFetcher::default(), &options).unwrap();
        assert_eq!(summary.documents, 2);

        let group = dir.path().join("json/weapons/great-sword");
        assert!(group.join("1.json").exists());
        assert!(!group.join("2.json").exists());
        assert!(group.join("3.json").exists());
        assert!(!dir.path().join("json/items").exists());
    }

    #[test]
    fn test_restricted_runs_merge_journals() {
        let db = setup_db();
        weapon(&db, "One");
        weapon(&db, "Two");
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();

        for target in ["Weapon:1", "Weapon:2"] {
            let mut options = ExportOptions::new(dir.path());
            options.targets = vec![Target::parse(target).unwrap()];
            run(&db, &fetcher, &options).unwrap();
        }

        let journal = read_json(dir.path().join("json/weapons/.journal.json"));
        assert_eq!(
            journal,
            json!({"1": "great-sword/1.json", "2": "great-sword/2.json"})
        );
    }

    #[test]
    fn test_journal_only_writes_no_documents() {
        let db = setup_db();
        weapon(&db, "One");
        let dir = tempfile::tempdir().unwrap();

        let mut options = ExportOptions::new(dir.path());
        options.journal_only = true;
        let summary = run(&db, &FakeFetcher::default(), &options).unwrap();

        assert_eq!(summary.documents, 0);
        assert!(dir.path().join("json/weapons/.journal.json").exists());
        assert!(!dir.path().join("json/weapons/great-sword").exists());
    }

    #[test]
    fn test_existing_assets_not_refetched() {
        let db = setup_db();
        create(
            &db,
            EntityKind::Weapon,
            json!({
                "name": "Buster Sword I", "type": "great-sword", "rarity": 1,
                "assets": {"icon": "https://assets.example.com/weapons/great-sword/icon.png"}
            }),
        );
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();

        let summary = run(&db, &fetcher, &ExportOptions::new(dir.path())).unwrap();
        assert_eq!(summary.assets_fetched, 1);
        let asset = dir.path().join("assets/weapons/great-sword/icon.png");
        assert_eq!(fs::read(&asset).unwrap(), b"png");

        let mut options = ExportOptions::new(dir.path());
        options.no_clean = true;
        let summary = run(&db, &fetcher, &options).unwrap();
        assert_eq!(summary.assets_fetched, 0);
        assert_eq!(summary.assets_skipped, 1);
        assert_eq!(fetcher.calls.borrow().len(), 1);

        let mut options = ExportOptions::new(dir.path());
        options.skip_assets = true;
        run(&db, &fetcher, &options).unwrap();
        assert_eq!(fetcher.calls.borrow().len(), 1);
    }

    #[test]
    fn test_asset_path() {
        assert_eq!(
            asset_path("https://cdn.example.com/armor/male.png").unwrap(),
            PathBuf::from("armor/male.png")
        );
        assert!(asset_path("https://cdn.example.com/").is_err());
        assert!(asset_path("not a url").is_err());
    }

    struct Ungrouped;

    impl Exporter for Ungrouped {
        fn kind(&self) -> EntityKind {
            EntityKind::Item
        }

        fn export(&self, _helper: &ExportHelper<'_>, _record: &Record) -> ExportResult<Option<Export>> {
            Ok(Some(Export::new("", BTreeMap::new())))
        }
    }

    #[test]
    fn test_missing_group_aborts() {
        let db = setup_db();
        create(&db, EntityKind::Item, json!({"name": "Potion", "rarity": 1}));
        let dir = tempfile::tempdir().unwrap();

        let mut manager = ExportManager::new();
        manager.register(Box::new(Ungrouped));
        let fetcher = FakeFetcher::default();
        let mut progress = NoProgress;
        let mut options = ExportOptions::new(dir.path());
        options.entities = vec![EntityKind::Item];

        let err = ExportPipeline::new(&db, &manager, &fetcher, &mut progress)
            .run(&options)
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::MissingGroup {
                kind: EntityKind::Item,
                id: 1
            }
        ));
    }

    #[test]
    fn test_non_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_non_empty_dir(dir.path()).unwrap());
        assert!(!is_non_empty_dir(&dir.path().join("missing")).unwrap());
        fs::write(dir.path().join("file"), "x").unwrap();
        assert!(is_non_empty_dir(dir.path()).unwrap());
    }
}
