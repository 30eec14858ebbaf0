//! Export command CLI definitions

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)] // One flag per export mode
pub struct ExportArgs {
    /// Output directory (defaults to the configured export path)
    #[arg(env = "MHDB_EXPORT_PATH")]
    pub output_path: Option<PathBuf>,

    /// Only export these entities (repeatable, e.g. --entity=Weapon)
    #[arg(long = "entity")]
    pub entities: Vec<String>,

    /// Only export these rows (repeatable, e.g. --target=Weapon:5)
    #[arg(long = "target")]
    pub targets: Vec<String>,

    /// Keep existing output instead of deleting it first
    #[arg(long)]
    pub no_clean: bool,

    /// Don't ask before writing into a non-empty directory
    #[arg(short, long)]
    pub yes: bool,

    /// Only write the journal files
    #[arg(long)]
    pub journal_only: bool,

    /// Don't download assets
    #[arg(long)]
    pub skip_assets: bool,
}
