//! CLI argument definitions for mhdb

mod core;
mod db;
mod export;

pub use core::{Cli, Commands};
pub use db::DbCommand;
pub use export::ExportArgs;
