//! Command handlers for mhdb CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod db;
pub mod export;
pub mod import;
