//! Command-line interface for sift.

mod commands;
pub mod handlers;

pub use commands::{Cli, Commands, DirectionArg, ItemKindArg};
