//! CLI module - argument parsing and config resolution

mod args;

pub use args::{Cli, Commands};
