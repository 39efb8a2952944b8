//! # inbox-cli
//!
//! Argument parsing for the `inbox` binary.

pub mod cli;

pub use cli::{Cli, Commands};
