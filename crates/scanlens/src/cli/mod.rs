//! CLI command implementations.
//!
//! Each command is a plain args struct plus a `run(args) -> anyhow::Result`
//! function so integration tests can drive commands without spawning the
//! binary.

pub mod check;
pub mod output;
pub mod show;
pub mod suggest;
