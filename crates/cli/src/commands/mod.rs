//! Subcommand implementations.

pub mod caps;
pub mod check;
pub mod variants;
