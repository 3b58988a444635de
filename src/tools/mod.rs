//! Tool implementations shared by the CLI and the stdio server

pub mod filter;
pub mod format;
pub mod score;
