//! CLI mode implementation
//!
//! Provides command-line interface for the fuzzyfind tools. The argument
//! structs double as the input schemas of the stdio server tools.

use crate::search::MatcherBackend;
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fuzzyfind CLI
#[derive(Parser)]
#[command(name = "fuzzyfind")]
#[command(about = "Fuzzy subsequence matching and ranking", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to <config dir>/fuzzyfind/config.json)
    #[arg(long, global = true, env = "FUZZYFIND_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Test one candidate against a query
    Match(MatchArgs),
    /// Rank a list of candidates against a query
    Filter(FilterArgs),
    /// Serve the tools as line-delimited JSON-RPC over stdio
    Serve,
}

/// Match tool arguments
#[derive(Parser, JsonSchema, Deserialize, Serialize, Clone, Debug)]
pub struct MatchArgs {
    /// Search query; whitespace is ignored
    #[arg(short = 'q', long, default_value = "")]
    #[serde(default)]
    #[schemars(description = "Search query; whitespace is ignored, case-insensitive")]
    pub query: String,

    /// Candidate text
    #[arg(short = 'c', long)]
    #[schemars(description = "Candidate text to test")]
    pub candidate: String,

    /// Print JSON instead of text
    #[arg(long)]
    #[serde(default)]
    #[schemars(skip)]
    pub json: bool,
}

/// Filter tool arguments
#[derive(Parser, JsonSchema, Deserialize, Serialize, Clone, Debug)]
pub struct FilterArgs {
    /// Search query; whitespace is ignored
    #[arg(short = 'q', long, default_value = "")]
    #[serde(default)]
    #[schemars(description = "Search query; whitespace is ignored, case-insensitive")]
    pub query: String,

    /// Candidate (repeatable); read from --file or stdin when none are given
    #[arg(short = 'c', long = "candidate")]
    #[serde(default)]
    #[schemars(description = "Candidate strings to rank")]
    pub candidates: Vec<String>,

    /// File with one candidate per line
    #[arg(short = 'f', long)]
    #[serde(skip)]
    #[schemars(skip)]
    pub file: Option<PathBuf>,

    /// Maximum number of results
    #[arg(short = 'l', long)]
    #[schemars(description = "Maximum number of results (default: all)")]
    pub limit: Option<usize>,

    /// Also match paths from their end
    #[arg(long)]
    #[serde(default)]
    #[schemars(description = "Also match candidates reversed and keep the better score")]
    pub bidirectional: bool,

    /// Scoring backend: native or nucleo
    #[arg(long)]
    #[schemars(description = "Scoring backend: native (default) or nucleo")]
    pub backend: Option<MatcherBackend>,

    /// Mark matched characters with **
    #[arg(long)]
    #[serde(default)]
    #[schemars(description = "Mark matched characters with ** in the text output")]
    pub highlight: bool,

    /// Print JSON instead of text
    #[arg(long)]
    #[serde(default)]
    #[schemars(skip)]
    pub json: bool,
}
