//! `scrubber` removes sensitive literal strings from a body of files in bulk.
//!
//! It provides the core logic for the `scrubber` command-line tool but can also
//! be used as a library. The main components are:
//!
//! - `RuleTable`: an ordered, immutable list of case-insensitive
//!   pattern-to-replacement rules, applied one after another.
//! - `Classifier`: decides which paths are text files worth processing.
//! - `FileProcessor`: reads, sanitizes and atomically rewrites a single file.
//! - `RunAggregator`: drives the above over a list of paths, optionally in
//!   parallel with Rayon, and produces a `RunSummary`.
//! - `walker`, `config` and `output_formatter`: directory traversal, YAML
//!   configuration and report rendering for the CLI.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod errors;
pub mod output_formatter;
pub mod patterns;
pub mod processor;
pub mod rules;
pub mod runner;
pub mod walker;

// Re-export main types for easier access by library users.
pub use classifier::Classifier;
pub use errors::{Error, Result};
pub use output_formatter::{OutputFormat, OutputFormatter};
pub use processor::{FileOutcome, FileProcessor};
pub use rules::{Rule, RuleTable, Substitution};
pub use runner::{FileReport, RunAggregator, RunReport, RunSummary};
