//! remerge core library.
//!
//! This crate provides the components for resolving diff3-style conflict
//! markers: the marker parser and resolution heuristics (pure, in-memory),
//! configuration, atomic file rewriting, and discovery of conflicted files
//! from a version control tool.

pub mod config;
pub mod conflict;
pub mod errors;
pub mod files;
pub mod vcs;

// Re-exports for convenience.
pub use config::{AppConfig, ResolutionOptions};
pub use conflict::{parse, resolve_text, ConflictResolver, Outcome, ProcessedText};
pub use files::{resolve_file, FileAction, FileReport};
pub use vcs::VcsClient;
