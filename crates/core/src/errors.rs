//! Error types for the remerge core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.
//!
//! Failing to *resolve* a conflict is not an error; it is reported through
//! [`Outcome`](crate::conflict::Outcome). Only malformed marker structure,
//! bad configuration, and I/O or process failures end up here.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Structural errors in conflict marker sequences.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Input ended before the marker closing the current conflict section.
    #[error(
        "unterminated conflict: expected a '{marker}' marker, scanning from line {line}:\n{preview}"
    )]
    UnterminatedMarker {
        /// The marker character that was being searched for.
        marker: char,
        /// 1-based line number where the scan for the marker began.
        line: usize,
        /// Up to five of the unconsumed lines, as `<lineno>\t<text>`.
        preview: String,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// File errors
// ---------------------------------------------------------------------------

/// Errors from reading, resolving, and rewriting a single file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file's conflict markers are malformed.
    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Writing the resolved content back failed.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Version control errors
// ---------------------------------------------------------------------------

/// Errors from discovering conflicted files through a VCS command.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The VCS binary was not found on `$PATH`.
    #[error("{0} binary not found")]
    BinaryNotFound(String),

    /// The working directory is not inside a supported repository.
    #[error("not inside a {backend} repository: {}", path.display())]
    NotARepository { backend: String, path: PathBuf },

    /// A VCS command exited with a non-zero status.
    #[error("{program} command failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        program: String,
        exit_code: i32,
        stderr: String,
    },

    /// Generic I/O wrapper.
    #[error("vcs I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
