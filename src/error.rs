//! Error types for amalgamation.
//!
//! [`AmalgamateError`] is the single error type returned by the engine. Every
//! variant carries enough context (file path, line, expected vs. found token)
//! to diagnose the input without re-running. All of them are fatal: a run
//! that fails produces no output.

use std::path::PathBuf;

use thiserror::Error;

use crate::guard::ParseState;

/// Errors returned by [`Amalgamator`](crate::Amalgamator) operations.
#[derive(Debug, Error)]
pub enum AmalgamateError {
    /// The root header, or a header it transitively includes, could not be opened.
    #[error("failed to open \"{}\" for reading: {source}", .path.display())]
    Open {
        /// The path that was being opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A header was opened but reading its lines failed.
    #[error("failed to read \"{}\": {source}", .path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `#ifndef GUARD` was not immediately followed by `#define GUARD`.
    #[error(
        "{}:{line}: missing #define {expected} just after the #ifndef{}",
        .path.display(),
        found_suffix(.found)
    )]
    MalformedGuard {
        /// The offending header.
        path: PathBuf,
        /// 1-based line number of the line that should have been `#define`.
        line: usize,
        /// Token from the `#ifndef` line.
        expected: String,
        /// Token of the `#define` that was found instead, if any.
        found: Option<String>,
    },

    /// End of input was reached before `#endif /* GUARD */`.
    #[error(
        "\"{}\" ended in the {state} section; expected a closing `#endif /* GUARD */`",
        .path.display()
    )]
    UnterminatedGuard {
        /// The truncated header.
        path: PathBuf,
        /// Where the reader was when the input ran out.
        state: ParseState,
    },

    /// Writing the assembled output failed.
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

fn found_suffix(found: &Option<String>) -> String {
    found
        .as_ref()
        .map(|f| format!(" (found #define {f})"))
        .unwrap_or_default()
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = AmalgamateError> = std::result::Result<T, E>;
