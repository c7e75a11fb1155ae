//! Header amalgamation library.
//!
//! Merges a root C/C++ header and every local header it transitively
//! includes into a single self-contained header with one content-addressed
//! include guard. The `amalgamate-hpp` binary is a thin wrapper around
//! [`Amalgamator`]; this crate exposes the engine so that it can be embedded
//! in build scripts and exercised directly by integration tests.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod hasher;
pub mod output;
pub mod registry;
pub mod telemetry;

pub use config::{AmalgamateConfig, EngineConfig, UnterminatedGuard};
pub use engine::{Amalgamator, amalgamate};
pub use error::{AmalgamateError, Result};
pub use guard::{GuardStateMachine, LineAction, ParseState};
pub use registry::IncludeRegistry;
