//! Recursive header amalgamation.
//!
//! [`Amalgamator::apply`] opens the root header, walks it with a
//! [`GuardStateMachine`], and expands every local include found in the body
//! by recursing into that header and splicing its body in place. Nested
//! preambles and postambles are discarded; only the root's survive.
//!
//! System includes are never opened. They are collected across the whole
//! tree, deduplicated, and emitted once above the merged body.
//!
//! # Output layout
//!
//! ```text
//! <root preamble>
//! #pragma once
//! #ifndef <guard>
//! #define <guard>\t1
//! #include <system-a>
//! <merged body>
//! #endif\t/* <guard> */
//! <root postamble>
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::Dispatch;

use crate::config::{EngineConfig, UnterminatedGuard};
use crate::error::{AmalgamateError, Result};
use crate::guard::{GuardStateMachine, LineAction};
use crate::hasher::compute_guard;
use crate::registry::IncludeRegistry;

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// The three regions collected from one header, as raw bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Regions {
    /// Lines before `#ifndef`, without `#pragma once`.
    pub(crate) preamble: Vec<u8>,
    /// Lines between `#define` and `#endif`, with includes expanded or hoisted.
    pub(crate) body: Vec<u8>,
    /// Lines after `#endif /* GUARD */`.
    pub(crate) postamble: Vec<u8>,
}

fn push_line(region: &mut Vec<u8>, line: &[u8]) {
    region.extend_from_slice(line);
    region.push(b'\n');
}

// ---------------------------------------------------------------------------
// Amalgamator
// ---------------------------------------------------------------------------

/// Merges a header and its local includes into one self-contained header.
///
/// An instance is reusable across roots; every call to [`apply`](Self::apply)
/// starts from a clean slate. It must not be shared between threads while a
/// run is in progress.
#[derive(Debug, Default)]
pub struct Amalgamator {
    config: EngineConfig,
    dispatch: Option<Dispatch>,
    source_root: PathBuf,
    system_includes: IncludeRegistry,
    local_includes: IncludeRegistry,
}

impl Amalgamator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Route this instance's diagnostics to `dispatch` instead of the global
    /// subscriber.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// System includes collected by the last run, in first-seen order.
    #[must_use]
    pub fn system_includes(&self) -> &[String] {
        self.system_includes.items()
    }

    /// Local include spellings expanded by the last run, in expansion order.
    #[must_use]
    pub fn local_includes(&self) -> &[String] {
        self.local_includes.items()
    }

    /// Forget everything from the previous run.
    pub fn reset(&mut self) {
        self.source_root = PathBuf::new();
        self.system_includes.clear();
        self.local_includes.clear();
    }

    /// Amalgamate the header tree rooted at `root` and return the merged
    /// header.
    ///
    /// Headers are handled as bytes: anything that is not one of the
    /// recognized directives is copied through unchanged, whatever its
    /// encoding.
    ///
    /// # Errors
    /// Fails if any header in the tree cannot be opened or read, or has a
    /// malformed (or, under the default policy, unterminated) include guard.
    /// Nothing is returned on failure.
    pub fn apply(&mut self, root: impl AsRef<Path>) -> Result<Vec<u8>> {
        let root = root.as_ref();
        match self.dispatch.clone() {
            Some(dispatch) => tracing::dispatcher::with_default(&dispatch, || self.run(root)),
            None => self.run(root),
        }
    }

    /// Like [`apply`](Self::apply), writing the merged header to `out`.
    ///
    /// Nothing is written unless the whole tree amalgamated successfully.
    ///
    /// # Errors
    /// Any [`apply`](Self::apply) error, or [`AmalgamateError::Write`].
    pub fn apply_to<W: io::Write>(&mut self, root: impl AsRef<Path>, out: &mut W) -> Result<()> {
        let merged = self.apply(root)?;
        out.write_all(&merged)?;
        out.flush()?;
        Ok(())
    }

    fn run(&mut self, root: &Path) -> Result<Vec<u8>> {
        self.reset();
        self.source_root = self.config.source_root.clone().unwrap_or_else(|| {
            root.parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        });

        let span = tracing::info_span!(
            "amalgamate",
            root = %root.display(),
            source_root = %self.source_root.display()
        );
        let _enter = span.enter();

        let regions = self.process(root)?;
        let guard = compute_guard(&regions.body, root);
        tracing::info!(
            %guard,
            local = self.local_includes.len(),
            system = self.system_includes.len(),
            "amalgamation complete"
        );
        Ok(self.render(&regions, &guard))
    }

    fn render(&self, regions: &Regions, guard: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            regions.preamble.len() + regions.body.len() + regions.postamble.len() + 256,
        );
        out.extend_from_slice(&regions.preamble);
        out.extend_from_slice(b"#pragma once\n");
        out.extend_from_slice(format!("#ifndef {guard}\n#define {guard}\t1\n").as_bytes());
        for header in self.system_includes.items() {
            out.extend_from_slice(format!("#include <{header}>\n").as_bytes());
        }
        out.extend_from_slice(&regions.body);
        out.extend_from_slice(format!("#endif\t/* {guard} */\n").as_bytes());
        out.extend_from_slice(&regions.postamble);
        out
    }

    /// Read one header, expanding its local includes recursively.
    fn process(&mut self, path: &Path) -> Result<Regions> {
        let file = File::open(path).map_err(|source| AmalgamateError::Open {
            path: path.to_owned(),
            source,
        })?;
        let span = tracing::debug_span!("header", path = %path.display());
        let _enter = span.enter();

        let mut machine = GuardStateMachine::new();
        let mut regions = Regions::default();

        for (idx, line) in BufReader::new(file).split(b'\n').enumerate() {
            let mut line = line.map_err(|source| AmalgamateError::Read {
                path: path.to_owned(),
                source,
            })?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let action = machine
                .step(&line)
                .map_err(|mismatch| AmalgamateError::MalformedGuard {
                    path: path.to_owned(),
                    line: idx + 1,
                    expected: mismatch.expected,
                    found: mismatch.found,
                })?;

            match action {
                LineAction::Preamble => push_line(&mut regions.preamble, &line),
                LineAction::Body => push_line(&mut regions.body, &line),
                LineAction::Postamble => push_line(&mut regions.postamble, &line),
                LineAction::Drop => {}
                LineAction::LocalInclude(spelling) => {
                    // Spellings are registry keys and file names, so they are
                    // handled as text; the bytes around them are not.
                    let include = String::from_utf8_lossy(spelling);
                    if self.local_includes.contains(&include) {
                        tracing::debug!(%include, duplicate = true, "local include");
                        continue;
                    }
                    tracing::debug!(%include, duplicate = false, "local include");
                    self.local_includes.register(&include);
                    let resolved = self.source_root.join(&*include);
                    let nested = self.process(&resolved)?;
                    regions.body.extend_from_slice(&nested.body);
                }
                LineAction::SystemInclude(spelling) => {
                    let include = String::from_utf8_lossy(spelling);
                    let duplicate = self.system_includes.contains(&include);
                    tracing::debug!(%include, duplicate, "system include");
                    self.system_includes.register(&include);
                }
            }
        }

        let state = machine.state();
        if !state.is_complete() {
            match self.config.unterminated_guard {
                UnterminatedGuard::Error => {
                    return Err(AmalgamateError::UnterminatedGuard {
                        path: path.to_owned(),
                        state,
                    });
                }
                UnterminatedGuard::Accept => {
                    tracing::warn!(%state, "header ended before its include guard was closed");
                }
            }
        }
        Ok(regions)
    }
}

/// Amalgamate `root` with the default configuration.
///
/// # Errors
/// See [`Amalgamator::apply`].
pub fn amalgamate(root: impl AsRef<Path>) -> Result<Vec<u8>> {
    Amalgamator::new().apply(root)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
