//! Include-guard state machine for a single header.
//!
//! A header is expected to look like:
//!
//! ```text
//! /* preamble */
//! #ifndef GUARD
//! #define GUARD 1
//! /* body */
//! #endif /* GUARD */
//! /* postamble */
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! Preamble → GuardOpen → Body → Postamble
//! ```
//!
//! The machine only decides where each line belongs. It never opens files:
//! include directives found in the body are handed back to the caller as
//! [`LineAction`]s so the engine can expand or hoist them.

use std::fmt;

use crate::classify::Directive;

// ---------------------------------------------------------------------------
// ParseState
// ---------------------------------------------------------------------------

/// Position of the reader relative to the include guard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParseState {
    /// Before `#ifndef GUARD`.
    #[default]
    Preamble,
    /// Just after `#ifndef GUARD`; the next line must be `#define GUARD`.
    GuardOpen,
    /// Between `#define GUARD` and `#endif /* GUARD */`.
    Body,
    /// After `#endif /* GUARD */`. Terminal.
    Postamble,
}

impl ParseState {
    /// Whether reaching end-of-input in this state leaves the guard closed.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Postamble)
    }
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preamble => write!(f, "preamble"),
            Self::GuardOpen => write!(f, "guard-open"),
            Self::Body => write!(f, "body"),
            Self::Postamble => write!(f, "postamble"),
        }
    }
}

// ---------------------------------------------------------------------------
// LineAction
// ---------------------------------------------------------------------------

/// What the caller should do with the line just fed to the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineAction<'a> {
    /// Append the line to the preamble region.
    Preamble,
    /// Append the line to the body region.
    Body,
    /// Append the line to the postamble region.
    Postamble,
    /// Expand the named local include in place.
    LocalInclude(&'a [u8]),
    /// Record the named system include for hoisting.
    SystemInclude(&'a [u8]),
    /// Consume the line without emitting it.
    Drop,
}

/// The line after `#ifndef GUARD` was not `#define GUARD`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardMismatch {
    /// Token from the `#ifndef` line.
    pub expected: String,
    /// Token from the offending `#define` line, if it was one.
    pub found: Option<String>,
}

// ---------------------------------------------------------------------------
// GuardStateMachine
// ---------------------------------------------------------------------------

/// Per-file guard tracker. Each nested header gets a fresh instance.
#[derive(Clone, Debug, Default)]
pub struct GuardStateMachine {
    state: ParseState,
    guard: Option<Vec<u8>>,
}

impl GuardStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> ParseState {
        self.state
    }

    /// The token captured from `#ifndef`, once seen.
    #[must_use]
    pub fn guard(&self) -> Option<&[u8]> {
        self.guard.as_deref()
    }

    /// Feed one line (without its terminator) and advance.
    ///
    /// # Errors
    /// Returns [`GuardMismatch`] when the line following `#ifndef GUARD` is
    /// anything other than `#define GUARD`. The file is unusable after that.
    pub fn step<'a>(&mut self, line: &'a [u8]) -> Result<LineAction<'a>, GuardMismatch> {
        let directive = Directive::of(line);
        match (self.state, directive) {
            (ParseState::Preamble, Directive::GuardOpen(token)) => {
                self.guard = Some(token.to_vec());
                self.state = ParseState::GuardOpen;
                Ok(LineAction::Drop)
            }
            (ParseState::Preamble, Directive::PragmaOnce) => Ok(LineAction::Drop),
            (ParseState::Preamble, _) => Ok(LineAction::Preamble),

            (ParseState::GuardOpen, Directive::GuardDefine(token))
                if self.guard.as_deref() == Some(token) =>
            {
                self.state = ParseState::Body;
                Ok(LineAction::Drop)
            }
            (ParseState::GuardOpen, other) => Err(GuardMismatch {
                expected: String::from_utf8_lossy(self.guard.as_deref().unwrap_or_default())
                    .into_owned(),
                found: match other {
                    Directive::GuardDefine(token) => {
                        Some(String::from_utf8_lossy(token).into_owned())
                    }
                    _ => None,
                },
            }),

            (ParseState::Body, Directive::GuardClose(token))
                if self.guard.as_deref() == Some(token) =>
            {
                self.state = ParseState::Postamble;
                Ok(LineAction::Drop)
            }
            (ParseState::Body, Directive::LocalInclude(path)) => Ok(LineAction::LocalInclude(path)),
            (ParseState::Body, Directive::SystemInclude(path)) => {
                Ok(LineAction::SystemInclude(path))
            }
            (ParseState::Body, _) => Ok(LineAction::Body),

            (ParseState::Postamble, _) => Ok(LineAction::Postamble),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lines: &[&str]) -> (GuardStateMachine, Vec<String>) {
        let mut sm = GuardStateMachine::new();
        let mut actions = Vec::new();
        for line in lines {
            let action = sm.step(line.as_bytes()).unwrap();
            actions.push(format!("{action:?}"));
        }
        (sm, actions)
    }

    #[test]
    fn well_formed_header_walks_every_state() {
        let (sm, actions) = run(&[
            "/* pre */",
            "#pragma once",
            "#ifndef A_HPP",
            "#define A_HPP 1",
            "int a;",
            "#endif /* A_HPP */",
            "/* post */",
        ]);
        assert_eq!(sm.state(), ParseState::Postamble);
        assert_eq!(sm.guard(), Some(&b"A_HPP"[..]));
        assert_eq!(
            actions,
            ["Preamble", "Drop", "Drop", "Drop", "Body", "Drop", "Postamble"]
        );
    }

    #[test]
    fn define_must_follow_ifndef_immediately() {
        let mut sm = GuardStateMachine::new();
        sm.step(b"#ifndef A_HPP").unwrap();
        let err = sm.step(b"").unwrap_err();
        assert_eq!(err.expected, "A_HPP");
        assert_eq!(err.found, None);
    }

    #[test]
    fn define_with_other_token_is_rejected() {
        let mut sm = GuardStateMachine::new();
        sm.step(b"#ifndef X").unwrap();
        let err = sm.step(b"#define Y 1").unwrap_err();
        assert_eq!(
            err,
            GuardMismatch {
                expected: "X".to_owned(),
                found: Some("Y".to_owned()),
            }
        );
    }

    #[test]
    fn body_reports_includes() {
        let mut sm = GuardStateMachine::new();
        sm.step(b"#ifndef A").unwrap();
        sm.step(b"#define A").unwrap();
        assert_eq!(
            sm.step(br#"#include "b.hpp""#).unwrap(),
            LineAction::LocalInclude(b"b.hpp")
        );
        assert_eq!(
            sm.step(b"#include <vector>").unwrap(),
            LineAction::SystemInclude(b"vector")
        );
        assert_eq!(sm.step(b"#pragma once").unwrap(), LineAction::Body);
        assert_eq!(sm.step(b"#define A 2").unwrap(), LineAction::Body);
    }

    #[test]
    fn foreign_or_bare_endif_stays_in_body() {
        let (sm, actions) = run(&[
            "#ifndef A",
            "#define A",
            "#ifndef B",
            "#endif /* B */",
            "#endif",
            "#endif // A",
        ]);
        assert_eq!(sm.state(), ParseState::Body);
        assert_eq!(actions[2..], ["Body", "Body", "Body", "Body"]);
    }

    #[test]
    fn includes_in_preamble_and_postamble_are_text() {
        let (_, actions) = run(&[
            "#include <pre.h>",
            "#ifndef A",
            "#define A",
            "#endif /* A */",
            r#"#include "post.h""#,
            "#ifndef Z",
        ]);
        assert_eq!(actions[0], "Preamble");
        assert_eq!(actions[4..], ["Postamble", "Postamble"]);
    }

    #[test]
    fn non_utf8_guard_token_must_match_bytewise() {
        let mut sm = GuardStateMachine::new();
        sm.step(b"#ifndef G\xE9").unwrap();
        sm.step(b"#define G\xE9 1").unwrap();
        assert_eq!(sm.step(b"#endif /* G\xE9 */").unwrap(), LineAction::Drop);
        assert_eq!(sm.state(), ParseState::Postamble);
    }

    #[test]
    fn only_postamble_is_complete() {
        assert!(!ParseState::Preamble.is_complete());
        assert!(!ParseState::GuardOpen.is_complete());
        assert!(!ParseState::Body.is_complete());
        assert!(ParseState::Postamble.is_complete());
        assert_eq!(ParseState::GuardOpen.to_string(), "guard-open");
    }
}
