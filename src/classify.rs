//! Line classification for header directives.
//!
//! Every function here looks at a single line in isolation and reports
//! whether it is one of the few preprocessor directives the amalgamator
//! cares about. Nothing else about C/C++ syntax is understood: conditional
//! blocks, macros and comments all pass through as plain text.
//!
//! Lines are raw bytes. Headers are not required to be UTF-8, so the
//! patterns run in byte mode (`(?-u)`): `\s` is ASCII whitespace and a token
//! may contain any other byte.
//!
//! Leading whitespace and whitespace between `#` and the directive name are
//! ignored, as is anything trailing the captured token.

use std::sync::LazyLock;

use regex::bytes::Regex;

static GUARD_OPEN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?-u)^\s*#\s*ifndef\s+(\S+)"));
static GUARD_DEFINE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?-u)^\s*#\s*define\s+(\S+)"));
static GUARD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?-u)^\s*#\s*endif\s+/\*\s+(\S+)\s+\*/"));
static LOCAL_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?-u)^\s*#\s*include\s+"([^"]+)""#));
static SYSTEM_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?-u)^\s*#\s*include\s+<([^>]+)>"));
static PRAGMA_ONCE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?-u)^\s*#\s*pragma\s+once\b"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("directive pattern is a valid regex")
}

fn capture<'a>(re: &Regex, line: &'a [u8]) -> Option<&'a [u8]> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_bytes())
}

// ---------------------------------------------------------------------------
// Directive
// ---------------------------------------------------------------------------

/// The recognized shape of a single line.
///
/// The directive names are distinct, so at most one pattern can match and
/// the order of the checks in [`Directive::of`] does not matter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `#ifndef TOKEN`
    GuardOpen(&'a [u8]),
    /// `#define TOKEN ...`
    GuardDefine(&'a [u8]),
    /// `#endif /* TOKEN */`
    GuardClose(&'a [u8]),
    /// `#include "path"`
    LocalInclude(&'a [u8]),
    /// `#include <path>`
    SystemInclude(&'a [u8]),
    /// `#pragma once`
    PragmaOnce,
    /// Anything else.
    Text,
}

impl<'a> Directive<'a> {
    /// Classify `line`.
    #[must_use]
    pub fn of(line: &'a [u8]) -> Self {
        if let Some(token) = guard_open(line) {
            Self::GuardOpen(token)
        } else if let Some(token) = guard_define(line) {
            Self::GuardDefine(token)
        } else if let Some(token) = guard_close(line) {
            Self::GuardClose(token)
        } else if let Some(path) = local_include(line) {
            Self::LocalInclude(path)
        } else if let Some(path) = system_include(line) {
            Self::SystemInclude(path)
        } else if is_pragma_once(line) {
            Self::PragmaOnce
        } else {
            Self::Text
        }
    }
}

// ---------------------------------------------------------------------------
// Matchers
// ---------------------------------------------------------------------------

/// Token of an `#ifndef TOKEN` line.
#[must_use]
pub fn guard_open(line: &[u8]) -> Option<&[u8]> {
    capture(&GUARD_OPEN, line)
}

/// Token of a `#define TOKEN` line. Any value after the token is ignored.
#[must_use]
pub fn guard_define(line: &[u8]) -> Option<&[u8]> {
    capture(&GUARD_DEFINE, line)
}

/// Token of an `#endif /* TOKEN */` line.
///
/// A bare `#endif`, or one followed by any other comment style, does not
/// match and is treated as ordinary text by the caller.
#[must_use]
pub fn guard_close(line: &[u8]) -> Option<&[u8]> {
    capture(&GUARD_CLOSE, line)
}

/// Path of an `#include "path"` line, verbatim.
#[must_use]
pub fn local_include(line: &[u8]) -> Option<&[u8]> {
    capture(&LOCAL_INCLUDE, line)
}

/// Path of an `#include <path>` line, verbatim.
#[must_use]
pub fn system_include(line: &[u8]) -> Option<&[u8]> {
    capture(&SYSTEM_INCLUDE, line)
}

/// Whether the line is `#pragma once`.
#[must_use]
pub fn is_pragma_once(line: &[u8]) -> bool {
    PRAGMA_ONCE.is_match(line)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
