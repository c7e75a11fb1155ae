//! Content-addressed include guard for the merged header.
//!
//! Algorithm: `<sanitized base name>__<hex SHA-256 of merged body>`. The base
//! name keeps guards readable; the digest guarantees that any change to the
//! merged body, including one pulled in transitively, yields a new guard.

use std::fmt::Write as _;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Joins the sanitized base name and the digest.
pub const GUARD_SEPARATOR: &str = "__";

/// Map every character outside `[A-Za-z0-9]` to `_`.
#[must_use]
pub fn sanitize_base_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Compute the replacement guard for `body`, merged from the header at `root`.
#[must_use]
pub fn compute_guard(body: &[u8], root: &Path) -> String {
    let base = root
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    let digest = Sha256::digest(body);
    let mut guard = sanitize_base_name(&base);
    guard.push_str(GUARD_SEPARATOR);
    for byte in digest {
        let _ = write!(guard, "{byte:02x}");
    }
    guard
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_non_alphanumerics() {
        assert_eq!(sanitize_base_name("test.hpp"), "test_hpp");
        assert_eq!(sanitize_base_name("my-lib v2.h"), "my_lib_v2_h");
        assert_eq!(sanitize_base_name("ÄBC.h"), "_BC_h");
        assert_eq!(sanitize_base_name(""), "");
    }

    #[test]
    fn guard_of_empty_body() {
        let guard = compute_guard(b"", Path::new("include/test.hpp"));
        assert_eq!(
            guard,
            "test_hpp__e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn guard_uses_base_name_only() {
        let a = compute_guard(b"int x;\n", Path::new("a/b/lib.hpp"));
        let b = compute_guard(b"int x;\n", Path::new("lib.hpp"));
        assert_eq!(a, b);
        assert!(a.starts_with("lib_hpp__"));
        assert_eq!(a.len(), "lib_hpp__".len() + 64);
    }
}
