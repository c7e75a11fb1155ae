//! Shared test helpers for amalgamation integration tests.
//!
//! All tests use temp directories; each test lays out its own header tree.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// A throwaway directory of headers.
pub struct HeaderTree {
    dir: TempDir,
}

impl HeaderTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the tree.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `name`, creating parent directories.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.path(name)).ok()
    }
}

/// A conventionally guarded header around `body`.
pub fn header(guard: &str, body: &str) -> String {
    format!("#ifndef {guard}\n#define {guard} 1\n{body}#endif /* {guard} */\n")
}

/// Run the `amalgamate-hpp` binary in `dir`.
pub fn amalgamate_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_amalgamate-hpp"))
        .args(args)
        .current_dir(dir)
        .env_remove("AMALGAMATE_OUTPUT")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute amalgamate-hpp")
}

/// Run the binary and assert success, returning stdout.
pub fn amalgamate_ok(dir: &Path, args: &[&str]) -> String {
    let out = amalgamate_in(dir, args);
    assert!(
        out.status.success(),
        "amalgamate-hpp {} failed:\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

/// Run the binary and assert failure, returning stderr.
pub fn amalgamate_fails(dir: &Path, args: &[&str]) -> String {
    let out = amalgamate_in(dir, args);
    assert!(
        !out.status.success(),
        "amalgamate-hpp {} should have failed:\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout)
    );
    String::from_utf8_lossy(&out.stderr).into_owned()
}
