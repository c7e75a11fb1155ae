//! Amalgamation configuration (`amalgamate.toml`).
//!
//! Every field is optional; a missing file means all defaults, which
//! reproduce the engine's built-in behavior.
//!
//! ```toml
//! [engine]
//! source_root = "include"
//! unterminated_guard = "error"
//! ```

use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use serde::Deserialize;
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "amalgamate.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmalgamateConfig {
    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Settings consumed by [`Amalgamator`](crate::Amalgamator).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory that local includes are resolved against.
    ///
    /// Defaults to the directory containing the root header.
    #[serde(default)]
    pub source_root: Option<PathBuf>,

    /// What to do when a header ends before its guard is closed.
    #[serde(default)]
    pub unterminated_guard: UnterminatedGuard,
}

/// Policy for headers that end before `#endif /* GUARD */`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnterminatedGuard {
    /// Fail the whole run.
    #[default]
    Error,
    /// Keep whatever regions were collected before end-of-input.
    Accept,
}

impl fmt::Display for UnterminatedGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Accept => write!(f, "accept"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Why an `amalgamate.toml` could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but reading it failed.
    #[error("cannot read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not TOML, or sets something the engine has no setting for.
    #[error("{}{}: {message}", .path.display(), line_suffix(.line))]
    Invalid {
        path: PathBuf,
        /// 1-based line of the offending key or value, when known.
        line: Option<usize>,
        message: String,
    },
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|n| format!(":{n}")).unwrap_or_default()
}

impl AmalgamateConfig {
    /// Load `path`.
    ///
    /// A missing file is not an error: the defaults it yields make the
    /// engine behave exactly as it does with no configuration at all, so
    /// headers are resolved next to the root and unterminated guards fail.
    ///
    /// # Errors
    /// [`ConfigError::Read`] if the file exists but cannot be read,
    /// [`ConfigError::Invalid`] if its contents are rejected.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_owned(),
                source,
            }),
        }
    }

    /// Parse `contents`, reporting errors against `origin`.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] on malformed TOML, unknown keys, or an
    /// unknown `unterminated_guard` policy.
    pub fn from_toml(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Invalid {
            path: origin.to_owned(),
            line: e.span().map(|span| line_at(contents, span.start)),
            message: e.message().to_owned(),
        })
    }
}

fn line_at(text: &str, offset: usize) -> usize {
    text.bytes().take(offset).filter(|&b| b == b'\n').count() + 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
