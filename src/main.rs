use std::path::PathBuf;

use amalgamate::config::{AmalgamateConfig, DEFAULT_CONFIG_FILE};
use amalgamate::output::Destination;
use amalgamate::telemetry::{self, LogFormat};
use amalgamate::{Amalgamator, UnterminatedGuard};
use anyhow::{Context, Result};
use clap::Parser;

/// Merge a tree of C/C++ headers into one self-contained header
///
/// The root header and every header it pulls in with `#include "..."` are
/// merged into a single file. Each input must follow the layout:
///
///   /* preamble */
///   #ifndef GUARD
///   #define GUARD 1
///   /* body */
///   #endif /* GUARD */
///   /* postamble */
///
/// Local includes are expanded once, at their first occurrence. System
/// includes (`#include <...>`) are deduplicated and hoisted above the merged
/// body. The output gets a fresh include guard derived from its content.
#[derive(Parser)]
#[command(name = "amalgamate-hpp")]
#[command(version, about)]
struct Cli {
    /// Root header to amalgamate
    root: PathBuf,

    /// Output path (`-` for stdout). Files are replaced atomically.
    #[arg(short, long, default_value = "-", env = "AMALGAMATE_OUTPUT")]
    output: String,

    /// Be verbose (debug-level diagnostics on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory local includes are resolved against
    /// [default: directory of the root header]
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Accept headers that end before their include guard is closed
    #[arg(long)]
    allow_unterminated: bool,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() {
    let cli = Cli::parse();
    telemetry::init(cli.verbose, cli.log_format);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = AmalgamateConfig::load(&cli.config)?.engine;
    if let Some(root) = &cli.source_root {
        config.source_root = Some(root.clone());
    }
    if cli.allow_unterminated {
        config.unterminated_guard = UnterminatedGuard::Accept;
    }

    let merged = Amalgamator::with_config(config)
        .apply(&cli.root)
        .with_context(|| format!("failed to amalgamate {}", cli.root.display()))?;

    let destination = Destination::from_arg(&cli.output);
    destination
        .commit(&merged)
        .with_context(|| format!("failed to write {}", cli.output))?;
    Ok(())
}
