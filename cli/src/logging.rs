//! Tracing setup.
//!
//! The TUI owns stdout, so interactive runs log to a file (or nowhere).
//! `--check` runs log to stderr.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Discard,
}

fn make_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Call once at startup.
///
/// Level comes from `RUST_LOG`, defaulting to `info`.
pub fn init(target: LogTarget<'_>) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(make_filter())
        .with_target(false);

    let installed = match target {
        LogTarget::File(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::Discard => builder.with_writer(io::sink).try_init(),
    };

    installed.map_err(|e| anyhow!("logging already initialised: {e}"))
}
