//! Development-time tracing for debugging orc commands.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: Dev diagnostics via `RUST_LOG`, output to stderr.
//!   Only the shell and io layers emit events; `core` never logs.
//!
//! - **Dry-run output (`io::executor::DryRunExecutor`)**: The rendered effect
//!   lines a caller shows the user. Unaffected by `RUST_LOG`.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=orc=debug orc mission launch MISSION-001
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

/// Like [`init`], but reports an already-installed subscriber instead of
/// panicking.
pub fn try_init() -> Result<()> {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
        .map_err(|err| anyhow!("install tracing subscriber: {err}"))
}

