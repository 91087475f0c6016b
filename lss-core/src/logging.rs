//! Process-wide log setup, owned by the host application.
//!
//! Library crates only emit `tracing` events; nothing is printed until the
//! application calls [`init_logging`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::errors::{LssError, LssResult};

/// Installs a timestamped, level-prefixed console subscriber.
///
/// `base_level` is an `EnvFilter` directive such as `"info"` or
/// `"lss_spectra=debug"`. `RUST_LOG`, when set, takes precedence. Fails if the
/// directive is invalid or a global subscriber is already installed.
pub fn init_logging(base_level: &str) -> LssResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .map_err(|e| LssError::config(format!("invalid log filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .try_init()
        .map_err(|e| LssError::config(format!("logger initialization failed: {e}")))
}
