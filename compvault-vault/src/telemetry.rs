//! `tracing` subscriber setup.

use crate::config::VaultConfig;
use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber. `RUST_LOG` wins over `config.log_filter`.
///
/// Returns `false` if a global subscriber was already set; calling twice is harmless.
pub fn init_tracing(config: &VaultConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
