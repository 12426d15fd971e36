//! Tracing initialization.
//!
//! Sets up tracing-subscriber with console output and an [`EnvFilter`]. The filter is taken
//! from `RUST_LOG` when set, falling back to `info`. HTTP request/response spans are added
//! separately by the `TraceLayer` on the router.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing for the gateway process.
///
/// Errors if a global subscriber has already been installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");

    Ok(())
}
