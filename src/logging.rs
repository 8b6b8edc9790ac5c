//! Logging setup.

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{PipelineError, Result};

/// Install the global subscriber: stderr output, `RUST_LOG` overrides
/// `default_level` (e.g. "info", "bzzzbz=debug").
pub fn init(default_level: &str) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            default_level
                .parse()
                .map_err(|e| PipelineError::InvalidConfig(format!("log level: {}", e)))?,
        )
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init()
        .map_err(|e| PipelineError::InvalidConfig(format!("logging already initialized: {}", e)))
}
