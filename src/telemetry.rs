//! Tracing subscriber setup shared by the binaries

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// The library and the calling binary (`target`) log at the configured
/// level on top of whatever `RUST_LOG` enables. `format = "json"` switches to
/// structured JSON lines.
pub fn init(logging: &LoggingConfig, target: &str) -> Result<()> {
    let mut filter = EnvFilter::from_default_env()
        .add_directive(format!("card_fraud_scorer={}", logging.level).parse()?);
    if target != "card_fraud_scorer" {
        filter = filter.add_directive(format!("{}={}", target, logging.level).parse()?);
    }

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if logging.format.eq_ignore_ascii_case("json") {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {}", e))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install subscriber: {}", e))
    }
}
