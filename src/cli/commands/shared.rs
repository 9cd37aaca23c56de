//! Shared components for CLI commands
//!
//! Logging setup and configuration loading used by every subcommand.

use crate::cli::args::GlobalArgs;
use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::timezone::GeoTimezoneResolver;
use std::sync::Arc;
use tracing::debug;

/// Set up structured logging on stderr
pub fn setup_logging(args: &GlobalArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ran_extractor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Explicit `--config` file, then the user config file, then defaults
pub fn load_configuration(args: &GlobalArgs) -> Result<ExtractorConfig> {
    let config = ExtractorConfig::load_layered(args.config_file.as_deref())?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Build the timezone index off the async runtime
pub async fn build_resolver() -> anyhow::Result<Arc<GeoTimezoneResolver>> {
    let resolver = tokio::task::spawn_blocking(GeoTimezoneResolver::new).await?;
    Ok(Arc::new(resolver))
}
