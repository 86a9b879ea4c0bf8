use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `gpf_planner=debug,tower_http=warn`.
    pub log_level: String,
}

impl LoggingConfig {
    pub fn new(log_level: impl Into<String>) -> Self {
        Self {
            log_level: log_level.into(),
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so command output on stdout stays
/// machine-readable.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(&config.log_level)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;
    Ok(())
}
