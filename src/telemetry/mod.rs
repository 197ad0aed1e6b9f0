//! Logging and metrics for the approval pipeline
//!
//! Logs go through `tracing`; metrics are emitted as structured events on the
//! `metrics` target so any subscriber can pick them up.

use crate::config::LoggerSettings;

/// Configuration for the telemetry system
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Name of the service
    pub service_name: String,
    /// Enable colored console output
    pub enable_console: bool,
    /// Log level, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "content-approval".to_string(),
            enable_console: true,
            log_level: "info".to_string(),
        }
    }
}

impl From<&LoggerSettings> for TelemetryConfig {
    fn from(settings: &LoggerSettings) -> Self {
        Self {
            enable_console: settings.enable_console,
            log_level: settings.level.clone(),
            ..Self::default()
        }
    }
}

impl TelemetryConfig {
    /// Use `level` when the configured level is still the default one
    pub fn with_default_level(mut self, level: &str) -> Self {
        if self.log_level == Self::default().log_level {
            self.log_level = level.to_string();
        }
        self
    }
}

/// Initialize the global tracing subscriber
pub fn init_telemetry(
    config: TelemetryConfig,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(config.enable_console)
        .try_init()?;

    tracing::debug!(service = %config.service_name, "Telemetry initialized");
    Ok(())
}

/// Add a single metric with tags to the telemetry system
pub fn add_metric(name: &str, value: f64, tags: &[(&str, String)]) {
    let tags_str = tags
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",");

    tracing::info!(
        target: "metrics",
        metric_name = %name,
        metric_value = %value,
        metric_tags = %tags_str,
        "Recorded metric"
    );
}

/// A span duration tracker for measuring operation durations
pub fn span_duration(name: &'static str) -> impl Drop {
    struct Guard {
        name: &'static str,
        start: std::time::Instant,
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            tracing::info!(
                target: "metrics",
                duration_ms = duration.as_millis() as f64,
                operation = self.name,
                "Operation completed"
            );
        }
    }

    Guard {
        name,
        start: std::time::Instant::now(),
    }
}
