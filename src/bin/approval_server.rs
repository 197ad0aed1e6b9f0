use content_approval::config::get_settings;
use content_approval::server::serve;
use content_approval::telemetry::{init_telemetry, TelemetryConfig};
use content_approval::RequestCoordinator;
use tracing::{info, warn};

/// HTTP server for the content approval pipeline
///
/// Usage: `approval-server [config.yaml]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config_path = std::env::args().nth(1);
    let mut settings = get_settings(config_path.as_deref())?;
    settings.apply_env_overrides()?;

    if let Err(err) = init_telemetry(TelemetryConfig::from(&settings.logger)) {
        eprintln!("Failed to initialize telemetry: {}", err);
    }

    info!(
        generator = ?settings.generator.mode,
        publisher = ?settings.publisher.mode,
        "Starting content approval server"
    );
    if settings.publisher.mode == content_approval::config::PublisherMode::DryRun {
        warn!("Dry-run publisher active, nothing will be posted");
    }

    let coordinator = RequestCoordinator::from_settings(&settings)?;
    serve(&settings.server, coordinator).await
}
