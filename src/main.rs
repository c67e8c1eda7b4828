//! Fanout push-event dispatch service.
//!
//! Main entry point for the standalone webhook relay. Initializes
//! tracing, loads configuration, builds the event hub, and serves the
//! provider webhook endpoint until shutdown.

use anyhow::Result;
use fanout_api::{Config, EventHub};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config.rust_log);

    info!("Starting fanout dispatch service");
    info!(
        host = %config.host,
        port = config.port,
        verify_signatures = config.verify_signatures,
        "Configuration loaded"
    );

    let mut hub = EventHub::new("fanout");
    for event_name in config.echo_event_names() {
        let name = event_name.clone();
        hub = hub.add_event_fn(event_name, "echo", move |payload, source| {
            info!(
                event = %name,
                source,
                payload = %serde_json::Value::Object(payload.clone()),
                "echo callback"
            );
            Ok(())
        });
    }

    hub.serve(&config).await?;

    info!("Fanout shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
