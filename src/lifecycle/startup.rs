//! Startup orchestration.
//!
//! Order: telemetry providers → logging → processor client → listener → serve.
//! Any startup error is fatal. On shutdown the server drains first, then the
//! telemetry providers get a bounded window for their final flush.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::{self, MetricsRegistry};
use crate::orders::{OrderProcessor, PaypalClient};
use crate::telemetry::{HttpExporter, TelemetryExporter, TelemetryProviders};

/// How long the exporters get to flush after the server stops.
const FLUSH_GRACE: Duration = Duration::from_secs(5);

pub type StartupError = Box<dyn std::error::Error + Send + Sync>;

/// Run the gateway until `stop` resolves.
pub async fn run<F>(config: GatewayConfig, stop: F) -> Result<(), StartupError>
where
    F: Future<Output = ()>,
{
    let telemetry = config.telemetry.clone();
    let providers = if telemetry.export_enabled {
        Some(TelemetryProviders::install(&telemetry)?)
    } else {
        None
    };
    observability::logging::init_logging(&config.observability, providers.as_ref())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %telemetry.deployment_environment,
        "checkout-gateway starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        paypal_base_url = %config.paypal.base_url,
        relay_traces = %telemetry.relay_traces_url(),
        export_traces = %telemetry.traces_url(),
        export_metrics = %telemetry.metrics_url(),
        export_logs = %telemetry.logs_url(),
        "Configuration loaded"
    );
    if providers.is_none() {
        tracing::info!("Collector export disabled");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = Arc::new(match &providers {
        Some(providers) => MetricsRegistry::new(&providers.meter()),
        None => MetricsRegistry::default(),
    });
    let exporter: Arc<dyn TelemetryExporter> = Arc::new(HttpExporter::new(Duration::from_secs(
        telemetry.relay_timeout_secs,
    ))?);
    let processor: Arc<dyn OrderProcessor> = Arc::new(PaypalClient::new(&config.paypal)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, processor, exporter, registry);
    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            // server ended on its own: still let the exporters flush
            flush(providers).await;
            return result?.map_err(Into::into);
        }
        _ = stop => {}
    }

    shutdown.trigger();
    server_task.await??;
    tracing::info!("Shutdown complete");
    flush(providers).await;
    Ok(())
}

async fn flush(providers: Option<TelemetryProviders>) {
    let Some(providers) = providers else {
        return;
    };
    let task = tokio::task::spawn_blocking(move || providers.shutdown());
    if tokio::time::timeout(FLUSH_GRACE, task).await.is_err() {
        tracing::warn!("Telemetry exporters did not finish flushing in time");
    }
}
