//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, CORS, limits, timeout)
//! - Serve the static front end for every unmatched path
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::{orders, otel, ui};
use crate::observability::counters::MetricsRegistry;
use crate::observability::metrics;
use crate::orders::{OrderGateway, OrderProcessor};
use crate::telemetry::exporter::TelemetryExporter;
use crate::telemetry::relay::{RelayTargets, Signal, TelemetryRelay};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gateway: Arc<OrderGateway>,
    pub relay: Arc<TelemetryRelay>,
    pub metrics: Arc<MetricsRegistry>,
}

/// HTTP server for the checkout gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with its collaborators injected.
    pub fn new(
        config: GatewayConfig,
        processor: Arc<dyn OrderProcessor>,
        exporter: Arc<dyn TelemetryExporter>,
        registry: Arc<MetricsRegistry>,
    ) -> Self {
        let config = Arc::new(config);
        let relay = TelemetryRelay::new(exporter, RelayTargets::from_config(&config.telemetry));

        let state = AppState {
            config: config.clone(),
            gateway: Arc::new(OrderGateway::new(processor, registry.clone())),
            relay: Arc::new(relay),
            metrics: registry,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let api = Router::new()
            .route("/clientid", get(orders::client_id))
            .route("/orders", post(orders::create_order))
            .route("/capture/{order_id}", post(orders::capture_order))
            .route(&otel_path(Signal::Traces), post(otel::relay_traces))
            .route(&otel_path(Signal::Metrics), post(otel::relay_metrics))
            .route(&otel_path(Signal::Logs), post(otel::relay_logs))
            .route("/ui/metric", post(ui::ui_metric))
            .route("/ui/log", post(ui::ui_log))
            .with_state(state);

        let router = if config.static_files.enabled {
            api.fallback_service(ServeDir::new(&config.static_files.root))
        } else {
            api.fallback(|| async { StatusCode::NOT_FOUND })
        };

        let cors = if config.security.cors_permissive {
            CorsLayer::very_permissive()
        } else {
            CorsLayer::new()
        };

        router
            .layer(middleware::from_fn(track_metrics))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(cors)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    otel.kind = "server",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            static_root = %self.config.static_files.root,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn otel_path(signal: Signal) -> String {
    format!("/otel{}", signal.path())
}

/// Record count and latency per matched route.
async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "static".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}
