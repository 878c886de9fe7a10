//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use checkout_gateway::config::GatewayConfig;
use checkout_gateway::observability::counters::{Attributes, METER_NAME};
use checkout_gateway::observability::MetricsRegistry;
use checkout_gateway::orders::{OrderProcessor, PaypalClient};
use checkout_gateway::telemetry::HttpExporter;
use checkout_gateway::{HttpServer, Shutdown};
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry_sdk::metrics::data::{AggregatedMetrics, MetricData};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as seen by a mock upstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Canned reply: status, content type, body.
pub type Reply = (u16, &'static str, String);

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[header_end..].to_vec();
    while body.len() < length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Start a mock upstream on an ephemeral port. Every request is recorded and
/// answered by `f`.
pub async fn start_programmable_backend<F>(f: F) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>)
where
    F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);
    let log = seen.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let (status, content_type, body) = f(&request);
                log.lock().unwrap().push(request);

                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    status_text(status),
                    content_type,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, seen)
}

/// Accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Meter provider with an in-memory exporter; counters are read back through the SDK.
pub struct TestMeter {
    provider: SdkMeterProvider,
    exporter: InMemoryMetricExporter,
}

#[allow(dead_code)]
impl TestMeter {
    pub fn new() -> Self {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_periodic_exporter(exporter.clone())
            .build();
        Self { provider, exporter }
    }

    pub fn registry(&self) -> Arc<MetricsRegistry> {
        Arc::new(MetricsRegistry::new(&self.provider.meter(METER_NAME)))
    }

    /// Cumulative value of one series of `name`.
    pub fn value(&self, name: &str, attrs: &Attributes) -> f64 {
        self.series(name)
            .into_iter()
            .filter(|(a, _)| a == attrs)
            .map(|(_, v)| v)
            .sum()
    }

    pub fn total(&self, name: &str) -> f64 {
        self.series(name).into_iter().map(|(_, v)| v).sum()
    }

    fn series(&self, name: &str) -> Vec<(Attributes, f64)> {
        self.provider.force_flush().unwrap();
        let exported = self.exporter.get_finished_metrics().unwrap();
        let Some(latest) = exported.last() else {
            return Vec::new();
        };

        let mut series = Vec::new();
        for scope in latest.scope_metrics() {
            for metric in scope.metrics().into_iter().filter(|m| m.name() == name) {
                if let AggregatedMetrics::F64(MetricData::Sum(sum)) = metric.data() {
                    for point in sum.data_points() {
                        let attrs = point
                            .attributes()
                            .into_iter()
                            .map(|kv| (kv.key.as_str().to_string(), kv.value.as_str().into_owned()))
                            .collect();
                        series.push((attrs, point.value()));
                    }
                }
            }
        }
        series
    }
}

/// A running gateway under test.
#[allow(dead_code)]
pub struct TestGateway {
    pub addr: SocketAddr,
    pub meter: TestMeter,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the gateway with the real PayPal client and HTTP exporter.
pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let processor: Arc<dyn OrderProcessor> = Arc::new(PaypalClient::new(&config.paypal).unwrap());
    start_gateway_with(config, processor).await
}

pub async fn start_gateway_with(
    config: GatewayConfig,
    processor: Arc<dyn OrderProcessor>,
) -> TestGateway {
    let exporter = Arc::new(
        HttpExporter::new(Duration::from_secs(config.telemetry.relay_timeout_secs)).unwrap(),
    );
    let meter = TestMeter::new();
    let server = HttpServer::new(config, processor, exporter, meter.registry());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway {
        addr,
        meter,
        shutdown,
    }
}

/// Config with export off and the collector pointed at `collector`.
pub fn test_config(collector: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.telemetry.collector_endpoint = format!("http://{}", collector);
    config.telemetry.export_enabled = false;
    config.static_files.root = concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string();
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
