//! End-to-end tests for the gateway's HTTP surface.
//!
//! The PayPal API and the OTLP collector are raw-TCP mocks; the gateway runs
//! with its real clients against them.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use checkout_gateway::observability::counters::{
    attributes, ORDERS_CAPTURED, ORDERS_CREATED, UI_EVENTS,
};
use common::*;
use serde_json::{json, Value};

#[tokio::test]
async fn test_relay_passes_collector_reply_through() {
    let (collector, seen) = start_programmable_backend(|_req| {
        (200, "application/json", r#"{"partialSuccess":{}}"#.to_string())
    })
    .await;
    let gateway = start_gateway(test_config(collector)).await;

    let payload = r#"{"resourceSpans":[]}"#;
    let res = client()
        .post(gateway.url("/otel/v1/traces"))
        .header("content-type", "application/json")
        .body(payload)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#"{"partialSuccess":{}}"#);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/v1/traces");
    assert_eq!(seen[0].header("content-type"), Some("application/json"));
    assert_eq!(seen[0].body, payload.as_bytes());
}

#[tokio::test]
async fn test_relay_routes_each_signal_to_its_path() {
    let (collector, seen) =
        start_programmable_backend(|_req| (200, "application/json", "{}".to_string())).await;
    let gateway = start_gateway(test_config(collector)).await;
    let client = client();

    for path in ["/otel/v1/metrics", "/otel/v1/logs"] {
        let res = client.post(gateway.url(path)).body("{}").send().await.unwrap();
        assert_eq!(res.status(), 200);
    }

    let paths: Vec<String> = seen.lock().unwrap().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec!["/v1/metrics", "/v1/logs"]);
}

#[tokio::test]
async fn test_relay_preserves_collector_error_status() {
    let (collector, _) = start_programmable_backend(|_req| {
        (503, "text/plain", "collector overloaded".to_string())
    })
    .await;
    let gateway = start_gateway(test_config(collector)).await;

    let res = client()
        .post(gateway.url("/otel/v1/logs"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    assert_eq!(res.text().await.unwrap(), "collector overloaded");
}

#[tokio::test]
async fn test_relay_unreachable_collector() {
    let gateway = start_gateway(test_config(closed_port().await)).await;

    let res = client()
        .post(gateway.url("/otel/v1/metrics"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert!(!res.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_relay_timeout_is_500() {
    let mut config = test_config(start_silent_backend().await);
    config.telemetry.relay_timeout_secs = 1;
    let gateway = start_gateway(config).await;

    let started = std::time::Instant::now();
    let res = client()
        .post(gateway.url("/otel/v1/traces"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert!(!res.text().await.unwrap().is_empty());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_capture_rejects_dot_segment_ids() {
    let (paypal, seen) =
        start_programmable_backend(|_req| (200, "application/json", "{}".to_string())).await;
    let mut config = test_config(closed_port().await);
    config.paypal.base_url = format!("http://{}", paypal);
    let gateway = start_gateway(config).await;

    let res = client()
        .post(gateway.url("/capture/..."))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(gateway.meter.total(ORDERS_CAPTURED), 0.0);
}

#[tokio::test]
async fn test_order_create_and_capture_against_paypal() {
    let token_requests = Arc::new(AtomicUsize::new(0));
    let counter = token_requests.clone();
    let (paypal, seen) = start_programmable_backend(move |req| match req.path.as_str() {
        "/v1/oauth2/token" => {
            counter.fetch_add(1, Ordering::SeqCst);
            (
                200,
                "application/json",
                r#"{"access_token":"tok-1","token_type":"Bearer","expires_in":32400}"#.to_string(),
            )
        }
        "/v2/checkout/orders" => (
            201,
            "application/json",
            r#"{"id":"5O190127TN364715T","status":"CREATED"}"#.to_string(),
        ),
        "/v2/checkout/orders/5O190127TN364715T/capture" => (
            201,
            "application/json",
            r#"{"id":"5O190127TN364715T","status":"COMPLETED"}"#.to_string(),
        ),
        _ => (404, "application/json", "{}".to_string()),
    })
    .await;

    let mut config = test_config(closed_port().await);
    config.paypal.base_url = format!("http://{}", paypal);
    config.paypal.client_id = "client-abc".to_string();
    config.paypal.client_secret = "secret".to_string();
    let gateway = start_gateway(config).await;
    let client = client();

    let res = client.get(gateway.url("/clientid")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "clientid": "client-abc" }));

    let res = client
        .post(gateway.url("/orders"))
        .json(&json!({ "cart": [{ "currency": "EUR", "amount": "12.50" }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let order: Value = res.json().await.unwrap();
    assert_eq!(order["status"], "CREATED");

    let res = client
        .post(gateway.url("/capture/5O190127TN364715T"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let captured: Value = res.json().await.unwrap();
    assert_eq!(captured["status"], "COMPLETED");

    assert_eq!(token_requests.load(Ordering::SeqCst), 1);

    let seen = seen.lock().unwrap();
    let create = seen.iter().find(|r| r.path == "/v2/checkout/orders").unwrap();
    assert_eq!(create.header("authorization"), Some("Bearer tok-1"));
    let sent: Value = serde_json::from_slice(&create.body).unwrap();
    assert_eq!(sent["intent"], "CAPTURE");
    assert_eq!(sent["purchase_units"][0]["amount"]["currency_code"], "EUR");
    assert_eq!(sent["purchase_units"][0]["amount"]["value"], "12.50");

    let capture = seen.iter().find(|r| r.path.ends_with("/capture")).unwrap();
    assert_eq!(capture.header("prefer"), Some("return=representation"));

    let meter = &gateway.meter;
    assert_eq!(
        meter.value(ORDERS_CREATED, &attributes([("currency", "EUR")])),
        1.0
    );
    assert_eq!(meter.total(ORDERS_CAPTURED), 1.0);
}

#[tokio::test]
async fn test_order_processor_rejection_is_bad_gateway() {
    let (paypal, _) = start_programmable_backend(|req| match req.path.as_str() {
        "/v1/oauth2/token" => (
            200,
            "application/json",
            r#"{"access_token":"tok","expires_in":3600}"#.to_string(),
        ),
        _ => (
            422,
            "application/json",
            r#"{"name":"UNPROCESSABLE_ENTITY","details":[{"issue":"ORDER_NOT_APPROVED"}]}"#
                .to_string(),
        ),
    })
    .await;

    let mut config = test_config(closed_port().await);
    config.paypal.base_url = format!("http://{}", paypal);
    let gateway = start_gateway(config).await;

    let res = client()
        .post(gateway.url("/capture/NOTAPPROVED"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().is_some());
    assert_eq!(body["details"]["name"], "UNPROCESSABLE_ENTITY");
    assert_eq!(gateway.meter.total(ORDERS_CAPTURED), 0.0);
}

#[tokio::test]
async fn test_ui_endpoints_accept_anything() {
    let gateway = start_gateway(test_config(closed_port().await)).await;
    let client = client();

    for body in ["{not json", "", r#"{"name":"button.click","value":2}"#] {
        let res = client
            .post(gateway.url("/ui/metric"))
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 204);
    }
    for body in ["[1,2", r#"{"level":"error","message":"boom"}"#] {
        let res = client.post(gateway.url("/ui/log")).body(body).send().await.unwrap();
        assert_eq!(res.status(), 204);
    }

    let meter = &gateway.meter;
    assert_eq!(meter.value(UI_EVENTS, &attributes([("name", "button.click")])), 2.0);
    assert_eq!(meter.value(UI_EVENTS, &attributes([("name", "ui.event")])), 2.0);
}

#[tokio::test]
async fn test_concurrent_ui_metrics_sum_exactly() {
    let gateway = start_gateway(test_config(closed_port().await)).await;
    let client = client();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let client = client.clone();
        let url = gateway.url("/ui/metric");
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .body(r#"{"name":"cart.add","value":0.5}"#)
                .send()
                .await
                .unwrap()
                .status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 204);
    }

    let value = gateway
        .meter
        .value(UI_EVENTS, &attributes([("name", "cart.add")]));
    assert_eq!(value, 25.0);
}

#[tokio::test]
async fn test_static_files_are_served_as_fallback() {
    let gateway = start_gateway(test_config(closed_port().await)).await;
    let client = client();

    let res = client.get(gateway.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.text().await.unwrap().contains("paypal-button-container"));

    let res = client.get(gateway.url("/missing.js")).send().await.unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_graceful_shutdown_stops_accepting() {
    let gateway = start_gateway(test_config(closed_port().await)).await;
    let url = gateway.url("/clientid");
    let client = client();

    assert_eq!(client.get(&url).send().await.unwrap().status(), 200);

    gateway.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(client.get(&url).send().await.is_err());
}
