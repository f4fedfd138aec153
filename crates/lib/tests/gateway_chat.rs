//! Integration tests: start the gateway on a free port and exercise the
//! /api/chat relay contract against a stub provider. Does not require a real
//! Gemini key. Server tasks are left running when a test ends.

use lib::config::Config;
use lib::gateway::{self, GatewayClient, Relay};
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// Serve a Gemini-shaped generateContent response on a free port; returns the port.
async fn spawn_stub_provider(reply: &'static str) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub provider");
    let port = listener.local_addr().expect("local_addr").port();
    let app = axum::Router::new().route(
        "/v1beta/models/:call",
        axum::routing::post(move || async move {
            axum::Json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": reply}]}}]
            }))
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    port
}

/// Start the gateway against the given provider port; returns the gateway base URL.
fn spawn_gateway(provider_port: u16) -> String {
    let port = free_port();
    let mut config = Config::default();
    config.gateway.port = port;
    config.gateway.bind = "127.0.0.1".to_string();
    config.provider.api_key = Some("test-key".to_string());
    config.provider.base_url = Some(format!("http://127.0.0.1:{}", provider_port));
    tokio::spawn(async move {
        let _ = gateway::run_gateway(config).await;
    });
    format!("http://127.0.0.1:{}", port)
}

/// Poll until the gateway answers its health probe.
async fn wait_ready(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(format!("{}/", base_url)).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("gateway at {} did not become ready within 5s", base_url);
}

#[tokio::test]
async fn gateway_health_responds_with_running() {
    let provider_port = spawn_stub_provider("unused").await;
    let base_url = spawn_gateway(provider_port);
    wait_ready(&base_url).await;

    let resp = reqwest::get(format!("{}/", base_url)).await.expect("GET /");
    let json: serde_json::Value = resp.json().await.expect("parse JSON");
    assert_eq!(json.get("runtime").and_then(|v| v.as_str()), Some("running"));
    assert_eq!(
        json.get("model").and_then(|v| v.as_str()),
        Some("gemini-2.0-flash-001")
    );
}

#[tokio::test]
async fn chat_relays_message_and_returns_reply() {
    let provider_port = spawn_stub_provider("Hi from the stub").await;
    let base_url = spawn_gateway(provider_port);
    wait_ready(&base_url).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/chat", base_url))
        .json(&serde_json::json!({ "message": "hello" }))
        .send()
        .await
        .expect("POST /api/chat");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let json: serde_json::Value = resp.json().await.expect("parse JSON");
    assert_eq!(
        json.get("reply").and_then(|v| v.as_str()),
        Some("Hi from the stub")
    );
}

#[tokio::test]
async fn chat_maps_provider_failure_to_500_error_body() {
    // No stub bound on this port, so the provider call fails at connect.
    let unreachable = free_port();
    let base_url = spawn_gateway(unreachable);
    wait_ready(&base_url).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/chat", base_url))
        .json(&serde_json::json!({ "message": "hello" }))
        .send()
        .await
        .expect("POST /api/chat");
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = resp.json().await.expect("parse JSON");
    assert_eq!(
        json.get("error").and_then(|v| v.as_str()),
        Some("Something went wrong.")
    );
}

#[tokio::test]
async fn gateway_client_round_trips_a_reply() {
    let provider_port = spawn_stub_provider("relayed").await;
    let base_url = spawn_gateway(provider_port);
    wait_ready(&base_url).await;

    let relay = GatewayClient::new(base_url);
    let reply = relay.relay("hello").await.expect("relay");
    assert_eq!(reply.as_deref(), Some("relayed"));
}

#[tokio::test]
async fn gateway_client_surfaces_500_as_error() {
    let unreachable = free_port();
    let base_url = spawn_gateway(unreachable);
    wait_ready(&base_url).await;

    let relay = GatewayClient::new(base_url);
    let err = relay.relay("hello").await.expect_err("relay should fail");
    assert!(err.to_string().contains("500"), "got: {}", err);
}
