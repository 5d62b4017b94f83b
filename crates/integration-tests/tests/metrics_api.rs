use std::time::Duration;

use indoc::{formatdoc, indoc};
use integration_tests::{TestServer, llms::OpenAIMock};
use serde_json::{Value, json};

fn cerebras_config(url: &str) -> String {
    formatdoc! {r#"
        [llm.cerebras]
        api_key = "test-key"
        base_url = "{url}"

        [metrics.demo]
        enabled = false
    "#}
}

#[tokio::test]
async fn empty_store_reads() {
    let server = TestServer::spawn(indoc! {r#"
        [metrics.demo]
        enabled = false
    "#})
    .await;

    let latest: Value = server.client.get("/metrics/latest").await.json().await.unwrap();
    assert_eq!(latest["ok"], true);
    assert_eq!(latest["metrics"], Value::Null);

    let all: Value = server.client.get("/metrics/all").await.json().await.unwrap();
    assert_eq!(all["ok"], true);
    assert_eq!(all["count"], 0);
    assert_eq!(all["metrics"], json!([]));

    // zeroed aggregates, never NaN
    let aggregates: Value = server.client.get("/metrics/aggregates").await.json().await.unwrap();
    assert_eq!(aggregates["ok"], true);
    assert_eq!(aggregates["sampleSize"], 0);
    assert_eq!(aggregates["aggregates"]["avgLatency"], 0.0);
    assert_eq!(aggregates["aggregates"]["avgCost"], 0.0);
    assert_eq!(aggregates["aggregates"]["errorRate"], 0.0);
}

#[tokio::test]
async fn reads_are_idempotent() {
    let mock = OpenAIMock::new().spawn().await;
    let server = TestServer::spawn(&cerebras_config(&mock.url)).await;

    server
        .client
        .post("/call", &json!({ "prompt": "hi" }))
        .await
        .unwrap();

    let first: Value = server.client.get("/metrics/all").await.json().await.unwrap();
    let second: Value = server.client.get("/metrics/all").await.json().await.unwrap();
    assert_eq!(first, second);

    let first: Value = server.client.get("/metrics/aggregates").await.json().await.unwrap();
    let second: Value = server.client.get("/metrics/aggregates").await.json().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn aggregates_mix_successes_and_errors() {
    let mock = OpenAIMock::new().spawn().await;
    let server = TestServer::spawn(&cerebras_config(&mock.url)).await;

    server
        .client
        .post("/call", &json!({ "prompt": "hi" }))
        .await
        .unwrap();

    server
        .client
        .post("/call", &json!({ "provider": "not-a-provider", "prompt": "hi" }))
        .await
        .unwrap();

    let response: Value = server.client.get("/metrics/aggregates").await.json().await.unwrap();

    assert_eq!(response["sampleSize"], 2);
    assert_eq!(response["aggregates"]["errorRate"], 0.5);
    assert!(response["aggregates"]["avgLatency"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn aggregates_count_parameter_bounds_the_window() {
    let mock = OpenAIMock::new().spawn().await;
    let server = TestServer::spawn(&cerebras_config(&mock.url)).await;

    for _ in 0..3 {
        server
            .client
            .post("/call", &json!({ "prompt": "hi" }))
            .await
            .unwrap();
    }

    let response: Value = server
        .client
        .get("/metrics/aggregates?count=2")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(response["sampleSize"], 2);

    let response: Value = server
        .client
        .get("/metrics/aggregates?count=50")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(response["sampleSize"], 3);
}

#[tokio::test]
async fn store_eviction_caps_retained_records() {
    let config = indoc! {r#"
        [metrics]
        max_size = 3

        [metrics.demo]
        enabled = false
    "#};

    let server = TestServer::spawn(config).await;

    // unknown-provider calls append error records without touching a network
    for n in 0..5 {
        server
            .client
            .post("/call", &json!({ "provider": format!("nope-{n}"), "prompt": "hi" }))
            .await
            .unwrap();
    }

    let all: Value = server.client.get("/metrics/all").await.json().await.unwrap();

    assert_eq!(all["count"], 3);

    // FIFO: the three newest survive, in insertion order
    assert_eq!(all["metrics"][0]["provider"], "nope-2");
    assert_eq!(all["metrics"][1]["provider"], "nope-3");
    assert_eq!(all["metrics"][2]["provider"], "nope-4");
}

#[tokio::test]
async fn prometheus_exposition() {
    let mock = OpenAIMock::new().with_usage(7, 3, Some(10)).spawn().await;
    let server = TestServer::spawn(&cerebras_config(&mock.url)).await;

    server
        .client
        .post("/call", &json!({ "prompt": "hi" }))
        .await
        .unwrap();

    let response = server.client.get("/metrics").await;

    assert_eq!(response.status(), 200);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    assert_eq!(content_type, "text/plain; version=0.0.4");

    let body = response.text().await.unwrap();

    assert!(body.contains("llm_requests_total 1\n"));
    assert!(body.contains("llm_errors_total 0\n"));
    assert!(body.contains(r#"llm_requests_total{provider="cerebras",model="llama3.1-8b",status="success"} 1"#));
    assert!(body.contains(r#"llm_requests_total{provider="cerebras",model="llama3.1-8b",status="error"} 0"#));
    assert!(body.contains(r#"llm_request_duration_ms{provider="cerebras",model="llama3.1-8b",stat="avg"}"#));
    assert!(body.contains(r#"llm_request_duration_ms{provider="cerebras",model="llama3.1-8b",stat="latest"}"#));
    assert!(body.contains(r#"llm_tokens_total{provider="cerebras",model="llama3.1-8b"} 10"#));
    assert!(body.contains(r#"llm_request_cost_usd{provider="cerebras",model="llama3.1-8b"}"#));
}

#[tokio::test]
async fn prometheus_endpoint_can_be_disabled() {
    let config = indoc! {r#"
        [metrics.demo]
        enabled = false

        [metrics.prometheus]
        enabled = false
    "#};

    let server = TestServer::spawn(config).await;

    let response = server.client.get("/metrics").await;
    assert_eq!(response.status(), 404);

    // the JSON read routes stay up
    let all: Value = server.client.get("/metrics/all").await.json().await.unwrap();
    assert_eq!(all["ok"], true);
}

#[tokio::test]
async fn prometheus_endpoint_path_is_configurable() {
    let config = indoc! {r#"
        [metrics.demo]
        enabled = false

        [metrics.prometheus]
        path = "/prom"
    "#};

    let server = TestServer::spawn(config).await;

    assert_eq!(server.client.get("/metrics").await.status(), 404);

    let response = server.client.get("/prom").await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("llm_requests_total 0\n"));
}

#[tokio::test]
async fn demo_generator_populates_the_store() {
    let config = indoc! {r#"
        [metrics.demo]
        enabled = true
        interval = "25ms"
    "#};

    let server = TestServer::spawn(config).await;

    tokio::time::sleep(Duration::from_millis(300)).await;

    let all: Value = server.client.get("/metrics/all").await.json().await.unwrap();

    let count = all["count"].as_u64().unwrap();
    assert!(count >= 2, "expected demo records, got {count}");

    for record in all["metrics"].as_array().unwrap() {
        assert_eq!(record["provider"], "demo");

        let latency = record["latencyMs"].as_f64().unwrap();
        assert!((50.0..=250.0).contains(&latency));
        assert_eq!(record["error"], Value::Null);
    }
}
