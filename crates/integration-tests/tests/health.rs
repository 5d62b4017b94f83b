use indoc::indoc;
use integration_tests::TestServer;
use serde_json::Value;

#[tokio::test]
async fn health_reports_providers() {
    let server = TestServer::spawn(indoc! {r#"
        [metrics.demo]
        enabled = false
    "#})
    .await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();

    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_i64());

    let providers: Vec<&str> = body["providers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();

    assert_eq!(providers, vec!["cerebras", "openrouter", "llama"]);
}

#[tokio::test]
async fn mcp_listed_when_configured() {
    let server = TestServer::spawn(indoc! {r#"
        [llm.mcp]
        url = "http://127.0.0.1:8811"

        [metrics.demo]
        enabled = false
    "#})
    .await;

    let body: Value = server.client.get("/health").await.json().await.unwrap();

    let providers: Vec<&str> = body["providers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();

    assert_eq!(providers, vec!["cerebras", "openrouter", "llama", "mcp"]);
}

#[tokio::test]
async fn health_endpoint_can_be_disabled() {
    let server = TestServer::spawn(indoc! {r#"
        [server.health]
        enabled = false

        [metrics.demo]
        enabled = false
    "#})
    .await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn health_timestamp_is_current() {
    let server = TestServer::spawn(indoc! {r#"
        [metrics.demo]
        enabled = false
    "#})
    .await;

    let body: Value = server.client.get("/health").await.json().await.unwrap();

    // epoch milliseconds, so any current reading is comfortably past 2023
    assert!(body["timestamp"].as_i64().unwrap() > 1_700_000_000_000);
}
