//! `RugCheckClient` against a local mock of the rugcheck API.

use {
    httpmock::{Method, MockServer},
    serde_json::json,
    sol_token_detector::{
        models::token::RiskTier, JsonFileStore, MonitorConfig, MonitorManager, RecordStore, RugCheckClient,
        TokenSource,
    },
    std::{sync::Arc, time::Duration},
    tempfile::tempdir,
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
};

fn client(server: &MockServer) -> RugCheckClient {
    RugCheckClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn discovery_returns_tokens_in_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::GET)
                .path("/stats/new_tokens")
                .header("accept", "application/json");
            then.status(200).json_body(json!([
                {"mint": "A", "symbol": "AAA", "creator": "C1"},
                {"mint": "B"}
            ]));
        })
        .await;

    let tokens = client(&server).fetch_new_tokens().await;

    mock.assert_async().await;
    let mints: Vec<&str> = tokens.iter().map(|t| t.mint.as_str()).collect();
    assert_eq!(mints, vec!["A", "B"]);
    assert_eq!(tokens[0].symbol.as_deref(), Some("AAA"));
}

#[tokio::test]
async fn discovery_server_error_is_empty() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/stats/new_tokens");
            then.status(500).body("internal error");
        })
        .await;

    assert!(client(&server).fetch_new_tokens().await.is_empty());
}

#[tokio::test]
async fn discovery_non_json_body_is_empty() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/stats/new_tokens");
            then.status(200).header("content-type", "text/html").body("<html>busy</html>");
        })
        .await;

    assert!(client(&server).fetch_new_tokens().await.is_empty());
}

#[tokio::test]
async fn summary_ok_is_decoded() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::GET)
                .path("/tokens/Mint111/report/summary")
                .header("accept", "application/json");
            then.status(200).json_body(json!({
                "score_normalised": 88,
                "tokenMeta": {"name": "Dog Coin", "symbol": "DOG"},
                "risks": [{"name": "Mutable metadata", "level": "warn", "description": "can change"}]
            }));
        })
        .await;

    let report = client(&server).fetch_token_summary("Mint111").await.unwrap();

    mock.assert_async().await;
    assert_eq!(report.score_normalised, Some(88));
    assert_eq!(report.token_meta.name.as_deref(), Some("Dog Coin"));
    assert_eq!(report.risks.len(), 1);
}

#[tokio::test]
async fn summary_error_statuses_are_unavailable() {
    for status in [404, 500] {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/tokens/Mint111/report/summary");
                then.status(status).json_body(json!({"score_normalised": 99}));
            })
            .await;

        assert!(client(&server).fetch_token_summary("Mint111").await.is_none());
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn summary_empty_or_non_json_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/tokens/Empty/report/summary");
            then.status(200).json_body(json!({}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/tokens/Html/report/summary");
            then.status(200).body("not json");
        })
        .await;

    let client = client(&server);
    assert!(client.fetch_token_summary("Empty").await.is_none());
    assert!(client.fetch_token_summary("Html").await.is_none());
}

#[tokio::test]
async fn odd_summary_fields_still_save_safe_token() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/stats/new_tokens");
            then.status(200).json_body(json!([{"mint": "Safe1", "symbol": "SAFE"}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/tokens/Safe1/report/summary");
            then.status(200).json_body(json!({
                "tokenProgram": 7,
                "tokenType": null,
                "score": 1.5,
                "score_normalised": 90,
                "creator": "Crea7or",
                "risks": [{"name": "Top holders", "value": 12, "score": "n/a", "level": "warn"}]
            }));
        })
        .await;

    let dir = tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("safe_to_buy.json")));
    let (tx, mut rx) = mpsc::channel(100);
    let config = MonitorConfig {
        score_threshold: 81,
        polling_interval: 3600,
        api_timeout: 10,
    };
    let mut monitor = MonitorManager::new(&config, Arc::new(client(&server)), store.clone(), tx);

    let cycle = monitor.run_cycle(&CancellationToken::new()).await.unwrap();
    assert_eq!(cycle.processed, 1);
    assert_eq!(cycle.stored, 1);

    let report = rx.try_recv().unwrap();
    assert_eq!(report.entry.risk, RiskTier::Low);
    assert!(report.stored);
    assert!(report.to_string().contains("• Top holders (warn) - "));

    let saved = store.load_entries();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].mint, "Safe1");
    assert_eq!(saved[0].symbol, "SAFE");
    assert_eq!(saved[0].creator, "Crea7or");
    assert_eq!(saved[0].score_normalised, Some(90));
}
