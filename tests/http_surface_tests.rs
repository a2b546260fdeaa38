use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode};
use serde_json::{Value, json};
use sports_gateway::gateway::{Credentials, Gateway, ProviderTable, ReqwestTransport};
use sports_gateway::server::router;
use sports_gateway::testing_utils::config_with_base_url;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(server: &MockServer, credentials: Credentials) -> Router {
    let config = config_with_base_url(&server.uri());
    let providers = ProviderTable::from_config(&config, &credentials).unwrap();
    let transport = ReqwestTransport::new(5).unwrap();
    let gateway = Gateway::new(providers, Arc::new(transport)).unwrap();
    router(Arc::new(gateway))
}

async fn get_path(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_nba_lookup_over_http_with_api_key() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/players"))
        .and(query_param("search", "lebron james"))
        .and(header("authorization", "bdl-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 237}]})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/season_averages"))
        .and(query_param("season", "2022"))
        .and(query_param("player_ids[]", "237"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"data":[{"player_id":237,"pts":28.9}]}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    let credentials = Credentials::from_pairs([("BALLDONTLIE_API_KEY", "bdl-key")]).unwrap();

    let (status, body) = get_path(
        app(&mock_server, credentials),
        "/nba/player_stats?player=lebron%20james&season=2022",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"status":"success","body":{"data":[{"player_id":237,"pts":28.9}]}}"#
    );
}

#[tokio::test]
async fn test_odds_key_is_sent_as_query_parameter() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sports/basketball_nba/odds"))
        .and(query_param("apiKey", "odds-key"))
        .and(query_param("regions", "eu"))
        .and(query_param("markets", "h2h"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&mock_server)
        .await;
    let credentials = Credentials::from_pairs([("ODDS_API_KEY", "odds-key")]).unwrap();

    let (status, body) = get_path(
        app(&mock_server, credentials),
        "/odds?sport=basketball_nba&region=eu",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"success","body":[]}"#);
}

#[tokio::test]
async fn test_pandascore_uses_bearer_token() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/players"))
        .and(query_param("search[name]", "faker"))
        .and(header("authorization", "Bearer panda"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 585, "name": "Faker"}])))
        .expect(1)
        .mount(&mock_server)
        .await;
    let credentials = Credentials::from_pairs([("PANDASCORE_TOKEN", "panda")]).unwrap();

    let (status, _) = get_path(
        app(&mock_server, credentials),
        "/esports/player_stats?player=faker",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_provider_rate_limit_is_forwarded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fixtures"))
        .respond_with(ResponseTemplate::new(429).set_body_string(r#"{"errors":"rate"}"#))
        .mount(&mock_server)
        .await;

    let (status, body) = get_path(
        app(&mock_server, Credentials::default()),
        "/soccer/fixtures?league=39&season=2023",
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["code"], "provider_error");
    assert_eq!(value["error"], "api_football returned HTTP 429: Too Many Requests");
}

#[tokio::test]
async fn test_nba_malformed_search_is_500_with_raw_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/players"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/season_averages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, body) = get_path(
        app(&mock_server, Credentials::default()),
        "/nba/player_stats?player=lebron&season=2022",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        r#"{"status":"error","code":"malformed_provider_response","error":"Error parsing JSON from balldontlie search","raw_response":"<html>oops</html>"}"#
    );
}

#[tokio::test]
async fn test_missing_parameters_never_reach_provider() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, _) = get_path(
        app(&mock_server, Credentials::default()),
        "/soccer/player_stats?player=messi",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dot_segment_sport_is_rejected_before_provider_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, body) = get_path(
        app(&mock_server, Credentials::default()),
        "/odds?sport=..&region=eu",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["code"], "invalid_parameter");
}
