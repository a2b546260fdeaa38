//! HTTP surface: one axum route per logical operation, plus liveness routes.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{MethodRouter, get};
use axum::{Json, Router};
use http::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::constants::server::BANNER;
use crate::error::AppError;
use crate::gateway::{EnvelopeBody, Gateway, LogicalRequest, Operation};

/// Route path for each operation. `/proxy/nba` is kept as an alias for
/// existing clients.
pub const OPERATION_PATHS: &[(&str, Operation)] = &[
    ("/nba/player_stats", Operation::NbaPlayerStats),
    ("/proxy/nba", Operation::NbaPlayerStats),
    ("/soccer/player_stats", Operation::SoccerPlayerStats),
    ("/soccer/fixtures", Operation::SoccerFixtures),
    (
        "/soccer/fixtures/football-data",
        Operation::SoccerFixturesFootballData,
    ),
    ("/esports/player_stats", Operation::EsportsPlayerStats),
    ("/odds", Operation::Odds),
];

/// Builds the router with the gateway as shared state.
pub fn router(gateway: Arc<Gateway>) -> Router {
    let mut router = Router::new()
        .route("/", get(banner))
        .route("/ping", get(ping))
        .route("/health", get(ping));

    for (path, operation) in OPERATION_PATHS {
        router = router.route(path, operation_route(*operation));
    }

    router.with_state(gateway)
}

fn operation_route(operation: Operation) -> MethodRouter<Arc<Gateway>> {
    get(
        move |State(gateway): State<Arc<Gateway>>,
              Query(query): Query<HashMap<String, String>>| async move {
            handle(&gateway, operation, &query).await
        },
    )
}

async fn handle(
    gateway: &Gateway,
    operation: Operation,
    query: &HashMap<String, String>,
) -> (StatusCode, Json<EnvelopeBody>) {
    let request = LogicalRequest::from_query(operation, query);
    let envelope = gateway.dispatch(&request).await;
    (envelope.status, Json(envelope.body))
}

async fn banner() -> &'static str {
    BANNER
}

async fn ping() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "message": "pong" })))
}

/// Binds the listener and serves until Ctrl-C.
///
/// # Arguments
/// * `gateway` - Shared gateway used by every request
/// * `address` - `host:port` to bind
///
/// # Returns
/// * `Ok(())` - Server shut down gracefully
/// * `Err(AppError::Io)` - Bind or accept loop failure
pub async fn serve(gateway: Arc<Gateway>, address: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(address).await?;
    info!("Sports gateway listening on {}", listener.local_addr()?);

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Sports gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C, shutting down: {e}");
    }
}
