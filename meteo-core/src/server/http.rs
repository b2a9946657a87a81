use std::{convert::Infallible, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use chrono::Utc;
use futures::stream;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{
    config::{ServerConfig, normalize_token},
    provider::WeatherProvider,
    rpc::{Dispatcher, PROTOCOL_VERSION, SERVER_NAME},
    tools,
};

#[derive(Clone)]
struct AppState {
    dispatcher: Dispatcher,
    config: Arc<ServerConfig>,
}

/// Build the HTTP surface: JSON-RPC on `POST /mcp`, an info document on
/// `GET /mcp`, a one-shot SSE variant on `/mcp/sse`, and an unauthenticated
/// liveness document on `GET /health`.
pub fn router(provider: Arc<dyn WeatherProvider>, config: ServerConfig) -> Router {
    let state = AppState {
        dispatcher: Dispatcher::new(provider),
        config: Arc::new(config),
    };

    Router::new()
        .route("/mcp", get(handle_info).post(handle_rpc))
        .route("/mcp/sse", get(handle_sse).post(handle_sse))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(provider: Arc<dyn WeatherProvider>, config: ServerConfig) -> Result<()> {
    let addr = config.http_addr.clone();
    if !config.auth_required() {
        warn!("MCP_AUTH_TOKEN is not set, HTTP routes are unprotected");
    }

    let app = router(provider, config);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;

    info!("HTTP transport listening on {addr}");

    axum::serve(listener, app).await.context("HTTP server error")?;
    Ok(())
}

/// Bearer-token gate shared by every route except `/health`. Without a
/// configured token the gate is a no-op.
fn authorized(headers: &HeaderMap, config: &ServerConfig) -> bool {
    let Some(expected) = config.auth_token.as_deref() else {
        return true;
    };

    let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let mut parts = value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or("");
    let received = parts.next().unwrap_or("");

    scheme.eq_ignore_ascii_case("bearer") && normalize_token(received) == expected
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

async fn handle_rpc(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    if !authorized(&headers, &state.config) {
        return unauthorized();
    }

    match state.dispatcher.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        // Notifications get an acknowledgement without a body.
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn handle_info(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authorized(&headers, &state.config) {
        return unauthorized();
    }

    let tool_names: Vec<&str> = tools::all().iter().map(|tool| tool.name.as_str()).collect();

    Json(json!({
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {"tools": {}},
        "endpoints": {
            "rpc": "POST /mcp",
            "sse": "GET|POST /mcp/sse",
            "health": "GET /health",
        },
        "tools": tool_names,
    }))
    .into_response()
}

/// One-shot SSE framing: the body is dispatched like a `POST /mcp` request
/// and the response, if any, is emitted as a single `data:` event before the
/// stream closes. Not a persistent bidirectional channel.
async fn handle_sse(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    if !authorized(&headers, &state.config) {
        return unauthorized();
    }

    let mut events: Vec<std::result::Result<Event, Infallible>> = Vec::new();
    if let Some(response) = state.dispatcher.handle_message(&body).await
        && let Ok(event) = Event::default().json_data(&response)
    {
        events.push(Ok(event));
    }

    Sse::new(stream::iter(events)).keep_alive(KeepAlive::default()).into_response()
}

/// Liveness document, reachable without authentication.
async fn handle_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
        "auth_required": state.config.auth_required(),
    }))
}
