//! HTTP API — axum routes in front of the fetcher and aggregator.
//!
//! Routes:
//! - `GET /health` — liveness probe
//! - `GET /get_recent_messages?channel_id=<id>&limit=<n>` — one channel
//! - `GET /get_recent_activity_from_all_channels` — every configured channel
//!
//! Input problems are answered with 400 before any platform call. Fetch
//! failures map to 404 / 403 / 500 on the single-channel route and are
//! embedded in a 200 report on the all-channels route.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use scribe_activity::{ActivityAggregator, ChannelFetcher};
use scribe_channels::ChatPlatform;
use scribe_core::{
    ActivityReport, ChannelActivity, ChannelId, FetchErrorKind, FetchFailure, FetchLimit,
};

/// Shared, immutable state for all handlers.
#[derive(Clone)]
pub struct AppState {
    fetcher: ChannelFetcher,
    aggregator: ActivityAggregator,
    channels: Arc<[ChannelId]>,
    per_channel_limit: FetchLimit,
}

impl AppState {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        channels: Vec<ChannelId>,
        per_channel_limit: FetchLimit,
    ) -> Self {
        let fetcher = ChannelFetcher::new(platform);
        Self {
            aggregator: ActivityAggregator::new(fetcher.clone()),
            fetcher,
            channels: channels.into(),
            per_channel_limit,
        }
    }

    pub fn fetcher(&self) -> &ChannelFetcher {
        &self.fetcher
    }

    pub fn channels(&self) -> &[ChannelId] {
        &self.channels
    }

    /// Run the aggregator over the configured channels.
    pub async fn activity_report(&self) -> ActivityReport {
        self.aggregator
            .aggregate(&self.channels, self.per_channel_limit)
            .await
    }
}

/// Build the axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/get_recent_messages", get(get_recent_messages))
        .route(
            "/get_recent_activity_from_all_channels",
            get(get_all_channels_activity),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(addr = %addr, channels = state.channels.len(), "scribe API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, shutting down");
        })
        .await
        .context("server error")
}

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Everything a handler can answer other than success.
#[derive(Debug)]
enum ApiError {
    /// Bad request parameters; never reaches the platform.
    InvalidInput(String),
    /// Classified platform failure.
    Fetch(FetchFailure),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Fetch(failure) => (status_for(failure.error_kind), Json(failure)).into_response(),
        }
    }
}

fn status_for(kind: FetchErrorKind) -> StatusCode {
    match kind {
        FetchErrorKind::ChannelNotFound => StatusCode::NOT_FOUND,
        FetchErrorKind::AccessForbidden => StatusCode::FORBIDDEN,
        FetchErrorKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

/// Raw query parameters; validated by the handler so every problem gets a
/// JSON 400 instead of axum's plain-text rejection.
#[derive(Debug, Deserialize)]
struct RecentMessagesQuery {
    channel_id: Option<String>,
    limit: Option<String>,
}

async fn get_recent_messages(
    State(state): State<AppState>,
    Query(query): Query<RecentMessagesQuery>,
) -> Result<Json<ChannelActivity>, ApiError> {
    let raw_id = query
        .channel_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ApiError::InvalidInput("Missing required query parameter 'channel_id'".into())
        })?;
    let channel_id =
        ChannelId::parse(raw_id).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    let limit = FetchLimit::parse(query.limit.as_deref())
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    debug!(channel = %channel_id, limit = limit.get(), "single-channel fetch requested");

    state
        .fetcher
        .fetch(&channel_id, limit)
        .await
        .map(Json)
        .map_err(ApiError::Fetch)
}

async fn get_all_channels_activity(State(state): State<AppState>) -> Json<ActivityReport> {
    Json(state.activity_report().await)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
