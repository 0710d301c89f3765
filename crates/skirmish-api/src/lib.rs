//! Skirmish API - REST surface over the matchmaking engine
//!
//! This crate is the only coupling point between HTTP and the engine
//! façade: it parses requests, dispatches to [`Engine`] operations and maps
//! the closed error taxonomy to status codes.
//!
//! # Endpoints
//!
//! - `POST /leaderboard/join?player_id={id}` - Match a player or enqueue them
//! - `POST /leaderboard/score` - Add score to the player's competition
//! - `GET /leaderboard/{leaderboardID}` - Competition leaderboard
//! - `GET /leaderboard/player/{playerID}` - Player's current competition
//! - `GET /health` - Liveness probe
//! - `GET /metrics` - Prometheus counters (when a recorder is installed)

use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use skirmish_core::{Engine, SkirmishError};

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    engine: Engine,
    metrics: Option<PrometheusHandle>,
}

/// Build the API router.
///
/// Pass the handle of an installed Prometheus recorder to serve `/metrics`;
/// without one the route reports 404.
pub fn router(engine: Engine, metrics: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route("/leaderboard/join", post(join))
        .route("/leaderboard/score", post(submit_score))
        .route("/leaderboard/player/:player_id", get(player_leaderboard))
        .route("/leaderboard/:leaderboard_id", get(leaderboard))
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .with_state(ApiState { engine, metrics })
}

#[derive(Debug, Deserialize)]
struct JoinQuery {
    #[serde(default)]
    player_id: String,
}

async fn join(State(state): State<ApiState>, Query(query): Query<JoinQuery>) -> Response {
    if query.player_id.is_empty() {
        return (StatusCode::BAD_REQUEST, "Player ID is required").into_response();
    }

    match state.engine.join(&query.player_id) {
        Ok(competition) => {
            let lifecycle = competition.lifecycle();
            match lifecycle.ends_at {
                // Matched straight into a started competition.
                Some(ends_at) => (
                    StatusCode::OK,
                    Json(json!({
                        "leaderboard_id": competition.id(),
                        "ends_at": ends_at.timestamp(),
                    })),
                )
                    .into_response(),
                // Queued until the competition fills or the deadline fires.
                None => (
                    StatusCode::ACCEPTED,
                    Json(json!({ "message": "Player queued for matchmaking" })),
                )
                    .into_response(),
            }
        }
        Err(SkirmishError::PlayerIdEmpty) => {
            (StatusCode::BAD_REQUEST, "Player ID is required").into_response()
        }
        Err(SkirmishError::PlayerNotFound) => {
            (StatusCode::BAD_REQUEST, "Player not found").into_response()
        }
        Err(SkirmishError::PlayerAlreadyInCompetition) => {
            (StatusCode::CONFLICT, "Player already in competition").into_response()
        }
        Err(error) => internal_error("join", error),
    }
}

#[derive(Debug, Deserialize)]
struct ScoreRequest {
    #[serde(default)]
    player_id: String,
    #[serde(default)]
    score: i64,
}

async fn submit_score(
    State(state): State<ApiState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
    };

    match state.engine.submit_score(&request.player_id, request.score) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(SkirmishError::PlayerIdEmpty) => {
            (StatusCode::BAD_REQUEST, "Player ID is required").into_response()
        }
        Err(SkirmishError::PointsNegative) => (
            StatusCode::BAD_REQUEST,
            "Score must be a non-negative integer",
        )
            .into_response(),
        Err(SkirmishError::PlayerNotFound) => {
            (StatusCode::NOT_FOUND, "Player not found").into_response()
        }
        Err(SkirmishError::PlayerNotInCompetition) => (
            StatusCode::CONFLICT,
            "Player is not in a competition, cannot add score",
        )
            .into_response(),
        Err(SkirmishError::CompetitionNotStarted) => (
            StatusCode::CONFLICT,
            "Competition has not started yet, cannot add score",
        )
            .into_response(),
        Err(SkirmishError::CompetitionEnded) => (
            StatusCode::CONFLICT,
            "Competition has ended, cannot add score",
        )
            .into_response(),
        Err(error) => internal_error("submit_score", error),
    }
}

async fn leaderboard(
    State(state): State<ApiState>,
    Path(leaderboard_id): Path<String>,
) -> Response {
    match state.engine.leaderboard(&leaderboard_id) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(SkirmishError::LeaderboardIdEmpty) => {
            (StatusCode::BAD_REQUEST, "Leaderboard ID cannot be empty").into_response()
        }
        Err(SkirmishError::CompetitionNotFound) => {
            (StatusCode::NOT_FOUND, "Leaderboard not found").into_response()
        }
        Err(error) => internal_error("leaderboard", error),
    }
}

async fn player_leaderboard(
    State(state): State<ApiState>,
    Path(player_id): Path<String>,
) -> Response {
    match state.engine.player_leaderboard(&player_id) {
        Ok(Some(view)) => (StatusCode::OK, Json(view)).into_response(),
        // Still waiting for matchmaking: 200 with an empty body.
        Ok(None) => StatusCode::OK.into_response(),
        Err(SkirmishError::PlayerIdEmpty) => {
            (StatusCode::BAD_REQUEST, "Player ID is required").into_response()
        }
        Err(SkirmishError::PlayerNotFound) => {
            (StatusCode::BAD_REQUEST, "Player not found").into_response()
        }
        Err(SkirmishError::PlayerNotInCompetition) => {
            (StatusCode::NOT_FOUND, "Player is not in a competition").into_response()
        }
        Err(error) => internal_error("player_leaderboard", error),
    }
}

async fn health() -> Response {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}

async fn render_metrics(State(state): State<ApiState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

fn internal_error(operation: &str, error: SkirmishError) -> Response {
    error!(%error, operation, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
