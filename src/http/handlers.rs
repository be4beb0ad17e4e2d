//! Route handlers.
//!
//! Display handlers read the node flags exactly once, through
//! [`NodeState::snapshot`](crate::node::NodeState::snapshot). Control routes
//! apply their mutation, then render the flag they set as the command's value
//! and read only the other flag.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::health::HealthStatus;
use crate::http::response::{render_health, render_index};
use crate::http::server::AppState;
use crate::metadata::InstanceInfo;
use crate::node::NodeSnapshot;

/// Body of `GET /status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub instance: InstanceInfo,
    #[serde(flatten)]
    pub snapshot: NodeSnapshot,
}

/// `GET /`: instance info and current flags.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.node.snapshot();
    let info = state.metadata.instance_info().await;
    Html(render_index(&info, snapshot))
}

/// `GET /health`: 200 when healthy, 500 when unhealthy.
pub async fn health(State(state): State<AppState>) -> Response {
    let status = state.node.snapshot().health_status();
    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, Html(render_health(status))).into_response()
}

/// `GET /status`: the index data as JSON.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.node.snapshot();
    let instance = state.metadata.instance_info().await;
    Json(StatusResponse { instance, snapshot })
}

/// `GET /makeHealthy`
pub async fn make_healthy(State(state): State<AppState>) -> Response {
    state.node.health().set_healthy();
    let snapshot = NodeSnapshot {
        healthy: true,
        working: state.node.load().is_running(),
    };
    redirect_home(&state, snapshot).await
}

/// `GET /makeUnhealthy`
pub async fn make_unhealthy(State(state): State<AppState>) -> Response {
    state.node.health().set_unhealthy();
    let snapshot = NodeSnapshot {
        healthy: false,
        working: state.node.load().is_running(),
    };
    redirect_home(&state, snapshot).await
}

/// `GET /startLoad`
pub async fn start_load(State(state): State<AppState>) -> Response {
    state.node.load().start();
    let snapshot = NodeSnapshot {
        healthy: state.node.health().is_healthy(),
        working: true,
    };
    redirect_home(&state, snapshot).await
}

/// `GET /stopLoad`
pub async fn stop_load(State(state): State<AppState>) -> Response {
    state.node.load().stop();
    let snapshot = NodeSnapshot {
        healthy: state.node.health().is_healthy(),
        working: false,
    };
    redirect_home(&state, snapshot).await
}

/// 302 to `/`, with the index page as body.
///
/// The mutated flag comes from the command itself, not a re-read: a racing
/// opposite command must not show up in this caller's response.
async fn redirect_home(state: &AppState, snapshot: NodeSnapshot) -> Response {
    let info = state.metadata.instance_info().await;
    (
        StatusCode::FOUND,
        [(header::LOCATION, "/")],
        Html(render_index(&info, snapshot)),
    )
        .into_response()
}
