//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::state::AppState;
use super::responses::{ApiResponse, ConfigureRequest, HealthResponse, StartRequest, StatusResponse};

type HandlerResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

fn internal_error(message: String) -> (StatusCode, Json<ApiResponse>) {
    error!("{}", message);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error(message)))
}

/// Handle POST /zookeeper/configure - Write zoo.cfg and myid
pub async fn configure_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigureRequest>,
) -> HandlerResult {
    let _guard = state.begin_operation("configure").await;

    match state.zookeeper.configure(&request.nodes, request.my_index) {
        Ok(rendered) => {
            info!("Configure endpoint called - configuration written");
            Ok(Json(
                ApiResponse::ok("ZooKeeper configuration written".to_string())
                    .with_member_id(rendered.member_id),
            ))
        }
        Err(e) => Err(internal_error(format!("Failed to configure ZooKeeper: {}", e))),
    }
}

/// Handle POST /zookeeper/start - Start ZooKeeper under monit
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> HandlerResult {
    let _guard = state.begin_operation("start").await;

    match state.zookeeper.start(request.clear_datastore).await {
        Ok(()) => {
            info!("Start endpoint called - ZooKeeper handed to monit");
            Ok(Json(ApiResponse::ok("ZooKeeper started".to_string())))
        }
        Err(e) => Err(internal_error(format!("Failed to start ZooKeeper: {}", e))),
    }
}

/// Handle POST /zookeeper/stop - Stop ZooKeeper through monit
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let _guard = state.begin_operation("stop").await;

    state.zookeeper.stop().await;
    Json(ApiResponse::ok("ZooKeeper stop requested".to_string()))
}

/// Handle GET /zookeeper/status - Report whether monit sees ZooKeeper running
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let running = state.zookeeper.is_running().await;
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        running,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
