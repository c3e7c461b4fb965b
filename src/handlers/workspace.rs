use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::handlers::tabs::PasswordRequest;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{ActiveState, WorkspaceTree};

#[derive(Debug, Serialize)]
pub struct PasswordCheck {
    pub valid: bool,
}

/// GET /api/workspace/data - Whole project → page → tab tree, payloads excluded
pub async fn tree(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<WorkspaceTree> {
    let tree = state.service.get_all_workspace_data(user.user_id).await?;
    Ok(ApiResponse::success(tree))
}

/// GET /api/workspace/active-state - `{activeProjectId?, activePageId?, activeTabId?}`
pub async fn active_state(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<ActiveState> {
    let active = state.service.get_last_active_state(user.user_id).await?;
    Ok(ApiResponse::success(active))
}

/// POST /api/workspace/active-state/default - Activate the first project and its first page
pub async fn default_active_state(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<ActiveState> {
    let active = state.service.set_default_active_state(user.user_id).await?;
    Ok(ApiResponse::success(active))
}

/// POST /api/workspace/password/verify - Body: `{"password"}`
pub async fn verify_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PasswordRequest>,
) -> ApiResult<PasswordCheck> {
    let valid = state.service.validate_user_password(user.user_id, &body.password).await?;
    Ok(ApiResponse::success(PasswordCheck { valid }))
}

/// GET / - Service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Workspace API",
            "version": version,
            "description": "Projects, pages and tabs with password-encrypted tab data",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "workspace": "/api/workspace/* (protected)",
            }
        }
    }))
}

/// GET /health - Store reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.service.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
