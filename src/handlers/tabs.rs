use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Tab, TabData};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{DecryptedTabData, TabUpdate};
use crate::types::JsonMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateTabRequest {
    pub new_name: String,
    /// Needed only when the source tab has content
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

/// Payload write: `data` is the whole payload for replace and a delta for update
#[derive(Debug, Deserialize)]
pub struct TabDataRequest {
    pub data: JsonMap,
    pub password: String,
}

/// PUT /api/workspace/tabs/:id - Body: any of `name`, `tabType`, `isActive`, `isLocked`
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tab_id): Path<Uuid>,
    Json(body): Json<TabUpdate>,
) -> ApiResult<Tab> {
    let tab = state.service.update_tab(user.user_id, tab_id, body).await?;
    Ok(ApiResponse::success(tab))
}

/// DELETE /api/workspace/tabs/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tab_id): Path<Uuid>,
) -> ApiResult<()> {
    state.service.delete_tab(user.user_id, tab_id).await?;
    Ok(ApiResponse::no_content())
}

/// PUT /api/workspace/tabs/:id/active
pub async fn activate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tab_id): Path<Uuid>,
) -> ApiResult<Tab> {
    let tab = state.service.activate_tab(user.user_id, tab_id).await?;
    Ok(ApiResponse::success(tab))
}

/// POST /api/workspace/tabs/:id/duplicate - Body: `{"newName", "password"?}`
pub async fn duplicate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tab_id): Path<Uuid>,
    Json(body): Json<DuplicateTabRequest>,
) -> ApiResult<Tab> {
    let tab = state
        .service
        .duplicate_tab(user.user_id, tab_id, &body.new_name, body.password.as_deref())
        .await?;
    Ok(ApiResponse::created(tab))
}

/// GET /api/workspace/tabs/:id/data - Stored record, still encrypted
pub async fn get_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tab_id): Path<Uuid>,
) -> ApiResult<TabData> {
    let data = state.service.get_tab_data(user.user_id, tab_id).await?;
    Ok(ApiResponse::success(data))
}

/// POST /api/workspace/tabs/:id/data/decrypt - Body: `{"password"}`
pub async fn decrypt_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tab_id): Path<Uuid>,
    Json(body): Json<PasswordRequest>,
) -> ApiResult<DecryptedTabData> {
    let data = state
        .service
        .get_tab_data_decrypted(user.user_id, tab_id, &body.password)
        .await?;
    Ok(ApiResponse::success(data))
}

/// PUT /api/workspace/tabs/:id/data/replace - Body: `{"data", "password"}`
pub async fn replace_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tab_id): Path<Uuid>,
    Json(body): Json<TabDataRequest>,
) -> ApiResult<TabData> {
    let data = state
        .service
        .replace_tab_data(user.user_id, tab_id, body.data, &body.password)
        .await?;
    Ok(ApiResponse::success(data))
}

/// PUT /api/workspace/tabs/:id/data - Body: `{"data", "password"}`, deep-merged
pub async fn update_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tab_id): Path<Uuid>,
    Json(body): Json<TabDataRequest>,
) -> ApiResult<TabData> {
    let data = state
        .service
        .update_tab_data(user.user_id, tab_id, body.data, &body.password)
        .await?;
    Ok(ApiResponse::success(data))
}
