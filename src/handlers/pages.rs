use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Page, Tab};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{NewTab, PageUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePageRequest {
    pub new_project_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTabsRequest {
    pub tab_ids: Vec<Uuid>,
}

/// PUT /api/workspace/pages/:id - Rename
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(page_id): Path<Uuid>,
    Json(body): Json<PageUpdate>,
) -> ApiResult<Page> {
    let page = state.service.update_page(user.user_id, page_id, body).await?;
    Ok(ApiResponse::success(page))
}

/// DELETE /api/workspace/pages/:id - Delete with all tabs and payloads
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(page_id): Path<Uuid>,
) -> ApiResult<()> {
    state.service.delete_page(user.user_id, page_id).await?;
    Ok(ApiResponse::no_content())
}

/// PUT /api/workspace/pages/:id/move - Body: `{"newProjectId": "..."}`
pub async fn move_to_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(page_id): Path<Uuid>,
    Json(body): Json<MovePageRequest>,
) -> ApiResult<Page> {
    let page = state.service.move_page(user.user_id, page_id, body.new_project_id).await?;
    Ok(ApiResponse::success(page))
}

/// PUT /api/workspace/pages/:id/active
pub async fn activate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(page_id): Path<Uuid>,
) -> ApiResult<Page> {
    let page = state.service.activate_page(user.user_id, page_id).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/workspace/pages/:id/tabs
pub async fn list_tabs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(page_id): Path<Uuid>,
) -> ApiResult<Vec<Tab>> {
    let tabs = state.service.list_tabs(user.user_id, page_id).await?;
    Ok(ApiResponse::success(tabs))
}

/// POST /api/workspace/pages/:id/tabs - Body: `{"name", "tabType", "position"?}`
///
/// The new tab becomes the page's active tab.
pub async fn create_tab(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(page_id): Path<Uuid>,
    Json(body): Json<NewTab>,
) -> ApiResult<Tab> {
    let tab = state.service.create_tab(user.user_id, page_id, body).await?;
    Ok(ApiResponse::created(tab))
}

/// PUT /api/workspace/pages/:id/tabs/reorder - Body: `{"tabIds": [...]}`
pub async fn reorder_tabs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(page_id): Path<Uuid>,
    Json(body): Json<ReorderTabsRequest>,
) -> ApiResult<Vec<Tab>> {
    let tabs = state.service.reorder_tabs(user.user_id, page_id, &body.tab_ids).await?;
    Ok(ApiResponse::success(tabs))
}
