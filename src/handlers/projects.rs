use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Page, Project};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ProjectUpdate;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderProjectsRequest {
    pub project_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPagesRequest {
    pub page_ids: Vec<Uuid>,
}

/// GET /api/workspace/projects - Projects of the current user in display order
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Project>> {
    let projects = state.service.list_projects(user.user_id).await?;
    Ok(ApiResponse::success(projects))
}

/// POST /api/workspace/projects - Append a project
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateProjectRequest>,
) -> ApiResult<Project> {
    let project = state.service.create_project(user.user_id, &body.name).await?;
    Ok(ApiResponse::created(project))
}

/// PUT /api/workspace/projects/:id - Rename and/or expand/collapse
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<ProjectUpdate>,
) -> ApiResult<Project> {
    let project = state.service.update_project(user.user_id, project_id, body).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/workspace/projects/:id - Delete with all pages, tabs and payloads
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<()> {
    state.service.delete_project(user.user_id, project_id).await?;
    Ok(ApiResponse::no_content())
}

/// PUT /api/workspace/projects/reorder - Body: `{"projectIds": [...]}`, the full list
pub async fn reorder(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ReorderProjectsRequest>,
) -> ApiResult<Vec<Project>> {
    let projects = state.service.reorder_projects(user.user_id, &body.project_ids).await?;
    Ok(ApiResponse::success(projects))
}

/// PUT /api/workspace/projects/:id/active
pub async fn activate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Project> {
    let project = state.service.activate_project(user.user_id, project_id).await?;
    Ok(ApiResponse::success(project))
}

/// GET /api/workspace/projects/:id/pages
pub async fn list_pages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Vec<Page>> {
    let pages = state.service.list_pages(user.user_id, project_id).await?;
    Ok(ApiResponse::success(pages))
}

/// POST /api/workspace/projects/:id/pages - Append a page to the project
pub async fn create_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<CreatePageRequest>,
) -> ApiResult<Page> {
    let page = state.service.create_page(user.user_id, project_id, &body.name).await?;
    Ok(ApiResponse::created(page))
}

/// PUT /api/workspace/projects/:id/pages/reorder - Body: `{"pageIds": [...]}`
pub async fn reorder_pages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<ReorderPagesRequest>,
) -> ApiResult<Vec<Page>> {
    let pages = state.service.reorder_pages(user.user_id, project_id, &body.page_ids).await?;
    Ok(ApiResponse::success(pages))
}
