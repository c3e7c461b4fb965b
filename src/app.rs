use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{pages, projects, tabs, workspace};
use crate::middleware::jwt_auth_middleware;
use crate::services::WorkspaceService;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: WorkspaceService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(service: WorkspaceService, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            jwt_secret: jwt_secret.into(),
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(workspace::root))
        .route("/health", get(workspace::health))
        // Protected API
        .nest("/api/workspace", workspace_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn workspace_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/data", get(workspace::tree))
        .route("/active-state", get(workspace::active_state))
        .route("/active-state/default", post(workspace::default_active_state))
        .route("/password/verify", post(workspace::verify_password))
        .merge(project_routes())
        .merge(page_routes())
        .merge(tab_routes())
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(projects::list).post(projects::create))
        .route("/projects/reorder", put(projects::reorder))
        .route("/projects/:id", put(projects::update).delete(projects::delete))
        .route("/projects/:id/active", put(projects::activate))
        .route("/projects/:id/pages", get(projects::list_pages).post(projects::create_page))
        .route("/projects/:id/pages/reorder", put(projects::reorder_pages))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/pages/:id", put(pages::update).delete(pages::delete))
        .route("/pages/:id/move", put(pages::move_to_project))
        .route("/pages/:id/active", put(pages::activate))
        .route("/pages/:id/tabs", get(pages::list_tabs).post(pages::create_tab))
        .route("/pages/:id/tabs/reorder", put(pages::reorder_tabs))
}

fn tab_routes() -> Router<AppState> {
    Router::new()
        .route("/tabs/:id", put(tabs::update).delete(tabs::delete))
        .route("/tabs/:id/active", put(tabs::activate))
        .route("/tabs/:id/duplicate", post(tabs::duplicate))
        .route("/tabs/:id/data", get(tabs::get_data).put(tabs::update_data))
        .route("/tabs/:id/data/decrypt", post(tabs::decrypt_data))
        .route("/tabs/:id/data/replace", put(tabs::replace_data))
}

/// `*` allows any origin; otherwise only the listed origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}
