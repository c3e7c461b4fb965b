#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use workspace_api::app::{app, AppState};
use workspace_api::auth::{sign_jwt, Claims};
use workspace_api::config::AppConfig;
use workspace_api::crypto::BcryptPasswordMatcher;
use workspace_api::database::models::{Page, Project, Tab};
use workspace_api::database::MemoryStore;
use workspace_api::services::{NewTab, WorkspaceService};
use workspace_api::types::UserId;

pub const PASSWORD: &str = "correct horse battery staple";

/// In-memory workspace with helpers for seeding users and trees
pub struct TestContext {
    pub config: AppConfig,
    pub store: MemoryStore,
    pub service: WorkspaceService,
}

impl TestContext {
    pub fn new() -> Self {
        let config = AppConfig::development();
        let store = MemoryStore::new();
        let service = WorkspaceService::from_config(Arc::new(store.clone()), &config);
        Self { config, store, service }
    }

    pub async fn user(&self, username: &str) -> UserId {
        // Minimum cost keeps the many verifications in these tests fast
        let hash = BcryptPasswordMatcher::hash_with_cost(PASSWORD, 4).expect("hash password");
        self.service
            .create_user(username, &hash)
            .await
            .expect("create user")
            .id
    }

    pub async fn project(&self, user_id: UserId, name: &str) -> Project {
        self.service.create_project(user_id, name).await.expect("create project")
    }

    pub async fn page(&self, user_id: UserId, project_id: Uuid, name: &str) -> Page {
        self.service.create_page(user_id, project_id, name).await.expect("create page")
    }

    pub async fn tab(&self, user_id: UserId, page_id: Uuid, name: &str, tab_type: &str) -> Tab {
        let new_tab = NewTab {
            name: name.to_string(),
            tab_type: tab_type.to_string(),
            position: None,
        };
        self.service.create_tab(user_id, page_id, new_tab).await.expect("create tab")
    }

    /// User with one project holding one page
    pub async fn seeded(&self, username: &str) -> (UserId, Project, Page) {
        let user_id = self.user(username).await;
        let project = self.project(user_id, "Bridge A").await;
        let page = self.page(user_id, project.id, "Loads").await;
        (user_id, project, page)
    }

    pub fn router(&self) -> Router {
        let state = AppState::new(self.service.clone(), self.config.security.jwt_secret.as_str());
        app(state, &self.config)
    }

    pub fn token(&self, user_id: UserId) -> String {
        let claims = Claims::new(user_id, format!("user-{user_id}"));
        sign_jwt(&claims, &self.config.security.jwt_secret).expect("sign token")
    }
}

/// Fire one request at the router; the body is `Value::Null` when empty
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = router.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

pub fn orders<T>(items: &[T], order: impl Fn(&T) -> i32) -> Vec<i32> {
    items.iter().map(order).collect()
}
