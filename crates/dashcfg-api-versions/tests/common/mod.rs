//! Shared fixtures for the version API tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Extension, Router,
};
use chrono::Utc;
use dashcfg_api_versions::{
    versions_router_with_store, Caller, InMemoryVersionStore, VersionStore, VersionTransaction,
    VersionsSettings,
};
use dashcfg_core::{ConfigId, LiveConfiguration, OwnerId, Tab};
use serde_json::Value;
use tower::ServiceExt;

/// Tabs with the given ids, labelled after themselves.
pub fn tabs(ids: &[&str]) -> Vec<Tab> {
    ids.iter().map(|id| Tab::new(*id, *id, "icon")).collect()
}

/// One owned configuration in an in-memory store.
pub struct TestContext {
    pub store: Arc<InMemoryVersionStore>,
    pub config_id: ConfigId,
    pub owner: OwnerId,
    pub settings: VersionsSettings,
}

impl TestContext {
    pub async fn new(initial: &[&str]) -> Self {
        let store = Arc::new(InMemoryVersionStore::new());
        let config_id = ConfigId::new();
        let owner = OwnerId::new();
        store
            .put_configuration(LiveConfiguration {
                id: config_id,
                owner_id: owner,
                tabs: tabs(initial),
                colors: None,
                updated_at: Utc::now(),
            })
            .await;

        Self {
            store,
            config_id,
            owner,
            settings: VersionsSettings::default(),
        }
    }

    /// Record a version directly in the store.
    pub async fn save_version(&self, ids: &[&str]) -> dashcfg_core::VersionRecord {
        self.store
            .create(self.config_id, &tabs(ids), None)
            .await
            .unwrap()
    }

    /// Replace the live tabs, as an ordinary edit would.
    pub async fn edit_live(&self, ids: &[&str]) {
        let mut tx = self.store.begin().await.unwrap();
        tx.overwrite_configuration(self.config_id, &tabs(ids), None)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    pub async fn live_tabs(&self) -> Vec<Tab> {
        self.store
            .find_configuration(self.config_id)
            .await
            .unwrap()
            .unwrap()
            .tabs
    }

    /// Router acting as the owner.
    pub fn app(&self) -> Router {
        self.app_as(Some(self.owner))
    }

    /// Router acting as `user`, or unauthenticated for `None`.
    pub fn app_as(&self, user: Option<OwnerId>) -> Router {
        let router = versions_router_with_store(self.store.clone(), self.settings);
        match user {
            Some(user_id) => router.layer(Extension(Caller::new(user_id))),
            None => router,
        }
    }
}

/// Send a request and return the status and decoded JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

/// Tab ids in a JSON tab array.
pub fn tab_ids(tabs: &Value) -> Vec<String> {
    tabs.as_array()
        .map(|tabs| {
            tabs.iter()
                .filter_map(|t| t["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
