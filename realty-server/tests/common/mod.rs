//! Shared helpers for router tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use realty_server::auth::{JwtCookieAuth, TokenKeys};
use realty_server::db::MemoryStore;
use realty_server::models::Profile;
use realty_server::{build_router, AppState, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &[u8] = b"router-test-secret";

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    keys: TokenKeys,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let keys = TokenKeys::from_secret(SECRET);
        let auth = Arc::new(JwtCookieAuth::new(keys.clone()));
        let state = AppState::in_memory(store.clone(), auth);
        let router = build_router(state, &ServerConfig::default()).expect("router");

        Self {
            router,
            store,
            keys,
        }
    }

    pub fn user(&self, username: &str) -> Profile {
        self.store.insert_user(username, Some("/avatars/default.png"))
    }

    pub fn cookie(&self, user: Uuid) -> String {
        let token = self.keys.issue(user, Duration::days(1)).expect("token");
        format!("token={token}")
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, self.cookie(user));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send_raw(request).await
    }

    pub async fn get(&self, uri: &str, user: Option<Uuid>) -> (StatusCode, Value) {
        self.send("GET", uri, user, None).await
    }

    /// Create a listing through the API and return its JSON.
    pub async fn create_post(&self, owner: Uuid, city: &str, price: i64) -> Value {
        let (status, body) = self
            .send("POST", "/api/posts", Some(owner), Some(post_body(city, price)))
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        body
    }

    pub async fn create_chat(&self, caller: Uuid, receiver: Uuid) -> Value {
        let (status, body) = self
            .send(
                "POST",
                "/api/chats",
                Some(caller),
                Some(json!({ "receiverId": receiver })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create chat failed: {body}");
        body
    }
}

pub fn post_body(city: &str, price: i64) -> Value {
    json!({
        "postData": {
            "title": format!("Home in {city}"),
            "price": price,
            "images": ["/img/front.jpg"],
            "address": "12 Harbour Road",
            "city": city,
            "bedroom": 3,
            "bathroom": 2,
            "latitude": "25.76",
            "longitude": "-80.19",
            "type": "buy",
            "property": "house"
        },
        "postDetail": {
            "desc": "Sunny family home",
            "utilities": "owner",
            "pet": "allowed",
            "size": 140,
            "school": 300
        }
    })
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("id field")
}

pub fn uuids(value: &Value) -> Vec<Uuid> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.as_str().and_then(|s| s.parse().ok()).expect("uuid"))
        .collect()
}
