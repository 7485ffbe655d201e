use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{App, config::ServerConfig, router, store::MemoryStore};

pub fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let ctx = App {
        store: store.clone(),
        http: reqwest::Client::new(),
        config: Arc::new(ServerConfig::default()),
    };
    (router(ctx), store)
}

pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

pub async fn create_post(router: &Router, title: &str, tags: &[&str]) -> i32 {
    let (status, body) = send(
        router,
        "POST",
        "/posts",
        Some(json!({
            "title": title,
            "description": "test post",
            "tags": tags,
            "authorName": "Ann",
            "authorEmail": "ann@example.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["insertedId"].as_i64().expect("insertedId") as i32
}
