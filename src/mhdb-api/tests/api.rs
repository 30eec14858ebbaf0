//! Router-level tests against an in-memory database

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mhdb::{EntityRepository, SqliteDb};
use mhdb_api::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "editor-secret";

fn app() -> Router {
    let db = SqliteDb::open_in_memory().unwrap();
    db.init().unwrap();
    router(Arc::new(AppState::new(db, vec![TOKEN.to_string()])))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_mutations_require_editor() {
    let app = app();
    let potion = json!({"name": "Potion", "rarity": 1});

    let (status, body) = send(&app, Method::PUT, "/items", None, Some(potion.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::PUT, "/items", Some("nope"), Some(potion)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, "/items/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_item_lifecycle() {
    let app = app();

    let (status, created) = send(
        &app,
        Method::PUT,
        "/items",
        Some(TOKEN),
        Some(json!({"name": "Potion", "rarity": 1, "value": 8})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, item) = send(&app, Method::GET, &format!("/items/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["name"], "Potion");

    let (status, item) = send(
        &app,
        Method::PATCH,
        &format!("/items/{}", id),
        Some(TOKEN),
        Some(json!({"name": "Mega Potion"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["name"], "Mega Potion");
    assert_eq!(item["rarity"], 1);

    let (status, body) = send(&app, Method::DELETE, &format!("/items/{}", id), Some(TOKEN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::GET, &format!("/items/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_validation_errors() {
    let app = app();

    let (status, body) = send(&app, Method::PUT, "/weapons", Some(TOKEN), Some(json!({"rarity": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: name, type");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/decorations",
        Some(TOKEN),
        Some(json!({"name": "Attack Jewel 1", "slot": 1, "rarity": 5, "skills": [42]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("skills"));

    let (status, _) = send(&app, Method::PATCH, "/items/99", Some(TOKEN), Some(json!({"rarity": 2}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_and_projection() {
    let app = app();
    for (name, rarity) in [("Potion", 1), ("Mega Potion", 2), ("Max Potion", 2)] {
        let (status, _) = send(
            &app,
            Method::PUT,
            "/items",
            Some(TOKEN),
            Some(json!({"name": name, "rarity": rarity})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, items) = send(&app, Method::GET, "/items", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 3);

    let (_, items) = send(&app, Method::GET, "/items?q=%7B%22rarity%22%3A2%7D", None, None).await;
    let names: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Mega Potion", "Max Potion"]);

    let (_, items) = send(&app, Method::GET, "/items?limit=1&offset=1", None, None).await;
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["name"], "Mega Potion");

    let (status, body) = send(&app, Method::GET, "/items?p=%7B%22a%22%3Atrue%2C%22b%22%3Afalse%7D", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/items?q=%5B1%5D", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_armor_sets_route() {
    let app = app();

    let (status, set) = send(
        &app,
        Method::PUT,
        "/armor/sets",
        Some(TOKEN),
        Some(json!({"name": "Leather", "rank": "low"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(set["name"], "Leather");

    let (status, sets) = send(&app, Method::GET, "/armor/sets", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sets.as_array().unwrap().len(), 1);

    let (status, armor) = send(&app, Method::GET, "/armor", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(armor, json!([]));
}
