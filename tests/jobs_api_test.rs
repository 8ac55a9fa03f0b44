use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use talentflow_backend::{middleware::chaos::ChaosConfig, routes, AppState};

async fn test_app() -> Router {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    routes::api_router(AppState::new(pool), ChaosConfig::disabled())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn create_job_derives_slug_and_returns_201() {
    let app = test_app().await;

    let (status, job) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(json!({ "title": "Senior Rust Engineer", "status": "active", "tags": ["remote"] })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["title"], "Senior Rust Engineer");
    assert_eq!(job["slug"], "senior-rust-engineer");
    assert_eq!(job["status"], "active");
    assert_eq!(job["order"], 0);
    assert!(job["createdAt"].is_string());
}

#[tokio::test]
async fn duplicate_slug_is_a_validation_error() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(json!({ "title": "Backend Engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(json!({ "title": "Another", "slug": "backend-engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Slug must be unique");

    // The failed create persisted nothing.
    let (_, list) = send(&app, "GET", "/api/jobs", None).await;
    assert_eq!(list["meta"]["total"], 1);
}

#[tokio::test]
async fn list_jobs_paginates_with_meta() {
    let app = test_app().await;
    for i in 0..7 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/jobs",
            Some(json!({ "title": format!("Engineer {i}"), "status": "active" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/api/jobs?page=2&limit=3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["meta"]["page"], 2);
    assert_eq!(body["meta"]["limit"], 3);
    assert_eq!(body["meta"]["total"], 7);
    assert_eq!(body["meta"]["totalPages"], 3);

    let (_, filtered) = send(&app, "GET", "/api/jobs?search=engineer%200", None).await;
    assert_eq!(filtered["meta"]["total"], 1);
}

#[tokio::test]
async fn archive_toggle_via_patch() {
    let app = test_app().await;
    let (_, job) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(json!({ "title": "Backend Engineer", "status": "active" })),
    )
    .await;
    let id = job["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/jobs/{id}"),
        Some(json!({ "status": "archived" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "archived");

    let (_, fetched) = send(&app, "GET", &format!("/api/jobs/{id}"), None).await;
    assert_eq!(fetched["status"], "archived");
}

#[tokio::test]
async fn reorder_assigns_index_order_and_rejects_partial_sets() {
    let app = test_app().await;
    let mut ids = Vec::new();
    for title in ["A", "B", "C"] {
        let (_, job) = send(&app, "POST", "/api/jobs", Some(json!({ "title": title }))).await;
        ids.push(job["id"].as_str().unwrap().to_string());
    }

    // [A, B, C] -> [C, A, B]
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/jobs/reorder",
        Some(json!({ "jobIds": [ids[2], ids[0], ids[1]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, list) = send(&app, "GET", "/api/jobs", None).await;
    let data = list["data"].as_array().unwrap();
    let titles: Vec<&str> = data.iter().map(|j| j["title"].as_str().unwrap()).collect();
    let orders: Vec<i64> = data.iter().map(|j| j["order"].as_i64().unwrap()).collect();
    assert_eq!(titles, vec!["C", "A", "B"]);
    assert_eq!(orders, vec![0, 1, 2]);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/jobs/reorder",
        Some(json!({ "jobIds": [ids[0]] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_job_is_404() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "GET",
        "/api/jobs/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
