// API tests against the in-memory backend
// Run with: cargo test -p planner-control-plane --test api_test

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use planner_control_plane::api;
use planner_control_plane::storage::StorageBackend;
use planner_core::memory::RecordingMailer;
use planner_core::{Event, NotificationSweep, SweepConfig, User};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    db: StorageBackend,
}

impl TestApp {
    fn new() -> Self {
        let db = StorageBackend::in_memory();
        Self {
            router: api::routes(db.clone()),
            db,
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = user {
            builder = builder.header("X-User-Id", id.to_string());
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
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

    async fn register(&self, name: &str, email: &str) -> User {
        let (status, body) = self
            .request(
                Method::POST,
                "/v1/users",
                None,
                Some(json!({ "name": name, "email": email, "department": "Physics" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        serde_json::from_value(body).unwrap()
    }

    async fn create_event(&self, owner: Uuid, title: &str, hours_ahead: i64) -> Event {
        let start = Utc::now() + Duration::hours(hours_ahead);
        let (status, body) = self
            .request(
                Method::POST,
                "/v1/events",
                Some(owner),
                Some(json!({
                    "title": title,
                    "start_date": start,
                    "location": "Room 101",
                    "event_type": "class"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        serde_json::from_value(body).unwrap()
    }
}

#[tokio::test]
async fn test_event_crud_round() {
    let app = TestApp::new();
    let user = app.register("Dr. Curie", "curie@example.edu").await;

    let later = app.create_event(user.id, "Later", 72).await;
    let sooner = app.create_event(user.id, "Sooner", 5).await;
    assert!(!sooner.notification_sent);

    // Listed by start date
    let (status, body) = app
        .request(Method::GET, "/v1/events", Some(user.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Sooner", "Later"]);

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/v1/events/{}", later.id),
            Some(user.id),
            Some(json!({ "title": "Later, moved", "location": "Hall B" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Later, moved");
    assert_eq!(body["location"], "Hall B");
    assert_eq!(body["event_type"], "class");

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/v1/events/{}", later.id),
            Some(user.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/v1/events/{}", later.id),
            Some(user.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_events_are_owner_scoped() {
    let app = TestApp::new();
    let owner = app.register("Dr. Curie", "curie@example.edu").await;
    let other = app.register("Dr. Bohr", "bohr@example.edu").await;
    let event = app.create_event(owner.id, "Private", 30).await;
    let uri = format!("/v1/events/{}", event.id);

    let (status, _) = app.request(Method::GET, &uri, Some(other.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::PUT,
            &uri,
            Some(other.id),
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(Method::DELETE, &uri, Some(other.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .request(Method::GET, "/v1/events", Some(other.id), None)
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = app.request(Method::GET, &uri, Some(owner.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Private");
}

#[tokio::test]
async fn test_identity_required() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/v1/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/profile")
                .header("X-User-Id", "not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_event_validation() {
    let app = TestApp::new();
    let user = app.register("Dr. Curie", "curie@example.edu").await;
    let start = Utc::now() + Duration::days(3);

    let (status, body) = app
        .request(
            Method::POST,
            "/v1/events",
            Some(user.id),
            Some(json!({ "title": "   ", "start_date": start })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");

    let (status, _) = app
        .request(
            Method::POST,
            "/v1/events",
            Some(user.id),
            Some(json!({
                "title": "Exam",
                "start_date": start,
                "end_date": start - Duration::hours(1)
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Identity without a user record cannot own events
    let (status, _) = app
        .request(
            Method::POST,
            "/v1/events",
            Some(Uuid::now_v7()),
            Some(json!({ "title": "Orphan", "start_date": start })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let app = TestApp::new();
    let curie = app.register("Dr. Curie", "curie@example.edu").await;
    app.register("Dr. Bohr", "bohr@example.edu").await;

    let (status, body) = app
        .request(Method::GET, "/v1/profile", Some(curie.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "curie@example.edu");
    assert_eq!(body["department"], "Physics");

    // Duplicate registration
    let (status, body) = app
        .request(
            Method::POST,
            "/v1/users",
            None,
            Some(json!({ "name": "Impostor", "email": "Curie@Example.edu" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already in use");

    // Taking another user's address
    let (status, _) = app
        .request(
            Method::PUT,
            "/v1/profile",
            Some(curie.id),
            Some(json!({ "email": "bohr@example.edu" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .request(
            Method::PATCH,
            "/v1/profile",
            Some(curie.id),
            Some(json!({ "office": "Lab 3", "email": "marie@example.edu" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["office"], "Lab 3");
    assert_eq!(body["email"], "marie@example.edu");

    let (status, _) = app
        .request(
            Method::POST,
            "/v1/users",
            None,
            Some(json!({ "name": "Dr. X", "email": "not-an-email" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(Method::GET, "/v1/profile", Some(Uuid::now_v7()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_delete_cascades_to_events() {
    let app = TestApp::new();
    let user = app.register("Dr. Curie", "curie@example.edu").await;
    let event = app.create_event(user.id, "Seminar", 49).await;

    let (status, _) = app
        .request(Method::DELETE, "/v1/profile", Some(user.id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(app.db.get_event(user.id, event.id).await.unwrap().is_none());
    let (status, _) = app
        .request(Method::GET, "/v1/profile", Some(user.id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A removed owner's events never reach the sweep
    let mailer = RecordingMailer::new();
    let sweep = NotificationSweep::new(
        Arc::new(app.db.clone()),
        Arc::new(mailer.clone()),
        SweepConfig::default(),
    );
    let report = sweep.run_tick(Utc::now()).await.unwrap();
    assert_eq!(report.selected, 0);
    assert_eq!(mailer.count().await, 0);
}

#[tokio::test]
async fn test_sweep_sends_once_and_edits_do_not_rearm() {
    let app = TestApp::new();
    let user = app.register("Dr. Curie", "curie@example.edu").await;
    let due = app.create_event(user.id, "Defense", 49).await;
    app.create_event(user.id, "Too soon", 3).await;

    let mailer = RecordingMailer::new();
    let sweep = NotificationSweep::new(
        Arc::new(app.db.clone()),
        Arc::new(mailer.clone()),
        SweepConfig::default(),
    );

    let report = sweep.run_tick(Utc::now()).await.unwrap();
    assert_eq!(report.sent, vec![due.id]);
    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "curie@example.edu");
    assert_eq!(sent[0].subject, "Upcoming Event: Defense");

    // The flag shows up on reads but cannot be written back through the API
    let uri = format!("/v1/events/{}", due.id);
    let (_, body) = app.request(Method::GET, &uri, Some(user.id), None).await;
    assert_eq!(body["notification_sent"], true);

    let new_start = Utc::now() + Duration::days(9);
    let (status, body) = app
        .request(
            Method::PATCH,
            &uri,
            Some(user.id),
            Some(json!({ "start_date": new_start, "notification_sent": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification_sent"], true);

    // Run a tick as of two days before the new start: no second reminder
    let report = sweep
        .run_tick(new_start - Duration::hours(49))
        .await
        .unwrap();
    assert_eq!(report.selected, 0);
    assert_eq!(mailer.count().await, 1);
}
