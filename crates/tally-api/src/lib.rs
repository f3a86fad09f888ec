//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::SubjectStore`].
//! To clients this is the remote document store: records live under
//! `/users/{user_id}/subjects` and never cross identities. TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone()))
//! ```

pub mod advice;
pub mod error;
pub mod extract;
pub mod snapshot;
pub mod subjects;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use tally_core::store::SubjectStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SubjectStore + 'static,
{
  Router::new()
    // Identity
    .route("/users", post(users::sign_in::<S>))
    .route("/users/{user_id}", get(users::get_one::<S>))
    // Subjects
    .route(
      "/users/{user_id}/subjects",
      get(subjects::list::<S>).post(subjects::create::<S>),
    )
    .route(
      "/users/{user_id}/subjects/{id}",
      patch(subjects::update::<S>).delete(subjects::delete::<S>),
    )
    // Live view and derived data
    .route("/users/{user_id}/snapshot", get(snapshot::handler::<S>))
    .route("/users/{user_id}/summary", get(snapshot::summary::<S>))
    .route("/users/{user_id}/advice", post(advice::handler::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use tally_core::{store::Snapshot, user::UserId};
  use tally_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  async fn make_router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn sign_in(router: &Router) -> String {
    let resp = send(router, "POST", "/users", None).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await["user_id"].as_str().unwrap().to_owned()
  }

  async fn add_subject(router: &Router, user: &str, name: &str) -> Value {
    let resp = send(
      router,
      "POST",
      &format!("/users/{user}/subjects"),
      Some(json!({ "name": name, "type": "Lecture" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await
  }

  async fn set_count(router: &Router, user: &str, id: &str, field: &str, value: u32) -> Response {
    send(
      router,
      "PATCH",
      &format!("/users/{user}/subjects/{id}"),
      Some(json!({ "field": field, "value": value })),
    )
    .await
  }

  // ── Identity ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sign_in_then_resume() {
    let router = make_router().await;
    let user = sign_in(&router).await;

    let resp = send(&router, "GET", &format!("/users/{user}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["user_id"], user.as_str());
  }

  #[tokio::test]
  async fn unknown_user_is_404() {
    let router = make_router().await;
    let stranger = UserId::new_anonymous();

    let resp = send(&router, "GET", &format!("/users/{stranger}"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&router, "GET", &format!("/users/{stranger}/subjects"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(json_body(resp).await["error"].as_str().unwrap().contains("not found"));
  }

  // ── Subjects ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_trims_and_starts_at_zero() {
    let router = make_router().await;
    let user = sign_in(&router).await;

    let rec = add_subject(&router, &user, "  Physics  ").await;
    assert_eq!(rec["name"], "Physics");
    assert_eq!(rec["type"], "Lecture");
    assert_eq!(rec["conducted"], 0);
    assert_eq!(rec["present"], 0);
  }

  #[tokio::test]
  async fn blank_name_is_rejected() {
    let router = make_router().await;
    let user = sign_in(&router).await;

    let resp = send(
      &router,
      "POST",
      &format!("/users/{user}/subjects"),
      Some(json!({ "name": "   ", "type": "Lab" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&router, "GET", &format!("/users/{user}/subjects"), None).await;
    assert_eq!(json_body(resp).await, json!([]));
  }

  #[tokio::test]
  async fn patch_updates_single_count() {
    let router = make_router().await;
    let user = sign_in(&router).await;
    let rec = add_subject(&router, &user, "Physics").await;
    let id = rec["id"].as_str().unwrap();

    let resp = set_count(&router, &user, id, "conducted", 40).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = set_count(&router, &user, id, "present", 30).await;
    let rec = json_body(resp).await;
    assert_eq!(rec["conducted"], 40);
    assert_eq!(rec["present"], 30);
  }

  #[tokio::test]
  async fn patch_rejects_unknown_field_and_negative_value() {
    let router = make_router().await;
    let user = sign_in(&router).await;
    let rec = add_subject(&router, &user, "Physics").await;
    let uri = format!("/users/{user}/subjects/{}", rec["id"].as_str().unwrap());

    let resp = send(&router, "PATCH", &uri, Some(json!({ "field": "absent", "value": 1 }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].as_str().unwrap().contains("absent"));

    let resp = send(&router, "PATCH", &uri, Some(json!({ "field": "present", "value": -1 }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn malformed_ids_and_params_answer_json_errors() {
    let router = make_router().await;
    let user = sign_in(&router).await;

    let resp = send(&router, "GET", "/users/not-a-uuid/subjects", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());

    let uri = format!("/users/{user}/subjects/not-a-uuid");
    let resp = send(&router, "DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());

    let uri = format!("/users/{user}/snapshot?after=soon");
    let resp = send(&router, "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());

    let uri = format!("/users/{user}/advice");
    let resp = send(&router, "POST", &uri, Some(json!({ "commitments": "trip" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].as_str().unwrap().contains("target"));
  }

  #[tokio::test]
  async fn patch_missing_subject_is_404() {
    let router = make_router().await;
    let user = sign_in(&router).await;
    let resp = set_count(&router, &user, &Uuid::new_v4().to_string(), "present", 1).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_removes_from_list_and_summary() {
    let router = make_router().await;
    let user = sign_in(&router).await;
    let keep = add_subject(&router, &user, "Physics").await;
    let gone = add_subject(&router, &user, "History").await;
    let gone_id = gone["id"].as_str().unwrap();
    set_count(&router, &user, gone_id, "conducted", 10).await;

    let uri = format!("/users/{user}/subjects/{gone_id}");
    let resp = send(&router, "DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&router, "DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&router, "GET", &format!("/users/{user}/subjects"), None).await;
    assert_eq!(json_body(resp).await, json!([keep]));

    let resp = send(&router, "GET", &format!("/users/{user}/summary"), None).await;
    let summary = json_body(resp).await;
    assert_eq!(summary["total_conducted"], 0);
  }

  #[tokio::test]
  async fn users_are_partitioned() {
    let router = make_router().await;
    let alice = sign_in(&router).await;
    let bob = sign_in(&router).await;
    let rec = add_subject(&router, &alice, "Physics").await;
    let id = rec["id"].as_str().unwrap();

    let resp = send(&router, "GET", &format!("/users/{bob}/subjects"), None).await;
    assert_eq!(json_body(resp).await, json!([]));

    let resp = set_count(&router, &bob, id, "present", 3).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Snapshot ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn snapshot_without_after_returns_immediately() {
    let router = make_router().await;
    let user = sign_in(&router).await;
    add_subject(&router, &user, "Physics").await;

    let resp = send(&router, "GET", &format!("/users/{user}/snapshot"), None).await;
    let snap: Snapshot = serde_json::from_value(json_body(resp).await).unwrap();
    assert_eq!(snap.version, 1);
    assert_eq!(snap.subjects.len(), 1);
  }

  #[tokio::test]
  async fn snapshot_long_poll_wakes_on_write() {
    let router = make_router().await;
    let user = sign_in(&router).await;

    let poll = {
      let router = router.clone();
      let uri = format!("/users/{user}/snapshot?after=0&wait_secs=10");
      tokio::spawn(async move { json_body(send(&router, "GET", &uri, None).await).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    add_subject(&router, &user, "Physics").await;

    let body = tokio::time::timeout(Duration::from_secs(5), poll)
      .await
      .unwrap()
      .unwrap();
    let snap: Snapshot = serde_json::from_value(body).unwrap();
    assert_eq!(snap.version, 1);
    assert_eq!(snap.subjects[0].name, "Physics");
  }

  #[tokio::test]
  async fn snapshot_long_poll_times_out_with_current_state() {
    let router = make_router().await;
    let user = sign_in(&router).await;
    add_subject(&router, &user, "Physics").await;

    let resp = send(
      &router,
      "GET",
      &format!("/users/{user}/snapshot?after=1&wait_secs=0"),
      None,
    )
    .await;
    let snap: Snapshot = serde_json::from_value(json_body(resp).await).unwrap();
    assert_eq!(snap.version, 1);
  }

  // ── Summary & advice ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_summary_and_advice() {
    let router = make_router().await;
    let user = sign_in(&router).await;

    let resp = send(&router, "GET", &format!("/users/{user}/summary"), None).await;
    assert_eq!(
      json_body(resp).await,
      json!({ "total_conducted": 0, "total_present": 0, "overall_percentage": 0.0 })
    );

    let resp = send(
      &router,
      "POST",
      &format!("/users/{user}/advice"),
      Some(json!({ "target": 75 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let message = json_body(resp).await["message"].as_str().unwrap().to_owned();
    assert!(message.starts_with("Your overall attendance is 0.00%."));
    assert!(message.contains("attend the next 0 classes"));
  }

  #[tokio::test]
  async fn advice_reports_classes_needed_and_commitments() {
    let router = make_router().await;
    let user = sign_in(&router).await;
    let rec = add_subject(&router, &user, "Physics").await;
    let id = rec["id"].as_str().unwrap();
    set_count(&router, &user, id, "conducted", 20).await;
    set_count(&router, &user, id, "present", 10).await;

    let resp = send(
      &router,
      "POST",
      &format!("/users/{user}/advice"),
      Some(json!({ "target": 75, "commitments": " trip on Friday " })),
    )
    .await;
    let body = json_body(resp).await;
    assert_eq!(body["target"], 75);
    assert_eq!(body["summary"]["overall_percentage"], 50.0);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("attend the next 20 classes without fail"));
    assert!(message.contains("\"trip on Friday\""));
  }

  #[tokio::test]
  async fn advice_rejects_unsupported_targets() {
    let router = make_router().await;
    let user = sign_in(&router).await;

    for target in [80, 100] {
      let resp = send(
        &router,
        "POST",
        &format!("/users/{user}/advice"),
        Some(json!({ "target": target })),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
  }
}
