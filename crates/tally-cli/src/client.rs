//! Async HTTP client wrapping the tally JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tally_core::{
  store::Snapshot,
  subject::{CountField, NewSubject, SubjectRecord},
  user::UserId,
};
use uuid::Uuid;

/// Connection settings for the tally API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

#[derive(Deserialize)]
struct SessionBody {
  user_id: UserId,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the tally JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Identity ──────────────────────────────────────────────────────────────

  /// `POST /api/users`
  pub async fn sign_in(&self) -> Result<UserId> {
    let resp = self
      .client
      .post(self.url("/users"))
      .send()
      .await
      .context("POST /users failed")?;
    let body: SessionBody = ok_or_error(resp, "POST /users")
      .await?
      .json()
      .await
      .context("deserialising session")?;
    Ok(body.user_id)
  }

  /// `GET /api/users/{user_id}` — `false` on 404.
  pub async fn user_exists(&self, user: UserId) -> Result<bool> {
    let resp = self
      .client
      .get(self.url(&format!("/users/{user}")))
      .send()
      .await
      .context("GET /users/{id} failed")?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    ok_or_error(resp, "GET /users/{id}").await?;
    Ok(true)
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  /// `POST /api/users/{user_id}/subjects`
  pub async fn create_subject(&self, user: UserId, input: &NewSubject) -> Result<SubjectRecord> {
    let resp = self
      .client
      .post(self.url(&format!("/users/{user}/subjects")))
      .json(&json!({ "name": input.name(), "type": input.kind() }))
      .send()
      .await
      .context("POST /subjects failed")?;
    ok_or_error(resp, "POST /subjects")
      .await?
      .json()
      .await
      .context("deserialising subject")
  }

  /// `PATCH /api/users/{user_id}/subjects/{id}`
  pub async fn update_count(
    &self,
    user: UserId,
    id: Uuid,
    field: CountField,
    value: u32,
  ) -> Result<SubjectRecord> {
    let resp = self
      .client
      .patch(self.url(&format!("/users/{user}/subjects/{id}")))
      .json(&json!({ "field": field, "value": value }))
      .send()
      .await
      .context("PATCH /subjects/{id} failed")?;
    ok_or_error(resp, "PATCH /subjects/{id}")
      .await?
      .json()
      .await
      .context("deserialising subject")
  }

  /// `DELETE /api/users/{user_id}/subjects/{id}`
  pub async fn delete_subject(&self, user: UserId, id: Uuid) -> Result<()> {
    let resp = self
      .client
      .delete(self.url(&format!("/users/{user}/subjects/{id}")))
      .send()
      .await
      .context("DELETE /subjects/{id} failed")?;
    ok_or_error(resp, "DELETE /subjects/{id}").await?;
    Ok(())
  }

  // ── Snapshot ──────────────────────────────────────────────────────────────

  /// `GET /api/users/{user_id}/snapshot[?after=<v>&wait_secs=<n>]`
  ///
  /// With `after`, the server holds the request until a newer version exists
  /// or `wait_secs` pass. `wait_secs` must stay below the client timeout.
  pub async fn snapshot(&self, user: UserId, after: Option<u64>, wait_secs: u64) -> Result<Snapshot> {
    let mut req = self.client.get(self.url(&format!("/users/{user}/snapshot")));
    if let Some(after) = after {
      req = req.query(&[("after", after), ("wait_secs", wait_secs)]);
    }
    let resp = req.send().await.context("GET /snapshot failed")?;
    ok_or_error(resp, "GET /snapshot")
      .await?
      .json()
      .await
      .context("deserialising snapshot")
  }
}

/// Pass successful responses through; turn anything else into an error
/// carrying the server's `{"error": ...}` message when there is one.
async fn ok_or_error(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  match resp.json::<ErrorBody>().await {
    Ok(body) => Err(anyhow!("{what} → {status}: {}", body.error)),
    Err(_) => Err(anyhow!("{what} → {status}")),
  }
}
