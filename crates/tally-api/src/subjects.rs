//! Handlers for `/users/{user_id}/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users/{user_id}/subjects` | Oldest first |
//! | `POST`   | `/users/{user_id}/subjects` | Body: `{"name":"...","type":"..."}`; 400 if either is blank |
//! | `PATCH`  | `/users/{user_id}/subjects/{id}` | Body: `{"field":"conducted","value":12}` |
//! | `DELETE` | `/users/{user_id}/subjects/{id}` | 204, or 404 if unknown |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tally_core::{
  store::SubjectStore,
  subject::{CountField, NewSubject, SubjectRecord},
  user::UserId,
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path},
  users::require_user,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users/{user_id}/subjects`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<UserId>,
) -> Result<Json<Vec<SubjectRecord>>, ApiError>
where
  S: SubjectStore,
{
  require_user(store.as_ref(), user_id).await?;
  let subjects = store.list_subjects(user_id).await.map_err(ApiError::store)?;
  Ok(Json(subjects))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
  #[serde(rename = "type")]
  pub kind: String,
}

/// `POST /users/{user_id}/subjects` — returns 201 + the stored record.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<UserId>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubjectStore,
{
  let input = NewSubject::new(&body.name, &body.kind)?;
  require_user(store.as_ref(), user_id).await?;
  let record = store
    .create_subject(user_id, input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub field: CountField,
  pub value: u32,
}

/// `PATCH /users/{user_id}/subjects/{id}` — overwrite one count.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path((user_id, id)): Path<(UserId, Uuid)>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<SubjectRecord>, ApiError>
where
  S: SubjectStore,
{
  require_user(store.as_ref(), user_id).await?;
  let record = store
    .update_count(user_id, id, body.field, body.value)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /users/{user_id}/subjects/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path((user_id, id)): Path<(UserId, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: SubjectStore,
{
  require_user(store.as_ref(), user_id).await?;
  if store.delete_subject(user_id, id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("subject {id} not found")))
  }
}
