//! Handlers for `/users` endpoints — anonymous identity.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Anonymous sign-in; returns 201 + `{"user_id": ...}` |
//! | `GET`  | `/users/{user_id}` | 404 if the identity is unknown |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tally_core::{store::SubjectStore, user::UserId};

use crate::{
  error::ApiError,
  extract::{Json, Path},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
  pub user_id: UserId,
}

/// `POST /users`
pub async fn sign_in<S>(State(store): State<Arc<S>>) -> Result<impl IntoResponse, ApiError>
where
  S: SubjectStore,
{
  let user_id = store.sign_in_anonymously().await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(Session { user_id })))
}

/// `GET /users/{user_id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<UserId>,
) -> Result<Json<Session>, ApiError>
where
  S: SubjectStore,
{
  require_user(store.as_ref(), user_id).await?;
  Ok(Json(Session { user_id }))
}

/// 404 unless `user` was issued by `store`.
pub(crate) async fn require_user<S>(store: &S, user: UserId) -> Result<(), ApiError>
where
  S: SubjectStore,
{
  if store.user_exists(user).await.map_err(ApiError::store)? {
    Ok(())
  } else {
    Err(ApiError::NotFound(format!("user {user} not found")))
  }
}
