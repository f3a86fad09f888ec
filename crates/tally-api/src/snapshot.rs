//! Handlers for the live view of a user's collection.
//!
//! `GET /users/{user_id}/snapshot?after=N` is a long-poll: it answers as soon
//! as the collection's version exceeds `N`, or with the current snapshot once
//! `wait_secs` have passed. Without `after` it answers immediately. Clients
//! loop on it, passing the last version they saw, to follow every change.

use std::{sync::Arc, time::Duration};

use axum::extract::State;
use serde::Deserialize;
use tally_core::{
  store::{Snapshot, SubjectStore},
  summary::Summary,
  user::UserId,
};

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
  users::require_user,
};

pub const DEFAULT_WAIT_SECS: u64 = 20;
pub const MAX_WAIT_SECS: u64 = 60;

#[derive(Debug, Deserialize, Default)]
pub struct SnapshotParams {
  /// Last version the client has seen.
  pub after:     Option<u64>,
  pub wait_secs: Option<u64>,
}

/// `GET /users/{user_id}/snapshot[?after=<version>][&wait_secs=<n>]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<UserId>,
  Query(params): Query<SnapshotParams>,
) -> Result<Json<Snapshot>, ApiError>
where
  S: SubjectStore,
{
  require_user(store.as_ref(), user_id).await?;

  let Some(after) = params.after else {
    let snapshot = store.snapshot(user_id).await.map_err(ApiError::store)?;
    return Ok(Json(snapshot));
  };

  let wait = Duration::from_secs(params.wait_secs.unwrap_or(DEFAULT_WAIT_SECS).min(MAX_WAIT_SECS));
  let mut rx = store.subscribe(user_id).await.map_err(ApiError::store)?;

  let newer = tokio::time::timeout(wait, rx.wait_for(|snap| snap.version > after))
    .await
    .ok()
    .and_then(Result::ok)
    .map(|snap| snap.clone());

  let snapshot = match newer {
    Some(snapshot) => snapshot,
    None => store.snapshot(user_id).await.map_err(ApiError::store)?,
  };
  Ok(Json(snapshot))
}

/// `GET /users/{user_id}/summary`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<UserId>,
) -> Result<Json<Summary>, ApiError>
where
  S: SubjectStore,
{
  require_user(store.as_ref(), user_id).await?;
  let subjects = store.list_subjects(user_id).await.map_err(ApiError::store)?;
  Ok(Json(Summary::from_records(&subjects)))
}
