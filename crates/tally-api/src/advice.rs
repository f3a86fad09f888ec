//! Handler for `POST /users/{user_id}/advice`.
//!
//! Body: `{"target": 75, "commitments": "..."}`. `target` must be one of
//! [`Target::CHOICES`]; `commitments` is optional.

use std::sync::Arc;

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tally_core::{
  advisor, attendance::Target, store::SubjectStore, summary::Summary, user::UserId,
};

use crate::{
  error::ApiError,
  extract::{Json, Path},
  users::require_user,
};

#[derive(Debug, Deserialize)]
pub struct AdviceBody {
  pub target:      u8,
  #[serde(default)]
  pub commitments: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdviceResponse {
  pub target:  Target,
  pub summary: Summary,
  pub message: String,
}

pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<UserId>,
  Json(body): Json<AdviceBody>,
) -> Result<Json<AdviceResponse>, ApiError>
where
  S: SubjectStore,
{
  let target = Target::choice(body.target)?;
  require_user(store.as_ref(), user_id).await?;

  let subjects = store.list_subjects(user_id).await.map_err(ApiError::store)?;
  let summary = Summary::from_records(&subjects);
  let message = advisor::advise(&summary, target, body.commitments.as_deref());

  Ok(Json(AdviceResponse { target, summary, message }))
}
