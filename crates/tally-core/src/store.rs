//! The `SubjectStore` trait and the snapshot feed it publishes.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-api`, `tally-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
  subject::{CountField, NewSubject, SubjectRecord},
  summary::Summary,
  user::UserId,
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The complete subject collection of one user at one point in time.
///
/// `version` grows by one with every committed write for the user, so a
/// consumer can tell whether it has already seen a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub version:  u64,
  pub subjects: Vec<SubjectRecord>,
}

impl Snapshot {
  pub fn summary(&self) -> Summary { Summary::from_records(&self.subjects) }
}

/// Receiving half of a subscription. Dropping it unsubscribes.
pub type SnapshotReceiver = watch::Receiver<Snapshot>;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a per-user document store of subject records.
///
/// Every write is followed by a fresh [`Snapshot`] on all live subscriptions
/// of the affected user. Writers never rely on the return value to refresh
/// their view; the subscription is the source of truth.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubjectStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identity ──────────────────────────────────────────────────────────

  /// Mint and persist a new anonymous identity.
  fn sign_in_anonymously(&self) -> impl Future<Output = Result<UserId, Self::Error>> + Send + '_;

  /// Whether `user` was issued by this store; used to resume a session.
  fn user_exists(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All subjects of `user`, oldest first.
  fn list_subjects(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Vec<SubjectRecord>, Self::Error>> + Send + '_;

  /// The current snapshot of `user`'s collection.
  fn snapshot(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;

  /// Subscribe to `user`'s collection. The receiver already holds the
  /// current snapshot and sees a new one after every write.
  fn subscribe(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<SnapshotReceiver, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a new subject with both counts at zero.
  fn create_subject(
    &self,
    user: UserId,
    input: NewSubject,
  ) -> impl Future<Output = Result<SubjectRecord, Self::Error>> + Send + '_;

  /// Overwrite one count of a subject. Returns `None` if the subject does not
  /// exist for `user`. Concurrent writers to the same field: last write wins.
  fn update_count(
    &self,
    user: UserId,
    id: Uuid,
    field: CountField,
    value: u32,
  ) -> impl Future<Output = Result<Option<SubjectRecord>, Self::Error>> + Send + '_;

  /// Remove a subject. Returns `false` if it did not exist for `user`.
  fn delete_subject(
    &self,
    user: UserId,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
