//! [`SqliteStore`] — the SQLite implementation of [`SubjectStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tally_core::{
  store::{Snapshot, SnapshotReceiver, SubjectStore},
  subject::{CountField, NewSubject, SubjectRecord},
  user::UserId,
};

use crate::{
  Error, Result,
  encode::{RawSnapshot, RawSubject, SUBJECT_COLUMNS, count_column, encode_dt, encode_user, encode_uuid},
  feed::Feeds,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally subject store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection and the subscription registry are
/// reference-counted, so clones share subscribers.
#[derive(Clone)]
pub struct SqliteStore {
  conn:             tokio_rusqlite::Connection,
  pub(crate) feeds: Feeds,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, feeds: Feeds::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, feeds: Feeds::default() };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read the version counter and every subject of `user` in one
  /// transaction. Unknown users read as an empty collection at version 0.
  async fn read_snapshot(&self, user: UserId) -> Result<Snapshot> {
    let user_str = encode_user(user);

    let raw: RawSnapshot = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let version: i64 = tx
          .query_row(
            "SELECT version FROM users WHERE user_id = ?1",
            rusqlite::params![user_str],
            |r| r.get(0),
          )
          .optional()?
          .unwrap_or(0);

        let subjects = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects
             WHERE user_id = ?1
             ORDER BY created_at, rowid"
          ))?;
          stmt
            .query_map(rusqlite::params![user_str], RawSubject::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        tx.commit()?;
        Ok(RawSnapshot { version, subjects })
      })
      .await?;

    raw.into_snapshot()
  }

  /// Push the current snapshot to `user`'s subscribers.
  ///
  /// The write that triggered this has already committed, so a failed read
  /// here is logged rather than returned; subscribers catch up on the next
  /// successful publish.
  async fn publish(&self, user: UserId) {
    if !self.feeds.is_watched(user) {
      return;
    }
    match self.read_snapshot(user).await {
      Ok(snapshot) => {
        tracing::debug!(%user, version = snapshot.version, "publishing snapshot");
        self.feeds.publish(user, snapshot);
      }
      Err(e) => tracing::warn!(%user, error = %e, "failed to publish snapshot"),
    }
  }
}

// ─── SubjectStore impl ───────────────────────────────────────────────────────

impl SubjectStore for SqliteStore {
  type Error = Error;

  // ── Identity ──────────────────────────────────────────────────────────────

  async fn sign_in_anonymously(&self) -> Result<UserId> {
    let user = UserId::new_anonymous();
    let id_str = encode_user(user);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, created_at) VALUES (?1, ?2)",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(%user, "anonymous sign-in");
    Ok(user)
  }

  async fn user_exists(&self, user: UserId) -> Result<bool> {
    let id_str = encode_user(user);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_subjects(&self, user: UserId) -> Result<Vec<SubjectRecord>> {
    Ok(self.read_snapshot(user).await?.subjects)
  }

  async fn snapshot(&self, user: UserId) -> Result<Snapshot> { self.read_snapshot(user).await }

  async fn subscribe(&self, user: UserId) -> Result<SnapshotReceiver> {
    let initial = self.read_snapshot(user).await?;
    let rx = self.feeds.attach(user, initial);

    // A write committing between the read above and `attach` published to
    // nobody. Re-reading once the channel exists closes that gap.
    let latest = self.read_snapshot(user).await?;
    self.feeds.publish(user, latest);

    Ok(rx)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create_subject(&self, user: UserId, input: NewSubject) -> Result<SubjectRecord> {
    let record = input.into_record(Uuid::new_v4());

    let user_str = encode_user(user);
    let id_str   = encode_uuid(record.id);
    let name     = record.name.clone();
    let kind     = record.kind.clone();
    let at_str   = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Bumping the version doubles as the existence check for the user.
        let bumped = tx.execute(
          "UPDATE users SET version = version + 1 WHERE user_id = ?1",
          rusqlite::params![user_str],
        )?;
        if bumped == 0 {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO subjects (subject_id, user_id, name, kind, conducted, present, created_at)
           VALUES (?1, ?2, ?3, ?4, 0, 0, ?5)",
          rusqlite::params![id_str, user_str, name, kind, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::UserNotFound(user));
    }

    tracing::debug!(%user, subject_id = %record.id, "subject created");
    self.publish(user).await;
    Ok(record)
  }

  async fn update_count(
    &self,
    user:  UserId,
    id:    Uuid,
    field: CountField,
    value: u32,
  ) -> Result<Option<SubjectRecord>> {
    let column   = count_column(field);
    let user_str = encode_user(user);
    let id_str   = encode_uuid(id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          &format!("UPDATE subjects SET {column} = ?1 WHERE subject_id = ?2 AND user_id = ?3"),
          rusqlite::params![i64::from(value), id_str, user_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        tx.execute(
          "UPDATE users SET version = version + 1 WHERE user_id = ?1",
          rusqlite::params![user_str],
        )?;
        let raw = tx.query_row(
          &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE subject_id = ?1"),
          rusqlite::params![id_str],
          RawSubject::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    let Some(raw) = raw else {
      return Ok(None);
    };
    let record = raw.into_record()?;

    tracing::debug!(%user, subject_id = %id, %field, value, "count updated");
    self.publish(user).await;
    Ok(Some(record))
  }

  async fn delete_subject(&self, user: UserId, id: Uuid) -> Result<bool> {
    let user_str = encode_user(user);
    let id_str   = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let removed = tx.execute(
          "DELETE FROM subjects WHERE subject_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_str],
        )?;
        if removed == 0 {
          return Ok(false);
        }
        tx.execute(
          "UPDATE users SET version = version + 1 WHERE user_id = ?1",
          rusqlite::params![user_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if deleted {
      tracing::debug!(%user, subject_id = %id, "subject deleted");
      self.publish(user).await;
    }
    Ok(deleted)
  }
}
