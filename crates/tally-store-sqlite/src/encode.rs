//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings and
//! counts plain integers.

use chrono::{DateTime, Utc};
use tally_core::{
  store::Snapshot,
  subject::{CountField, SubjectRecord},
  user::UserId,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_user(user: UserId) -> String { encode_uuid(user.as_uuid()) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── CountField ───────────────────────────────────────────────────────────────

/// Column name for a count field. Only ever interpolated from this match, so
/// it is safe to splice into SQL.
pub fn count_column(field: CountField) -> &'static str {
  match field {
    CountField::Conducted => "conducted",
    CountField::Present => "present",
  }
}

fn decode_count(column: &'static str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::InvalidCount { column, value })
}

// ─── Raw row types ────────────────────────────────────────────────────────────

pub const SUBJECT_COLUMNS: &str = "subject_id, name, kind, conducted, present";

/// A `subjects` row as read from SQLite, before validation.
pub struct RawSubject {
  pub subject_id: String,
  pub name:       String,
  pub kind:       String,
  pub conducted:  i64,
  pub present:    i64,
}

impl RawSubject {
  /// Read a row selected with [`SUBJECT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id: row.get(0)?,
      name:       row.get(1)?,
      kind:       row.get(2)?,
      conducted:  row.get(3)?,
      present:    row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<SubjectRecord> {
    Ok(SubjectRecord {
      id:        decode_uuid(&self.subject_id)?,
      name:      self.name,
      kind:      self.kind,
      conducted: decode_count("conducted", self.conducted)?,
      present:   decode_count("present", self.present)?,
    })
  }
}

/// A user's version plus every subject row, read in one transaction.
pub struct RawSnapshot {
  pub version:  i64,
  pub subjects: Vec<RawSubject>,
}

impl RawSnapshot {
  pub fn into_snapshot(self) -> Result<Snapshot> {
    Ok(Snapshot {
      version:  u64::try_from(self.version).unwrap_or_default(),
      subjects: self
        .subjects
        .into_iter()
        .map(RawSubject::into_record)
        .collect::<Result<_>>()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_counts_are_rejected() {
    let raw = RawSubject {
      subject_id: encode_uuid(Uuid::new_v4()),
      name:       "Art".into(),
      kind:       "Studio".into(),
      conducted:  -1,
      present:    0,
    };
    assert!(matches!(
      raw.into_record(),
      Err(Error::InvalidCount { column: "conducted", value: -1 })
    ));
  }

  #[test]
  fn bad_uuid_is_an_error() {
    assert!(decode_uuid("not-a-uuid").is_err());
  }
}
