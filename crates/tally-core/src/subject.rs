//! Subject records — one per course the user tracks attendance for.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  attendance::{self, Target},
};

// ─── SubjectRecord ───────────────────────────────────────────────────────────

/// A stored subject with its class counts.
///
/// `present <= conducted` is assumed but never enforced; see
/// [`SubjectRecord::absent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
  /// Assigned by the store on creation; never changes.
  pub id:        Uuid,
  pub name:      String,
  /// Free-text category such as "Lecture" or "Lab".
  #[serde(rename = "type")]
  pub kind:      String,
  /// Missing counts on the wire read as zero.
  #[serde(default)]
  pub conducted: u32,
  #[serde(default)]
  pub present:   u32,
}

impl SubjectRecord {
  /// Classes missed. Negative when a record was edited so that
  /// `present > conducted`; callers displaying it should use
  /// [`SubjectRecord::absent_clamped`].
  pub fn absent(&self) -> i64 { i64::from(self.conducted) - i64::from(self.present) }

  pub fn absent_clamped(&self) -> u32 {
    u32::try_from(self.absent().max(0)).unwrap_or(u32::MAX)
  }

  pub fn percentage(&self) -> f64 {
    attendance::percentage(u64::from(self.present), u64::from(self.conducted))
  }

  pub fn classes_needed(&self, target: Target) -> u64 {
    attendance::classes_needed(u64::from(self.present), u64::from(self.conducted), target)
  }

  /// Return a copy with `field` set to `value`.
  pub fn with_count(mut self, field: CountField, value: u32) -> Self {
    match field {
      CountField::Conducted => self.conducted = value,
      CountField::Present => self.present = value,
    }
    self
  }
}

// ─── NewSubject ──────────────────────────────────────────────────────────────

/// Validated input to [`crate::store::SubjectStore::create_subject`].
///
/// Both labels are trimmed and must be non-empty. Counts always start at zero
/// so they are not part of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
  name: String,
  kind: String,
}

impl NewSubject {
  pub fn new(name: &str, kind: &str) -> Result<Self> {
    let name = name.trim();
    let kind = kind.trim();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }
    if kind.is_empty() {
      return Err(Error::EmptyType);
    }
    Ok(Self { name: name.to_owned(), kind: kind.to_owned() })
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn kind(&self) -> &str { &self.kind }

  /// Materialise the record a store persists for this input.
  pub fn into_record(self, id: Uuid) -> SubjectRecord {
    SubjectRecord { id, name: self.name, kind: self.kind, conducted: 0, present: 0 }
  }
}

// ─── CountField ──────────────────────────────────────────────────────────────

/// The two independently editable counters of a subject.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CountField {
  Conducted,
  Present,
}

impl CountField {
  /// Parse a field name, mapping failures onto the crate error.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownField(s.to_owned()))
  }
}
