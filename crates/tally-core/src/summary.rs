//! Aggregate totals across every subject of a user.

use serde::{Deserialize, Serialize};

use crate::{
  attendance::{self, Target},
  subject::SubjectRecord,
};

/// Derived totals; never stored, always recomputed from a full collection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
  pub total_conducted:    u64,
  pub total_present:      u64,
  pub overall_percentage: f64,
}

impl Summary {
  /// Fold `records` into totals. Order does not matter.
  pub fn from_records<'a, I>(records: I) -> Self
  where
    I: IntoIterator<Item = &'a SubjectRecord>,
  {
    let (total_conducted, total_present) = records
      .into_iter()
      .fold((0u64, 0u64), |(c, p), rec| {
        (c + u64::from(rec.conducted), p + u64::from(rec.present))
      });

    Self {
      total_conducted,
      total_present,
      overall_percentage: attendance::percentage(total_present, total_conducted),
    }
  }

  pub fn total_absent(&self) -> i128 {
    i128::from(self.total_conducted) - i128::from(self.total_present)
  }

  pub fn meets(&self, target: Target) -> bool {
    attendance::meets_target(self.total_present, self.total_conducted, target)
  }

  pub fn classes_needed(&self, target: Target) -> u64 {
    attendance::classes_needed(self.total_present, self.total_conducted, target)
  }
}
