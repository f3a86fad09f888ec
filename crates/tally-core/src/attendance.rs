//! Attendance arithmetic: percentages, target checks and projections.
//!
//! Counts are widened to `u64` so the same functions serve single records
//! and summed totals. Projections are evaluated in exact integer arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Target ──────────────────────────────────────────────────────────────────

/// A target attendance percentage in `0..=99`.
///
/// 100 is rejected: once a single class has been missed, no number of
/// attended classes brings the ratio back to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Target(u8);

impl Target {
  /// The targets offered to users when asking for advice.
  pub const CHOICES: [Target; 2] = [Target(75), Target(85)];

  pub fn new(percent: u8) -> Result<Self> {
    if percent >= 100 {
      return Err(Error::UnreachableTarget(percent));
    }
    Ok(Self(percent))
  }

  /// Like [`Target::new`] but only accepts one of [`Target::CHOICES`].
  pub fn choice(percent: u8) -> Result<Self> {
    Self::CHOICES
      .into_iter()
      .find(|t| t.0 == percent)
      .ok_or(Error::UnsupportedTarget(percent))
  }

  pub fn percent(self) -> u8 { self.0 }

  /// The next entry of [`Target::CHOICES`], wrapping around. Targets that are
  /// not a choice move to the first one.
  pub fn next_choice(self) -> Self {
    let pos = Self::CHOICES.iter().position(|t| *t == self);
    match pos {
      Some(i) => Self::CHOICES[(i + 1) % Self::CHOICES.len()],
      None => Self::CHOICES[0],
    }
  }
}

impl Default for Target {
  fn default() -> Self { Self::CHOICES[0] }
}

impl TryFrom<u8> for Target {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self> { Self::new(value) }
}

impl From<Target> for u8 {
  fn from(t: Target) -> u8 { t.0 }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}%", self.0) }
}

// ─── Calculators ─────────────────────────────────────────────────────────────

/// `present / conducted * 100`, or `0` when nothing has been conducted.
pub fn percentage(present: u64, conducted: u64) -> f64 {
  if conducted == 0 {
    return 0.0;
  }
  present as f64 / conducted as f64 * 100.0
}

/// Whether the current ratio is at or above `target`.
///
/// Agrees with `percentage(present, conducted) >= target` but is exact: with
/// nothing conducted the percentage is `0`, so only a `0%` target is met.
pub fn meets_target(present: u64, conducted: u64, target: Target) -> bool {
  if conducted == 0 {
    return target.0 == 0;
  }
  u128::from(present) * 100 >= u128::from(target.0) * u128::from(conducted)
}

/// Minimum number of further classes, all attended, that lifts the ratio to
/// `target`.
///
/// Solves `(present + n) / (conducted + n) >= t` for the smallest
/// non-negative `n`, i.e. `n = ceil((t * conducted - present) / (1 - t))`
/// clamped at zero. Returns `0` when the target is already met, and also when
/// nothing has been conducted yet.
pub fn classes_needed(present: u64, conducted: u64, target: Target) -> u64 {
  if conducted > 0 && meets_target(present, conducted, target) {
    return 0;
  }

  let owed = u128::from(target.0) * u128::from(conducted);
  let held = u128::from(present) * 100;
  if owed <= held {
    return 0;
  }

  // `target < 100` keeps the denominator positive.
  let n = (owed - held).div_ceil(100 - u128::from(target.0));
  u64::try_from(n).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn t(p: u8) -> Target { Target::new(p).unwrap() }

  #[test]
  fn percentage_of_nothing_is_zero() {
    assert_eq!(percentage(0, 0), 0.0);
    assert_eq!(percentage(5, 0), 0.0);
  }

  #[test]
  fn percentage_scenario() {
    assert_eq!(percentage(30, 40), 75.0);
    assert_eq!(percentage(40, 40), 100.0);
  }

  #[test]
  fn projection_scenario() {
    assert_eq!(classes_needed(10, 20, t(75)), 20);
    // 30 / 40 = 75%: nothing owed.
    assert_eq!(classes_needed(30, 40, t(75)), 0);
    // 29 / 40: (0.75*40 - 29) / 0.25 = 4.
    assert_eq!(classes_needed(29, 40, t(75)), 4);
    assert!(meets_target(33, 40, t(75)));
    assert!(!meets_target(33, 40, t(85)));
  }

  #[test]
  fn projection_rounds_up() {
    // (0.85*20 - 10) / 0.15 = 46.67 → 47, and 47 is enough while 46 is not.
    let n = classes_needed(10, 20, t(85));
    assert_eq!(n, 47);
    assert!(meets_target(10 + n, 20 + n, t(85)));
    assert!(!meets_target(10 + n - 1, 20 + n - 1, t(85)));
  }

  #[test]
  fn projection_with_nothing_conducted_is_zero() {
    assert_eq!(classes_needed(0, 0, t(75)), 0);
    assert!(!meets_target(0, 0, t(75)));
  }

  #[test]
  fn projection_clamps_inconsistent_counts() {
    assert_eq!(classes_needed(3, 0, t(85)), 0);
  }

  #[test]
  fn zero_target_is_always_met_with_classes() {
    assert!(meets_target(0, 10, t(0)));
    assert_eq!(classes_needed(0, 10, t(0)), 0);
  }

  #[test]
  fn full_attendance_target_is_rejected() {
    assert!(matches!(Target::new(100), Err(Error::UnreachableTarget(100))));
    assert!(matches!(Target::new(250), Err(Error::UnreachableTarget(250))));
    assert!(Target::new(99).is_ok());
  }

  #[test]
  fn choices_cycle() {
    let first = Target::default();
    assert_eq!(first.percent(), 75);
    assert_eq!(first.next_choice().percent(), 85);
    assert_eq!(first.next_choice().next_choice(), first);
    assert_eq!(t(60).next_choice(), first);
  }

  #[test]
  fn choice_rejects_values_outside_the_menu() {
    assert_eq!(Target::choice(85).unwrap().percent(), 85);
    assert!(matches!(Target::choice(80), Err(Error::UnsupportedTarget(80))));
  }

  #[test]
  fn target_deserialises_with_validation() {
    let ok: Target = serde_json::from_str("85").unwrap();
    assert_eq!(ok.percent(), 85);
    assert!(serde_json::from_str::<Target>("100").is_err());
    assert_eq!(ok.to_string(), "85%");
  }
}
