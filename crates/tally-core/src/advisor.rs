//! Templated attendance advice.
//!
//! The advice is deterministic: it reads the current [`Summary`], the chosen
//! [`Target`] and whatever the user typed about upcoming commitments, and
//! fills in one of a few fixed sentences.

use std::fmt::Write as _;

use crate::{attendance::Target, summary::Summary};

/// Build the advisory message shown after the user asks for advice.
///
/// The message has two paragraphs separated by a blank line: the first
/// reports the current percentage and either congratulates or states how many
/// classes must be attended; the second echoes `commitments` (trimmed) or
/// falls back to a generic reminder.
///
/// The percentage is rounded for display only; the branch is chosen on the
/// exact counts, so 74.9975% prints as `75.00%` and still falls short of 75%.
pub fn advise(summary: &Summary, target: Target, commitments: Option<&str>) -> String {
  let mut out = String::new();
  let goal = target.percent();

  let _ = writeln!(
    out,
    "Your overall attendance is {:.2}%.",
    summary.overall_percentage
  );

  if summary.meets(target) {
    let _ = writeln!(
      out,
      "You are at or above your {goal}% target. Keep attending regularly to stay there."
    );
  } else {
    let needed = summary.classes_needed(target);
    let _ = writeln!(
      out,
      "To reach {goal}%, you must attend the next {needed} {} without fail.",
      if needed == 1 { "class" } else { "classes" }
    );
  }

  let _ = writeln!(out);

  match commitments.map(str::trim).filter(|c| !c.is_empty()) {
    Some(text) => {
      let _ = write!(
        out,
        "Heads up: you mentioned \"{text}\". Plan around it so those absences do not pull you below {goal}%."
      );
    }
    None => {
      let _ = write!(
        out,
        "Remember that every missed class lowers your percentage, so try not to skip any sessions."
      );
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn summary(present: u64, conducted: u64) -> Summary {
    Summary {
      total_conducted:    conducted,
      total_present:      present,
      overall_percentage: crate::attendance::percentage(present, conducted),
    }
  }

  fn target(p: u8) -> Target { Target::new(p).unwrap() }

  #[test]
  fn empty_summary_reports_zero_owed() {
    let msg = advise(&Summary::default(), target(75), None);
    assert_eq!(
      msg,
      "Your overall attendance is 0.00%.\n\
       To reach 75%, you must attend the next 0 classes without fail.\n\
       \n\
       Remember that every missed class lowers your percentage, so try not to skip any sessions."
    );
  }

  #[test]
  fn below_target_reports_projection() {
    let msg = advise(&summary(10, 20), target(75), None);
    assert!(msg.starts_with("Your overall attendance is 50.00%.\n"));
    assert!(msg.contains("attend the next 20 classes without fail"));
  }

  #[test]
  fn singular_class() {
    // 2 of 3 at 75%: (2.25 - 2) / 0.25 = 1.
    let msg = advise(&summary(2, 3), target(75), None);
    assert!(msg.contains("attend the next 1 class without fail"));
  }

  #[test]
  fn at_target_congratulates() {
    let msg = advise(&summary(30, 40), target(75), None);
    assert!(msg.contains("75.00%"));
    assert!(msg.contains("at or above your 75% target"));
    assert!(!msg.contains("without fail"));
  }

  #[test]
  fn commitments_are_trimmed_and_echoed() {
    let msg = advise(&summary(30, 40), target(85), Some("  family wedding next week \n"));
    let (_, second) = msg.split_once("\n\n").unwrap();
    assert_eq!(
      second,
      "Heads up: you mentioned \"family wedding next week\". Plan around it so those absences do not pull you below 85%."
    );
  }

  #[test]
  fn blank_commitments_fall_back_to_reminder() {
    let with_blank = advise(&summary(30, 40), target(85), Some("   "));
    let with_none = advise(&summary(30, 40), target(85), None);
    assert_eq!(with_blank, with_none);
  }

  #[test]
  fn rounded_display_does_not_decide_the_branch() {
    // 29999/40000 is 74.9975%: shown as 75.00% yet still below a 75% target.
    let msg = advise(&summary(29_999, 40_000), target(75), None);
    assert!(msg.starts_with("Your overall attendance is 75.00%.\n"));
    assert!(msg.contains("To reach 75%, you must attend the next 4 classes without fail."));
    assert!(!msg.contains("at or above"));
  }

  #[test]
  fn advice_is_deterministic() {
    let s = summary(17, 25);
    assert_eq!(advise(&s, target(85), Some("exams")), advise(&s, target(85), Some("exams")));
  }
}
