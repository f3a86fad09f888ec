//! TUI rendering — orchestrates all panes.

pub mod advice;
pub mod subject_table;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Mode};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let s = &app.summary;

  let left = Span::styled(
    " tally",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let overall_style = if s.meets(app.target) {
    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
  };
  let overall = Span::styled(format!("  {:.2}%", s.overall_percentage), overall_style);
  let right = Span::styled(
    format!(
      "held {}  present {}  absent {} ",
      s.total_conducted,
      s.total_present,
      s.total_absent().max(0)
    ),
    Style::default().fg(Color::Gray),
  );

  let used = (left.content.len() + overall.content.len() + right.content.len()) as u16;
  let pad = area.width.saturating_sub(used);

  let line = Line::from(vec![
    left,
    overall,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);

  subject_table::draw(f, cols[0], app);
  advice::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.mode {
    Mode::Normal => (
      "NORMAL",
      "jk move  a add  c/p edit  +/- class  d delete  t target  n notes  Enter advise  q quit".to_string(),
    ),
    Mode::Filter => ("SEARCH", "Type to filter  Esc cancel  Enter keep".to_string()),
    Mode::AddName => ("ADD", format!("Name: {}_", app.input)),
    Mode::AddType => ("ADD", format!("Type for {}: {}_", app.draft_name.trim(), app.input)),
    Mode::Edit(_, field) => ("EDIT", format!("{field}: {}_", app.input)),
    Mode::ConfirmDelete(id) => {
      let name = app.subject(id).map(|s| s.name.as_str()).unwrap_or("");
      ("DELETE", format!("Delete {name}? y/n"))
    }
    Mode::Commitments => ("NOTES", "Enter save  Esc cancel".to_string()),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let message = match &app.error {
    Some(err) => Span::styled(
      format!("  {err}  (Esc/x dismiss, r reconnect)"),
      Style::default().fg(Color::Red),
    ),
    None => Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray)),
  };

  let line = Line::from(vec![mode_span, message]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use ratatui::{Terminal, backend::TestBackend};
  use tally_core::{store::Snapshot, subject::SubjectRecord, user::UserId};
  use uuid::Uuid;

  use super::*;
  use crate::{
    client::{ApiClient, ApiConfig},
    subscription::SubscriptionEvent,
  };

  fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(140, 20)).unwrap();
    terminal.draw(|f| draw(f, app)).unwrap();
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
      .content
      .chunks(width)
      .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  fn app() -> App {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://127.0.0.1:9".into(),
    })
    .unwrap();
    App::new(client, UserId::new_anonymous())
  }

  #[test]
  fn empty_dashboard_shows_hint_and_zero_summary() {
    let screen = render(&app());
    assert!(screen.contains("No subjects yet"));
    assert!(screen.contains("0.00%"));
    assert!(screen.contains("Press Enter for advice."));
  }

  #[test]
  fn table_shows_counts_and_clamped_absent() {
    let mut app = app();
    app.apply(SubscriptionEvent::Snapshot(Snapshot {
      version:  3,
      subjects: vec![
        SubjectRecord {
          id:        Uuid::new_v4(),
          name:      "Physics".into(),
          kind:      "Lecture".into(),
          conducted: 40,
          present:   30,
        },
        SubjectRecord {
          id:        Uuid::new_v4(),
          name:      "Drawing".into(),
          kind:      "Lab".into(),
          conducted: 2,
          present:   5,
        },
      ],
    }));
    let screen = render(&app);

    assert!(screen.contains("Subjects (2)"));
    let physics = screen.lines().find(|l| l.contains("Physics")).unwrap();
    assert!(physics.contains("75.0"));
    let drawing = screen.lines().find(|l| l.contains("Drawing")).unwrap();
    assert!(!drawing.contains("-3"));
  }

  #[test]
  fn error_replaces_hints() {
    let mut app = app();
    app.error = Some("POST /subjects → 500".into());
    let screen = render(&app);
    assert!(screen.contains("POST /subjects → 500"));
    assert!(!screen.contains("Enter advise"));
  }

  #[test]
  fn advice_message_is_rendered() {
    let mut app = app();
    app.advise();
    let screen = render(&app);
    assert!(screen.contains("Your overall attendance is 0.00%."));
  }
}
