//! Subject table — left panel.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::Line,
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use tally_core::subject::SubjectRecord;

use crate::app::{App, Mode};

/// Render the subject table into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_subjects();
  let total = app.snapshot.subjects.len();

  let title = if app.mode == Mode::Filter || !app.filter.is_empty() {
    format!(" Subjects ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Subjects ({}) ", total)
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  if (app.mode == Mode::Filter || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.mode == Mode::Filter {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if total == 0 {
    f.render_widget(
      Paragraph::new("No subjects yet. Press [a] to add one.")
        .style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let header = Row::new([
    "Subject", "Type", "Held", "Present", "Absent", "%", "Needed",
  ])
  .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows: Vec<Row> = filtered.iter().map(|s| row(s, app)).collect();

  let widths = [
    Constraint::Min(12),
    Constraint::Length(10),
    Constraint::Length(6),
    Constraint::Length(8),
    Constraint::Length(7),
    Constraint::Length(8),
    Constraint::Length(7),
  ];

  let mut state = TableState::default();
  state.select(if filtered.is_empty() {
    None
  } else {
    Some(app.list_cursor)
  });

  f.render_stateful_widget(
    Table::new(rows, widths)
      .header(header)
      .row_highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    inner_area,
    &mut state,
  );
}

fn row<'a>(subject: &'a SubjectRecord, app: &App) -> Row<'a> {
  let pct = subject.percentage();
  let needed = subject.classes_needed(app.target);
  let pct_style = if needed == 0 && subject.conducted > 0 {
    Style::default().fg(Color::Green)
  } else if subject.conducted == 0 {
    Style::default().fg(Color::DarkGray)
  } else {
    Style::default().fg(Color::Red)
  };

  Row::new([
    Cell::from(subject.name.as_str()),
    Cell::from(Line::styled(
      subject.kind.as_str(),
      Style::default().fg(Color::DarkGray),
    )),
    Cell::from(subject.conducted.to_string()),
    Cell::from(subject.present.to_string()),
    Cell::from(subject.absent_clamped().to_string()),
    Cell::from(Line::styled(format!("{pct:.1}"), pct_style)),
    Cell::from(needed.to_string()),
  ])
}
