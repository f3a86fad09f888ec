//! Advice pane — right panel.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Mode};

/// Render target, commitments and the last advisor message into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Advice ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // target
      Constraint::Length(2), // commitments
      Constraint::Length(1), // spacer
      Constraint::Min(0),    // message
    ])
    .split(inner);

  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

  let choices: Vec<Span> = tally_core::attendance::Target::CHOICES
    .iter()
    .flat_map(|t| {
      let style = if *t == app.target {
        Style::default().fg(Color::Black).bg(Color::Cyan)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      [Span::styled(format!(" {t} "), style), Span::raw(" ")]
    })
    .collect();
  let mut target_line = vec![Span::styled("Target       ", label)];
  target_line.extend(choices);
  f.render_widget(Paragraph::new(Line::from(target_line)), rows[0]);

  let commitments = if app.mode == Mode::Commitments {
    Span::styled(format!("{}_", app.input), Style::default().fg(Color::Yellow))
  } else if app.commitments.trim().is_empty() {
    Span::styled("(none)", Style::default().fg(Color::DarkGray))
  } else {
    Span::raw(app.commitments.clone())
  };
  f.render_widget(
    Paragraph::new(Line::from(vec![
      Span::styled("Commitments  ", label),
      commitments,
    ]))
    .wrap(Wrap { trim: false }),
    rows[1],
  );

  let message = match &app.advice {
    Some(text) => Paragraph::new(text.as_str()),
    None => Paragraph::new("Press Enter for advice.").style(Style::default().fg(Color::DarkGray)),
  };
  f.render_widget(message.wrap(Wrap { trim: false }), rows[3]);
}
