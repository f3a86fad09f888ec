//! Application state machine and event dispatcher.
//!
//! Writes go straight to the server and their results are discarded: the
//! table only changes when the subscription delivers the next snapshot.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use tally_core::{
  advisor,
  attendance::Target,
  store::Snapshot,
  subject::{CountField, NewSubject, SubjectRecord},
  summary::Summary,
  user::UserId,
};
use uuid::Uuid;

use crate::{
  client::ApiClient,
  subscription::{Subscription, SubscriptionEvent},
};

// ─── Mode ─────────────────────────────────────────────────────────────────────

/// What keystrokes currently operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Navigating the subject table.
  Normal,
  /// Typing a fuzzy filter.
  Filter,
  /// First step of the add form.
  AddName,
  /// Second step of the add form; the name is in `draft_name`.
  AddType,
  /// Typing a new value for one count of the subject with this id.
  Edit(Uuid, CountField),
  /// Waiting for `y`/`n` before deleting the subject with this id.
  ConfirmDelete(Uuid),
  /// Typing the free-text commitments passed to the advisor.
  Commitments,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub mode: Mode,

  /// Identity every request is made under.
  pub user: UserId,

  /// Last snapshot delivered by the subscription.
  pub snapshot: Snapshot,

  /// Totals derived from `snapshot`.
  pub summary: Summary,

  pub target: Target,

  pub commitments: String,

  /// Last advisor message; cleared when its inputs change.
  pub advice: Option<String>,

  /// Current fuzzy-filter string.
  pub filter: String,

  /// Cursor position within the *filtered* subject list.
  pub list_cursor: usize,

  /// Text being typed in the active input mode.
  pub input: String,

  /// Name entered in the first step of the add form.
  pub draft_name: String,

  /// The one visible error. A new failure replaces it.
  pub error: Option<String>,

  pub client: ApiClient,

  subscription: Option<Subscription>,
}

impl App {
  pub fn new(client: ApiClient, user: UserId) -> Self {
    Self {
      mode: Mode::Normal,
      user,
      snapshot: Snapshot::default(),
      summary: Summary::default(),
      target: Target::default(),
      commitments: String::new(),
      advice: None,
      filter: String::new(),
      list_cursor: 0,
      input: String::new(),
      draft_name: String::new(),
      error: None,
      client,
      subscription: None,
    }
  }

  // ── Subscription ──────────────────────────────────────────────────────────

  /// Start (or restart) the live feed. Any previous feed is stopped.
  pub fn subscribe(&mut self) {
    self.subscription = Some(Subscription::spawn(self.client.clone(), self.user));
  }

  /// Apply every event the feed has delivered since the last call.
  pub fn drain_subscription(&mut self) {
    let mut events = Vec::new();
    if let Some(sub) = self.subscription.as_mut() {
      while let Some(event) = sub.try_next() {
        events.push(event);
      }
    }
    for event in events {
      self.apply(event);
    }
  }

  /// Wait for the next feed event and apply it. Returns `false` if there is
  /// no feed or it has ended.
  #[cfg(test)]
  pub async fn next_event(&mut self) -> bool {
    let Some(sub) = self.subscription.as_mut() else {
      return false;
    };
    match sub.next().await {
      Some(event) => {
        self.apply(event);
        true
      }
      None => false,
    }
  }

  pub fn apply(&mut self, event: SubscriptionEvent) {
    match event {
      SubscriptionEvent::Snapshot(snapshot) => {
        let selected = self.cursor_subject().map(|s| s.id);
        self.summary = snapshot.summary();
        self.snapshot = snapshot;
        self.advice = None;

        // Keep the cursor on the same subject when rows move around it.
        let filtered = self.filtered_subjects();
        let len = filtered.len();
        let moved = selected.and_then(|id| filtered.iter().position(|s| s.id == id));
        self.list_cursor = moved.unwrap_or(self.list_cursor).min(len.saturating_sub(1));

        if let Mode::Edit(id, _) | Mode::ConfirmDelete(id) = self.mode
          && self.subject(id).is_none()
        {
          self.mode = Mode::Normal;
          self.input.clear();
          self.fail("the selected subject was removed");
        }
      }
      SubscriptionEvent::Error(msg) => {
        self.error = Some(format!("subscription stopped: {msg}"));
      }
    }
  }

  fn fail(&mut self, e: impl std::fmt::Display) { self.error = Some(e.to_string()); }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Subjects matching the current filter on name or type, in store order.
  pub fn filtered_subjects(&self) -> Vec<&SubjectRecord> {
    if self.filter.is_empty() {
      return self.snapshot.subjects.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .snapshot
      .subjects
      .iter()
      .filter(|s| {
        matcher.fuzzy_match(&s.name, &self.filter).is_some()
          || matcher.fuzzy_match(&s.kind, &self.filter).is_some()
      })
      .collect()
  }

  /// The subject with `id` in the current snapshot, if any.
  pub fn subject(&self, id: Uuid) -> Option<&SubjectRecord> {
    self.snapshot.subjects.iter().find(|s| s.id == id)
  }

  /// The subject under the list cursor in the filtered view, if any.
  pub fn cursor_subject(&self) -> Option<&SubjectRecord> {
    self.filtered_subjects().get(self.list_cursor).copied()
  }

  // ── Advice ────────────────────────────────────────────────────────────────

  /// Run the advisor on the current summary, target and commitments.
  pub fn advise(&mut self) {
    let commitments = Some(self.commitments.as_str());
    self.advice = Some(advisor::advise(&self.summary, self.target, commitments));
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    match self.mode {
      Mode::Normal => return self.handle_normal_key(key).await,
      Mode::Filter => self.handle_filter_key(key),
      Mode::AddName => self.handle_add_name_key(key),
      Mode::AddType => self.handle_add_type_key(key).await,
      Mode::Edit(id, field) => self.handle_edit_key(key, id, field).await,
      Mode::ConfirmDelete(id) => self.handle_confirm_key(key, id).await,
      Mode::Commitments => self.handle_commitments_key(key),
    }
    true
  }

  async fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Char('x') => self.error = None,

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_subjects().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Char('/') => {
        self.mode = Mode::Filter;
        self.filter.clear();
        self.list_cursor = 0;
      }

      KeyCode::Char('a') => {
        self.mode = Mode::AddName;
        self.input.clear();
        self.draft_name.clear();
      }

      KeyCode::Char('c') => self.start_edit(CountField::Conducted),
      KeyCode::Char('p') => self.start_edit(CountField::Present),

      KeyCode::Char('+') => self.record_class(true).await,
      KeyCode::Char('-') => self.record_class(false).await,

      KeyCode::Char('d') => {
        if let Some(id) = self.cursor_subject().map(|s| s.id) {
          self.mode = Mode::ConfirmDelete(id);
        }
      }

      KeyCode::Char('t') => {
        self.target = self.target.next_choice();
        self.advice = None;
      }

      KeyCode::Char('n') => {
        self.mode = Mode::Commitments;
        self.input = self.commitments.clone();
      }

      KeyCode::Enter => self.advise(),

      KeyCode::Char('r') => {
        self.error = None;
        self.subscribe();
      }

      _ => {}
    }
    true
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.mode = Mode::Normal;
        self.list_cursor = 0;
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
  }

  /// Shared editing keys for free-text inputs. Returns the submitted text on
  /// `Enter`; `Esc` abandons the input and returns to normal mode.
  fn edit_text(&mut self, key: KeyEvent) -> Option<String> {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.input.clear();
        None
      }
      KeyCode::Enter => Some(std::mem::take(&mut self.input)),
      KeyCode::Backspace => {
        self.input.pop();
        None
      }
      KeyCode::Char(c) => {
        self.input.push(c);
        None
      }
      _ => None,
    }
  }

  fn handle_add_name_key(&mut self, key: KeyEvent) {
    if let Some(name) = self.edit_text(key) {
      if name.trim().is_empty() {
        self.fail("subject name must not be empty");
        return;
      }
      self.draft_name = name;
      self.mode = Mode::AddType;
    }
  }

  async fn handle_add_type_key(&mut self, key: KeyEvent) {
    let Some(kind) = self.edit_text(key) else {
      return;
    };
    let input = match NewSubject::new(&self.draft_name, &kind) {
      Ok(input) => input,
      Err(e) => {
        self.fail(e);
        return;
      }
    };
    self.mode = Mode::Normal;
    self.draft_name.clear();
    if let Err(e) = self.client.create_subject(self.user, &input).await {
      self.fail(format!("{e:#}"));
    }
  }

  fn start_edit(&mut self, field: CountField) {
    let Some((id, current)) = self.cursor_subject().map(|s| {
      let current = match field {
        CountField::Conducted => s.conducted,
        CountField::Present => s.present,
      };
      (s.id, current)
    }) else {
      return;
    };
    self.input = current.to_string();
    self.mode = Mode::Edit(id, field);
  }

  async fn handle_edit_key(&mut self, key: KeyEvent, id: Uuid, field: CountField) {
    if let KeyCode::Char(c) = key.code
      && !c.is_ascii_digit()
    {
      return;
    }
    let Some(raw) = self.edit_text(key) else {
      return;
    };
    self.mode = Mode::Normal;
    let value = match raw.parse::<u32>() {
      Ok(v) => v,
      Err(_) => {
        self.fail(format!("{field} must be a whole number"));
        return;
      }
    };
    if let Err(e) = self.client.update_count(self.user, id, field, value).await {
      self.fail(format!("{e:#}"));
    }
  }

  /// Count one more class for the selected subject; `attended` also bumps
  /// `present`.
  async fn record_class(&mut self, attended: bool) {
    let Some((id, conducted, present)) = self
      .cursor_subject()
      .map(|s| (s.id, s.conducted, s.present))
    else {
      return;
    };
    let mut writes = vec![(CountField::Conducted, conducted.saturating_add(1))];
    if attended {
      writes.push((CountField::Present, present.saturating_add(1)));
    }
    for (field, value) in writes {
      if let Err(e) = self.client.update_count(self.user, id, field, value).await {
        self.fail(format!("{e:#}"));
        return;
      }
    }
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent, id: Uuid) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => {
        self.mode = Mode::Normal;
        if let Err(e) = self.client.delete_subject(self.user, id).await {
          self.fail(format!("{e:#}"));
        }
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.mode = Mode::Normal,
      _ => {}
    }
  }

  fn handle_commitments_key(&mut self, key: KeyEvent) {
    if let Some(text) = self.edit_text(key) {
      self.commitments = text;
      self.advice = None;
      self.mode = Mode::Normal;
    }
  }
}
