//! Main application logic and TUI event loop.

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::{error, info, warn};

use crate::cli::AppConfig;
use crate::data::{
    open_store, DailySummary, ExpenseRecord, ExpenseStore, KeyValueStore, StoreError,
    ValidationError,
};
use crate::form::FormState;
use crate::notice::Notice;
use crate::selection::SelectionState;
use crate::ui::{
    widgets::{ExpenseFormPanel, LedgerTable, MenuBar, StatusBar, SummaryTable},
    HelpOverlay, Theme,
};

const ADDED_MESSAGE: &str = "Expense added successfully!";
const MISSING_FIELDS_MESSAGE: &str = "Please fill out all fields.";
const DELETED_MESSAGE: &str = "Expense(s) deleted successfully!";
const NOTHING_SELECTED_MESSAGE: &str = "No expenses selected for deletion.";
const NO_MATCH_MESSAGE: &str = "No matching expenses found.";

/// Input poll interval; also bounds how late a notice is dismissed
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Which view is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Entry,
    Ledger,
    Summary,
}

impl View {
    const TITLES: [&'static str; 3] = ["Add Expense", "Summary", "Monthly Summary"];

    fn next(self) -> Self {
        match self {
            View::Entry => View::Ledger,
            View::Ledger => View::Summary,
            View::Summary => View::Entry,
        }
    }

    fn prev(self) -> Self {
        match self {
            View::Entry => View::Summary,
            View::Ledger => View::Entry,
            View::Summary => View::Ledger,
        }
    }

    fn index(self) -> usize {
        match self {
            View::Entry => 0,
            View::Ledger => 1,
            View::Summary => 2,
        }
    }

    fn hints(self) -> &'static str {
        match self {
            View::Entry => "Enter save | Tab next field | Esc leave form | F1 help | Ctrl+C quit",
            View::Ledger => "Space check | d delete checked | r reload | ? help | q quit",
            View::Summary => "r reload | ? help | q quit",
        }
    }
}

/// Application state
pub struct App<S> {
    // Configuration
    config: AppConfig,
    theme: Theme,

    // Data
    store: ExpenseStore<S>,
    ledger: Vec<ExpenseRecord>,
    summary: DailySummary,

    // UI state
    view: View,
    form: FormState,
    selection: SelectionState,
    selected_row: usize,
    show_help: bool,

    // Transient message (auto-dismissed)
    notice: Option<Notice>,

    // Exit flag
    should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    /// Create a new App instance and load both views
    pub fn new(config: AppConfig, store: ExpenseStore<S>) -> Result<Self> {
        let mut app = App {
            config,
            theme: Theme::default(),
            store,
            ledger: Vec::new(),
            summary: DailySummary::default(),
            view: View::Entry,
            form: FormState::new(),
            selection: SelectionState::new(),
            selected_row: 0,
            show_help: false,
            notice: None,
            should_quit: false,
        };
        app.reload()?;
        Ok(app)
    }

    /// Recompute the ledger and the daily totals from storage
    fn reload(&mut self) -> Result<()> {
        self.ledger = self.store.list_sorted()?;
        self.summary = match self.store.monthly_summary() {
            Ok(summary) => summary,
            Err(e @ StoreError::TotalOverflow { .. }) => {
                // The ledger stays usable so the offending rows can be deleted
                warn!(error = %e, "daily totals unavailable");
                self.set_error(format!("Error: {e}"));
                DailySummary::default()
            }
            Err(e) => return Err(e).context("Failed to compute daily totals"),
        };
        self.selection
            .retain_existing(self.ledger.iter().map(|r| &r.id));
        if self.selected_row >= self.ledger.len() {
            self.selected_row = self.ledger.len().saturating_sub(1);
        }
        Ok(())
    }

    fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Set an error notice (non-fatal)
    pub fn set_error(&mut self, message: String) {
        self.notify(Notice::error(message));
    }

    /// Drop the notice once it has been visible long enough
    fn expire_notice(&mut self, now: Instant) {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.is_expired(self.config.notice_duration, now))
        {
            self.notice = None;
        }
    }

    fn submit_form(&mut self) -> Result<()> {
        match self.store.add(&self.form.to_input()) {
            Ok(_) => {
                self.form.clear();
                self.notify(Notice::success(ADDED_MESSAGE));
                self.reload()
            }
            Err(StoreError::Validation(ValidationError::MissingField(field))) => {
                info!(%field, "expense rejected");
                self.notify(Notice::error(MISSING_FIELDS_MESSAGE));
                Ok(())
            }
            Err(StoreError::Validation(e)) => {
                info!(error = %e, "expense rejected");
                self.notify(Notice::error(format!("Invalid expense: {e}")));
                Ok(())
            }
            Err(e) => Err(e).context("Failed to save expense"),
        }
    }

    fn delete_checked(&mut self) -> Result<()> {
        match self.store.delete_by_ids(self.selection.marked()) {
            Ok(0) => {
                self.selection.clear();
                self.notify(Notice::error(NO_MATCH_MESSAGE));
                self.reload()
            }
            Ok(_) => {
                self.selection.clear();
                self.notify(Notice::success(DELETED_MESSAGE));
                self.reload()
            }
            Err(StoreError::NothingSelected) => {
                self.notify(Notice::error(NOTHING_SELECTED_MESSAGE));
                Ok(())
            }
            Err(e) => Err(e).context("Failed to delete expenses"),
        }
    }

    fn switch_to(&mut self, view: View) -> Result<()> {
        self.view = view;
        // Views are always recomputed from storage when shown
        if view != View::Entry {
            self.reload()?;
        }
        Ok(())
    }

    /// Handle keyboard input
    fn handle_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        // Global shortcuts that never collide with typing
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::F(1) => {
                self.show_help = !self.show_help;
                return Ok(());
            }
            KeyCode::Esc if self.show_help => {
                self.show_help = false;
                return Ok(());
            }
            KeyCode::F(2) => return self.switch_to(View::Entry),
            KeyCode::F(3) => return self.switch_to(View::Ledger),
            KeyCode::F(4) => return self.switch_to(View::Summary),
            _ => {}
        }

        if self.show_help {
            return Ok(());
        }

        if self.view == View::Entry {
            return self.handle_form_input(key);
        }

        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return Ok(());
            }
            KeyCode::Char('r') => return self.reload(),
            KeyCode::Char('1') => return self.switch_to(View::Entry),
            KeyCode::Char('2') => return self.switch_to(View::Ledger),
            KeyCode::Char('3') => return self.switch_to(View::Summary),
            KeyCode::Tab => return self.switch_to(self.view.next()),
            KeyCode::BackTab => return self.switch_to(self.view.prev()),
            _ => {}
        }

        if self.view == View::Ledger {
            self.handle_ledger_input(key)?;
        }
        Ok(())
    }

    fn handle_form_input(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Enter => return self.submit_form(),
            KeyCode::Esc => return self.switch_to(View::Ledger),
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
            KeyCode::Left => self.form.current_mut().left(),
            KeyCode::Right => self.form.current_mut().right(),
            KeyCode::Home => self.form.current_mut().home(),
            KeyCode::End => self.form.current_mut().end(),
            KeyCode::Backspace => self.form.current_mut().backspace(),
            KeyCode::Delete => self.form.current_mut().delete(),
            KeyCode::Char(c) => self.form.current_mut().insert(c),
            _ => {}
        }
        Ok(())
    }

    fn handle_ledger_input(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.ledger.is_empty() {
                    self.selected_row = (self.selected_row + 1) % self.ledger.len();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.ledger.is_empty() {
                    self.selected_row = self
                        .selected_row
                        .checked_sub(1)
                        .unwrap_or(self.ledger.len() - 1);
                }
            }
            KeyCode::Char(' ') => {
                if let Some(record) = self.ledger.get(self.selected_row) {
                    self.selection.toggle(&record.id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_checked()?,
            _ => {}
        }
        Ok(())
    }

    /// Status line hints; the delete hint only shows while something is checked
    fn status_hints(&self) -> String {
        if self.view == View::Ledger && !self.selection.is_empty() {
            format!(
                "Delete Selected ({}): d | {}",
                self.selection.len(),
                self.view.hints()
            )
        } else {
            self.view.hints().to_string()
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        let size = frame.area();

        // Menu, body, status bar
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(size);

        MenuBar::new(&View::TITLES, self.view.index(), &self.theme).render(frame, chunks[0]);

        match self.view {
            View::Entry => {
                ExpenseFormPanel::new(&self.form, self.store.today(), &self.theme)
                    .render(frame, chunks[1]);
            }
            View::Ledger => {
                LedgerTable::new(&self.ledger, self.selected_row, &self.selection, &self.theme)
                    .render(frame, chunks[1]);
            }
            View::Summary => {
                let title = format!("{} - Summary", Local::now().format("%B"));
                SummaryTable::new(&self.summary, &title, &self.theme).render(frame, chunks[1]);
            }
        }

        let hints = self.status_hints();
        StatusBar::new(self.notice.as_ref(), &hints, &self.theme).render(frame, chunks[2]);

        if self.show_help {
            HelpOverlay::new(&self.theme).render(frame, size);
        }
    }
}

/// Restore terminal to normal state
fn restore_terminal() {
    // Best effort cleanup - ignore errors since we may be in a panic
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run the TUI application
pub fn run(config: AppConfig) -> Result<()> {
    // Open storage before touching the terminal so errors print normally
    let store = ExpenseStore::new(open_store(config.storage, &config.data_dir)?);
    let mut app = App::new(config, store).context("Failed to initialize application")?;
    info!(expenses = app.ledger.len(), "starting UI");

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        restore_terminal();
        return Err(e).context("Failed to setup terminal");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            restore_terminal();
            return Err(e).context("Failed to create terminal");
        }
    };

    let result = run_main_loop(&mut terminal, &mut app);

    // Always restore terminal, regardless of result
    restore_terminal();
    terminal.show_cursor().ok();

    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "UI exited with error");
    }
    result
}

/// Main application loop
fn run_main_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        app.expire_notice(Instant::now());
        terminal.draw(|f| app.render(f))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Err(e) = app.handle_input(key.code, key.modifiers) {
                    // Storage failures surface as a notice; the UI keeps running
                    warn!(error = %format!("{e:#}"), "action failed");
                    app.set_error(format!("Error: {e:#}"));
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::{MemoryStore, StorageKind};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    fn test_app() -> App<MemoryStore> {
        let config = AppConfig::from_options(
            Some("/nonexistent".to_string()),
            StorageKind::Memory,
            3,
            None,
        );
        App::new(config, ExpenseStore::new(MemoryStore::default()).with_clock(today)).unwrap()
    }

    fn press(app: &mut App<MemoryStore>, key: KeyCode) {
        app.handle_input(key, KeyModifiers::NONE).unwrap();
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn add_via_form(app: &mut App<MemoryStore>, date: &str, amount: &str, description: &str) {
        app.switch_to(View::Entry).unwrap();
        type_text(app, date);
        press(app, KeyCode::Tab);
        type_text(app, amount);
        press(app, KeyCode::Tab);
        type_text(app, description);
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_form_submit_refreshes_both_views() {
        let mut app = test_app();
        add_via_form(&mut app, "2024-03-07", "12.5", "coffee");

        assert_eq!(app.notice.as_ref().unwrap().text, ADDED_MESSAGE);
        assert_eq!(app.form.to_input(), Default::default());
        assert_eq!(app.ledger.len(), 1);
        assert_eq!(app.summary.labels(), vec!["07-03-24"]);
    }

    #[test]
    fn test_incomplete_form_is_rejected_and_kept() {
        let mut app = test_app();
        type_text(&mut app, "2024-03-07");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.notice.as_ref().unwrap().text, MISSING_FIELDS_MESSAGE);
        assert_eq!(app.form.to_input().date, "2024-03-07");
        assert!(app.ledger.is_empty());
    }

    #[test]
    fn test_typing_q_in_form_does_not_quit() {
        let mut app = test_app();
        type_text(&mut app, "q");
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view, View::Ledger);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_delete_checked_rows_by_id() {
        let mut app = test_app();
        add_via_form(&mut app, "2024-03-07", "12.5", "coffee");
        add_via_form(&mut app, "2024-03-05", "7.25", "bus");
        app.switch_to(View::Ledger).unwrap();

        // Row 0 is the earliest date
        assert_eq!(app.ledger[0].description, "bus");
        press(&mut app, KeyCode::Char(' '));
        assert!(app.status_hints().starts_with("Delete Selected (1)"));
        press(&mut app, KeyCode::Char('d'));

        assert_eq!(app.notice.as_ref().unwrap().text, DELETED_MESSAGE);
        assert_eq!(app.ledger.len(), 1);
        assert_eq!(app.ledger[0].description, "coffee");
        assert!(app.selection.is_empty());
    }

    #[test]
    fn test_delete_with_nothing_checked_warns() {
        let mut app = test_app();
        add_via_form(&mut app, "2024-03-07", "12.5", "coffee");
        app.switch_to(View::Ledger).unwrap();
        assert!(!app.status_hints().contains("Delete Selected"));

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.notice.as_ref().unwrap().text, NOTHING_SELECTED_MESSAGE);
        assert_eq!(app.ledger.len(), 1);
    }

    #[test]
    fn test_notice_is_dismissed_after_interval() {
        let mut app = test_app();
        app.set_error("boom".to_string());
        app.expire_notice(Instant::now());
        assert!(app.notice.is_some());
        app.expire_notice(Instant::now() + Duration::from_secs(3));
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Entry.next(), View::Ledger);
        assert_eq!(View::Summary.next(), View::Entry);
        assert_eq!(View::Entry.prev(), View::Summary);
        assert_eq!(View::TITLES[View::Summary.index()], "Monthly Summary");
    }

    #[test]
    fn test_delete_of_vanished_rows_reports_no_match() {
        let mut app = test_app();
        add_via_form(&mut app, "2024-03-07", "12.5", "coffee");
        app.switch_to(View::Ledger).unwrap();
        press(&mut app, KeyCode::Char(' '));

        // Another writer removes the row after it was checked
        let gone = app.ledger[0].id.clone();
        app.store.delete_by_ids(&HashSet::from([gone])).unwrap();

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.notice.as_ref().unwrap().text, NO_MATCH_MESSAGE);
        assert!(app.ledger.is_empty());
        assert!(app.selection.is_empty());
    }

    #[test]
    fn test_overflowing_totals_keep_ledger_usable() {
        let mut app = test_app();
        add_via_form(&mut app, "2024-03-07", "5e28", "a");
        add_via_form(&mut app, "2024-03-07", "5e28", "b");

        assert_eq!(app.ledger.len(), 2);
        assert!(app.summary.is_empty());
        assert!(app.notice.as_ref().unwrap().text.contains("too large"));
    }
}
