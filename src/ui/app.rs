use std::fs;
use std::mem;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_artifact;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::catalog;
use crate::export;
use crate::models::{Book, SearchField, SortKey};
use crate::store::Store;

use super::forms::{BookField, BookForm, ConfirmRemove};
use super::helpers::{centered_rect, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab bar at the top of the screen.
const TAB_BAR_HEIGHT: u16 = 3;

/// Top-level tabs, mirroring the classic add/search/browse/stats split. The
/// active tab decides both the rendering path and how keystrokes are routed.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Tab {
    Browse,
    Add,
    Search,
    Stats,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Browse, Tab::Add, Tab::Search, Tab::Stats];

    fn title(&self) -> &'static str {
        match self {
            Tab::Browse => "Browse",
            Tab::Add => "Add Book",
            Tab::Search => "Search",
            Tab::Stats => "Stats",
        }
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|tab| tab == self).unwrap_or(0)
    }

    fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn previous(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Fine-grained modes layered over the current tab. Only destructive actions
/// need one: removal always goes through a confirmation dialog.
enum Mode {
    Normal,
    ConfirmRemove(ConfirmRemove),
}

/// Live state of the search tab. Results are recomputed from the collection
/// on every draw, so only the query and target field need to be kept.
struct SearchState {
    query: String,
    field: SearchField,
}

impl SearchState {
    fn toggle_field(&mut self) {
        self.field = match self.field {
            SearchField::Title => SearchField::Author,
            SearchField::Author => SearchField::Title,
        };
    }
}

/// One-line message pinned to the footer until the next one replaces it.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Success => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Application state container: the owned collection, the store that
/// persists it, and everything the draw loop needs. The collection is loaded
/// once at startup and saved immediately after every successful mutation,
/// which keeps the snapshot and memory in lockstep.
pub struct App {
    store: Store,
    books: Vec<Book>,
    tab: Tab,
    mode: Mode,
    /// Selection within the browse list, indexed against the visible
    /// (filtered and sorted) sequence.
    selected: usize,
    genre_filter: Option<String>,
    year_filter: Option<i64>,
    sort_key: SortKey,
    sort_ascending: bool,
    add_form: BookForm,
    search: SearchState,
    status: Option<StatusMessage>,
    last_export: Option<PathBuf>,
}

impl App {
    pub fn new(store: Store, books: Vec<Book>) -> Self {
        Self {
            store,
            books,
            tab: Tab::Browse,
            mode: Mode::Normal,
            selected: 0,
            genre_filter: None,
            year_filter: None,
            sort_key: SortKey::Title,
            sort_ascending: true,
            add_form: BookForm::default(),
            search: SearchState {
                query: String::new(),
                field: SearchField::Title,
            },
            status: None,
            last_export: None,
        }
    }

    /// Route a key press to the active mode and tab. Returns `true` when the
    /// application should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        match mode {
            Mode::ConfirmRemove(confirm) => {
                self.mode = self.handle_confirm_remove(code, confirm)?;
                Ok(false)
            }
            Mode::Normal => match self.tab {
                Tab::Browse => self.handle_browse_key(code),
                Tab::Add => self.handle_add_key(code),
                Tab::Search => self.handle_search_key(code),
                Tab::Stats => self.handle_stats_key(code),
            },
        }
    }

    fn handle_browse_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.previous(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('a') => self.tab = Tab::Add,
            KeyCode::Char('/') => self.tab = Tab::Search,
            KeyCode::Char('g') => self.cycle_genre_filter(),
            KeyCode::Char('y') => self.cycle_year_filter(),
            KeyCode::Char('c') => {
                self.genre_filter = None;
                self.year_filter = None;
                self.set_status("Filters cleared.", StatusKind::Info);
            }
            KeyCode::Char('s') => {
                self.sort_key = self.sort_key.next();
                self.set_status(
                    format!("Sorting by {}.", self.sort_key.label()),
                    StatusKind::Info,
                );
            }
            KeyCode::Char('o') => {
                self.sort_ascending = !self.sort_ascending;
                let direction = if self.sort_ascending {
                    "ascending"
                } else {
                    "descending"
                };
                self.set_status(format!("Sort order: {direction}."), StatusKind::Info);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(book) = self.visible_books().get(self.selected).cloned() {
                    let matches = self
                        .books
                        .iter()
                        .filter(|candidate| {
                            candidate.title.trim().to_lowercase()
                                == book.title.trim().to_lowercase()
                        })
                        .count();
                    self.mode = Mode::ConfirmRemove(ConfirmRemove {
                        title: book.title,
                        matches,
                    });
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_add_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Esc => {
                self.add_form = BookForm::default();
                self.tab = Tab::Browse;
            }
            KeyCode::Tab | KeyCode::Down => self.add_form.toggle_field(),
            KeyCode::Enter => self.submit_add_form()?,
            KeyCode::Backspace => self.add_form.backspace(),
            KeyCode::Char(' ') => {
                if !self.add_form.toggle_read() {
                    self.add_form.push_char(' ');
                }
            }
            KeyCode::Char(ch) => {
                self.add_form.push_char(ch);
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_search_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Esc => self.tab = Tab::Browse,
            KeyCode::Tab => self.search.toggle_field(),
            KeyCode::Backspace => {
                self.search.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => self.search.query.push(ch),
            _ => {}
        }
        Ok(false)
    }

    fn handle_stats_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.previous(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmRemove) -> Result<Mode> {
        match code {
            KeyCode::Enter | KeyCode::Char('y') => {
                let removed = catalog::remove(&mut self.books, &confirm.title);
                self.persist()?;
                self.clamp_selection();
                if removed == 1 {
                    self.set_status(
                        format!("Removed '{}'.", confirm.title),
                        StatusKind::Success,
                    );
                } else {
                    self.set_status(
                        format!("Removed {removed} copies of '{}'.", confirm.title),
                        StatusKind::Success,
                    );
                }
                Ok(Mode::Normal)
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmRemove(confirm)),
        }
    }

    /// Validate the add form, append the record, and persist. Validation
    /// failures stay inside the form as inline errors; persistence failures
    /// bubble up and end the session.
    fn submit_add_form(&mut self) -> Result<()> {
        match self.add_form.parse_inputs() {
            Ok((title, author, year, genre, read)) => {
                catalog::add(&mut self.books, &title, &author, year, &genre, read);
                self.persist()?;
                self.add_form = BookForm::default();
                self.tab = Tab::Browse;
                self.set_status(format!("'{title}' added!"), StatusKind::Success);
            }
            Err(err) => {
                self.add_form.error = Some(surface_error(&err));
            }
        }
        Ok(())
    }

    /// Write the full collection back to the snapshot. Called after every
    /// successful mutation so the file never lags the in-memory state.
    fn persist(&self) -> Result<()> {
        self.store
            .save(&self.books)
            .context("failed to persist library snapshot")
    }

    /// Export the collection as CSV into the data directory.
    pub(crate) fn handle_ctrl_e(&mut self) -> Result<()> {
        let bytes = export::to_csv(&self.books)?;
        let path = self.store.data_dir().join(export::CSV_FILE_NAME);
        fs::write(&path, bytes)
            .with_context(|| format!("failed to write CSV export to {}", path.display()))?;
        self.set_status(
            format!("CSV exported to {} (Ctrl+O opens it).", path.display()),
            StatusKind::Success,
        );
        self.last_export = Some(path);
        Ok(())
    }

    /// Export the collection as a PDF document into the data directory.
    pub(crate) fn handle_ctrl_p(&mut self) -> Result<()> {
        let target = self.store.data_dir().join(export::PDF_FILE_NAME);
        let path = export::write_pdf(&self.books, &target)?;
        self.set_status(
            format!("PDF exported to {} (Ctrl+O opens it).", path.display()),
            StatusKind::Success,
        );
        self.last_export = Some(path);
        Ok(())
    }

    /// Open the most recent export with the system handler. Failures here
    /// are reported on the status line instead of ending the session, since
    /// the artifact itself was already produced.
    pub(crate) fn handle_ctrl_o(&mut self) {
        match &self.last_export {
            Some(path) => {
                if let Err(err) = open_artifact(path) {
                    let err = anyhow::Error::new(err).context("failed to open exported file");
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
            }
            None => self.set_status(
                "Nothing exported yet. Ctrl+E exports CSV, Ctrl+P exports PDF.",
                StatusKind::Info,
            ),
        }
    }

    /// The browse list's contents: current filters applied, then the
    /// display-only sort. The underlying collection keeps insertion order.
    fn visible_books(&self) -> Vec<Book> {
        let filtered = catalog::filter(&self.books, self.genre_filter.as_deref(), self.year_filter);
        catalog::sort_by_key(&filtered, self.sort_key, self.sort_ascending)
    }

    /// Advance the genre filter through All -> each distinct genre -> All.
    fn cycle_genre_filter(&mut self) {
        let genres = catalog::genres(&self.books);
        self.genre_filter = next_choice(&genres, self.genre_filter.as_ref());
        self.clamp_selection();
    }

    /// Advance the year filter through All -> each distinct year -> All.
    fn cycle_year_filter(&mut self) {
        let years = catalog::years(&self.books);
        self.year_filter = next_choice(&years, self.year_filter.as_ref());
        self.clamp_selection();
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.visible_books().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let new = self.selected as isize + offset;
        self.selected = new.clamp(0, len as isize - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_books().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        self.draw_tab_bar(frame, chunks[0]);

        match self.tab {
            Tab::Browse => self.draw_browse(frame, chunks[1]),
            Tab::Add => self.draw_add(frame, chunks[1]),
            Tab::Search => self.draw_search(frame, chunks[1]),
            Tab::Stats => self.draw_stats(frame, chunks[1]),
        }

        self.draw_footer(frame, chunks[2]);

        if let Mode::ConfirmRemove(confirm) = &self.mode {
            self.draw_confirm_remove(frame, confirm);
        }
    }

    fn draw_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Tab::ALL.iter().map(|tab| Line::from(tab.title())).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Personal Library "),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_browse(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let genre_label = self.genre_filter.as_deref().unwrap_or("All");
        let year_label = self
            .year_filter
            .map(|year| year.to_string())
            .unwrap_or_else(|| "All".to_string());
        let direction = if self.sort_ascending { "asc" } else { "desc" };
        let header = Paragraph::new(Line::from(vec![
            Span::raw("Genre: "),
            Span::styled(genre_label.to_string(), Style::default().fg(Color::Yellow)),
            Span::raw("   Year: "),
            Span::styled(year_label, Style::default().fg(Color::Yellow)),
            Span::raw("   Sort: "),
            Span::styled(
                format!("{} ({direction})", self.sort_key.label()),
                Style::default().fg(Color::Yellow),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL).title(" Filters "));
        frame.render_widget(header, chunks[0]);

        let visible = self.visible_books();
        if visible.is_empty() {
            let message = if self.books.is_empty() {
                "Your library is empty. Press 'a' to add your first book."
            } else {
                "No books match the current filters. Press 'c' to clear them."
            };
            let empty = Paragraph::new(message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Books "));
            frame.render_widget(empty, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = visible
            .iter()
            .enumerate()
            .map(|(index, book)| ListItem::new(format!("{}. {}", index + 1, book.summary())))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(format!(
                " Books ({}) ",
                visible.len()
            )))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected.min(visible.len() - 1)));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_add(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            self.add_form.build_line("Title ", BookField::Title),
            self.add_form.build_line("Author", BookField::Author),
            self.add_form.build_line("Year  ", BookField::Year),
            self.add_form.build_line("Genre ", BookField::Genre),
            self.add_form.build_line("Status", BookField::Read),
            Line::from(""),
            Line::from(Span::styled(
                "Tab switches fields, Space toggles read status, Enter saves, Esc discards.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        if let Some(error) = &self.add_form.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let form = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Add a New Book "),
            );
        frame.render_widget(form, area);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let input = Paragraph::new(Line::from(vec![
            Span::raw(format!("Search by {}: ", self.search.field.label())),
            Span::styled(
                self.search.query.clone(),
                Style::default().fg(Color::Yellow),
            ),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search (Tab switches field) "),
        );
        frame.render_widget(input, chunks[0]);

        let block = Block::default().borders(Borders::ALL).title(" Results ");
        if self.search.query.trim().is_empty() {
            let hint = Paragraph::new("Type to search the library.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(hint, chunks[1]);
            return;
        }

        let results = catalog::search(&self.books, &self.search.query, self.search.field);
        if results.is_empty() {
            let warning = Paragraph::new("No matching books found.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(warning, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = results
            .iter()
            .map(|book| ListItem::new(book.summary()))
            .collect();
        frame.render_widget(List::new(items).block(block), chunks[1]);
    }

    fn draw_stats(&self, frame: &mut Frame, area: Rect) {
        let stats = catalog::stats(&self.books);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let lines = vec![
            Line::from(format!("Total books: {}", stats.total)),
            Line::from(format!("Read:        {}", stats.read)),
            Line::from(format!("Unread:      {}", stats.total - stats.read)),
        ];
        let summary = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Library Statistics "),
        );
        frame.render_widget(summary, chunks[0]);

        if stats.total > 0 {
            let ratio = stats.read as f64 / stats.total as f64;
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(" Read progress "))
                .gauge_style(Style::default().fg(Color::Green))
                .ratio(ratio)
                .label(format!("{:.0}%", ratio * 100.0));
            frame.render_widget(gauge, chunks[1]);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![self.footer_instructions()];
        if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.text.clone(),
                status.kind.style(),
            )));
        }
        let footer = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, area);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let text = match (&self.mode, self.tab) {
            (Mode::ConfirmRemove(_), _) => "Enter/y confirm removal | Esc/n cancel",
            (_, Tab::Browse) => {
                "Tab/arrows tabs | Up/Down select | a add | / search | g genre | y year | c clear | s sort | o order | d remove | Ctrl+E csv | Ctrl+P pdf | q quit"
            }
            (_, Tab::Add) => "Tab next field | Space toggle read | Enter save | Esc back",
            (_, Tab::Search) => "Type keyword | Tab switch field | Esc back",
            (_, Tab::Stats) => "Tab/arrows tabs | Ctrl+E csv | Ctrl+P pdf | q quit",
        };
        Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, confirm: &ConfirmRemove) {
        let area = centered_rect(60, 30, frame.area());
        frame.render_widget(Clear, area);

        let detail = if confirm.matches == 1 {
            format!("Remove '{}' from the library?", confirm.title)
        } else {
            format!(
                "Remove all {} copies of '{}' from the library?",
                confirm.matches, confirm.title
            )
        };
        let lines = vec![
            Line::from(detail),
            Line::from(""),
            Line::from(Span::styled(
                "Enter/y removes, Esc/n cancels. Matching is case-insensitive.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let dialog = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Confirm Removal "),
            );
        frame.render_widget(dialog, area);
    }
}

/// Step through `None` (no filter) followed by each available choice. Called
/// with the current selection; returns the next one.
fn next_choice<T: Clone + PartialEq>(choices: &[T], current: Option<&T>) -> Option<T> {
    match current {
        None => choices.first().cloned(),
        Some(value) => match choices.iter().position(|choice| choice == value) {
            Some(index) if index + 1 < choices.len() => Some(choices[index + 1].clone()),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_choice_cycles_through_all_options_and_back_to_none() {
        let genres = vec!["Romance".to_string(), "SciFi".to_string()];

        let first = next_choice(&genres, None);
        assert_eq!(first.as_deref(), Some("Romance"));

        let second = next_choice(&genres, first.as_ref());
        assert_eq!(second.as_deref(), Some("SciFi"));

        assert_eq!(next_choice(&genres, second.as_ref()), None);
    }

    #[test]
    fn next_choice_on_empty_options_stays_unfiltered() {
        let years: Vec<i64> = Vec::new();
        assert_eq!(next_choice(&years, None), None);
    }
}
