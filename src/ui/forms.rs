use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{MAX_YEAR, MIN_YEAR};

/// Internal representation of the "add book" form fields. Values stay as raw
/// strings while the user types; `parse_inputs` turns them into typed values
/// at submit time.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    pub(crate) read: bool,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the book form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum BookField {
    Title,
    Author,
    Year,
    Genre,
    Read,
}

impl Default for BookField {
    fn default() -> Self {
        BookField::Title
    }
}

impl BookForm {
    /// Cycle focus across the five fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Year,
            BookField::Year => BookField::Genre,
            BookField::Genre => BookField::Read,
            BookField::Read => BookField::Title,
        };
    }

    /// Append a character to the active field, validating allowed input.
    /// The year field only accepts digits; the read flag ignores typed
    /// characters entirely (it is toggled with the space bar).
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Year => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.year.push(ch);
            }
            BookField::Genre => self.genre.push(ch),
            BookField::Read => return false,
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Genre => {
                self.genre.pop();
            }
            BookField::Read => {}
        }
    }

    /// Flip the read-status checkbox when it has focus.
    pub(crate) fn toggle_read(&mut self) -> bool {
        if self.active == BookField::Read {
            self.read = !self.read;
            true
        } else {
            false
        }
    }

    /// Validate the inputs and return typed values ready for the catalog.
    /// Empty required fields and out-of-range years are rejected here, before
    /// the collection is touched.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, i64, String, bool)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(anyhow!("Author is required."));
        }
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Publication year is required."));
        }
        let year = year_raw
            .parse::<i64>()
            .context("Publication year must be an integer.")?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(anyhow!(
                "Publication year must be between {MIN_YEAR} and {MAX_YEAR}."
            ));
        }
        let genre = self.genre.trim();
        if genre.is_empty() {
            return Err(anyhow!("Genre is required."));
        }
        Ok((
            title.to_string(),
            author.to_string(),
            year,
            genre.to_string(),
            self.read,
        ))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let is_active = self.active == field;

        if field == BookField::Read {
            let checkbox = if self.read { "[x] Read" } else { "[ ] Unread" };
            let style = if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            return Line::from(vec![
                Span::raw(format!("{field_name}: ")),
                Span::styled(checkbox.to_string(), style),
            ]);
        }

        let value = match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
            BookField::Genre => &self.genre,
            BookField::Read => unreachable!(),
        };

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }
}

/// State for confirming the removal of every record matching a title.
#[derive(Clone)]
pub(crate) struct ConfirmRemove {
    pub(crate) title: String,
    pub(crate) matches: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> BookForm {
        BookForm {
            title: " Dune ".to_string(),
            author: " Herbert ".to_string(),
            year: "1965".to_string(),
            genre: " SciFi ".to_string(),
            read: true,
            ..BookForm::default()
        }
    }

    #[test]
    fn parse_inputs_trims_and_types_the_values() {
        let (title, author, year, genre, read) = filled_form().parse_inputs().unwrap();
        assert_eq!(title, "Dune");
        assert_eq!(author, "Herbert");
        assert_eq!(year, 1965);
        assert_eq!(genre, "SciFi");
        assert!(read);
    }

    #[test]
    fn parse_inputs_rejects_blank_required_fields() {
        let mut form = filled_form();
        form.title = "   ".to_string();
        assert!(form.parse_inputs().is_err());

        let mut form = filled_form();
        form.genre.clear();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn parse_inputs_rejects_years_outside_the_plausible_range() {
        let mut form = filled_form();
        form.year = "2101".to_string();
        assert!(form.parse_inputs().is_err());

        form.year = "2100".to_string();
        assert!(form.parse_inputs().is_ok());
    }

    #[test]
    fn year_field_only_accepts_digits() {
        let mut form = BookForm::default();
        form.active = BookField::Year;
        assert!(!form.push_char('x'));
        assert!(form.push_char('1'));
        assert_eq!(form.year, "1");
    }

    #[test]
    fn space_toggles_read_only_when_focused() {
        let mut form = BookForm::default();
        assert!(!form.toggle_read());
        form.active = BookField::Read;
        assert!(form.toggle_read());
        assert!(form.read);
    }
}
