//! Domain models shared by the persistence, catalog, export, and UI layers.
//! These types stay light-weight data holders so the other layers can focus
//! on presentation and persistence logic. The serde field order on `Book` is
//! load-bearing: it defines both the JSON snapshot shape and the CSV header
//! order, so new fields must be appended rather than reordered.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest publication year the add form accepts.
pub const MIN_YEAR: i64 = 0;
/// Highest publication year the add form accepts.
pub const MAX_YEAR: i64 = 2100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single book in the library. All five fields are always present; a
/// record is never persisted partially filled in.
pub struct Book {
    /// Display title. Duplicates are allowed; removal matches all of them.
    pub title: String,
    /// Author name used for display, search, and sorting.
    pub author: String,
    /// Publication year. Kept as an integer so ordering is numeric instead
    /// of lexicographic (1984 sorts before 2001).
    pub year: i64,
    /// Free-form genre label, matched exactly when filtering.
    pub genre: String,
    /// Whether the owner has finished reading this book.
    pub read: bool,
}

impl Book {
    /// Compose the one-line summary used by list views and the PDF export:
    /// `Title by Author (Year) - Genre - Read|Unread`.
    pub fn summary(&self) -> String {
        format!(
            "{} by {} ({}) - {} - {}",
            self.title,
            self.author,
            self.year,
            self.genre,
            if self.read { "Read" } else { "Unread" }
        )
    }
}

impl fmt::Display for Book {
    /// Write the title to any formatter so the type plays nicely with
    /// Ratatui widgets that consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Fields a keyword search can run against. An explicit enum instead of a
/// field-name string keeps the accessor checked at compile time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
}

impl SearchField {
    /// Borrow the matched field's value from a book.
    pub fn value<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SearchField::Title => &book.title,
            SearchField::Author => &book.author,
        }
    }

    /// Label shown in the search bar and footer hints.
    pub fn label(&self) -> &'static str {
        match self {
            SearchField::Title => "Title",
            SearchField::Author => "Author",
        }
    }
}

/// Keys the collection can be sorted by. Text keys compare lexicographically
/// (case-insensitively), `Year` compares numerically.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Author,
    Year,
    Genre,
}

impl SortKey {
    /// Label shown in the browse header.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Title => "Title",
            SortKey::Author => "Author",
            SortKey::Year => "Year",
            SortKey::Genre => "Genre",
        }
    }

    /// Cycle to the next key, in the order the browse view advertises.
    pub fn next(&self) -> SortKey {
        match self {
            SortKey::Title => SortKey::Author,
            SortKey::Author => SortKey::Year,
            SortKey::Year => SortKey::Genre,
            SortKey::Genre => SortKey::Title,
        }
    }
}

/// Counters backing the Stats tab.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LibraryStats {
    /// Total number of records in the collection.
    pub total: usize,
    /// How many of them are marked as read.
    pub read: usize,
}
