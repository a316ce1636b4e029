//! Pure operations over the in-memory collection. Every function here either
//! mutates the passed-in `Vec<Book>` in place or returns a fresh sequence;
//! none of them touch the disk. Persisting after a mutation is the caller's
//! job, which keeps these trivially testable and keeps the save policy in
//! one place (the UI layer saves immediately after every successful change).

use std::cmp::Ordering;

use crate::models::{Book, LibraryStats, SearchField, SortKey};

/// Append a new record to the end of the collection. Title, author, and
/// genre are trimmed here; rejecting *empty* values is the form layer's job,
/// so this function accepts whatever trimmed text it is given.
pub fn add(books: &mut Vec<Book>, title: &str, author: &str, year: i64, genre: &str, read: bool) {
    books.push(Book {
        title: title.trim().to_string(),
        author: author.trim().to_string(),
        year,
        genre: genre.trim().to_string(),
        read,
    });
}

/// Remove every record whose title matches `title` after trimming and
/// case-folding both sides. Returns how many records were dropped; zero
/// matches is a silent no-op rather than an error.
pub fn remove(books: &mut Vec<Book>, title: &str) -> usize {
    let needle = title.trim().to_lowercase();
    let before = books.len();
    books.retain(|book| book.title.trim().to_lowercase() != needle);
    before - books.len()
}

/// Case-insensitive substring search against one field. The result preserves
/// the collection's current order; an empty result is a valid answer.
pub fn search(books: &[Book], keyword: &str, field: SearchField) -> Vec<Book> {
    let needle = keyword.trim().to_lowercase();
    books
        .iter()
        .filter(|book| field.value(book).to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Keep records matching the given genre exactly AND the given year exactly.
/// Absent criteria are wildcards, so `filter(books, None, None)` is a copy
/// of the whole collection.
pub fn filter(books: &[Book], genre: Option<&str>, year: Option<i64>) -> Vec<Book> {
    books
        .iter()
        .filter(|book| genre.map_or(true, |g| book.genre == g))
        .filter(|book| year.map_or(true, |y| book.year == y))
        .cloned()
        .collect()
}

/// Return a sorted copy of the collection without mutating or persisting
/// anything; sorting is display-only. The sort is stable, so records that
/// compare equal keep their relative insertion order.
pub fn sort_by_key(books: &[Book], key: SortKey, ascending: bool) -> Vec<Book> {
    let mut sorted = books.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Title => compare_text(&a.title, &b.title),
            SortKey::Author => compare_text(&a.author, &b.author),
            SortKey::Year => a.year.cmp(&b.year),
            SortKey::Genre => compare_text(&a.genre, &b.genre),
        };
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    sorted
}

/// Case-insensitive text ordering with the original text as a tiebreaker so
/// mixed-case duplicates still order deterministically.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sorted distinct genre labels, feeding the browse view's filter selector.
pub fn genres(books: &[Book]) -> Vec<String> {
    let mut genres: Vec<String> = books.iter().map(|book| book.genre.clone()).collect();
    genres.sort_by(|a, b| compare_text(a, b));
    genres.dedup();
    genres
}

/// Sorted distinct publication years, feeding the browse view's filter
/// selector.
pub fn years(books: &[Book]) -> Vec<i64> {
    let mut years: Vec<i64> = books.iter().map(|book| book.year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Totals for the Stats tab.
pub fn stats(books: &[Book]) -> LibraryStats {
    LibraryStats {
        total: books.len(),
        read: books.iter().filter(|book| book.read).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dune() -> Book {
        Book {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            year: 1965,
            genre: "SciFi".to_string(),
            read: true,
        }
    }

    fn sample() -> Vec<Book> {
        vec![
            dune(),
            Book {
                title: "Emma".to_string(),
                author: "Austen".to_string(),
                year: 1815,
                genre: "Romance".to_string(),
                read: false,
            },
            Book {
                title: "Solaris".to_string(),
                author: "Lem".to_string(),
                year: 1961,
                genre: "SciFi".to_string(),
                read: false,
            },
        ]
    }

    #[test]
    fn add_trims_text_fields_and_appends() {
        let mut books = sample();
        add(&mut books, " Dune ", " Herbert ", 1965, " SciFi ", true);

        let added = books.last().unwrap();
        assert_eq!(added.title, "Dune");
        assert_eq!(added.author, "Herbert");
        assert_eq!(added.genre, "SciFi");
        assert_eq!(books.len(), 4);
    }

    #[test]
    fn remove_matches_titles_case_insensitively() {
        let mut books = sample();
        let removed = remove(&mut books, "dune");

        assert_eq!(removed, 1);
        assert!(search(&books, "Dune", SearchField::Title).is_empty());
    }

    #[test]
    fn remove_drops_every_duplicate_title() {
        let mut books = sample();
        books.push(dune());

        assert_eq!(remove(&mut books, "  DUNE "), 2);
        assert_eq!(books.len(), 2);
    }

    #[test]
    fn remove_with_no_match_is_a_no_op() {
        let mut books = sample();
        assert_eq!(remove(&mut books, "Hamlet"), 0);
        assert_eq!(books, sample());
    }

    #[test]
    fn search_is_substring_and_case_insensitive() {
        let books = sample();

        let by_title = search(&books, "dUn", SearchField::Title);
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Dune");

        let by_author = search(&books, "aus", SearchField::Author);
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].author, "Austen");
    }

    #[test]
    fn search_preserves_collection_order() {
        let books = sample();
        let hits = search(&books, "s", SearchField::Title);
        let titles: Vec<&str> = hits.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Emma", "Solaris"]);
    }

    #[test]
    fn filter_matches_genre_exactly() {
        let books = vec![dune()];
        assert_eq!(filter(&books, Some("SciFi"), None).len(), 1);
        assert!(filter(&books, Some("Fantasy"), None).is_empty());
    }

    #[test]
    fn filter_criteria_are_conjunctive() {
        let books = sample();
        assert_eq!(filter(&books, Some("SciFi"), Some(1961)).len(), 1);
        assert!(filter(&books, Some("SciFi"), Some(1815)).is_empty());
        assert_eq!(filter(&books, None, None), books);
    }

    #[test]
    fn sort_orders_text_and_numbers() {
        let books = sample();

        let by_title = sort_by_key(&books, SortKey::Title, true);
        let titles: Vec<&str> = by_title.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Emma", "Solaris"]);

        let by_year = sort_by_key(&books, SortKey::Year, false);
        let years: Vec<i64> = by_year.iter().map(|b| b.year).collect();
        assert_eq!(years, vec![1965, 1961, 1815]);
    }

    #[test]
    fn sort_is_idempotent() {
        let once = sort_by_key(&sample(), SortKey::Author, true);
        let twice = sort_by_key(&once, SortKey::Author, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn sort_does_not_mutate_the_input() {
        let books = sample();
        let _ = sort_by_key(&books, SortKey::Year, true);
        assert_eq!(books, sample());
    }

    #[test]
    fn sort_keeps_equal_keys_in_insertion_order() {
        let mut books = sample();
        let mut second_dune = dune();
        second_dune.author = "Herbert Jr".to_string();
        books.push(second_dune);

        let sorted = sort_by_key(&books, SortKey::Title, true);
        assert_eq!(sorted[0].author, "Herbert");
        assert_eq!(sorted[1].author, "Herbert Jr");
    }

    #[test]
    fn distinct_listings_are_sorted_and_deduplicated() {
        let books = sample();
        assert_eq!(genres(&books), vec!["Romance", "SciFi"]);
        assert_eq!(years(&books), vec![1815, 1961, 1965]);
    }

    #[test]
    fn stats_count_totals_and_read_books() {
        let counted = stats(&sample());
        assert_eq!(counted.total, 3);
        assert_eq!(counted.read, 1);
    }
}
