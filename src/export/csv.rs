//! CSV rendering of the collection. The output contract is that parsing the
//! bytes back with a serde-aware CSV reader yields the original records
//! field-for-field, so the header row is pinned to the `Book` field names in
//! declaration order rather than left to whatever the first record implies.

use anyhow::{anyhow, Context, Result};
use csv::WriterBuilder;

use crate::models::Book;

/// Header row, matching `Book`'s serde field order.
const HEADER: [&str; 5] = ["title", "author", "year", "genre", "read"];

/// Render the collection as UTF-8 CSV bytes: one header row, then one row
/// per record in current collection order. An empty collection yields a
/// header-only body, which is still a valid artifact.
pub fn to_csv(books: &[Book]) -> Result<Vec<u8>> {
    // The header is written explicitly so it appears even for an empty
    // collection; serde-driven headers only materialize on the first record.
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(HEADER)
        .context("failed to write CSV header")?;
    for book in books {
        writer
            .serialize(book)
            .context("failed to serialize book to CSV")?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow!("failed to flush CSV writer: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(bytes: &[u8]) -> Vec<Book> {
        csv::Reader::from_reader(bytes)
            .deserialize()
            .collect::<Result<Vec<Book>, _>>()
            .unwrap()
    }

    fn sample() -> Vec<Book> {
        vec![
            Book {
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                year: 1965,
                genre: "SciFi".to_string(),
                read: true,
            },
            Book {
                title: "Emma, annotated".to_string(),
                author: "Austen".to_string(),
                year: 1815,
                genre: "Romance".to_string(),
                read: false,
            },
        ]
    }

    #[test]
    fn empty_collection_yields_header_only_output() {
        let bytes = to_csv(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "title,author,year,genre,read\n"
        );
    }

    #[test]
    fn rows_follow_collection_order() {
        let bytes = to_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("title,author,year,genre,read"));
        assert_eq!(lines.next(), Some("Dune,Herbert,1965,SciFi,true"));
        // Embedded comma forces quoting, which the round-trip must survive.
        assert_eq!(
            lines.next(),
            Some("\"Emma, annotated\",Austen,1815,Romance,false")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn round_trips_field_for_field() {
        let books = sample();
        let bytes = to_csv(&books).unwrap();
        assert_eq!(parse(&bytes), books);
    }
}
