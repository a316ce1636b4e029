//! Minimal PDF rendering of the collection. The document is a stack of text
//! pages in a single built-in font, emitted object-by-object straight into
//! the output buffer with a hand-written xref table; no external PDF
//! dependency is involved. The artifact is for human eyes only, so the
//! title centering uses an average-glyph-width estimate rather than real
//! font metrics.
//!
//! Layout: a centered "Personal Library" heading on the first page, then one
//! numbered summary line per record. When the lines run past the bottom
//! margin the remainder flows onto additional pages.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::Book;

/// US Letter media box, in points.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
/// Margin on all four sides.
const MARGIN: i64 = 72;
/// Body font size and line leading.
const BODY_SIZE: i64 = 12;
const LEADING: i64 = 16;
/// Heading font size, and the gap between the heading and the first record.
const TITLE_SIZE: i64 = 16;
const TITLE_GAP: i64 = 40;
/// Heading text on the first page.
const DOC_TITLE: &str = "Personal Library";

/// Render the collection and write it to `path`, returning the artifact
/// path for the caller to serve or open.
pub fn write_pdf(books: &[Book], path: &Path) -> Result<PathBuf> {
    fs::write(path, render(books))
        .with_context(|| format!("failed to write PDF export to {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Render the collection to PDF bytes. An empty collection still produces a
/// valid one-page document carrying only the heading.
pub fn render(books: &[Book]) -> Vec<u8> {
    let lines: Vec<String> = books
        .iter()
        .enumerate()
        .map(|(index, book)| format!("{}. {}", index + 1, book.summary()))
        .collect();
    let pages = paginate(&lines);
    let page_count = pages.len();

    // Fixed object numbering: 1 catalog, 2 page tree, 3 font, then a
    // page/content object pair per page.
    let kids = (0..page_count)
        .map(|page| format!("{} 0 R", 4 + 2 * page))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(3 + 2 * page_count);
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>").into_bytes());
    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec());

    for (page, page_lines) in pages.iter().enumerate() {
        let contents_ref = 5 + 2 * page;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R \
                 /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> \
                 /Contents {contents_ref} 0 R >>"
            )
            .into_bytes(),
        );

        let stream = page_content(page == 0, page_lines);
        let mut object = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        object.extend_from_slice(stream.as_bytes());
        object.extend_from_slice(b"endstream");
        objects.push(object);
    }

    assemble(&objects)
}

/// Split the body lines across pages. The first page loses vertical space to
/// the heading; later pages start at the top margin. Always yields at least
/// one (possibly empty) page.
fn paginate(lines: &[String]) -> Vec<Vec<String>> {
    let mut pages = Vec::new();
    let mut remaining = lines;
    loop {
        let capacity = lines_per_page(pages.is_empty());
        let take = capacity.min(remaining.len());
        pages.push(remaining[..take].to_vec());
        remaining = &remaining[take..];
        if remaining.is_empty() {
            break;
        }
    }
    pages
}

/// How many body lines fit on a page, given where the first baseline sits.
fn lines_per_page(first: bool) -> usize {
    let first_baseline = body_start(first);
    ((first_baseline - MARGIN) / LEADING + 1) as usize
}

/// Baseline of the first body line on a page.
fn body_start(first: bool) -> i64 {
    if first {
        PAGE_HEIGHT - MARGIN - TITLE_GAP
    } else {
        PAGE_HEIGHT - MARGIN
    }
}

/// Build one page's content stream: the heading (first page only) followed
/// by the body lines, advanced by the fixed leading.
fn page_content(first: bool, lines: &[String]) -> String {
    let mut content = String::new();

    if first {
        // Rough centering: average Helvetica glyph width taken as half the
        // font size.
        let estimated_width = DOC_TITLE.chars().count() as i64 * TITLE_SIZE / 2;
        let x = (PAGE_WIDTH - estimated_width) / 2;
        let y = PAGE_HEIGHT - MARGIN;
        content.push_str(&format!(
            "BT\n/F1 {TITLE_SIZE} Tf\n{x} {y} Td\n({}) Tj\nET\n",
            escape(DOC_TITLE)
        ));
    }

    if !lines.is_empty() {
        content.push_str(&format!(
            "BT\n/F1 {BODY_SIZE} Tf\n{LEADING} TL\n{MARGIN} {} Td\n",
            body_start(first)
        ));
        for line in lines {
            content.push_str(&format!("({}) Tj\nT*\n", escape(line)));
        }
        content.push_str("ET\n");
    }

    content
}

/// Escape the three characters with special meaning inside a PDF literal
/// string.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Lay the objects out sequentially, then append the xref table and trailer
/// with the recorded byte offsets.
fn assemble(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf(count: usize) -> Vec<Book> {
        (0..count)
            .map(|index| Book {
                title: format!("Book {index}"),
                author: "Author".to_string(),
                year: 1900 + index as i64,
                genre: "Fiction".to_string(),
                read: index % 2 == 0,
            })
            .collect()
    }

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn empty_collection_renders_a_single_page_with_only_the_heading() {
        let bytes = render(&[]);
        let text = as_text(&bytes);

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(Personal Library) Tj"));
        assert!(text.contains("/Count 1"));
        assert!(!text.contains("1. "));
    }

    #[test]
    fn records_are_numbered_from_one_in_collection_order() {
        let bytes = render(&shelf(2));
        let text = as_text(&bytes);

        assert!(text.contains("(1. Book 0 by Author \\(1900\\) - Fiction - Read) Tj"));
        assert!(text.contains("(2. Book 1 by Author \\(1901\\) - Fiction - Unread) Tj"));
    }

    #[test]
    fn content_overflows_onto_additional_pages() {
        let first_page = lines_per_page(true);
        assert!(as_text(&render(&shelf(first_page))).contains("/Count 1"));

        let text = as_text(&render(&shelf(first_page + 1)));
        assert!(text.contains("/Count 2"));

        let overflow = first_page + lines_per_page(false) + 1;
        let text = as_text(&render(&shelf(overflow)));
        assert!(text.contains("/Count 3"));
    }

    #[test]
    fn parentheses_in_titles_are_escaped() {
        let mut books = shelf(1);
        books[0].title = "Either/Or (Part I)".to_string();
        let text = as_text(&render(&books));
        assert!(text.contains("Either/Or \\(Part I\\)"));
    }

    #[test]
    fn xref_offsets_point_at_object_headers() {
        let bytes = render(&shelf(3));
        let text = as_text(&bytes);

        let xref_at = text.find("\nxref\n").unwrap() + 1;
        let startxref: usize = text
            .split("startxref\n")
            .nth(1)
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref_at);

        // Every in-use entry must land exactly on an "N 0 obj" header.
        for (index, line) in text[xref_at..].lines().skip(2).take(5).enumerate() {
            let offset: usize = line.split_whitespace().next().unwrap().parse().unwrap();
            assert!(text[offset..].starts_with(&format!("{} 0 obj", index + 1)));
        }
    }

    #[test]
    fn write_pdf_returns_the_artifact_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("library_export.pdf");

        let written = write_pdf(&shelf(2), &target).unwrap();

        assert_eq!(written, target);
        let bytes = std::fs::read(&target).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
    }
}
