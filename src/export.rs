//! Export module split across logical submodules. Both exporters consume the
//! current in-memory collection and produce standalone artifacts; neither
//! reads or writes the snapshot. Artifacts land in the application data
//! directory next to the snapshot file so everything the tool produces sits
//! in one place.

pub mod csv;
pub mod pdf;

/// File name of the CSV artifact inside the data directory.
pub const CSV_FILE_NAME: &str = "library.csv";
/// File name of the PDF artifact inside the data directory.
pub const PDF_FILE_NAME: &str = "library_export.pdf";

pub use csv::to_csv;
pub use pdf::write_pdf;
