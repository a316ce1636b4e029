//! Core library surface for the Bookshelf TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the persisted snapshot [`store`], the pure [`catalog`] operations,
//! the CSV/PDF [`export`] renderers, and the interactive [`ui`].
pub mod catalog;
pub mod export;
pub mod models;
pub mod store;
pub mod ui;

/// The primary domain types that other layers manipulate.
pub use models::{Book, LibraryStats, SearchField, SortKey};

/// The persistence layer used by `main.rs` to hydrate the collection.
pub use store::{Store, StoreError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
