//! Ratatui front-end for the library catalog. The layout mirrors the four
//! classic views of a personal library manager: a browse tab with filters,
//! sorting, and removal; an add-book form; a keyword search; and a small
//! statistics page. All keyboard handling lives in `app.rs`, the raw
//! terminal plumbing in `terminal.rs`, and reusable widget state in
//! `forms.rs`/`helpers.rs`.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
