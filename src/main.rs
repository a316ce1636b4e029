//! Binary entry point that glues the JSON-backed collection to the TUI:
//! open the snapshot store, load the collection once, and drive the Ratatui
//! event loop until the user exits.
use anyhow::Context;

use bookshelf::{run_app, App, Store};

/// Initialize persistence, load the collection, and launch the event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (a missing
/// home directory, a malformed snapshot) to the terminal instead of crashing
/// silently. A malformed snapshot is deliberately fatal: there is no
/// auto-repair, so overwriting it with an empty library would lose data.
fn main() -> anyhow::Result<()> {
    let store = Store::open()?;
    let books = store.load().context("failed to load library snapshot")?;

    let mut app = App::new(store, books);
    run_app(&mut app)
}
