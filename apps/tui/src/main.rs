//! NoahAid TUI — full-screen first-aid chat.
//!
//! A chat pane plus a read-only topic browser, built with `ratatui` +
//! `crossterm`.

mod app;
mod screens;
mod widgets;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    app::init_tracing();
    app::run()
}
