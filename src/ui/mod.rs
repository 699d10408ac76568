//! Terminal user interface
//!
//! `app` holds the board state and turns key presses into store actions,
//! `render` draws it, and `run` owns the terminal for the lifetime of the loop.

mod app;
mod form;
mod render;

use std::io::{self, stdout};

use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

pub use app::{Action, App, Message, MessageLevel, Overlay, View};
pub use form::{FormField, FormOutcome, TaskForm};
pub use render::draw;

/// Redraw, wait for a key, apply it; until the user quits.
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.refresh();
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
        if app.should_quit() {
            return Ok(());
        }
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout()))
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Take over the terminal and run the board until the user quits.
/// The terminal is restored even when the loop fails.
pub fn run(app: &mut App) -> io::Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, app);
    restore_terminal()?;
    terminal.show_cursor()?;
    result
}
