use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::time::Duration;
use tracing::{debug, info};

use crate::form::{FormAction, PackageForm, PackageOptions};

/// Run the interactive form until it is submitted or abandoned.
///
/// Returns the package options when the user submitted a valid form.
pub async fn run_tui(form: &mut PackageForm, tick: Duration) -> Result<Option<PackageOptions>> {
    info!("Starting TUI for '{}'", form.title);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, form, tick).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    form: &mut PackageForm,
    tick: Duration,
) -> Result<Option<PackageOptions>> {
    loop {
        terminal.draw(|f| {
            let area = f.size();
            form.draw(f, area);
        })?;

        // Deferred work runs once the frame above has been laid out.
        tokio::task::yield_now().await;
        if form.tick() > 0 {
            debug!("ran deferred form tasks");
            continue;
        }

        if !event::poll(tick)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match form.handle_key_event(key) {
                FormAction::Quit => {
                    info!("Form abandoned");
                    return Ok(None);
                }
                FormAction::Submitted(options) => return Ok(Some(options)),
                FormAction::None => {}
            }
        }
    }
}
