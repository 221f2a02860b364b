//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, view-model change notifications from the
//! store, shutdown signals and a periodic tick.

use crate::app::App;
use crate::feed::{FeedFetcher, RefreshHandle};
use crate::util::validate_link_for_open;
use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::input::{handle_input, Action};
use super::render::render;
use super::screen::Screen;
use super::view::ViewHandle;

/// Runs the TUI until the user quits or a termination signal arrives.
///
/// Installs a panic hook that restores terminal state before unwinding,
/// so a panic never leaves the terminal in raw mode.
pub async fn run<F: FeedFetcher>(
    app: &App<F>,
    view: &ViewHandle,
    refresh: &RefreshHandle,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));
    let mut screen = Screen::default();

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        if screen.needs_redraw {
            let model = view.snapshot();
            screen.sync(&model);
            terminal.draw(|f| render(f, &model, &screen))?;
            screen.needs_redraw = false;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        screen.needs_redraw = true;
                        let model = view.snapshot();
                        match handle_input(&mut screen, &model, key.code, key.modifiers) {
                            Action::Quit => break,
                            action => dispatch(app, refresh, &mut screen, action),
                        }
                    }
                    Some(Ok(Event::Resize(..))) => screen.needs_redraw = true,
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Terminal event stream failed");
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }

            _ = view.changed() => {
                screen.needs_redraw = true;
            }

            _ = tick_interval.tick() => {
                if screen.clear_expired_status() {
                    screen.needs_redraw = true;
                }
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Carries out the session side of a key press.
fn dispatch<F: FeedFetcher>(
    app: &App<F>,
    refresh: &RefreshHandle,
    screen: &mut Screen,
    action: Action,
) {
    match action {
        Action::Continue | Action::Quit => {}
        Action::Submit(url) => {
            let app = app.clone();
            // Outcome lands in the store; the view picks it up from there
            tokio::spawn(async move {
                if let Err(e) = app.submit_url(&url).await {
                    tracing::debug!(error = %e, "Submission did not add a feed");
                }
            });
        }
        Action::OpenPost(id) => {
            if !app.open_post(id) {
                screen.show_preview = false;
            }
        }
        Action::OpenLink(link) => match validate_link_for_open(&link) {
            Ok(url) => match open::that_detached(url.as_str()) {
                Ok(()) => screen.set_status("Opened in browser"),
                Err(e) => {
                    tracing::warn!(error = %e, link = %url, "Failed to open browser");
                    screen.set_status(format!("Could not open browser: {}", e));
                }
            },
            Err(e) => screen.set_status(format!("Cannot open link: {}", e)),
        },
        Action::Refresh => {
            refresh.poll_now();
            screen.set_status("Refreshing feeds...");
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
