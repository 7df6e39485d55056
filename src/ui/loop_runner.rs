//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, snapshot reloads running in the background,
//! and a periodic tick that drives status expiry and feed freshness.

use crate::feeds::{FeedFileError, FeedSource, Snapshot};
use crate::view::ViewStack;
use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::render::render;

/// Results of work done off the UI task.
pub enum AppEvent {
    SnapshotLoaded(Result<Snapshot, FeedFileError>),
}

/// Runs the TUI until the last view quits or a termination signal arrives.
///
/// Uses `tokio::select!` over:
/// - **Terminal input**: keys and resizes from crossterm's async event stream
/// - **Background tasks**: snapshot reloads via the `AppEvent` channel
/// - **Periodic tick**: 1s timer for status expiry and freshness checks
///
/// Installs a panic hook that restores the terminal before unwinding.
pub async fn run(stack: &mut ViewStack, mut source: FeedSource) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(8);
    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_secs(1));
    let mut refreshing = false;

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        if stack.needs_redraw() {
            terminal.draw(|f| render(f, stack))?;
            stack.mark_drawn();
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
                        stack.handle_key(key.code, key.modifiers);
                        if stack.is_empty() {
                            break;
                        }
                        if stack.take_refresh_request() {
                            source.expire_all();
                            refreshing |= start_refresh(&source, refreshing, &event_tx);
                        }
                    }
                    Some(Ok(Event::Resize(width, height))) => stack.resize(width, height),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Terminal input error");
                    }
                    None => break,
                }
            }

            Some(event) = event_rx.recv() => {
                refreshing = false;
                handle_app_event(stack, &mut source, event, Instant::now());
            }

            _ = tick_interval.tick() => {
                stack.clear_expired_status();
                if source.is_due(Instant::now()) {
                    refreshing |= start_refresh(&source, refreshing, &event_tx);
                }
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Reload the snapshot in the background unless a reload is already
/// running. Returns whether one was started.
fn start_refresh(source: &FeedSource, refreshing: bool, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    if refreshing {
        return false;
    }
    let path = source.path().to_path_buf();
    tracing::info!(path = %path.display(), "Refreshing stories");
    spawn_reload(path, event_tx.clone(), Snapshot::load);
    true
}

/// Run `load` on the blocking pool and always report back, so the loop
/// never waits on a reload that died.
fn spawn_reload<F>(path: PathBuf, tx: mpsc::Sender<AppEvent>, load: F)
where
    F: FnOnce(&Path) -> Result<Snapshot, FeedFileError> + Send + 'static,
{
    tokio::spawn(async move {
        let task_path = path.clone();
        let result = match tokio::task::spawn_blocking(move || load(&task_path)).await {
            Ok(result) => result,
            Err(source) => {
                tracing::error!(error = %source, "Snapshot reload task failed");
                Err(FeedFileError::Task { path, source })
            }
        };
        if let Err(e) = tx.send(AppEvent::SnapshotLoaded(result)).await {
            tracing::warn!(error = %e, "Failed to send snapshot (receiver dropped)");
        }
    });
}

/// Fold a finished reload into the views.
fn handle_app_event(stack: &mut ViewStack, source: &mut FeedSource, event: AppEvent, now: Instant) {
    match event {
        AppEvent::SnapshotLoaded(Ok(mut snapshot)) => {
            snapshot.merge_state(&stack.known_stories());
            source.loaded(&snapshot.feeds, now);
            stack.reconcile(&snapshot.stories);
        }
        AppEvent::SnapshotLoaded(Err(e)) => {
            tracing::warn!(error = %e, "Failed to reload stories");
            source.failed(now);
            stack.set_status(format!("Refresh failed: {}", e));
        }
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
