use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::sources::Sources;

use super::app::App;
use super::widgets;

/// Input poll budget per loop iteration
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Width of the source menu column
const MENU_WIDTH: u16 = 20;

/// Completed background fetch, delivered to the event loop
struct FetchDone {
    request: u64,
    report: String,
}

/// Dashboard manages the TUI lifecycle and the event loop
pub struct Dashboard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    sources: Arc<Sources>,
    tx: mpsc::UnboundedSender<FetchDone>,
    rx: mpsc::UnboundedReceiver<FetchDone>,
}

impl Dashboard {
    /// Set up the terminal and create the dashboard
    pub fn new(sources: Arc<Sources>, refresh_interval: Duration) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            app: App::new(refresh_interval),
            sources,
            tx,
            rx,
        })
    }

    /// Run the event loop until the user quits.
    ///
    /// Fetches run on background tasks and report back over the channel, so
    /// the loop keeps polling input while a slow probe is outstanding.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            while let Ok(done) = self.rx.try_recv() {
                self.app.complete_fetch(done.request, done.report);
            }

            if self.app.fetch_due() {
                self.dispatch_fetch();
            }

            let app = &self.app;
            self.terminal.draw(|f| ui(f, app))?;

            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.app.handle_key(key.code);
                    }
                    // Geometry is recomputed from the frame on the next
                    // draw; nothing else to do here.
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }

            if self.app.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Spawn a background fetch of the selected source
    fn dispatch_fetch(&mut self) {
        let request = self.app.begin_fetch();
        let kind = self.app.selected_kind();
        let sources = Arc::clone(&self.sources);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let report = sources.fetch(kind).await;
            // The loop may have exited; a closed channel is fine.
            let _ = tx.send(FetchDone { request, report });
        });
    }

    /// Cleanup terminal on exit
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to restore terminal")?;
        self.terminal.show_cursor().context("Failed to show cursor")?;

        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the three regions
fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    // Main layout: content area + status bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(size);

    // Content area: menu column + info panel
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(MENU_WIDTH), Constraint::Min(0)])
        .split(rows[0]);

    widgets::render_menu(columns[0], f.buffer_mut(), app.selected);

    widgets::render_info(
        columns[1],
        f.buffer_mut(),
        app.selected_kind(),
        &app.report,
        app.scroll,
    );

    widgets::render_status_bar(
        rows[1],
        f.buffer_mut(),
        app.is_refreshing(),
        app.last_updated,
    );
}
