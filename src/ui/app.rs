use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::KeyCode;

use crate::sources::SourceKind;

/// Shown in the info panel while the first report for a source is pending
pub const PENDING_PLACEHOLDER: &str = "Refreshing...";

/// UI state for the dashboard. Mutated only by the event loop.
pub struct App {
    /// Should the application quit?
    pub should_quit: bool,
    /// Index into `SourceKind::ALL` of the highlighted source
    pub selected: usize,
    /// First visible wrapped line of the info panel
    pub scroll: usize,
    /// Report for the currently selected source
    pub report: String,
    /// Wall-clock time of the last applied report, for the status bar
    pub last_updated: Option<DateTime<Local>>,
    /// How often the visible source is refetched
    pub refresh_interval: Duration,
    last_refresh: Instant,
    needs_fetch: bool,
    /// Request id of the fetch task currently running
    inflight: Option<u64>,
    /// Request id whose completion may still be displayed
    wanted: Option<u64>,
    next_request: u64,
}

impl App {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            should_quit: false,
            selected: 0,
            scroll: 0,
            report: PENDING_PLACEHOLDER.to_string(),
            last_updated: None,
            refresh_interval,
            last_refresh: Instant::now(),
            needs_fetch: true,
            inflight: None,
            wanted: None,
            next_request: 0,
        }
    }

    pub fn selected_kind(&self) -> SourceKind {
        SourceKind::ALL[self.selected]
    }

    /// A fetch is running or queued
    pub fn is_refreshing(&self) -> bool {
        self.inflight.is_some() || self.needs_fetch
    }

    /// Whether the loop should dispatch a fetch this iteration. Dispatch is
    /// gated on the previous fetch having completed, so at most one child
    /// command pipeline runs at a time.
    pub fn fetch_due(&self) -> bool {
        self.inflight.is_none()
            && (self.needs_fetch || self.last_refresh.elapsed() >= self.refresh_interval)
    }

    /// Claim a request id for a fetch the loop is about to spawn
    pub fn begin_fetch(&mut self) -> u64 {
        self.next_request += 1;
        self.needs_fetch = false;
        self.inflight = Some(self.next_request);
        self.wanted = Some(self.next_request);
        self.next_request
    }

    /// Apply a completed fetch. A completion whose request id is no longer
    /// wanted (the user switched sources while it ran) is discarded.
    pub fn complete_fetch(&mut self, request: u64, report: String) {
        if self.inflight == Some(request) {
            self.inflight = None;
        }

        if self.wanted == Some(request) {
            self.report = report;
            self.last_refresh = Instant::now();
            self.last_updated = Some(Local::now());
        } else {
            tracing::debug!("Discarding stale report for request {}", request);
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }

            KeyCode::Up | KeyCode::Char('k') => {
                self.select_previous();
            }

            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
            }

            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(1);
            }

            // Unbounded above; the renderer omits lines past the end.
            KeyCode::PageDown => {
                self.scroll += 1;
            }

            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.request_refresh();
            }

            _ => {}
        }
    }

    /// Move the selection down with wraparound
    fn select_next(&mut self) {
        self.selected = (self.selected + 1) % SourceKind::ALL.len();
        self.invalidate();
    }

    /// Move the selection up with wraparound
    fn select_previous(&mut self) {
        self.selected = if self.selected == 0 {
            SourceKind::ALL.len() - 1
        } else {
            self.selected - 1
        };
        self.invalidate();
    }

    /// Queue a refetch of the selected source, keeping the current report
    /// visible until the new one lands
    fn request_refresh(&mut self) {
        self.needs_fetch = true;
    }

    /// The selection changed: reset scrolling, drop the cached report, and
    /// disown any fetch still in flight for the previous source.
    fn invalidate(&mut self) {
        self.scroll = 0;
        self.report = PENDING_PLACEHOLDER.to_string();
        self.wanted = None;
        self.needs_fetch = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Duration::from_secs(3))
    }

    #[test]
    fn test_new_app_wants_an_initial_fetch() {
        let app = app();
        assert_eq!(app.selected, 0);
        assert_eq!(app.report, PENDING_PLACEHOLDER);
        assert!(app.fetch_due());
    }

    #[test]
    fn test_selection_wraps_both_directions() {
        let mut app = app();

        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected, SourceKind::ALL.len() - 1);

        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_switching_resets_scroll_and_queues_one_fetch() {
        let mut app = app();
        let request = app.begin_fetch();
        app.complete_fetch(request, "cpu report".to_string());

        app.scroll = 7;
        app.handle_key(KeyCode::Down);

        assert_eq!(app.scroll, 0);
        assert_eq!(app.report, PENDING_PLACEHOLDER);
        assert!(app.fetch_due());

        let first = app.begin_fetch();
        // Exactly one fetch per switch: nothing further is due while the
        // dispatched one runs.
        assert!(!app.fetch_due());
        app.complete_fetch(first, "usage report".to_string());
        assert_eq!(app.report, "usage report");
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut app = app();
        let stale = app.begin_fetch();

        // User navigates away while the fetch runs.
        app.handle_key(KeyCode::Down);
        app.complete_fetch(stale, "previous source".to_string());

        assert_eq!(app.report, PENDING_PLACEHOLDER);
        assert!(app.fetch_due());

        let fresh = app.begin_fetch();
        app.complete_fetch(fresh, "current source".to_string());
        assert_eq!(app.report, "current source");
    }

    #[test]
    fn test_scroll_clamps_at_zero() {
        let mut app = app();
        app.handle_key(KeyCode::PageUp);
        assert_eq!(app.scroll, 0);

        app.handle_key(KeyCode::PageDown);
        app.handle_key(KeyCode::PageDown);
        app.handle_key(KeyCode::PageUp);
        assert_eq!(app.scroll, 1);
    }

    #[test]
    fn test_scrolling_does_not_trigger_a_fetch() {
        let mut app = app();
        let request = app.begin_fetch();
        app.complete_fetch(request, "report".to_string());

        app.handle_key(KeyCode::PageDown);
        assert!(!app.fetch_due());
    }

    #[test]
    fn test_explicit_refresh_keeps_current_report_visible() {
        let mut app = app();
        let request = app.begin_fetch();
        app.complete_fetch(request, "report".to_string());

        app.handle_key(KeyCode::Char('r'));
        assert!(app.fetch_due());
        assert_eq!(app.report, "report");
    }

    #[test]
    fn test_refresh_interval_elapsing_makes_a_fetch_due() {
        let mut app = App::new(Duration::from_millis(0));
        let request = app.begin_fetch();
        app.complete_fetch(request, "report".to_string());

        assert!(app.fetch_due());
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
