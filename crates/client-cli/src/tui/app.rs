//! Main TUI application: welcome, dashboard, and community feed screens

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use shared::{Interview, InterviewStatus, InterviewType, User};

use crate::api::{ApiClient, ApiError, InterviewQuery};
use crate::credentials::CredentialStore;
use crate::filter::{PassedFilter, SortOrder, StatusFilter, TypeFilter};
use crate::query::{DashboardQuery, FeedQuery};
use crate::session::{Landing, Session};
use crate::stats::dashboard_stats;

const TICK: Duration = Duration::from_millis(50);

/// Typed result of one asynchronous flow. Each flow writes exactly one slot
/// in the app; a stale generation is dropped instead of overwriting a newer
/// result.
enum AppEvent {
    SessionVerified(Result<User, ApiError>),
    DashboardFetched {
        generation: u64,
        result: Result<Vec<Interview>, ApiError>,
    },
    FeedFetched {
        generation: u64,
        result: Result<Vec<Interview>, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Welcome,
    Dashboard,
    Feed,
}

/// Which filter control receives input on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DashboardFocus {
    Search,
    Status,
    Type,
    Passed,
}

impl DashboardFocus {
    fn next(self) -> Self {
        match self {
            DashboardFocus::Search => DashboardFocus::Status,
            DashboardFocus::Status => DashboardFocus::Type,
            DashboardFocus::Type => DashboardFocus::Passed,
            DashboardFocus::Passed => DashboardFocus::Search,
        }
    }
}

/// Which filter control receives input on the community feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedFocus {
    Search,
    Company,
    Type,
    Sort,
}

impl FeedFocus {
    fn next(self) -> Self {
        match self {
            FeedFocus::Search => FeedFocus::Company,
            FeedFocus::Company => FeedFocus::Type,
            FeedFocus::Type => FeedFocus::Sort,
            FeedFocus::Sort => FeedFocus::Search,
        }
    }
}

/// Run the interactive app. Owns the session for the process lifetime and
/// kicks off the one-shot bootstrap before entering the terminal.
pub async fn run(api: ApiClient, credentials: CredentialStore) -> Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();

    let mut session = Session::new();
    if credentials.get().is_none() {
        // Nothing to verify; settle without a round trip.
        session.settle_signed_out();
    } else {
        let api = api.clone();
        let tx = event_tx.clone();
        tokio::spawn(async move {
            // The send fails only when the app is already gone; a late
            // verification result is then simply dropped.
            let _ = tx.send(AppEvent::SessionVerified(api.verify_user().await));
        });
    }

    let mut app = App::new(api, credentials, session, event_tx, event_rx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result
}

struct App {
    api: ApiClient,
    credentials: CredentialStore,
    session: Session,
    screen: Screen,
    event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,

    dashboard: DashboardQuery,
    dashboard_focus: DashboardFocus,
    dashboard_loading: bool,
    dashboard_generation: u64,
    dashboard_list: ListState,

    feed: FeedQuery,
    feed_focus: FeedFocus,
    feed_loading: bool,
    feed_generation: u64,
    feed_list: ListState,

    should_quit: bool,
}

impl App {
    fn new(
        api: ApiClient,
        credentials: CredentialStore,
        session: Session,
        event_tx: Sender<AppEvent>,
        event_rx: Receiver<AppEvent>,
    ) -> Self {
        Self {
            api,
            credentials,
            session,
            screen: Screen::Welcome,
            event_tx,
            event_rx,
            dashboard: DashboardQuery::new(),
            dashboard_focus: DashboardFocus::Search,
            dashboard_loading: false,
            dashboard_generation: 0,
            dashboard_list: ListState::default(),
            feed: FeedQuery::new(),
            feed_focus: FeedFocus::Search,
            feed_loading: false,
            feed_generation: 0,
            feed_list: ListState::default(),
            should_quit: false,
        }
    }

    /// Main loop: drain flow results, tick the debounce timers, draw, poll
    /// input with a timeout.
    fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            self.drain_events();

            let now = Instant::now();
            if self.dashboard.poll(now) {
                clamp_selection(&mut self.dashboard_list, self.dashboard.filtered().len());
            }
            if self.feed.poll(now) {
                clamp_selection(&mut self.feed_list, self.feed.filtered().len());
            }

            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply pending results from the spawned flows.
    fn drain_events(&mut self) {
        while let Ok(app_event) = self.event_rx.try_recv() {
            match app_event {
                AppEvent::SessionVerified(outcome) => {
                    let landing = self.session.finish_bootstrap(outcome, &self.credentials);
                    if landing == Landing::Dashboard && self.screen == Screen::Welcome {
                        self.open_dashboard();
                    }
                }
                AppEvent::DashboardFetched { generation, result } => {
                    if generation != self.dashboard_generation {
                        continue; // superseded by a newer fetch
                    }
                    self.dashboard_loading = false;
                    match result {
                        Ok(interviews) => {
                            self.dashboard.set_interviews(interviews);
                            clamp_selection(&mut self.dashboard_list, self.dashboard.filtered().len());
                        }
                        Err(e) if e.is_unauthorized() => self.force_sign_out(),
                        Err(e) => {
                            tracing::error!("Failed to fetch interviews: {}", e);
                            self.dashboard.set_interviews(Vec::new());
                        }
                    }
                }
                AppEvent::FeedFetched { generation, result } => {
                    if generation != self.feed_generation {
                        continue;
                    }
                    self.feed_loading = false;
                    match result {
                        Ok(interviews) => {
                            self.feed.set_interviews(interviews);
                            clamp_selection(&mut self.feed_list, self.feed.filtered().len());
                        }
                        Err(e) if e.is_unauthorized() => self.force_sign_out(),
                        Err(e) => {
                            tracing::error!("Failed to fetch community feed: {}", e);
                            self.feed.set_interviews(Vec::new());
                        }
                    }
                }
            }
        }
    }

    /// A fetch came back unauthorized: evict the credential and demote the
    /// session so the two never stay divergent.
    fn force_sign_out(&mut self) {
        tracing::warn!("Backend rejected the stored credential; signing out");
        self.session.logout(&self.credentials);
        if self.screen == Screen::Dashboard {
            self.dashboard.cancel_pending();
            self.screen = Screen::Welcome;
        }
    }

    fn open_dashboard(&mut self) {
        // The feed view is going away; a recomputation armed there must not
        // fire behind it.
        self.feed.cancel_pending();
        self.screen = Screen::Dashboard;
        self.dashboard_generation += 1;
        let generation = self.dashboard_generation;
        self.dashboard_loading = true;
        let api = self.api.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_interviews(&InterviewQuery::mine()).await;
            let _ = tx.send(AppEvent::DashboardFetched { generation, result });
        });
    }

    fn open_feed(&mut self) {
        self.dashboard.cancel_pending();
        self.screen = Screen::Feed;
        self.feed_generation += 1;
        let generation = self.feed_generation;
        self.feed_loading = true;
        let api = self.api.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_interviews(&InterviewQuery::community()).await;
            let _ = tx.send(AppEvent::FeedFetched { generation, result });
        });
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        // Global shortcuts
        if modifiers.contains(KeyModifiers::CONTROL) {
            match code {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('l') => {
                    if self.session.is_authenticated() && self.screen != Screen::Dashboard {
                        self.open_dashboard();
                    }
                }
                KeyCode::Char('r') => {
                    if self.screen != Screen::Feed {
                        self.open_feed();
                    }
                }
                _ => {}
            }
            return;
        }

        match self.screen {
            Screen::Welcome => {}
            Screen::Dashboard => self.handle_dashboard_key(code),
            Screen::Feed => self.handle_feed_key(code),
        }
    }

    fn handle_dashboard_key(&mut self, code: KeyCode) {
        let now = Instant::now();
        match code {
            KeyCode::Tab => self.dashboard_focus = self.dashboard_focus.next(),
            KeyCode::Esc => self.dashboard.reset(now),
            KeyCode::Up => move_selection(&mut self.dashboard_list, self.dashboard.filtered().len(), -1),
            KeyCode::Down => move_selection(&mut self.dashboard_list, self.dashboard.filtered().len(), 1),
            KeyCode::Char(c) if self.dashboard_focus == DashboardFocus::Search => {
                self.dashboard.edit(now, |f| f.free_text.push(c));
            }
            KeyCode::Backspace if self.dashboard_focus == DashboardFocus::Search => {
                self.dashboard.edit(now, |f| {
                    f.free_text.pop();
                });
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                let forward = code != KeyCode::Left;
                match self.dashboard_focus {
                    DashboardFocus::Search => {}
                    DashboardFocus::Status => self.dashboard.edit(now, |f| {
                        f.status = cycle_status(f.status, forward);
                    }),
                    DashboardFocus::Type => self.dashboard.edit(now, |f| {
                        f.interview_type = cycle_type(f.interview_type, forward);
                    }),
                    DashboardFocus::Passed => self.dashboard.edit(now, |f| {
                        f.passed = cycle_passed(f.passed, forward);
                    }),
                }
            }
            _ => {}
        }
    }

    fn handle_feed_key(&mut self, code: KeyCode) {
        let now = Instant::now();
        match code {
            KeyCode::Tab => self.feed_focus = self.feed_focus.next(),
            KeyCode::Esc => self.feed.reset(now),
            KeyCode::Up => move_selection(&mut self.feed_list, self.feed.filtered().len(), -1),
            KeyCode::Down => move_selection(&mut self.feed_list, self.feed.filtered().len(), 1),
            KeyCode::Char(c) if self.feed_focus == FeedFocus::Search => {
                self.feed.edit(now, |f| f.search.push(c));
            }
            KeyCode::Backspace if self.feed_focus == FeedFocus::Search => {
                self.feed.edit(now, |f| {
                    f.search.pop();
                });
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                let forward = code != KeyCode::Left;
                match self.feed_focus {
                    FeedFocus::Search => {}
                    FeedFocus::Company => {
                        let companies = self.feed.companies();
                        self.feed.edit(now, |f| {
                            f.company = cycle_company(f.company.take(), &companies, forward);
                        });
                    }
                    FeedFocus::Type => self.feed.edit(now, |f| {
                        f.interview_type = cycle_type(f.interview_type, forward);
                    }),
                    // Sorting is not a filter edit: applied on the spot.
                    FeedFocus::Sort => {
                        let sort = cycle_sort(self.feed.sort(), forward);
                        self.feed.set_sort(sort);
                    }
                }
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    fn draw(&mut self, frame: &mut Frame) {
        let main_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        match self.screen {
            Screen::Welcome => self.draw_welcome(frame, main_layout[0]),
            Screen::Dashboard => self.draw_dashboard(frame, main_layout[0]),
            Screen::Feed => self.draw_feed(frame, main_layout[0]),
        }

        self.draw_status_bar(frame, main_layout[1]);
    }

    fn draw_welcome(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" intrack ").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text = if self.session.is_loading() {
            vec![
                Line::from(""),
                Line::from("Verifying session..."),
            ]
        } else {
            vec![
                Line::from(""),
                Line::from("Track your interviews and learn from the community."),
                Line::from(""),
                Line::from("You are not signed in. Run 'intrack login' to authenticate,"),
                Line::from("or press Ctrl+R to browse the community feed."),
            ]
        };
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
    }

    fn draw_dashboard(&mut self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        // Stats over the unfiltered collection
        let stats = dashboard_stats(self.dashboard.all());
        let stats_line = format!(
            " Total: {}   Companies: {}   Upcoming: {}   Pass rate: {}% ",
            stats.total, stats.companies, stats.upcoming, stats.pass_rate
        );
        let title = match self.session.user() {
            Some(user) => format!(" Dashboard: {} ", user.name),
            None => " Dashboard ".to_string(),
        };
        frame.render_widget(
            Paragraph::new(stats_line).block(Block::default().title(title).borders(Borders::ALL)),
            layout[0],
        );

        // Filter bar
        let filter = self.dashboard.filter();
        let segments = [
            (
                DashboardFocus::Search,
                format!("Search: {}", filter.free_text),
            ),
            (DashboardFocus::Status, format!("Status: {}", status_label(filter.status))),
            (DashboardFocus::Type, format!("Type: {}", type_label(filter.interview_type))),
            (DashboardFocus::Passed, format!("Result: {}", passed_label(filter.passed))),
        ];
        let spans = focus_spans(&segments, self.dashboard_focus);
        frame.render_widget(
            Paragraph::new(Line::from(spans))
                .block(Block::default().title(" Filters ").borders(Borders::ALL)),
            layout[1],
        );

        // Interview list
        if self.dashboard_loading {
            frame.render_widget(
                Paragraph::new("Loading interviews...")
                    .block(Block::default().title(" Interviews ").borders(Borders::ALL)),
                layout[2],
            );
            return;
        }

        let items: Vec<ListItem> = self
            .dashboard
            .filtered()
            .iter()
            .map(|iv| ListItem::new(dashboard_row(iv)))
            .collect();
        let title = list_title(
            " Interviews ",
            self.dashboard.filtered().len(),
            self.dashboard.is_recompute_pending(),
        );

        if items.is_empty() {
            let hint = if self.dashboard.all().is_empty() {
                "No interviews yet. Run 'intrack add' to record your first one."
            } else {
                "No matching interviews. Esc clears the filters."
            };
            frame.render_widget(
                Paragraph::new(hint).block(Block::default().title(title).borders(Borders::ALL)),
                layout[2],
            );
            return;
        }

        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, layout[2], &mut self.dashboard_list);
    }

    fn draw_feed(&mut self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let filter = self.feed.filter();
        let segments = [
            (FeedFocus::Search, format!("Search: {}", filter.search)),
            (
                FeedFocus::Company,
                format!("Company: {}", filter.company.as_deref().unwrap_or("All")),
            ),
            (FeedFocus::Type, format!("Type: {}", type_label(filter.interview_type))),
            (FeedFocus::Sort, format!("Sort: {}", self.feed.sort().label())),
        ];
        let spans = focus_spans(&segments, self.feed_focus);
        frame.render_widget(
            Paragraph::new(Line::from(spans))
                .block(Block::default().title(" Community filters ").borders(Borders::ALL)),
            layout[0],
        );

        if self.feed_loading {
            frame.render_widget(
                Paragraph::new("Loading community interviews...")
                    .block(Block::default().title(" Community ").borders(Borders::ALL)),
                layout[1],
            );
            return;
        }

        let items: Vec<ListItem> = self
            .feed
            .filtered()
            .iter()
            .map(|iv| ListItem::new(feed_row(iv)))
            .collect();
        let title = list_title(
            " Community ",
            self.feed.filtered().len(),
            self.feed.is_recompute_pending(),
        );

        if items.is_empty() {
            let hint = if self.feed.all().is_empty() {
                "No shared interviews yet. Be the first to share one!"
            } else {
                "No matching interviews. Esc clears the filters."
            };
            frame.render_widget(
                Paragraph::new(hint).block(Block::default().title(title).borders(Borders::ALL)),
                layout[1],
            );
            return;
        }

        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, layout[1], &mut self.feed_list);
    }

    fn draw_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status = match self.screen {
            Screen::Welcome => " Ctrl+R: Community | Ctrl+C: Quit ".to_string(),
            _ => {
                " Tab: Next filter | ←/→: Change value | Esc: Clear | Ctrl+L: Dashboard | Ctrl+R: Community | Ctrl+C: Quit "
                    .to_string()
            }
        };
        let paragraph =
            Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
        frame.render_widget(paragraph, area);
    }
}

// ----------------------------------------------------------------------
// Small helpers
// ----------------------------------------------------------------------

fn clamp_selection(state: &mut ListState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    match state.selected() {
        Some(i) if i < len => {}
        Some(_) => state.select(Some(len - 1)),
        None => state.select(Some(0)),
    }
}

fn move_selection(state: &mut ListState, len: usize, delta: i64) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as i64;
    let next = (current + delta).clamp(0, len as i64 - 1);
    state.select(Some(next as usize));
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let pos = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if forward {
        (pos + 1) % options.len()
    } else {
        (pos + options.len() - 1) % options.len()
    };
    options[next]
}

fn cycle_status(current: StatusFilter, forward: bool) -> StatusFilter {
    let mut options = vec![StatusFilter::All];
    options.extend(InterviewStatus::ALL.iter().map(|s| StatusFilter::Is(*s)));
    cycle(&options, current, forward)
}

fn cycle_type(current: TypeFilter, forward: bool) -> TypeFilter {
    let mut options = vec![TypeFilter::All];
    options.extend(InterviewType::ALL.iter().map(|t| TypeFilter::Is(*t)));
    cycle(&options, current, forward)
}

fn cycle_passed(current: PassedFilter, forward: bool) -> PassedFilter {
    cycle(
        &[
            PassedFilter::All,
            PassedFilter::Passed,
            PassedFilter::Failed,
            PassedFilter::Unknown,
        ],
        current,
        forward,
    )
}

fn cycle_sort(current: SortOrder, forward: bool) -> SortOrder {
    cycle(
        &[SortOrder::NewestFirst, SortOrder::OldestFirst, SortOrder::Company],
        current,
        forward,
    )
}

fn cycle_company(current: Option<String>, companies: &[String], forward: bool) -> Option<String> {
    if companies.is_empty() {
        return None;
    }
    let mut options: Vec<Option<&String>> = vec![None];
    options.extend(companies.iter().map(Some));
    let pos = options
        .iter()
        .position(|o| o.map(String::as_str) == current.as_deref())
        .unwrap_or(0);
    let next = if forward {
        (pos + 1) % options.len()
    } else {
        (pos + options.len() - 1) % options.len()
    };
    options[next].cloned()
}

fn status_label(filter: StatusFilter) -> String {
    match filter {
        StatusFilter::All => "All".to_string(),
        StatusFilter::Is(status) => status.label().to_string(),
    }
}

fn type_label(filter: TypeFilter) -> String {
    match filter {
        TypeFilter::All => "All".to_string(),
        TypeFilter::Is(interview_type) => interview_type.label().to_string(),
    }
}

fn passed_label(filter: PassedFilter) -> &'static str {
    match filter {
        PassedFilter::All => "All",
        PassedFilter::Passed => "Passed",
        PassedFilter::Failed => "Did not pass",
        PassedFilter::Unknown => "Not known yet",
    }
}

fn list_title(name: &str, count: usize, recompute_pending: bool) -> String {
    if recompute_pending {
        format!("{}({}) filtering... ", name, count)
    } else {
        format!("{}({}) ", name, count)
    }
}

fn short_date(interview: &Interview) -> String {
    match interview.parsed_date() {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => interview.date.clone(),
    }
}

fn dashboard_row(interview: &Interview) -> String {
    let result = match interview.passed {
        Some(true) => "✓",
        Some(false) => "✗",
        None => "·",
    };
    let status = interview
        .status
        .map(|s| s.label())
        .unwrap_or("-");
    format!(
        "{}  {} - {}  [{}] [{}] {}",
        short_date(interview),
        interview.company,
        interview.role,
        status,
        interview.interview_type.label(),
        result,
    )
}

fn feed_row(interview: &Interview) -> String {
    format!(
        "{}  {} @ {}  [{}]  {} questions",
        short_date(interview),
        interview.role,
        interview.company,
        interview.interview_type.label(),
        interview.questions.len(),
    )
}

fn focus_spans<'a, F: Copy + PartialEq>(
    segments: &'a [(F, String)],
    focus: F,
) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    for (i, (id, text)) in segments.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  |  "));
        }
        let style = if *id == focus {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(text.as_str(), style));
    }
    spans
}
