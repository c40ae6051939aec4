use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ppc_client::{
    ApiClient, ApiError, AuthMode, AuthProfile, CredentialStore, LogStreamController, StreamEvent,
};
use ppc_core::{LogFeed, LogLevel, NodeRow, NodesSnapshot, StatusSnapshot};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};
use std::{
    error::Error,
    io,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const CONNECT_REFRESH_SECS: u64 = 4;
const NODES_REFRESH_SECS: u64 = 6;
const POLL_QUEUE_CAPACITY: usize = 16;
const STREAM_QUEUE_CAPACITY: usize = 256;
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:17287";
const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. Check credentials.";
const STREAM_RETRY_HINT: &str = "log stream disconnected (will retry)";

#[derive(Clone, Debug)]
struct Config {
    base_url: String,
    credentials_path: PathBuf,
}

/// Connection state drives what the dashboard shows: the credential prompt
/// stays up until a full status+nodes cycle succeeds.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ConnState {
    Disconnected { message: Option<String> },
    Connecting,
    Connected,
}

#[derive(Debug)]
enum PollOutcome {
    Connect {
        seq: u64,
        result: Result<(StatusSnapshot, NodesSnapshot), ApiError>,
    },
    Nodes {
        seq: u64,
        result: Result<NodesSnapshot, ApiError>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthField {
    Mode,
    Token,
    User,
    Pass,
}

#[derive(Clone, Debug)]
struct AuthForm {
    mode: AuthMode,
    token: String,
    user: String,
    pass: String,
    focus: AuthField,
}

impl AuthForm {
    fn from_profile(profile: &AuthProfile) -> Self {
        Self {
            mode: profile.mode,
            token: profile.token.clone(),
            user: profile.user.clone(),
            pass: profile.pass.clone(),
            focus: AuthField::Mode,
        }
    }

    fn fields(&self) -> Vec<AuthField> {
        match self.mode {
            AuthMode::Token => vec![AuthField::Mode, AuthField::Token],
            AuthMode::Basic => vec![AuthField::Mode, AuthField::User, AuthField::Pass],
        }
    }

    fn focus_next(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|field| *field == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    fn focus_prev(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|field| *field == self.focus).unwrap_or(0);
        self.focus = fields[(idx + fields.len() - 1) % fields.len()];
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Token => AuthMode::Basic,
            AuthMode::Basic => AuthMode::Token,
        };
        // the focused field may no longer exist under the new mode
        if !self.fields().contains(&self.focus) {
            self.focus = AuthField::Mode;
        }
    }

    fn push_char(&mut self, ch: char) {
        match self.focus {
            AuthField::Mode => {}
            AuthField::Token => self.token.push(ch),
            AuthField::User => self.user.push(ch),
            AuthField::Pass => self.pass.push(ch),
        }
    }

    fn backspace(&mut self) {
        match self.focus {
            AuthField::Mode => {}
            AuthField::Token => {
                self.token.pop();
            }
            AuthField::User => {
                self.user.pop();
            }
            AuthField::Pass => {
                self.pass.pop();
            }
        }
    }
}

struct App {
    config: Config,
    store: CredentialStore,
    profile: AuthProfile,
    form: AuthForm,
    api: ApiClient,
    stream: LogStreamController,
    conn: ConnState,
    status: Option<StatusSnapshot>,
    nodes: Option<NodesSnapshot>,
    feed: LogFeed,
    cursor: Arc<AtomicU64>,
    level: LogLevel,
    filter: String,
    filter_editing: bool,
    stream_hint: Option<String>,
    status_note: Option<String>,
    poll_tx: mpsc::Sender<PollOutcome>,
    stream_tx: mpsc::Sender<StreamEvent>,
    next_seq: u64,
    applied_connect_seq: u64,
    applied_nodes_seq: u64,
}

impl App {
    fn new(
        config: Config,
        store: CredentialStore,
        profile: AuthProfile,
        poll_tx: mpsc::Sender<PollOutcome>,
        stream_tx: mpsc::Sender<StreamEvent>,
    ) -> Self {
        let api = ApiClient::new(config.base_url.clone());
        let stream = LogStreamController::new(config.base_url.clone());
        let form = AuthForm::from_profile(&profile);
        Self {
            config,
            store,
            profile,
            form,
            api,
            stream,
            conn: ConnState::Disconnected { message: None },
            status: None,
            nodes: None,
            feed: LogFeed::new(),
            cursor: Arc::new(AtomicU64::new(0)),
            level: LogLevel::Info,
            filter: String::new(),
            filter_editing: false,
            stream_hint: None,
            status_note: None,
            poll_tx,
            stream_tx,
            next_seq: 0,
            applied_connect_seq: 0,
            applied_nodes_seq: 0,
        }
    }

    fn prompt_visible(&self) -> bool {
        !matches!(self.conn, ConnState::Connected)
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Kick off one full connect sequence: status, then nodes. The outcome
    /// lands back on the poll channel tagged with its sequence number.
    fn spawn_connect(&mut self) {
        let seq = self.bump_seq();
        if !matches!(self.conn, ConnState::Connected) {
            self.conn = ConnState::Connecting;
        }
        let api = self.api.clone();
        let profile = self.profile.clone();
        let tx = self.poll_tx.clone();
        tokio::spawn(async move {
            let result = connect_sequence(&api, &profile).await;
            let _ = tx.send(PollOutcome::Connect { seq, result }).await;
        });
    }

    fn spawn_nodes(&mut self) {
        let seq = self.bump_seq();
        let api = self.api.clone();
        let profile = self.profile.clone();
        let tx = self.poll_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_nodes(&profile).await;
            let _ = tx.send(PollOutcome::Nodes { seq, result }).await;
        });
    }

    fn apply_poll_outcome(&mut self, outcome: PollOutcome) {
        match outcome {
            PollOutcome::Connect { seq, result } => {
                // completions racing out of order: older ones are stale
                if seq <= self.applied_connect_seq {
                    return;
                }
                self.applied_connect_seq = seq;
                match result {
                    Ok((status, nodes)) => {
                        self.status = Some(status);
                        if seq > self.applied_nodes_seq {
                            self.applied_nodes_seq = seq;
                            self.nodes = Some(nodes);
                        }
                        let was_connected = matches!(self.conn, ConnState::Connected);
                        self.conn = ConnState::Connected;
                        if !was_connected || !self.stream.is_streaming() {
                            self.start_stream();
                        }
                    }
                    Err(err) => {
                        let message = if err.is_unauthorized() {
                            Some(UNAUTHORIZED_MESSAGE.to_string())
                        } else {
                            None
                        };
                        self.conn = ConnState::Disconnected { message };
                        self.stream.stop();
                    }
                }
            }
            PollOutcome::Nodes { seq, result } => match result {
                Ok(nodes) => {
                    if seq > self.applied_nodes_seq {
                        self.applied_nodes_seq = seq;
                        self.nodes = Some(nodes);
                    }
                }
                Err(err) => {
                    warn!("nodes_refresh_error: {err}");
                }
            },
        }
    }

    fn apply_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Opened => {
                self.stream_hint = None;
            }
            StreamEvent::Record(payload) => {
                if self.feed.apply_payload(&payload) {
                    self.cursor.store(self.feed.cursor(), Ordering::Relaxed);
                }
            }
            StreamEvent::Disconnected { .. } => {
                self.stream_hint = Some(STREAM_RETRY_HINT.to_string());
            }
        }
    }

    fn start_stream(&mut self) {
        match self.stream.restart(
            &self.profile,
            self.cursor.clone(),
            self.level,
            self.stream_tx.clone(),
        ) {
            Ok(()) => {
                self.stream_hint = None;
            }
            Err(err) => {
                self.stream_hint = Some(err.to_string());
            }
        }
    }

    /// Copy the prompt form into the active profile. Token and user are
    /// trimmed; the password is kept as typed.
    fn apply_login_form(&mut self) {
        self.profile.mode = self.form.mode;
        self.profile.token = self.form.token.trim().to_string();
        self.profile.user = self.form.user.trim().to_string();
        self.profile.pass = self.form.pass.clone();
    }

    fn submit_login(&mut self) {
        self.apply_login_form();
        if let Err(err) = self.store.save(&self.profile) {
            self.status_note = Some(format!("credential save failed: {err}"));
        }
        self.spawn_connect();
    }

    fn logout(&mut self) {
        if let Err(err) = self.store.clear(&mut self.profile) {
            self.status_note = Some(format!("credential clear failed: {err}"));
        }
        self.form = AuthForm::from_profile(&self.profile);
        self.stream.stop();
        self.conn = ConnState::Disconnected { message: None };
    }

    fn toggle_pause(&mut self) {
        let paused = self.feed.toggle_paused();
        self.status_note = Some(if paused {
            "logs paused (incoming records dropped)".to_string()
        } else {
            "logs resumed".to_string()
        });
    }

    fn clear_logs(&mut self) {
        self.feed.clear();
        self.cursor.store(0, Ordering::Relaxed);
        self.start_stream();
    }

    fn cycle_level(&mut self) {
        self.level = self.level.cycle();
        self.start_stream();
    }
}

async fn connect_sequence(
    api: &ApiClient,
    profile: &AuthProfile,
) -> Result<(StatusSnapshot, NodesSnapshot), ApiError> {
    let status = api.fetch_status(profile).await?;
    let nodes = api.fetch_nodes(profile).await?;
    Ok((status, nodes))
}

fn filter_nodes<'a>(nodes: &'a [NodeRow], filter: &str) -> Vec<&'a NodeRow> {
    let query = filter.trim().to_lowercase();
    nodes
        .iter()
        .filter(|node| query.is_empty() || node.id.to_lowercase().contains(&query))
        .collect()
}

fn updater_summary(status: &StatusSnapshot) -> String {
    let err = if status.updater.last_update_err.is_empty() {
        "none"
    } else {
        status.updater.last_update_err.as_str()
    };
    format!(
        "last_start={} last_end={} err={} fetched={}",
        or_dash(&status.updater.last_update_start),
        or_dash(&status.updater.last_update_end),
        err,
        status.updater.last_fetched
    )
}

fn pool_summary(status: &StatusSnapshot) -> String {
    format!(
        "pool(total={} disabled={})",
        status.pool.total, status.pool.disabled
    )
}

fn nodes_summary(nodes: &NodesSnapshot) -> String {
    format!(
        "alive={}/{} updated_at={}",
        nodes.nodes_alive,
        nodes.nodes_total,
        or_dash(&nodes.updated_at_utc)
    )
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = load_config();
    init_logging();

    let store = CredentialStore::new(config.credentials_path.clone());
    let profile = store.load();
    let (poll_tx, mut poll_rx) = mpsc::channel(POLL_QUEUE_CAPACITY);
    let (stream_tx, mut stream_rx) = mpsc::channel(STREAM_QUEUE_CAPACITY);
    let mut app = App::new(config, store, profile, poll_tx, stream_tx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut events = EventStream::new();

    let jitter_seed = u64::from(std::process::id()) % 5;
    let mut connect_ticker = tokio::time::interval_at(
        tokio::time::Instant::now() + Duration::from_millis(jitter_seed * 120),
        Duration::from_secs(CONNECT_REFRESH_SECS),
    );
    let mut nodes_ticker = tokio::time::interval_at(
        tokio::time::Instant::now() + Duration::from_millis(jitter_seed * 240 + 500),
        Duration::from_secs(NODES_REFRESH_SECS),
    );

    loop {
        terminal.draw(|frame| render_ui(frame, &app))?;
        tokio::select! {
            _ = connect_ticker.tick() => {
                app.spawn_connect();
            }
            _ = nodes_ticker.tick() => {
                app.spawn_nodes();
            }
            Some(outcome) = poll_rx.recv() => {
                app.apply_poll_outcome(outcome);
            }
            Some(event) = stream_rx.recv() => {
                app.apply_stream_event(event);
            }
            maybe_event = events.next() => {
                if let Some(Ok(event)) = maybe_event {
                    if handle_input(event, &mut app) {
                        break;
                    }
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn handle_input(event: Event, app: &mut App) -> bool {
    let Event::Key(key) = event else {
        return false;
    };
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.filter_editing {
        match key.code {
            KeyCode::Esc => {
                app.filter_editing = false;
                app.filter.clear();
            }
            KeyCode::Enter => app.filter_editing = false,
            KeyCode::Backspace => {
                app.filter.pop();
            }
            KeyCode::Char(ch) => app.filter.push(ch),
            _ => {}
        }
        return false;
    }

    if app.prompt_visible() {
        match key.code {
            KeyCode::Tab | KeyCode::Down => app.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.form.focus_prev(),
            KeyCode::Left | KeyCode::Right => {
                if app.form.focus == AuthField::Mode {
                    app.form.toggle_mode();
                }
            }
            KeyCode::Enter => app.submit_login(),
            KeyCode::Backspace => app.form.backspace(),
            KeyCode::Char(ch) => {
                if app.form.focus == AuthField::Mode {
                    app.form.toggle_mode();
                } else {
                    app.form.push_char(ch);
                }
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('r') => app.spawn_connect(),
        KeyCode::Char('p') => app.toggle_pause(),
        KeyCode::Char('c') => app.clear_logs(),
        KeyCode::Char('l') => app.cycle_level(),
        KeyCode::Char('o') => app.logout(),
        KeyCode::Char('/') => app.filter_editing = true,
        _ => {}
    }
    false
}

#[derive(Clone, Copy)]
struct ConsoleTheme {
    bg: Color,
    border: Color,
    title: Color,
    text: Color,
    muted: Color,
    ok: Color,
    warn: Color,
    critical: Color,
}

fn console_theme() -> ConsoleTheme {
    ConsoleTheme {
        bg: Color::Rgb(11, 18, 32),
        border: Color::Rgb(71, 85, 105),
        title: Color::Rgb(191, 219, 254),
        text: Color::Rgb(226, 232, 240),
        muted: Color::Rgb(148, 163, 184),
        ok: Color::Rgb(34, 197, 94),
        warn: Color::Rgb(245, 158, 11),
        critical: Color::Rgb(239, 68, 68),
    }
}

fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    let size = frame.size();
    let theme = console_theme();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(size);
    frame.render_widget(render_header(app, theme), layout[0]);
    frame.render_widget(render_summaries(app, theme), layout[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(layout[2]);
    render_nodes_panel(frame, app, theme, body[0]);
    render_logs_panel(frame, app, theme, body[1]);

    if app.prompt_visible() {
        render_auth_prompt(frame, app, theme);
    }
}

fn render_header(app: &App, theme: ConsoleTheme) -> Paragraph<'static> {
    let conn = match &app.conn {
        ConnState::Disconnected { .. } => ("disconnected", theme.critical),
        ConnState::Connecting => ("connecting", theme.warn),
        ConnState::Connected => ("connected", theme.ok),
    };
    let paused = if app.feed.paused() { " · paused" } else { "" };
    let status_line = format!(
        "State: {} · Backend: {} · Level: {}{paused}",
        conn.0, app.config.base_url, app.level
    );
    let note = app
        .status_note
        .clone()
        .or_else(|| app.stream_hint.clone())
        .unwrap_or_else(|| "ready (r refresh, p pause, c clear, l level, o logout, q quit)".to_string());

    Paragraph::new(Text::from(vec![
        Line::from(Span::styled(status_line, Style::default().fg(conn.1))),
        Line::from(Span::styled(note, Style::default().fg(theme.muted))),
    ]))
    .style(Style::default().fg(theme.text).bg(theme.bg))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(Span::styled(
                "Pool Pulse",
                Style::default()
                    .fg(theme.title)
                    .add_modifier(Modifier::BOLD),
            )),
    )
}

fn render_summaries(app: &App, theme: ConsoleTheme) -> Paragraph<'static> {
    let updater = app
        .status
        .as_ref()
        .map(updater_summary)
        .unwrap_or_else(|| "updater: -".to_string());
    let pool = app
        .status
        .as_ref()
        .map(pool_summary)
        .unwrap_or_else(|| "pool(-)".to_string());
    let nodes = app
        .nodes
        .as_ref()
        .map(nodes_summary)
        .unwrap_or_else(|| "alive=-".to_string());

    Paragraph::new(Line::from(Span::styled(
        format!("{updater} · {pool} · {nodes}"),
        Style::default().fg(theme.text),
    )))
    .style(Style::default().bg(theme.bg))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(Span::styled(
                "Status",
                Style::default()
                    .fg(theme.title)
                    .add_modifier(Modifier::BOLD),
            )),
    )
}

fn render_nodes_panel(frame: &mut ratatui::Frame, app: &App, theme: ConsoleTheme, area: Rect) {
    let empty: Vec<NodeRow> = Vec::new();
    let rows = app
        .nodes
        .as_ref()
        .map(|snapshot| filter_nodes(&snapshot.nodes, &app.filter))
        .unwrap_or_else(|| empty.iter().collect());

    let mut items = vec![ListItem::new(Line::from(Span::styled(
        format!(
            "{:<24} {:<5} {:>8}  {:<20} {:<20}",
            "id", "alive", "delay", "last_seen", "last_try"
        ),
        Style::default()
            .fg(theme.muted)
            .add_modifier(Modifier::BOLD),
    )))];
    for node in rows {
        let style = if node.alive {
            Style::default().fg(theme.ok)
        } else {
            Style::default().fg(theme.critical)
        };
        items.push(ListItem::new(Line::from(Span::styled(
            format!(
                "{:<24} {:<5} {:>6}ms  {:<20} {:<20}",
                node.id,
                if node.alive { "yes" } else { "no" },
                node.delay_ms,
                or_dash(&node.last_seen_utc),
                or_dash(&node.last_try_utc),
            ),
            style,
        ))));
    }

    let filter_label = if app.filter_editing {
        format!("Nodes · filter: {}_", app.filter)
    } else if app.filter.is_empty() {
        "Nodes (/ filter)".to_string()
    } else {
        format!("Nodes · filter: {}", app.filter)
    };
    let list = List::new(items).style(Style::default().bg(theme.bg)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(Span::styled(
                filter_label,
                Style::default()
                    .fg(theme.title)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(list, area);
}

fn render_logs_panel(frame: &mut ratatui::Frame, app: &App, theme: ConsoleTheme, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let mut tail: Vec<&str> = app.feed.lines().collect();
    if tail.len() > visible {
        tail = tail.split_off(tail.len() - visible);
    }
    let lines: Vec<Line> = tail
        .into_iter()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(theme.text))))
        .collect();

    let mut title = format!("Logs ({}/{})", app.feed.len(), ppc_core::LOG_FEED_CAPACITY);
    if let Some(hint) = &app.stream_hint {
        title = format!("{title} · {hint}");
    }
    let paragraph = Paragraph::new(Text::from(lines))
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(theme.title)
                        .add_modifier(Modifier::BOLD),
                )),
        );
    frame.render_widget(paragraph, area);
}

fn render_auth_prompt(frame: &mut ratatui::Frame, app: &App, theme: ConsoleTheme) {
    let area = centered_rect(54, 11, frame.size());
    frame.render_widget(Clear, area);

    let marker = |field: AuthField| {
        if app.form.focus == field {
            "▸ "
        } else {
            "  "
        }
    };
    let mut lines = vec![Line::from(Span::styled(
        format!("{}Mode: {:?}  (←/→ switch)", marker(AuthField::Mode), app.form.mode),
        Style::default().fg(theme.text),
    ))];
    match app.form.mode {
        AuthMode::Token => {
            lines.push(Line::from(Span::styled(
                format!("{}Token: {}", marker(AuthField::Token), app.form.token),
                Style::default().fg(theme.text),
            )));
        }
        AuthMode::Basic => {
            lines.push(Line::from(Span::styled(
                format!("{}User:  {}", marker(AuthField::User), app.form.user),
                Style::default().fg(theme.text),
            )));
            lines.push(Line::from(Span::styled(
                format!(
                    "{}Pass:  {}",
                    marker(AuthField::Pass),
                    "*".repeat(app.form.pass.chars().count())
                ),
                Style::default().fg(theme.text),
            )));
        }
    }
    if let ConnState::Disconnected {
        message: Some(message),
    } = &app.conn
    {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(theme.critical),
        )));
    }
    if matches!(app.conn, ConnState::Connecting) {
        lines.push(Line::from(Span::styled(
            "connecting…",
            Style::default().fg(theme.warn),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Enter login · Tab next field · Ctrl+C quit",
        Style::default().fg(theme.muted),
    )));

    let prompt = Paragraph::new(Text::from(lines))
        .style(Style::default().fg(theme.text).bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(Span::styled(
                    "Sign in",
                    Style::default()
                        .fg(theme.title)
                        .add_modifier(Modifier::BOLD),
                )),
        );
    frame.render_widget(prompt, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn load_config() -> Config {
    Config {
        base_url: resolve_base_url(),
        credentials_path: CredentialStore::default_path(),
    }
}

fn resolve_base_url() -> String {
    if let Ok(value) = std::env::var("PPC_BASE_URL") {
        let trimmed = value.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    DEFAULT_BASE_URL.to_string()
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_enabled = matches!(
        std::env::var("PPC_LOG_STDOUT").ok().as_deref(),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") | Some("YES")
    );
    if stdout_enabled {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}
