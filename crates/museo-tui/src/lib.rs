// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use museo_app::{
    AppCommand, AppState, Artwork, ArtworkId, BrowseControls, Debouncer, NavigationCapture,
    department_options, visible_sequence,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

const LOAD_FAILED_MESSAGE: &str = "could not load artworks; check your connection and retry with R";
const DETAIL_FAILED_MESSAGE: &str = "could not load this artwork";
const EMPTY_RESULTS_MESSAGE: &str = "no artworks match; try \"monet\", \"hopper\", or \"warhol\"";

/// Everything the event loop needs from the outside world. `load_working_set`
/// and `fetch_artwork` block; the `spawn_*` wrappers run them and report back
/// over the internal channel tagged with the caller's request id, so the loop
/// can discard results that were superseded before they arrived. Runtimes
/// backed by a real network override the wrappers to move the work onto a
/// thread.
pub trait CatalogRuntime {
    fn load_working_set(&mut self, query: &str) -> Result<Vec<Artwork>>;

    fn fetch_artwork(&mut self, id: ArtworkId) -> Result<Option<Artwork>>;

    fn spawn_load_cycle(
        &mut self,
        request_id: u64,
        query: &str,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let event = match self.load_working_set(query) {
            Ok(rows) => LoadCycleEvent::Completed { request_id, rows },
            Err(_) => LoadCycleEvent::Failed { request_id },
        };
        tx.send(InternalEvent::LoadCycle(event))
            .map_err(|_| anyhow!("internal event channel closed"))
    }

    fn spawn_detail_fetch(
        &mut self,
        request_id: u64,
        id: ArtworkId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let event = match self.fetch_artwork(id) {
            Ok(artwork) => DetailFetchEvent::Loaded {
                request_id,
                artwork: Box::new(artwork),
            },
            Err(_) => DetailFetchEvent::Failed { request_id },
        };
        tx.send(InternalEvent::DetailFetch(event))
            .map_err(|_| anyhow!("internal event channel closed"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadCycleEvent {
    Completed { request_id: u64, rows: Vec<Artwork> },
    // failure detail stays in the runtime; the view shows one generic message
    Failed { request_id: u64 },
}

impl LoadCycleEvent {
    const fn request_id(&self) -> u64 {
        match self {
            Self::Completed { request_id, .. } | Self::Failed { request_id } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailFetchEvent {
    Loaded {
        request_id: u64,
        artwork: Box<Option<Artwork>>,
    },
    Failed {
        request_id: u64,
    },
}

impl DetailFetchEvent {
    const fn request_id(&self) -> u64 {
        match self {
            Self::Loaded { request_id, .. } | Self::Failed { request_id } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    LoadCycle(LoadCycleEvent),
    DetailFetch(DetailFetchEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseFocus {
    Table,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
struct BrowseUiState {
    controls: BrowseControls,
    debounce: Debouncer<String>,
    rows: Vec<Artwork>,
    departments: Vec<String>,
    loading: bool,
    error: Option<String>,
    cursor: usize,
    focus: BrowseFocus,
    in_flight: Option<u64>,
}

impl BrowseUiState {
    fn new(debounce_delay: Duration) -> Self {
        Self {
            controls: BrowseControls::default(),
            debounce: Debouncer::new(String::new(), debounce_delay),
            rows: Vec::new(),
            departments: Vec::new(),
            loading: false,
            error: None,
            cursor: 0,
            focus: BrowseFocus::Table,
            in_flight: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DetailUiState {
    id: ArtworkId,
    capture: Option<NavigationCapture>,
    artwork: Option<Artwork>,
    loading: bool,
    not_found: bool,
    error: Option<String>,
    in_flight: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    browse: BrowseUiState,
    detail: Option<DetailUiState>,
    help_visible: bool,
    status_token: u64,
    next_request_id: u64,
}

impl ViewData {
    fn new(debounce_delay: Duration) -> Self {
        Self {
            browse: BrowseUiState::new(debounce_delay),
            detail: None,
            help_visible: false,
            status_token: 0,
            next_request_id: 0,
        }
    }

    fn next_request_id(&mut self) -> u64 {
        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.next_request_id
    }
}

pub fn run_app<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    debounce_delay: Duration,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(debounce_delay);
    let (internal_tx, internal_rx) = mpsc::channel();

    start_load_cycle(runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);
        poll_debounce(runtime, &mut view_data, &internal_tx, Instant::now());

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::LoadCycle(event) => handle_load_cycle_event(view_data, event),
            InternalEvent::DetailFetch(event) => handle_detail_fetch_event(view_data, event),
        }
    }
}

fn handle_load_cycle_event(view_data: &mut ViewData, event: LoadCycleEvent) {
    let Some(in_flight) = view_data.browse.in_flight else {
        return;
    };
    if event.request_id() != in_flight {
        return;
    }

    match event {
        LoadCycleEvent::Completed { rows, .. } => {
            view_data.browse.departments = department_options(&rows);
            view_data.browse.rows = rows;
            view_data.browse.error = None;
            view_data.browse.cursor = 0;
        }
        LoadCycleEvent::Failed { .. } => {
            // previous working set stays on screen
            view_data.browse.error = Some(LOAD_FAILED_MESSAGE.to_owned());
        }
    }
    view_data.browse.loading = false;
    view_data.browse.in_flight = None;
}

fn handle_detail_fetch_event(view_data: &mut ViewData, event: DetailFetchEvent) {
    let Some(detail) = view_data.detail.as_mut() else {
        return;
    };
    let Some(in_flight) = detail.in_flight else {
        return;
    };
    if event.request_id() != in_flight {
        return;
    }

    match event {
        DetailFetchEvent::Loaded { artwork, .. } => match *artwork {
            Some(artwork) => detail.artwork = Some(artwork),
            None => detail.not_found = true,
        },
        DetailFetchEvent::Failed { .. } => {
            detail.error = Some(DETAIL_FAILED_MESSAGE.to_owned());
        }
    }
    detail.loading = false;
    detail.in_flight = None;
}

/// Begin a fresh load cycle for the settled query. Supersedes any cycle still
/// in flight: its result will arrive with an older request id and be dropped.
fn start_load_cycle<R: CatalogRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let query = view_data.browse.debounce.settled().clone();
    let request_id = view_data.next_request_id();
    view_data.browse.in_flight = Some(request_id);
    view_data.browse.loading = true;
    view_data.browse.error = None;

    if runtime
        .spawn_load_cycle(request_id, &query, internal_tx.clone())
        .is_err()
    {
        view_data.browse.in_flight = None;
        view_data.browse.loading = false;
        view_data.browse.error = Some(LOAD_FAILED_MESSAGE.to_owned());
    }
}

fn poll_debounce<R: CatalogRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    now: Instant,
) {
    if view_data.browse.debounce.poll(now).is_some() {
        start_load_cycle(runtime, view_data, internal_tx);
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                view_data.help_visible = false;
            }
            _ => {}
        }
        return false;
    }

    if view_data.detail.is_some() {
        handle_detail_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.browse.focus == BrowseFocus::Search {
        handle_search_key(view_data, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Char('/') => view_data.browse.focus = BrowseFocus::Search,
        KeyCode::Char('R') => start_load_cycle(runtime, view_data, internal_tx),
        KeyCode::Char('j') | KeyCode::Down => move_cursor(view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(view_data, -1),
        KeyCode::Char('g') | KeyCode::Home => view_data.browse.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            let len = browse_visible(view_data).len();
            view_data.browse.cursor = len.saturating_sub(1);
        }
        KeyCode::Char('d') => cycle_department(&mut view_data.browse),
        KeyCode::Char('i') => {
            view_data.browse.controls.with_image_only = !view_data.browse.controls.with_image_only;
            view_data.browse.cursor = 0;
        }
        KeyCode::Char('s') => {
            view_data.browse.controls.sort_key = view_data.browse.controls.sort_key.toggled();
        }
        KeyCode::Char('r') => {
            view_data.browse.controls.sort_dir = view_data.browse.controls.sort_dir.toggled();
        }
        KeyCode::Enter => open_detail_at_cursor(state, runtime, view_data, internal_tx),
        _ => {}
    }
    false
}

fn handle_search_key(view_data: &mut ViewData, key: KeyEvent) {
    let browse = &mut view_data.browse;
    match key.code {
        KeyCode::Esc | KeyCode::Enter => browse.focus = BrowseFocus::Table,
        KeyCode::Backspace => {
            browse.controls.query.pop();
            browse
                .debounce
                .update(browse.controls.query.clone(), Instant::now());
            browse.cursor = 0;
        }
        KeyCode::Char(character) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            browse.controls.query.push(character);
            browse
                .debounce
                .update(browse.controls.query.clone(), Instant::now());
            browse.cursor = 0;
        }
        _ => {}
    }
}

fn handle_detail_key<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => {
            view_data.detail = None;
            state.dispatch(AppCommand::CloseDetail);
        }
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Char('p') | KeyCode::Left => {
            navigate_detail(state, runtime, view_data, internal_tx, NavDirection::Prev);
        }
        KeyCode::Char('n') | KeyCode::Right => {
            navigate_detail(state, runtime, view_data, internal_tx, NavDirection::Next);
        }
        _ => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavDirection {
    Prev,
    Next,
}

fn move_cursor(view_data: &mut ViewData, delta: i64) {
    let len = browse_visible(view_data).len();
    if len == 0 {
        view_data.browse.cursor = 0;
        return;
    }
    let cursor = view_data.browse.cursor.min(len - 1) as i64;
    view_data.browse.cursor = cursor.saturating_add(delta).clamp(0, len as i64 - 1) as usize;
}

/// Rotate the department filter through All and every option derived from the
/// current working set.
fn cycle_department(browse: &mut BrowseUiState) {
    if browse.departments.is_empty() {
        browse.controls.department.clear();
        return;
    }
    let position = browse
        .departments
        .iter()
        .position(|department| *department == browse.controls.department);
    browse.controls.department = match position {
        None => browse.departments[0].clone(),
        Some(index) if index + 1 < browse.departments.len() => {
            browse.departments[index + 1].clone()
        }
        Some(_) => String::new(),
    };
    browse.cursor = 0;
}

fn browse_visible(view_data: &ViewData) -> Vec<Artwork> {
    visible_sequence(&view_data.browse.rows, &view_data.browse.controls)
}

fn open_detail_at_cursor<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let visible = browse_visible(view_data);
    let cursor = view_data.browse.cursor.min(visible.len().saturating_sub(1));
    let Some(capture) = NavigationCapture::from_visible(&visible, cursor) else {
        emit_status(state, view_data, internal_tx, "nothing to open");
        return;
    };
    let Some(id) = capture.current_id() else {
        return;
    };
    open_detail(state, runtime, view_data, internal_tx, id, Some(capture));
}

fn open_detail<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    id: ArtworkId,
    capture: Option<NavigationCapture>,
) {
    state.dispatch(AppCommand::OpenDetail(id));
    let request_id = view_data.next_request_id();
    view_data.detail = Some(DetailUiState {
        id,
        capture,
        artwork: None,
        loading: true,
        not_found: false,
        error: None,
        in_flight: Some(request_id),
    });

    if runtime
        .spawn_detail_fetch(request_id, id, internal_tx.clone())
        .is_err()
    {
        if let Some(detail) = view_data.detail.as_mut() {
            detail.in_flight = None;
            detail.loading = false;
            detail.error = Some(DETAIL_FAILED_MESSAGE.to_owned());
        }
    }
}

fn navigate_detail<R: CatalogRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    direction: NavDirection,
) {
    let Some(detail) = view_data.detail.as_ref() else {
        return;
    };
    let Some(capture) = detail.capture.clone() else {
        emit_status(state, view_data, internal_tx, "no list to navigate");
        return;
    };

    let target = match direction {
        NavDirection::Prev => capture.prev_id(),
        NavDirection::Next => capture.next_id(),
    };
    let Some(target) = target else {
        let message = match direction {
            NavDirection::Prev => "already at the first artwork",
            NavDirection::Next => "already at the last artwork",
        };
        emit_status(state, view_data, internal_tx, message);
        return;
    };
    let Some(advanced) = capture.advance_to(target) else {
        return;
    };

    open_detail(
        state,
        runtime,
        view_data,
        internal_tx,
        target,
        Some(advanced),
    );
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_header(frame, view_data, chunks[0]);

    match &view_data.detail {
        Some(detail) => render_detail(frame, detail, chunks[1]),
        None => render_browse(frame, view_data, chunks[1]),
    }

    render_status(frame, state, view_data, chunks[2]);

    if view_data.help_visible {
        render_help(frame, frame.area());
    }
}

fn render_header(frame: &mut ratatui::Frame<'_>, view_data: &ViewData, area: Rect) {
    let summary = controls_summary(&view_data.browse);
    let header = Paragraph::new(summary).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" museo — Art Institute of Chicago "),
    );
    frame.render_widget(header, area);
}

fn controls_summary(browse: &BrowseUiState) -> String {
    let query = if browse.focus == BrowseFocus::Search {
        format!("{}▏", browse.controls.query)
    } else if browse.controls.query.is_empty() {
        "(all)".to_owned()
    } else {
        browse.controls.query.clone()
    };
    let department = if browse.controls.department.is_empty() {
        "All"
    } else {
        &browse.controls.department
    };
    let images = if browse.controls.with_image_only {
        "images only"
    } else {
        "all records"
    };
    format!(
        "search: {}  │  dept: {}  │  {}  │  sort: {} {}",
        query,
        department,
        images,
        browse.controls.sort_key.as_str(),
        browse.controls.sort_dir.as_str(),
    )
}

fn render_browse(frame: &mut ratatui::Frame<'_>, view_data: &ViewData, area: Rect) {
    let visible = browse_visible(view_data);
    let title = format!(
        " artworks {}/{} ",
        visible.len(),
        view_data.browse.rows.len()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    if visible.is_empty() {
        let message = if view_data.browse.loading {
            "loading artworks…"
        } else {
            EMPTY_RESULTS_MESSAGE
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let cursor = view_data.browse.cursor.min(visible.len() - 1);
    let header = Row::new(vec!["Title", "Artist", "Date", "Department", "Img"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row<'_>> = visible
        .iter()
        .enumerate()
        .map(|(index, artwork)| {
            let mark = if artwork.has_image { "●" } else { " " };
            let row = Row::new(vec![
                Cell::from(artwork.title.clone()),
                Cell::from(artwork.artist.clone()),
                Cell::from(artwork.date.clone()),
                Cell::from(artwork.department.clone()),
                Cell::from(mark),
            ]);
            if index == cursor {
                row.style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(34),
            Constraint::Percentage(30),
            Constraint::Percentage(12),
            Constraint::Percentage(20),
            Constraint::Length(3),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

fn render_detail(frame: &mut ratatui::Frame<'_>, detail: &DetailUiState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" artwork {} ", detail.id.get()));
    let body = Paragraph::new(detail_body_text(detail))
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(body, area);
}

fn detail_body_text(detail: &DetailUiState) -> String {
    if detail.loading {
        return "loading…".to_owned();
    }
    if detail.not_found {
        return "artwork not found; it may have been removed from the catalog".to_owned();
    }
    if let Some(error) = &detail.error {
        return error.clone();
    }
    let Some(artwork) = &detail.artwork else {
        return String::new();
    };

    let mut lines = vec![
        artwork.title.clone(),
        format!("by {}", artwork.artist),
        String::new(),
    ];
    if !artwork.date.is_empty() {
        lines.push(format!("date:       {}", artwork.date));
    }
    if !artwork.department.is_empty() {
        lines.push(format!("department: {}", artwork.department));
    }
    if !artwork.medium.is_empty() {
        lines.push(format!("medium:     {}", artwork.medium));
    }
    lines.push(format!("image:      {}", artwork.image_url));
    lines.push(String::new());
    lines.push(detail_nav_text(detail));
    lines.join("\n")
}

fn detail_nav_text(detail: &DetailUiState) -> String {
    let Some(capture) = &detail.capture else {
        return "esc back".to_owned();
    };
    let position = format!("{} of {}", capture.current_index + 1, capture.ids.len());
    let prev = if capture.prev_id().is_some() {
        "← prev"
    } else {
        "  —   "
    };
    let next = if capture.next_id().is_some() {
        "next →"
    } else {
        "  —   "
    };
    format!("{prev}  [{position}]  {next}   esc back")
}

fn render_status(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    view_data: &ViewData,
    area: Rect,
) {
    let text = status_text(state, view_data);
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Gray)),
        area,
    );
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(status) = &state.status_line {
        return status.clone();
    }
    if view_data.detail.is_some() {
        return "p/← prev · n/→ next · esc back · ? help".to_owned();
    }
    if view_data.browse.loading {
        return "loading artworks…".to_owned();
    }
    if let Some(error) = &view_data.browse.error {
        return error.clone();
    }
    "/ search · d dept · i images · s sort · r dir · enter open · ? help · q quit".to_owned()
}

fn render_help(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let popup = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup);
    let help = Paragraph::new(HELP_TEXT)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" help "));
    frame.render_widget(help, popup);
}

const HELP_TEXT: &str = "\
browse
  /          edit the search query (enter/esc to finish)
  d          cycle the department filter
  i          toggle images-only
  s          switch sort column (title/date)
  r          reverse sort direction
  j/k ↑/↓    move the cursor
  g/G        jump to first/last row
  enter      open the selected artwork
  R          reload from the catalog

detail
  p/n ←/→    previous/next artwork in the opened list
  esc        back to browsing

q or ctrl-q quits.";

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        BrowseFocus, CatalogRuntime, DetailFetchEvent, DetailUiState, InternalEvent,
        LoadCycleEvent, NavDirection, ViewData, browse_visible, detail_body_text,
        handle_key_event, navigate_detail, open_detail_at_cursor, poll_debounce,
        process_internal_events, start_load_cycle,
    };
    use anyhow::{Result, bail};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use museo_app::{AppState, Artwork, ArtworkId, Screen};
    use museo_testkit::sample_artworks;
    use std::collections::HashMap;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::{Duration, Instant};

    const DEBOUNCE: Duration = Duration::from_millis(400);

    /// Synchronous stand-in for the network runtime. With `manual` set the
    /// spawn hooks only record the request, letting a test deliver events in
    /// whatever order it wants.
    #[derive(Default)]
    struct TestRuntime {
        responses: HashMap<String, Vec<Artwork>>,
        details: HashMap<i64, Artwork>,
        fail_loads: bool,
        fail_details: bool,
        manual: bool,
        load_requests: Vec<(u64, String)>,
        detail_requests: Vec<(u64, ArtworkId)>,
    }

    impl TestRuntime {
        fn with_fixtures() -> Self {
            let rows = sample_artworks();
            let details = rows.iter().map(|row| (row.id.get(), row.clone())).collect();
            let mut responses = HashMap::new();
            responses.insert(String::new(), rows);
            Self {
                responses,
                details,
                ..Self::default()
            }
        }
    }

    impl CatalogRuntime for TestRuntime {
        fn load_working_set(&mut self, query: &str) -> Result<Vec<Artwork>> {
            if self.fail_loads {
                bail!("connection refused");
            }
            Ok(self.responses.get(query).cloned().unwrap_or_default())
        }

        fn fetch_artwork(&mut self, id: ArtworkId) -> Result<Option<Artwork>> {
            if self.fail_details {
                bail!("connection refused");
            }
            Ok(self.details.get(&id.get()).cloned())
        }

        fn spawn_load_cycle(
            &mut self,
            request_id: u64,
            query: &str,
            tx: Sender<InternalEvent>,
        ) -> Result<()> {
            self.load_requests.push((request_id, query.to_owned()));
            if self.manual {
                return Ok(());
            }
            let event = match self.load_working_set(query) {
                Ok(rows) => LoadCycleEvent::Completed { request_id, rows },
                Err(_) => LoadCycleEvent::Failed { request_id },
            };
            tx.send(InternalEvent::LoadCycle(event))
                .map_err(|_| anyhow::anyhow!("internal event channel closed"))
        }

        fn spawn_detail_fetch(
            &mut self,
            request_id: u64,
            id: ArtworkId,
            tx: Sender<InternalEvent>,
        ) -> Result<()> {
            self.detail_requests.push((request_id, id));
            if self.manual {
                return Ok(());
            }
            let event = match self.fetch_artwork(id) {
                Ok(artwork) => DetailFetchEvent::Loaded {
                    request_id,
                    artwork: Box::new(artwork),
                },
                Err(_) => DetailFetchEvent::Failed { request_id },
            };
            tx.send(InternalEvent::DetailFetch(event))
                .map_err(|_| anyhow::anyhow!("internal event channel closed"))
        }
    }

    struct Harness {
        state: AppState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: Sender<InternalEvent>,
        rx: Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(runtime: TestRuntime) -> Self {
            let (tx, rx) = mpsc::channel();
            Self {
                state: AppState::default(),
                runtime,
                view_data: ViewData::new(DEBOUNCE),
                tx,
                rx,
            }
        }

        fn mounted() -> Self {
            let mut harness = Self::new(TestRuntime::with_fixtures());
            harness.start_cycle();
            harness.pump();
            harness
        }

        fn start_cycle(&mut self) {
            start_load_cycle(&mut self.runtime, &mut self.view_data, &self.tx);
        }

        fn pump(&mut self) {
            process_internal_events(&mut self.state, &mut self.view_data, &self.rx);
        }

        fn key(&mut self, code: KeyCode) {
            handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, KeyModifiers::NONE),
            );
        }

        fn type_query(&mut self, text: &str) {
            self.key(KeyCode::Char('/'));
            for character in text.chars() {
                self.key(KeyCode::Char(character));
            }
            self.key(KeyCode::Enter);
        }

        fn visible_ids(&self) -> Vec<i64> {
            browse_visible(&self.view_data)
                .iter()
                .map(|row| row.id.get())
                .collect()
        }

        fn detail(&self) -> &DetailUiState {
            self.view_data.detail.as_ref().expect("detail open")
        }
    }

    fn artwork(id: i64, title: &str) -> Artwork {
        Artwork {
            id: ArtworkId::new(id),
            title: title.to_owned(),
            artist: "A".to_owned(),
            date: String::new(),
            department: String::new(),
            medium: String::new(),
            image_url: String::new(),
            has_image: true,
        }
    }

    #[test]
    fn mount_loads_the_working_set_and_derives_departments() {
        let harness = Harness::mounted();
        assert_eq!(harness.view_data.browse.rows.len(), 14);
        assert!(!harness.view_data.browse.loading);
        assert_eq!(harness.view_data.browse.in_flight, None);
        assert!(
            harness
                .view_data
                .browse
                .departments
                .contains(&"Photography".to_owned())
        );
    }

    #[test]
    fn typing_starts_a_cycle_only_after_the_quiet_window() {
        let mut harness = Harness::mounted();
        harness
            .runtime
            .responses
            .insert("monet".to_owned(), vec![artwork(3, "Water Lilies")]);

        harness.type_query("monet");
        assert_eq!(harness.runtime.load_requests.len(), 1, "no eager cycle");

        poll_debounce(
            &mut harness.runtime,
            &mut harness.view_data,
            &harness.tx,
            Instant::now(),
        );
        assert_eq!(harness.runtime.load_requests.len(), 1, "window not elapsed");

        poll_debounce(
            &mut harness.runtime,
            &mut harness.view_data,
            &harness.tx,
            Instant::now() + DEBOUNCE,
        );
        harness.pump();

        assert_eq!(harness.runtime.load_requests.len(), 2);
        assert_eq!(harness.runtime.load_requests[1].1, "monet");
        assert_eq!(harness.visible_ids(), vec![3]);
    }

    #[test]
    fn a_superseded_cycle_result_is_discarded() {
        let mut harness = Harness::new(TestRuntime::with_fixtures());
        harness.runtime.manual = true;

        harness.start_cycle();
        let first = harness.runtime.load_requests[0].0;
        harness.start_cycle();
        let second = harness.runtime.load_requests[1].0;

        // the older cycle completes after the newer one
        harness
            .tx
            .send(InternalEvent::LoadCycle(LoadCycleEvent::Completed {
                request_id: second,
                rows: vec![artwork(2, "current")],
            }))
            .expect("send");
        harness
            .tx
            .send(InternalEvent::LoadCycle(LoadCycleEvent::Completed {
                request_id: first,
                rows: vec![artwork(1, "stale")],
            }))
            .expect("send");
        harness.pump();

        assert_eq!(harness.visible_ids(), vec![2]);
        assert!(!harness.view_data.browse.loading);
    }

    #[test]
    fn a_failed_cycle_keeps_the_previous_rows() {
        let mut harness = Harness::mounted();
        let before = harness.view_data.browse.rows.clone();

        harness.runtime.manual = true;
        harness.start_cycle();
        let request_id = harness.runtime.load_requests.last().expect("request").0;
        harness
            .tx
            .send(InternalEvent::LoadCycle(LoadCycleEvent::Failed {
                request_id,
            }))
            .expect("send");
        harness.pump();

        assert_eq!(harness.view_data.browse.rows, before);
        assert!(harness.view_data.browse.error.is_some());
        assert!(!harness.view_data.browse.loading);
    }

    #[test]
    fn starting_a_cycle_clears_the_previous_error() {
        let mut harness = Harness::mounted();
        harness.view_data.browse.error = Some("boom".to_owned());
        harness.start_cycle();
        assert_eq!(harness.view_data.browse.error, None);
        assert!(harness.view_data.browse.loading);
    }

    #[test]
    fn filter_keys_reshape_the_visible_sequence() {
        let mut harness = Harness::mounted();
        let all = harness.visible_ids().len();

        // images-only is on by default; the two imageless fixtures are hidden
        assert_eq!(all, 12);
        harness.key(KeyCode::Char('i'));
        assert_eq!(harness.visible_ids().len(), 14);

        harness.key(KeyCode::Char('i'));
        harness.key(KeyCode::Char('d'));
        let department = harness.view_data.browse.controls.department.clone();
        assert!(!department.is_empty());
        assert!(
            browse_visible(&harness.view_data)
                .iter()
                .all(|row| row.department == department)
        );
    }

    #[test]
    fn sort_keys_toggle_column_and_direction() {
        let mut harness = Harness::mounted();
        let ascending = harness.visible_ids();

        harness.key(KeyCode::Char('r'));
        let descending = harness.visible_ids();
        let reversed: Vec<i64> = ascending.iter().rev().copied().collect();
        assert_eq!(descending, reversed);

        harness.key(KeyCode::Char('s'));
        assert_eq!(
            harness.view_data.browse.controls.sort_key.as_str(),
            "date"
        );
    }

    #[test]
    fn enter_opens_the_detail_with_a_capture_of_the_visible_order() {
        let mut harness = Harness::mounted();
        harness.key(KeyCode::Char('j'));
        harness.key(KeyCode::Enter);
        harness.pump();

        let visible = harness.visible_ids();
        let detail = harness.detail();
        assert_eq!(detail.id.get(), visible[1]);
        assert_eq!(harness.state.screen, Screen::Detail(detail.id));
        let capture = detail.capture.as_ref().expect("capture");
        assert_eq!(capture.current_index, 1);
        assert_eq!(
            capture.ids.iter().map(|id| id.get()).collect::<Vec<_>>(),
            visible
        );
        assert!(detail.artwork.is_some());
    }

    #[test]
    fn next_then_prev_returns_to_the_same_artwork() {
        let mut harness = Harness::mounted();
        harness.key(KeyCode::Char('j'));
        harness.key(KeyCode::Enter);
        harness.pump();
        let origin = harness.detail().id;

        harness.key(KeyCode::Char('n'));
        harness.pump();
        assert_ne!(harness.detail().id, origin);

        harness.key(KeyCode::Char('p'));
        harness.pump();
        assert_eq!(harness.detail().id, origin);
        assert_eq!(harness.state.screen, Screen::Detail(origin));
    }

    #[test]
    fn navigation_stops_at_both_boundaries() {
        let mut harness = Harness::mounted();
        harness.key(KeyCode::Enter);
        harness.pump();
        let first = harness.detail().id;

        harness.key(KeyCode::Char('p'));
        harness.pump();
        assert_eq!(harness.detail().id, first);
        assert!(
            harness
                .state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("first"))
        );

        let last_index = harness.visible_ids().len() - 1;
        for _ in 0..last_index {
            harness.key(KeyCode::Char('n'));
            harness.pump();
        }
        let last = harness.detail().id;
        harness.key(KeyCode::Char('n'));
        harness.pump();
        assert_eq!(harness.detail().id, last);
    }

    #[test]
    fn filter_changes_while_detail_is_open_do_not_reshape_the_capture() {
        let mut harness = Harness::mounted();
        harness.key(KeyCode::Enter);
        harness.pump();
        let capture_before = harness.detail().capture.clone();

        // narrow the browse projection underneath the open detail
        harness.view_data.browse.controls.query = "dunes".to_owned();
        assert_eq!(harness.detail().capture, capture_before);

        harness.key(KeyCode::Char('n'));
        harness.pump();
        let advanced = harness.detail().capture.as_ref().expect("capture");
        assert_eq!(
            advanced.ids,
            capture_before.as_ref().expect("capture").ids
        );
    }

    #[test]
    fn detail_without_a_capture_reports_no_list() {
        let mut harness = Harness::mounted();
        harness.view_data.detail = Some(DetailUiState {
            id: ArtworkId::new(1),
            capture: None,
            artwork: None,
            loading: false,
            not_found: false,
            error: None,
            in_flight: None,
        });

        navigate_detail(
            &mut harness.state,
            &mut harness.runtime,
            &mut harness.view_data,
            &harness.tx,
            NavDirection::Next,
        );
        assert_eq!(harness.detail().id.get(), 1);
        assert!(
            harness
                .state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("no list"))
        );
    }

    #[test]
    fn a_superseded_detail_fetch_is_discarded() {
        let mut harness = Harness::mounted();
        harness.key(KeyCode::Enter);
        harness.pump();

        harness.runtime.manual = true;
        harness.key(KeyCode::Char('n'));
        let stale_id = harness.runtime.detail_requests[0].0;
        harness.key(KeyCode::Char('n'));

        harness
            .tx
            .send(InternalEvent::DetailFetch(DetailFetchEvent::Loaded {
                request_id: stale_id,
                artwork: Box::new(Some(artwork(999, "stale"))),
            }))
            .expect("send");
        harness.pump();

        assert!(harness.detail().loading, "stale result must not commit");
        assert_eq!(harness.detail().artwork, None);
    }

    #[test]
    fn a_missing_artwork_is_not_found_rather_than_an_error() {
        let mut harness = Harness::mounted();
        harness.runtime.details.clear();
        harness.key(KeyCode::Enter);
        harness.pump();

        let detail = harness.detail();
        assert!(detail.not_found);
        assert_eq!(detail.error, None);
        assert!(detail_body_text(detail).contains("not found"));
    }

    #[test]
    fn a_failed_detail_fetch_shows_a_generic_error() {
        let mut harness = Harness::mounted();
        harness.runtime.fail_details = true;
        harness.key(KeyCode::Enter);
        harness.pump();

        let detail = harness.detail();
        assert!(!detail.not_found);
        assert!(detail.error.is_some());
        assert!(detail_body_text(detail).contains("could not load"));
    }

    #[test]
    fn escape_closes_the_detail_and_returns_to_browse() {
        let mut harness = Harness::mounted();
        harness.key(KeyCode::Enter);
        harness.pump();
        assert!(harness.view_data.detail.is_some());

        harness.key(KeyCode::Esc);
        assert_eq!(harness.view_data.detail, None);
        assert_eq!(harness.state.screen, Screen::Browse);
    }

    #[test]
    fn search_focus_captures_characters_and_escape_releases_it() {
        let mut harness = Harness::mounted();
        harness.key(KeyCode::Char('/'));
        assert_eq!(harness.view_data.browse.focus, BrowseFocus::Search);

        // 'q' is input while searching, not quit
        harness.key(KeyCode::Char('q'));
        assert_eq!(harness.view_data.browse.controls.query, "q");
        harness.key(KeyCode::Backspace);
        assert_eq!(harness.view_data.browse.controls.query, "");

        harness.key(KeyCode::Esc);
        assert_eq!(harness.view_data.browse.focus, BrowseFocus::Table);
    }

    #[test]
    fn returning_the_query_to_its_settled_value_starts_no_cycle() {
        let mut harness = Harness::mounted();
        harness.key(KeyCode::Char('/'));
        harness.key(KeyCode::Char('a'));
        harness.key(KeyCode::Backspace);
        harness.key(KeyCode::Esc);

        poll_debounce(
            &mut harness.runtime,
            &mut harness.view_data,
            &harness.tx,
            Instant::now() + DEBOUNCE + DEBOUNCE,
        );
        assert_eq!(harness.runtime.load_requests.len(), 1, "mount cycle only");
    }

    #[test]
    fn cursor_stays_within_the_visible_sequence() {
        let mut harness = Harness::mounted();
        let len = harness.visible_ids().len();

        harness.key(KeyCode::Char('k'));
        assert_eq!(harness.view_data.browse.cursor, 0);
        harness.key(KeyCode::Char('G'));
        assert_eq!(harness.view_data.browse.cursor, len - 1);
        harness.key(KeyCode::Char('j'));
        assert_eq!(harness.view_data.browse.cursor, len - 1);
        harness.key(KeyCode::Char('g'));
        assert_eq!(harness.view_data.browse.cursor, 0);
    }

    #[test]
    fn department_cycle_wraps_back_to_all() {
        let mut harness = Harness::mounted();
        let options = harness.view_data.browse.departments.len();
        assert!(options > 0);

        for _ in 0..options {
            harness.key(KeyCode::Char('d'));
            assert!(!harness.view_data.browse.controls.department.is_empty());
        }
        harness.key(KeyCode::Char('d'));
        assert!(harness.view_data.browse.controls.department.is_empty());
    }

    #[test]
    fn opening_on_an_empty_projection_emits_a_status() {
        let mut harness = Harness::new(TestRuntime::default());
        harness.start_cycle();
        harness.pump();
        assert!(harness.visible_ids().is_empty());

        open_detail_at_cursor(
            &mut harness.state,
            &mut harness.runtime,
            &mut harness.view_data,
            &harness.tx,
        );
        assert_eq!(harness.view_data.detail, None);
        assert!(harness.state.status_line.is_some());
    }

    #[test]
    fn help_overlay_swallows_other_keys() {
        let mut harness = Harness::mounted();
        harness.key(KeyCode::Char('?'));
        assert!(harness.view_data.help_visible);

        let cursor = harness.view_data.browse.cursor;
        harness.key(KeyCode::Char('j'));
        assert_eq!(harness.view_data.browse.cursor, cursor);

        harness.key(KeyCode::Esc);
        assert!(!harness.view_data.help_visible);
    }
}
