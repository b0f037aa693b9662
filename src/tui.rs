use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::io::{stdout, Stdout, Write};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

use crate::api::{HttpJobSource, JobSource};
use crate::config::Config;
use crate::controller::{Controller, Message};
use crate::models::JobPosting;
use crate::scroll::ScrollMetrics;
use crate::store::{FetchStatus, Store};
use crate::view::{bookmark_label, ActiveList, Tab, EMPTY_BOOKMARKS_MESSAGE};

/// Rows taken by one job card, separator included.
const CARD_HEIGHT: u16 = 7;
const WHEEL_STEP: u16 = 3;
const INPUT_POLL: Duration = Duration::from_millis(200);

/// Cursor and scroll position of the list area. Reset on tab switch.
#[derive(Debug, Default)]
struct ListView {
    selected: usize,
    scroll_top: u16,
    viewport_height: u16,
}

impl ListView {
    fn content_height(len: usize) -> u32 {
        len as u32 * CARD_HEIGHT as u32
    }

    fn metrics(&self, len: usize) -> ScrollMetrics {
        ScrollMetrics {
            viewport_height: self.viewport_height as u32,
            scroll_top: self.scroll_top as u32,
            content_height: Self::content_height(len),
        }
    }

    fn max_scroll(&self, len: usize) -> u16 {
        let content = Self::content_height(len);
        content
            .saturating_sub(self.viewport_height as u32)
            .min(u16::MAX as u32) as u16
    }

    fn scroll_down(&mut self, rows: u16, len: usize) {
        self.scroll_top = self.scroll_top.saturating_add(rows).min(self.max_scroll(len));
    }

    fn scroll_up(&mut self, rows: u16) {
        self.scroll_top = self.scroll_top.saturating_sub(rows);
    }

    fn next(&mut self, len: usize) {
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
            self.keep_selected_visible(len);
        }
    }

    fn prev(&mut self, len: usize) {
        if self.selected > 0 {
            self.selected -= 1;
            self.keep_selected_visible(len);
        }
    }

    fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.scroll_top = self.scroll_top.min(self.max_scroll(len));
    }

    fn keep_selected_visible(&mut self, len: usize) {
        let top = (self.selected as u32 * CARD_HEIGHT as u32).min(u16::MAX as u32) as u16;
        let bottom = top.saturating_add(CARD_HEIGHT);
        if top < self.scroll_top {
            self.scroll_top = top;
        } else if bottom > self.scroll_top.saturating_add(self.viewport_height) {
            self.scroll_top = bottom.saturating_sub(self.viewport_height);
        }
        self.scroll_top = self.scroll_top.min(self.max_scroll(len));
    }
}

pub async fn run_browse(config: &Config) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let source = HttpJobSource::new(config.endpoint.clone());
    let mut controller = Controller::new(source, config.scroll_threshold, tx.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut terminal = match setup_terminal(&mut stdout()) {
        Ok(terminal) => terminal,
        Err(e) => {
            // Leave the shell usable even when setup fails halfway.
            let _ = restore_terminal(&mut stdout());
            return Err(e);
        }
    };

    spawn_input_reader(tx);
    info!(endpoint = %config.endpoint, "browser started");
    controller.start();

    let result = run_loop(&mut terminal, &mut controller, &mut rx).await;
    controller.dispose();
    drop(rx);

    restore_terminal(&mut stdout())?;

    result
}

fn setup_terminal<W: Write>(out: &mut W) -> Result<Terminal<CrosstermBackend<Stdout>>> {
    out.execute(EnterAlternateScreen)?;
    out.execute(EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout()))?)
}

/// Undoes every step of `setup_terminal` plus raw mode. Safe to call when
/// setup only got partway.
fn restore_terminal<W: Write>(out: &mut W) -> Result<()> {
    out.execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    out.execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Forwards terminal events to the loop until the loop stops listening.
fn spawn_input_reader(tx: UnboundedSender<Message>) {
    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(Message::Input(ev)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    error!(error = %e, "failed to poll terminal events");
                    break;
                }
            }
        }
    });
}

async fn run_loop<S: JobSource>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: &mut Controller<S>,
    rx: &mut UnboundedReceiver<Message>,
) -> Result<()> {
    let mut view = ListView::default();

    loop {
        terminal.draw(|frame| draw(frame, controller.store(), &mut view))?;

        let Some(message) = rx.recv().await else { break };
        let len = controller.store().active_list().items().len();
        let mut scrolled = false;

        match message {
            Message::PageLoaded { page, result } => controller.page_loaded(page, result),

            Message::Input(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Down | KeyCode::Char('j') => {
                        view.next(len);
                        scrolled = true;
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        view.prev(len);
                        scrolled = true;
                    }
                    KeyCode::Char('J') | KeyCode::PageDown => {
                        view.scroll_down(view.viewport_height.max(1), len);
                        scrolled = true;
                    }
                    KeyCode::Char('K') | KeyCode::PageUp => {
                        view.scroll_up(view.viewport_height.max(1));
                        scrolled = true;
                    }
                    KeyCode::Char('b') | KeyCode::Enter => {
                        let job = controller.store().active_list().items().get(view.selected).cloned();
                        if let Some(job) = job {
                            controller.toggle_bookmark(job);
                        }
                    }
                    KeyCode::Tab | KeyCode::Char('t') => {
                        controller.toggle_tab();
                        view = ListView {
                            viewport_height: view.viewport_height,
                            ..ListView::default()
                        };
                    }
                    _ => {}
                }
            }

            Message::Input(Event::Mouse(mouse)) => match mouse.kind {
                MouseEventKind::ScrollDown => {
                    view.scroll_down(WHEEL_STEP, len);
                    scrolled = true;
                }
                MouseEventKind::ScrollUp => {
                    view.scroll_up(WHEEL_STEP);
                    scrolled = true;
                }
                _ => {}
            },

            Message::Input(_) => {}
        }

        let len = controller.store().active_list().items().len();
        view.clamp(len);
        if scrolled {
            controller.on_scroll(view.metrics(len));
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, store: &Store, view: &mut ListView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Header: tab title and fetch status
    let header = Line::from(vec![
        Span::styled(
            format!(" {} ", store.tab().title()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text(store), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    // List area
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(chunks[1]);
    view.viewport_height = inner.height;

    let body = match store.active_list() {
        ActiveList::NoBookmarks => Paragraph::new(EMPTY_BOOKMARKS_MESSAGE),
        ActiveList::Items([]) => Paragraph::new(empty_jobs_text(store.status())),
        ActiveList::Items(items) => {
            let lines = build_cards(items, store, view.selected, inner.width);
            Paragraph::new(Text::from(lines)).scroll((view.scroll_top, 0))
        }
    };
    frame.render_widget(body.block(block), chunks[1]);

    // Footer: tab buttons and help
    frame.render_widget(Paragraph::new(tab_buttons(store.tab())), chunks[2]);
    let help = Paragraph::new(
        " j/k:select  J/K/wheel:scroll  b:bookmark  tab:switch  q:quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn status_text(store: &Store) -> String {
    match store.status() {
        FetchStatus::NotStarted => String::new(),
        FetchStatus::Loading => format!("loading page {}...", store.in_flight().unwrap_or(store.next_page())),
        FetchStatus::Success => format!(
            "{} jobs, {} bookmarked",
            store.jobs().len(),
            store.bookmarks().len()
        ),
        FetchStatus::Failure => format!("failed to load page {}, scroll to retry", store.next_page()),
    }
}

fn empty_jobs_text(status: FetchStatus) -> &'static str {
    match status {
        FetchStatus::NotStarted | FetchStatus::Loading => "Loading jobs...",
        FetchStatus::Failure => "Failed to load jobs",
        FetchStatus::Success => "No jobs found.",
    }
}

fn tab_buttons(active: Tab) -> Line<'static> {
    let button = |tab: Tab| {
        let style = if tab == active {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Span::styled(format!(" {} ", tab.title()), style)
    };
    Line::from(vec![Span::raw(" "), button(Tab::Jobs), Span::raw("  "), button(Tab::Bookmarks)])
}

fn build_cards<'a>(items: &'a [JobPosting], store: &Store, selected: usize, width: u16) -> Vec<Line<'a>> {
    let mut lines = Vec::with_capacity(items.len() * CARD_HEIGHT as usize);
    for (i, job) in items.iter().enumerate() {
        lines.extend(build_card(job, store.is_bookmarked(job), i == selected, width));
    }
    lines
}

/// Exactly `CARD_HEIGHT` lines for one posting.
fn build_card(job: &JobPosting, bookmarked: bool, selected: bool, width: u16) -> Vec<Line<'_>> {
    let gutter = if selected { "> " } else { "  " };
    let dim = Style::default().fg(Color::DarkGray);

    let company = job.company_name.as_deref().unwrap_or("");
    let id = job.id.as_ref().map(|id| format!("  #{}", id)).unwrap_or_default();
    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if selected {
        title_style = title_style.bg(Color::DarkGray);
    }

    let description = first_wrapped_line(job.description.as_deref().unwrap_or(""), width.saturating_sub(4));

    let bookmark_style = if bookmarked {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::Yellow)
    };

    vec![
        Line::from(vec![
            Span::raw(gutter),
            Span::styled(company, title_style),
            Span::styled(id, dim),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(job.job_role.as_deref().unwrap_or(""), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(format!("  {}", description)),
        Line::from(vec![
            Span::styled("  Location ", dim),
            Span::raw(job.location.as_deref().unwrap_or("")),
            Span::styled("   Salary ", dim),
            Span::raw(job.salary_range()),
        ]),
        Line::from(vec![
            Span::styled("  Openings ", dim),
            Span::raw(job.total_vacancy.map(|n| n.to_string()).unwrap_or_default()),
            Span::styled("   Application Ends ", dim),
            Span::raw(job.expires_display()),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("[{}]", bookmark_label(bookmarked)), bookmark_style),
        ]),
        Line::from(""),
    ]
}

fn first_wrapped_line(text: &str, width: u16) -> String {
    let width = (width as usize).max(8);
    let wrapped = textwrap::wrap(text, width);
    match wrapped.len() {
        0 => String::new(),
        1 => wrapped[0].to_string(),
        _ => format!("{}...", wrapped[0].trim_end()),
    }
}
