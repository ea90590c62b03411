use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect as CellRect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Paragraph, Tabs},
};
use scrollspy_core::{FrameReport, Page, PageSession, StaticPage};
use scrollspy_protocol::{Rect, Viewport};

use crate::demo::LABEL_ATTRIBUTE;

/// Page pixels covered by one terminal cell.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Navigation bar on top, status line at the bottom.
const CHROME_ROWS: u16 = 2;
const LINE_STEP_PX: f64 = CELL_HEIGHT_PX * 2.0;
const WHEEL_STEP_PX: f64 = CELL_HEIGHT_PX * 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Quit,
    ScrollBy(f64),
    ScrollTo(f64),
    /// Jump to the n-th navigation link, zero-based.
    Jump(usize),
}

fn key_action(code: KeyCode, page_height: f64) -> Option<Action> {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::ScrollBy(-LINE_STEP_PX),
        KeyCode::Down | KeyCode::Char('j') => Action::ScrollBy(LINE_STEP_PX),
        KeyCode::PageUp => Action::ScrollBy(-page_height),
        KeyCode::PageDown | KeyCode::Char(' ') => Action::ScrollBy(page_height),
        KeyCode::Home | KeyCode::Char('g') => Action::ScrollTo(0.0),
        KeyCode::End | KeyCode::Char('G') => Action::ScrollTo(f64::INFINITY),
        KeyCode::Char(c @ '1'..='9') => Action::Jump(c.to_digit(10)? as usize - 1),
        _ => return None,
    };
    Some(action)
}

/// Map a client rectangle to the cells it covers inside `area`, clipped.
fn to_cells(client: &Rect, area: CellRect) -> Option<CellRect> {
    let left = (client.x / CELL_WIDTH_PX).floor().max(0.0);
    let top = (client.y / CELL_HEIGHT_PX).floor().max(0.0);
    let right = (client.right() / CELL_WIDTH_PX)
        .ceil()
        .min(f64::from(area.width));
    let bottom = (client.bottom() / CELL_HEIGHT_PX)
        .ceil()
        .min(f64::from(area.height));
    if right <= left || bottom <= top {
        return None;
    }
    Some(CellRect::new(
        area.x + left as u16,
        area.y + top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

/// Viewport matching the content area of a terminal of the given size.
fn viewport_for(current: Viewport, columns: u16, rows: u16) -> Viewport {
    Viewport {
        width: f64::from(columns) * CELL_WIDTH_PX,
        height: f64::from(rows.saturating_sub(CHROME_ROWS)) * CELL_HEIGHT_PX,
        ..current
    }
}

pub fn run(mut session: PageSession<StaticPage>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut session);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    let page = session.unmount();
    tracing::info!(scroll_y = page.viewport().scroll_y, "session closed");
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    session: &mut PageSession<StaticPage>,
) -> Result<()> {
    let mut last = session.refresh();
    let mut revealed_total = last.revealed.len();

    loop {
        let size = terminal.size()?;
        let current = session.page().viewport();
        let wanted = viewport_for(current, size.width, size.height);
        if wanted != current {
            tracing::debug!(width = wanted.width, height = wanted.height, "resized");
            last = session.set_viewport(wanted);
            revealed_total += last.revealed.len();
        }

        terminal.draw(|frame| draw(frame, session, &last))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let page_height = session.page().viewport().height;
        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key_action(key.code, page_height),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => Some(Action::ScrollBy(WHEEL_STEP_PX)),
                MouseEventKind::ScrollUp => Some(Action::ScrollBy(-WHEEL_STEP_PX)),
                _ => None,
            },
            _ => None,
        };

        let report = match action {
            None => continue,
            Some(Action::Quit) => break,
            Some(Action::ScrollBy(dy)) => Some(session.scroll_by(dy)),
            Some(Action::ScrollTo(y)) => Some(session.scroll_to(y)),
            Some(Action::Jump(n)) => {
                let target = session.nav_links().into_iter().nth(n).map(|link| link.id);
                target.and_then(|id| session.navigate(&id))
            }
        };
        if let Some(report) = report {
            revealed_total += report.revealed.len();
            if report.active_changed {
                tracing::debug!(active = ?report.active, revealed = revealed_total, "frame");
            }
            last = report;
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, session: &PageSession<StaticPage>, last: &FrameReport) {
    let area = frame.area();
    let nav_area = CellRect::new(area.x, area.y, area.width, area.height.min(1));
    let content = CellRect::new(
        area.x,
        area.y + 1,
        area.width,
        area.height.saturating_sub(CHROME_ROWS),
    );
    let status_area = CellRect::new(
        area.x,
        area.bottom().saturating_sub(1),
        area.width,
        area.height.min(1),
    );

    // Navigation bar
    let links = session.nav_links();
    let titles: Vec<String> = links
        .iter()
        .enumerate()
        .map(|(i, link)| format!("{} {}", i + 1, link.label))
        .collect();
    let mut tabs = Tabs::new(titles)
        .style(Style::default().fg(Color::Gray).bg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .divider("│");
    if let Some(i) = links.iter().position(|link| link.active) {
        tabs = tabs.select(i);
    }
    frame.render_widget(tabs, nav_area);

    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Black)),
        content,
    );
    draw_page(frame.buffer_mut(), content, session);

    let reveal = session.reveal();
    let status = format!(
        " active: {} │ revealed {}/{} (+{}) │ ↑↓/jk scroll  PgUp/PgDn page  1-9 jump  q quit ",
        last.active.as_deref().unwrap_or("-"),
        reveal.len() - reveal.pending(),
        reveal.len(),
        last.revealed.len(),
    );
    frame.render_widget(
        Paragraph::new(Line::from(status))
            .style(Style::default().fg(Color::White).bg(Color::DarkGray)),
        status_area,
    );
}

fn draw_page(buf: &mut Buffer, content: CellRect, session: &PageSession<StaticPage>) {
    let page = session.page();
    let viewport = page.viewport();
    let active = session.active();

    for element in page.elements() {
        let client = viewport.to_client(&element.rect);
        let Some(cells) = to_cells(&client, content) else {
            continue;
        };
        let label = page
            .attribute(&element.id, LABEL_ATTRIBUTE)
            .unwrap_or(element.id.as_str());

        if session.tracker().sections().contains(&element.id) {
            // Only the top edge of a section is drawn, as a rule.
            if client.y < 0.0 {
                continue;
            }
            let style = if active == Some(&element.id) {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let rule: String = format!("── {label} ")
                .chars()
                .chain(std::iter::repeat('─'))
                .take(usize::from(cells.width))
                .collect();
            buf.set_string(cells.x, cells.y, rule, style);
            continue;
        }

        let reveal = session.reveal();
        let style = if reveal.is_revealed(&element.id) {
            Style::default().fg(Color::White).bg(Color::Rgb(40, 70, 110))
        } else if reveal.contains(&element.id) {
            Style::default().fg(Color::DarkGray).bg(Color::Rgb(25, 25, 25))
        } else {
            Style::default().fg(Color::Gray)
        };
        paint(buf, cells, label, style);
    }

    // Mark the rows the section band covers.
    if let Some(engine) = session.tracker().engine() {
        let band = engine.policy().root_margin.apply(&viewport.root_bounds());
        if let Some(rows) = to_cells(&band, content) {
            for y in rows.top()..rows.bottom() {
                buf[(content.x, y)].set_char('▶').set_fg(Color::Yellow);
            }
        }
    }
}

fn paint(buf: &mut Buffer, cells: CellRect, label: &str, style: Style) {
    for y in cells.top()..cells.bottom() {
        for x in cells.left()..cells.right() {
            buf[(x, y)].set_char(' ').set_style(style);
        }
    }
    let caption: String = format!(" {label}")
        .chars()
        .take(usize::from(cells.width))
        .collect();
    buf.set_string(cells.x, cells.y, caption, style);
}
