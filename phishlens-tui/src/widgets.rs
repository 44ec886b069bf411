use crate::app::App;
use phishlens_client::Classifier;
use phishlens_core::modal::ModalKind;
use phishlens_core::model::{NoticeLevel, TriggerKind};
use phishlens_core::session::Trigger;
use phishlens_core::visual::{self, Hsl};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::time::Instant;

const PROMPT: &str = "url> ";

fn rgb(hsl: Hsl) -> Color {
    let (r, g, b) = hsl.to_rgb();
    Color::Rgb(r, g, b)
}

pub fn draw<C>(f: &mut Frame, app: &App<C>, now: Instant)
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Input
            Constraint::Length(1), // Controls
            Constraint::Min(8),    // Result
            Constraint::Length(1), // Hints
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " PhishLens ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" URL phishing-risk analysis"),
    ]));
    f.render_widget(title, chunks[0]);

    render_input(f, app, chunks[1]);
    render_controls(f, app, chunks[2]);
    render_result(f, app, chunks[3], now);
    render_hints(f, chunks[4]);

    for kind in [ModalKind::Share, ModalKind::Info, ModalKind::Confirm] {
        if app.session.modals.is_open(kind) {
            render_modal(f, app, kind);
        }
    }
    if let Some(notice) = app.session.notice() {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        render_dialog(f, " Notice ", &notice.text, "[Enter] Dismiss", color);
    }
}

fn render_input<C>(f: &mut Frame, app: &App<C>, area: Rect)
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Enter URL ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);

    let input = Paragraph::new(format!("{}{}", PROMPT, app.session.input))
        .style(Style::default().fg(Color::Yellow))
        .block(block);
    f.render_widget(input, area);

    if app.session.modals.topmost().is_none() && app.session.notice().is_none() {
        f.set_cursor_position((
            inner.x + PROMPT.len() as u16 + app.cursor_position as u16,
            inner.y,
        ));
    }
}

fn button(trigger: &Trigger, key: &str) -> Vec<Span<'static>> {
    let style = if trigger.is_enabled() {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Gray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).bg(Color::Black)
    };
    vec![
        Span::styled(format!(" {} ", key), Style::default().fg(Color::Cyan)),
        Span::styled(format!(" {} ", trigger.label()), style),
        Span::raw("  "),
    ]
}

fn render_controls<C>(f: &mut Frame, app: &App<C>, area: Rect)
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    let session = &app.session;
    let mut spans = Vec::new();

    if session.is_visible(TriggerKind::Analyze) {
        spans.extend(button(session.trigger(TriggerKind::Analyze), "Enter"));
    }
    if session.is_visible(TriggerKind::Reanalyze) {
        spans.extend(button(session.trigger(TriggerKind::Reanalyze), "Enter/^R"));
    }
    if session.is_visible(TriggerKind::Clear) {
        spans.extend(button(session.trigger(TriggerKind::Clear), "^L"));
    }
    if session.is_result_visible() {
        spans.extend(vec![
            Span::styled(" ^S ", Style::default().fg(Color::Cyan)),
            Span::styled(
                " Share ",
                Style::default().fg(Color::Black).bg(Color::Gray),
            ),
            Span::raw("  "),
        ]);
    }
    spans.extend(button(session.trigger(TriggerKind::Retrain), "^T"));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Risk meter: a hue gradient from green (0%) to red (100%) with the
/// animated marker above it.
fn meter_lines(width: usize, position: f64, label: &str) -> Vec<Line<'static>> {
    if width < 2 {
        return Vec::new();
    }

    let column = ((position / 100.0) * (width - 1) as f64).round() as usize;
    let column = column.min(width - 1);

    let mut marker = " ".repeat(column);
    marker.push('▼');

    let track: Vec<Span> = (0..width)
        .map(|i| {
            let hue = visual::hue(i as f64 / (width - 1) as f64);
            let color = rgb(Hsl {
                hue,
                saturation: 80.0,
                lightness: 45.0,
            });
            Span::styled("█", Style::default().fg(color))
        })
        .collect();

    let label_start = column.saturating_sub(label.len() / 2).min(width.saturating_sub(label.len()));
    let caption = format!("{}{}", " ".repeat(label_start), label);

    vec![
        Line::from(marker),
        Line::from(track),
        Line::from(caption),
    ]
}

fn render_result<C>(f: &mut Frame, app: &App<C>, area: Rect, now: Instant)
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    let session = &app.session;
    let (Some(view), Some(result)) = (session.risk_view(), session.result()) else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Result ")
            .border_style(Style::default().fg(Color::DarkGray));
        let hint = if session.is_loading() {
            "Analyzing..."
        } else {
            "No analysis yet. Type a URL and press Enter."
        };
        let empty = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(empty, area);
        return;
    };
    if !session.is_result_visible() {
        return;
    }

    let background = rgb(view.background);
    let foreground = rgb(view.foreground);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", view.status_label),
            Style::default().fg(foreground).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(foreground))
        .style(Style::default().bg(background).fg(foreground));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("URL: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(session.current_url().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Confidence: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(view.confidence_text.clone()),
        ]),
        Line::from(""),
    ];
    lines.extend(meter_lines(
        inner.width.saturating_sub(2) as usize,
        session.marker_position(now),
        &view.marker_label,
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Reasons:",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for reason in &result.explanation {
        lines.push(Line::from(format!("- {}", reason)));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.result_scroll, 0));
    f.render_widget(
        body,
        Rect {
            x: inner.x + 1,
            width: inner.width.saturating_sub(2),
            ..inner
        },
    );
}

fn render_hints(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled(" Enter ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Analyze  "),
        Span::styled(" ^L ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Clear  "),
        Span::styled(" ^S ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Share  "),
        Span::styled(" ^T ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Retrain  "),
        Span::styled(" PgUp/PgDn ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Scroll  "),
        Span::styled(" ESC ", Style::default().fg(Color::Black).bg(Color::Gray)),
        Span::raw(" Quit"),
    ]);
    let paragraph = Paragraph::new(hints).style(Style::default().bg(Color::Black).fg(Color::Gray));
    f.render_widget(paragraph, area);
}

const DIALOG_WIDTH: u16 = 60;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Rows `text` takes when word-wrapped to `width` columns.
fn wrapped_line_count(text: &str, width: usize) -> usize {
    let width = width.max(1);
    text.split('\n')
        .map(|paragraph| {
            let mut lines = 1;
            let mut used = 0;
            for word in paragraph.split_whitespace() {
                let len = Span::raw(word).width().max(1);
                let needed = if used == 0 { len } else { used + 1 + len };
                if needed <= width {
                    used = needed;
                    continue;
                }
                if used > 0 {
                    lines += 1;
                }
                lines += (len - 1) / width;
                used = (len - 1) % width + 1;
            }
            lines
        })
        .sum()
}

/// Screen area of a dialog showing `message`, tall enough for the
/// wrapped message plus the action row.
pub fn dialog_area(area: Rect, message: &str) -> Rect {
    let width = DIALOG_WIDTH.min(area.width);
    let inner = width.saturating_sub(2) as usize;
    // borders + message + blank + actions
    let height = 2 + wrapped_line_count(message, inner) + 2;
    centered(area, width, u16::try_from(height).unwrap_or(u16::MAX))
}

fn modal_text<C>(app: &App<C>, kind: ModalKind) -> (&'static str, String, &'static str, Color)
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    let modals = &app.session.modals;
    match kind {
        ModalKind::Share => (
            " Share ",
            format!(
                "Share this analysis.\n[c] Copy report to clipboard\n[p] Save PDF to {}",
                app.report_path().display()
            ),
            "[Esc] Close",
            Color::Cyan,
        ),
        ModalKind::Info => (
            " Info ",
            modals.message(ModalKind::Info).to_string(),
            "[Enter] OK",
            Color::Cyan,
        ),
        ModalKind::Confirm => (
            " Confirm ",
            modals.message(ModalKind::Confirm).to_string(),
            "[y] Confirm   [n] Cancel",
            Color::Yellow,
        ),
    }
}

/// Where the dialog for `kind` is drawn on a screen of `area`.
pub fn modal_area<C>(app: &App<C>, kind: ModalKind, area: Rect) -> Rect
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    let (_, message, _, _) = modal_text(app, kind);
    dialog_area(area, &message)
}

fn render_dialog(f: &mut Frame, title: &str, message: &str, actions: &str, color: Color) {
    let area = dialog_area(f.area(), message);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(color));

    let mut text: Vec<Line> = message.split('\n').map(|l| Line::from(l.to_string())).collect();
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        actions.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn render_modal<C>(f: &mut Frame, app: &App<C>, kind: ModalKind)
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    let (title, message, actions, color) = modal_text(app, kind);
    render_dialog(f, title, &message, actions, color);
}
