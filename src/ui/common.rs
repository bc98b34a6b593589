//! Common UI components shared across views.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;
use crate::data::{worst_severity, CATEGORIES};

/// Render the header bar with mode, monitoring state and worst band.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let monitor = app.monitor();

    let (state_label, state_style) = if monitor.is_running() {
        (
            format!("Running (every {})", format_duration(monitor.interval())),
            Style::default().fg(app.theme.running),
        )
    } else {
        ("Idle".to_string(), Style::default().fg(app.theme.idle))
    };

    let mut spans = vec![
        Span::styled(" ● ", state_style),
        Span::styled("AIRWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            app.source_kind().label(),
            Style::default().fg(app.theme.highlight),
        ),
        Span::raw(" │ "),
        Span::styled(state_label, state_style),
    ];

    if monitor.in_flight() > 0 {
        spans.push(Span::styled(
            " (polling...)",
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    let worst = app
        .batch
        .as_ref()
        .and_then(|b| worst_severity(&b.reports))
        .and_then(|i| CATEGORIES.get(i));
    if let Some(category) = worst {
        spans.push(Span::raw(" │ worst: "));
        spans.push(Span::styled(
            format!("{} {}", category.symbol, category.label),
            app.theme.category_style(category),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the status bar at the bottom.
///
/// Shows: time since last update, time until the next poll, controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let updated = match app.last_update {
        Some(t) => format!("Updated {} ago", format_duration(t.elapsed())),
        None => "No data yet".to_string(),
    };
    let next = match app.monitor().time_until_next_poll() {
        Some(d) => format!("next poll in {}", format_duration(d)),
        None => "stopped".to_string(),
    };
    let controls = if app.monitor().is_running() {
        "x:stop r:refresh Enter:detail e:export ?:help q:quit"
    } else {
        "s:start r:refresh Enter:detail e:export ?:help q:quit"
    };

    let status = format!(" {} | {} | {}", updated, next, controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let mut help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Monitoring",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  s         Start monitoring"),
        Line::from("  x         Stop monitoring"),
        Line::from("  r         Refresh now"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Select city"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       City detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " AQI bands",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
    ];
    for category in CATEGORIES.iter() {
        help_text.push(Line::from(vec![
            Span::raw(format!("  {:>3}-{:<3}   ", category.min, category.max)),
            Span::styled(
                format!("{} {}", category.symbol, category.label),
                app.theme.category_style(category),
            ),
        ]));
    }
    help_text.push(Line::from(""));
    help_text.push(Line::from(vec![Span::styled(
        "Press any key to close",
        Style::default().add_modifier(Modifier::DIM),
    )]));

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_height_wanted = help_text.len() as u16 + 2;
    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 50u16.min(area.width.saturating_sub(4));
    let help_height = help_height_wanted.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
