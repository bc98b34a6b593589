//! Detail overlay rendering.
//!
//! Displays a modal overlay with the full reading for the selected city,
//! including what its AQI band means and what to do about it.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::{pollutant_name, CityReport, Reading};
use crate::error::FetchError;
use crate::ui::summary::format_value;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the selected city's detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(report) = app.selected_report() else {
        return;
    };

    // Width: 80% of screen, clamped to [MIN_OVERLAY_WIDTH, 90]
    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    // Height: 80% of screen, clamped to [MIN_OVERLAY_HEIGHT, 30]
    let overlay_height = (area.height * 80 / 100).clamp(MIN_OVERLAY_HEIGHT, 30);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(7), // Header with index and advice
        Constraint::Min(7),    // Pollutants / weather
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    match &report.outcome {
        Ok(reading) => {
            render_reading_header(frame, app, report, reading, chunks[0]);
            render_measurements(frame, app, reading, chunks[1]);
        }
        Err(e) => render_error(frame, app, report, e, chunks[0].union(chunks[1])),
    }

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ↑/↓ next city  Esc close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

fn render_reading_header(
    frame: &mut Frame,
    app: &App,
    report: &CityReport,
    reading: &Reading,
    area: Rect,
) {
    let style = app.theme.category_style(reading.category);

    let mut title_spans = vec![
        Span::styled(
            format!(" {} ", reading.city),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("({})", report.city.region),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ];
    if let Some(location) = &reading.location_name {
        title_spans.push(Span::styled(
            format!("  station: {}", location),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    let lines = vec![
        Line::from(title_spans),
        Line::from(vec![
            Span::raw(" AQI "),
            Span::styled(reading.aqi.to_string(), style.add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(format!("{} {}", reading.category.symbol, reading.category.label), style),
            Span::raw(format!(
                "  ({}-{})",
                reading.category.min, reading.category.max
            )),
        ]),
        Line::from(format!(" {}", reading.category.description)),
        Line::from(vec![
            Span::styled(" Advice: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(reading.category.advice),
        ]),
        Line::from(Span::styled(
            format!(
                " Measured {}  ·  {}",
                reading.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                reading.source.label()
            ),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" City Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_measurements(frame: &mut Frame, app: &App, reading: &Reading, area: Rect) {
    let columns = if reading.weather.is_some() {
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(area)
    } else {
        Layout::horizontal([Constraint::Percentage(100), Constraint::Length(0)]).split(area)
    };

    let units = reading.source.pollutant_units();
    let main = reading.main_pollutant.as_deref().map(pollutant_name);

    let header = Row::new(vec![Cell::from("Pollutant"), Cell::from("Value"), Cell::from("Unit")])
        .height(1)
        .style(app.theme.header);
    let rows: Vec<Row> = reading
        .pollutants
        .entries()
        .iter()
        .zip(units)
        .map(|((name, value), unit)| {
            let style = if main == Some(*name) {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let label = if main == Some(*name) {
                format!("{} *", name)
            } else {
                name.to_string()
            };
            Row::new(vec![
                Cell::from(label),
                Cell::from(format_value(*value)),
                Cell::from(unit),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Fill(2), Constraint::Length(8), Constraint::Length(8)],
    )
    .header(header)
    .block(
        Block::default()
            .title(" Pollutants ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(table, columns[0]);

    if let Some(w) = reading.weather {
        let lines = vec![
            Line::from(format!(" Temperature  {:.0} °C", w.temperature_c)),
            Line::from(format!(" Humidity     {:.0} %", w.humidity_pct)),
            Line::from(format!(" Pressure     {:.0} hPa", w.pressure_hpa)),
            Line::from(format!(" Wind         {:.1} m/s", w.wind_speed_ms)),
        ];
        let block = Block::default()
            .title(" Weather ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        frame.render_widget(Paragraph::new(lines).block(block), columns[1]);
    }
}

fn render_error(frame: &mut Frame, app: &App, report: &CityReport, error: &FetchError, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            format!(" {} ", report.city.display_name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" ✖ {}", error),
            app.theme.error_style().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Attempted {}", report.fetched_at.with_timezone(&Local).format("%H:%M:%S")),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" City Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.error));

    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
