//! Dashboard view rendering.
//!
//! A statistics panel over the successful readings, followed by one row per
//! city: worst air first, failed fetches last.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{pollutant_name, CityReport, Reading, SourceKind};

/// Height of the statistics panel, borders included.
pub const STATS_HEIGHT: u16 = 4;

/// Tables narrower than this leave the band description to the detail overlay.
pub const DESCRIPTION_MIN_WIDTH: u16 = 160;

/// Optional columns of the city table.
#[derive(Debug, Clone, Copy)]
struct Columns {
    description: bool,
    weather: bool,
}

/// Render the dashboard: stats on top, city table below.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks =
        Layout::vertical([Constraint::Length(STATS_HEIGHT), Constraint::Min(4)]).split(area);

    render_stats(frame, app, chunks[0]);
    render_cities(frame, app, chunks[1]);
}

/// Render the aggregate statistics, or a placeholder when nothing succeeded.
pub fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Statistics ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let lines = match (&app.batch, &app.summary) {
        (None, _) => vec![Line::from(Span::styled(
            " Waiting for the first poll...",
            Style::default().add_modifier(Modifier::DIM),
        ))],
        (Some(_), None) => {
            let mut lines = vec![Line::from(Span::styled(
                " ⚠ No data available.",
                app.theme.error_style().add_modifier(Modifier::BOLD),
            ))];
            if app.api_key_missing {
                lines.push(Line::from(Span::styled(
                    " Set your IQAir API key \
                     (AIRWATCH_API_KEY, IQAIR_API_KEY or api_key in airwatch.toml)",
                    Style::default().fg(ratatui::style::Color::Yellow),
                )));
            }
            lines
        }
        (Some(_), Some(summary)) => {
            let avg_style = app.theme.category_style(crate::data::classify(summary.average));
            let min_style = app.theme.category_style(crate::data::classify(summary.min));
            let max_style = app.theme.category_style(crate::data::classify(summary.max));
            vec![Line::from(vec![
                Span::raw(" Average AQI "),
                Span::styled(
                    summary.average.to_string(),
                    avg_style.add_modifier(Modifier::BOLD),
                ),
                Span::raw("  │  Best "),
                Span::styled(summary.min.to_string(), min_style),
                Span::raw(format!(" ({})", summary.best_city)),
                Span::raw("  │  Worst "),
                Span::styled(summary.max.to_string(), max_style),
                Span::raw(format!(" ({})", summary.worst_city)),
                Span::raw("  │  Cities "),
                Span::styled(
                    format!("{}/{}", summary.succeeded, summary.total),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])]
        }
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render one row per city in display order.
pub fn render_cities(frame: &mut Frame, app: &App, area: Rect) {
    let reports = app.sorted_reports();
    let columns = Columns {
        description: area.width >= DESCRIPTION_MIN_WIDTH,
        weather: app.source_kind() == SourceKind::IqAir,
    };

    let mut header_cells = vec!["", "City", "AQI", "Category"];
    let mut widths = vec![
        Constraint::Length(2), // Symbol
        Constraint::Fill(2),   // City
        Constraint::Length(5), // AQI
        Constraint::Fill(4),   // Category / error
    ];
    if columns.description {
        header_cells.push("Description");
        widths.push(Constraint::Fill(7));
    }
    header_cells.extend(["Main", "PM2.5", "PM10", "O₃", "NO₂", "CO"]);
    widths.extend([Constraint::Length(6); 6]);
    if columns.weather {
        header_cells.push("Weather");
        widths.push(Constraint::Length(18));
    }
    header_cells.push("Updated");
    widths.push(Constraint::Length(9));

    let header = Row::new(header_cells.into_iter().map(Cell::from).collect::<Vec<_>>())
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = reports.iter().map(|r| city_row(app, r, columns)).collect();

    let selected = app.selected_index.min(reports.len().saturating_sub(1));
    let position_info = if !reports.is_empty() {
        format!(" [{}/{}]", selected + 1, reports.len())
    } else {
        String::new()
    };
    let title = format!(" Cities ({}){} ", app.source_kind().label(), position_info);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !reports.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn city_row<'a>(app: &App, report: &'a CityReport, columns: Columns) -> Row<'a> {
    match &report.outcome {
        Ok(reading) => reading_row(app, reading, columns),
        Err(e) => {
            let mut cells = vec![
                Cell::from("✖").style(app.theme.error_style()),
                Cell::from(report.city.display_name),
                Cell::from("-"),
                Cell::from(e.to_string()).style(app.theme.error_style()),
            ];
            let blanks = 6 + usize::from(columns.description) + usize::from(columns.weather);
            cells.extend((0..blanks).map(|_| Cell::from("")));
            cells.push(Cell::from(clock_time(report.fetched_at)));
            Row::new(cells)
        }
    }
}

fn reading_row<'a>(app: &App, reading: &'a Reading, columns: Columns) -> Row<'a> {
    let style = app.theme.category_style(reading.category);
    let p = &reading.pollutants;

    let mut cells = vec![
        Cell::from(reading.category.symbol).style(style),
        Cell::from(reading.city.as_str()),
        Cell::from(reading.aqi.to_string()).style(style.add_modifier(Modifier::BOLD)),
        Cell::from(reading.category.label).style(style),
    ];
    if columns.description {
        cells.push(Cell::from(reading.category.description));
    }
    cells.extend([
        Cell::from(
            reading
                .main_pollutant
                .as_deref()
                .map(pollutant_name)
                .unwrap_or("-")
                .to_string(),
        ),
        Cell::from(format_value(p.pm25)),
        Cell::from(format_value(p.pm10)),
        Cell::from(format_value(p.o3)),
        Cell::from(format_value(p.no2)),
        Cell::from(format_value(p.co)),
    ]);
    if columns.weather {
        let weather = reading
            .weather
            .map(|w| {
                format!(
                    "{:.0}°C {:.0}% {:.1}m/s",
                    w.temperature_c, w.humidity_pct, w.wind_speed_ms
                )
            })
            .unwrap_or_else(|| "-".to_string());
        cells.push(Cell::from(weather));
    }
    cells.push(Cell::from(clock_time(reading.timestamp)));
    Row::new(cells)
}

fn clock_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Format a concentration, dropping the fraction for whole numbers.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}
