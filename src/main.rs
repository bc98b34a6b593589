use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use airwatch::app::write_export;
use airwatch::config::{Mode, Overrides, Settings};
use airwatch::{events, poll_all, ui, App, MonitorController, CITY_REGISTRY};

#[derive(Parser, Debug)]
#[command(name = "airwatch")]
#[command(about = "Terminal dashboard for air quality across Italian cities")]
struct Args {
    /// Data source: simulated readings or the IQAir API
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Path to a TOML config file (default: ./airwatch.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll interval (e.g., "90s", "5m")
    #[arg(short, long)]
    interval: Option<String>,

    /// IQAir API key
    #[arg(long)]
    api_key: Option<String>,

    /// API base URL, e.g. a proxy that holds the key server-side
    #[arg(long)]
    base_url: Option<String>,

    /// Poll once, write the results to this JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Open the dashboard without starting periodic monitoring
    #[arg(long)]
    no_autostart: bool,

    /// Log file used while the dashboard owns the terminal
    #[arg(long, default_value = "airwatch.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?.with_overrides(Overrides {
        mode: args.mode,
        api_key: args.api_key,
        base_url: args.base_url,
        interval: args.interval,
        no_autostart: args.no_autostart,
    });

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        init_logging(None)?;
        return export_to_file(&settings, &export_path);
    }

    init_logging(Some(&args.log_file))?;
    run_dashboard(settings)
}

/// Install the tracing subscriber. Logs go to stderr, or to `log_file` while
/// the dashboard owns the terminal.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("airwatch=info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .init();
        }
        None => {
            registry.with(tracing_subscriber::fmt::layer().with_writer(io::stderr)).init();
        }
    }
    Ok(())
}

/// Build the runtime and controller, then hand the terminal to the dashboard.
fn run_dashboard(settings: Settings) -> Result<()> {
    let interval = settings.poll_interval()?;
    let source = settings.build_source()?;

    tracing::info!(
        "airwatch v{} starting: {} ({})",
        env!("CARGO_PKG_VERSION"),
        source.kind().label(),
        source.description()
    );
    if settings.api_key_missing() {
        tracing::warn!(
            "no IQAir API key configured; get one at https://www.iqair.com/air-pollution-data-api"
        );
    }

    // The TUI runs on this thread while polls run on the runtime's workers
    let rt = tokio::runtime::Runtime::new()?;
    let guard = rt.enter();

    let monitor = MonitorController::new(source, CITY_REGISTRY, interval);
    let mut app = App::new(monitor, ui::Theme::auto_detect());
    app.api_key_missing = settings.api_key_missing();

    if settings.autostart {
        app.start_monitoring();
    } else {
        app.refresh();
    }

    let result = run_tui(&mut app);

    // Cancels the timer; in-flight polls are dropped with the runtime
    drop(app);
    drop(guard);
    rt.shutdown_timeout(Duration::from_millis(500));

    result
}

/// Run the TUI with the given app
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        // Pick up any completed polls
        app.reload_data();

        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5,
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(8),    // Stats + cities
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::summary::render(frame, app, chunks[1]);
            ui::common::render_status_bar(frame, app, chunks[2]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Poll every city once and write the results to a JSON file
fn export_to_file(settings: &Settings, export_path: &Path) -> Result<()> {
    let source = settings.build_source()?;
    if settings.api_key_missing() {
        tracing::warn!("no IQAir API key configured; requests will likely fail");
    }

    let rt = tokio::runtime::Runtime::new()?;
    let batch = rt.block_on(poll_all(source.as_ref(), CITY_REGISTRY));

    write_export(&batch, export_path)?;

    println!(
        "Exported {}/{} cities to: {}",
        batch.succeeded(),
        batch.reports.len(),
        export_path.display()
    );
    Ok(())
}
