use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Detail overlay: allow scrolling between cities while it is open
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        // Monitoring control
        KeyCode::Char('s') => app.start_monitoring(),
        KeyCode::Char('x') => app.stop_monitoring(),
        KeyCode::Char('r') => app.refresh(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = app.export_path.clone();
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => app.go_back(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CITY_REGISTRY;
    use crate::monitor::MonitorController;
    use crate::source::SimulatedSource;
    use crate::ui::Theme;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn app() -> App {
        let source = Arc::new(
            SimulatedSource::builder()
                .seed(4)
                .no_delay()
                .failure_rate(0.0)
                .build(),
        );
        let monitor = MonitorController::new(source, CITY_REGISTRY, Duration::from_secs(60));
        App::new(monitor, Theme::dark())
    }

    fn press(app: &mut App, c: char) {
        handle_key_event(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stop_keys() {
        let mut app = app();
        press(&mut app, 's');
        assert!(app.monitor().is_running());
        press(&mut app, 's');
        assert_eq!(app.get_status_message(), Some("Monitoring is already running"));
        press(&mut app, 'x');
        assert!(!app.monitor().is_running());
        // Stopping again is silent
        press(&mut app, 'x');
        assert_eq!(app.get_status_message(), Some("Monitoring stopped"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_key_delivers_batch() {
        let mut app = app();
        press(&mut app, 'r');
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(app.reload_data());
        assert!(!app.monitor().is_running());
    }

    #[tokio::test]
    async fn test_help_swallows_next_key() {
        let mut app = app();
        press(&mut app, '?');
        assert!(app.show_help);
        press(&mut app, 'q');
        assert!(!app.show_help);
        assert!(app.running);
        press(&mut app, 'q');
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_export_key_reports_failure_without_data() {
        let mut app = app();
        let dir = tempfile::tempdir().unwrap();
        app.export_path = dir.path().join("export.json");
        press(&mut app, 'e');
        assert_eq!(app.get_status_message(), Some("Export failed: No data to export"));
    }
}
