use crate::app::state::App;
use crossterm::event::KeyCode;

const PAN_FRACTION: f64 = 0.1;

pub fn handle_map_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up => app.move_crosshair(0.0, -1.0),
        KeyCode::Down => app.move_crosshair(0.0, 1.0),
        KeyCode::Left => app.move_crosshair(-1.0, 0.0),
        KeyCode::Right => app.move_crosshair(1.0, 0.0),
        KeyCode::Char('k') => app.viewport.pan(0.0, -PAN_FRACTION),
        KeyCode::Char('j') => app.viewport.pan(0.0, PAN_FRACTION),
        KeyCode::Char('h') => app.viewport.pan(-PAN_FRACTION, 0.0),
        KeyCode::Char('l') => app.viewport.pan(PAN_FRACTION, 0.0),
        KeyCode::Char('+' | '=') => app.viewport.zoom_in(),
        KeyCode::Char('-') => app.viewport.zoom_out(),
        KeyCode::Enter => {
            if app.click_crosshair().is_none() {
                app.status_message =
                    "Not assigning: open a form and choose Location first".to_string();
            }
        }
        KeyCode::Esc => {
            if app.assign_mode.is_active() {
                app.cancel_assign();
            }
        }
        _ => {}
    }
}
