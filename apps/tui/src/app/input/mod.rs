pub mod screens;

use crate::app::state::App;
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};

pub fn handle_input(app: &mut App, key: KeyCode) {
    screens::dispatch_input(app, key);
}

/// Left click picks a map location while assigning; the wheel zooms.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let area = app.map_area;
    let over_map = mouse.column >= area.x
        && mouse.row >= area.y
        && mouse.column < area.x + area.width
        && mouse.row < area.y + area.height;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if over_map {
                app.focus = crate::app::state::Focus::Map;
            }
            app.click_cell(mouse.column, mouse.row);
        }
        MouseEventKind::ScrollUp if over_map => app.viewport.zoom_in(),
        MouseEventKind::ScrollDown if over_map => app.viewport.zoom_out(),
        _ => {}
    }
}
