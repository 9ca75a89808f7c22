use crate::app::panels::RecordKind;
use crate::app::state::{App, Focus};
use crossterm::event::KeyCode;

mod help;
mod incidents;
mod map;
mod vehicles;

pub fn dispatch_input(app: &mut App, key: KeyCode) {
    if help::handle_help_toggle(app, key) {
        return;
    }

    if key == KeyCode::Tab {
        app.focus = app.focus.next();
        return;
    }

    if !app.is_typing() && handle_global_input(app, key) {
        return;
    }

    match app.focus {
        Focus::Map => map::handle_map_input(app, key),
        Focus::Incidents => incidents::handle_incidents_input(app, key),
        Focus::Vehicles => vehicles::handle_vehicles_input(app, key),
    }
}

/// Shortcuts that work from every area unless a text field is being typed in.
fn handle_global_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::F(5) => app.refresh(),
        KeyCode::Char('t') => app.test_backend(),
        KeyCode::Char('r') => app.toggle_routing(),
        KeyCode::Char('R') => app.reset_map(),
        KeyCode::Char('i') => open_create_form(app, RecordKind::Incident),
        KeyCode::Char('v') => open_create_form(app, RecordKind::Vehicle),
        _ => return false,
    }
    true
}

fn open_create_form(app: &mut App, kind: RecordKind) {
    match kind {
        RecordKind::Incident => {
            app.incident_panel.cancel_edit();
            app.incident_panel.nav.open_form();
            app.focus = Focus::Incidents;
        }
        RecordKind::Vehicle => {
            app.vehicle_panel.cancel_edit();
            app.vehicle_panel.nav.open_form();
            app.focus = Focus::Vehicles;
        }
    }
}
