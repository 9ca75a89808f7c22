use crate::app::panels::{FormField, RecordKind};
use crate::app::state::{App, Focus};
use crossterm::event::KeyCode;

pub fn handle_vehicles_input(app: &mut App, key: KeyCode) {
    let nav = &app.vehicle_panel.nav;
    if nav.filtering {
        handle_filter_input(app, key);
    } else if nav.form_active {
        handle_form_input(app, key);
    } else {
        handle_list_input(app, key);
    }
}

fn handle_filter_input(app: &mut App, key: KeyCode) {
    let nav = &mut app.vehicle_panel.nav;
    match key {
        KeyCode::Esc => {
            nav.filter.clear();
            nav.filtering = false;
        }
        KeyCode::Enter => nav.filtering = false,
        KeyCode::Backspace => {
            nav.filter.pop();
        }
        KeyCode::Char(ch) => nav.filter.push(ch),
        _ => {}
    }
    let rows = app.vehicle_rows().len();
    app.vehicle_panel.nav.clamp(rows);
}

fn handle_form_input(app: &mut App, key: KeyCode) {
    let field = app.vehicle_panel.field();
    let fields = app.vehicle_panel.fields().len();

    match (key, field) {
        (KeyCode::Esc, _) => {
            if app.vehicle_panel.editing.is_some() {
                app.vehicle_panel.cancel_edit();
            } else {
                app.vehicle_panel.nav.close_form();
            }
        }
        (KeyCode::Up, _) => app.vehicle_panel.nav.prev_field(fields),
        (KeyCode::Down | KeyCode::Enter, FormField::Name) | (KeyCode::Down, _) => {
            app.vehicle_panel.nav.next_field(fields);
        }
        (KeyCode::Char(ch), FormField::Name) => {
            app.vehicle_panel.draft_mut().name.push(ch);
            *app.vehicle_panel.error_mut() = None;
        }
        (KeyCode::Backspace, FormField::Name) => {
            app.vehicle_panel.draft_mut().name.pop();
            *app.vehicle_panel.error_mut() = None;
        }
        (KeyCode::Enter | KeyCode::Char('a'), FormField::Location) => {
            app.start_assign(RecordKind::Vehicle);
        }
        (KeyCode::Enter, FormField::Submit) => app.submit_vehicle_form(),
        _ => {}
    }
}

fn handle_list_input(app: &mut App, key: KeyCode) {
    let rows = app.vehicle_rows();
    let nav = &mut app.vehicle_panel.nav;

    match key {
        KeyCode::Esc => app.focus = Focus::Map,
        KeyCode::Up => nav.select_prev(),
        KeyCode::Down => nav.select_next(rows.len()),
        KeyCode::Home => nav.selected = 0,
        KeyCode::End => nav.selected = rows.len().saturating_sub(1),
        KeyCode::Char('/') => nav.filtering = true,
        KeyCode::Char('n') => {
            app.vehicle_panel.cancel_edit();
            app.vehicle_panel.nav.open_form();
        }
        KeyCode::Char('a') => {
            app.vehicle_panel.nav.open_form();
            app.start_assign(RecordKind::Vehicle);
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            if let Some(vehicle) = app.selected_vehicle().cloned() {
                app.vehicle_panel.start_edit(&vehicle);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_vehicle(),
        _ => {}
    }
}
