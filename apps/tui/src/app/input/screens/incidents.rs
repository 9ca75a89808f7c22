use crate::app::panels::{FormField, IncidentRow, RecordKind};
use crate::app::state::{App, Focus};
use crossterm::event::KeyCode;

const PAGE: usize = 5;

pub fn handle_incidents_input(app: &mut App, key: KeyCode) {
    if app.incident_panel.nav.filtering {
        handle_filter_input(app, key);
    } else if app.incident_panel.nav.form_active {
        handle_form_input(app, key);
    } else {
        handle_list_input(app, key);
    }
}

fn handle_filter_input(app: &mut App, key: KeyCode) {
    let nav = &mut app.incident_panel.nav;
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
    let rows = app.incident_rows().len();
    app.incident_panel.nav.clamp(rows);
}

fn handle_form_input(app: &mut App, key: KeyCode) {
    let field = app.incident_panel.field();
    let fields = app.incident_panel.fields().len();

    match (key, field) {
        (KeyCode::Esc, _) => {
            if app.incident_panel.editing.is_some() {
                app.incident_panel.cancel_edit();
            } else {
                app.incident_panel.nav.close_form();
            }
        }
        (KeyCode::Up, _) => app.incident_panel.nav.prev_field(fields),
        (KeyCode::Down | KeyCode::Enter, FormField::Name) | (KeyCode::Down, _) => {
            app.incident_panel.nav.next_field(fields);
        }
        (KeyCode::Char(ch), FormField::Name) => {
            app.incident_panel.draft_mut().name.push(ch);
            *app.incident_panel.error_mut() = None;
        }
        (KeyCode::Backspace, FormField::Name) => {
            app.incident_panel.draft_mut().name.pop();
            *app.incident_panel.error_mut() = None;
        }
        (KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter, FormField::Status) => {
            let draft = app.incident_panel.draft_mut();
            draft.status = draft.status.toggled();
        }
        (KeyCode::Enter | KeyCode::Char('a'), FormField::Location) => {
            app.start_assign(RecordKind::Incident);
        }
        (KeyCode::Enter, FormField::Submit) => app.submit_incident_form(),
        _ => {}
    }
}

fn handle_list_input(app: &mut App, key: KeyCode) {
    let rows = app.incident_rows();
    let nav = &mut app.incident_panel.nav;

    match key {
        KeyCode::Esc => app.focus = Focus::Map,
        KeyCode::Up => nav.select_prev(),
        KeyCode::Down => nav.select_next(rows.len()),
        KeyCode::PageUp => nav.selected = nav.selected.saturating_sub(PAGE),
        KeyCode::PageDown => {
            nav.selected = (nav.selected + PAGE).min(rows.len().saturating_sub(1));
        }
        KeyCode::Home => nav.selected = 0,
        KeyCode::End => nav.selected = rows.len().saturating_sub(1),
        KeyCode::Char('/') => nav.filtering = true,
        KeyCode::Char('n') => {
            app.incident_panel.cancel_edit();
            app.incident_panel.nav.open_form();
        }
        KeyCode::Char('a') => {
            app.incident_panel.nav.open_form();
            app.start_assign(RecordKind::Incident);
        }
        KeyCode::Enter | KeyCode::Char('e') => match rows.get(nav.selected) {
            Some(IncidentRow::Header { section, .. }) if key == KeyCode::Enter => {
                app.incident_panel.toggle_section(*section);
                let rows = app.incident_rows().len();
                app.incident_panel.nav.clamp(rows);
            }
            Some(IncidentRow::Item(index)) => {
                if let Some(incident) = app.incidents.get(*index).cloned() {
                    app.incident_panel.start_edit(&incident);
                }
            }
            _ => {}
        },
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_incident(),
        _ => {}
    }
}
