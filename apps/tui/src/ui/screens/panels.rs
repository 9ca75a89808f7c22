use control_room_core::{IncidentStatus, Location};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::panels::{FormField, IncidentRow, PanelNav, Section};
use crate::app::{App, AssignMode, Focus};
use crate::ui::widgets::list::render_rows;

/// What one form row needs to be drawn.
struct FormView<'a> {
    fields: &'a [FormField],
    nav: &'a PanelNav,
    name: &'a str,
    status: Option<IncidentStatus>,
    location: Location,
    error: Option<&'a str>,
    assigning: bool,
    submit_label: &'static str,
}

fn coords(location: Location) -> String {
    format!("x: {:.2} y: {:.2}", location.x, location.y)
}

fn form_lines(view: &FormView<'_>, focused: bool) -> Vec<TextLine<'static>> {
    let active = focused && view.nav.form_active;
    let current = view.fields[view.nav.field_index.min(view.fields.len() - 1)];
    let style_for = |field: FormField| {
        if active && current == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let prefix = |field: FormField| if active && current == field { "> " } else { "  " };

    let mut lines = Vec::new();
    for &field in view.fields {
        let style = style_for(field);
        let line = match field {
            FormField::Name => {
                let cursor = if active && current == field { "▏" } else { "" };
                let name_style = if view.error.is_some() {
                    Style::default().fg(Color::LightRed)
                } else {
                    Style::default().fg(Color::White)
                };
                TextLine::from(vec![
                    Span::styled(format!("{}Name: ", prefix(field)), style),
                    Span::styled(format!("{}{cursor}", view.name), name_style),
                ])
            }
            FormField::Status => TextLine::from(vec![
                Span::styled(format!("{}Status: ", prefix(field)), style),
                Span::styled(
                    format!("◂ {} ▸", view.status.unwrap_or_default().as_str()),
                    Style::default().fg(Color::White),
                ),
            ]),
            FormField::Location => {
                let action = if view.assigning {
                    Span::styled("  assigning on map…", Style::default().fg(Color::Yellow))
                } else {
                    Span::styled("  [Assign from map]", style)
                };
                TextLine::from(vec![
                    Span::styled(format!("{}Location: ", prefix(field)), style),
                    Span::styled(coords(view.location), Style::default().fg(Color::White)),
                    action,
                ])
            }
            FormField::Submit => TextLine::from(Span::styled(
                format!("{}[{}]", prefix(field), view.submit_label),
                style,
            )),
        };
        lines.push(line);

        if field == FormField::Name {
            if let Some(error) = view.error {
                lines.push(TextLine::from(Span::styled(
                    format!("    {error}"),
                    Style::default().fg(Color::LightRed),
                )));
            }
        }
    }
    lines
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(title)
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn filter_line(nav: &PanelNav) -> Option<TextLine<'static>> {
    if !nav.filtering && nav.filter.is_empty() {
        return None;
    }
    let cursor = if nav.filtering { "▏" } else { "" };
    Some(TextLine::from(vec![
        Span::styled("Filter: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}{cursor}", nav.filter),
            Style::default().fg(Color::LightMagenta),
        ),
    ]))
}

/// Splits a panel into form, optional filter line, and list.
fn split(inner: Rect, form_height: usize, has_filter: bool) -> (Rect, Rect, Rect) {
    let form_height = u16::try_from(form_height).unwrap_or(u16::MAX);
    let [form, _, filter, list] = Layout::vertical([
        Constraint::Length(form_height),
        Constraint::Length(1),
        Constraint::Length(u16::from(has_filter)),
        Constraint::Min(1),
    ])
    .areas(inner);
    (form, filter, list)
}

pub fn render_incident_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let focused = app.focus == Focus::Incidents;
    let panel = &app.incident_panel;
    let title = match panel.editing {
        Some(id) => format!(" Incidents · editing #{id} "),
        None => " Incidents · create new ".to_string(),
    };
    let block = panel_block(title, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let draft = panel.draft();
    let view = FormView {
        fields: panel.fields(),
        nav: &panel.nav,
        name: &draft.name,
        status: panel.editing.map(|_| draft.status),
        location: draft.location,
        error: if panel.editing.is_some() {
            panel.edit_error.as_deref()
        } else {
            panel.create_error.as_deref()
        },
        assigning: app.assign_mode == AssignMode::Incident,
        submit_label: if panel.editing.is_some() { "Save" } else { "Create" },
    };
    let form = form_lines(&view, focused);
    let filter = filter_line(&panel.nav);
    let (form_area, filter_area, list_area) = split(inner, form.len(), filter.is_some());
    f.render_widget(Paragraph::new(form), form_area);
    if let Some(filter) = filter {
        f.render_widget(Paragraph::new(filter), filter_area);
    }

    let lines = app
        .incident_rows()
        .into_iter()
        .map(|row| match row {
            IncidentRow::Header { section, count } => {
                let expanded = match section {
                    Section::Pending => panel.show_pending,
                    Section::Resolved => panel.show_resolved,
                };
                let color = match section {
                    Section::Pending => Color::LightRed,
                    Section::Resolved => Color::LightGreen,
                };
                TextLine::from(Span::styled(
                    format!(
                        "{} {} ({count})",
                        if expanded { "▼" } else { "▶" },
                        section.title()
                    ),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
            }
            IncidentRow::Empty(section) => TextLine::from(Span::styled(
                format!("    No {} incidents", section.title().to_lowercase()),
                Style::default().fg(Color::DarkGray),
            )),
            IncidentRow::Item(index) => {
                let incident = &app.incidents[index];
                TextLine::from(vec![
                    Span::raw(format!("    {} ", incident.name)),
                    Span::styled(
                        format!("({})", coords(incident.location)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            }
        })
        .collect();

    let highlight = focused && !panel.nav.form_active;
    render_rows(f, list_area, lines, panel.nav.selected, highlight);
}

pub fn render_vehicle_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let focused = app.focus == Focus::Vehicles;
    let panel = &app.vehicle_panel;
    let title = match panel.editing {
        Some(id) => format!(" Vehicles · editing #{id} "),
        None => " Vehicles · create new ".to_string(),
    };
    let block = panel_block(title, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let draft = panel.draft();
    let view = FormView {
        fields: panel.fields(),
        nav: &panel.nav,
        name: &draft.name,
        status: None,
        location: draft.location,
        error: if panel.editing.is_some() {
            panel.edit_error.as_deref()
        } else {
            panel.create_error.as_deref()
        },
        assigning: app.assign_mode == AssignMode::Vehicle,
        submit_label: if panel.editing.is_some() { "Save" } else { "Create" },
    };
    let mut form = form_lines(&view, focused);
    if !panel.last_message.is_empty() {
        let color = if panel.last_message.starts_with("Failed") {
            Color::LightRed
        } else {
            Color::LightGreen
        };
        form.push(TextLine::from(Span::styled(
            panel.last_message.clone(),
            Style::default().fg(color),
        )));
    }
    let filter = filter_line(&panel.nav);
    let (form_area, filter_area, list_area) = split(inner, form.len(), filter.is_some());
    f.render_widget(Paragraph::new(form), form_area);
    if let Some(filter) = filter {
        f.render_widget(Paragraph::new(filter), filter_area);
    }

    let rows = app.vehicle_rows();
    let lines: Vec<TextLine<'static>> = if rows.is_empty() {
        vec![TextLine::from(Span::styled(
            "  No vehicles",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        rows.into_iter()
            .map(|index| {
                let vehicle = &app.vehicles[index];
                TextLine::from(vec![
                    Span::styled("■ ", Style::default().fg(Color::LightBlue)),
                    Span::raw(format!("{} ", vehicle.name)),
                    Span::styled(
                        format!("({})", coords(vehicle.location)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };

    let highlight = focused && !panel.nav.form_active && !app.vehicles.is_empty();
    render_rows(f, list_area, lines, panel.nav.selected, highlight);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &TextLine<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn form_shows_error_under_name() {
        let nav = PanelNav {
            form_active: true,
            ..PanelNav::default()
        };
        let view = FormView {
            fields: &[FormField::Name, FormField::Location, FormField::Submit],
            nav: &nav,
            name: "",
            status: None,
            location: Location::new(0.125, 0.5),
            error: Some("Incident name is required"),
            assigning: false,
            submit_label: "Create",
        };
        let lines = form_lines(&view, true);

        assert_eq!(lines.len(), 4);
        assert!(text(&lines[0]).starts_with("> Name: "));
        assert_eq!(text(&lines[1]).trim(), "Incident name is required");
        assert!(text(&lines[2]).contains("x: 0.13 y: 0.50") || text(&lines[2]).contains("x: 0.12 y: 0.50"));
        assert_eq!(text(&lines[3]), "  [Create]");
    }
}
