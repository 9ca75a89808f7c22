use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::time::Duration;
use tachyonfx::EffectRenderer;

use crate::app::{App, AssignMode, Focus};
use crate::ui::screens::panels::{render_incident_panel, render_vehicle_panel};
use crate::ui::widgets::map::render_map;
use crate::ui::widgets::wind::render_wind;

pub struct DashboardLayout {
    pub header: Rect,
    pub map: Rect,
    pub wind: Rect,
    pub incidents: Rect,
    pub vehicles: Rect,
    pub status: Rect,
    pub shortcuts: Rect,
}

pub fn dashboard_layout(area: Rect) -> DashboardLayout {
    let [header, body, status, shortcuts] = Layout::vertical([
        Constraint::Length(3), // Title and backend check
        Constraint::Min(10),   // Map and panels
        Constraint::Length(3), // Status
        Constraint::Length(1), // Shortcuts hint
    ])
    .areas(area.inner(Margin::new(1, 0)));

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);
    let [map, wind] = Layout::vertical([Constraint::Min(8), Constraint::Length(5)]).areas(left);
    let [incidents, vehicles] =
        Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(right);

    DashboardLayout {
        header,
        map,
        wind,
        incidents,
        vehicles,
        status,
        shortcuts,
    }
}

pub fn render_dashboard(app: &mut App, f: &mut Frame<'_>, elapsed: Duration) {
    let layout = dashboard_layout(f.area());

    render_header(app, f, layout.header);
    render_map(app, f, layout.map);
    render_wind(app, f, layout.wind);
    render_incident_panel(app, f, layout.incidents);
    render_vehicle_panel(app, f, layout.vehicles);
    render_status(app, f, layout.status, elapsed);
    render_shortcuts(app, f, layout.shortcuts);
}

fn render_header(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let title = TextLine::from(vec![
        Span::styled(
            "Control Room ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Incident & Vehicle monitoring · Wind info",
            Style::default().fg(Color::Gray),
        ),
    ]);
    f.render_widget(Paragraph::new(title), inner);

    let right = match (app.assign_mode, &app.backend_check) {
        (AssignMode::Incident | AssignMode::Vehicle, _) => {
            let kind = app.assign_mode.kind().map_or("", |kind| kind.label());
            Some(Span::styled(
                format!("Assigning on map: {kind} (Esc cancels) "),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
        }
        (AssignMode::Off, Some(check)) => {
            let color = if check.starts_with("OK") {
                Color::LightGreen
            } else {
                Color::LightRed
            };
            Some(Span::styled(check.clone(), Style::default().fg(color)))
        }
        (AssignMode::Off, None) => None,
    };
    if let Some(right) = right {
        f.render_widget(
            Paragraph::new(TextLine::from(right)).alignment(Alignment::Right),
            inner,
        );
    }
}

fn render_status(app: &mut App, f: &mut Frame<'_>, area: Rect, elapsed: Duration) {
    let refreshed = app
        .last_refresh
        .map_or_else(|| "never".to_string(), |at| at.format("%H:%M:%S").to_string());
    let block = Block::default()
        .title(" Status ")
        .title(
            TextLine::from(format!(
                " {} incidents · {} vehicles · refreshed {refreshed} ",
                app.markers.incident_count(),
                app.markers.vehicle_count()
            ))
            .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let message = if app.status_message.is_empty() {
        "Ready".to_string()
    } else {
        app.status_message.clone()
    };
    let inner = block.inner(area);
    f.render_widget(
        Paragraph::new(message)
            .style(Style::default().fg(Color::White))
            .block(block),
        area,
    );

    if let Some(effect) = app.status_effect.as_mut() {
        f.buffer_mut().render_effect(effect, inner, elapsed.into());
        if effect.done() {
            app.status_effect = None;
        }
    }
}

fn render_shortcuts(app: &App, f: &mut Frame<'_>, area: Rect) {
    let hint = match app.focus {
        Focus::Map if app.assign_mode.is_active() => {
            "Click/Enter: pick location | ←↑↓→ crosshair | Esc: cancel assign | Tab: panels"
        }
        Focus::Map => {
            "←↑↓→ crosshair | hjkl pan | +/- zoom | r routes | R reset | i/v new | t test | F5 refresh | F1 help | q quit"
        }
        Focus::Incidents | Focus::Vehicles => {
            "↑↓ select | Enter edit/expand | n new | a assign | d delete | / filter | Tab next | Esc map | F1 help"
        }
    };
    f.render_widget(
        Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}
