mod poll;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use control_room_core::routing::{OsrmResponse, Rgb, DEFAULT_ROUTING_BASE};
use control_room_core::wind::{arrow_glyph, WIND_POLL_INTERVAL};
use control_room_core::{
    plan_routes, Incident, MapFrame, MarkerKind, MarkerLayer, RenderedRoute, RouteLayer,
    RouteRequest, Selection, Vehicle, WindInfo,
};
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span, Text},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Rectangle},
        Block, Borders, Cell, Paragraph, Row, Table, Tabs,
    },
    Frame, Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::poll::PollClock;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

fn api_base() -> &'static str {
    option_env!("API_BASE").unwrap_or(DEFAULT_API_BASE)
}

fn routing_base() -> &'static str {
    option_env!("ROUTING_BASE").unwrap_or(DEFAULT_ROUTING_BASE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Incidents,
    Vehicles,
}

impl Tab {
    const fn index(self) -> usize {
        match self {
            Self::Incidents => 0,
            Self::Vehicles => 1,
        }
    }

    const fn toggled(self) -> Self {
        match self {
            Self::Incidents => Self::Vehicles,
            Self::Vehicles => Self::Incidents,
        }
    }
}

/// Everything the page shows. Lives behind `Rc<RefCell<_>>`; fetches borrow it
/// only after their awaits complete.
struct Dashboard {
    frame: MapFrame,
    incidents: Vec<Incident>,
    vehicles: Vec<Vehicle>,
    loaded: bool,
    wind: Option<WindInfo>,
    wind_clock: PollClock,
    markers: MarkerLayer,
    routes: RouteLayer,
    routing_active: bool,
    tab: Tab,
    row_offset: usize,
    status: String,
}

type Shared = Rc<RefCell<Dashboard>>;

impl Dashboard {
    fn new() -> Self {
        Self {
            frame: MapFrame::default(),
            incidents: Vec::new(),
            vehicles: Vec::new(),
            loaded: false,
            wind: None,
            wind_clock: PollClock::new(WIND_POLL_INTERVAL.as_secs_f64() * 1000.0),
            markers: MarkerLayer::new(),
            routes: RouteLayer::new(),
            routing_active: false,
            tab: Tab::Incidents,
            row_offset: 0,
            status: "Loading incidents and vehicles...".to_string(),
        }
    }

    fn set_records(&mut self, incidents: Vec<Incident>, vehicles: Vec<Vehicle>) {
        self.incidents = incidents;
        self.vehicles = vehicles;
        self.loaded = true;
        self.row_offset = self.row_offset.min(self.row_count().saturating_sub(1));
        self.markers.rebuild(
            &self.frame,
            &self.incidents,
            &self.vehicles,
            Selection::default(),
        );
        self.status = format!(
            "{} incidents, {} vehicles",
            self.incidents.len(),
            self.vehicles.len()
        );
    }

    /// Opens a new route generation. Returns what to fetch, or nothing when
    /// routes are off.
    fn plan(&mut self) -> Option<(u64, Vec<RouteRequest>)> {
        if !self.routing_active {
            self.routes.clear();
            return None;
        }
        let requests = plan_routes(
            &self.frame,
            true,
            &self.incidents,
            &self.vehicles,
            Selection::default(),
        );
        let generation = self.routes.begin(requests.len());
        Some((generation, requests))
    }

    fn row_count(&self) -> usize {
        match self.tab {
            Tab::Incidents => self.incidents.len(),
            Tab::Vehicles => self.vehicles.len(),
        }
    }

    fn scroll(&mut self, down: bool) {
        self.row_offset = if down {
            (self.row_offset + 1).min(self.row_count().saturating_sub(1))
        } else {
            self.row_offset.saturating_sub(1)
        };
    }

    fn switch_tab(&mut self) {
        self.tab = self.tab.toggled();
        self.row_offset = 0;
    }
}

fn main() -> io::Result<()> {
    let shared: Shared = Rc::new(RefCell::new(Dashboard::new()));

    spawn_local(load_records(shared.clone()));

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let shared = shared.clone();
        move |event| match event.code {
            ratzilla::event::KeyCode::Char('r') => {
                let plan = {
                    let mut dashboard = shared.borrow_mut();
                    dashboard.routing_active = !dashboard.routing_active;
                    dashboard.plan()
                };
                if let Some((generation, requests)) = plan {
                    spawn_routes(&shared, generation, requests);
                }
            }
            ratzilla::event::KeyCode::Char('f') => spawn_local(load_records(shared.clone())),
            ratzilla::event::KeyCode::Left
            | ratzilla::event::KeyCode::Right
            | ratzilla::event::KeyCode::Tab => shared.borrow_mut().switch_tab(),
            ratzilla::event::KeyCode::Up => shared.borrow_mut().scroll(false),
            ratzilla::event::KeyCode::Down => shared.borrow_mut().scroll(true),
            _ => {}
        }
    });

    terminal.draw_web(move |f| {
        let poll_wind = shared.borrow_mut().wind_clock.due(js_sys::Date::now());
        if poll_wind {
            spawn_local(fetch_wind(shared.clone()));
        }

        let area = f.area();
        let block = Block::default()
            .title("Control Room")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(area).inner(Margin::new(1, 1));
        f.render_widget(block, area);

        let dashboard = shared.borrow();
        if dashboard.loaded {
            render_dashboard(&dashboard, f, inner);
        } else {
            let paragraph = Paragraph::new(Text::from(TextLine::from(dashboard.status.as_str())))
                .alignment(Alignment::Center);
            f.render_widget(paragraph, inner);
        }
    });

    Ok(())
}

fn render_dashboard(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let [header, content, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(12),
        Constraint::Length(10),
    ])
    .areas(area);

    render_header(dashboard, f, header);

    let [map, side] =
        Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(content);
    render_map(dashboard, f, map);

    let [wind, legend] =
        Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).areas(side);
    render_wind(dashboard, f, wind);
    render_legend(dashboard, f, legend);

    render_tables(dashboard, f, footer);
}

fn render_header(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let pending = dashboard
        .incidents
        .iter()
        .filter(|incident| incident.is_pending())
        .count();
    let routes = if dashboard.routing_active {
        format!(
            "Routes: {}/{}",
            dashboard.routes.routes().len(),
            dashboard.routes.routes().len() + dashboard.routes.pending()
        )
    } else {
        "Routes: off".to_string()
    };

    let line = TextLine::from(vec![
        Span::styled(
            format!(
                "Incidents: {} ({pending} pending)  Vehicles: {}  ",
                dashboard.incidents.len(),
                dashboard.vehicles.len()
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(routes, Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(dashboard.status.as_str(), Style::default().fg(Color::DarkGray)),
    ]);

    let block = Block::default()
        .title("Overview")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(Text::from(line)).block(block), area);
}

const fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

const fn marker_style(kind: MarkerKind) -> (&'static str, Color) {
    match kind {
        MarkerKind::Incident { .. } => ("▲", Color::Red),
        MarkerKind::Vehicle { .. } => ("■", Color::LightBlue),
        MarkerKind::SelectedIncident | MarkerKind::SelectedVehicle => ("◆", Color::Yellow),
    }
}

fn render_map(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Map")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let frame = dashboard.frame;
    let half = frame.span_deg / 2.0;
    // A little air around the normalized square.
    let pad = frame.span_deg * 0.05;

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([frame.center.lng - half - pad, frame.center.lng + half + pad])
        .y_bounds([frame.center.lat - half - pad, frame.center.lat + half + pad])
        .paint(|ctx| {
            ctx.draw(&Rectangle {
                x: frame.center.lng - half,
                y: frame.center.lat - half,
                width: frame.span_deg,
                height: frame.span_deg,
                color: Color::DarkGray,
            });
            ctx.layer();

            for line in route_lines(dashboard.routes.routes(), frame.span_deg) {
                ctx.draw(&line);
            }
            ctx.layer();

            for marker in dashboard.markers.iter() {
                let (glyph, color) = marker_style(marker.kind);
                ctx.print(
                    marker.position.lng,
                    marker.position.lat,
                    TextLine::from(vec![
                        Span::styled(glyph, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                        Span::styled(
                            format!(" {}", marker.label),
                            Style::default().fg(Color::Gray),
                        ),
                    ]),
                );
            }

            for route in dashboard.routes.routes() {
                if let (Some(label), Some(start)) = (route.distance_label(), route.path.first()) {
                    ctx.print(
                        start.lng,
                        start.lat,
                        Span::styled(label, Style::default().fg(rgb(route.color))),
                    );
                }
            }
        });
    f.render_widget(canvas, area);
}

fn route_lines(routes: &[RenderedRoute], span_deg: f64) -> Vec<CanvasLine> {
    routes
        .iter()
        .flat_map(|route| {
            let color = rgb(route.color);
            route.strokes(span_deg).into_iter().map(move |(from, to)| CanvasLine {
                x1: from.lng,
                y1: from.lat,
                x2: to.lng,
                y2: to.lat,
                color,
            })
        })
        .collect()
}

fn render_wind(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Wind")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let lines = match dashboard.wind {
        Some(wind) => {
            let flow = wind.flow_angle();
            vec![
                TextLine::from(vec![
                    Span::styled("Flow ", Style::default().fg(Color::Gray)),
                    Span::styled(
                        format!("{} {} ({flow:.0}°)", arrow_glyph(flow), wind.compass()),
                        Style::default()
                            .fg(Color::LightCyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                TextLine::from(format!("Direction {:.0}°", wind.wind_deg)),
                TextLine::from(format!("Speed {:.1} m/s", wind.speed)),
            ]
        }
        None => vec![TextLine::from(Span::styled(
            "Waiting for wind data...",
            Style::default().fg(Color::Gray),
        ))],
    };
    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn render_legend(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Legend")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let mut lines = vec![
        TextLine::from(vec![
            Span::styled("▲ ", Style::default().fg(Color::Red)),
            Span::raw(format!("Pending incident ({})", dashboard.markers.incident_count())),
        ]),
        TextLine::from(vec![
            Span::styled("■ ", Style::default().fg(Color::LightBlue)),
            Span::raw(format!("Vehicle ({})", dashboard.markers.vehicle_count())),
        ]),
        TextLine::from(""),
    ];
    let fallbacks = dashboard
        .routes
        .routes()
        .iter()
        .filter(|route| route.is_fallback())
        .count();
    if fallbacks > 0 {
        lines.push(TextLine::from(Span::styled(
            format!("{fallbacks} route(s) drawn as straight lines"),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(TextLine::from(Span::styled(
        "r routes  f refresh  ←/→ tables  ↑/↓ scroll",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn render_tables(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let [tabs_area, table_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    let tabs = Tabs::new(vec![TextLine::from("Incidents"), TextLine::from("Vehicles")])
        .select(dashboard.tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));
    f.render_widget(tabs, tabs_area);

    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let table = match dashboard.tab {
        Tab::Incidents => {
            let rows = dashboard
                .incidents
                .iter()
                .skip(dashboard.row_offset)
                .map(|incident| {
                    let color = if incident.is_pending() {
                        Color::LightRed
                    } else {
                        Color::LightGreen
                    };
                    Row::new(vec![
                        Cell::from(incident.id.to_string()),
                        Cell::from(incident.name.clone()),
                        Cell::from(incident.status.label()).style(Style::default().fg(color)),
                        Cell::from(format!("{:.2}", incident.location.x)),
                        Cell::from(format!("{:.2}", incident.location.y)),
                    ])
                });
            Table::new(
                rows,
                [
                    Constraint::Length(6),
                    Constraint::Min(16),
                    Constraint::Length(10),
                    Constraint::Length(6),
                    Constraint::Length(6),
                ],
            )
            .header(Row::new(vec!["ID", "Name", "Status", "x", "y"]).style(header_style))
        }
        Tab::Vehicles => {
            let rows = dashboard
                .vehicles
                .iter()
                .skip(dashboard.row_offset)
                .map(|vehicle| {
                    Row::new(vec![
                        Cell::from(vehicle.id.to_string()),
                        Cell::from(vehicle.name.clone()),
                        Cell::from(format!("{:.2}", vehicle.location.x)),
                        Cell::from(format!("{:.2}", vehicle.location.y)),
                    ])
                });
            Table::new(
                rows,
                [
                    Constraint::Length(6),
                    Constraint::Min(16),
                    Constraint::Length(6),
                    Constraint::Length(6),
                ],
            )
            .header(Row::new(vec!["ID", "Name", "x", "y"]).style(header_style))
        }
    };
    f.render_widget(table.block(block), table_area);
}

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(url, &opts).map_err(|e| js_error(&e))?;
    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| js_error(&e))?;
    let response = value.dyn_into::<Response>().map_err(|e| js_error(&e))?;
    if !response.ok() {
        return Err(format!("HTTP {} from {url}", response.status()));
    }

    let body = response.json().map_err(|e| js_error(&e))?;
    let json = JsFuture::from(body).await.map_err(|e| js_error(&e))?;
    serde_wasm_bindgen::from_value::<T>(json).map_err(|e| e.to_string())
}

async fn load_records(shared: Shared) {
    let base = api_base();
    let incidents = fetch_json::<Vec<Incident>>(&format!("{base}/incidents")).await;
    let vehicles = fetch_json::<Vec<Vehicle>>(&format!("{base}/vehicles")).await;

    let plan = {
        let mut dashboard = shared.borrow_mut();
        match (incidents, vehicles) {
            (Ok(incidents), Ok(vehicles)) => dashboard.set_records(incidents, vehicles),
            (Err(error), _) | (_, Err(error)) => {
                web_sys::console::error_1(&format!("Failed to refresh: {error}").into());
                dashboard.status = format!("Failed to refresh: {error}");
                return;
            }
        }
        dashboard.plan()
    };
    if let Some((generation, requests)) = plan {
        spawn_routes(&shared, generation, requests);
    }
}

async fn fetch_wind(shared: Shared) {
    match fetch_json::<WindInfo>(&format!("{}/wind-info", api_base())).await {
        Ok(wind) => shared.borrow_mut().wind = Some(wind),
        // Keep showing the last reading.
        Err(error) => web_sys::console::warn_1(&format!("Wind poll failed: {error}").into()),
    }
}

fn spawn_routes(shared: &Shared, generation: u64, requests: Vec<RouteRequest>) {
    for request in requests {
        let shared = shared.clone();
        spawn_local(async move {
            let url = request.url(routing_base());
            let route = RenderedRoute::resolve(&request, fetch_json::<OsrmResponse>(&url).await);
            if route.is_fallback() {
                web_sys::console::warn_1(
                    &format!("Routing failed for {}, drawing straight line", route.label).into(),
                );
            }
            let label = route.label.clone();
            if !shared.borrow_mut().routes.accept(generation, route) {
                web_sys::console::info_1(
                    &format!("Dropping stale route {label} (generation {generation})").into(),
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use control_room_core::{GeoPoint, IncidentStatus, Location};

    fn records() -> (Vec<Incident>, Vec<Vehicle>) {
        let incidents = vec![
            Incident {
                id: 1,
                name: "Fire".to_string(),
                status: IncidentStatus::Pending,
                location: Location::new(0.2, 0.2),
            },
            Incident {
                id: 2,
                name: "Flood".to_string(),
                status: IncidentStatus::Resolved,
                location: Location::new(0.8, 0.8),
            },
        ];
        let vehicles = vec![
            Vehicle {
                id: 1,
                name: "Unit 1".to_string(),
                location: Location::new(0.5, 0.5),
            },
            Vehicle {
                id: 2,
                name: "Unit 2".to_string(),
                location: Location::new(0.1, 0.9),
            },
        ];
        (incidents, vehicles)
    }

    #[test]
    fn records_rebuild_markers_for_pending_incidents() {
        let mut dashboard = Dashboard::new();
        let (incidents, vehicles) = records();
        dashboard.set_records(incidents, vehicles);

        assert!(dashboard.loaded);
        assert_eq!(dashboard.markers.incident_count(), 1);
        assert_eq!(dashboard.markers.vehicle_count(), 2);
        assert_eq!(dashboard.status, "2 incidents, 2 vehicles");
    }

    #[test]
    fn routes_pair_every_vehicle_with_pending_incidents() {
        let mut dashboard = Dashboard::new();
        let (incidents, vehicles) = records();
        dashboard.set_records(incidents, vehicles);
        assert!(dashboard.plan().is_none());

        dashboard.routing_active = true;
        let (generation, requests) = dashboard.plan().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(dashboard.routes.pending(), 2);

        // A newer plan makes the first generation stale.
        let (newer, _) = dashboard.plan().unwrap();
        let stale = RenderedRoute::fallback(&requests[0], "test");
        assert!(!dashboard.routes.accept(generation, stale));
        assert!(dashboard
            .routes
            .accept(newer, RenderedRoute::fallback(&requests[1], "test")));
    }

    #[test]
    fn fallback_routes_are_drawn_dashed() {
        let frame = MapFrame::default();
        let request = RouteRequest {
            from: frame.center,
            to: GeoPoint::new(frame.center.lat, frame.center.lng + frame.span_deg / 2.0),
            color: Rgb(1, 2, 3),
            label: "Selected".to_string(),
        };
        let route = RenderedRoute::fallback(&request, "offline");
        let lines = route_lines(std::slice::from_ref(&route), frame.span_deg);

        assert!((15..=16).contains(&lines.len()));
        assert!(lines
            .iter()
            .all(|line| line.x2 - line.x1 < frame.span_deg / 59.0));
        assert_eq!(lines[0].color, rgb(route.color));
    }

    #[test]
    fn scrolling_stays_inside_the_table() {
        let mut dashboard = Dashboard::new();
        let (incidents, vehicles) = records();
        dashboard.set_records(incidents, vehicles);

        dashboard.scroll(true);
        dashboard.scroll(true);
        assert_eq!(dashboard.row_offset, 1);
        dashboard.switch_tab();
        assert_eq!(dashboard.tab, Tab::Vehicles);
        assert_eq!(dashboard.row_offset, 0);
        dashboard.scroll(false);
        assert_eq!(dashboard.row_offset, 0);
    }
}
