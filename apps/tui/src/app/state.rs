use chrono::{DateTime, Local};
use control_room_core::{
    plan_routes, Incident, Location, MarkerLayer, RouteLayer, Selection, Vehicle, Viewport,
    WindInfo,
};
use ratatui::layout::Rect;
use ratatui::style::Color;
use std::time::Instant;
use tachyonfx::{fx, Effect, Interpolation};
use throbber_widgets_tui::ThrobberState;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::app::panels::{IncidentPanel, IncidentRow, RecordKind, VehiclePanel};
use crate::config::AppConfig;
use crate::event::{spawn_route_requests, AppEvent, EventSender};
use crate::routing::RoutingClient;

/// Which part of the dashboard receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Map,
    Incidents,
    Vehicles,
}

impl Focus {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Map => Self::Incidents,
            Self::Incidents => Self::Vehicles,
            Self::Vehicles => Self::Map,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignMode {
    #[default]
    Off,
    Incident,
    Vehicle,
}

impl AssignMode {
    pub const fn kind(self) -> Option<RecordKind> {
        match self {
            Self::Off => None,
            Self::Incident => Some(RecordKind::Incident),
            Self::Vehicle => Some(RecordKind::Vehicle),
        }
    }

    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Off)
    }
}

const CROSSHAIR_STEP: f64 = 0.025;
const STATUS_FADE_MS: u32 = 900;

pub struct App {
    pub running: bool,
    pub config: AppConfig,
    pub api: ApiClient,
    pub routing: RoutingClient,
    pub(crate) events: EventSender,
    pub incidents: Vec<Incident>,
    pub vehicles: Vec<Vehicle>,
    pub wind: Option<WindInfo>,
    pub wind_updated: Option<DateTime<Local>>,
    pub last_refresh: Option<DateTime<Local>>,
    pub viewport: Viewport,
    pub markers: MarkerLayer,
    pub routes: RouteLayer,
    pub routing_active: bool,
    pub selection: Selection,
    pub assign_mode: AssignMode,
    pub focus: Focus,
    pub incident_panel: IncidentPanel,
    pub vehicle_panel: VehiclePanel,
    /// Keyboard pointer over the map, as fractions of the visible area.
    pub crosshair: (f64, f64),
    /// Inner map area from the last draw; mouse clicks are tested against it.
    pub map_area: Rect,
    pub status_message: String,
    pub backend_check: Option<String>,
    pub show_help: bool,
    pub throbber: ThrobberState,
    pub status_effect: Option<Effect>,
    pub last_frame: Instant,
}

impl App {
    pub fn new(config: AppConfig, events: EventSender) -> Self {
        let api = ApiClient::with_timeout(config.api_base.clone(), config.request_timeout);
        let routing = RoutingClient::with_timeout(config.routing_base.clone(), config.request_timeout);
        let viewport = Viewport::for_frame(&config.map_frame);

        Self {
            running: true,
            config,
            api,
            routing,
            events,
            incidents: Vec::new(),
            vehicles: Vec::new(),
            wind: None,
            wind_updated: None,
            last_refresh: None,
            viewport,
            markers: MarkerLayer::new(),
            routes: RouteLayer::new(),
            routing_active: false,
            selection: Selection::default(),
            assign_mode: AssignMode::Off,
            focus: Focus::Map,
            incident_panel: IncidentPanel::default(),
            vehicle_panel: VehiclePanel::default(),
            crosshair: (0.5, 0.5),
            map_area: Rect::default(),
            status_message: String::new(),
            backend_check: None,
            show_help: false,
            throbber: ThrobberState::default(),
            status_effect: None,
            last_frame: Instant::now(),
        }
    }

    /// Advances the spinner; returns the time since the previous frame for effects.
    pub fn tick(&mut self) -> std::time::Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        if self.wind.is_none() {
            self.throbber.calc_next();
        }
        delta
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::WindUpdated(wind) => {
                self.wind = Some(wind);
                self.wind_updated = Some(Local::now());
            }
            AppEvent::RouteResolved { generation, route } => {
                let label = route.label.clone();
                if !self.routes.accept(generation, route) {
                    info!(generation, current = self.routes.generation(), %label, "dropping stale route");
                }
            }
            AppEvent::RecordsLoaded(result) => self.records_loaded(result),
            AppEvent::Saved {
                kind,
                edited,
                result,
            } => self.record_saved(kind, edited, result),
            AppEvent::Deleted { kind, id, result } => self.record_deleted(kind, id, result),
            AppEvent::BackendChecked(result) => self.backend_checked(result),
        }
    }

    /// Replaces the cached lists and redraws everything that depends on them.
    pub fn set_records(&mut self, incidents: Vec<Incident>, vehicles: Vec<Vehicle>) {
        self.incidents = incidents;
        self.vehicles = vehicles;
        self.last_refresh = Some(Local::now());

        let incident_rows = self.incident_rows().len();
        self.incident_panel.nav.clamp(incident_rows);
        let vehicle_rows = self.vehicle_rows().len();
        self.vehicle_panel.nav.clamp(vehicle_rows);

        self.refresh_map();
    }

    /// Rebuilds the marker layer and starts a new route generation.
    pub fn refresh_map(&mut self) {
        let frame = self.config.map_frame;
        self.markers
            .rebuild(&frame, &self.incidents, &self.vehicles, self.selection);

        let requests = plan_routes(
            &frame,
            self.routing_active,
            &self.incidents,
            &self.vehicles,
            self.selection,
        );
        let generation = self.routes.begin(requests.len());
        if !requests.is_empty() {
            debug!(generation, count = requests.len(), "requesting routes");
            spawn_route_requests(&self.routing, generation, requests, &self.events);
        }
    }

    pub fn toggle_routing(&mut self) {
        self.routing_active = !self.routing_active;
        info!(active = self.routing_active, "all routes toggled");
        self.status_message = if self.routing_active {
            "Showing routes from every vehicle to every pending incident".to_string()
        } else {
            "All routes hidden".to_string()
        };
        self.refresh_map();
    }

    /// Default viewport with all-routes off; the selected route, if any, is
    /// planned again.
    pub fn reset_map(&mut self) {
        self.viewport.reset(&self.config.map_frame);
        self.crosshair = (0.5, 0.5);
        self.routing_active = false;
        self.status_message = "Map reset".to_string();
        self.refresh_map();
    }

    pub fn start_assign(&mut self, kind: RecordKind) {
        self.assign_mode = match kind {
            RecordKind::Incident => AssignMode::Incident,
            RecordKind::Vehicle => AssignMode::Vehicle,
        };
        self.focus = Focus::Map;
        self.status_message = format!(
            "Assigning {} location: click the map or move the crosshair and press Enter",
            kind.label()
        );
    }

    /// Leaves assign mode; both picked locations go back to the origin.
    pub fn cancel_assign(&mut self) {
        self.assign_mode = AssignMode::Off;
        self.selection = Selection {
            incident: Some(Location::default()),
            vehicle: Some(Location::default()),
        };
        self.status_message = "Assign cancelled".to_string();
        self.refresh_map();
    }

    /// Handles a click at a fractional position of the visible map. Returns the
    /// picked location when assign mode is on.
    pub fn click_map(&mut self, fx: f64, fy: f64) -> Option<Location> {
        let kind = self.assign_mode.kind()?;
        let point = self
            .viewport
            .unproject(fx.clamp(0.0, 1.0), fy.clamp(0.0, 1.0));
        let location = self.config.map_frame.geo_to_normalized(point.lat, point.lng);

        match kind {
            RecordKind::Incident => {
                self.selection.incident = Some(location);
                self.incident_panel.take_location(location);
            }
            RecordKind::Vehicle => {
                self.selection.vehicle = Some(location);
                self.vehicle_panel.take_location(location);
            }
        }
        debug!(kind = kind.label(), x = location.x, y = location.y, "map location picked");
        self.status_message = format!(
            "Selected {} location: {:.3}, {:.3}",
            kind.label(),
            location.x,
            location.y
        );
        self.refresh_map();
        Some(location)
    }

    /// Clicks at a terminal cell; ignored outside the map.
    pub fn click_cell(&mut self, column: u16, row: u16) -> Option<Location> {
        let area = self.map_area;
        if area.width == 0
            || area.height == 0
            || column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        self.crosshair = (fx, fy);
        self.click_map(fx, fy)
    }

    pub fn click_crosshair(&mut self) -> Option<Location> {
        let (fx, fy) = self.crosshair;
        self.click_map(fx, fy)
    }

    pub fn move_crosshair(&mut self, dx: f64, dy: f64) {
        self.crosshair.0 = dx.mul_add(CROSSHAIR_STEP, self.crosshair.0).clamp(0.0, 1.0);
        self.crosshair.1 = dy.mul_add(CROSSHAIR_STEP, self.crosshair.1).clamp(0.0, 1.0);
    }

    pub fn incident_rows(&self) -> Vec<IncidentRow> {
        self.incident_panel.rows(&self.incidents)
    }

    pub fn vehicle_rows(&self) -> Vec<usize> {
        self.vehicle_panel.rows(&self.vehicles)
    }

    pub fn selected_incident(&self) -> Option<&Incident> {
        match self.incident_rows().get(self.incident_panel.nav.selected)? {
            IncidentRow::Item(index) => self.incidents.get(*index),
            IncidentRow::Header { .. } | IncidentRow::Empty(_) => None,
        }
    }

    pub fn selected_vehicle(&self) -> Option<&Vehicle> {
        let index = *self.vehicle_rows().get(self.vehicle_panel.nav.selected)?;
        self.vehicles.get(index)
    }

    /// True while a text field owns the keyboard, so letters are not shortcuts.
    pub fn is_typing(&self) -> bool {
        use crate::app::panels::FormField;

        match self.focus {
            Focus::Map => false,
            Focus::Incidents => {
                let panel = &self.incident_panel;
                panel.nav.filtering
                    || (panel.nav.form_active && panel.field() == FormField::Name)
            }
            Focus::Vehicles => {
                let panel = &self.vehicle_panel;
                panel.nav.filtering
                    || (panel.nav.form_active && panel.field() == FormField::Name)
            }
        }
    }

    /// Sets the status line and fades it in.
    pub fn flash_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_effect = Some(fx::fade_from_fg(
            Color::Black,
            (STATUS_FADE_MS, Interpolation::QuadOut),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::channel;
    use control_room_core::routing::{RenderedRoute, RouteRequest, SELECTED_ROUTE_COLOR};
    use control_room_core::{GeoPoint, IncidentStatus, MarkerKind};

    fn offline_config() -> AppConfig {
        AppConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            routing_base: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        }
    }

    fn route(label: &str) -> RenderedRoute {
        let request = RouteRequest {
            from: GeoPoint::new(30.05, 31.47),
            to: GeoPoint::new(30.07, 31.50),
            color: SELECTED_ROUTE_COLOR,
            label: label.to_string(),
        };
        RenderedRoute::fallback(&request, "test")
    }

    #[test]
    fn routes_from_an_older_generation_are_dropped() {
        let (tx, _rx) = channel();
        let mut app = App::new(offline_config(), tx);

        let old = app.routes.begin(1);
        let current = app.routes.begin(1);
        app.apply_event(AppEvent::RouteResolved {
            generation: old,
            route: route("old"),
        });
        assert!(app.routes.is_empty());

        app.apply_event(AppEvent::RouteResolved {
            generation: current,
            route: route("new"),
        });
        assert_eq!(app.routes.routes().len(), 1);
        assert_eq!(app.routes.routes()[0].label, "new");
    }

    #[test]
    fn clicks_are_ignored_outside_assign_mode() {
        let (tx, _rx) = channel();
        let mut app = App::new(offline_config(), tx);
        assert!(app.click_map(0.5, 0.5).is_none());
        assert_eq!(app.selection, Selection::default());
    }

    #[tokio::test]
    async fn click_in_assign_mode_fills_the_create_form() {
        let (tx, _rx) = channel();
        let mut app = App::new(offline_config(), tx);
        app.start_assign(RecordKind::Incident);
        assert_eq!(app.focus, Focus::Map);

        let picked = app.click_map(0.25, 0.75).unwrap();
        assert!((picked.x - 0.25).abs() < 1e-4);
        assert!((picked.y - 0.75).abs() < 1e-4);
        assert_eq!(app.selection.incident, Some(picked));
        assert_eq!(app.incident_panel.create.location, picked);
        let selected = app
            .markers
            .count_where(|kind| matches!(kind, MarkerKind::SelectedIncident));
        assert_eq!(selected, 1);

        // Still assigning until cancelled or a create succeeds.
        assert_eq!(app.assign_mode, AssignMode::Incident);
    }

    #[tokio::test]
    async fn cancel_assign_resets_both_picks_to_origin() {
        let (tx, _rx) = channel();
        let mut app = App::new(offline_config(), tx);
        app.start_assign(RecordKind::Vehicle);
        app.click_map(0.9, 0.1);
        app.cancel_assign();

        assert_eq!(app.assign_mode, AssignMode::Off);
        assert_eq!(app.selection.incident, Some(Location::default()));
        assert_eq!(app.selection.vehicle, Some(Location::default()));
    }

    #[test]
    fn cell_clicks_outside_the_map_do_nothing() {
        let (tx, _rx) = channel();
        let mut app = App::new(offline_config(), tx);
        app.assign_mode = AssignMode::Vehicle;
        app.map_area = Rect::new(2, 2, 40, 20);
        assert!(app.click_cell(0, 0).is_none());
        assert!(app.click_cell(42, 5).is_none());
        assert!(app.selection.vehicle.is_none());
    }

    #[tokio::test]
    async fn resolved_incidents_have_no_marker() {
        let (tx, _rx) = channel();
        let mut app = App::new(offline_config(), tx);
        app.set_records(
            vec![
                Incident {
                    id: 1,
                    name: "Open".to_string(),
                    status: IncidentStatus::Pending,
                    location: Location::new(0.3, 0.3),
                },
                Incident {
                    id: 2,
                    name: "Closed".to_string(),
                    status: IncidentStatus::Resolved,
                    location: Location::new(0.6, 0.6),
                },
            ],
            Vec::new(),
        );
        assert_eq!(app.markers.incident_count(), 1);
        assert!(app.routes.is_empty());
    }

    #[test]
    fn reset_map_turns_routing_off() {
        let (tx, _rx) = channel();
        let mut app = App::new(offline_config(), tx);
        app.routing_active = true;
        app.viewport.zoom_in();
        app.move_crosshair(4.0, -4.0);
        app.reset_map();

        assert!(!app.routing_active);
        assert!(app.routes.is_empty());
        assert_eq!(app.viewport, Viewport::for_frame(&app.config.map_frame));
        assert_eq!(app.crosshair, (0.5, 0.5));
    }

    #[tokio::test]
    async fn reset_map_keeps_the_selected_route() {
        let (tx, _rx) = channel();
        let mut app = App::new(offline_config(), tx);
        app.selection = Selection {
            incident: Some(Location::new(0.2, 0.8)),
            vehicle: Some(Location::new(0.7, 0.3)),
        };
        app.set_records(
            Vec::new(),
            vec![Vehicle {
                id: 1,
                name: "Engine".to_string(),
                location: Location::new(0.5, 0.5),
            }],
        );
        app.toggle_routing();
        let before = app.routes.generation();

        app.reset_map();

        assert!(!app.routing_active);
        assert!(app.routes.generation() > before);
        assert_eq!(app.routes.pending(), 1);
        let selected = app
            .markers
            .count_where(|kind| matches!(kind, MarkerKind::SelectedVehicle));
        assert_eq!(selected, 1);
    }
}
