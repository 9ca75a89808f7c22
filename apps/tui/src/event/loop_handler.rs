use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use control_room_core::{Incident, Vehicle, WindInfo};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::Serialize;
use std::io::Stdout;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::app::{handle_input, handle_mouse, App};
use crate::config::AppConfig;
use crate::event::EventReceiver;
use crate::ui;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Run the main application event loop
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    mut events: EventReceiver,
) -> Result<()> {
    while app.running {
        // Results from background tasks: wind, routes and backend calls
        while let Ok(event) = events.try_recv() {
            app.apply_event(event);
        }

        let elapsed = app.tick();
        terminal
            .draw(|f| ui::ui(app, f, elapsed))
            .wrap_err("terminal draw failed")?;

        // Spawned tasks on this worker get a turn between frames
        tokio::task::yield_now().await;
        if !event::poll(EVENT_POLL_TIMEOUT).unwrap_or(false) {
            continue;
        }
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                handle_input(app, key.code);
            }
            Ok(Event::Mouse(mouse)) => handle_mouse(app, mouse),
            Ok(_) => {}
            Err(error) => warn!(%error, "failed to read terminal event"),
        }
    }

    info!("leaving event loop");
    Ok(())
}

/// One-shot view of the backend for scripts and pipes.
#[derive(Debug, Serialize)]
pub struct HeadlessSnapshot {
    pub api_base: String,
    pub incident_count: usize,
    pub pending_count: usize,
    pub resolved_count: usize,
    pub pending_incidents: Vec<Incident>,
    pub vehicles: Vec<Vehicle>,
    pub wind: Option<WindInfo>,
    pub generated_at: String,
}

impl HeadlessSnapshot {
    pub fn new(
        api_base: &str,
        incidents: Vec<Incident>,
        vehicles: Vec<Vehicle>,
        wind: Option<WindInfo>,
    ) -> Self {
        let pending_incidents: Vec<Incident> = incidents
            .iter()
            .filter(|incident| incident.is_pending())
            .cloned()
            .collect();
        Self {
            api_base: api_base.to_string(),
            incident_count: incidents.len(),
            pending_count: pending_incidents.len(),
            resolved_count: incidents.len() - pending_incidents.len(),
            pending_incidents,
            vehicles,
            wind,
            generated_at: chrono::Local::now().to_rfc3339(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("\nControl Room Snapshot\n");
        out.push_str("=====================\n");
        out.push_str(&format!("Backend: {}\n", self.api_base));
        out.push_str(&format!(
            "Incidents: {} ({} pending, {} resolved)\n",
            self.incident_count, self.pending_count, self.resolved_count
        ));
        out.push_str(&format!("Vehicles: {}\n", self.vehicles.len()));

        out.push_str("\nPending incidents:\n");
        for incident in &self.pending_incidents {
            out.push_str(&format!(
                "- #{} {} | x: {:.2} y: {:.2}\n",
                incident.id, incident.name, incident.location.x, incident.location.y
            ));
        }

        out.push_str("\nVehicles:\n");
        for vehicle in &self.vehicles {
            out.push_str(&format!(
                "- #{} {} | x: {:.2} y: {:.2}\n",
                vehicle.id, vehicle.name, vehicle.location.x, vehicle.location.y
            ));
        }

        out.push_str("\nWind:\n");
        match &self.wind {
            Some(wind) => out.push_str(&format!(
                "- from {:.0}° at {:.1} m/s, flowing {} ({:.0}°)\n",
                wind.wind_deg,
                wind.speed,
                wind.compass(),
                wind.flow_angle()
            )),
            None => out.push_str("- unavailable\n"),
        }
        out
    }
}

/// Run the application in headless mode (no UI)
pub async fn run_headless(config: &AppConfig, json: bool) -> Result<()> {
    let api = ApiClient::with_timeout(config.api_base.clone(), config.request_timeout);

    let (incidents, vehicles, wind) = tokio::join!(
        api.get_incidents(),
        api.get_vehicles(),
        api.get_wind_info()
    );
    let incidents = incidents.wrap_err("cannot load incidents")?;
    let vehicles = vehicles.wrap_err("cannot load vehicles")?;
    let wind = wind
        .inspect_err(|error| warn!(%error, "wind info unavailable"))
        .ok();

    let snapshot = HeadlessSnapshot::new(api.base(), incidents, vehicles, wind);
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", snapshot.to_text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use control_room_core::{IncidentStatus, Location};

    fn snapshot() -> HeadlessSnapshot {
        let incidents = vec![
            Incident {
                id: 1,
                name: "Warehouse fire".to_string(),
                status: IncidentStatus::Pending,
                location: Location::new(0.25, 0.5),
            },
            Incident {
                id: 2,
                name: "Gas leak".to_string(),
                status: IncidentStatus::Resolved,
                location: Location::new(0.75, 0.5),
            },
        ];
        let vehicles = vec![Vehicle {
            id: 7,
            name: "Ambulance".to_string(),
            location: Location::new(0.1, 0.9),
        }];
        HeadlessSnapshot::new("http://backend", incidents, vehicles, None)
    }

    #[test]
    fn counts_split_by_status() {
        let snapshot = snapshot();
        assert_eq!(snapshot.incident_count, 2);
        assert_eq!(snapshot.pending_count, 1);
        assert_eq!(snapshot.resolved_count, 1);
        assert_eq!(snapshot.pending_incidents[0].id, 1);
    }

    #[test]
    fn text_lists_pending_only() {
        let text = snapshot().to_text();
        assert!(text.contains("Incidents: 2 (1 pending, 1 resolved)"));
        assert!(text.contains("- #1 Warehouse fire | x: 0.25 y: 0.50"));
        assert!(!text.contains("Gas leak"));
        assert!(text.contains("- #7 Ambulance"));
        assert!(text.contains("- unavailable"));
    }

    #[test]
    fn json_uses_lowercase_status() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(json["pending_incidents"][0]["status"], "pending");
        assert!(json["wind"].is_null());
    }
}
