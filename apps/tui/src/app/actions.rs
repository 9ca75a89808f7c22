//! Backend round trips started from the UI.
//!
//! Each action validates what it can on the spot, then hands the request to a
//! spawned task and returns. The task reports back through an [`AppEvent`] and
//! the matching `*_loaded` / `record_*` handler folds the outcome into the
//! state. Failures are logged and shown inline, never propagated.

use control_room_core::{Incident, Vehicle};
use tracing::{error, info, warn};

use crate::api::ApiError;
use crate::app::panels::RecordKind;
use crate::app::state::{App, AssignMode};
use crate::event::{spawn_request, AppEvent};

impl App {
    /// Reloads both lists in the background; on failure the cached copies stay.
    pub fn refresh(&mut self) {
        let api = self.api.clone();
        spawn_request(&self.events, async move {
            let (incidents, vehicles) = tokio::join!(api.get_incidents(), api.get_vehicles());
            AppEvent::RecordsLoaded(match (incidents, vehicles) {
                (Ok(incidents), Ok(vehicles)) => Ok((incidents, vehicles)),
                (Err(err), _) | (_, Err(err)) => Err(err),
            })
        });
    }

    pub(crate) fn records_loaded(
        &mut self,
        result: Result<(Vec<Incident>, Vec<Vehicle>), ApiError>,
    ) {
        match result {
            Ok((incidents, vehicles)) => {
                info!(
                    incidents = incidents.len(),
                    vehicles = vehicles.len(),
                    "records refreshed"
                );
                self.set_records(incidents, vehicles);
            }
            Err(err) => {
                warn!(error = %err, "refresh failed");
                self.status_message = format!("Failed to refresh: {}", err.user_message());
            }
        }
    }

    /// Submits the incident form: update while editing, create otherwise.
    pub fn submit_incident_form(&mut self) {
        let edited = self.incident_panel.editing;
        let draft = self.incident_panel.draft().clone();
        if let Err(err) = draft.validated() {
            self.report_form_error(RecordKind::Incident, &err.into());
            return;
        }

        self.status_message = "Saving incident...".to_string();
        let api = self.api.clone();
        spawn_request(&self.events, async move {
            let result = match edited {
                Some(id) => api.update_incident(id, &draft).await.map(|_| id),
                None => api.create_incident(&draft).await.map(|incident| incident.id),
            };
            AppEvent::Saved {
                kind: RecordKind::Incident,
                edited,
                result,
            }
        });
    }

    pub fn submit_vehicle_form(&mut self) {
        let edited = self.vehicle_panel.editing;
        let draft = self.vehicle_panel.draft().clone();
        if let Err(err) = draft.validated() {
            self.report_form_error(RecordKind::Vehicle, &err.into());
            return;
        }

        if edited.is_none() {
            self.vehicle_panel.last_message = "Creating vehicle...".to_string();
        }
        let api = self.api.clone();
        spawn_request(&self.events, async move {
            let result = match edited {
                Some(id) => api.update_vehicle(id, &draft).await.map(|_| id),
                None => api.create_vehicle(&draft).await.map(|vehicle| vehicle.id),
            };
            AppEvent::Saved {
                kind: RecordKind::Vehicle,
                edited,
                result,
            }
        });
    }

    pub(crate) fn record_saved(
        &mut self,
        kind: RecordKind,
        edited: Option<i64>,
        result: Result<i64, ApiError>,
    ) {
        let id = match result {
            Ok(id) => id,
            Err(err) => {
                if kind == RecordKind::Vehicle && edited.is_none() {
                    self.vehicle_panel.last_message = format!("Failed: {}", err.user_message());
                }
                self.report_form_error(kind, &err);
                return;
            }
        };

        if edited.is_some() {
            info!(id, kind = kind.label(), "record updated");
            match kind {
                RecordKind::Incident if self.incident_panel.editing == Some(id) => {
                    self.incident_panel.cancel_edit();
                }
                RecordKind::Vehicle if self.vehicle_panel.editing == Some(id) => {
                    self.vehicle_panel.cancel_edit();
                }
                _ => {}
            }
            self.flash_status(format!("{} {id} updated", title(kind)));
        } else {
            info!(id, kind = kind.label(), "record created");
            match kind {
                RecordKind::Incident => {
                    self.incident_panel.reset_create();
                    self.incident_panel.nav.close_form();
                }
                RecordKind::Vehicle => {
                    self.vehicle_panel.reset_create();
                    self.vehicle_panel.nav.close_form();
                    self.vehicle_panel.last_message = format!("Created vehicle id: {id}");
                }
            }
            self.finish_create(kind);
            self.flash_status(format!("Created {} id: {id}", kind.label()));
        }
        self.refresh();
    }

    pub fn delete_selected_incident(&mut self) {
        if let Some(id) = self.selected_incident().map(|incident| incident.id) {
            self.delete_record(RecordKind::Incident, id);
        }
    }

    pub fn delete_selected_vehicle(&mut self) {
        if let Some(id) = self.selected_vehicle().map(|vehicle| vehicle.id) {
            self.delete_record(RecordKind::Vehicle, id);
        }
    }

    fn delete_record(&mut self, kind: RecordKind, id: i64) {
        let api = self.api.clone();
        spawn_request(&self.events, async move {
            let result = match kind {
                RecordKind::Incident => api.delete_incident(id).await,
                RecordKind::Vehicle => api.delete_vehicle(id).await,
            };
            AppEvent::Deleted { kind, id, result }
        });
    }

    pub(crate) fn record_deleted(&mut self, kind: RecordKind, id: i64, result: Result<(), ApiError>) {
        if let Err(err) = result {
            error!(id, kind = kind.label(), error = %err, "delete failed");
            self.status_message = format!("Failed: {}", err.user_message());
            return;
        }

        info!(id, kind = kind.label(), "record deleted");
        match kind {
            RecordKind::Incident if self.incident_panel.editing == Some(id) => {
                self.incident_panel.cancel_edit();
            }
            RecordKind::Vehicle if self.vehicle_panel.editing == Some(id) => {
                self.vehicle_panel.cancel_edit();
            }
            _ => {}
        }
        self.status_message = format!("Deleted {} {id}", kind.label());
        self.refresh();
    }

    /// `GET /vehicles` as a connectivity check.
    pub fn test_backend(&mut self) {
        self.backend_check = Some("Testing...".to_string());
        let api = self.api.clone();
        spawn_request(&self.events, async move {
            AppEvent::BackendChecked(api.get_vehicles().await.map(|vehicles| vehicles.len()))
        });
    }

    pub(crate) fn backend_checked(&mut self, result: Result<usize, ApiError>) {
        let text = match result {
            Ok(count) => format!("OK — received {count} vehicles"),
            Err(err) => {
                warn!(error = %err, "backend test failed");
                format!("Failed: {}", err.user_message())
            }
        };
        self.backend_check = Some(text);
    }

    /// A successful create drops that kind's pick and ends assign mode.
    fn finish_create(&mut self, kind: RecordKind) {
        match kind {
            RecordKind::Incident => self.selection.incident = None,
            RecordKind::Vehicle => self.selection.vehicle = None,
        }
        self.assign_mode = AssignMode::Off;
        self.refresh_map();
    }

    fn report_form_error(&mut self, kind: RecordKind, err: &ApiError) {
        let message = err.user_message();
        if err.is_validation() {
            match kind {
                RecordKind::Incident => *self.incident_panel.error_mut() = Some(message),
                RecordKind::Vehicle => *self.vehicle_panel.error_mut() = Some(message),
            }
            return;
        }
        error!(kind = kind.label(), error = %err, "saving failed");
        self.status_message = format!("Failed: {message}");
    }
}

const fn title(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Incident => "Incident",
        RecordKind::Vehicle => "Vehicle",
    }
}
