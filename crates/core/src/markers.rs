//! Marker bookkeeping for the map.
//!
//! The layer never diffs: every refresh drops every marker and rebuilds the
//! set from the current incident and vehicle lists.

use crate::domain::{Incident, Location, Vehicle};
use crate::geo::{GeoPoint, MapFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Incident { id: i64 },
    Vehicle { id: i64 },
    SelectedIncident,
    SelectedVehicle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: GeoPoint,
    pub label: String,
    pub popup: Vec<String>,
}

/// Locations picked on the map while assigning, one per record kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Selection {
    pub incident: Option<Location>,
    pub vehicle: Option<Location>,
}

impl Selection {
    pub const fn both(&self) -> Option<(Location, Location)> {
        match (self.vehicle, self.incident) {
            (Some(vehicle), Some(incident)) => Some((vehicle, incident)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every marker and re-creates them from the given lists.
    pub fn rebuild(
        &mut self,
        frame: &MapFrame,
        incidents: &[Incident],
        vehicles: &[Vehicle],
        selection: Selection,
    ) {
        self.markers.clear();

        for incident in incidents.iter().filter(|incident| incident.is_pending()) {
            let Some(position) = frame.normalized_to_geo(Some(incident.location.clamped())) else {
                continue;
            };
            self.markers.push(Marker {
                kind: MarkerKind::Incident { id: incident.id },
                position,
                label: incident.name.clone(),
                popup: vec![
                    format!("Incident: {}", incident.name),
                    format!("Status: {}", incident.status.as_str()),
                    coordinates_line(incident.location),
                ],
            });
        }

        for vehicle in vehicles {
            let Some(position) = frame.normalized_to_geo(Some(vehicle.location.clamped())) else {
                continue;
            };
            self.markers.push(Marker {
                kind: MarkerKind::Vehicle { id: vehicle.id },
                position,
                label: vehicle.name.clone(),
                popup: vec![
                    format!("Vehicle: {}", vehicle.name),
                    coordinates_line(vehicle.location),
                ],
            });
        }

        if let Some(location) = selection.incident {
            if let Some(position) = frame.normalized_to_geo(Some(location.clamped())) {
                self.markers.push(Marker {
                    kind: MarkerKind::SelectedIncident,
                    position,
                    label: "Selected incident location".to_string(),
                    popup: vec![coordinates_line(location)],
                });
            }
        }

        if let Some(location) = selection.vehicle {
            if let Some(position) = frame.normalized_to_geo(Some(location.clamped())) {
                self.markers.push(Marker {
                    kind: MarkerKind::SelectedVehicle,
                    position,
                    label: "Selected vehicle location".to_string(),
                    popup: vec![coordinates_line(location)],
                });
            }
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn count_where(&self, predicate: impl Fn(&MarkerKind) -> bool) -> usize {
        self.markers.iter().filter(|marker| predicate(&marker.kind)).count()
    }

    pub fn incident_count(&self) -> usize {
        self.count_where(|kind| matches!(kind, MarkerKind::Incident { .. }))
    }

    pub fn vehicle_count(&self) -> usize {
        self.count_where(|kind| matches!(kind, MarkerKind::Vehicle { .. }))
    }
}

fn coordinates_line(location: Location) -> String {
    format!("Coordinates: {:.3}, {:.3}", location.x, location.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IncidentStatus;

    fn incident(id: i64, status: IncidentStatus) -> Incident {
        Incident {
            id,
            name: format!("incident-{id}"),
            status,
            location: Location::new(0.2, 0.3),
        }
    }

    fn vehicle(id: i64) -> Vehicle {
        Vehicle {
            id,
            name: format!("unit-{id}"),
            location: Location::new(0.6, 0.6),
        }
    }

    #[test]
    fn only_pending_incidents_are_rendered() {
        let mut layer = MarkerLayer::new();
        let incidents = [
            incident(1, IncidentStatus::Pending),
            incident(2, IncidentStatus::Resolved),
        ];
        layer.rebuild(&MapFrame::default(), &incidents, &[], Selection::default());

        assert_eq!(layer.markers().len(), 1);
        assert_eq!(layer.markers()[0].kind, MarkerKind::Incident { id: 1 });
        assert_eq!(layer.markers()[0].popup[1], "Status: pending");
    }

    #[test]
    fn rebuild_replaces_previous_markers() {
        let frame = MapFrame::default();
        let mut layer = MarkerLayer::new();
        layer.rebuild(
            &frame,
            &[incident(1, IncidentStatus::Pending)],
            &[vehicle(1), vehicle(2)],
            Selection::default(),
        );
        assert_eq!(layer.incident_count(), 1);
        assert_eq!(layer.vehicle_count(), 2);

        layer.rebuild(&frame, &[], &[vehicle(3)], Selection::default());
        assert_eq!(layer.incident_count(), 0);
        assert_eq!(layer.vehicle_count(), 1);
        assert_eq!(layer.markers()[0].kind, MarkerKind::Vehicle { id: 3 });

        layer.rebuild(&frame, &[], &[vehicle(3)], Selection::default());
        assert_eq!(layer.markers().len(), 1);
    }

    #[test]
    fn selections_get_their_own_markers() {
        let mut layer = MarkerLayer::new();
        let selection = Selection {
            incident: Some(Location::new(0.1, 0.1)),
            vehicle: Some(Location::new(0.9, 0.9)),
        };
        layer.rebuild(&MapFrame::default(), &[], &[], selection);

        let kinds: Vec<_> = layer.iter().map(|marker| marker.kind).collect();
        assert_eq!(
            kinds,
            vec![MarkerKind::SelectedIncident, MarkerKind::SelectedVehicle]
        );
        assert_eq!(layer.markers()[0].popup[0], "Coordinates: 0.100, 0.100");
    }

    #[test]
    fn out_of_range_locations_are_clamped_before_rendering() {
        let mut layer = MarkerLayer::new();
        let mut stray = vehicle(9);
        stray.location = Location::new(2.0, -1.0);
        let frame = MapFrame::default();
        layer.rebuild(&frame, &[], &[stray], Selection::default());

        let corner = frame.normalized_to_geo(Some(Location::new(1.0, 0.0))).unwrap();
        assert_eq!(layer.markers()[0].position, corner);
    }
}
