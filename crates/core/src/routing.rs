//! Vehicle-to-incident routes.
//!
//! Planning decides which (vehicle, incident) pairs need a route, the OSRM
//! types decode the public routing API, and [`RouteLayer`] holds what is on the
//! map. Fetching lives in the front ends; this module never does I/O.

use serde::Deserialize;

use crate::domain::{Incident, Vehicle};
use crate::geo::{GeoPoint, MapFrame};
use crate::markers::Selection;

pub const DEFAULT_ROUTING_BASE: &str = "https://router.project-osrm.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const ROUTE_PALETTE: [Rgb; 5] = [
    Rgb(0x3b, 0x82, 0xf6),
    Rgb(0x8b, 0x5c, 0xf6),
    Rgb(0x10, 0xb9, 0x81),
    Rgb(0xf5, 0x9e, 0x0b),
    Rgb(0xef, 0x44, 0x44),
];
pub const SELECTED_ROUTE_COLOR: Rgb = Rgb(0x10, 0xb9, 0x81);
pub const FALLBACK_ROUTE_COLOR: Rgb = Rgb(0x94, 0xa3, 0xb8);

/// Dash length as a fraction of the visible span.
pub const DASH_FRACTION: f64 = 1.0 / 60.0;
const MAX_DASHES_PER_SEGMENT: usize = 4096;

/// Palette entry for a vehicle, stable across refreshes.
pub fn vehicle_color(vehicle_id: i64) -> Rgb {
    let len = i64::try_from(ROUTE_PALETTE.len()).unwrap_or(i64::MAX);
    let index = usize::try_from(vehicle_id.rem_euclid(len)).unwrap_or_default();
    ROUTE_PALETTE[index]
}

/// Splits `from..to` into the visible pieces of a dashed line, dashes and
/// gaps both `dash` long. A non-positive dash yields the whole segment.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn dash_segment(from: GeoPoint, to: GeoPoint, dash: f64) -> Vec<(GeoPoint, GeoPoint)> {
    if !(dash.is_finite() && dash > 0.0) {
        return vec![(from, to)];
    }
    let length = (to.lng - from.lng).hypot(to.lat - from.lat);
    let pieces = ((length / dash).ceil() as usize).clamp(1, MAX_DASHES_PER_SEGMENT);
    let at = |t: f64| {
        GeoPoint::new(
            (to.lat - from.lat).mul_add(t, from.lat),
            (to.lng - from.lng).mul_add(t, from.lng),
        )
    };
    (0..pieces)
        .step_by(2)
        .map(|piece| {
            let t0 = piece as f64 / pieces as f64;
            let t1 = ((piece + 1) as f64 / pieces as f64).min(1.0);
            (at(t0), at(t1))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub color: Rgb,
    pub label: String,
}

impl RouteRequest {
    /// OSRM driving route URL. OSRM expects `lng,lat` ordering.
    pub fn url(&self, base: &str) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            base.trim_end_matches('/'),
            self.from.lng,
            self.from.lat,
            self.to.lng,
            self.to.lat
        )
    }
}

/// Routes to request for the current map state. With `all_routes` every
/// vehicle is paired with every pending incident; otherwise a single route is
/// planned once both a vehicle and an incident location are selected.
pub fn plan_routes(
    frame: &MapFrame,
    all_routes: bool,
    incidents: &[Incident],
    vehicles: &[Vehicle],
    selection: Selection,
) -> Vec<RouteRequest> {
    if all_routes {
        let mut requests = Vec::new();
        for incident in incidents.iter().filter(|incident| incident.is_pending()) {
            let Some(to) = frame.normalized_to_geo(Some(incident.location.clamped())) else {
                continue;
            };
            for vehicle in vehicles {
                let Some(from) = frame.normalized_to_geo(Some(vehicle.location.clamped())) else {
                    continue;
                };
                requests.push(RouteRequest {
                    from,
                    to,
                    color: vehicle_color(vehicle.id),
                    label: format!("{} → {}", vehicle.name, incident.name),
                });
            }
        }
        return requests;
    }

    let Some((vehicle, incident)) = selection.both() else {
        return Vec::new();
    };
    let from = frame.normalized_to_geo(Some(vehicle.clamped()));
    let to = frame.normalized_to_geo(Some(incident.clamped()));
    match (from, to) {
        (Some(from), Some(to)) => vec![RouteRequest {
            from,
            to,
            color: SELECTED_ROUTE_COLOR,
            label: "Selected".to_string(),
        }],
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsrmRoute {
    pub geometry: OsrmGeometry,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsrmGeometry {
    /// GeoJSON `[lng, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSource {
    Osrm,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRoute {
    pub label: String,
    pub path: Vec<GeoPoint>,
    pub color: Rgb,
    pub dashed: bool,
    pub distance_km: Option<f64>,
    pub duration_min: Option<u64>,
    pub source: RouteSource,
}

impl RenderedRoute {
    /// Straight dashed line between the two endpoints.
    pub fn fallback(request: &RouteRequest, reason: impl Into<String>) -> Self {
        Self {
            label: request.label.clone(),
            path: vec![request.from, request.to],
            color: FALLBACK_ROUTE_COLOR,
            dashed: true,
            distance_km: None,
            duration_min: None,
            source: RouteSource::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn from_osrm(request: &RouteRequest, response: &OsrmResponse) -> Self {
        if response.code != "Ok" {
            return Self::fallback(request, format!("no route found ({})", response.code));
        }
        let Some(route) = response.routes.first() else {
            return Self::fallback(request, "no route found (empty route list)");
        };
        let path: Vec<GeoPoint> = route
            .geometry
            .coordinates
            .iter()
            .map(|[lng, lat]| GeoPoint::new(*lat, *lng))
            .collect();
        if path.len() < 2 {
            return Self::fallback(request, "route geometry has fewer than two points");
        }

        Self {
            label: request.label.clone(),
            path,
            color: request.color,
            dashed: true,
            distance_km: Some(round_km(route.distance)),
            duration_min: Some(minutes_rounded_up(route.duration)),
            source: RouteSource::Osrm,
        }
    }

    /// Turns a fetch result into a drawable route; any error becomes the fallback.
    pub fn resolve<E: std::fmt::Display>(
        request: &RouteRequest,
        result: Result<OsrmResponse, E>,
    ) -> Self {
        match result {
            Ok(response) => Self::from_osrm(request, &response),
            Err(error) => Self::fallback(request, error.to_string()),
        }
    }

    pub const fn is_fallback(&self) -> bool {
        matches!(self.source, RouteSource::Fallback { .. })
    }

    /// Line pieces to draw at the given visible span; dashed routes are split
    /// with [`dash_segment`].
    pub fn strokes(&self, span_deg: f64) -> Vec<(GeoPoint, GeoPoint)> {
        self.path
            .windows(2)
            .flat_map(|pair| {
                if self.dashed {
                    dash_segment(pair[0], pair[1], span_deg * DASH_FRACTION)
                } else {
                    vec![(pair[0], pair[1])]
                }
            })
            .collect()
    }

    /// Text shown next to the route start, e.g. `"3.42 km"`.
    pub fn distance_label(&self) -> Option<String> {
        self.distance_km.map(|km| format!("{km:.2} km"))
    }
}

fn round_km(meters: f64) -> f64 {
    (meters / 10.0).round() / 100.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn minutes_rounded_up(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds / 60.0).ceil() as u64
    } else {
        0
    }
}

/// Routes currently drawn on the map.
///
/// Every redraw opens a new generation. Results are tagged with the generation
/// they were requested for and anything older than the current one is dropped,
/// so a slow response can never paint over a newer selection.
#[derive(Debug, Clone, Default)]
pub struct RouteLayer {
    generation: u64,
    routes: Vec<RenderedRoute>,
    pending: usize,
}

impl RouteLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the layer and opens a generation expecting `expected` results.
    pub fn begin(&mut self, expected: usize) -> u64 {
        self.generation += 1;
        self.routes.clear();
        self.pending = expected;
        self.generation
    }

    pub fn clear(&mut self) {
        self.begin(0);
    }

    /// Adds a resolved route; returns `false` if it belongs to a stale generation.
    pub fn accept(&mut self, generation: u64, route: RenderedRoute) -> bool {
        if generation != self.generation {
            return false;
        }
        self.pending = self.pending.saturating_sub(1);
        self.routes.push(route);
        true
    }

    pub fn routes(&self) -> &[RenderedRoute] {
        &self.routes
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
