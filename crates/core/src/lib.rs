//! Shared model for the control room dashboards: incidents, vehicles and wind,
//! the normalized ↔ geographic transform, marker and route layers.

pub mod domain;
pub mod error;
pub mod geo;
pub mod markers;
pub mod routing;
pub mod wind;

pub use domain::{Incident, IncidentDraft, IncidentStatus, Location, Vehicle, VehicleDraft};
pub use error::ValidationError;
pub use geo::{geo_to_normalized, normalized_to_geo, GeoPoint, MapFrame, Viewport};
pub use markers::{Marker, MarkerKind, MarkerLayer, Selection};
pub use routing::{plan_routes, RenderedRoute, RouteLayer, RouteRequest};
pub use wind::WindInfo;
