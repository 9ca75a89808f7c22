use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A point on the normalized `[0,1]×[0,1]` map square. `y = 0` is the north edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the location with both axes clamped to `[0,1]`. NaN collapses to 0.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    #[default]
    Pending,
    Resolved,
}

impl IncidentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Resolved => "Resolved",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Resolved,
            Self::Resolved => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    pub name: String,
    pub status: IncidentStatus,
    pub location: Location,
}

impl Incident {
    pub fn is_pending(&self) -> bool {
        self.status == IncidentStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub name: String,
    pub location: Location,
}

/// Body of `POST /incidents` and `PUT /incidents/:id`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IncidentDraft {
    pub name: String,
    pub status: IncidentStatus,
    pub location: Location,
}

impl IncidentDraft {
    pub fn from_incident(incident: &Incident) -> Self {
        Self {
            name: incident.name.clone(),
            status: incident.status,
            location: incident.location,
        }
    }

    /// Checks the draft and returns the body that goes on the wire.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        require_name(&self.name, "Incident")?;
        Ok(Self {
            name: self.name.clone(),
            status: self.status,
            location: self.location.clamped(),
        })
    }
}

/// Body of `POST /vehicles` and `PUT /vehicles/:id`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleDraft {
    pub name: String,
    pub location: Location,
}

impl VehicleDraft {
    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            name: vehicle.name.clone(),
            location: vehicle.location,
        }
    }

    pub fn validated(&self) -> Result<Self, ValidationError> {
        require_name(&self.name, "Vehicle")?;
        Ok(Self {
            name: self.name.clone(),
            location: self.location.clamped(),
        })
    }
}

fn require_name(name: &str, kind: &'static str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::NameRequired { kind });
    }
    Ok(())
}
