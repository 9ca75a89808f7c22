use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often the dashboards ask the backend for a fresh reading.
pub const WIND_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Reading served by `GET /wind-info`.
///
/// `wind_deg` is the meteorological direction (where the wind comes from);
/// `flow_angle` is where the air is moving to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindInfo {
    pub wind_deg: f64,
    pub speed: f64,
    #[serde(default)]
    pub flow_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<(f64, f64)>,
}

impl WindInfo {
    /// Flow angle as sent by the backend, or derived from `wind_deg`.
    pub fn flow_angle(&self) -> f64 {
        self.flow_angle
            .unwrap_or_else(|| flow_angle_from(self.wind_deg))
            .rem_euclid(360.0)
    }

    /// Unit vector of the flow, `(dx, dy)` with `dy` pointing north.
    pub fn flow_vector(&self) -> (f64, f64) {
        let radians = self.flow_angle().to_radians();
        (radians.sin(), radians.cos())
    }

    pub fn compass(&self) -> &'static str {
        compass_point(self.flow_angle())
    }
}

/// Meteorological direction to movement direction.
pub fn flow_angle_from(wind_deg: f64) -> f64 {
    (wind_deg + 180.0).rem_euclid(360.0)
}

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const ARROWS: [&str; 8] = ["↑", "↗", "→", "↘", "↓", "↙", "←", "↖"];

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn octant(angle: f64) -> usize {
    let normalized = angle.rem_euclid(360.0);
    ((normalized + 22.5) / 45.0).floor() as usize % 8
}

pub fn compass_point(angle: f64) -> &'static str {
    COMPASS[octant(angle)]
}

/// Single-glyph arrow pointing along `angle`, clockwise from north.
pub fn arrow_glyph(angle: f64) -> &'static str {
    ARROWS[octant(angle)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flow_is_opposite_of_meteorological_direction() {
        assert_abs_diff_eq!(flow_angle_from(0.0), 180.0);
        assert_abs_diff_eq!(flow_angle_from(270.0), 90.0);
        assert_abs_diff_eq!(flow_angle_from(359.0), 179.0);
    }

    #[test]
    fn backend_flow_angle_wins_over_derived_value() {
        let info: WindInfo =
            serde_json::from_str(r#"{"wind_deg": 90, "speed": 4.2, "flow_angle": 10}"#).unwrap();
        assert_abs_diff_eq!(info.flow_angle(), 10.0);
        assert!(info.vector.is_none());

        let derived: WindInfo = serde_json::from_str(r#"{"wind_deg": 90, "speed": 4.2}"#).unwrap();
        assert_abs_diff_eq!(derived.flow_angle(), 270.0);
    }

    #[test]
    fn accepts_vector_from_backend() {
        let info: WindInfo = serde_json::from_str(
            r#"{"wind_deg": 0, "speed": 0, "flow_angle": 180, "vector": [0.0, -1.0]}"#,
        )
        .unwrap();
        assert_eq!(info.vector, Some((0.0, -1.0)));
        let (dx, dy) = info.flow_vector();
        assert_abs_diff_eq!(dx, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dy, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn compass_and_arrow_follow_octants() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(44.0), "NE");
        assert_eq!(compass_point(190.0), "S");
        assert_eq!(compass_point(350.0), "N");
        assert_eq!(arrow_glyph(90.0), "→");
        assert_eq!(arrow_glyph(-90.0), "←");
    }
}
