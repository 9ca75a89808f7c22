//! Normalized map coordinates and their geographic counterparts.
//!
//! The backend stores locations on a unit square. The dashboards place that
//! square on a fixed geographic window: a center point plus an angular span
//! that covers the full `[0,1]` range on both axes.

use serde::{Deserialize, Serialize};

use crate::domain::Location;

pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 30.063_584_0,
    lng: 31.488_993_9,
};

/// Full-scale angular span of the normalized square, in degrees.
pub const DEFAULT_SPAN_DEG: f64 = 0.1;

const NORMALIZED_DECIMALS: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Where the normalized square sits on the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFrame {
    pub center: GeoPoint,
    pub span_deg: f64,
}

impl Default for MapFrame {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            span_deg: DEFAULT_SPAN_DEG,
        }
    }
}

impl MapFrame {
    pub const fn with_center(center: GeoPoint) -> Self {
        Self {
            center,
            span_deg: DEFAULT_SPAN_DEG,
        }
    }

    /// Maps a normalized location to latitude/longitude. `y` grows southwards.
    pub fn normalized_to_geo(&self, norm: Option<Location>) -> Option<GeoPoint> {
        let norm = norm?;
        if !norm.x.is_finite() || !norm.y.is_finite() {
            return None;
        }
        let lat_offset = (0.5 - norm.y) * self.span_deg;
        let lng_offset = (norm.x - 0.5) * self.span_deg;
        Some(GeoPoint {
            lat: self.center.lat + lat_offset,
            lng: self.center.lng + lng_offset,
        })
    }

    /// Inverse of [`Self::normalized_to_geo`], clamped to the unit square and
    /// rounded to four decimals.
    pub fn geo_to_normalized(&self, lat: f64, lng: f64) -> Location {
        let lat_offset = lat - self.center.lat;
        let lng_offset = lng - self.center.lng;
        let x = 0.5 + lng_offset / self.span_deg;
        let y = 0.5 - lat_offset / self.span_deg;
        let clamped = Location::new(x, y).clamped();
        Location {
            x: round_normalized(clamped.x),
            y: round_normalized(clamped.y),
        }
    }
}

fn round_normalized(value: f64) -> f64 {
    (value * NORMALIZED_DECIMALS).round() / NORMALIZED_DECIMALS
}

/// Default-frame shorthand for [`MapFrame::normalized_to_geo`].
pub fn normalized_to_geo(norm: Option<Location>) -> Option<GeoPoint> {
    MapFrame::default().normalized_to_geo(norm)
}

/// Default-frame shorthand for [`MapFrame::geo_to_normalized`].
pub fn geo_to_normalized(lat: f64, lng: f64) -> Location {
    MapFrame::default().geo_to_normalized(lat, lng)
}

pub const MIN_VIEW_SPAN_DEG: f64 = 0.006_25;
pub const MAX_VIEW_SPAN_DEG: f64 = 0.4;

/// Visible window over the map. Independent from [`MapFrame`]: zooming and
/// panning never change where the normalized square lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub span_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl Viewport {
    pub const fn for_frame(frame: &MapFrame) -> Self {
        Self {
            center: frame.center,
            span_deg: frame.span_deg,
        }
    }

    pub fn bounds(&self) -> Bounds {
        let half = self.span_deg / 2.0;
        Bounds {
            lat_min: self.center.lat - half,
            lat_max: self.center.lat + half,
            lng_min: self.center.lng - half,
            lng_max: self.center.lng + half,
        }
    }

    pub fn zoom_in(&mut self) {
        self.span_deg = (self.span_deg / 2.0).max(MIN_VIEW_SPAN_DEG);
    }

    pub fn zoom_out(&mut self) {
        self.span_deg = (self.span_deg * 2.0).min(MAX_VIEW_SPAN_DEG);
    }

    /// Moves the window by a fraction of its span. Positive `dy` pans south.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.center.lng += dx * self.span_deg;
        self.center.lat -= dy * self.span_deg;
    }

    pub fn reset(&mut self, frame: &MapFrame) {
        *self = Self::for_frame(frame);
    }

    /// Geographic point under a fractional screen position, `(0,0)` being the
    /// top-left corner of the view.
    pub fn unproject(&self, fx: f64, fy: f64) -> GeoPoint {
        let bounds = self.bounds();
        GeoPoint {
            lat: fy.mul_add(-self.span_deg, bounds.lat_max),
            lng: fx.mul_add(self.span_deg, bounds.lng_min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn center_of_square_is_frame_center() {
        let point = normalized_to_geo(Some(Location::new(0.5, 0.5))).unwrap();
        assert_abs_diff_eq!(point.lat, DEFAULT_CENTER.lat, epsilon = 1e-12);
        assert_abs_diff_eq!(point.lng, DEFAULT_CENTER.lng, epsilon = 1e-12);
    }

    #[test]
    fn y_axis_is_inverted() {
        let north = normalized_to_geo(Some(Location::new(0.5, 0.0))).unwrap();
        let south = normalized_to_geo(Some(Location::new(0.5, 1.0))).unwrap();
        assert!(north.lat > south.lat);
        assert_abs_diff_eq!(north.lat - south.lat, DEFAULT_SPAN_DEG, epsilon = 1e-12);
    }

    #[test]
    fn missing_input_maps_to_none() {
        assert!(normalized_to_geo(None).is_none());
        assert!(normalized_to_geo(Some(Location::new(f64::NAN, 0.2))).is_none());
    }

    #[test]
    fn round_trip_holds_inside_the_square() {
        let steps = 37;
        for i in 1..steps {
            for j in 1..steps {
                let norm = Location::new(f64::from(i) / f64::from(steps), f64::from(j) / f64::from(steps));
                let geo = normalized_to_geo(Some(norm)).unwrap();
                let back = geo_to_normalized(geo.lat, geo.lng);
                assert_abs_diff_eq!(back.x, norm.x, epsilon = 5e-5 + 1e-9);
                assert_abs_diff_eq!(back.y, norm.y, epsilon = 5e-5 + 1e-9);
            }
        }
    }

    #[test]
    fn four_decimal_values_round_trip_exactly() {
        let norm = Location::new(0.1234, 0.9876);
        let geo = normalized_to_geo(Some(norm)).unwrap();
        assert_eq!(geo_to_normalized(geo.lat, geo.lng), norm);
    }

    #[test]
    fn corners_clamp_after_transform() {
        let origin = normalized_to_geo(Some(Location::new(0.0, 0.0))).unwrap();
        assert_eq!(geo_to_normalized(origin.lat, origin.lng), Location::new(0.0, 0.0));

        let far = normalized_to_geo(Some(Location::new(1.0, 1.0))).unwrap();
        assert_eq!(geo_to_normalized(far.lat, far.lng), Location::new(1.0, 1.0));

        let outside = geo_to_normalized(DEFAULT_CENTER.lat + 1.0, DEFAULT_CENTER.lng - 1.0);
        assert_eq!(outside, Location::new(0.0, 0.0));
    }

    #[test]
    fn custom_center_shifts_the_square() {
        let frame = MapFrame::with_center(GeoPoint::new(10.0, 20.0));
        let point = frame.normalized_to_geo(Some(Location::new(1.0, 0.0))).unwrap();
        assert_abs_diff_eq!(point.lat, 10.05, epsilon = 1e-12);
        assert_abs_diff_eq!(point.lng, 20.05, epsilon = 1e-12);
    }

    #[test]
    fn viewport_unproject_matches_frame_on_default_view() {
        let frame = MapFrame::default();
        let view = Viewport::for_frame(&frame);
        let geo = view.unproject(0.25, 0.75);
        let norm = frame.geo_to_normalized(geo.lat, geo.lng);
        assert_eq!(norm, Location::new(0.25, 0.75));
    }

    #[test]
    fn viewport_zoom_is_bounded_and_reset_restores() {
        let frame = MapFrame::default();
        let mut view = Viewport::for_frame(&frame);
        for _ in 0..10 {
            view.zoom_in();
        }
        assert_abs_diff_eq!(view.span_deg, MIN_VIEW_SPAN_DEG);
        for _ in 0..10 {
            view.zoom_out();
        }
        assert_abs_diff_eq!(view.span_deg, MAX_VIEW_SPAN_DEG);

        view.pan(0.5, 0.5);
        assert!(view.center.lat < frame.center.lat);
        assert!(view.center.lng > frame.center.lng);

        view.reset(&frame);
        assert_eq!(view, Viewport::for_frame(&frame));
    }
}
