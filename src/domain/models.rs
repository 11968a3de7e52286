use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `(latitude, longitude)` pair in degrees.
///
/// Serialized as a `[lat, lng]` array so settings files read the same way the map
/// layer expects its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.lat, point.lng]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub speed_kmph: f64,
    pub refresh_interval_seconds: f64,
    /// Multiplier turning the nominal speed into the simulated speed.
    pub speed_scale_factor: f64,
}

impl SimulationConfig {
    pub fn effective_speed_kmph(&self) -> f64 {
        self.speed_kmph * self.speed_scale_factor
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub rotation_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStyle {
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub polyline_color: String,
    pub start_icon: MarkerIcon,
    pub end_icon: MarkerIcon,
    pub moving_icon: MarkerIcon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSettings {
    pub schema_version: u8,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub simulation: SimulationConfig,
    pub map: MapStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEvent {
    pub run_id: String,
    pub step: u64,
    pub position: GeoPoint,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub emitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl AppError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed_kmph: 20.0,
            refresh_interval_seconds: 0.5,
            speed_scale_factor: 250.0,
        }
    }
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            zoom: 13,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            polyline_color: "blue".to_string(),
            start_icon: MarkerIcon {
                url: "assets/icons/start-icon.png".to_string(),
                width: 32,
                height: 32,
                rotation_deg: 0.0,
            },
            end_icon: MarkerIcon {
                url: "assets/icons/end-icon.png".to_string(),
                width: 32,
                height: 32,
                rotation_deg: 0.0,
            },
            moving_icon: MarkerIcon {
                url: "assets/icons/moving-icon.png".to_string(),
                width: 14,
                height: 78,
                rotation_deg: 65.0,
            },
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            schema_version: 1,
            start: GeoPoint::new(22.1696, 91.4996),
            end: GeoPoint::new(22.2637, 91.7159),
            simulation: SimulationConfig::default(),
            map: MapStyle::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, SimulationSettings};

    #[test]
    fn geo_point_serializes_as_lat_lng_array() {
        let raw = serde_json::to_string(&GeoPoint::new(22.1696, 91.4996)).unwrap();
        assert_eq!(raw, "[22.1696,91.4996]");
        let point: GeoPoint = serde_json::from_str("[22.2637,91.7159]").unwrap();
        assert_eq!(point, GeoPoint::new(22.2637, 91.7159));
    }

    #[test]
    fn out_of_range_points_are_invalid() {
        assert!(GeoPoint::new(22.1696, 91.4996).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn default_settings_use_camel_case_keys() {
        let value = serde_json::to_value(SimulationSettings::default()).unwrap();
        assert_eq!(value["schemaVersion"], 1);
        assert_eq!(value["simulation"]["speedKmph"], 20.0);
        assert_eq!(value["simulation"]["speedScaleFactor"], 250.0);
        assert_eq!(value["map"]["movingIcon"]["rotationDeg"], 65.0);
    }
}
