use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Santo Domingo, shown when the device gives no position.
pub const DEFAULT_REGION: MapRegion = MapRegion {
    latitude: 18.4861,
    longitude: -69.9312,
    latitude_delta: 0.08,
    longitude_delta: 0.08,
};

const LOCATED_DELTA: f64 = 0.05;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    pub fn location_permission() -> Self {
        Self::new(
            "Permiso requerido",
            "Se necesita GPS para optimizar rutas en tiempo real.",
        )
    }
}

pub fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Map region for an optional device position. A missing or unusable
/// position falls back to the default centre with a permission notice.
pub fn resolve_region(position: Option<(f64, f64)>) -> (MapRegion, Option<Notice>) {
    match position {
        Some((latitude, longitude)) if valid_coordinates(latitude, longitude) => (
            MapRegion {
                latitude,
                longitude,
                latitude_delta: LOCATED_DELTA,
                longitude_delta: LOCATED_DELTA,
            },
            None,
        ),
        _ => (DEFAULT_REGION, Some(Notice::location_permission())),
    }
}
