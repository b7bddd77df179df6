use crate::domain::models::{vehicle_summary, VehicleType, WaterLevel};
use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelOption {
    pub key: WaterLevel,
    pub label: &'static str,
    pub helper: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleOption {
    pub key: VehicleType,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefaults {
    pub water_level: WaterLevel,
    pub recommended_vehicles: Vec<VehicleType>,
    pub summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub levels: Vec<LevelOption>,
    pub vehicles: Vec<VehicleOption>,
    pub defaults: FormDefaults,
}

pub fn catalog() -> Catalog {
    let default_vehicles = vec![VehicleType::Jeepeta];
    Catalog {
        levels: WaterLevel::ALL
            .iter()
            .map(|level| LevelOption {
                key: *level,
                label: level.label(),
                helper: level.helper(),
                color: level.badge_color(),
            })
            .collect(),
        vehicles: VehicleType::ALL
            .iter()
            .map(|vehicle| VehicleOption {
                key: *vehicle,
                label: vehicle.label(),
            })
            .collect(),
        defaults: FormDefaults {
            water_level: WaterLevel::Yellow,
            summary: format!("Recomendado para: {}", vehicle_summary(&default_vehicles)),
            recommended_vehicles: default_vehicles,
        },
    }
}

pub fn router() -> Router {
    Router::new().route("/", get(|| async { Json(catalog()) }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contents() {
        let catalog = catalog();
        assert_eq!(catalog.levels.len(), 3);
        assert_eq!(catalog.levels[2].helper, "No cruzar");
        assert_eq!(catalog.vehicles[1].label, "Jeepeta / SUV");
        assert_eq!(catalog.defaults.water_level, WaterLevel::Yellow);
        assert_eq!(catalog.defaults.summary, "Recomendado para: Jeepeta / SUV");
    }
}
