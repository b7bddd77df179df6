use crate::domain::models::{FloodReport, VehicleType, WaterLevel};

pub const ROUTE_CLEAR: &str = "Ruta despejada para tu vehículo.";
pub const LOW_CAR_CAUTION: &str = "⚠️ Carro bajo: evita zonas en amarillo y rojo.";
pub const MOTORBIKE_CAUTION: &str = "⚠️ Motor: extrema precaución con charcos profundos.";
pub const GENERIC_CAUTION: &str = "⚠️ Hay zonas con acumulación de agua en tu alrededor.";

/// Crossing advice for the driver's vehicle given the active reports.
pub fn vehicle_advisory(reports: &[FloodReport], vehicle: VehicleType) -> &'static str {
    let has_risk = reports.iter().any(|r| r.water_level != WaterLevel::Green);
    if !has_risk {
        return ROUTE_CLEAR;
    }

    match vehicle {
        VehicleType::CarroBajo => LOW_CAR_CAUTION,
        VehicleType::Motor => MOTORBIKE_CAUTION,
        VehicleType::Jeepeta | VehicleType::Camion => GENERIC_CAUTION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_level(level: WaterLevel) -> FloodReport {
        FloodReport {
            id: format!("r-{}", level.as_str()),
            latitude: 18.5,
            longitude: -69.9,
            water_level: level,
            recommended_vehicles: vec![VehicleType::Camion],
            comment: None,
            photo_url: None,
            created_at: 0,
            confirms: 0,
            rejects: 0,
        }
    }

    #[test]
    fn test_clear_when_only_green() {
        let reports = vec![at_level(WaterLevel::Green), at_level(WaterLevel::Green)];
        for vehicle in VehicleType::ALL {
            assert_eq!(vehicle_advisory(&reports, vehicle), ROUTE_CLEAR);
        }
        assert_eq!(vehicle_advisory(&[], VehicleType::Motor), ROUTE_CLEAR);
    }

    #[test]
    fn test_motorbike_gets_its_own_wording() {
        let reports = vec![at_level(WaterLevel::Green), at_level(WaterLevel::Yellow)];
        let text = vehicle_advisory(&reports, VehicleType::Motor);
        assert_eq!(text, MOTORBIKE_CAUTION);
        assert_ne!(text, GENERIC_CAUTION);
    }

    #[test]
    fn test_per_vehicle_caution() {
        let reports = vec![at_level(WaterLevel::Red)];
        assert_eq!(vehicle_advisory(&reports, VehicleType::CarroBajo), LOW_CAR_CAUTION);
        assert_eq!(vehicle_advisory(&reports, VehicleType::Jeepeta), GENERIC_CAUTION);
        assert_eq!(vehicle_advisory(&reports, VehicleType::Camion), GENERIC_CAUTION);
    }
}
