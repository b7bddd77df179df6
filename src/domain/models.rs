use serde::{Deserialize, Serialize};

/// How deep the water is at a reported spot.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WaterLevel {
    Green,
    Yellow,
    Red,
}

impl WaterLevel {
    pub const ALL: [WaterLevel; 3] = [WaterLevel::Green, WaterLevel::Yellow, WaterLevel::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }

    /// Option label on the report form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Green => "🟢 Verde",
            Self::Yellow => "🟡 Amarillo",
            Self::Red => "🔴 Rojo",
        }
    }

    pub fn helper(&self) -> &'static str {
        match self {
            Self::Green => "Cruce seguro",
            Self::Yellow => "Cruce con precaución",
            Self::Red => "No cruzar",
        }
    }

    /// Text inside the coloured badge of a report card.
    pub fn badge_text(&self) -> &'static str {
        match self {
            Self::Green => "🟢 Se cruza sin riesgo",
            Self::Yellow => "🟡 Cruzar con precaución",
            Self::Red => "🔴 No cruzar",
        }
    }

    pub fn badge_color(&self) -> &'static str {
        match self {
            Self::Green => "#22c55e",
            Self::Yellow => "#facc15",
            Self::Red => "#ef4444",
        }
    }

    // Map pins use a darker yellow than the badge.
    pub fn pin_color(&self) -> &'static str {
        match self {
            Self::Green => "#22c55e",
            Self::Yellow => "#eab308",
            Self::Red => "#ef4444",
        }
    }
}

impl TryFrom<&str> for WaterLevel {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "green" | "verde" => Ok(WaterLevel::Green),
            "yellow" | "amarillo" => Ok(WaterLevel::Yellow),
            "red" | "rojo" => Ok(WaterLevel::Red),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VehicleType {
    /// Low-clearance car.
    #[default]
    #[serde(rename = "carro-bajo")]
    CarroBajo,
    #[serde(rename = "jeepeta")]
    Jeepeta,
    #[serde(rename = "camion")]
    Camion,
    #[serde(rename = "motor")]
    Motor,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [
        VehicleType::CarroBajo,
        VehicleType::Jeepeta,
        VehicleType::Camion,
        VehicleType::Motor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CarroBajo => "carro-bajo",
            Self::Jeepeta => "jeepeta",
            Self::Camion => "camion",
            Self::Motor => "motor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CarroBajo => "Carro bajo",
            Self::Jeepeta => "Jeepeta / SUV",
            Self::Camion => "Camión",
            Self::Motor => "Motor",
        }
    }
}

impl TryFrom<&str> for VehicleType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "carro-bajo" | "carro_bajo" | "carrobajo" => Ok(VehicleType::CarroBajo),
            "jeepeta" | "suv" => Ok(VehicleType::Jeepeta),
            "camion" | "camión" | "truck" => Ok(VehicleType::Camion),
            "motor" | "moto" | "motorbike" => Ok(VehicleType::Motor),
            _ => Err(()),
        }
    }
}

/// Comma separated labels, e.g. "Carro bajo, Motor".
pub fn vehicle_summary(vehicles: &[VehicleType]) -> String {
    vehicles
        .iter()
        .map(|v| v.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Confirm,
    Reject,
}

impl VoteChoice {
    /// Bumps exactly one tally.
    pub fn apply(self, confirms: &mut u32, rejects: &mut u32) {
        match self {
            VoteChoice::Confirm => *confirms = confirms.saturating_add(1),
            VoteChoice::Reject => *rejects = rejects.saturating_add(1),
        }
    }

    /// The tally this choice counts towards.
    pub fn tally(self, report: &FloodReport) -> u32 {
        match self {
            VoteChoice::Confirm => report.confirms,
            VoteChoice::Reject => report.rejects,
        }
    }
}

/// An active report as the screens see it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloodReport {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub water_level: WaterLevel,
    pub recommended_vehicles: Vec<VehicleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub confirms: u32,
    pub rejects: u32,
}

/// A report document exactly as the store delivers it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub water_level: WaterLevel,
    #[serde(default)]
    pub recommended_vehicles: Vec<VehicleType>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub confirms: u32,
    #[serde(default)]
    pub rejects: u32,
}

impl RawReport {
    pub fn into_report(self, now_ms: i64) -> FloodReport {
        FloodReport {
            id: self.id,
            latitude: self.latitude,
            longitude: self.longitude,
            water_level: self.water_level,
            recommended_vehicles: self.recommended_vehicles,
            comment: self.comment,
            photo_url: self.photo_url,
            created_at: self.created_at.unwrap_or(now_ms),
            confirms: self.confirms,
            rejects: self.rejects,
        }
    }
}

impl From<FloodReport> for RawReport {
    fn from(report: FloodReport) -> Self {
        RawReport {
            id: report.id,
            latitude: report.latitude,
            longitude: report.longitude,
            water_level: report.water_level,
            recommended_vehicles: report.recommended_vehicles,
            comment: report.comment,
            photo_url: report.photo_url,
            created_at: Some(report.created_at),
            confirms: report.confirms,
            rejects: report.rejects,
        }
    }
}

/// What a driver submits from the report form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    pub water_level: WaterLevel,
    pub recommended_vehicles: Vec<VehicleType>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub dark_mode: bool,
    pub raining_alert: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            raining_alert: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_wire_names() {
        let json = serde_json::to_string(&VehicleType::CarroBajo).unwrap();
        assert_eq!(json, "\"carro-bajo\"");
        let parsed: VehicleType = serde_json::from_str("\"motor\"").unwrap();
        assert_eq!(parsed, VehicleType::Motor);
        assert_eq!(VehicleType::default(), VehicleType::CarroBajo);
    }

    #[test]
    fn test_try_from_aliases() {
        assert_eq!(WaterLevel::try_from(" Rojo "), Ok(WaterLevel::Red));
        assert_eq!(VehicleType::try_from("camión"), Ok(VehicleType::Camion));
        assert!(WaterLevel::try_from("purple").is_err());
    }

    #[test]
    fn test_raw_report_defaults_missing_fields() {
        let raw: RawReport = serde_json::from_str(
            r#"{"id":"x","latitude":18.5,"longitude":-69.9,"waterLevel":"yellow"}"#,
        )
        .unwrap();
        assert_eq!(raw.confirms, 0);
        assert_eq!(raw.rejects, 0);
        assert!(raw.created_at.is_none());

        let report = raw.into_report(1_000);
        assert_eq!(report.created_at, 1_000);
    }

    #[test]
    fn test_vote_choice_touches_one_tally() {
        let (mut confirms, mut rejects) = (2, 5);
        VoteChoice::Reject.apply(&mut confirms, &mut rejects);
        assert_eq!((confirms, rejects), (2, 6));
    }

    #[test]
    fn test_vehicle_summary() {
        assert_eq!(
            vehicle_summary(&[VehicleType::Jeepeta, VehicleType::Camion]),
            "Jeepeta / SUV, Camión"
        );
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(settings.dark_mode);
        assert!(!settings.raining_alert);
    }
}
