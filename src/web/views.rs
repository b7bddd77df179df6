use crate::domain::lifecycle::confidence;
use crate::domain::models::{vehicle_summary, FloodReport, WaterLevel};
use crate::time_utils::format_report_time;
use serde::Serialize;

pub const EMPTY_LIST_MESSAGE: &str = "Sin reportes recientes. Sé el primero en reportar.";

/// A report plus its derived confidence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(flatten)]
    pub report: FloodReport,
    pub confidence: f64,
}

impl From<FloodReport> for ReportView {
    fn from(report: FloodReport) -> Self {
        let confidence = confidence(&report);
        Self { report, confidence }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub level: WaterLevel,
    pub text: &'static str,
    pub color: &'static str,
}

/// Everything a list row shows for one report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub id: String,
    pub badge: Badge,
    pub location_text: String,
    pub time_text: String,
    pub vehicles_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub confirm_label: String,
    pub reject_label: String,
    pub confidence: f64,
    pub confidence_text: String,
}

impl From<&FloodReport> for ReportCard {
    fn from(report: &FloodReport) -> Self {
        let level = report.water_level;
        let confidence = confidence(report);
        Self {
            id: report.id.clone(),
            badge: Badge {
                level,
                text: level.badge_text(),
                color: level.badge_color(),
            },
            location_text: format!("📍 {:.5}, {:.5}", report.latitude, report.longitude),
            time_text: format!("🕒 Reportado a las {}", format_report_time(report.created_at)),
            vehicles_text: format!(
                "🚘 Recomendado: {}",
                vehicle_summary(&report.recommended_vehicles)
            ),
            comment: report.comment.clone(),
            confirm_label: format!("Confirmar ({})", report.confirms),
            reject_label: format!("Rechazar ({})", report.rejects),
            confidence,
            confidence_text: format!("{confidence:.0}% de confianza"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pin_color: &'static str,
    pub title: String,
    pub description: String,
}

impl From<&FloodReport> for MapMarker {
    fn from(report: &FloodReport) -> Self {
        Self {
            id: report.id.clone(),
            latitude: report.latitude,
            longitude: report.longitude,
            pin_color: report.water_level.pin_color(),
            title: format!("Nivel {}", report.water_level.as_str()),
            description: format!("Confirmaciones: {}", report.confirms),
        }
    }
}
