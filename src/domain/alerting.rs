use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FloodAlert {
    pub title: String,
    pub message: String,
    pub red_reports: usize,
}

impl FloodAlert {
    fn for_count(red_reports: usize) -> Self {
        Self {
            title: "Alerta de inundación".to_string(),
            message: format!("Hay {red_reports} reportes rojos cerca de tu ruta."),
            red_reports,
        }
    }
}

/// Edge trigger for the rain + red reports advisory.
///
/// Fires once when the condition turns true and stays quiet until it has been
/// seen false again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RainAlertLatch {
    engaged: bool,
}

impl RainAlertLatch {
    #[cfg(test)]
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn evaluate(self, red_count: usize, raining: bool) -> (Self, Option<FloodAlert>) {
        let triggered = red_count > 0 && raining;
        match (triggered, self.engaged) {
            (true, false) => (Self { engaged: true }, Some(FloodAlert::for_count(red_count))),
            (true, true) => (self, None),
            (false, _) => (Self { engaged: false }, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lifecycle::ReportSet;
    use crate::domain::models::{RawReport, WaterLevel};

    #[test]
    fn test_fires_once_across_reingest() {
        let now = chrono::Utc::now().timestamp_millis();
        let raw = vec![RawReport {
            id: "a".to_string(),
            latitude: 18.47,
            longitude: -69.9,
            water_level: WaterLevel::Red,
            recommended_vehicles: vec![],
            comment: None,
            photo_url: None,
            created_at: Some(now),
            confirms: 0,
            rejects: 0,
        }];

        let set = ReportSet::new().ingest(&raw, now);
        let latch = RainAlertLatch::default();
        let (latch, alert) = latch.evaluate(set.count_level(WaterLevel::Red), true);
        let alert = alert.expect("first evaluation should fire");
        assert_eq!(alert.message, "Hay 1 reportes rojos cerca de tu ruta.");

        let set = set.ingest(&raw, now);
        let (latch, again) = latch.evaluate(set.count_level(WaterLevel::Red), true);
        assert!(again.is_none());
        assert!(latch.is_engaged());
    }

    #[test]
    fn test_rearms_after_condition_clears() {
        let latch = RainAlertLatch::default();
        let (latch, first) = latch.evaluate(2, true);
        assert!(first.is_some());

        let (latch, none) = latch.evaluate(3, true);
        assert!(none.is_none());

        let (latch, none) = latch.evaluate(3, false);
        assert!(none.is_none());
        assert!(!latch.is_engaged());

        let (_, second) = latch.evaluate(1, true);
        assert_eq!(second.unwrap().red_reports, 1);
    }

    #[test]
    fn test_no_alert_without_rain_or_red() {
        let latch = RainAlertLatch::default();
        assert!(latch.evaluate(5, false).1.is_none());
        assert!(latch.evaluate(0, true).1.is_none());
    }
}
