use crate::domain::alerting::{FloodAlert, RainAlertLatch};
use crate::domain::models::{Settings, VehicleType};

/// Per-device client state: vehicle profile, settings and the alert latch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverSession {
    pub vehicle: VehicleType,
    pub settings: Settings,
    latch: RainAlertLatch,
    red_count: usize,
    pub last_seen_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionAction {
    SelectVehicle(VehicleType),
    SetDarkMode(bool),
    /// Latest weather fetch succeeded.
    WeatherLoaded { raining: bool },
    /// The active set was looked at; carries the number of red reports in it.
    ReportsObserved { red_count: usize },
    Seen(i64),
}

impl DriverSession {
    pub fn new(now_ms: i64) -> Self {
        Self {
            vehicle: VehicleType::default(),
            settings: Settings::default(),
            latch: RainAlertLatch::default(),
            red_count: 0,
            last_seen_ms: now_ms,
        }
    }

    pub fn is_idle(&self, now_ms: i64, max_idle_ms: i64) -> bool {
        now_ms - self.last_seen_ms > max_idle_ms
    }

    /// Applies one action and re-evaluates the rain alert against the updated
    /// inputs.
    pub fn reduce(self, action: SessionAction) -> (Self, Option<FloodAlert>) {
        let mut next = self;
        match action {
            SessionAction::SelectVehicle(vehicle) => next.vehicle = vehicle,
            SessionAction::SetDarkMode(enabled) => next.settings.dark_mode = enabled,
            SessionAction::WeatherLoaded { raining } => next.settings.raining_alert = raining,
            SessionAction::ReportsObserved { red_count } => next.red_count = red_count,
            SessionAction::Seen(now_ms) => next.last_seen_ms = now_ms,
        }

        let (latch, alert) = next
            .latch
            .evaluate(next.red_count, next.settings.raining_alert);
        next.latch = latch;
        (next, alert)
    }
}
