use crate::config::Config;
use crate::domain::alerting::FloodAlert;
use crate::domain::session::{DriverSession, SessionAction};
use crate::middleware::RateLimiter;
use crate::services::board::ReportBoard;
use crate::services::weather::WeatherClient;
use crate::store::ReportStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ReportStore>,
    pub board: ReportBoard,
    pub weather: WeatherClient,
    pub sessions: Arc<RwLock<HashMap<String, DriverSession>>>, // device id -> session
    pub report_limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ReportStore>, weather: WeatherClient) -> Self {
        let report_limiter = RateLimiter::per_minute(config.report_rate_limit);
        Self {
            config: Arc::new(config),
            store,
            board: ReportBoard::new(),
            weather,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            report_limiter,
        }
    }

    pub async fn session(&self, device: &str, now_ms: i64) -> DriverSession {
        self.sessions
            .read()
            .await
            .get(device)
            .copied()
            .unwrap_or_else(|| DriverSession::new(now_ms))
    }

    /// Runs `actions` through the device's session reducer and stores the
    /// result. Returns the final session and the alert, if one fired.
    pub async fn dispatch(
        &self,
        device: &str,
        now_ms: i64,
        actions: &[SessionAction],
    ) -> (DriverSession, Option<FloodAlert>) {
        let mut sessions = self.sessions.write().await;
        let mut session = sessions
            .get(device)
            .copied()
            .unwrap_or_else(|| DriverSession::new(now_ms));
        let mut fired = None;

        for action in actions.iter().copied().chain([SessionAction::Seen(now_ms)]) {
            let (next, alert) = session.reduce(action);
            session = next;
            if alert.is_some() {
                fired = alert;
            }
        }

        sessions.insert(device.to_string(), session);
        (session, fired)
    }

    /// Drops sessions idle for longer than the configured limit.
    pub async fn expire_sessions(&self, now_ms: i64) -> usize {
        let max_idle_ms = self.config.session_idle.as_millis() as i64;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_idle(now_ms, max_idle_ms));
        before - sessions.len()
    }
}

pub type SharedState = Arc<AppState>;
