use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

/// Local time of the drivers using the app.
pub const DISPLAY_TZ: Tz = chrono_tz::America::Santo_Domingo;

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn from_millis(epoch_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_ms)
}

/// Clock time in the es-DO short style, e.g. `03:07 p. m.`.
pub fn format_report_time(epoch_ms: i64) -> String {
    let Some(utc_dt) = from_millis(epoch_ms) else {
        return "--:--".to_string();
    };
    let local = utc_dt.with_timezone(&DISPLAY_TZ);
    let (pm, hour) = local.hour12();
    let suffix = if pm { "p. m." } else { "a. m." };
    format!("{:02}:{:02} {}", hour, local.minute(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_report_time_uses_santo_domingo() {
        // 19:07 UTC is 15:07 in Santo Domingo (UTC-4, no DST).
        let utc = Utc.with_ymd_and_hms(2024, 6, 3, 19, 7, 0).unwrap();
        assert_eq!(format_report_time(utc.timestamp_millis()), "03:07 p. m.");

        let utc = Utc.with_ymd_and_hms(2024, 1, 10, 13, 30, 0).unwrap();
        assert_eq!(format_report_time(utc.timestamp_millis()), "09:30 a. m.");
    }

    #[test]
    fn test_now_millis_is_recent() {
        let a = Utc::now().timestamp_millis();
        let b = now_millis();
        assert!(b >= a);
    }
}
