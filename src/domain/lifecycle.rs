use crate::domain::models::{FloodReport, Observation, RawReport, VoteChoice, WaterLevel};

/// Reports older than this (two hours) are hidden from every list.
pub const REPORT_TTL_MS: i64 = 2 * 60 * 60 * 1000;

pub fn is_active(report: &FloodReport, now_ms: i64) -> bool {
    now_ms - report.created_at < REPORT_TTL_MS
}

/// Share of confirming votes, in percent. 50 while nobody has voted.
pub fn confidence(report: &FloodReport) -> f64 {
    let total = u64::from(report.confirms) + u64::from(report.rejects);
    if total == 0 {
        return 50.0;
    }
    u64::from(report.confirms) as f64 / total as f64 * 100.0
}

/// Builds a fresh report for a store-assigned id.
pub fn create(observation: Observation, id: String, now_ms: i64) -> FloodReport {
    FloodReport {
        id,
        latitude: observation.latitude,
        longitude: observation.longitude,
        water_level: observation.water_level,
        recommended_vehicles: observation.recommended_vehicles,
        comment: observation.comment,
        photo_url: observation.photo_url,
        created_at: now_ms,
        confirms: 0,
        rejects: 0,
    }
}

/// The client-visible set of reports.
///
/// Every operation returns the next value instead of mutating in place, so a
/// holder can swap the whole set under a single write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSet {
    reports: Vec<FloodReport>,
}

impl ReportSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_reports(reports: Vec<FloodReport>) -> Self {
        Self { reports }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FloodReport> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// Replaces the set with a store snapshot. Documents without a creation
    /// time are stamped with `now_ms`.
    pub fn ingest(&self, raw: &[RawReport], now_ms: i64) -> Self {
        Self {
            reports: raw
                .iter()
                .cloned()
                .map(|doc| doc.into_report(now_ms))
                .collect(),
        }
    }

    pub fn prune(&self, now_ms: i64) -> Self {
        Self {
            reports: self
                .reports
                .iter()
                .filter(|r| is_active(r, now_ms))
                .cloned()
                .collect(),
        }
    }

    /// Returns the next set and whether a report with `id` was present.
    pub fn vote(&self, id: &str, choice: VoteChoice) -> (Self, bool) {
        let mut applied = false;
        let reports = self
            .reports
            .iter()
            .map(|r| {
                if r.id != id {
                    return r.clone();
                }
                applied = true;
                let mut next = r.clone();
                choice.apply(&mut next.confirms, &mut next.rejects);
                next
            })
            .collect();
        (Self { reports }, applied)
    }

    /// Puts a newly created report at the front.
    pub fn add(&self, report: FloodReport) -> Self {
        let mut reports = Vec::with_capacity(self.reports.len() + 1);
        reports.extend(self.reports.iter().filter(|r| r.id != report.id).cloned());
        reports.insert(0, report);
        Self { reports }
    }

    pub fn newest_first(&self) -> Vec<FloodReport> {
        let mut sorted = self.reports.clone();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }

    pub fn count_level(&self, level: WaterLevel) -> usize {
        self.reports.iter().filter(|r| r.water_level == level).count()
    }
}
