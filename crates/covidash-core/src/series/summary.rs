use serde::Serialize;

use super::table::SeriesTable;

/// Upstream column names, as requested from the health API.
pub const NEW_CASES_FIELD: &str = "newCasesBySpecimenDate";
pub const HOSPITAL_CASES_FIELD: &str = "hospitalCases";
pub const CUMULATIVE_DEATHS_FIELD: &str = "cumDailyNsoDeathsByDeathDate";

/// Rolling window for the case total, in days.
pub const CASE_WINDOW_DAYS: usize = 7;

/// Headline figures derived from one series fetch. A `None` field means the
/// figure could not be derived this cycle and the previous value should be
/// kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaseSummary {
    pub weekly_cases: Option<i64>,
    pub hospital_cases: Option<i64>,
    pub cumulative_deaths: Option<i64>,
}

/// Derive the headline figures from a series table: the 7-day case total,
/// the latest settled hospital-case count, and the cumulative death toll.
pub fn derive_summary(table: &SeriesTable) -> CaseSummary {
    let weekly_cases = match table.window_sum(NEW_CASES_FIELD, CASE_WINDOW_DAYS) {
        Ok(sum) => Some(sum),
        Err(e) => {
            tracing::warn!("weekly case total unavailable: {e}");
            None
        }
    };

    CaseSummary {
        weekly_cases,
        hospital_cases: table.most_recent_valid(HOSPITAL_CASES_FIELD),
        cumulative_deaths: table.most_recent_valid(CUMULATIVE_DEATHS_FIELD),
    }
}
