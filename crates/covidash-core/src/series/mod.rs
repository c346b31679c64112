mod summary;
mod table;

pub use summary::{
    derive_summary, CaseSummary, CASE_WINDOW_DAYS, CUMULATIVE_DEATHS_FIELD, HOSPITAL_CASES_FIELD,
    NEW_CASES_FIELD,
};
pub use table::SeriesTable;
