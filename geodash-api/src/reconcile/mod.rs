//! Reshaping of upstream payloads into dashboard response shapes
//!
//! Every function here is total over well-formed payloads: entries missing a
//! required field are skipped, never reported as errors. Years are keyed by
//! their string form in `BTreeMap`s so output is ascending unless stated.

pub mod establishments;
pub mod job_seekers;
pub mod perspectives;
pub mod statistics;

pub use establishments::{summarize_establishments, EstablishmentSummary};
pub use job_seekers::{summarize_job_seekers, YearlyJobSeekers};
pub use perspectives::{summarize_perspectives, PerspectiveSummary};
pub use statistics::{
    diplomas_by_year, employment_by_year, pcs_by_year, population_by_year, EmploymentYear,
};

/// Round to the nearest integer, halves away from zero
pub fn round_count(value: f64) -> i64 {
    value.round() as i64
}

/// Round to one decimal, halves away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / whole * 100` to one decimal; 0 when `whole` is 0
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        round1(part / whole * 100.0)
    }
}
