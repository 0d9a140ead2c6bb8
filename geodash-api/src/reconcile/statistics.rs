//! INSEE Melodi census series
//!
//! Observations are grouped by `TIME_PERIOD` and one or two category
//! dimensions; values landing on the same category are summed, then rounded.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::{percentage, round_count};
use crate::provider::schema::Observation;
use crate::provider::MelodiResponse;

/// `{year: {age: count}}`
pub type PopulationSeries = BTreeMap<String, BTreeMap<String, i64>>;

/// `{year: {age: {category: count}}}`
pub type NestedSeries = BTreeMap<String, BTreeMap<String, BTreeMap<String, i64>>>;

/// Employment status dimension of the employment dataset
const EMPLOYMENT_STATUS_DIM: &str = "EMPSTA_ENQ";
const STATUS_TOTAL: &str = "_T";
const STATUS_EMPLOYED: &str = "1";
const STATUS_UNEMPLOYED: &str = "2";

/// Year whose PCS nomenclature numbers retirees differently
const PCS_RECODED_YEAR: &str = "2022";

/// Labor-force figures for one census year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmploymentYear {
    pub population_15_64: i64,
    pub nombre_actifs: i64,
    pub nombre_actifs_ayant_emploi: i64,
    pub taux_emploi: f64,
    pub nombre_chomeurs: i64,
    pub taux_chomage: f64,
}

/// Population by year and age group
pub fn population_by_year(response: &MelodiResponse) -> PopulationSeries {
    let mut sums: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for (period, [age], value) in extract(&response.observations, ["AGE"]) {
        *sums
            .entry(period.to_string())
            .or_default()
            .entry(age.to_string())
            .or_default() += value;
    }
    sums.into_iter()
        .map(|(year, ages)| (year, round_values(ages)))
        .collect()
}

/// Socio-professional categories by year and age group
///
/// Category `9` of 2022 is folded into `8` to match the earlier nomenclature.
pub fn pcs_by_year(response: &MelodiResponse) -> NestedSeries {
    nested_by_year(response, "PCS", |year, pcs| {
        if year == PCS_RECODED_YEAR && pcs == "9" {
            "8"
        } else {
            pcs
        }
    })
}

/// Highest diploma by year and age group
pub fn diplomas_by_year(response: &MelodiResponse) -> NestedSeries {
    nested_by_year(response, "DIPL", |_, dipl| dipl)
}

/// Labor force, employment and unemployment rates by year
pub fn employment_by_year(response: &MelodiResponse) -> BTreeMap<String, EmploymentYear> {
    #[derive(Default)]
    struct Totals {
        population: f64,
        employed: f64,
        unemployed: f64,
    }

    let mut years: BTreeMap<String, Totals> = BTreeMap::new();
    for (period, [status], value) in extract(&response.observations, [EMPLOYMENT_STATUS_DIM]) {
        let totals = years.entry(period.to_string()).or_default();
        match status {
            STATUS_TOTAL => totals.population += value,
            STATUS_EMPLOYED => totals.employed += value,
            STATUS_UNEMPLOYED => totals.unemployed += value,
            other => debug!(status = other, "Ignoring employment status"),
        }
    }

    years
        .into_iter()
        .map(|(year, t)| {
            let actifs = t.employed + t.unemployed;
            let figures = EmploymentYear {
                population_15_64: round_count(t.population),
                nombre_actifs: round_count(actifs),
                nombre_actifs_ayant_emploi: round_count(t.employed),
                taux_emploi: percentage(t.employed, t.population),
                nombre_chomeurs: round_count(t.unemployed),
                taux_chomage: percentage(t.unemployed, actifs),
            };
            (year, figures)
        })
        .collect()
}

fn nested_by_year<'a>(
    response: &'a MelodiResponse,
    category_dim: &'static str,
    recode: impl Fn(&str, &'a str) -> &'a str,
) -> NestedSeries {
    let mut sums: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>> = BTreeMap::new();
    for (period, [age, category], value) in
        extract(&response.observations, ["AGE", category_dim])
    {
        *sums
            .entry(period.to_string())
            .or_default()
            .entry(age.to_string())
            .or_default()
            .entry(recode(period, category).to_string())
            .or_default() += value;
    }
    sums.into_iter()
        .map(|(year, ages)| {
            let ages = ages
                .into_iter()
                .map(|(age, categories)| (age, round_values(categories)))
                .collect();
            (year, ages)
        })
        .collect()
}

/// `(period, dimension values, value)` of every complete observation
fn extract<'a, const N: usize>(
    observations: &'a [Observation],
    dims: [&str; N],
) -> Vec<(&'a str, [&'a str; N], f64)> {
    let complete: Vec<_> = observations
        .iter()
        .filter_map(|obs| {
            let period = obs.period()?;
            let value = obs.value()?;
            let mut keys = [""; N];
            for (slot, dim) in keys.iter_mut().zip(dims) {
                *slot = obs.dimension(dim)?;
            }
            Some((period, keys, value))
        })
        .collect();

    let skipped = observations.len() - complete.len();
    if skipped > 0 {
        debug!(skipped, ?dims, "Skipped incomplete observations");
    }
    complete
}

fn round_values(values: BTreeMap<String, f64>) -> BTreeMap<String, i64> {
    values
        .into_iter()
        .map(|(key, value)| (key, round_count(value)))
        .collect()
}
