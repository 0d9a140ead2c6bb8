//! France Travail job-seeker statistics, averaged per year
//!
//! Quarterly periods are filtered down to the demographic breakdowns the
//! dashboard shows, the gender split is collapsed into a single total, and
//! each year is reported as the mean of its quarters.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::{round1, round_count};
use crate::provider::schema::{Characteristic, JobSeekerPeriod};
use crate::provider::JobSeekerResponse;

/// Breakdown types kept whatever their label
const KEPT_TYPES: &[&str] = &["GENRE", "NIVFORM", "CHOMANC", "NIVEXP", "NIVQUAL"];

/// Age brackets kept by label
const KEPT_LABELS: &[&str] = &[
    "15-24 ans",
    "25-34 ans",
    "35-49 ans",
    "Hommes - 25-34 ans",
    "Femmes - 25-34 ans",
];

const GENDER_LABELS: &[&str] = &["Hommes", "Femmes"];

static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(20\d{2})\b").expect("year pattern is valid"));

/// One year of job-seeker figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyJobSeekers {
    pub annee: String,
    #[serde(rename = "valeurPrincipaleNombre")]
    pub valeur_principale_nombre: i64,
    #[serde(rename = "valeurSecondairePourcentage")]
    pub valeur_secondaire_pourcentage: f64,
    pub filtered_caracts: Vec<CharacteristicSummary>,
    pub nb_periodes: usize,
}

/// A breakdown averaged over the periods of a year where it appears
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacteristicSummary {
    pub code_type_caract: Option<String>,
    pub code_caract: Option<String>,
    pub lib_caract: Option<String>,
    pub nombre: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pourcentage: Option<f64>,
    pub masque: bool,
}

/// Period after breakdown filtering
struct FilteredPeriod<'a> {
    period: &'a JobSeekerPeriod,
    caracts: Vec<Characteristic>,
}

/// Yearly averages keyed by year
pub fn summarize_job_seekers(response: &JobSeekerResponse) -> BTreeMap<String, YearlyJobSeekers> {
    let mut years: BTreeMap<String, Vec<FilteredPeriod<'_>>> = BTreeMap::new();

    for period in &response.periods {
        let kept: Vec<&Characteristic> = period
            .liste_valeur_par_caract
            .iter()
            .filter(|c| is_kept(c))
            .collect();
        if kept.is_empty() {
            continue;
        }

        let Some(year) = period.lib_periode.as_deref().and_then(extract_year) else {
            debug!(period = ?period.lib_periode, "No year in period label, skipping");
            continue;
        };

        years.entry(year.to_string()).or_default().push(FilteredPeriod {
            period,
            caracts: collapse_gender(kept),
        });
    }

    years
        .into_iter()
        .map(|(year, periods)| {
            let summary = summarize_year(&year, &periods);
            (year, summary)
        })
        .collect()
}

fn is_kept(caract: &Characteristic) -> bool {
    caract
        .code_type_caract
        .as_deref()
        .is_some_and(|t| KEPT_TYPES.contains(&t))
        || caract
            .lib_caract
            .as_deref()
            .is_some_and(|l| KEPT_LABELS.contains(&l))
}

/// Replace the Hommes/Femmes entries by one leading total (omitted when zero)
fn collapse_gender(caracts: Vec<&Characteristic>) -> Vec<Characteristic> {
    let mut total = 0.0;
    let mut rest = Vec::with_capacity(caracts.len() + 1);

    for caract in caracts {
        if caract
            .lib_caract
            .as_deref()
            .is_some_and(|l| GENDER_LABELS.contains(&l))
        {
            total += caract.nombre.unwrap_or(0.0);
        } else {
            rest.push(caract.clone());
        }
    }

    if total > 0.0 {
        rest.insert(
            0,
            Characteristic {
                code_type_caract: Some("TOTAL".to_string()),
                code_caract: Some("TOTAL".to_string()),
                lib_caract: Some("Total".to_string()),
                nombre: Some(total),
                pourcentage: None,
                masque: Some(false),
            },
        );
    }
    rest
}

fn extract_year(label: &str) -> Option<&str> {
    YEAR_PATTERN
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn summarize_year(year: &str, periods: &[FilteredPeriod<'_>]) -> YearlyJobSeekers {
    struct Running<'a> {
        first: &'a Characteristic,
        nombre_sum: f64,
        pourcentage_sum: f64,
        count: usize,
    }

    let count = periods.len() as f64;
    let principal: f64 = periods
        .iter()
        .map(|p| p.period.valeur_principale_nombre.unwrap_or(0.0))
        .sum();
    let secondary: f64 = periods
        .iter()
        .map(|p| p.period.valeur_secondaire_pourcentage.unwrap_or(0.0))
        .sum();

    // First-seen order of (codeTypeCaract, codeCaract)
    let mut order: Vec<(Option<&str>, Option<&str>)> = Vec::new();
    let mut running: HashMap<(Option<&str>, Option<&str>), Running<'_>> = HashMap::new();

    for caract in periods.iter().flat_map(|p| &p.caracts) {
        let key = (caract.code_type_caract.as_deref(), caract.code_caract.as_deref());
        let entry = running.entry(key).or_insert_with(|| {
            order.push(key);
            Running {
                first: caract,
                nombre_sum: 0.0,
                pourcentage_sum: 0.0,
                count: 0,
            }
        });
        entry.nombre_sum += caract.nombre.unwrap_or(0.0);
        entry.pourcentage_sum += caract.pourcentage.unwrap_or(0.0);
        entry.count += 1;
    }

    let filtered_caracts = order
        .iter()
        .filter_map(|key| running.get(key))
        .map(|r| {
            let n = r.count as f64;
            CharacteristicSummary {
                code_type_caract: r.first.code_type_caract.clone(),
                code_caract: r.first.code_caract.clone(),
                lib_caract: r.first.lib_caract.clone(),
                nombre: round_count(r.nombre_sum / n),
                pourcentage: (r.pourcentage_sum > 0.0).then(|| round1(r.pourcentage_sum / n)),
                masque: r.first.masque.unwrap_or(false),
            }
        })
        .collect();

    YearlyJobSeekers {
        annee: year.to_string(),
        valeur_principale_nombre: round_count(principal / count),
        valeur_secondaire_pourcentage: round1(secondary / count),
        filtered_caracts,
        nb_periodes: periods.len(),
    }
}
