//! France Travail employer perspectives, grouped by year

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::provider::PerspectiveResponse;

/// Territory descriptor plus indicators per year (newest year first)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveSummary {
    pub code_type_territoire: Option<String>,
    pub code_territoire: Option<String>,
    pub lib_territoire: Option<String>,
    pub code_type_periode: Option<String>,
    pub data: YearsDescending,
}

/// Year → indicators, serialized newest year first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearsDescending(pub BTreeMap<String, Vec<PerspectiveIndicator>>);

impl Serialize for YearsDescending {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().rev())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveIndicator {
    pub code_nomenclature: Option<String>,
    pub lib_nomenclature: Option<String>,
    pub valeur_principale_nom: Option<Value>,
    pub valeur_principale_decimale: Option<f64>,
}

/// `None` when the upstream returned no entries
pub fn summarize_perspectives(response: &PerspectiveResponse) -> Option<PerspectiveSummary> {
    let first = response.entries.first()?;

    let mut years: BTreeMap<String, Vec<PerspectiveIndicator>> = BTreeMap::new();
    for entry in &response.entries {
        let Some(year) = entry.code_periode.as_deref() else {
            continue;
        };
        years.entry(year.to_string()).or_default().push(PerspectiveIndicator {
            code_nomenclature: entry.code_nomenclature.clone(),
            lib_nomenclature: entry.lib_nomenclature.clone(),
            valeur_principale_nom: entry.valeur_principale_nom.clone(),
            valeur_principale_decimale: entry.valeur_principale_decimale,
        });
    }
    for indicators in years.values_mut() {
        indicators.sort_by(|a, b| a.code_nomenclature.cmp(&b.code_nomenclature));
    }

    Some(PerspectiveSummary {
        code_type_territoire: first.code_type_territoire.clone(),
        code_territoire: first.code_territoire.clone(),
        lib_territoire: first.lib_territoire.clone(),
        code_type_periode: first.code_type_periode.clone(),
        data: YearsDescending(years),
    })
}
