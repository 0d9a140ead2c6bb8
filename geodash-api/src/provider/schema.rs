//! Upstream response schemas
//!
//! Every field an upstream may omit is an `Option` or defaults to empty, so a
//! partially-filled record deserializes and is skipped later by the
//! reconciliation step instead of failing the whole payload. Entry lists are
//! read one entry at a time: an entry with a wrong-typed field is dropped and
//! its siblings are kept.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Deserialize a list entry by entry, dropping entries that do not fit `T`
///
/// A missing or `null` list reads as empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Vec<Value> = Option::deserialize(deserializer)?.unwrap_or_default();
    let total = raw.len();
    let entries: Vec<T> = raw
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    let dropped = total - entries.len();
    if dropped > 0 {
        debug!(
            dropped,
            total,
            entry = std::any::type_name::<T>(),
            "Skipped malformed upstream entries"
        );
    }
    Ok(entries)
}

// ============================================================================
// INSEE Melodi
// ============================================================================

/// Measure key holding the observation value
pub const MELODI_VALUE_MEASURE: &str = "OBS_VALUE_NIVEAU";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MelodiResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub observations: Vec<Observation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub dimensions: HashMap<String, Value>,
    #[serde(default)]
    pub measures: HashMap<String, Measure>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Measure {
    #[serde(default)]
    pub value: Option<f64>,
}

impl Observation {
    /// String value of a dimension, if present
    pub fn dimension(&self, key: &str) -> Option<&str> {
        self.dimensions.get(key).and_then(Value::as_str)
    }

    pub fn period(&self) -> Option<&str> {
        self.dimension("TIME_PERIOD")
    }

    pub fn value(&self) -> Option<f64> {
        self.measures
            .get(MELODI_VALUE_MEASURE)
            .and_then(|m| m.value)
    }
}

// ============================================================================
// France Travail: stat-demandeurs
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSeekerResponse {
    #[serde(rename = "listeValeursParPeriode", default, deserialize_with = "lenient_list")]
    pub periods: Vec<JobSeekerPeriod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerPeriod {
    #[serde(default)]
    pub lib_periode: Option<String>,
    #[serde(default)]
    pub code_periode: Option<String>,
    #[serde(default)]
    pub valeur_principale_nombre: Option<f64>,
    #[serde(default)]
    pub valeur_secondaire_pourcentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub liste_valeur_par_caract: Vec<Characteristic>,
}

/// One demographic breakdown of a period
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Characteristic {
    #[serde(default)]
    pub code_type_caract: Option<String>,
    #[serde(default)]
    pub code_caract: Option<String>,
    #[serde(default)]
    pub lib_caract: Option<String>,
    #[serde(default)]
    pub nombre: Option<f64>,
    #[serde(default)]
    pub pourcentage: Option<f64>,
    #[serde(default)]
    pub masque: Option<bool>,
}

// ============================================================================
// France Travail: stat-perspective-employeur
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerspectiveResponse {
    #[serde(rename = "listeValeursParPeriode", default, deserialize_with = "lenient_list")]
    pub entries: Vec<PerspectiveEntry>,
}

/// One (year, indicator) value with its territory descriptor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveEntry {
    #[serde(default)]
    pub code_type_territoire: Option<String>,
    #[serde(default)]
    pub code_territoire: Option<String>,
    #[serde(default)]
    pub lib_territoire: Option<String>,
    #[serde(default)]
    pub code_type_periode: Option<String>,
    #[serde(default)]
    pub code_periode: Option<String>,
    #[serde(default)]
    pub code_nomenclature: Option<String>,
    #[serde(default)]
    pub lib_nomenclature: Option<String>,
    /// Passed through verbatim
    #[serde(default)]
    pub valeur_principale_nom: Option<Value>,
    #[serde(default)]
    pub valeur_principale_decimale: Option<f64>,
}

// ============================================================================
// ONISEP
// ============================================================================

/// Which ONISEP establishment dataset a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationDataset {
    /// Secondary education establishments
    Sec,
    /// Higher education establishments
    Sup,
}

impl EducationDataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationDataset::Sec => "sec",
            EducationDataset::Sup => "sup",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnisepResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub results: Vec<Establishment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Establishment {
    /// UAI registry identifier
    #[serde(default, alias = "code_uai")]
    pub uai: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub type_detablissement: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    /// Commune code (COG) of the establishment
    #[serde(default)]
    pub commune_cog: Option<String>,
    /// Number or numeric string
    #[serde(default)]
    pub longitude_x: Option<Value>,
    #[serde(default)]
    pub latitude_y: Option<Value>,
    /// Set by the provider when merging datasets
    #[serde(skip)]
    pub source: Option<EducationDataset>,
}

impl Establishment {
    pub fn longitude(&self) -> Option<f64> {
        self.longitude_x.as_ref().and_then(coordinate)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude_y.as_ref().and_then(coordinate)
    }
}

fn coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v: &f64| v.is_finite())
}
