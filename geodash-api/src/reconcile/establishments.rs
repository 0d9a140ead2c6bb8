//! ONISEP establishment counts and map points

use serde::Serialize;
use std::collections::BTreeMap;

use crate::provider::Establishment;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EstablishmentSummary {
    pub total_etablissements: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub type_counts: BTreeMap<String, usize>,
    pub coordinates: Vec<EstablishmentPoint>,
}

/// Establishment with usable coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstablishmentPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub nom: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub statut: String,
    #[serde(rename = "_source")]
    pub source: String,
}

/// Count establishments by status and type and collect their map points
///
/// Records are expected to be already scoped and deduplicated.
pub fn summarize_establishments(records: &[Establishment]) -> EstablishmentSummary {
    let mut summary = EstablishmentSummary {
        total_etablissements: records.len(),
        ..Default::default()
    };

    for record in records {
        *summary
            .status_counts
            .entry(label_or_unknown(&record.statut))
            .or_default() += 1;
        *summary
            .type_counts
            .entry(label_or_unknown(&record.type_detablissement))
            .or_default() += 1;

        if let (Some(longitude), Some(latitude)) = (record.longitude(), record.latitude()) {
            summary.coordinates.push(EstablishmentPoint {
                longitude,
                latitude,
                nom: record.nom.clone().unwrap_or_default(),
                kind: record.type_detablissement.clone().unwrap_or_default(),
                statut: record.statut.clone().unwrap_or_default(),
                source: record
                    .source
                    .map_or(UNKNOWN, |s| s.as_str())
                    .to_string(),
            });
        }
    }
    summary
}

fn label_or_unknown(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| UNKNOWN.to_string())
}
