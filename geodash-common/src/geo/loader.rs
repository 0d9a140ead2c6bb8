//! Geography file loading
//!
//! The source file is `;`-separated UTF-8 without a header:
//! `code_commune;nom_commune;code_epci;nom_epci;code_departement;code_region`.

use super::GeoIndex;
use crate::Result;
use std::path::Path;
use tracing::{info, warn};

const DELIMITER: u8 = b';';

impl GeoIndex {
    /// Load the index from a geography file
    ///
    /// # Errors
    /// Fails only when the file cannot be read; malformed rows are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let rows = parse_rows(&content);
        let total = rows.len();

        let mut index = GeoIndex::new();
        let skipped = index.extend_rows(rows);
        if skipped > 0 {
            warn!(skipped, total, "Geography file contains malformed rows");
        }

        let stats = index.stats();
        info!(
            path = %path.display(),
            communes = stats.communes,
            epcis = stats.epcis,
            departements = stats.departements,
            regions = stats.regions,
            "Geography index loaded"
        );
        Ok(index)
    }
}

/// Split file content into trimmed fields, skipping blank lines
///
/// Fields may be wrapped in double quotes; a quoted field can contain the
/// delimiter and `""` unescapes to `"`. Unreadable records are skipped.
pub fn parse_rows(content: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) if record.iter().all(str::is_empty) => {}
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => warn!(error = %e, "Skipping unreadable geography row"),
        }
    }
    rows
}
