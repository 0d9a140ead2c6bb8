//! Entity-scoped filtering and deduplication of upstream records
//!
//! Upstream directories are queried with a coarse geographic facet (a whole
//! département or région). Records are narrowed here to the requested entity
//! using the geography index.

use geodash_common::{EntityRef, EntityType, GeoIndex};
use std::collections::HashSet;
use tracing::debug;

use crate::provider::Establishment;

/// A record that may carry the code of the commune it belongs to
pub trait Located {
    fn commune_code(&self) -> Option<&str>;
}

impl Located for Establishment {
    fn commune_code(&self) -> Option<&str> {
        self.commune_cog.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Keep the records that belong to `entity`
///
/// - commune: exact commune code match
/// - EPCI: commune code in the EPCI membership set
/// - département / région: the facet already scoped the query; records whose
///   commune is known to the index but lies elsewhere are dropped, records
///   without a commune code or with an unknown one are kept
pub fn filter_by_entity<T: Located>(records: Vec<T>, entity: &EntityRef, geo: &GeoIndex) -> Vec<T> {
    let before = records.len();
    let kept: Vec<T> = match entity.kind() {
        EntityType::Commune => records
            .into_iter()
            .filter(|r| r.commune_code() == Some(entity.code()))
            .collect(),
        EntityType::Epci => {
            let members = geo.commune_codes_in_epci(entity.code());
            records
                .into_iter()
                .filter(|r| r.commune_code().is_some_and(|c| members.contains(c)))
                .collect()
        }
        EntityType::Departement | EntityType::Region => records
            .into_iter()
            .filter(|r| match r.commune_code().and_then(|c| geo.commune(c)) {
                Some(commune) => match entity.kind() {
                    EntityType::Departement => commune.departement_code == entity.code(),
                    _ => commune.region_code == entity.code(),
                },
                None => true,
            })
            .collect(),
    };

    debug!(
        entity = %entity,
        before,
        after = kept.len(),
        "Filtered records by entity scope"
    );
    kept
}

/// Remove records sharing a non-empty key, keeping the first occurrence
///
/// Returns the kept records and the number removed. Records with a missing or
/// empty key are always kept.
pub fn deduplicate<T, F>(records: Vec<T>, key: F) -> (Vec<T>, usize)
where
    F: Fn(&T) -> Option<&str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    let mut removed = 0;

    for record in records {
        let duplicate = match key(&record).filter(|k| !k.is_empty()) {
            Some(k) => !seen.insert(k.to_string()),
            None => false,
        };
        if duplicate {
            removed += 1;
        } else {
            kept.push(record);
        }
    }

    if removed > 0 {
        debug!(removed, kept = kept.len(), "Removed duplicate records");
    }
    (kept, removed)
}
