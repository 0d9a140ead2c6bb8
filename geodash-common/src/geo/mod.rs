//! In-memory administrative hierarchy
//!
//! Communes are the only records; EPCI, département and région memberships are
//! derived from them when rows are inserted. The index is built once at
//! startup and then shared read-only across requests.
//!
//! # Invariants
//! - commune codes are unique (a later row overwrites an earlier one)
//! - every commune is a member of the sets keyed by its EPCI, département and
//!   région codes, and no set contains a code without a backing commune
//! - région/département display names come from the static tables, with a
//!   `"Région <code>"` / `"Département <code>"` placeholder for unknown codes

mod loader;
mod normalize;
pub mod tables;

pub use loader::parse_rows;
pub use normalize::normalize_text;

use crate::entity::{EntityRef, EntityType};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Minimum number of fields in a geography row
pub const MIN_ROW_FIELDS: usize = 6;

type StaticTable = &'static [(&'static str, &'static str)];

/// One commune with its resolved hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commune {
    pub code: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "code_epci")]
    pub epci_code: String,
    #[serde(rename = "code_departement")]
    pub departement_code: String,
    #[serde(rename = "code_region")]
    pub region_code: String,
    #[serde(rename = "nom_epci")]
    pub epci_name: String,
    #[serde(rename = "nom_departement")]
    pub departement_name: String,
    #[serde(rename = "nom_region")]
    pub region_name: String,
}

/// Result of a code → name resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a str),
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn found(self) -> Option<&'a str> {
        match self {
            Lookup::Found(name) => Some(name),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl<'a> From<Option<&'a str>> for Lookup<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Lookup::NotFound, Lookup::Found)
    }
}

/// `{code, nom}` pair returned by name search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedEntity {
    pub code: String,
    pub nom: String,
}

impl NamedEntity {
    fn new(code: &str, nom: &str) -> Self {
        Self {
            code: code.to_string(),
            nom: nom.to_string(),
        }
    }
}

/// Name search results, one independent list per level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub communes: Vec<NamedEntity>,
    pub epcis: Vec<NamedEntity>,
    pub departements: Vec<NamedEntity>,
    pub regions: Vec<NamedEntity>,
}

/// Entity counts, reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeoStats {
    pub communes: usize,
    pub epcis: usize,
    pub departements: usize,
    pub regions: usize,
}

/// Commune → EPCI → département → région index
#[derive(Debug, Clone)]
pub struct GeoIndex {
    /// Communes in first-insertion order (search results follow this order)
    communes: Vec<Commune>,
    positions: HashMap<String, usize>,
    epcis: HashMap<String, BTreeSet<String>>,
    departements: HashMap<String, BTreeSet<String>>,
    regions: HashMap<String, BTreeSet<String>>,
    region_table: StaticTable,
    departement_table: StaticTable,
}

impl Default for GeoIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoIndex {
    /// Empty index using the built-in région/département tables
    pub fn new() -> Self {
        Self::with_tables(tables::REGIONS, tables::DEPARTEMENTS)
    }

    /// Empty index using caller-provided name tables
    pub fn with_tables(region_table: StaticTable, departement_table: StaticTable) -> Self {
        Self {
            communes: Vec::new(),
            positions: HashMap::new(),
            epcis: HashMap::new(),
            departements: HashMap::new(),
            regions: HashMap::new(),
            region_table,
            departement_table,
        }
    }

    /// Build an index from geography rows
    ///
    /// Rows are `[commune_code, commune_name, epci_code, epci_name,
    /// departement_code, region_code, ..]`; shorter rows are skipped.
    pub fn build<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        index.extend_rows(rows);
        index
    }

    /// Insert rows, returning the number of rows skipped as malformed
    pub fn extend_rows<I, R, S>(&mut self, rows: I) -> usize
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut skipped = 0;
        for row in rows {
            if !self.insert_row(row.as_ref()) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!(skipped, "Skipped malformed geography rows");
        }
        skipped
    }

    /// Insert one row; returns false (and changes nothing) if it has too few fields
    pub fn insert_row<S: AsRef<str>>(&mut self, fields: &[S]) -> bool {
        if fields.len() < MIN_ROW_FIELDS {
            return false;
        }
        let field = |i: usize| fields[i].as_ref().to_string();
        let departement_code = field(4);
        let region_code = field(5);

        let commune = Commune {
            code: field(0),
            name: field(1),
            epci_code: field(2),
            epci_name: field(3),
            departement_name: lookup_or_placeholder(
                self.departement_table,
                &departement_code,
                "Département",
            ),
            region_name: lookup_or_placeholder(self.region_table, &region_code, "Région"),
            departement_code,
            region_code,
        };
        self.insert_commune(commune);
        true
    }

    fn insert_commune(&mut self, commune: Commune) {
        let code = commune.code.clone();

        if let Some(&pos) = self.positions.get(&code) {
            // Overwrite: drop memberships of the previous record first
            let previous = std::mem::replace(&mut self.communes[pos], commune);
            remove_member(&mut self.epcis, &previous.epci_code, &code);
            remove_member(&mut self.departements, &previous.departement_code, &code);
            remove_member(&mut self.regions, &previous.region_code, &code);
        } else {
            self.positions.insert(code.clone(), self.communes.len());
            self.communes.push(commune);
        }

        let commune = &self.communes[self.positions[&code]];
        self.epcis
            .entry(commune.epci_code.clone())
            .or_default()
            .insert(code.clone());
        self.departements
            .entry(commune.departement_code.clone())
            .or_default()
            .insert(code.clone());
        self.regions
            .entry(commune.region_code.clone())
            .or_default()
            .insert(code);
    }

    // ------------------------------------------------------------------
    // Lookup and membership
    // ------------------------------------------------------------------

    pub fn commune(&self, code: &str) -> Option<&Commune> {
        self.positions.get(code).map(|&pos| &self.communes[pos])
    }

    /// All communes, in insertion order
    pub fn communes(&self) -> &[Commune] {
        &self.communes
    }

    pub fn communes_in_epci(&self, code: &str) -> Vec<&Commune> {
        self.members_of(&self.epcis, code)
    }

    pub fn communes_in_departement(&self, code: &str) -> Vec<&Commune> {
        self.members_of(&self.departements, code)
    }

    pub fn communes_in_region(&self, code: &str) -> Vec<&Commune> {
        self.members_of(&self.regions, code)
    }

    pub fn commune_codes_in_epci(&self, code: &str) -> HashSet<&str> {
        codes_of(&self.epcis, code)
    }

    pub fn commune_codes_in_departement(&self, code: &str) -> HashSet<&str> {
        codes_of(&self.departements, code)
    }

    pub fn commune_codes_in_region(&self, code: &str) -> HashSet<&str> {
        codes_of(&self.regions, code)
    }

    /// Commune codes covered by any territory; empty for unknown codes
    pub fn commune_codes_in(&self, entity: &EntityRef) -> HashSet<&str> {
        match entity.kind() {
            EntityType::Commune => self
                .commune(entity.code())
                .map(|c| HashSet::from([c.code.as_str()]))
                .unwrap_or_default(),
            EntityType::Epci => self.commune_codes_in_epci(entity.code()),
            EntityType::Departement => self.commune_codes_in_departement(entity.code()),
            EntityType::Region => self.commune_codes_in_region(entity.code()),
        }
    }

    fn members_of(&self, map: &HashMap<String, BTreeSet<String>>, code: &str) -> Vec<&Commune> {
        map.get(code)
            .into_iter()
            .flatten()
            .filter_map(|c| self.commune(c))
            .collect()
    }

    pub fn commune_exists(&self, code: &str) -> bool {
        self.positions.contains_key(code)
    }

    pub fn epci_exists(&self, code: &str) -> bool {
        self.epcis.contains_key(code)
    }

    pub fn departement_exists(&self, code: &str) -> bool {
        self.departements.contains_key(code)
    }

    pub fn region_exists(&self, code: &str) -> bool {
        self.regions.contains_key(code)
    }

    pub fn entity_exists(&self, entity: &EntityRef) -> bool {
        match entity.kind() {
            EntityType::Commune => self.commune_exists(entity.code()),
            EntityType::Epci => self.epci_exists(entity.code()),
            EntityType::Departement => self.departement_exists(entity.code()),
            EntityType::Region => self.region_exists(entity.code()),
        }
    }

    // ------------------------------------------------------------------
    // Name resolution
    // ------------------------------------------------------------------

    pub fn commune_name(&self, code: &str) -> Lookup<'_> {
        self.commune(code).map(|c| c.name.as_str()).into()
    }

    pub fn epci_name(&self, code: &str) -> Lookup<'_> {
        self.first_commune_of_epci(code)
            .map(|c| c.epci_name.as_str())
            .into()
    }

    /// Canonical département name; falls back to the name carried by loaded communes
    pub fn departement_name(&self, code: &str) -> Lookup<'_> {
        if let Some(name) = tables::lookup(self.departement_table, code) {
            return Lookup::Found(name);
        }
        self.communes_in_departement(code)
            .first()
            .map(|c| c.departement_name.as_str())
            .into()
    }

    /// Canonical région name; falls back to the name carried by loaded communes
    pub fn region_name(&self, code: &str) -> Lookup<'_> {
        if let Some(name) = tables::lookup(self.region_table, code) {
            return Lookup::Found(name);
        }
        self.communes_in_region(code)
            .first()
            .map(|c| c.region_name.as_str())
            .into()
    }

    /// Région of the first loaded commune of an EPCI
    pub fn region_of_epci(&self, code: &str) -> Option<(&str, &str)> {
        self.first_commune_of_epci(code)
            .map(|c| (c.region_code.as_str(), c.region_name.as_str()))
    }

    /// Département `(code, name)` of a commune
    pub fn departement_of_commune(&self, code: &str) -> Option<(&str, &str)> {
        self.commune(code)
            .map(|c| (c.departement_code.as_str(), c.departement_name.as_str()))
    }

    fn first_commune_of_epci(&self, code: &str) -> Option<&Commune> {
        if !self.epci_exists(code) {
            return None;
        }
        self.communes.iter().find(|c| c.epci_code == code)
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Accent-insensitive substring search over every level
    ///
    /// The caller must reject empty queries: an empty needle is contained in
    /// every name.
    pub fn search(&self, query: &str) -> SearchResults {
        let needle = normalize_text(query);
        let matches = |name: &str| normalize_text(name).contains(&needle);

        let communes = self
            .communes
            .iter()
            .filter(|c| matches(&c.name))
            .map(|c| NamedEntity::new(&c.code, &c.name))
            .collect();

        let mut seen = HashSet::new();
        let mut epcis = Vec::new();
        for c in &self.communes {
            if !seen.contains(c.epci_code.as_str()) && matches(&c.epci_name) {
                seen.insert(c.epci_code.as_str());
                epcis.push(NamedEntity::new(&c.epci_code, &c.epci_name));
            }
        }

        let departements = self.search_two_pass(
            self.departement_table,
            |c| (&c.departement_code, &c.departement_name),
            &matches,
        );
        let regions = self.search_two_pass(
            self.region_table,
            |c| (&c.region_code, &c.region_name),
            &matches,
        );

        SearchResults {
            communes,
            epcis,
            departements,
            regions,
        }
    }

    /// Static table first, then names carried by communes not found yet
    fn search_two_pass<'a>(
        &'a self,
        table: StaticTable,
        level: impl Fn(&'a Commune) -> (&'a String, &'a String),
        matches: &impl Fn(&str) -> bool,
    ) -> Vec<NamedEntity> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut found = Vec::new();

        for &(code, name) in table {
            if matches(name) && seen.insert(code) {
                found.push(NamedEntity::new(code, name));
            }
        }
        for commune in &self.communes {
            let (code, name) = level(commune);
            if !seen.contains(code.as_str()) && matches(name) {
                seen.insert(code.as_str());
                found.push(NamedEntity::new(code, name));
            }
        }
        found
    }

    pub fn stats(&self) -> GeoStats {
        GeoStats {
            communes: self.communes.len(),
            epcis: self.epcis.len(),
            departements: self.departements.len(),
            regions: self.regions.len(),
        }
    }
}

fn lookup_or_placeholder(table: StaticTable, code: &str, label: &str) -> String {
    tables::lookup(table, code)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", label, code))
}

fn codes_of<'a>(map: &'a HashMap<String, BTreeSet<String>>, code: &str) -> HashSet<&'a str> {
    map.get(code)
        .map(|set| set.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

fn remove_member(map: &mut HashMap<String, BTreeSet<String>>, key: &str, commune: &str) {
    if let Some(set) = map.get_mut(key) {
        set.remove(commune);
        if set.is_empty() {
            map.remove(key);
        }
    }
}
