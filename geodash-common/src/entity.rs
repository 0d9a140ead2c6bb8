//! Territory addressing
//!
//! Every aggregation operation is keyed by an [`EntityRef`]: a territory code
//! plus the administrative level it belongs to. References are built from
//! untrusted query parameters, so construction validates both halves.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest accepted territory code
pub const MAX_CODE_LEN: usize = 10;

/// Administrative level of a territory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Commune,
    Epci,
    Departement,
    Region,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Commune,
        EntityType::Epci,
        EntityType::Departement,
        EntityType::Region,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Commune => "commune",
            EntityType::Epci => "epci",
            EntityType::Departement => "departement",
            EntityType::Region => "region",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "commune" => Ok(EntityType::Commune),
            "epci" => Ok(EntityType::Epci),
            "departement" => Ok(EntityType::Departement),
            "region" => Ok(EntityType::Region),
            other => Err(Error::InvalidInput(format!(
                "Invalid entity_type '{}'. Must be one of: commune, epci, departement, region",
                other
            ))),
        }
    }
}

/// Validated reference to a territory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityRef {
    code: String,
    #[serde(rename = "type")]
    kind: EntityType,
}

impl EntityRef {
    /// Build a reference, rejecting malformed codes
    pub fn new(code: impl Into<String>, kind: EntityType) -> Result<Self> {
        let code = code.into();
        validate_code(&code)?;
        Ok(Self { code, kind })
    }

    /// Build a reference from raw query-string values
    pub fn parse(code: &str, kind: &str) -> Result<Self> {
        Self::new(code, kind.parse()?)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> EntityType {
        self.kind
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.code)
    }
}

/// Territory codes: non-empty, at most [`MAX_CODE_LEN`] chars, `[A-Za-z0-9_-]`
pub fn validate_code(code: &str) -> Result<()> {
    if code.is_empty() {
        return Err(Error::InvalidInput("entity_code must not be empty".to_string()));
    }
    if code.chars().count() > MAX_CODE_LEN {
        return Err(Error::InvalidInput(format!(
            "entity_code must be at most {} characters",
            MAX_CODE_LEN
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::InvalidInput(format!(
            "entity_code '{}' contains invalid characters",
            code
        )));
    }
    Ok(())
}
