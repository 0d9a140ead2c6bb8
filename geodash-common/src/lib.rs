//! # geodash common library
//!
//! Shared code for the geodash dashboard backend:
//! - Administrative geography index (communes, EPCIs, départements, régions)
//! - Territory references and their validation
//! - Configuration loading
//! - Error types

pub mod config;
pub mod entity;
pub mod error;
pub mod geo;

pub use entity::{EntityRef, EntityType};
pub use error::{Error, Result};
pub use geo::{GeoIndex, Lookup};
