//! Incident sources
//!
//! The ITSM connector is an external collaborator; this module defines the
//! interface the compliance layer consumes and a fixture-backed
//! implementation for local use.

mod filter;
mod source;

pub use filter::IncidentFilter;
pub use source::{FixtureIncidentSource, IncidentSource};
