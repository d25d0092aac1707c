//! ITSM Compliance - classification and filtering for incident records
//!
//! Incident records fetched from a ticketing system are screened before
//! they leave the service (for example, before being sent to an LLM for
//! analysis). Every field is classified into a sensitivity tier and then
//! allowed, masked, removed, or replaced with a digest placeholder.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      HTTP API / CLI                       │
//! └───────────────┬──────────────────────────┬───────────────┘
//!                 │                          │
//! ┌───────────────▼──────────┐   ┌───────────▼──────────────┐
//! │     IncidentFilter       │   │    ComplianceEngine      │
//! │  - fetch by sys_id       ├──►│  - classify fields       │
//! │  - filter at a tier      │   │  - mask / remove / hash  │
//! └───────────────┬──────────┘   │  - score & validate      │
//!                 │              └───────────┬──────────────┘
//! ┌───────────────▼──────────┐   ┌───────────▼──────────────┐
//! │   IncidentSource (ITSM)  │   │  RuleTable (static)      │
//! └──────────────────────────┘   │  RESTRICTED → PUBLIC     │
//!                                └──────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`compliance`]: Tiers, rule tables, masking and the engine
//! - [`incident`]: Incident source interface
//! - [`api`]: HTTP application
//! - [`config`]: Configuration management

pub mod api;
pub mod compliance;
pub mod config;
pub mod error;
pub mod incident;

pub use compliance::{ComplianceEngine, ComplianceResult, ComplianceTier, DataClassification};
pub use config::AppConfig;
pub use error::{Error, Result};
