//! Compliance classification and filtering
//!
//! Classifies each field of a record into a sensitivity tier using
//! field-name rules, regex content rules and a default policy, then derives
//! a filtered view of the record:
//! - Rule tables partitioned by tier, checked most restrictive first
//! - Masking strategies selected by field name
//! - Digest placeholders for the encrypt action
//! - Compliance scoring against a target tier

pub mod engine;
pub mod handler;
pub mod masking;
pub mod record;
pub mod rules;
pub mod tier;

pub use engine::{encrypt_placeholder, ComplianceEngine, ComplianceResult, DataClassification};
pub use handler::{compliance_router, ComplianceState};
pub use masking::{MaskStrategy, Pseudonymizer};
pub use record::{value_text, Record};
pub use rules::{ClassificationRule, PatternRule, RuleProfile, RuleTable};
pub use tier::{Action, ComplianceTier};
