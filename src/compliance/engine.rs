//! Compliance classification and filtering engine

use super::masking::{MaskStrategy, Pseudonymizer};
use super::record::{value_text, Record};
use super::rules::{ClassificationRule, RuleMatch, RuleTable, SENSITIVE_FIELDS};
use super::tier::{Action, ComplianceTier};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Verdict for a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataClassification {
    /// Field name as given by the caller
    pub field_name: String,
    /// Assigned tier
    pub classification: ComplianceTier,
    /// Human-readable explanation
    pub reason: String,
    /// Action taken during filtering
    pub action: Action,
}

/// Output of [`ComplianceEngine::filter_data`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    /// The caller's record, unchanged
    pub original_data: Record,
    /// Record after removal, masking and placeholder substitution
    pub filtered_data: Record,
    pub removed_fields: Vec<String>,
    pub masked_fields: Vec<String>,
    pub classifications: Vec<DataClassification>,
    /// Fraction of fields compliant with the target tier, in `[0.0, 1.0]`
    pub compliance_score: f64,
}

/// Classifies record fields into compliance tiers and derives filtered views.
///
/// The engine holds no mutable state; one instance can be shared across
/// threads and used for any number of records.
#[derive(Debug)]
pub struct ComplianceEngine {
    rules: Arc<RuleTable>,
    pseudonymizer: Pseudonymizer,
}

impl ComplianceEngine {
    /// Engine over the standard rule table
    pub fn new() -> Self {
        Self::with_rules(RuleTable::standard())
    }

    /// Engine over a custom rule table
    pub fn with_rules(rules: Arc<RuleTable>) -> Self {
        Self {
            rules,
            pseudonymizer: Pseudonymizer::default(),
        }
    }

    /// Replace the pseudonymizer used for `USER_`/`EMP_` identifiers
    pub fn with_pseudonymizer(mut self, pseudonymizer: Pseudonymizer) -> Self {
        self.pseudonymizer = pseudonymizer;
        self
    }

    /// Classify a single field. Never fails.
    pub fn classify_field(&self, field_name: &str, field_value: &Value) -> DataClassification {
        let name_lower = field_name.to_lowercase();
        let text = value_text(field_value);

        match self.rules.find_match(&name_lower, &text) {
            Some(RuleMatch::FieldName { tier, action }) => DataClassification {
                field_name: field_name.to_string(),
                classification: tier,
                reason: format!(
                    "Field name '{}' matches {} classification",
                    field_name, tier
                ),
                action,
            },
            Some(RuleMatch::Pattern { tier, action }) => DataClassification {
                field_name: field_name.to_string(),
                classification: tier,
                reason: format!("Field value matches {} pattern", tier),
                action,
            },
            None => DataClassification {
                field_name: field_name.to_string(),
                classification: ComplianceTier::Internal,
                reason: "Default classification".to_string(),
                action: Action::Allow,
            },
        }
    }

    /// Classify every field of a record, in record order
    pub fn classify_data(&self, data: &Record) -> Vec<DataClassification> {
        let classifications: Vec<_> = data
            .iter()
            .map(|(name, value)| self.classify_field(name, value))
            .collect();

        tracing::debug!(
            field_count = data.len(),
            classified_count = classifications.len(),
            "Data classification completed"
        );
        classifications
    }

    /// Filter a record for the given target tier.
    ///
    /// The caller's record is cloned; the returned `filtered_data` is an
    /// independent map.
    pub fn filter_data(&self, data: &Record, target_tier: ComplianceTier) -> ComplianceResult {
        let mut filtered = data.clone();
        let classifications = self.classify_data(data);
        let mut removed_fields = Vec::new();
        let mut masked_fields = Vec::new();

        for classification in &classifications {
            let name = &classification.field_name;
            match classification.action {
                Action::Remove => {
                    if filtered.shift_remove(name).is_some() {
                        removed_fields.push(name.clone());
                    }
                }
                Action::Mask => {
                    if let Some(value) = filtered.get_mut(name) {
                        *value = Value::String(self.mask_field_value(name, value));
                        masked_fields.push(name.clone());
                    }
                }
                Action::Encrypt => {
                    if let Some(value) = filtered.get_mut(name) {
                        *value = Value::String(encrypt_placeholder(value));
                    }
                }
                Action::Allow => {}
            }
        }

        let compliance_score = self.calculate_score(&classifications, target_tier);

        tracing::info!(
            target_tier = %target_tier,
            compliance_score,
            removed_count = removed_fields.len(),
            masked_count = masked_fields.len(),
            "Data filtering completed"
        );

        ComplianceResult {
            original_data: data.clone(),
            filtered_data: filtered,
            removed_fields,
            masked_fields,
            classifications,
            compliance_score,
        }
    }

    /// Redacted text for a field value, chosen by field name
    pub fn mask_field_value(&self, field_name: &str, value: &Value) -> String {
        MaskStrategy::for_field(field_name).apply(&value_text(value), &self.pseudonymizer)
    }

    /// Copy of `data` with the named fields masked. Absent names are ignored.
    pub fn mask_sensitive_fields<'a, I>(&self, data: &Record, fields: I) -> Record
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut masked = data.clone();
        let mut count = 0usize;
        for name in fields {
            if let Some(value) = masked.get_mut(name) {
                *value = Value::String(self.mask_field_value(name, value));
                count += 1;
            }
        }
        tracing::debug!(field_count = count, "Sensitive fields masked");
        masked
    }

    /// Whether no field more restrictive than `required_tier` is left unmitigated
    pub fn validate_compliance(&self, data: &Record, required_tier: ComplianceTier) -> bool {
        self.classify_data(data).iter().all(|c| {
            !(c.classification.is_more_restrictive_than(required_tier)
                && c.action == Action::Allow)
        })
    }

    /// Fraction of classifications compliant with `target_tier`.
    ///
    /// A field counts as compliant when its tier is not more restrictive than
    /// the target, or when its action mitigates it. Empty input scores 1.0.
    pub fn calculate_score(
        &self,
        classifications: &[DataClassification],
        target_tier: ComplianceTier,
    ) -> f64 {
        if classifications.is_empty() {
            return 1.0;
        }
        let compliant = classifications
            .iter()
            .filter(|c| {
                !c.classification.is_more_restrictive_than(target_tier)
                    || c.action.is_mitigating()
            })
            .count();
        compliant as f64 / classifications.len() as f64
    }

    /// Field names considered sensitive
    pub fn sensitive_fields(&self) -> BTreeSet<String> {
        SENSITIVE_FIELDS.iter().map(|s| s.to_string()).collect()
    }

    /// Declarative view of the active rule table, in lookup order
    pub fn rule_summary(&self) -> Vec<ClassificationRule> {
        self.rules.describe()
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `ENCRYPTED_` followed by the first 16 hex chars of SHA-256 of the value text.
///
/// This is a one-way placeholder, not encryption: the original value cannot
/// be recovered from it.
pub fn encrypt_placeholder(value: &Value) -> String {
    let digest = Sha256::digest(value_text(value).as_bytes());
    let hex: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("ENCRYPTED_{}", hex)
}
