//! Classification rule tables
//!
//! A rule table owns one rule set per compliance tier. Each rule set pairs
//! exact field names and regex content patterns with the action to take when
//! a field matches. Tables are immutable once built; the built-in profiles
//! are constructed once per process and shared.

use super::tier::{Action, ComplianceTier};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A named content pattern (uncompiled)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Short identifier, e.g. `ssn`
    pub name: String,
    /// Regular expression searched (not fully matched) against field values
    pub pattern: String,
}

impl PatternRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// Rule set for a single tier, in its declarative form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Tier assigned when this rule set matches
    pub tier: ComplianceTier,
    /// Action taken on matching fields
    pub action: Action,
    /// Exact field names (compared case-insensitively)
    #[serde(default)]
    pub fields: Vec<String>,
    /// Content patterns
    #[serde(default)]
    pub patterns: Vec<PatternRule>,
}

impl ClassificationRule {
    pub fn new(tier: ComplianceTier, action: Action) -> Self {
        Self {
            tier,
            action,
            fields: Vec::new(),
            patterns: Vec::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.patterns.push(PatternRule::new(name, pattern));
        self
    }
}

struct CompiledPattern {
    name: String,
    regex: Regex,
}

struct CompiledTierRules {
    tier: ComplianceTier,
    action: Action,
    fields: HashSet<String>,
    patterns: Vec<CompiledPattern>,
}

/// Outcome of matching a field against a rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMatch {
    /// The lower-cased field name is in the tier's name set
    FieldName { tier: ComplianceTier, action: Action },
    /// A content pattern of the tier matched the value
    Pattern { tier: ComplianceTier, action: Action },
}

/// Compiled, immutable rule table
pub struct RuleTable {
    // Sorted most restrictive first
    tiers: Vec<CompiledTierRules>,
}

impl RuleTable {
    /// Compile a rule table.
    ///
    /// Rule sets may be given in any order; lookup always runs from
    /// RESTRICTED down to PUBLIC. A tier may appear at most once.
    pub fn new(rules: Vec<ClassificationRule>) -> Result<Self> {
        let mut tiers = Vec::with_capacity(rules.len());

        for rule in rules {
            if tiers
                .iter()
                .any(|t: &CompiledTierRules| t.tier == rule.tier)
            {
                return Err(Error::InvalidRule(format!(
                    "Duplicate rule set for tier '{}'",
                    rule.tier
                )));
            }

            let patterns = rule
                .patterns
                .into_iter()
                .map(|p| {
                    let regex = Regex::new(&p.pattern).map_err(|e| {
                        Error::InvalidRule(format!(
                            "Invalid regex pattern for rule '{}' ({}): {}",
                            p.name, rule.tier, e
                        ))
                    })?;
                    Ok(CompiledPattern {
                        name: p.name,
                        regex,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            tiers.push(CompiledTierRules {
                tier: rule.tier,
                action: rule.action,
                fields: rule.fields.iter().map(|f| f.to_lowercase()).collect(),
                patterns,
            });
        }

        tiers.sort_by(|a, b| b.tier.cmp(&a.tier));
        Ok(Self { tiers })
    }

    /// The built-in table shared by every engine in the process
    pub fn standard() -> Arc<RuleTable> {
        STANDARD_TABLE.clone()
    }

    /// The ServiceNow field-mapping profile
    pub fn servicenow() -> Arc<RuleTable> {
        SERVICENOW_TABLE.clone()
    }

    /// Find the first matching rule for a field.
    ///
    /// Tiers are visited most restrictive first; within a tier the name set
    /// is checked before the content patterns.
    pub fn find_match(&self, field_name_lower: &str, value: &str) -> Option<RuleMatch> {
        for rules in &self.tiers {
            if rules.fields.contains(field_name_lower) {
                return Some(RuleMatch::FieldName {
                    tier: rules.tier,
                    action: rules.action,
                });
            }
            if rules.patterns.iter().any(|p| p.regex.is_match(value)) {
                return Some(RuleMatch::Pattern {
                    tier: rules.tier,
                    action: rules.action,
                });
            }
        }
        None
    }

    /// Declarative view of the table in lookup order, with sorted field names
    pub fn describe(&self) -> Vec<ClassificationRule> {
        self.tiers
            .iter()
            .map(|t| {
                let mut fields: Vec<String> = t.fields.iter().cloned().collect();
                fields.sort();
                ClassificationRule {
                    tier: t.tier,
                    action: t.action,
                    fields,
                    patterns: t
                        .patterns
                        .iter()
                        .map(|p| PatternRule::new(p.name.clone(), p.regex.as_str()))
                        .collect(),
                }
            })
            .collect()
    }

    /// Number of tier rule sets
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tiers.iter().map(|t| (t.tier, t.action)))
            .finish()
    }
}

/// Built-in rule profile selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleProfile {
    /// General-purpose rules for incident records
    #[default]
    Standard,
    /// Rules derived from the ServiceNow incident field mapping
    Servicenow,
}

impl RuleProfile {
    pub fn table(self) -> Arc<RuleTable> {
        match self {
            Self::Standard => RuleTable::standard(),
            Self::Servicenow => RuleTable::servicenow(),
        }
    }
}

impl FromStr for RuleProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "servicenow" => Ok(Self::Servicenow),
            _ => Err(Error::Config(format!(
                "Unknown rule profile: {}. Valid: standard, servicenow",
                s
            ))),
        }
    }
}

static STANDARD_TABLE: Lazy<Arc<RuleTable>> = Lazy::new(|| {
    Arc::new(RuleTable::new(standard_rules()).expect("standard rule patterns compile"))
});

static SERVICENOW_TABLE: Lazy<Arc<RuleTable>> = Lazy::new(|| {
    Arc::new(RuleTable::new(servicenow_rules()).expect("servicenow rule patterns compile"))
});

const SSN_PATTERN: &str = r"\b\d{3}-\d{2}-\d{4}\b";
const CREDIT_CARD_PATTERN: &str = r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b";
const PASSWORD_PATTERN: &str = r"(?i)(password|pwd|pass)\s*[:=]\s*\S+";
const API_KEY_PATTERN: &str = r"(?i)(api[_-]?key|apikey)\s*[:=]\s*[A-Za-z0-9_-]+";
const TOKEN_PATTERN: &str = r"(?i)(token|bearer)\s*[:=]\s*[A-Za-z0-9._-]+";
const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b";
const PHONE_PATTERN: &str = r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b";
const IP_ADDRESS_PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";

/// Rule sets of the standard profile
pub fn standard_rules() -> Vec<ClassificationRule> {
    vec![
        // Secrets and regulated identifiers: never leave the system
        ClassificationRule::new(ComplianceTier::Restricted, Action::Remove)
            .with_fields([
                "password",
                "token",
                "api_key",
                "secret",
                "private_key",
                "ssn",
                "social_security_number",
                "credit_card",
                "bank_account",
            ])
            .with_pattern("ssn", SSN_PATTERN)
            .with_pattern("credit_card", CREDIT_CARD_PATTERN)
            .with_pattern("password", PASSWORD_PATTERN),
        // Personal data: masked for internal use
        ClassificationRule::new(ComplianceTier::Confidential, Action::Mask)
            .with_fields([
                "caller_id",
                "email",
                "phone",
                "mobile_phone",
                "address",
                "employee_number",
                "ip_address",
                "mac_address",
            ])
            .with_pattern("email", EMAIL_PATTERN)
            .with_pattern("phone", PHONE_PATTERN)
            .with_pattern("ip_address", IP_ADDRESS_PATTERN),
        ClassificationRule::new(ComplianceTier::Internal, Action::Allow).with_fields([
            "department",
            "manager",
            "location",
            "building",
            "assignment_group",
            "assigned_to",
            "work_notes",
        ]),
        ClassificationRule::new(ComplianceTier::Public, Action::Allow).with_fields([
            "number",
            "short_description",
            "state",
            "priority",
            "urgency",
            "impact",
            "category",
            "subcategory",
            "opened_at",
            "updated_at",
            "resolved_at",
        ]),
    ]
}

/// Rule sets of the ServiceNow profile
pub fn servicenow_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(ComplianceTier::Restricted, Action::Remove)
            .with_fields([
                "work_notes",
                "comments",
                "close_notes",
                "resolution_notes",
                "additional_comments",
            ])
            .with_pattern("ssn", SSN_PATTERN)
            .with_pattern("credit_card", CREDIT_CARD_PATTERN)
            .with_pattern("password", PASSWORD_PATTERN)
            .with_pattern("api_key", API_KEY_PATTERN)
            .with_pattern("token", TOKEN_PATTERN),
        ClassificationRule::new(ComplianceTier::Confidential, Action::Mask)
            .with_fields(["caller_id", "opened_by", "contact_type", "location", "company"])
            .with_pattern("email", EMAIL_PATTERN)
            .with_pattern("phone", PHONE_PATTERN)
            .with_pattern("ip_address", IP_ADDRESS_PATTERN),
        ClassificationRule::new(ComplianceTier::Internal, Action::Allow).with_fields([
            "short_description",
            "description",
            "assignment_group",
            "assigned_to",
            "business_service",
            "cmdb_ci",
        ]),
        ClassificationRule::new(ComplianceTier::Public, Action::Allow).with_fields([
            "sys_id",
            "sys_created_on",
            "sys_updated_on",
            "number",
            "state",
            "priority",
            "urgency",
            "impact",
            "category",
            "subcategory",
        ]),
    ]
}

/// Field names considered sensitive regardless of profile
pub const SENSITIVE_FIELDS: &[&str] = &[
    // Personal
    "caller_id",
    "user_id",
    "email",
    "phone",
    "mobile_phone",
    "home_phone",
    "address",
    "location",
    "building",
    "department",
    "manager",
    "employee_number",
    "user_name",
    "display_name",
    // System
    "password",
    "token",
    "api_key",
    "secret",
    "private_key",
    "certificate",
    "hash",
    "encrypted_password",
    // Network
    "ip_address",
    "mac_address",
    "hostname",
    "domain",
    "network_adapter",
    "subnet",
    "gateway",
    // Financial
    "cost",
    "price",
    "budget",
    "expense",
    "invoice",
    "purchase_order",
    "credit_card",
    "bank_account",
    // Regulated identifiers
    "ssn",
    "social_security_number",
    "tax_id",
    "passport",
    "driver_license",
    "national_id",
    "medical_record",
    // Ticket notes
    "work_notes",
    "comments",
    "additional_comments",
    "resolution_notes",
    "close_notes",
];
