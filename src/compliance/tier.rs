//! Compliance tiers and filtering actions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sensitivity tier of a record field.
///
/// Variants are declared from least to most restrictive, so the derived
/// `Ord` gives "more restrictive than" as a plain `>` comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceTier {
    /// Safe for external sharing
    Public,
    /// Internal systems only
    #[default]
    Internal,
    /// Personal data; masked before leaving internal systems
    Confidential,
    /// Secrets and regulated identifiers; never shared
    Restricted,
}

impl ComplianceTier {
    /// All tiers, most restrictive first. This is the classification order.
    pub const MOST_RESTRICTIVE_FIRST: [ComplianceTier; 4] = [
        ComplianceTier::Restricted,
        ComplianceTier::Confidential,
        ComplianceTier::Internal,
        ComplianceTier::Public,
    ];

    /// Lowercase name used in reasons and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Confidential => "confidential",
            Self::Restricted => "restricted",
        }
    }

    /// Whether this tier is strictly more restrictive than `other`
    pub fn is_more_restrictive_than(self, other: ComplianceTier) -> bool {
        self > other
    }
}

impl fmt::Display for ComplianceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "internal" => Ok(Self::Internal),
            "confidential" => Ok(Self::Confidential),
            "restricted" => Ok(Self::Restricted),
            _ => Err(Error::UnknownTier(s.to_string())),
        }
    }
}

/// Transformation applied to a field during filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Keep the value unchanged
    Allow,
    /// Replace the value with a redacted representation
    Mask,
    /// Drop the field
    Remove,
    /// Replace the value with a digest placeholder (not reversible)
    Encrypt,
}

impl Action {
    /// Whether the action mitigates exposure of the original value
    pub fn is_mitigating(self) -> bool {
        !matches!(self, Self::Allow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Mask => "mask",
            Self::Remove => "remove",
            Self::Encrypt => "encrypt",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(ComplianceTier::Public < ComplianceTier::Internal);
        assert!(ComplianceTier::Internal < ComplianceTier::Confidential);
        assert!(ComplianceTier::Confidential < ComplianceTier::Restricted);
        assert!(ComplianceTier::Restricted.is_more_restrictive_than(ComplianceTier::Internal));
        assert!(!ComplianceTier::Internal.is_more_restrictive_than(ComplianceTier::Internal));
    }

    #[test]
    fn test_classification_order_is_descending() {
        let order = ComplianceTier::MOST_RESTRICTIVE_FIRST;
        assert!(order.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_parse_tier() {
        assert_eq!("public".parse::<ComplianceTier>().unwrap(), ComplianceTier::Public);
        assert_eq!(
            "RESTRICTED".parse::<ComplianceTier>().unwrap(),
            ComplianceTier::Restricted
        );
        assert_eq!(
            " Confidential ".parse::<ComplianceTier>().unwrap(),
            ComplianceTier::Confidential
        );
    }

    #[test]
    fn test_parse_unknown_tier() {
        let err = "secret".parse::<ComplianceTier>().unwrap_err();
        assert!(matches!(err, Error::UnknownTier(ref s) if s == "secret"));
        assert_eq!(err.to_string(), "Unknown compliance tier: secret");
    }

    #[test]
    fn test_default_tier_is_internal() {
        assert_eq!(ComplianceTier::default(), ComplianceTier::Internal);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ComplianceTier::Confidential).unwrap();
        assert_eq!(json, "\"confidential\"");
        let action: Action = serde_json::from_str("\"encrypt\"").unwrap();
        assert_eq!(action, Action::Encrypt);
    }

    #[test]
    fn test_mitigating_actions() {
        assert!(!Action::Allow.is_mitigating());
        assert!(Action::Mask.is_mitigating());
        assert!(Action::Remove.is_mitigating());
        assert!(Action::Encrypt.is_mitigating());
    }
}
