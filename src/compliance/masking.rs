//! Field masking strategies
//!
//! Strategies are chosen by checking whether a strategy key occurs as a
//! substring of the lower-cased field name. Keys are tried in the fixed
//! order of [`STRATEGIES`]; the generic fallback applies when none match.

use ring::hmac;
use sha2::{Digest, Sha256};
use std::fmt;

/// Redaction applied to a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskStrategy {
    /// Keep first and last character of the local part and the domain
    Email,
    /// Keep the last four digits
    Phone,
    /// Keep the first two octets
    IpAddress,
    /// `USER_NNNN` pseudo-identifier
    CallerId,
    /// `EMP_NNNN` pseudo-identifier
    EmployeeNumber,
    /// Up to eight asterisks
    Default,
}

/// Strategy lookup table, in match order
pub const STRATEGIES: &[(&str, MaskStrategy)] = &[
    ("email", MaskStrategy::Email),
    ("phone", MaskStrategy::Phone),
    ("ip_address", MaskStrategy::IpAddress),
    ("caller_id", MaskStrategy::CallerId),
    ("employee_number", MaskStrategy::EmployeeNumber),
];

impl MaskStrategy {
    /// Pick the strategy for a field name
    pub fn for_field(field_name: &str) -> Self {
        let lower = field_name.to_lowercase();
        STRATEGIES
            .iter()
            .find(|(key, _)| lower.contains(key))
            .map(|(_, strategy)| *strategy)
            .unwrap_or(MaskStrategy::Default)
    }

    /// Apply the strategy to a value's text form
    pub fn apply(self, value: &str, pseudonymizer: &Pseudonymizer) -> String {
        match self {
            Self::Email => mask_email(value),
            Self::Phone => mask_phone(value),
            Self::IpAddress => mask_ip(value),
            Self::CallerId => format!("USER_{:04}", pseudonymizer.bucket(value)),
            Self::EmployeeNumber => format!("EMP_{:04}", pseudonymizer.bucket(value)),
            Self::Default => "*".repeat(value.chars().count().min(8)),
        }
    }
}

/// Source of the numeric bucket behind `USER_`/`EMP_` pseudo-identifiers.
///
/// Buckets are `hash mod 10000`, so distinct values collide often. This is
/// obfuscation for display, not anonymization. The keyed variant only
/// prevents recomputing a bucket without the secret.
#[derive(Default)]
pub enum Pseudonymizer {
    /// Unkeyed SHA-256
    #[default]
    Digest,
    /// HMAC-SHA256 with a deployment secret
    Keyed(hmac::Key),
}

impl Pseudonymizer {
    /// Keyed pseudonymizer from raw secret bytes
    pub fn keyed(secret: &[u8]) -> Self {
        Self::Keyed(hmac::Key::new(hmac::HMAC_SHA256, secret))
    }

    /// Deterministic bucket in `0..10000`
    pub fn bucket(&self, value: &str) -> u64 {
        let mut prefix = [0u8; 8];
        match self {
            Self::Digest => {
                let digest = Sha256::digest(value.as_bytes());
                prefix.copy_from_slice(&digest[..8]);
            }
            Self::Keyed(key) => {
                let tag = hmac::sign(key, value.as_bytes());
                prefix.copy_from_slice(&tag.as_ref()[..8]);
            }
        }
        u64::from_be_bytes(prefix) % 10_000
    }
}

impl fmt::Debug for Pseudonymizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest => f.write_str("Pseudonymizer::Digest"),
            Self::Keyed(_) => f.write_str("Pseudonymizer::Keyed(..)"),
        }
    }
}

fn stars(n: usize) -> String {
    "*".repeat(n)
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let chars: Vec<char> = local.chars().collect();
            let masked_local = if chars.len() > 2 {
                format!(
                    "{}{}{}",
                    chars[0],
                    stars(chars.len() - 2),
                    chars[chars.len() - 1]
                )
            } else {
                stars(chars.len())
            };
            format!("{}@{}", masked_local, domain)
        }
        None => stars(email.chars().count()),
    }
}

fn mask_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 10 {
        format!("***-***-{}", &digits[digits.len() - 4..])
    } else {
        stars(phone.chars().count())
    }
}

fn mask_ip(ip: &str) -> String {
    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() == 4 {
        format!("{}.{}.***.**", parts[0], parts[1])
    } else {
        stars(ip.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(field: &str, value: &str) -> String {
        MaskStrategy::for_field(field).apply(value, &Pseudonymizer::Digest)
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(MaskStrategy::for_field("email"), MaskStrategy::Email);
        assert_eq!(MaskStrategy::for_field("Contact_Email"), MaskStrategy::Email);
        assert_eq!(MaskStrategy::for_field("mobile_phone"), MaskStrategy::Phone);
        assert_eq!(MaskStrategy::for_field("ip_address"), MaskStrategy::IpAddress);
        assert_eq!(MaskStrategy::for_field("caller_id"), MaskStrategy::CallerId);
        assert_eq!(
            MaskStrategy::for_field("employee_number"),
            MaskStrategy::EmployeeNumber
        );
        assert_eq!(MaskStrategy::for_field("address"), MaskStrategy::Default);
        assert_eq!(MaskStrategy::for_field("mac_address"), MaskStrategy::Default);
    }

    #[test]
    fn test_first_key_wins() {
        // Contains both "email" and "phone"; email is earlier in the table
        assert_eq!(MaskStrategy::for_field("email_or_phone"), MaskStrategy::Email);
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask("email", "john.doe@example.com"), "j******e@example.com");
        assert_eq!(mask("email", "ab@example.com"), "**@example.com");
        assert_eq!(mask("email", "a@b@c.com"), "*@b@c.com");
        assert_eq!(mask("email", "not-an-email"), "************");
    }

    #[test]
    fn test_mask_email_is_deterministic() {
        let first = mask("email", "john.doe@example.com");
        for _ in 0..10 {
            assert_eq!(mask("email", "john.doe@example.com"), first);
        }
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask("phone", "(555) 123-4567"), "***-***-4567");
        assert_eq!(mask("phone", "+1 555 123 4567"), "***-***-4567");
        assert_eq!(mask("phone", "12345"), "*****");
    }

    #[test]
    fn test_mask_ip() {
        assert_eq!(mask("ip_address", "192.168.10.25"), "192.168.***.**");
        assert_eq!(mask("ip_address", "fe80::1"), "*******");
    }

    #[test]
    fn test_mask_default() {
        assert_eq!(mask("address", "1 Main St"), "********");
        assert_eq!(mask("address", "abc"), "***");
        assert_eq!(mask("address", ""), "");
    }

    #[test]
    fn test_pseudonyms() {
        let user = mask("caller_id", "jsmith");
        assert!(user.starts_with("USER_"));
        assert_eq!(user.len(), "USER_0000".len());
        assert_eq!(user, mask("caller_id", "jsmith"));

        let emp = mask("employee_number", "E-1001");
        assert!(emp.starts_with("EMP_"));
        assert_eq!(emp.len(), "EMP_0000".len());
    }

    #[test]
    fn test_bucket_range() {
        let digest = Pseudonymizer::Digest;
        let keyed = Pseudonymizer::keyed(b"deployment-secret");
        for value in ["", "a", "jsmith", "another user"] {
            assert!(digest.bucket(value) < 10_000);
            assert!(keyed.bucket(value) < 10_000);
        }
    }

    #[test]
    fn test_keyed_differs_by_key() {
        let a = Pseudonymizer::keyed(b"key-a");
        let b = Pseudonymizer::keyed(b"key-b");
        let values = ["u1", "u2", "u3", "u4", "u5", "u6", "u7", "u8"];
        assert!(values.iter().any(|v| a.bucket(v) != b.bucket(v)));
        assert_eq!(a.bucket("u1"), Pseudonymizer::keyed(b"key-a").bucket("u1"));
    }
}
