//! Service configuration

use crate::compliance::{ComplianceEngine, ComplianceTier, Pseudonymizer, RuleProfile};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Compliance engine configuration
    #[serde(default)]
    pub compliance: ComplianceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8085,
            cors_origins: Vec::new(),
        }
    }
}

/// Compliance engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Tier used when a caller does not specify one
    pub default_target_tier: ComplianceTier,

    /// Built-in rule table
    pub profile: RuleProfile,

    /// Environment variable holding the pseudonymization secret.
    /// When unset or empty, pseudo-identifiers use an unkeyed digest.
    pub pseudonym_key_env: Option<String>,

    /// JSON fixture of incidents (sys_id → record) served by the incident route
    pub incident_fixture: Option<PathBuf>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            default_target_tier: ComplianceTier::Internal,
            profile: RuleProfile::Standard,
            pseudonym_key_env: None,
            incident_fixture: None,
        }
    }
}

impl ComplianceConfig {
    /// Pseudonymizer selected by `pseudonym_key_env`
    pub fn pseudonymizer(&self) -> Pseudonymizer {
        let secret = self
            .pseudonym_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|s| !s.is_empty());

        match secret {
            Some(secret) => Pseudonymizer::keyed(secret.as_bytes()),
            None => {
                if let Some(var) = &self.pseudonym_key_env {
                    tracing::warn!(
                        env = %var,
                        "Pseudonym key variable not set, using unkeyed digest"
                    );
                }
                Pseudonymizer::Digest
            }
        }
    }

    /// Build the engine described by this configuration
    pub fn build_engine(&self) -> ComplianceEngine {
        ComplianceEngine::with_rules(self.profile.table()).with_pseudonymizer(self.pseudonymizer())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable output
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if let Some(var) = &self.compliance.pseudonym_key_env {
            if var.trim().is_empty() {
                return Err(Error::Config(
                    "compliance.pseudonym_key_env must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8085);
        assert_eq!(
            config.compliance.default_target_tier,
            ComplianceTier::Internal
        );
        assert_eq!(config.compliance.profile, RuleProfile::Standard);
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [compliance]
            default_target_tier = "confidential"
            profile = "servicenow"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.compliance.default_target_tier,
            ComplianceTier::Confidential
        );
        assert_eq!(config.compliance.profile, RuleProfile::Servicenow);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_unknown_tier_in_toml_rejected() {
        let result: std::result::Result<AppConfig, _> = toml::from_str(
            r#"
            [compliance]
            default_target_tier = "secret"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9000\n\n[logging]\njson = true").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_invalid_port() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 0").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/itsm-compliance.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_pseudonymizer_without_env() {
        let config = ComplianceConfig {
            pseudonym_key_env: Some("ITSM_COMPLIANCE_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.pseudonymizer(), Pseudonymizer::Digest));
    }

    #[test]
    fn test_roundtrip_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
    }
}
