//! Incident source abstraction

use crate::compliance::Record;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Source of incident records, keyed by the ticketing system's `sys_id`.
///
/// Implementations wrap a remote ITSM API; the compliance layer only needs
/// to fetch a ticket as a flat record.
#[async_trait]
pub trait IncidentSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &str;

    /// Fetch an incident. `Ok(None)` means the identifier is unknown.
    async fn fetch_incident(&self, sys_id: &str) -> Result<Option<Record>>;
}

/// Incident source backed by a fixed set of records.
///
/// Used for local runs and tests: the fixture file is a JSON object mapping
/// `sys_id` to the incident record.
pub struct FixtureIncidentSource {
    incidents: HashMap<String, Record>,
}

impl FixtureIncidentSource {
    pub fn new(incidents: HashMap<String, Record>) -> Self {
        Self { incidents }
    }

    /// Load incidents from a JSON fixture file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let root: Value = serde_json::from_str(&content)?;

        let Value::Object(entries) = root else {
            return Err(Error::Source(format!(
                "Fixture {} must be a JSON object of sys_id to incident",
                path.display()
            )));
        };

        let mut incidents = HashMap::with_capacity(entries.len());
        for (sys_id, value) in entries {
            match value {
                Value::Object(record) => {
                    incidents.insert(sys_id, record);
                }
                _ => {
                    return Err(Error::Source(format!(
                        "Incident '{}' in {} is not an object",
                        sys_id,
                        path.display()
                    )))
                }
            }
        }

        tracing::info!(
            path = %path.display(),
            count = incidents.len(),
            "Loaded incident fixtures"
        );
        Ok(Self::new(incidents))
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

#[async_trait]
impl IncidentSource for FixtureIncidentSource {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch_incident(&self, sys_id: &str) -> Result<Option<Record>> {
        Ok(self.incidents.get(sys_id).cloned())
    }
}
