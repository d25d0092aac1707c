//! Fetch-and-filter pipeline for incidents

use super::source::IncidentSource;
use crate::compliance::{ComplianceEngine, ComplianceResult, ComplianceTier};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Fetches incidents from a source and runs them through the compliance engine
pub struct IncidentFilter {
    source: Arc<dyn IncidentSource>,
    engine: Arc<ComplianceEngine>,
}

impl IncidentFilter {
    pub fn new(source: Arc<dyn IncidentSource>, engine: Arc<ComplianceEngine>) -> Self {
        Self { source, engine }
    }

    /// Fetch an incident and filter it for `tier`.
    ///
    /// Returns [`Error::NotFound`] when the source has no such incident.
    pub async fn filter_incident(
        &self,
        sys_id: &str,
        tier: ComplianceTier,
    ) -> Result<ComplianceResult> {
        let incident = self.source.fetch_incident(sys_id).await?.ok_or_else(|| {
            tracing::warn!(sys_id, source = self.source.name(), "Incident not found");
            Error::NotFound(format!("Incident '{}' not found", sys_id))
        })?;

        tracing::debug!(
            sys_id,
            field_count = incident.len(),
            source = self.source.name(),
            "Fetched incident"
        );
        Ok(self.engine.filter_data(&incident, tier))
    }
}
