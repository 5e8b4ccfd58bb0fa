use std::collections::HashMap;

use super::domain::{CommissionStructure, EngineError, RateConfig, RepId, RepRateProfile};

/// Company-wide overhead fallback applied when a representative record has no
/// overhead percentage of its own. Inherited product value; confirm against
/// product requirements before changing.
pub const DEFAULT_OVERHEAD_PERCENT: f64 = 10.0;

/// Commission fallback for representative records missing a commission
/// percentage. Inherited product value; confirm against product requirements
/// before changing.
pub const DEFAULT_COMMISSION_PERCENT: f64 = 5.0;

/// Structure assumed for representative records missing one.
pub const DEFAULT_COMMISSION_STRUCTURE: CommissionStructure = CommissionStructure::SalesPercentage;

/// Source of representative rate profiles. Lookup failures must surface as
/// [`EngineError::MissingRateConfig`] through [`resolve_for`], never as a
/// silent default.
pub trait RateProfileSource: Send + Sync {
    fn profile(&self, rep_id: &RepId) -> Option<RepRateProfile>;
}

/// Resolve a raw representative record into an effective rate configuration.
///
/// Pure function over a snapshot of representative data: missing percentages
/// take the documented constants, and the overhead precedence (personal
/// override when present and positive, else company default) is baked in so
/// every caller sees the same effective rates.
pub fn resolve(profile: &RepRateProfile) -> RateConfig {
    RateConfig {
        overhead_percent: profile.overhead_percent.unwrap_or(DEFAULT_OVERHEAD_PERCENT),
        personal_overhead_percent: profile.personal_overhead_percent,
        commission_percent: profile
            .commission_percent
            .unwrap_or(DEFAULT_COMMISSION_PERCENT),
        commission_structure: profile
            .commission_structure
            .unwrap_or(DEFAULT_COMMISSION_STRUCTURE),
    }
}

/// Map-backed profile source for the demo server and tests. Production
/// deployments implement [`RateProfileSource`] over the staffing store.
#[derive(Debug, Default)]
pub struct InMemoryRateSource {
    profiles: HashMap<RepId, RepRateProfile>,
}

impl InMemoryRateSource {
    pub fn from_profiles(profiles: impl IntoIterator<Item = RepRateProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.rep_id.clone(), profile))
                .collect(),
        }
    }
}

impl RateProfileSource for InMemoryRateSource {
    fn profile(&self, rep_id: &RepId) -> Option<RepRateProfile> {
        self.profiles.get(rep_id).cloned()
    }
}

/// Look a representative up and resolve their rates in one step.
pub fn resolve_for<S: RateProfileSource + ?Sized>(
    source: &S,
    rep_id: &RepId,
) -> Result<RateConfig, EngineError> {
    let profile = source
        .profile(rep_id)
        .ok_or_else(|| EngineError::MissingRateConfig(rep_id.0.clone()))?;
    Ok(resolve(&profile))
}
