use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    CostInputs, EstimateBreakdown, EstimateId, RepId, SplitShares, TargetPercentages,
};

/// Breakdown freshness relative to the estimate's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeState {
    Stale,
    Recomputing,
    Current,
}

impl RecomputeState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stale => "Stale",
            Self::Recomputing => "Recomputing",
            Self::Current => "Current",
        }
    }
}

/// Breakdown tagged with the trigger version that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedBreakdown {
    pub version: u64,
    pub computed_at: DateTime<Utc>,
    pub breakdown: EstimateBreakdown,
}

/// Persisted estimate: the raw inputs, the representative assignment by id,
/// and the latest complete breakdown. Rates are looked up fresh on every
/// recompute rather than stored, so a stale copy can never feed the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    pub estimate_id: EstimateId,
    pub costs: CostInputs,
    pub targets: TargetPercentages,
    pub primary_rep: RepId,
    pub secondary_rep: Option<RepId>,
    /// Requested profit-split shares; eligibility is rechecked on every
    /// recompute against the reps' resolved rates.
    pub requested_split: Option<SplitShares>,
    pub state: RecomputeState,
    /// Monotonic per-estimate trigger version; each trigger claims the next
    /// value before computing.
    pub version: u64,
    pub breakdown: Option<VersionedBreakdown>,
    pub updated_at: DateTime<Utc>,
}

impl EstimateRecord {
    pub fn new(
        estimate_id: EstimateId,
        costs: CostInputs,
        targets: TargetPercentages,
        primary_rep: RepId,
        secondary_rep: Option<RepId>,
        requested_split: Option<SplitShares>,
    ) -> Self {
        Self {
            estimate_id,
            costs,
            targets,
            primary_rep,
            secondary_rep,
            requested_split,
            state: RecomputeState::Stale,
            version: 0,
            breakdown: None,
            updated_at: Utc::now(),
        }
    }
}

impl EstimateRecord {
    /// Sanitized representation for API responses.
    pub fn status_view(&self) -> EstimateStatusView {
        EstimateStatusView {
            estimate_id: self.estimate_id.clone(),
            state: self.state.label(),
            version: self.version,
            computed_at: self.breakdown.as_ref().map(|b| b.computed_at),
            breakdown: self.breakdown.as_ref().map(|b| b.breakdown.clone()),
        }
    }
}

/// Exposed estimate status plus the latest complete breakdown, if any.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateStatusView {
    pub estimate_id: EstimateId,
    pub state: &'static str,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<EstimateBreakdown>,
}

/// The input fields a trigger may edit. Version, state, and breakdown stay
/// owned by the store so an edit can never roll them back.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateInputs {
    pub costs: CostInputs,
    pub targets: TargetPercentages,
    pub primary_rep: RepId,
    pub secondary_rep: Option<RepId>,
    pub requested_split: Option<SplitShares>,
}

/// Result of a versioned breakdown write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The breakdown replaced the record's breakdown wholesale.
    Applied,
    /// A newer trigger already owns the record; the write was dropped.
    Discarded,
}

/// Storage abstraction so the coordinator and router can be exercised in
/// isolation.
pub trait EstimateRepository: Send + Sync {
    fn insert(&self, record: EstimateRecord) -> Result<EstimateRecord, RepositoryError>;
    fn fetch(&self, id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError>;

    /// Apply an input edit and claim the next trigger version in one atomic
    /// step, returning the claimed version. The edit sees only the estimate's
    /// inputs; a concurrently stored breakdown or claimed version is never
    /// overwritten by the write-back.
    fn update_inputs(
        &self,
        id: &EstimateId,
        apply: &mut dyn FnMut(&mut EstimateInputs),
    ) -> Result<u64, RepositoryError>;

    /// Atomically bump the estimate's trigger version and mark it
    /// recomputing, returning the claimed version.
    fn claim_version(&self, id: &EstimateId) -> Result<u64, RepositoryError>;

    /// Replace the record's breakdown if `version` is newer than the stored
    /// one (last-trigger-wins); otherwise discard the write.
    fn store_breakdown(
        &self,
        id: &EstimateId,
        version: u64,
        breakdown: EstimateBreakdown,
    ) -> Result<StoreOutcome, RepositoryError>;

    /// Mark the estimate stale (recompute failed or inputs changed without a
    /// successful recompute yet). The prior breakdown is kept as-is.
    fn mark_stale(&self, id: &EstimateId) -> Result<(), RepositoryError>;

    fn stale(&self, limit: usize) -> Result<Vec<EstimateRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("estimate already exists")]
    Conflict,
    #[error("estimate not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Mutex-guarded map store backing the router, CLI, and tests.
#[derive(Default)]
pub struct InMemoryEstimateRepository {
    records: Mutex<HashMap<EstimateId, EstimateRecord>>,
}

impl InMemoryEstimateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<EstimateId, EstimateRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("estimate store poisoned".to_string()))
    }
}

impl EstimateRepository for InMemoryEstimateRepository {
    fn insert(&self, record: EstimateRecord) -> Result<EstimateRecord, RepositoryError> {
        let mut records = self.lock()?;
        if records.contains_key(&record.estimate_id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(record.estimate_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn update_inputs(
        &self,
        id: &EstimateId,
        apply: &mut dyn FnMut(&mut EstimateInputs),
    ) -> Result<u64, RepositoryError> {
        let mut records = self.lock()?;
        let record = records.get_mut(id).ok_or(RepositoryError::NotFound)?;

        let mut inputs = EstimateInputs {
            costs: record.costs,
            targets: record.targets,
            primary_rep: record.primary_rep.clone(),
            secondary_rep: record.secondary_rep.clone(),
            requested_split: record.requested_split,
        };
        apply(&mut inputs);

        record.costs = inputs.costs;
        record.targets = inputs.targets;
        record.primary_rep = inputs.primary_rep;
        record.secondary_rep = inputs.secondary_rep;
        record.requested_split = inputs.requested_split;
        record.version += 1;
        record.state = RecomputeState::Recomputing;
        record.updated_at = Utc::now();
        Ok(record.version)
    }

    fn claim_version(&self, id: &EstimateId) -> Result<u64, RepositoryError> {
        let mut records = self.lock()?;
        let record = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.version += 1;
        record.state = RecomputeState::Recomputing;
        record.updated_at = Utc::now();
        Ok(record.version)
    }

    fn store_breakdown(
        &self,
        id: &EstimateId,
        version: u64,
        breakdown: EstimateBreakdown,
    ) -> Result<StoreOutcome, RepositoryError> {
        let mut records = self.lock()?;
        let record = records.get_mut(id).ok_or(RepositoryError::NotFound)?;

        if let Some(existing) = &record.breakdown {
            if existing.version >= version {
                return Ok(StoreOutcome::Discarded);
            }
        }

        record.breakdown = Some(VersionedBreakdown {
            version,
            computed_at: Utc::now(),
            breakdown,
        });
        // A later trigger may already have claimed a newer version; only the
        // newest trigger's completion makes the record current.
        if record.version == version {
            record.state = RecomputeState::Current;
        }
        record.updated_at = Utc::now();
        Ok(StoreOutcome::Applied)
    }

    fn mark_stale(&self, id: &EstimateId) -> Result<(), RepositoryError> {
        let mut records = self.lock()?;
        let record = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.state = RecomputeState::Stale;
        record.updated_at = Utc::now();
        Ok(())
    }

    fn stale(&self, limit: usize) -> Result<Vec<EstimateRecord>, RepositoryError> {
        let records = self.lock()?;
        Ok(records
            .values()
            .filter(|record| record.state == RecomputeState::Stale)
            .take(limit)
            .cloned()
            .collect())
    }
}
