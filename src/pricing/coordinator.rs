use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{
    CostInputs, EngineError, EstimateId, RepAssignment, RepId, SplitShares, TargetPercentages,
};
use super::engine::compute_breakdown;
use super::rates::{resolve_for, RateProfileSource};
use super::repository::{EstimateRecord, EstimateRepository, RepositoryError, StoreOutcome};

/// Inputs for a new estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEstimate {
    pub costs: CostInputs,
    pub targets: TargetPercentages,
    pub primary_rep: RepId,
    #[serde(default)]
    pub secondary_rep: Option<RepId>,
    #[serde(default)]
    pub requested_split: Option<SplitShares>,
}

/// Manual override submission: any field present replaces the stored one and
/// forces a full recompute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimateOverrides {
    #[serde(default)]
    pub costs: Option<CostInputs>,
    #[serde(default)]
    pub targets: Option<TargetPercentages>,
}

/// New representative assignment for an existing estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentChange {
    pub primary_rep: RepId,
    #[serde(default)]
    pub secondary_rep: Option<RepId>,
    #[serde(default)]
    pub requested_split: Option<SplitShares>,
}

/// Coordinates when the pricing pipeline re-runs for persisted estimates.
///
/// Every trigger (assignment change, rate edit, manual override) claims the
/// estimate's next monotonic version, re-resolves rates fresh, runs the full
/// pipeline, and replaces the breakdown atomically. A completion carrying a
/// version older than the record's current one is discarded, so the last
/// trigger wins even when an earlier recompute finishes later.
pub struct EstimateRecomputeCoordinator<R, S> {
    repository: Arc<R>,
    rates: Arc<S>,
}

static ESTIMATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_estimate_id() -> EstimateId {
    let id = ESTIMATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EstimateId(format!("est-{id:06}"))
}

impl<R, S> EstimateRecomputeCoordinator<R, S>
where
    R: EstimateRepository + 'static,
    S: RateProfileSource + 'static,
{
    pub fn new(repository: Arc<R>, rates: Arc<S>) -> Self {
        Self { repository, rates }
    }

    /// Create an estimate and price it immediately.
    pub fn create(&self, request: NewEstimate) -> Result<EstimateRecord, CoordinatorError> {
        let record = EstimateRecord::new(
            next_estimate_id(),
            request.costs,
            request.targets,
            request.primary_rep,
            request.secondary_rep,
            request.requested_split,
        );

        let stored = self.repository.insert(record)?;
        self.recompute(&stored.estimate_id)
    }

    /// Representative (re)assignment trigger.
    pub fn reassign(
        &self,
        estimate_id: &EstimateId,
        change: AssignmentChange,
    ) -> Result<EstimateRecord, CoordinatorError> {
        let claimed_version = self.repository.update_inputs(estimate_id, &mut |inputs| {
            inputs.primary_rep = change.primary_rep.clone();
            inputs.secondary_rep = change.secondary_rep.clone();
            inputs.requested_split = change.requested_split;
        })?;
        self.run_pipeline(estimate_id, claimed_version)
    }

    /// Manual override trigger.
    pub fn apply_overrides(
        &self,
        estimate_id: &EstimateId,
        overrides: EstimateOverrides,
    ) -> Result<EstimateRecord, CoordinatorError> {
        let claimed_version = self.repository.update_inputs(estimate_id, &mut |inputs| {
            if let Some(costs) = overrides.costs {
                inputs.costs = costs;
            }
            if let Some(targets) = overrides.targets {
                inputs.targets = targets;
            }
        })?;
        self.run_pipeline(estimate_id, claimed_version)
    }

    /// Rate-config edit trigger: the stored inputs are unchanged, but the
    /// representatives' rates must be re-resolved and the breakdown rebuilt.
    pub fn rates_changed(
        &self,
        estimate_id: &EstimateId,
    ) -> Result<EstimateRecord, CoordinatorError> {
        self.recompute(estimate_id)
    }

    pub fn get(&self, estimate_id: &EstimateId) -> Result<EstimateRecord, CoordinatorError> {
        self.require(estimate_id).map_err(CoordinatorError::from)
    }

    /// Estimates whose breakdowns no longer match their inputs, for review
    /// queues and retry sweeps.
    pub fn stale(&self, limit: usize) -> Result<Vec<EstimateRecord>, CoordinatorError> {
        self.repository.stale(limit).map_err(CoordinatorError::from)
    }

    /// Run the full pipeline for the estimate's current inputs under a fresh
    /// trigger version. On an engine error the record is marked stale and the
    /// previous breakdown is left untouched; partial field updates never
    /// happen because the breakdown is replaced wholesale or not at all.
    pub fn recompute(&self, estimate_id: &EstimateId) -> Result<EstimateRecord, CoordinatorError> {
        let claimed_version = self.repository.claim_version(estimate_id)?;
        self.run_pipeline(estimate_id, claimed_version)
    }

    /// Run the engine under an already-claimed version. Input-editing
    /// triggers claim theirs atomically with the edit, so they skip the
    /// separate `claim_version` step.
    fn run_pipeline(
        &self,
        estimate_id: &EstimateId,
        claimed_version: u64,
    ) -> Result<EstimateRecord, CoordinatorError> {
        let record = self.require(estimate_id)?;

        let assignment = match self.resolve_assignment(&record) {
            Ok(assignment) => assignment,
            Err(err) => {
                self.repository.mark_stale(estimate_id)?;
                return Err(err.into());
            }
        };

        match compute_breakdown(&record.costs, &record.targets, &assignment) {
            Ok(breakdown) => {
                let outcome =
                    self.repository
                        .store_breakdown(estimate_id, claimed_version, breakdown)?;
                if outcome == StoreOutcome::Discarded {
                    warn!(
                        estimate_id = %record.estimate_id.0,
                        version = claimed_version,
                        "discarded superseded recompute"
                    );
                } else {
                    info!(
                        estimate_id = %record.estimate_id.0,
                        version = claimed_version,
                        "estimate breakdown replaced"
                    );
                }
                self.require(estimate_id).map_err(CoordinatorError::from)
            }
            Err(err) => {
                self.repository.mark_stale(estimate_id)?;
                Err(err.into())
            }
        }
    }

    fn require(&self, estimate_id: &EstimateId) -> Result<EstimateRecord, RepositoryError> {
        self.repository
            .fetch(estimate_id)?
            .ok_or(RepositoryError::NotFound)
    }

    /// Resolve the record's representative ids into an assignment with the
    /// effective rates applied. A requested split on a single-rep estimate is
    /// ignored; a requested split with a secondary goes through the
    /// split-eligibility rules and surfaces their errors.
    fn resolve_assignment(&self, record: &EstimateRecord) -> Result<RepAssignment, EngineError> {
        let primary = resolve_for(self.rates.as_ref(), &record.primary_rep)?;

        let secondary = match &record.secondary_rep {
            Some(rep_id) => Some(resolve_for(self.rates.as_ref(), rep_id)?),
            None => None,
        };

        Ok(match (secondary, record.requested_split) {
            (Some(secondary), Some(shares)) => {
                RepAssignment::profit_split(primary, secondary, shares)?
            }
            (Some(secondary), None) => RepAssignment::Dual { primary, secondary },
            (None, _) => RepAssignment::Single { primary },
        })
    }
}

/// Error raised by the recompute coordinator; engine errors pass through
/// unchanged so callers can block finalization on them.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
