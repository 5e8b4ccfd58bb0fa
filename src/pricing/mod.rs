//! Guaranteed-margin pricing and commission allocation for job estimates.
//!
//! The calculation components (`rates`, `solver`, `commission`,
//! `distribution`, `engine`) are pure functions over explicitly supplied
//! inputs; the `coordinator` owns the recompute-on-change contract over a
//! repository seam, and the `router` exposes both to HTTP callers.

pub mod catalog;
pub(crate) mod commission;
pub(crate) mod distribution;
pub mod domain;
pub mod engine;
pub mod lineitems;
pub mod rates;
pub mod repository;
pub mod router;
pub(crate) mod solver;

pub mod coordinator;

#[cfg(test)]
mod tests;

pub use catalog::{ComplexityClass, CostTemplate, RegionZone, Season};
pub use coordinator::{
    AssignmentChange, CoordinatorError, EstimateOverrides, EstimateRecomputeCoordinator,
    NewEstimate,
};
pub use domain::{
    CommissionStructure, CostInputs, EngineError, EstimateBreakdown, EstimateId, RateConfig,
    RepAssignment, RepId, RepRateProfile, SplitShares, TargetPercentages,
};
pub use engine::compute_breakdown;
pub use lineitems::{ImportedTotals, LineItem, LineItemCategory, LineItemImportError};
pub use rates::{
    resolve, resolve_for, InMemoryRateSource, RateProfileSource, DEFAULT_COMMISSION_PERCENT,
    DEFAULT_OVERHEAD_PERCENT,
};
pub use repository::{
    EstimateInputs, EstimateRecord, EstimateRepository, EstimateStatusView,
    InMemoryEstimateRepository,
    RecomputeState, RepositoryError, StoreOutcome, VersionedBreakdown,
};
pub use router::estimate_router;
