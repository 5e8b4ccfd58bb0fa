use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::coordinator::{
    AssignmentChange, CoordinatorError, EstimateOverrides, EstimateRecomputeCoordinator,
    NewEstimate,
};
use super::domain::{
    CostInputs, EstimateId, RepAssignment, RepRateProfile, SplitShares, TargetPercentages,
};
use super::engine::compute_breakdown;
use super::rates::{resolve, RateProfileSource};
use super::repository::{EstimateRepository, RepositoryError};

/// Router builder exposing the estimate pricing endpoints.
pub fn estimate_router<R, S>(coordinator: Arc<EstimateRecomputeCoordinator<R, S>>) -> Router
where
    R: EstimateRepository + 'static,
    S: RateProfileSource + 'static,
{
    Router::new()
        .route("/api/v1/estimates", post(create_handler::<R, S>))
        .route("/api/v1/estimates/price", post(price_handler))
        .route("/api/v1/estimates/stale", get(stale_handler::<R, S>))
        .route(
            "/api/v1/estimates/:estimate_id",
            get(status_handler::<R, S>),
        )
        .route(
            "/api/v1/estimates/:estimate_id/assignment",
            post(assignment_handler::<R, S>),
        )
        .route(
            "/api/v1/estimates/:estimate_id/overrides",
            post(overrides_handler::<R, S>),
        )
        .with_state(coordinator)
}

/// Stateless pricing request: the caller supplies the raw representative
/// profiles directly, and the engine runs without touching any store.
#[derive(Debug, Deserialize)]
pub(crate) struct PriceRequest {
    costs: CostInputs,
    targets: TargetPercentages,
    primary: RepRateProfile,
    #[serde(default)]
    secondary: Option<RepRateProfile>,
    #[serde(default)]
    requested_split: Option<SplitShares>,
}

pub(crate) async fn create_handler<R, S>(
    State(coordinator): State<Arc<EstimateRecomputeCoordinator<R, S>>>,
    axum::Json(request): axum::Json<NewEstimate>,
) -> Response
where
    R: EstimateRepository + 'static,
    S: RateProfileSource + 'static,
{
    match coordinator.create(request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R, S>(
    State(coordinator): State<Arc<EstimateRecomputeCoordinator<R, S>>>,
    Path(estimate_id): Path<String>,
) -> Response
where
    R: EstimateRepository + 'static,
    S: RateProfileSource + 'static,
{
    match coordinator.get(&EstimateId(estimate_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn assignment_handler<R, S>(
    State(coordinator): State<Arc<EstimateRecomputeCoordinator<R, S>>>,
    Path(estimate_id): Path<String>,
    axum::Json(change): axum::Json<AssignmentChange>,
) -> Response
where
    R: EstimateRepository + 'static,
    S: RateProfileSource + 'static,
{
    match coordinator.reassign(&EstimateId(estimate_id), change) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn overrides_handler<R, S>(
    State(coordinator): State<Arc<EstimateRecomputeCoordinator<R, S>>>,
    Path(estimate_id): Path<String>,
    axum::Json(overrides): axum::Json<EstimateOverrides>,
) -> Response
where
    R: EstimateRepository + 'static,
    S: RateProfileSource + 'static,
{
    match coordinator.apply_overrides(&EstimateId(estimate_id), overrides) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StaleQuery {
    #[serde(default = "default_stale_limit")]
    limit: usize,
}

fn default_stale_limit() -> usize {
    20
}

pub(crate) async fn stale_handler<R, S>(
    State(coordinator): State<Arc<EstimateRecomputeCoordinator<R, S>>>,
    Query(query): Query<StaleQuery>,
) -> Response
where
    R: EstimateRepository + 'static,
    S: RateProfileSource + 'static,
{
    match coordinator.stale(query.limit) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn price_handler(axum::Json(request): axum::Json<PriceRequest>) -> Response {
    let primary = resolve(&request.primary);
    let secondary = request.secondary.as_ref().map(resolve);

    let assignment = match (secondary, request.requested_split) {
        (Some(secondary), Some(shares)) => {
            match RepAssignment::profit_split(primary, secondary, shares) {
                Ok(assignment) => assignment,
                Err(err) => {
                    let payload = json!({ "error": err.to_string() });
                    return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload))
                        .into_response();
                }
            }
        }
        (Some(secondary), None) => RepAssignment::Dual { primary, secondary },
        (None, _) => RepAssignment::Single { primary },
    };

    match compute_breakdown(&request.costs, &request.targets, &assignment) {
        Ok(breakdown) => (StatusCode::OK, axum::Json(breakdown)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

fn error_response(err: CoordinatorError) -> Response {
    match err {
        CoordinatorError::Engine(engine) => {
            let payload = json!({ "error": engine.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        CoordinatorError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "estimate not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        CoordinatorError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "estimate already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
