use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ApplicationStatus;
use super::repository::{ApplicationStore, JobPostDirectory, StoreError};
use super::service::{ApplicationTracker, TrackerError};
use crate::workflows::jobs::events::OutboxPublisher;
use crate::workflows::types::{Actor, AgencyApplicantId, ApplicationId, JobPostId, UserId};

/// Router exposing the candidate pipeline endpoints.
pub fn application_router<S, D, P>(tracker: Arc<ApplicationTracker<S, D, P>>) -> Router
where
    S: ApplicationStore + 'static,
    D: JobPostDirectory + 'static,
    P: OutboxPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs/:job_post_id/applications",
            post(apply::<S, D, P>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            put(change_status::<S, D, P>),
        )
        .route(
            "/api/v1/jobs/:job_post_id/agency-applicants/status",
            post(bulk_transition::<S, D, P>),
        )
        .with_state(tracker)
}

#[derive(Debug, Deserialize)]
struct ApplyRequest {
    job_seeker: u64,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: ApplicationStatus,
}

#[derive(Debug, Deserialize)]
struct BulkTransitionRequest {
    applicants: Vec<u64>,
    status: ApplicationStatus,
    actor: Actor,
}

async fn apply<S, D, P>(
    State(tracker): State<Arc<ApplicationTracker<S, D, P>>>,
    Path(job_post_id): Path<u64>,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: JobPostDirectory + 'static,
    P: OutboxPublisher + 'static,
{
    match tracker.apply(UserId(request.job_seeker), JobPostId(job_post_id)) {
        Ok(outcome) => {
            let code = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (code, axum::Json(outcome)).into_response()
        }
        Err(err) => tracker_error_response(err),
    }
}

async fn change_status<S, D, P>(
    State(tracker): State<Arc<ApplicationTracker<S, D, P>>>,
    Path(application_id): Path<u64>,
    axum::Json(request): axum::Json<StatusRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: JobPostDirectory + 'static,
    P: OutboxPublisher + 'static,
{
    match tracker.change_application_status(ApplicationId(application_id), request.status) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(err) => tracker_error_response(err),
    }
}

async fn bulk_transition<S, D, P>(
    State(tracker): State<Arc<ApplicationTracker<S, D, P>>>,
    Path(job_post_id): Path<u64>,
    axum::Json(request): axum::Json<BulkTransitionRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: JobPostDirectory + 'static,
    P: OutboxPublisher + 'static,
{
    let applicant_ids: Vec<AgencyApplicantId> = request
        .applicants
        .into_iter()
        .map(AgencyApplicantId)
        .collect();
    match tracker.bulk_transition_agency_applicants(
        JobPostId(job_post_id),
        &applicant_ids,
        request.status,
        &request.actor,
    ) {
        Ok(updated) => (StatusCode::OK, axum::Json(json!({ "updated": updated }))).into_response(),
        Err(err) => tracker_error_response(err),
    }
}

fn tracker_error_response(err: TrackerError) -> Response {
    let status = match &err {
        TrackerError::UnknownJobPost(_)
        | TrackerError::UnknownApplication(_)
        | TrackerError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        TrackerError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        TrackerError::DirectHireNotAllowed
        | TrackerError::ForeignApplicant { .. }
        | TrackerError::EmptySelection => StatusCode::UNPROCESSABLE_ENTITY,
        TrackerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = axum::Json(json!({ "error": err.to_string() }));
    (status, body).into_response()
}
