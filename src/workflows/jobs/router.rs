use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::JobAction;
use super::events::{OutboxPublisher, SyndicationService};
use super::repository::{JobPostRepository, RepositoryError};
use super::service::{JobWorkflowService, WorkflowError};
use crate::workflows::types::{Actor, JobPostId};

/// Router exposing the job lifecycle and invoice endpoints.
pub fn jobs_router<R, S, P>(service: Arc<JobWorkflowService<R, S, P>>) -> Router
where
    R: JobPostRepository + 'static,
    S: SyndicationService + 'static,
    P: OutboxPublisher + 'static,
{
    Router::new()
        .route("/api/v1/jobs/:job_post_id/status", post(change_status::<R, S, P>))
        .route(
            "/api/v1/jobs/:job_post_id/deactivate",
            post(deactivate::<R, S, P>),
        )
        .route("/api/v1/jobs/:job_post_id/enable", post(enable::<R, S, P>))
        .route("/api/v1/jobs/:job_post_id", delete(hard_delete::<R, S, P>))
        .route("/api/v1/jobs/:job_post_id/invoice", get(invoice::<R, S, P>))
        .route(
            "/api/v1/jobs/:job_post_id/transitions",
            get(transitions::<R, S, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct StatusChangeRequest {
    action: JobAction,
    actor: Actor,
}

#[derive(Debug, Deserialize)]
struct ActorRequest {
    actor: Actor,
}

async fn change_status<R, S, P>(
    State(service): State<Arc<JobWorkflowService<R, S, P>>>,
    Path(job_post_id): Path<u64>,
    axum::Json(request): axum::Json<StatusChangeRequest>,
) -> Response
where
    R: JobPostRepository + 'static,
    S: SyndicationService + 'static,
    P: OutboxPublisher + 'static,
{
    match service.change_status(JobPostId(job_post_id), request.action, &request.actor) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => workflow_error_response(err),
    }
}

async fn deactivate<R, S, P>(
    State(service): State<Arc<JobWorkflowService<R, S, P>>>,
    Path(job_post_id): Path<u64>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    R: JobPostRepository + 'static,
    S: SyndicationService + 'static,
    P: OutboxPublisher + 'static,
{
    match service.deactivate(JobPostId(job_post_id), &request.actor) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => workflow_error_response(err),
    }
}

async fn enable<R, S, P>(
    State(service): State<Arc<JobWorkflowService<R, S, P>>>,
    Path(job_post_id): Path<u64>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    R: JobPostRepository + 'static,
    S: SyndicationService + 'static,
    P: OutboxPublisher + 'static,
{
    match service.enable(JobPostId(job_post_id), &request.actor) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => workflow_error_response(err),
    }
}

async fn hard_delete<R, S, P>(
    State(service): State<Arc<JobWorkflowService<R, S, P>>>,
    Path(job_post_id): Path<u64>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    R: JobPostRepository + 'static,
    S: SyndicationService + 'static,
    P: OutboxPublisher + 'static,
{
    match service.hard_delete(JobPostId(job_post_id), &request.actor) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "deleted": job_post_id })),
        )
            .into_response(),
        Err(err) => workflow_error_response(err),
    }
}

async fn invoice<R, S, P>(
    State(service): State<Arc<JobWorkflowService<R, S, P>>>,
    Path(job_post_id): Path<u64>,
) -> Response
where
    R: JobPostRepository + 'static,
    S: SyndicationService + 'static,
    P: OutboxPublisher + 'static,
{
    match service.invoice(JobPostId(job_post_id)) {
        Ok(breakdown) => (StatusCode::OK, axum::Json(breakdown)).into_response(),
        Err(err) => workflow_error_response(err),
    }
}

async fn transitions<R, S, P>(
    State(service): State<Arc<JobWorkflowService<R, S, P>>>,
    Path(job_post_id): Path<u64>,
) -> Response
where
    R: JobPostRepository + 'static,
    S: SyndicationService + 'static,
    P: OutboxPublisher + 'static,
{
    match service.transitions(JobPostId(job_post_id)) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => workflow_error_response(err),
    }
}

fn workflow_error_response(err: WorkflowError) -> Response {
    let status = match &err {
        WorkflowError::NotFound(_) | WorkflowError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        WorkflowError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        WorkflowError::InvalidTransition { .. } | WorkflowError::Billing(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        WorkflowError::Repository(RepositoryError::StatusConflict { .. }) => StatusCode::CONFLICT,
        WorkflowError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = axum::Json(json!({ "error": err.to_string() }));
    (status, body).into_response()
}
