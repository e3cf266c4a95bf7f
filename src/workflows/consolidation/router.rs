use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::engine::{ConsolidationEngine, MergeError};
use super::registry::EntityKind;
use super::store::{ConsolidationStore, StoreError};
use crate::workflows::types::{Actor, EntityId};

pub fn consolidation_router<S>(engine: Arc<ConsolidationEngine<S>>) -> Router
where
    S: ConsolidationStore + 'static,
{
    Router::new()
        .route("/api/v1/consolidation/merge", post(merge::<S>))
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
struct MergeRequest {
    kind: EntityKind,
    original: u64,
    duplicates: Vec<u64>,
    actor: Actor,
}

async fn merge<S>(
    State(engine): State<Arc<ConsolidationEngine<S>>>,
    axum::Json(request): axum::Json<MergeRequest>,
) -> Response
where
    S: ConsolidationStore + 'static,
{
    let duplicates: Vec<EntityId> = request.duplicates.into_iter().map(EntityId).collect();
    match engine.merge_entities(
        request.kind,
        EntityId(request.original),
        &duplicates,
        &request.actor,
    ) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => merge_error_response(err),
    }
}

fn merge_error_response(err: MergeError) -> Response {
    let status = match &err {
        MergeError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        MergeError::UnknownOriginal { .. } | MergeError::Store(StoreError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        MergeError::DuplicateIsOriginal(_) | MergeError::EmptySelection => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        MergeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = axum::Json(json!({ "error": err.to_string() }));
    (status, body).into_response()
}
