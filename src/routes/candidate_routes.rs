use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::candidate_dto::{CandidateListQuery, CreateCandidatePayload, UpdateStagePayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/candidates",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("search" = Option<String>, Query, description = "Name/email search"),
        ("stage" = Option<String>, Query, description = "Filter by pipeline stage"),
        ("jobId" = Option<Uuid>, Query, description = "Filter by job")
    ),
    responses(
        (status = 200, description = "Paginated list of candidates")
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.candidate_service.list(query).await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/candidates",
    request_body = CreateCandidatePayload,
    responses(
        (status = 201, description = "Candidate created with its genesis history event")
    )
)]
#[axum::debug_handler]
pub async fn create_candidate(
    State(state): State<AppState>,
    Json(payload): Json<CreateCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate = state.candidate_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate found"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.get_by_id(id).await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}/history",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Stage history, oldest first")
    )
)]
#[axum::debug_handler]
pub async fn get_candidate_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let history = state.candidate_service.history(id).await?;
    Ok(Json(history))
}

#[utoipa::path(
    patch,
    path = "/api/candidates/{id}/stage",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = UpdateStagePayload,
    responses(
        (status = 200, description = "Candidate moved to the requested stage"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn update_candidate_stage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStagePayload>,
) -> Result<impl IntoResponse> {
    let changed_by = payload.changed_by.as_deref().unwrap_or("system");
    let candidate = state
        .stage_service
        .transition(id, payload.stage, changed_by)
        .await?;
    Ok(Json(candidate))
}
