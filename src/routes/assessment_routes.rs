use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::assessment_dto::{
        AssessmentListQuery, CreateAssessmentPayload, SubmitResponsePayload,
        UpdateAssessmentPayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/assessments",
    params(
        ("jobId" = Option<Uuid>, Query, description = "Filter by job")
    ),
    responses(
        (status = 200, description = "List of assessments")
    )
)]
#[axum::debug_handler]
pub async fn list_assessments(
    State(state): State<AppState>,
    Query(query): Query<AssessmentListQuery>,
) -> Result<impl IntoResponse> {
    let assessments = state.assessment_service.list(query.job_id).await?;
    Ok(Json(assessments))
}

#[utoipa::path(
    post,
    path = "/api/assessments",
    request_body = CreateAssessmentPayload,
    responses(
        (status = 201, description = "Assessment created"),
        (status = 400, description = "Invalid document")
    )
)]
#[axum::debug_handler]
pub async fn create_assessment(
    State(state): State<AppState>,
    Json(payload): Json<CreateAssessmentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let assessment = state.assessment_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

#[utoipa::path(
    get,
    path = "/api/assessments/{id}",
    params(
        ("id" = Uuid, Path, description = "Assessment ID")
    ),
    responses(
        (status = 200, description = "Assessment found"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let assessment = state.assessment_service.get_by_id(id).await?;
    Ok(Json(assessment))
}

#[utoipa::path(
    patch,
    path = "/api/assessments/{id}",
    params(
        ("id" = Uuid, Path, description = "Assessment ID")
    ),
    request_body = UpdateAssessmentPayload,
    responses(
        (status = 200, description = "Assessment updated; sections replaced as a whole"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn update_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssessmentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let assessment = state.assessment_service.update(id, payload).await?;
    Ok(Json(assessment))
}

#[utoipa::path(
    get,
    path = "/api/assessments/{id}/form",
    params(
        ("id" = Uuid, Path, description = "Assessment ID")
    ),
    responses(
        (status = 200, description = "Fillable form projection of the document"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn get_assessment_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let form = state.assessment_service.form(id).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/api/assessments/{id}/responses",
    params(
        ("id" = Uuid, Path, description = "Assessment ID")
    ),
    request_body = SubmitResponsePayload,
    responses(
        (status = 201, description = "Response recorded"),
        (status = 400, description = "Answers do not match the document")
    )
)]
#[axum::debug_handler]
pub async fn submit_response(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitResponsePayload>,
) -> Result<impl IntoResponse> {
    let response = state.assessment_service.submit_response(id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
