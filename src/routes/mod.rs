pub mod assessment_routes;
pub mod candidate_routes;
pub mod health;
pub mod job_routes;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::middleware::chaos::{chaos_middleware, ChaosConfig};
use crate::AppState;

/// The full REST surface under `/api`, with the chaos layer in front of it.
pub fn api_router(state: AppState, chaos: ChaosConfig) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/jobs",
            get(job_routes::list_jobs).post(job_routes::create_job),
        )
        .route("/api/jobs/reorder", patch(job_routes::reorder_jobs))
        .route(
            "/api/jobs/:id",
            get(job_routes::get_job).patch(job_routes::update_job),
        )
        .route(
            "/api/candidates",
            get(candidate_routes::list_candidates).post(candidate_routes::create_candidate),
        )
        .route("/api/candidates/:id", get(candidate_routes::get_candidate))
        .route(
            "/api/candidates/:id/history",
            get(candidate_routes::get_candidate_history),
        )
        .route(
            "/api/candidates/:id/stage",
            patch(candidate_routes::update_candidate_stage),
        )
        .route(
            "/api/assessments",
            get(assessment_routes::list_assessments).post(assessment_routes::create_assessment),
        )
        .route(
            "/api/assessments/:id",
            get(assessment_routes::get_assessment).patch(assessment_routes::update_assessment),
        )
        .route(
            "/api/assessments/:id/form",
            get(assessment_routes::get_assessment_form),
        )
        .route(
            "/api/assessments/:id/responses",
            post(assessment_routes::submit_response),
        )
        .layer(axum::middleware::from_fn_with_state(chaos, chaos_middleware))
        .with_state(state)
}
