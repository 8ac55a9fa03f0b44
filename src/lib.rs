pub mod client;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    assessment_service::AssessmentService, candidate_service::CandidateService,
    job_service::JobService, stage_service::StageService,
};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub job_service: JobService,
    pub candidate_service: CandidateService,
    pub stage_service: StageService,
    pub assessment_service: AssessmentService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let job_service = JobService::new(pool.clone());
        let candidate_service = CandidateService::new(pool.clone());
        let stage_service = StageService::new(pool.clone());
        let assessment_service = AssessmentService::new(pool.clone());

        Self {
            pool,
            job_service,
            candidate_service,
            stage_service,
            assessment_service,
        }
    }
}
