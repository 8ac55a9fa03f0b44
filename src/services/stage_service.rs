use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::models::stage::Stage;

/// The stage transition engine. A transition appends exactly one history
/// event and updates the candidate's denormalized `current_stage` in the
/// same transaction, so the log and the field can never observably diverge.
///
/// The engine is policy-free: it accepts any stage-to-stage move (the board
/// allows dragging to any column) and does not special-case transitions to
/// the current stage -- callers short-circuit no-ops.
#[derive(Clone)]
pub struct StageService {
    pool: SqlitePool,
}

impl StageService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn transition(
        &self,
        candidate_id: Uuid,
        to_stage: Stage,
        changed_by: &str,
    ) -> Result<Candidate> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT current_stage FROM candidates WHERE id = ?1")
            .bind(candidate_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Candidate not found: {candidate_id}")))?;
        let from_stage: Stage = row.try_get::<String, _>("current_stage")?.parse()?;

        sqlx::query(
            r#"
            INSERT INTO stage_history (id, candidate_id, from_stage, to_stage, timestamp, changed_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(candidate_id.to_string())
        .bind(from_stage.as_str())
        .bind(to_stage.as_str())
        .bind(Utc::now())
        .bind(changed_by)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE candidates SET current_stage = ?1 WHERE id = ?2")
            .bind(to_stage.as_str())
            .bind(candidate_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let row = sqlx::query(
            "SELECT id, name, email, phone, job_id, current_stage, applied_at, notes FROM candidates WHERE id = ?1",
        )
        .bind(candidate_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Candidate::from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::candidate_dto::CreateCandidatePayload;
    use crate::dto::job_dto::CreateJobPayload;
    use crate::services::candidate_service::CandidateService;
    use crate::services::job_service::JobService;

    async fn setup_test_db() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    async fn seed_candidate(pool: &SqlitePool, stage: Stage) -> Candidate {
        let job = JobService::new(pool.clone())
            .create(CreateJobPayload {
                title: "Backend Engineer".to_string(),
                slug: None,
                description: String::new(),
                status: None,
                tags: Vec::new(),
            })
            .await
            .unwrap();

        CandidateService::new(pool.clone())
            .create(CreateCandidatePayload {
                name: "Jane Smith".to_string(),
                email: "jane@example.com".to_string(),
                phone: String::new(),
                job_id: job.id,
                stage: Some(stage),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn transition_appends_event_and_updates_current_stage() {
        let pool = setup_test_db().await;
        let candidate = seed_candidate(&pool, Stage::Screening).await;
        let candidates = CandidateService::new(pool.clone());
        let service = StageService::new(pool);

        let updated = service
            .transition(candidate.id, Stage::Offer, "system")
            .await
            .unwrap();
        assert_eq!(updated.current_stage, Stage::Offer);

        let history = candidates.history(candidate.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].from_stage, Some(Stage::Screening));
        assert_eq!(history[1].to_stage, Stage::Offer);

        // The denormalized stage always equals the last event's to_stage.
        let last = history.last().unwrap();
        assert_eq!(
            candidates.get_by_id(candidate.id).await.unwrap().current_stage,
            last.to_stage
        );
    }

    #[tokio::test]
    async fn any_stage_to_stage_move_is_accepted() {
        let pool = setup_test_db().await;
        let candidate = seed_candidate(&pool, Stage::Applied).await;
        let service = StageService::new(pool);

        // Straight from applied to hired, then back out of a "terminal" stage.
        let hired = service
            .transition(candidate.id, Stage::Hired, "system")
            .await
            .unwrap();
        assert_eq!(hired.current_stage, Stage::Hired);

        let reopened = service
            .transition(candidate.id, Stage::Interview, "system")
            .await
            .unwrap();
        assert_eq!(reopened.current_stage, Stage::Interview);
    }

    #[tokio::test]
    async fn redundant_transition_still_appends_an_event() {
        let pool = setup_test_db().await;
        let candidate = seed_candidate(&pool, Stage::Applied).await;
        let candidates = CandidateService::new(pool.clone());
        let service = StageService::new(pool);

        service
            .transition(candidate.id, Stage::Applied, "system")
            .await
            .unwrap();

        let history = candidates.history(candidate.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].from_stage, Some(Stage::Applied));
        assert_eq!(history[1].to_stage, Stage::Applied);
    }

    #[tokio::test]
    async fn unknown_candidate_leaves_no_history_behind() {
        let pool = setup_test_db().await;
        let service = StageService::new(pool.clone());

        let missing = Uuid::new_v4();
        let result = service.transition(missing, Stage::Offer, "system").await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stage_history")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
