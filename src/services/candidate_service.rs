use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::dto::candidate_dto::{CandidateListQuery, CandidateListResponse, CreateCandidatePayload};
use crate::dto::ListMeta;
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::models::stage::{Stage, StageHistoryEvent};

const CANDIDATE_COLUMNS: &str = "id, name, email, phone, job_id, current_stage, applied_at, notes";

#[derive(Clone)]
pub struct CandidateService {
    pool: SqlitePool,
}

impl CandidateService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the candidate and its genesis history event (`from_stage` null)
    /// as one unit; the history chain must never be empty for a persisted
    /// candidate.
    pub async fn create(&self, payload: CreateCandidatePayload) -> Result<Candidate> {
        let id = Uuid::new_v4();
        let stage = payload.stage.unwrap_or(Stage::Applied);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO candidates (id, name, email, phone, job_id, current_stage, applied_at, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, '[]')
            "#,
        )
        .bind(id.to_string())
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(payload.job_id.to_string())
        .bind(stage.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stage_history (id, candidate_id, from_stage, to_stage, timestamp, changed_by)
            VALUES (?1, ?2, NULL, ?3, ?4, ?5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(id.to_string())
        .bind(stage.as_str())
        .bind(now)
        .bind("system")
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Candidate> {
        let row = sqlx::query(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = ?1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Candidate not found: {id}")))?;

        Candidate::from_row(&row)
    }

    pub async fn list(&self, query: CandidateListQuery) -> Result<CandidateListResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(50).clamp(1, 10_000);
        let offset = (page - 1) * limit;

        let stage_param = query.stage.map(|s| s.as_str().to_string());
        let job_param = query.job_id.map(|id| id.to_string());
        let search_param = query.search.as_deref().map(|s| format!("%{s}%"));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM candidates
            WHERE (?1 IS NULL OR current_stage = ?1)
              AND (?2 IS NULL OR job_id = ?2)
              AND (?3 IS NULL OR name LIKE ?3 OR email LIKE ?3)
            "#,
        )
        .bind(&stage_param)
        .bind(&job_param)
        .bind(&search_param)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS} FROM candidates
            WHERE (?1 IS NULL OR current_stage = ?1)
              AND (?2 IS NULL OR job_id = ?2)
              AND (?3 IS NULL OR name LIKE ?3 OR email LIKE ?3)
            ORDER BY applied_at DESC
            LIMIT ?4 OFFSET ?5
            "#
        ))
        .bind(&stage_param)
        .bind(&job_param)
        .bind(&search_param)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let data = rows
            .iter()
            .map(Candidate::from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(CandidateListResponse {
            data,
            meta: ListMeta {
                page,
                limit,
                total,
                total_pages: (total + limit - 1) / limit,
            },
        })
    }

    /// Full transition log for one candidate, oldest first.
    pub async fn history(&self, candidate_id: Uuid) -> Result<Vec<StageHistoryEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, candidate_id, from_stage, to_stage, timestamp, changed_by
            FROM stage_history
            WHERE candidate_id = ?1
            ORDER BY timestamp ASC, rowid ASC
            "#,
        )
        .bind(candidate_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(StageHistoryEvent::from_row).collect()
    }
}
