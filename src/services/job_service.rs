use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobListQuery, JobListResponse, UpdateJobPayload};
use crate::dto::ListMeta;
use crate::error::{Error, Result};
use crate::models::job::{Job, JobStatus};
use crate::utils::slug::slugify;

const JOB_COLUMNS: &str =
    "id, title, slug, description, status, tags, sort_order, created_at, updated_at";

#[derive(Clone)]
pub struct JobService {
    pool: SqlitePool,
}

impl JobService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateJobPayload) -> Result<Job> {
        let slug = match payload.slug.as_deref() {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_string(),
            _ => slugify(&payload.title),
        };

        let existing = sqlx::query("SELECT id FROM jobs WHERE slug = ?1")
            .bind(&slug)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(Error::BadRequest("Slug must be unique".to_string()));
        }

        // New jobs append at the end of the board.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO jobs (id, title, slug, description, status, tags, sort_order, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(id.to_string())
        .bind(&payload.title)
        .bind(&slug)
        .bind(&payload.description)
        .bind(payload.status.unwrap_or(JobStatus::Draft).as_str())
        .bind(serde_json::to_string(&payload.tags)?)
        .bind(count)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Job> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job not found: {id}")))?;

        Job::from_row(&row)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        let job = self.get_by_id(id).await?;

        if let Some(slug) = payload.slug.as_deref() {
            if slug != job.slug {
                let existing = sqlx::query("SELECT id FROM jobs WHERE slug = ?1 AND id != ?2")
                    .bind(slug)
                    .bind(id.to_string())
                    .fetch_optional(&self.pool)
                    .await?;
                if existing.is_some() {
                    return Err(Error::BadRequest("Slug must be unique".to_string()));
                }
            }
        }

        let title = payload.title.unwrap_or(job.title);
        let slug = payload.slug.unwrap_or(job.slug);
        let description = payload.description.unwrap_or(job.description);
        let status = payload.status.unwrap_or(job.status);
        let tags = payload.tags.unwrap_or(job.tags);

        sqlx::query(
            r#"
            UPDATE jobs
            SET title = ?1, slug = ?2, description = ?3, status = ?4, tags = ?5, updated_at = ?6
            WHERE id = ?7
            "#,
        )
        .bind(&title)
        .bind(&slug)
        .bind(&description)
        .bind(status.as_str())
        .bind(serde_json::to_string(&tags)?)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// List in board order, with status/search/tag filters and pagination
    /// applied in memory over the full table.
    pub async fn list(&self, query: JobListQuery) -> Result<JobListResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);

        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY sort_order"
        ))
        .fetch_all(&self.pool)
        .await?;
        let mut jobs = rows.iter().map(Job::from_row).collect::<Result<Vec<_>>>()?;

        if let Some(status) = query.status {
            jobs.retain(|job| job.status == status);
        }
        if let Some(search) = query.search.as_deref() {
            let needle = search.to_lowercase();
            jobs.retain(|job| job.title.to_lowercase().contains(&needle));
        }
        if let Some(tags) = query.tags.as_deref() {
            let wanted: Vec<&str> = tags.split(',').filter(|t| !t.is_empty()).collect();
            if !wanted.is_empty() {
                jobs.retain(|job| wanted.iter().any(|t| job.tags.iter().any(|tag| tag == t)));
            }
        }

        let total = jobs.len() as i64;
        let start = ((page - 1) * limit) as usize;
        let data: Vec<Job> = jobs.into_iter().skip(start).take(limit as usize).collect();

        Ok(JobListResponse {
            data,
            meta: ListMeta {
                page,
                limit,
                total,
                total_pages: (total + limit - 1) / limit,
            },
        })
    }

    /// Atomic bulk reindex: the input must be a permutation of all job ids;
    /// each job's `order` becomes its index. No partial application.
    pub async fn reorder(&self, job_ids: &[Uuid]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query("SELECT id FROM jobs").fetch_all(&mut *tx).await?;
        let mut existing = rows
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        existing.sort();

        let requested: Vec<String> = job_ids.iter().map(Uuid::to_string).collect();
        let mut sorted = requested.clone();
        sorted.sort();

        if sorted != existing {
            return Err(Error::BadRequest(
                "jobIds must contain every job exactly once".to_string(),
            ));
        }

        let now = Utc::now();
        for (index, id) in requested.iter().enumerate() {
            sqlx::query("UPDATE jobs SET sort_order = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(index as i64)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
