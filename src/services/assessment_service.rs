use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::dto::assessment_dto::{
    CreateAssessmentPayload, SubmitResponsePayload, UpdateAssessmentPayload,
};
use crate::error::{Error, Result};
use crate::models::assessment::{Assessment, AssessmentResponse};
use crate::models::preview;

const ASSESSMENT_COLUMNS: &str =
    "id, job_id, title, description, sections, created_at, updated_at";

#[derive(Clone)]
pub struct AssessmentService {
    pool: SqlitePool,
}

impl AssessmentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateAssessmentPayload) -> Result<Assessment> {
        let now = Utc::now();
        let mut assessment = Assessment {
            id: Uuid::new_v4(),
            job_id: payload.job_id,
            title: payload.title,
            description: payload.description,
            sections: payload.sections,
            created_at: now,
            updated_at: now,
        };
        assessment.normalize();
        assessment.validate()?;

        sqlx::query(
            r#"
            INSERT INTO assessments (id, job_id, title, description, sections, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(assessment.id.to_string())
        .bind(assessment.job_id.to_string())
        .bind(&assessment.title)
        .bind(&assessment.description)
        .bind(serde_json::to_string(&assessment.sections)?)
        .bind(assessment.created_at)
        .bind(assessment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(assessment)
    }

    /// Whole-document save: when `sections` is present the stored tree is
    /// replaced in one statement, never patched question by question.
    pub async fn update(&self, id: Uuid, payload: UpdateAssessmentPayload) -> Result<Assessment> {
        let mut assessment = self.get_by_id(id).await?;

        if let Some(title) = payload.title {
            assessment.title = title;
        }
        if let Some(description) = payload.description {
            assessment.description = description;
        }
        if let Some(sections) = payload.sections {
            assessment.sections = sections;
        }
        assessment.updated_at = Utc::now();
        assessment.normalize();
        assessment.validate()?;

        sqlx::query(
            r#"
            UPDATE assessments
            SET title = ?1, description = ?2, sections = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&assessment.title)
        .bind(&assessment.description)
        .bind(serde_json::to_string(&assessment.sections)?)
        .bind(assessment.updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(assessment)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Assessment> {
        let row = sqlx::query(&format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE id = ?1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Assessment not found: {id}")))?;

        Assessment::from_row(&row)
    }

    pub async fn list(&self, job_id: Option<Uuid>) -> Result<Vec<Assessment>> {
        let job_param = job_id.map(|id| id.to_string());
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ASSESSMENT_COLUMNS} FROM assessments
            WHERE (?1 IS NULL OR job_id = ?1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(&job_param)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Assessment::from_row).collect()
    }

    pub async fn form(&self, id: Uuid) -> Result<preview::AssessmentForm> {
        let assessment = self.get_by_id(id).await?;
        Ok(preview::project(&assessment))
    }

    /// Persist one candidate submission after checking it against the
    /// document it answers. Responses are write-once.
    pub async fn submit_response(
        &self,
        assessment_id: Uuid,
        payload: SubmitResponsePayload,
    ) -> Result<AssessmentResponse> {
        let assessment = self.get_by_id(assessment_id).await?;

        let candidate = sqlx::query("SELECT id FROM candidates WHERE id = ?1")
            .bind(payload.candidate_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        if candidate.is_none() {
            return Err(Error::NotFound(format!(
                "Candidate not found: {}",
                payload.candidate_id
            )));
        }

        preview::validate_answers(&assessment, &payload.answers)?;

        let response = AssessmentResponse {
            id: Uuid::new_v4(),
            assessment_id,
            candidate_id: payload.candidate_id,
            answers: payload.answers,
            submitted_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO assessment_responses (id, assessment_id, candidate_id, answers, submitted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(response.id.to_string())
        .bind(response.assessment_id.to_string())
        .bind(response.candidate_id.to_string())
        .bind(serde_json::to_string(&response.answers)?)
        .bind(response.submitted_at)
        .execute(&self.pool)
        .await?;

        Ok(response)
    }

    pub async fn responses(&self, assessment_id: Uuid) -> Result<Vec<AssessmentResponse>> {
        let rows = sqlx::query(
            r#"
            SELECT id, assessment_id, candidate_id, answers, submitted_at
            FROM assessment_responses
            WHERE assessment_id = ?1
            ORDER BY submitted_at ASC
            "#,
        )
        .bind(assessment_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(AssessmentResponse::from_row).collect()
    }
}
