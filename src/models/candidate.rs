use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::stage::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A candidate in a job's pipeline. `current_stage` is denormalized from the
/// stage history log and is only ever written by the transition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_id: Uuid,
    pub current_stage: Stage,
    pub applied_at: DateTime<Utc>,
    pub notes: Vec<Note>,
}

impl Candidate {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let notes: Vec<Note> = serde_json::from_str(&row.try_get::<String, _>("notes")?)?;

        Ok(Self {
            id: super::parse_db_uuid(&row.try_get::<String, _>("id")?)?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            job_id: super::parse_db_uuid(&row.try_get::<String, _>("job_id")?)?,
            current_stage: row.try_get::<String, _>("current_stage")?.parse()?,
            applied_at: row.try_get("applied_at")?,
            notes,
        })
    }
}
