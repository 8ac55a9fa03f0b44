use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::error::{Error, Result};

/// One of the six pipeline states a candidate occupies. The typical path is
/// applied -> screening -> interview -> offer -> hired, but the transition
/// engine accepts any stage-to-stage move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Applied,
    Screening,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Applied,
        Stage::Screening,
        Stage::Interview,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Applied => "applied",
            Stage::Screening => "screening",
            Stage::Interview => "interview",
            Stage::Offer => "offer",
            Stage::Hired => "hired",
            Stage::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "applied" => Ok(Stage::Applied),
            "screening" => Ok(Stage::Screening),
            "interview" => Ok(Stage::Interview),
            "offer" => Ok(Stage::Offer),
            "hired" => Ok(Stage::Hired),
            "rejected" => Ok(Stage::Rejected),
            other => Err(Error::BadRequest(format!("Unknown stage: {other}"))),
        }
    }
}

/// Immutable record of one stage transition. `from_stage = None` marks the
/// genesis event written when the candidate applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageHistoryEvent {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub from_stage: Option<Stage>,
    pub to_stage: Stage,
    pub timestamp: DateTime<Utc>,
    pub changed_by: String,
}

impl StageHistoryEvent {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let from_stage = row
            .try_get::<Option<String>, _>("from_stage")?
            .map(|s| s.parse())
            .transpose()?;

        Ok(Self {
            id: super::parse_db_uuid(&row.try_get::<String, _>("id")?)?,
            candidate_id: super::parse_db_uuid(&row.try_get::<String, _>("candidate_id")?)?,
            from_stage,
            to_stage: row.try_get::<String, _>("to_stage")?.parse()?,
            timestamp: row.try_get("timestamp")?,
            changed_by: row.try_get("changed_by")?,
        })
    }
}
