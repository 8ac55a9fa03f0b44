pub mod assessment_dto;
pub mod candidate_dto;
pub mod job_dto;

use serde::{Deserialize, Serialize};

/// Pagination envelope shared by the list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}
