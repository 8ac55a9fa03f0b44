use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::dto::assessment_dto::{
    CreateAssessmentPayload, SubmitResponsePayload, UpdateAssessmentPayload,
};
use crate::dto::candidate_dto::{CandidateListQuery, CandidateListResponse, CreateCandidatePayload};
use crate::dto::job_dto::{
    CreateJobPayload, JobListQuery, JobListResponse, ReorderJobsPayload, ReorderResponse,
    UpdateJobPayload,
};
use crate::models::assessment::{Assessment, AssessmentResponse};
use crate::models::candidate::Candidate;
use crate::models::job::Job;
use crate::models::stage::{Stage, StageHistoryEvent};

/// A failed API call. `status` is absent for transport-level failures, which
/// are the retryable kind together with 5xx responses; 4xx responses carry
/// the server's error message and propagate immediately.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self.status {
            None => true,
            Some(code) => code >= 500,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Run `op`, retrying retryable failures up to the policy's attempt count
/// with a fixed backoff. Client errors (4xx) propagate on the first attempt.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::debug!(attempt, error = %err, "retrying request");
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    retry_policy: RetryPolicy,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    // Jobs

    pub async fn get_jobs(&self, params: &JobListQuery) -> Result<JobListResponse, ApiError> {
        let mut query = Vec::new();
        if let Some(page) = params.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(status) = params.status {
            query.push(("status", status.to_string()));
        }
        if let Some(search) = &params.search {
            query.push(("search", search.clone()));
        }
        if let Some(tags) = &params.tags {
            query.push(("tags", tags.clone()));
        }
        self.request(Method::GET, "/api/jobs", query, None).await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, ApiError> {
        self.request(Method::GET, &format!("/api/jobs/{id}"), Vec::new(), None)
            .await
    }

    pub async fn create_job(&self, payload: &CreateJobPayload) -> Result<Job, ApiError> {
        self.request(Method::POST, "/api/jobs", Vec::new(), Some(to_body(payload)?))
            .await
    }

    pub async fn update_job(&self, id: Uuid, payload: &UpdateJobPayload) -> Result<Job, ApiError> {
        self.request(
            Method::PATCH,
            &format!("/api/jobs/{id}"),
            Vec::new(),
            Some(to_body(payload)?),
        )
        .await
    }

    pub async fn reorder_jobs(&self, job_ids: &[Uuid]) -> Result<ReorderResponse, ApiError> {
        let payload = ReorderJobsPayload {
            job_ids: job_ids.to_vec(),
        };
        self.request(
            Method::PATCH,
            "/api/jobs/reorder",
            Vec::new(),
            Some(to_body(&payload)?),
        )
        .await
    }

    // Candidates

    pub async fn get_candidates(
        &self,
        params: &CandidateListQuery,
    ) -> Result<CandidateListResponse, ApiError> {
        let mut query = Vec::new();
        if let Some(page) = params.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(search) = &params.search {
            query.push(("search", search.clone()));
        }
        if let Some(stage) = params.stage {
            query.push(("stage", stage.to_string()));
        }
        if let Some(job_id) = params.job_id {
            query.push(("jobId", job_id.to_string()));
        }
        self.request(Method::GET, "/api/candidates", query, None).await
    }

    pub async fn get_candidate(&self, id: Uuid) -> Result<Candidate, ApiError> {
        self.request(
            Method::GET,
            &format!("/api/candidates/{id}"),
            Vec::new(),
            None,
        )
        .await
    }

    pub async fn create_candidate(
        &self,
        payload: &CreateCandidatePayload,
    ) -> Result<Candidate, ApiError> {
        self.request(
            Method::POST,
            "/api/candidates",
            Vec::new(),
            Some(to_body(payload)?),
        )
        .await
    }

    pub async fn get_candidate_history(
        &self,
        id: Uuid,
    ) -> Result<Vec<StageHistoryEvent>, ApiError> {
        self.request(
            Method::GET,
            &format!("/api/candidates/{id}/history"),
            Vec::new(),
            None,
        )
        .await
    }

    pub async fn update_candidate_stage(
        &self,
        id: Uuid,
        stage: Stage,
    ) -> Result<Candidate, ApiError> {
        self.request(
            Method::PATCH,
            &format!("/api/candidates/{id}/stage"),
            Vec::new(),
            Some(json!({ "stage": stage })),
        )
        .await
    }

    // Assessments

    pub async fn get_assessments(&self, job_id: Option<Uuid>) -> Result<Vec<Assessment>, ApiError> {
        let mut query = Vec::new();
        if let Some(job_id) = job_id {
            query.push(("jobId", job_id.to_string()));
        }
        self.request(Method::GET, "/api/assessments", query, None).await
    }

    pub async fn get_assessment(&self, id: Uuid) -> Result<Assessment, ApiError> {
        self.request(
            Method::GET,
            &format!("/api/assessments/{id}"),
            Vec::new(),
            None,
        )
        .await
    }

    pub async fn create_assessment(
        &self,
        payload: &CreateAssessmentPayload,
    ) -> Result<Assessment, ApiError> {
        self.request(
            Method::POST,
            "/api/assessments",
            Vec::new(),
            Some(to_body(payload)?),
        )
        .await
    }

    pub async fn update_assessment(
        &self,
        id: Uuid,
        payload: &UpdateAssessmentPayload,
    ) -> Result<Assessment, ApiError> {
        self.request(
            Method::PATCH,
            &format!("/api/assessments/{id}"),
            Vec::new(),
            Some(to_body(payload)?),
        )
        .await
    }

    pub async fn submit_assessment_response(
        &self,
        assessment_id: Uuid,
        payload: &SubmitResponsePayload,
    ) -> Result<AssessmentResponse, ApiError> {
        self.request(
            Method::POST,
            &format!("/api/assessments/{assessment_id}/responses"),
            Vec::new(),
            Some(to_body(payload)?),
        )
        .await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Vec<(&'static str, String)>,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        retry(self.retry_policy, || {
            self.send_once(method.clone(), url.clone(), query.clone(), body.clone())
        })
        .await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        query: Vec<(&'static str, String)>,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(&query);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::network(format!("Invalid response body: {e}")))
        } else {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            Err(ApiError {
                status: Some(status.as_u16()),
                message,
            })
        }
    }
}

fn to_body<T: Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::network(format!("Invalid request body: {e}")))
}
