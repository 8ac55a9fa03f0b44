use std::time::Duration;
use uuid::Uuid;

use crate::dto::job_dto::{JobListQuery, UpdateJobPayload};
use crate::models::job::{Job, JobStatus};

use super::api::{ApiClient, ApiError};
use super::coordinator::OptimisticStore;

/// View model behind the jobs list: archive toggling and drag-reordering go
/// through the same optimistic coordinator as the kanban board.
pub struct JobsView {
    api: ApiClient,
    store: OptimisticStore<Vec<Job>>,
}

impl JobsView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            store: OptimisticStore::new(Vec::new()),
        }
    }

    pub fn with_error_ttl(api: ApiClient, error_ttl: Duration) -> Self {
        Self {
            api,
            store: OptimisticStore::with_error_ttl(Vec::new(), error_ttl),
        }
    }

    pub async fn load(&self, query: &JobListQuery) -> Result<(), ApiError> {
        let response = self.api.get_jobs(query).await?;
        self.store.replace(response.data);
        Ok(())
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.store.snapshot()
    }

    pub fn error(&self) -> Option<String> {
        self.store.last_error()
    }

    pub async fn toggle_archive(&self, job_id: Uuid) -> Result<(), ApiError> {
        let status = self
            .store
            .read(|jobs| jobs.iter().find(|j| j.id == job_id).map(|j| j.status));
        let Some(status) = status else {
            return Err(ApiError::network(format!("Unknown job: {job_id}")));
        };
        let new_status = if status == JobStatus::Archived {
            JobStatus::Active
        } else {
            JobStatus::Archived
        };

        let payload = UpdateJobPayload {
            status: Some(new_status),
            ..Default::default()
        };
        self.store
            .update(
                |jobs| {
                    if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
                        job.status = new_status;
                    }
                },
                self.api.update_job(job_id, &payload),
            )
            .await
            .map(|_| ())
    }

    /// Apply a full drag-reorder: the local list takes the requested order
    /// with reindexed `order` fields while the bulk update is in flight.
    pub async fn reorder(&self, ordered_ids: Vec<Uuid>) -> Result<(), ApiError> {
        let commit = self.api.reorder_jobs(&ordered_ids);
        self.store
            .update(
                |jobs| {
                    jobs.sort_by_key(|job| {
                        ordered_ids
                            .iter()
                            .position(|id| *id == job.id)
                            .unwrap_or(usize::MAX)
                    });
                    for (index, job) in jobs.iter_mut().enumerate() {
                        job.order = index as i64;
                    }
                },
                commit,
            )
            .await
            .map(|_| ())
    }
}
