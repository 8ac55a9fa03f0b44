use std::time::Duration;
use uuid::Uuid;

use crate::dto::candidate_dto::CandidateListQuery;
use crate::models::candidate::Candidate;
use crate::models::stage::Stage;

use super::api::{ApiClient, ApiError};
use super::coordinator::OptimisticStore;

/// View model behind the kanban screen: every candidate, grouped by stage,
/// with drag-and-drop moves applied optimistically and rolled back when the
/// server rejects them.
pub struct KanbanBoard {
    api: ApiClient,
    store: OptimisticStore<Vec<Candidate>>,
}

impl KanbanBoard {
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

    pub async fn load(&self) -> Result<(), ApiError> {
        let response = self
            .api
            .get_candidates(&CandidateListQuery {
                limit: Some(10_000),
                ..Default::default()
            })
            .await?;
        self.store.replace(response.data);
        Ok(())
    }

    pub fn candidates_in(&self, stage: Stage) -> Vec<Candidate> {
        self.store.read(|candidates| {
            candidates
                .iter()
                .filter(|c| c.current_stage == stage)
                .cloned()
                .collect()
        })
    }

    pub fn candidate(&self, candidate_id: Uuid) -> Option<Candidate> {
        self.store
            .read(|candidates| candidates.iter().find(|c| c.id == candidate_id).cloned())
    }

    pub fn error(&self) -> Option<String> {
        self.store.last_error()
    }

    /// Drop of a card onto a column. Dropping onto the card's own column is a
    /// no-op and never reaches the transition engine.
    pub async fn move_candidate(&self, candidate_id: Uuid, to_stage: Stage) -> Result<(), ApiError> {
        let current = self.store.read(|candidates| {
            candidates
                .iter()
                .find(|c| c.id == candidate_id)
                .map(|c| c.current_stage)
        });
        let Some(current) = current else {
            return Err(ApiError::network(format!(
                "Unknown candidate: {candidate_id}"
            )));
        };
        if current == to_stage {
            return Ok(());
        }

        self.store
            .update(
                |candidates| {
                    if let Some(candidate) =
                        candidates.iter_mut().find(|c| c.id == candidate_id)
                    {
                        candidate.current_stage = to_stage;
                    }
                },
                self.api.update_candidate_stage(candidate_id, to_stage),
            )
            .await
            .map(|_| ())
    }
}
