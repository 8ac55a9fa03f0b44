//! Consumer side of the REST surface: a typed API client with the transport
//! retry policy, and the optimistic-update coordinator the interactive views
//! are built on.

pub mod api;
pub mod board;
pub mod coordinator;
pub mod jobs;

pub use api::{ApiClient, ApiError, RetryPolicy};
pub use board::KanbanBoard;
pub use coordinator::OptimisticStore;
pub use jobs::JobsView;
