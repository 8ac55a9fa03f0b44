pub mod assessment;
pub mod candidate;
pub mod job;
pub mod preview;
pub mod stage;
pub mod user;

use crate::error::{Error, Result};
use uuid::Uuid;

pub(crate) fn parse_db_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| Error::Internal(format!("invalid uuid in database: {value}: {e}")))
}
