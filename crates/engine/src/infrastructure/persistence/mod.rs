//! SQLite persistence - the event ledger and the projection store.

mod event_ledger;
mod projection_store;
mod schema;

pub use event_ledger::EventLedger;
pub use projection_store::ProjectionStore;
pub use schema::init_schema;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::infrastructure::ports::RepoError;

/// Parse a UUID column, surfacing the column name on failure.
pub(crate) fn parse_uuid(value: &str, column: &'static str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(value)
        .map_err(|e| RepoError::serialization(format!("bad uuid in {}: {}", column, e)))
}

/// Decode a microsecond timestamp column.
pub(crate) fn ts_from_micros(micros: i64) -> Result<DateTime<Utc>, RepoError> {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or_else(|| RepoError::serialization(format!("timestamp out of range: {}", micros)))
}
