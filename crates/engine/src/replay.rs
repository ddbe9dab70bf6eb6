//! Replay - rebuild a world's projections from its ledger.
//!
//! Fetches every event for the world in `(ts asc, id asc)` order and
//! re-applies each through the same projectors used at write time. There is
//! no separate replay path, so rebuilt state cannot drift from live state.
//!
//! Fail-fast: the first event that fails to apply aborts the whole rebuild
//! transaction. A partial rebuild that looks complete is worse than no
//! rebuild at all.

use sqlx::SqlitePool;
use thiserror::Error;

use tomekeeper_domain::{EventId, EventType, WorldId};

use crate::infrastructure::persistence::EventLedger;
use crate::infrastructure::ports::RepoError;
use crate::projectors::{self, ProjectionError};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to load ledger: {0}")]
    Ledger(#[from] RepoError),

    /// Carries the offending event's identity for operator diagnosis.
    #[error("replay aborted at event {event_id} ({event_type}): {source}")]
    EventFailed {
        event_id: EventId,
        event_type: EventType,
        #[source]
        source: ProjectionError,
    },

    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
}

/// Outcome of a successful rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    pub world_id: WorldId,
    pub events_applied: usize,
}

/// Re-apply the world's full ordered ledger against the projection store.
pub async fn rebuild(pool: &SqlitePool, world_id: WorldId) -> Result<RebuildReport, ReplayError> {
    let ledger = EventLedger::new(pool.clone());
    let events = ledger.for_world(world_id).await?;

    tracing::info!(world_id = %world_id, events = events.len(), "rebuilding projections");

    let mut tx = pool.begin().await.map_err(|e| ReplayError::Database {
        operation: "begin rebuild",
        message: e.to_string(),
    })?;

    for event in &events {
        projectors::apply(&mut tx, event)
            .await
            .map_err(|source| ReplayError::EventFailed {
                event_id: event.id,
                event_type: event.event_type(),
                source,
            })?;
    }

    tx.commit().await.map_err(|e| ReplayError::Database {
        operation: "commit rebuild",
        message: e.to_string(),
    })?;

    tracing::info!(
        world_id = %world_id,
        events = events.len(),
        "projections rebuilt from ledger"
    );

    Ok(RebuildReport {
        world_id,
        events_applied: events.len(),
    })
}
