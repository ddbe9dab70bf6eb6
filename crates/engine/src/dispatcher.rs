//! The dispatcher - the sole write path into the ledger.
//!
//! Validates the draft, then runs shell-row creation (world events only),
//! ledger append, and projection apply inside one transaction. Either all
//! three are visible or none; no event is ever partially applied.

use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;

use tomekeeper_domain::{Event, EventDraft, EventId, EventPayload};

use crate::infrastructure::persistence::EventLedger;
use crate::infrastructure::ports::{ClockPort, RepoError};
use crate::projectors::{self, ProjectionError};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Rejected before any transaction was opened.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("projection failed: {0}")]
    Projection(#[from] ProjectionError),
}

pub struct Dispatcher {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl Dispatcher {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self { pool, clock }
    }

    /// Validate, append, and project an event atomically.
    ///
    /// Returns the persisted event, stamped with identity and timestamp.
    pub async fn dispatch(&self, draft: EventDraft) -> Result<Event, DispatchError> {
        draft
            .payload
            .validate()
            .map_err(|e| DispatchError::Validation(e.to_string()))?;

        if let EventPayload::WorldCreated { world_id, .. } = &draft.payload {
            if *world_id != draft.world_id {
                return Err(DispatchError::Validation(
                    "world creation payload does not match the event's world".to_string(),
                ));
            }
        }

        let event = draft.into_event(EventId::new(), self.clock.now());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("begin dispatch", e))?;

        if matches!(event.payload, EventPayload::WorldCreated { .. }) {
            // The event and the world it describes are born together: a
            // shell row satisfies the event's foreign key, then the
            // projector overwrites it with the real data.
            sqlx::query(
                "INSERT INTO worlds (id, title, created_at) VALUES (?, '', ?) \
                 ON CONFLICT(id) DO NOTHING",
            )
            .bind(event.world_id.to_string())
            .bind(event.ts.timestamp_micros())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("world shell row", e))?;
        }

        EventLedger::append(&mut tx, &event).await?;
        projectors::apply(&mut tx, &event).await?;

        tx.commit()
            .await
            .map_err(|e| RepoError::database("commit dispatch", e))?;

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type(),
            world_id = %event.world_id,
            "event dispatched"
        );

        Ok(event)
    }
}
