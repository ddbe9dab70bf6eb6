//! The append-only event ledger.
//!
//! Events are written inside the dispatcher's transaction and never updated
//! or deleted afterwards. `(ts asc, id asc)` is the replay order.

use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use tomekeeper_domain::{Event, EventPayload, EventId, SessionId, WorldId};

use crate::infrastructure::ports::RepoError;

use super::{parse_uuid, ts_from_micros};

pub struct EventLedger {
    pool: SqlitePool,
}

impl EventLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an event inside an open transaction.
    ///
    /// The caller owns the transaction; the ledger never commits.
    pub async fn append(
        tx: &mut Transaction<'_, Sqlite>,
        event: &Event,
    ) -> Result<(), RepoError> {
        let payload = serde_json::to_string(&event.payload)
            .map_err(|e| RepoError::serialization(format!("encode payload: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO events
                (id, world_id, campaign_id, combat_id, session_id,
                 event_type, scope, visibility, ts, actor_id, target_id, payload)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.world_id.to_string())
        .bind(event.campaign_id.map(|id| id.to_string()))
        .bind(event.combat_id.map(|id| id.to_string()))
        .bind(event.session_id.map(|id| id.to_string()))
        .bind(event.event_type().as_str())
        .bind(event.scope.as_str())
        .bind(event.visibility.as_str())
        .bind(event.ts.timestamp_micros())
        .bind(event.actor_id.map(|id| id.to_string()))
        .bind(event.target_id.map(|id| id.to_string()))
        .bind(payload)
        .execute(&mut **tx)
        .await
        .map_err(|e| RepoError::database("append event", e))?;

        Ok(())
    }

    /// All events for a world, in replay order `(ts asc, id asc)`.
    pub async fn for_world(&self, world_id: WorldId) -> Result<Vec<Event>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, world_id, campaign_id, combat_id, session_id,
                   scope, visibility, ts, actor_id, target_id, payload
            FROM events
            WHERE world_id = ?
            ORDER BY ts ASC, id ASC
            "#,
        )
        .bind(world_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("load events", e))?;

        rows.iter().map(row_to_event).collect()
    }

    /// Number of events recorded for a world.
    pub async fn count_for_world(&self, world_id: WorldId) -> Result<u64, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM events WHERE world_id = ?")
            .bind(world_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("count events", e))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| RepoError::database("count events", e))?;
        Ok(n as u64)
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<Event, RepoError> {
    let decode = |e: sqlx::Error| RepoError::database("decode event", e);

    let id: String = row.try_get("id").map_err(decode)?;
    let world_id: String = row.try_get("world_id").map_err(decode)?;
    let campaign_id: Option<String> = row.try_get("campaign_id").map_err(decode)?;
    let combat_id: Option<String> = row.try_get("combat_id").map_err(decode)?;
    let session_id: Option<String> = row.try_get("session_id").map_err(decode)?;
    let scope: String = row.try_get("scope").map_err(decode)?;
    let visibility: String = row.try_get("visibility").map_err(decode)?;
    let ts: i64 = row.try_get("ts").map_err(decode)?;
    let actor_id: Option<String> = row.try_get("actor_id").map_err(decode)?;
    let target_id: Option<String> = row.try_get("target_id").map_err(decode)?;
    let payload: String = row.try_get("payload").map_err(decode)?;

    let payload: EventPayload = serde_json::from_str(&payload)
        .map_err(|e| RepoError::serialization(format!("decode payload: {}", e)))?;

    Ok(Event {
        id: EventId::from_uuid(parse_uuid(&id, "events.id")?),
        world_id: WorldId::from_uuid(parse_uuid(&world_id, "events.world_id")?),
        campaign_id: campaign_id
            .map(|v| parse_uuid(&v, "events.campaign_id").map(Into::into))
            .transpose()?,
        combat_id: combat_id
            .map(|v| parse_uuid(&v, "events.combat_id").map(Into::into))
            .transpose()?,
        session_id: session_id
            .map(|v| parse_uuid(&v, "events.session_id").map(SessionId::from_uuid))
            .transpose()?,
        scope: scope
            .parse()
            .map_err(|e: tomekeeper_domain::DomainError| RepoError::serialization(e))?,
        visibility: visibility
            .parse()
            .map_err(|e: tomekeeper_domain::DomainError| RepoError::serialization(e))?,
        ts: ts_from_micros(ts)?,
        actor_id: actor_id
            .map(|v| parse_uuid(&v, "events.actor_id"))
            .transpose()?,
        target_id: target_id
            .map(|v| parse_uuid(&v, "events.target_id"))
            .transpose()?,
        payload,
    })
}
