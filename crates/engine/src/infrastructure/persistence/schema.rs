//! SQLite schema for the ledger and its projections.
//!
//! The `events` table is the source of truth; every other table is a
//! projection that can be dropped and rebuilt by replay. Timestamps are
//! stored as integer microseconds since the epoch so `(ts, id)` ordering is
//! a plain composite index scan.

use sqlx::SqlitePool;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS worlds (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        ruleset_id TEXT,
        created_at INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        world_id TEXT NOT NULL REFERENCES worlds(id),
        campaign_id TEXT,
        combat_id TEXT,
        session_id TEXT,
        event_type TEXT NOT NULL,
        scope TEXT NOT NULL,
        visibility TEXT NOT NULL,
        ts INTEGER NOT NULL,
        actor_id TEXT,
        target_id TEXT,
        payload TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_events_world_order ON events (world_id, ts, id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS campaigns (
        id TEXT PRIMARY KEY,
        world_id TEXT NOT NULL REFERENCES worlds(id),
        name TEXT NOT NULL,
        description TEXT,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id TEXT PRIMARY KEY,
        world_id TEXT NOT NULL REFERENCES worlds(id),
        campaign_id TEXT,
        owner_id TEXT,
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        stats TEXT NOT NULL,
        hp_current INTEGER NOT NULL,
        hp_max INTEGER NOT NULL,
        mp_current INTEGER NOT NULL,
        mp_max INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS combats (
        id TEXT PRIMARY KEY,
        world_id TEXT NOT NULL REFERENCES worlds(id),
        campaign_id TEXT NOT NULL,
        round INTEGER NOT NULL,
        turn_index INTEGER NOT NULL,
        is_active INTEGER NOT NULL,
        started_at INTEGER NOT NULL,
        ended_at INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS combatants (
        id TEXT PRIMARY KEY,
        combat_id TEXT NOT NULL REFERENCES combats(id),
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        ref_id TEXT,
        initiative INTEGER NOT NULL,
        roll_order INTEGER NOT NULL,
        hp_current INTEGER NOT NULL,
        hp_max INTEGER NOT NULL,
        mp_current INTEGER NOT NULL,
        mp_max INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS applied_conditions (
        id TEXT PRIMARY KEY,
        world_id TEXT NOT NULL REFERENCES worlds(id),
        target_id TEXT NOT NULL,
        condition TEXT NOT NULL,
        source TEXT,
        applied_at INTEGER NOT NULL
    )
    "#,
];

/// Create all tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in TABLES {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
