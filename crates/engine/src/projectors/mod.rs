//! Projectors - per-event-type projection handlers.
//!
//! Each handler upserts exactly the entities implied by its event type,
//! keyed by the id carried in the payload, never a freshly generated one.
//! Handlers are idempotent: applying the same event twice leaves the same
//! entity state, which is what makes replay correct after partial failures.
//! Projectors never mutate events.
//!
//! Resolution events (attack/spell/skill) and notes project nothing: HP/MP
//! is live-game state mutated directly by the action handlers, and the
//! ledger keeps the narrative record only.

use sqlx::{Sqlite, Transaction};
use thiserror::Error;

use tomekeeper_domain::{Combatant, Event, EventPayload, InitiativeRecord};

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Apply an event's projection inside the caller's transaction.
///
/// This is the single projection path: the dispatcher calls it at write
/// time and replay calls it again during rebuild, so there is no drift
/// between live and rebuilt state.
pub async fn apply(tx: &mut Transaction<'_, Sqlite>, event: &Event) -> Result<(), ProjectionError> {
    match &event.payload {
        EventPayload::WorldCreated {
            world_id,
            title,
            description,
            ruleset_id,
        } => {
            sqlx::query(
                r#"
                INSERT INTO worlds (id, title, description, ruleset_id, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    ruleset_id = excluded.ruleset_id,
                    created_at = excluded.created_at
                "#,
            )
            .bind(world_id.to_string())
            .bind(title)
            .bind(description)
            .bind(ruleset_id)
            .bind(event.ts.timestamp_micros())
            .execute(&mut **tx)
            .await?;
        }

        EventPayload::CampaignCreated {
            campaign_id,
            name,
            description,
        } => {
            sqlx::query(
                r#"
                INSERT INTO campaigns (id, world_id, name, description, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    world_id = excluded.world_id,
                    name = excluded.name,
                    description = excluded.description,
                    created_at = excluded.created_at
                "#,
            )
            .bind(campaign_id.to_string())
            .bind(event.world_id.to_string())
            .bind(name)
            .bind(description)
            .bind(event.ts.timestamp_micros())
            .execute(&mut **tx)
            .await?;
        }

        EventPayload::CharacterCreated {
            character_id,
            name,
            kind,
            owner_id,
            stats,
            hp_max,
            mp_max,
        } => {
            let stats_json = serde_json::to_string(stats)?;
            // Creation sets both pools to full; re-applying the same event
            // lands on the same state.
            sqlx::query(
                r#"
                INSERT INTO characters
                    (id, world_id, campaign_id, owner_id, name, kind, stats,
                     hp_current, hp_max, mp_current, mp_max)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    world_id = excluded.world_id,
                    campaign_id = excluded.campaign_id,
                    owner_id = excluded.owner_id,
                    name = excluded.name,
                    kind = excluded.kind,
                    stats = excluded.stats,
                    hp_current = excluded.hp_current,
                    hp_max = excluded.hp_max,
                    mp_current = excluded.mp_current,
                    mp_max = excluded.mp_max
                "#,
            )
            .bind(character_id.to_string())
            .bind(event.world_id.to_string())
            .bind(event.campaign_id.map(|id| id.to_string()))
            .bind(owner_id.map(|id| id.to_string()))
            .bind(name)
            .bind(kind.as_str())
            .bind(stats_json)
            .bind(hp_max)
            .bind(hp_max)
            .bind(mp_max)
            .bind(mp_max)
            .execute(&mut **tx)
            .await?;
        }

        EventPayload::CombatStarted {
            combat_id,
            campaign_id,
            round,
        } => {
            sqlx::query(
                r#"
                INSERT INTO combats
                    (id, world_id, campaign_id, round, turn_index, is_active, started_at, ended_at)
                VALUES (?, ?, ?, ?, 0, 1, ?, NULL)
                ON CONFLICT(id) DO UPDATE SET
                    world_id = excluded.world_id,
                    campaign_id = excluded.campaign_id,
                    round = excluded.round,
                    turn_index = excluded.turn_index,
                    is_active = excluded.is_active,
                    started_at = excluded.started_at,
                    ended_at = excluded.ended_at
                "#,
            )
            .bind(combat_id.to_string())
            .bind(event.world_id.to_string())
            .bind(campaign_id.to_string())
            .bind(*round as i64)
            .bind(event.ts.timestamp_micros())
            .execute(&mut **tx)
            .await?;
        }

        EventPayload::Initiative(InitiativeRecord { combatant, .. }) => {
            // The first roll of a set replaces the combat's previous roster,
            // so a full-ledger replay converges on the latest initiative.
            if combatant.roll_order == 0 {
                sqlx::query("DELETE FROM combatants WHERE combat_id = ?")
                    .bind(combatant.combat_id.to_string())
                    .execute(&mut **tx)
                    .await?;
            }
            upsert_combatant(tx, combatant).await?;
        }

        EventPayload::Turn {
            combat_id,
            round,
            turn_index,
            ..
        } => {
            // TURN before COMBAT_STARTED is invalid input, not a projector
            // concern: the update is a no-op when the row is missing.
            sqlx::query("UPDATE combats SET round = ?, turn_index = ? WHERE id = ?")
                .bind(*round as i64)
                .bind(*turn_index as i64)
                .bind(combat_id.to_string())
                .execute(&mut **tx)
                .await?;
        }

        EventPayload::CombatEnded { combat_id, rounds } => {
            sqlx::query(
                "UPDATE combats SET is_active = 0, round = ?, ended_at = ? WHERE id = ?",
            )
            .bind(*rounds as i64)
            .bind(event.ts.timestamp_micros())
            .bind(combat_id.to_string())
            .execute(&mut **tx)
            .await?;
        }

        EventPayload::ConditionApplied {
            condition_id,
            target_id,
            condition,
            source,
        } => {
            sqlx::query(
                r#"
                INSERT INTO applied_conditions
                    (id, world_id, target_id, condition, source, applied_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    world_id = excluded.world_id,
                    target_id = excluded.target_id,
                    condition = excluded.condition,
                    source = excluded.source,
                    applied_at = excluded.applied_at
                "#,
            )
            .bind(condition_id.to_string())
            .bind(event.world_id.to_string())
            .bind(target_id.to_string())
            .bind(condition.as_str())
            .bind(source)
            .bind(event.ts.timestamp_micros())
            .execute(&mut **tx)
            .await?;
        }

        EventPayload::ConditionRemoved { condition_id, .. } => {
            sqlx::query("DELETE FROM applied_conditions WHERE id = ?")
                .bind(condition_id.to_string())
                .execute(&mut **tx)
                .await?;
        }

        // Narrative-only events: the ledger is their projection.
        EventPayload::AttackResolved(_)
        | EventPayload::SpellResolved(_)
        | EventPayload::SkillResolved(_)
        | EventPayload::Note { .. } => {}

        // Forward compatibility: event types from newer builds project nothing.
        EventPayload::Unknown => {}
    }

    Ok(())
}

async fn upsert_combatant(
    tx: &mut Transaction<'_, Sqlite>,
    combatant: &Combatant,
) -> Result<(), ProjectionError> {
    sqlx::query(
        r#"
        INSERT INTO combatants
            (id, combat_id, name, kind, ref_id, initiative, roll_order,
             hp_current, hp_max, mp_current, mp_max)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            combat_id = excluded.combat_id,
            name = excluded.name,
            kind = excluded.kind,
            ref_id = excluded.ref_id,
            initiative = excluded.initiative,
            roll_order = excluded.roll_order,
            hp_current = excluded.hp_current,
            hp_max = excluded.hp_max,
            mp_current = excluded.mp_current,
            mp_max = excluded.mp_max
        "#,
    )
    .bind(combatant.id.to_string())
    .bind(combatant.combat_id.to_string())
    .bind(&combatant.name)
    .bind(combatant.kind.as_str())
    .bind(combatant.ref_id.map(|id| id.to_string()))
    .bind(combatant.initiative)
    .bind(combatant.roll_order as i64)
    .bind(combatant.hp_current)
    .bind(combatant.hp_max)
    .bind(combatant.mp_current)
    .bind(combatant.mp_max)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
