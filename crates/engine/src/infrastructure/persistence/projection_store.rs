//! Read and fast-path access to projection rows.
//!
//! Reads serve queries and the use-case layer; the direct mutations
//! (HP/MP, combatant clearing) are the live-game fast path that deliberately
//! bypasses the ledger - only the narrative resolution event records them.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use tomekeeper_domain::{
    AppliedCondition, Campaign, CampaignId, Character, CharacterId, Combat, CombatId, Combatant,
    CombatantId, ConditionId, StatBlock, UserId, World, WorldId,
};

use crate::infrastructure::ports::RepoError;

use super::{parse_uuid, ts_from_micros};

pub struct ProjectionStore {
    pool: SqlitePool,
}

impl ProjectionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Worlds / campaigns / characters
    // ------------------------------------------------------------------

    pub async fn world(&self, id: WorldId) -> Result<Option<World>, RepoError> {
        let row = sqlx::query(
            "SELECT id, title, description, ruleset_id, created_at FROM worlds WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("load world", e))?;

        row.as_ref().map(row_to_world).transpose()
    }

    pub async fn campaign(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError> {
        let row = sqlx::query(
            "SELECT id, world_id, name, description, created_at FROM campaigns WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("load campaign", e))?;

        row.as_ref().map(row_to_campaign).transpose()
    }

    pub async fn character(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, world_id, campaign_id, owner_id, name, kind, stats,
                   hp_current, hp_max, mp_current, mp_max
            FROM characters WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("load character", e))?;

        row.as_ref().map(row_to_character).transpose()
    }

    /// Characters enrolled in a campaign, in creation order.
    pub async fn characters_in_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, world_id, campaign_id, owner_id, name, kind, stats,
                   hp_current, hp_max, mp_current, mp_max
            FROM characters WHERE campaign_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(campaign_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("load characters", e))?;

        rows.iter().map(row_to_character).collect()
    }

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------

    pub async fn combat(&self, id: CombatId) -> Result<Option<Combat>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, world_id, campaign_id, round, turn_index, is_active, started_at, ended_at
            FROM combats WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("load combat", e))?;

        row.as_ref().map(row_to_combat).transpose()
    }

    pub async fn active_combat_in_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Combat>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, world_id, campaign_id, round, turn_index, is_active, started_at, ended_at
            FROM combats WHERE campaign_id = ? AND is_active = 1
            "#,
        )
        .bind(campaign_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("load active combat", e))?;

        row.as_ref().map(row_to_combat).transpose()
    }

    pub async fn combatant(&self, id: CombatantId) -> Result<Option<Combatant>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, combat_id, name, kind, ref_id, initiative, roll_order,
                   hp_current, hp_max, mp_current, mp_max
            FROM combatants WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("load combatant", e))?;

        row.as_ref().map(row_to_combatant).transpose()
    }

    /// Combatants in turn order: initiative descending, ties broken by the
    /// order initiative was rolled.
    pub async fn combatants(&self, combat_id: CombatId) -> Result<Vec<Combatant>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, combat_id, name, kind, ref_id, initiative, roll_order,
                   hp_current, hp_max, mp_current, mp_max
            FROM combatants WHERE combat_id = ?
            ORDER BY initiative DESC, roll_order ASC
            "#,
        )
        .bind(combat_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("load combatants", e))?;

        rows.iter().map(row_to_combatant).collect()
    }

    /// Live-path HP write; the narrative event records before/after.
    pub async fn set_combatant_hp(&self, id: CombatantId, hp: i32) -> Result<(), RepoError> {
        sqlx::query("UPDATE combatants SET hp_current = ? WHERE id = ?")
            .bind(hp)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("set combatant hp", e))?;
        Ok(())
    }

    /// Live-path MP write; the narrative event records before/after.
    pub async fn set_combatant_mp(&self, id: CombatantId, mp: i32) -> Result<(), RepoError> {
        sqlx::query("UPDATE combatants SET mp_current = ? WHERE id = ?")
            .bind(mp)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("set combatant mp", e))?;
        Ok(())
    }

    /// Drop a combat's roster ahead of a fresh initiative roll.
    pub async fn clear_combatants(&self, combat_id: CombatId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM combatants WHERE combat_id = ?")
            .bind(combat_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("clear combatants", e))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------

    pub async fn condition(&self, id: ConditionId) -> Result<Option<AppliedCondition>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, world_id, target_id, condition, source, applied_at
            FROM applied_conditions WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("load condition", e))?;

        row.as_ref().map(row_to_condition).transpose()
    }

    /// Active conditions on a combatant or character.
    pub async fn conditions_on(&self, target_id: Uuid) -> Result<Vec<AppliedCondition>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, world_id, target_id, condition, source, applied_at
            FROM applied_conditions WHERE target_id = ?
            ORDER BY applied_at ASC
            "#,
        )
        .bind(target_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("load conditions", e))?;

        rows.iter().map(row_to_condition).collect()
    }
}

// ----------------------------------------------------------------------
// Row mapping
// ----------------------------------------------------------------------

type SqliteRow = sqlx::sqlite::SqliteRow;

fn decode(e: sqlx::Error) -> RepoError {
    RepoError::database("decode row", e)
}

fn row_to_world(row: &SqliteRow) -> Result<World, RepoError> {
    let id: String = row.try_get("id").map_err(decode)?;
    let title: String = row.try_get("title").map_err(decode)?;
    let description: Option<String> = row.try_get("description").map_err(decode)?;
    let ruleset_id: Option<String> = row.try_get("ruleset_id").map_err(decode)?;
    let created_at: i64 = row.try_get("created_at").map_err(decode)?;

    Ok(World {
        id: WorldId::from_uuid(parse_uuid(&id, "worlds.id")?),
        title,
        description,
        ruleset_id,
        created_at: ts_from_micros(created_at)?,
    })
}

fn row_to_campaign(row: &SqliteRow) -> Result<Campaign, RepoError> {
    let id: String = row.try_get("id").map_err(decode)?;
    let world_id: String = row.try_get("world_id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let description: Option<String> = row.try_get("description").map_err(decode)?;
    let created_at: i64 = row.try_get("created_at").map_err(decode)?;

    Ok(Campaign {
        id: CampaignId::from_uuid(parse_uuid(&id, "campaigns.id")?),
        world_id: WorldId::from_uuid(parse_uuid(&world_id, "campaigns.world_id")?),
        name,
        description,
        created_at: ts_from_micros(created_at)?,
    })
}

fn row_to_character(row: &SqliteRow) -> Result<Character, RepoError> {
    let id: String = row.try_get("id").map_err(decode)?;
    let world_id: String = row.try_get("world_id").map_err(decode)?;
    let campaign_id: Option<String> = row.try_get("campaign_id").map_err(decode)?;
    let owner_id: Option<String> = row.try_get("owner_id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let kind: String = row.try_get("kind").map_err(decode)?;
    let stats: String = row.try_get("stats").map_err(decode)?;
    let hp_current: i32 = row.try_get("hp_current").map_err(decode)?;
    let hp_max: i32 = row.try_get("hp_max").map_err(decode)?;
    let mp_current: i32 = row.try_get("mp_current").map_err(decode)?;
    let mp_max: i32 = row.try_get("mp_max").map_err(decode)?;

    let stats: StatBlock = serde_json::from_str(&stats)
        .map_err(|e| RepoError::serialization(format!("decode stats: {}", e)))?;

    Ok(Character {
        id: CharacterId::from_uuid(parse_uuid(&id, "characters.id")?),
        world_id: WorldId::from_uuid(parse_uuid(&world_id, "characters.world_id")?),
        campaign_id: campaign_id
            .map(|v| parse_uuid(&v, "characters.campaign_id").map(CampaignId::from_uuid))
            .transpose()?,
        owner_id: owner_id
            .map(|v| parse_uuid(&v, "characters.owner_id").map(UserId::from_uuid))
            .transpose()?,
        name,
        kind: kind
            .parse()
            .map_err(|e: tomekeeper_domain::DomainError| RepoError::serialization(e))?,
        stats,
        hp_current,
        hp_max,
        mp_current,
        mp_max,
    })
}

fn row_to_combat(row: &SqliteRow) -> Result<Combat, RepoError> {
    let id: String = row.try_get("id").map_err(decode)?;
    let world_id: String = row.try_get("world_id").map_err(decode)?;
    let campaign_id: String = row.try_get("campaign_id").map_err(decode)?;
    let round: i64 = row.try_get("round").map_err(decode)?;
    let turn_index: i64 = row.try_get("turn_index").map_err(decode)?;
    let is_active: i64 = row.try_get("is_active").map_err(decode)?;
    let started_at: i64 = row.try_get("started_at").map_err(decode)?;
    let ended_at: Option<i64> = row.try_get("ended_at").map_err(decode)?;

    Ok(Combat {
        id: CombatId::from_uuid(parse_uuid(&id, "combats.id")?),
        world_id: WorldId::from_uuid(parse_uuid(&world_id, "combats.world_id")?),
        campaign_id: CampaignId::from_uuid(parse_uuid(&campaign_id, "combats.campaign_id")?),
        round: round as u32,
        turn_index: turn_index as u32,
        is_active: is_active != 0,
        started_at: ts_from_micros(started_at)?,
        ended_at: ended_at.map(ts_from_micros).transpose()?,
    })
}

fn row_to_combatant(row: &SqliteRow) -> Result<Combatant, RepoError> {
    let id: String = row.try_get("id").map_err(decode)?;
    let combat_id: String = row.try_get("combat_id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let kind: String = row.try_get("kind").map_err(decode)?;
    let ref_id: Option<String> = row.try_get("ref_id").map_err(decode)?;
    let initiative: i32 = row.try_get("initiative").map_err(decode)?;
    let roll_order: i64 = row.try_get("roll_order").map_err(decode)?;
    let hp_current: i32 = row.try_get("hp_current").map_err(decode)?;
    let hp_max: i32 = row.try_get("hp_max").map_err(decode)?;
    let mp_current: i32 = row.try_get("mp_current").map_err(decode)?;
    let mp_max: i32 = row.try_get("mp_max").map_err(decode)?;

    Ok(Combatant {
        id: CombatantId::from_uuid(parse_uuid(&id, "combatants.id")?),
        combat_id: CombatId::from_uuid(parse_uuid(&combat_id, "combatants.combat_id")?),
        name,
        kind: kind
            .parse()
            .map_err(|e: tomekeeper_domain::DomainError| RepoError::serialization(e))?,
        ref_id: ref_id
            .map(|v| parse_uuid(&v, "combatants.ref_id").map(CharacterId::from_uuid))
            .transpose()?,
        initiative,
        roll_order: roll_order as u32,
        hp_current,
        hp_max,
        mp_current,
        mp_max,
    })
}

fn row_to_condition(row: &SqliteRow) -> Result<AppliedCondition, RepoError> {
    let id: String = row.try_get("id").map_err(decode)?;
    let world_id: String = row.try_get("world_id").map_err(decode)?;
    let target_id: String = row.try_get("target_id").map_err(decode)?;
    let condition: String = row.try_get("condition").map_err(decode)?;
    let source: Option<String> = row.try_get("source").map_err(decode)?;
    let applied_at: i64 = row.try_get("applied_at").map_err(decode)?;

    Ok(AppliedCondition {
        id: ConditionId::from_uuid(parse_uuid(&id, "applied_conditions.id")?),
        world_id: WorldId::from_uuid(parse_uuid(&world_id, "applied_conditions.world_id")?),
        target_id: parse_uuid(&target_id, "applied_conditions.target_id")?,
        condition: condition
            .parse()
            .map_err(|e: tomekeeper_domain::DomainError| RepoError::serialization(e))?,
        source,
        applied_at: ts_from_micros(applied_at)?,
    })
}
