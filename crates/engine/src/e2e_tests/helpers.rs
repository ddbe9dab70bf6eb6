//! Shared fixtures for the end-to-end tests.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use tomekeeper_domain::{
    Campaign, Character, CharacterKind, RulesetRegistry, StatBlock, World, WorldId,
};

use crate::app::Engine;
use crate::infrastructure::clock::TickingClock;
use crate::infrastructure::persistence::init_schema;
use crate::infrastructure::ports::RandomPort;
use crate::use_cases::{CreateCampaignInput, CreateCharacterInput, CreateWorldInput};

/// Single-connection in-memory database; one connection keeps every handle
/// on the same database.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("parse sqlite url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect in-memory sqlite");
    init_schema(&pool).await.expect("init schema");
    pool
}

/// Engine with a strictly increasing clock and the given dice source.
pub async fn engine_with(random: Arc<dyn RandomPort>) -> Engine {
    let pool = memory_pool().await;
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).single().expect("valid start time");
    Engine::with_ports(
        pool,
        Arc::new(TickingClock::starting_at(start)),
        random,
        Arc::new(RulesetRegistry::new()),
    )
}

pub async fn seed_world(engine: &Engine, title: &str) -> World {
    engine
        .use_cases
        .management
        .create_world
        .execute(CreateWorldInput {
            title: title.to_string(),
            description: None,
            ruleset_id: None,
        })
        .await
        .expect("create world")
}

pub async fn seed_campaign(engine: &Engine, world_id: WorldId, name: &str) -> Campaign {
    engine
        .use_cases
        .management
        .create_campaign
        .execute(
            world_id,
            CreateCampaignInput {
                name: name.to_string(),
                description: None,
            },
        )
        .await
        .expect("create campaign")
}

pub async fn seed_character(
    engine: &Engine,
    world: &World,
    campaign: &Campaign,
    name: &str,
    dex: i32,
    hp: i32,
    mp: i32,
) -> Character {
    engine
        .use_cases
        .management
        .create_character
        .execute(
            world.id,
            CreateCharacterInput {
                name: name.to_string(),
                kind: CharacterKind::Player,
                campaign_id: Some(campaign.id),
                owner_id: None,
                stats: StatBlock::new().with("DEX", dex).with("STR", 14),
                hp_max: hp,
                mp_max: mp,
            },
        )
        .await
        .expect("create character")
}
