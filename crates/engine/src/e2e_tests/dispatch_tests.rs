//! Dispatcher behavior: validation, atomic projection, idempotent replays.

use std::sync::Arc;

use tomekeeper_domain::{CharacterId, CharacterKind, EventDraft, EventPayload, StatBlock, WorldId};

use crate::dispatcher::DispatchError;
use crate::infrastructure::clock::SystemRandom;
use crate::projectors;

use super::helpers::{engine_with, seed_world};

#[tokio::test]
async fn blank_world_title_is_rejected_before_any_write() {
    let engine = engine_with(Arc::new(SystemRandom::new())).await;
    let world_id = WorldId::new();

    let result = engine
        .dispatcher
        .dispatch(EventDraft::new(
            world_id,
            EventPayload::WorldCreated {
                world_id,
                title: "   ".to_string(),
                description: None,
                ruleset_id: None,
            },
        ))
        .await;

    assert!(matches!(result, Err(DispatchError::Validation(_))));
    // Nothing leaked: no event, no shell row.
    assert_eq!(engine.ledger.count_for_world(world_id).await.unwrap(), 0);
    assert!(engine.store.world(world_id).await.unwrap().is_none());
}

#[tokio::test]
async fn mismatched_world_creation_payload_is_rejected() {
    let engine = engine_with(Arc::new(SystemRandom::new())).await;

    let result = engine
        .dispatcher
        .dispatch(EventDraft::new(
            WorldId::new(),
            EventPayload::WorldCreated {
                world_id: WorldId::new(),
                title: "Arton".to_string(),
                description: None,
                ruleset_id: None,
            },
        ))
        .await;

    assert!(matches!(result, Err(DispatchError::Validation(_))));
}

#[tokio::test]
async fn world_creation_materializes_row_and_event_together() {
    let engine = engine_with(Arc::new(SystemRandom::new())).await;
    let world = seed_world(&engine, "Arton").await;

    assert_eq!(world.title, "Arton");
    let events = engine.ledger.for_world(world.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type().as_str(), "WORLD_CREATED");
}

#[tokio::test]
async fn character_projection_is_idempotent() {
    let engine = engine_with(Arc::new(SystemRandom::new())).await;
    let world = seed_world(&engine, "Arton").await;

    let character_id = CharacterId::new();
    let event = engine
        .dispatcher
        .dispatch(EventDraft::new(
            world.id,
            EventPayload::CharacterCreated {
                character_id,
                name: "Korvo".to_string(),
                kind: CharacterKind::Player,
                owner_id: None,
                stats: StatBlock::new().with("DEX", 15),
                hp_max: 22,
                mp_max: 8,
            },
        ))
        .await
        .unwrap();

    let first = engine.store.character(character_id).await.unwrap().unwrap();

    // Apply the same event a second time, straight through the projector.
    let mut tx = engine.pool.begin().await.unwrap();
    projectors::apply(&mut tx, &event).await.unwrap();
    tx.commit().await.unwrap();

    let second = engine.store.character(character_id).await.unwrap().unwrap();
    assert_eq!(first, second);

    // Still exactly one row.
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM characters WHERE id = ?")
        .bind(character_id.to_string())
        .fetch_one(&engine.pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[tokio::test]
async fn events_are_stamped_with_increasing_timestamps() {
    let engine = engine_with(Arc::new(SystemRandom::new())).await;
    let world = seed_world(&engine, "Arton").await;

    engine
        .dispatcher
        .dispatch(EventDraft::new(
            world.id,
            EventPayload::Note {
                text: "The party gathers.".to_string(),
            },
        ))
        .await
        .unwrap();

    let events = engine.ledger.for_world(world.id).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].ts < events[1].ts);
    assert_ne!(events[0].id, events[1].id);
}

#[tokio::test]
async fn file_backed_engine_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite:{}?mode=rwc",
        dir.path().join("campaign.db").display()
    );

    let world_id = {
        let engine = crate::app::Engine::connect(&url).await.unwrap();
        seed_world(&engine, "Arton").await.id
    };

    // A fresh engine over the same file sees the ledger and projections.
    let engine = crate::app::Engine::connect(&url).await.unwrap();
    let world = engine.store.world(world_id).await.unwrap().unwrap();
    assert_eq!(world.title, "Arton");
    assert_eq!(engine.ledger.count_for_world(world_id).await.unwrap(), 1);
}
