//! Action resolution: attacks, spells, skills, conditions.

use std::sync::Arc;

use tomekeeper_domain::{
    AttackSpec, Combatant, ConditionKind, EventPayload, SkillSpec, SpellSpec,
};

use crate::infrastructure::clock::{SequenceRandom, SystemRandom};
use crate::use_cases::{ActionError, AttackCommand, SkillCommand, SpellCommand};

use super::helpers::{engine_with, seed_campaign, seed_character, seed_world};

struct Arena {
    engine: crate::app::Engine,
    world: tomekeeper_domain::World,
    campaign: tomekeeper_domain::Campaign,
    combat: tomekeeper_domain::Combat,
    attacker: Combatant,
    defender: Combatant,
}

/// Two combatants squared off; initiative consumes the first two rolls of
/// the dice script.
async fn arena(rolls: &[i32]) -> Arena {
    let engine = engine_with(Arc::new(SequenceRandom::new(rolls))).await;
    let world = seed_world(&engine, "Arton").await;
    let campaign = seed_campaign(&engine, world.id, "Saga").await;
    seed_character(&engine, &world, &campaign, "Korvo", 16, 24, 10).await;
    seed_character(&engine, &world, &campaign, "Lissa", 12, 18, 16).await;

    let combat = engine
        .use_cases
        .combat
        .start
        .execute(world.id, campaign.id)
        .await
        .unwrap();
    let combatants = engine
        .use_cases
        .combat
        .roll_initiative
        .execute(combat.id)
        .await
        .unwrap();

    let attacker = combatants
        .iter()
        .find(|c| c.name == "Korvo")
        .cloned()
        .unwrap();
    let defender = combatants
        .iter()
        .find(|c| c.name == "Lissa")
        .cloned()
        .unwrap();

    Arena {
        engine,
        world,
        campaign,
        combat,
        attacker,
        defender,
    }
}

#[tokio::test]
async fn attack_applies_clamped_damage_and_records_the_event() {
    // Initiative 20, 10; attack d20 = 12; damage die = 5.
    let arena = arena(&[20, 10, 12, 5]).await;

    let report = arena
        .engine
        .use_cases
        .actions
        .attack
        .execute(AttackCommand {
            combat_id: arena.combat.id,
            attacker_id: arena.attacker.id,
            target_id: arena.defender.id,
            attack: AttackSpec::new("Longsword", "STR", "1d8+2"),
            target_defense: Some(10),
        })
        .await
        .unwrap();

    assert!(report.hit);
    assert!(!report.is_crit);
    // STR 14 -> +2; 12 + 2 = 14 vs defense 10.
    assert_eq!(report.result.total, 14);
    // 5 + 2 damage against 18 HP.
    assert_eq!(report.damage.as_ref().unwrap().total, 7);
    assert_eq!(report.target_hp_before, 18);
    assert_eq!(report.target_hp_after, 11);

    let stored = arena
        .engine
        .store
        .combatant(arena.defender.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.hp_current, 11);

    let events = arena.engine.ledger.for_world(arena.world.id).await.unwrap();
    let attack_event = events
        .iter()
        .find(|e| e.event_type().as_str() == "ATTACK_RESOLVED")
        .expect("attack event recorded");
    match &attack_event.payload {
        EventPayload::AttackResolved(record) => {
            assert_eq!(record.target_hp_before, 18);
            assert_eq!(record.target_hp_after, 11);
            assert!(record.hit);
        }
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[tokio::test]
async fn natural_twenty_doubles_damage() {
    // Initiative 20, 10; attack d20 = 20; damage die = 4.
    let arena = arena(&[20, 10, 20, 4]).await;

    let report = arena
        .engine
        .use_cases
        .actions
        .attack
        .execute(AttackCommand {
            combat_id: arena.combat.id,
            attacker_id: arena.attacker.id,
            target_id: arena.defender.id,
            attack: AttackSpec::new("Shortsword", "STR", "1d6+2").with_bonus(-2),
            target_defense: Some(50), // nat 20 hits regardless
        })
        .await
        .unwrap();

    assert!(report.hit);
    assert!(report.is_crit);
    // (4 + 2) * 2
    assert_eq!(report.damage.as_ref().unwrap().total, 12);
}

#[tokio::test]
async fn natural_one_misses_and_leaves_hp_alone() {
    let arena = arena(&[20, 10, 1]).await;

    let report = arena
        .engine
        .use_cases
        .actions
        .attack
        .execute(AttackCommand {
            combat_id: arena.combat.id,
            attacker_id: arena.attacker.id,
            target_id: arena.defender.id,
            attack: AttackSpec::new("Longsword", "STR", "1d8+2"),
            target_defense: None,
        })
        .await
        .unwrap();

    assert!(!report.hit);
    assert!(report.damage.is_none());
    assert_eq!(report.target_hp_before, report.target_hp_after);

    let stored = arena
        .engine
        .store
        .combatant(arena.defender.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.hp_current, 18);
}

#[tokio::test]
async fn overkill_damage_clamps_hp_at_zero() {
    // Attack d20 = 12, damage die = 8 -> 8 + 40 = 48 against 18 HP.
    let arena = arena(&[20, 10, 12, 8]).await;

    let report = arena
        .engine
        .use_cases
        .actions
        .attack
        .execute(AttackCommand {
            combat_id: arena.combat.id,
            attacker_id: arena.attacker.id,
            target_id: arena.defender.id,
            attack: AttackSpec::new("Greataxe", "STR", "1d12+40"),
            target_defense: None,
        })
        .await
        .unwrap();

    assert_eq!(report.target_hp_after, 0);
}

#[tokio::test]
async fn attack_on_ended_combat_is_rejected() {
    let arena = arena(&[20, 10]).await;
    arena
        .engine
        .use_cases
        .combat
        .end
        .execute(arena.campaign.id)
        .await
        .unwrap();

    let result = arena
        .engine
        .use_cases
        .actions
        .attack
        .execute(AttackCommand {
            combat_id: arena.combat.id,
            attacker_id: arena.attacker.id,
            target_id: arena.defender.id,
            attack: AttackSpec::new("Longsword", "STR", "1d8"),
            target_defense: None,
        })
        .await;
    assert!(matches!(result, Err(ActionError::NotActive)));
}

#[tokio::test]
async fn spell_pays_mp_and_applies_status() {
    // Initiative 20, 10; spell d20 = 14; damage dice 3, 2.
    let arena = arena(&[20, 10, 14, 3, 2]).await;

    let report = arena
        .engine
        .use_cases
        .actions
        .spell
        .execute(SpellCommand {
            combat_id: arena.combat.id,
            caster_id: arena.attacker.id,
            target_id: Some(arena.defender.id),
            spell: SpellSpec::new("Hexfire", "INT", 4)
                .with_damage("2d4+1")
                .applying(ConditionKind::Weakened),
        })
        .await
        .unwrap();

    assert_eq!(report.caster_mp_before, 10);
    assert_eq!(report.caster_mp_after, 6);
    // 3 + 2 + 1 damage against 18 HP.
    assert_eq!(report.target_hp_before, Some(18));
    assert_eq!(report.target_hp_after, Some(12));
    assert_eq!(report.conditions_applied.len(), 1);
    assert_eq!(
        report.conditions_applied[0].condition,
        ConditionKind::Weakened
    );

    // The status row now penalizes the defender's own attacks.
    let conditions = arena
        .engine
        .store
        .conditions_on(arena.defender.id.to_uuid())
        .await
        .unwrap();
    assert_eq!(conditions.len(), 1);

    let events = arena.engine.ledger.for_world(arena.world.id).await.unwrap();
    assert!(events
        .iter()
        .any(|e| e.event_type().as_str() == "SPELL_RESOLVED"));
    assert!(events
        .iter()
        .any(|e| e.event_type().as_str() == "CONDITION_APPLIED"));
}

#[tokio::test]
async fn spell_without_mp_is_rejected_before_any_mutation() {
    let arena = arena(&[20, 10, 14]).await;
    let events_before = arena
        .engine
        .ledger
        .count_for_world(arena.world.id)
        .await
        .unwrap();

    let result = arena
        .engine
        .use_cases
        .actions
        .spell
        .execute(SpellCommand {
            combat_id: arena.combat.id,
            caster_id: arena.attacker.id,
            target_id: Some(arena.defender.id),
            spell: SpellSpec::new("Meteor", "INT", 99),
        })
        .await;

    assert!(matches!(result, Err(ActionError::Constraint(_))));

    let stored = arena
        .engine
        .store
        .combatant(arena.attacker.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.mp_current, 10, "MP untouched");
    let events_after = arena
        .engine
        .ledger
        .count_for_world(arena.world.id)
        .await
        .unwrap();
    assert_eq!(events_before, events_after, "nothing recorded");
}

#[tokio::test]
async fn blinded_condition_penalizes_the_next_attack() {
    // Initiative 20, 10; attack d20 = 10.
    let arena = arena(&[20, 10, 10]).await;

    arena
        .engine
        .use_cases
        .actions
        .apply_condition
        .execute(
            arena.world.id,
            arena.attacker.id.to_uuid(),
            ConditionKind::Blinded,
            Some("sand in the eyes".to_string()),
        )
        .await
        .unwrap();

    let report = arena
        .engine
        .use_cases
        .actions
        .attack
        .execute(AttackCommand {
            combat_id: arena.combat.id,
            attacker_id: arena.attacker.id,
            target_id: arena.defender.id,
            attack: AttackSpec::new("Wild swing", "STR", "1d6"),
            target_defense: Some(30), // guaranteed miss; only the roll matters
        })
        .await
        .unwrap();

    // STR 14 -> +2, blinded -2: net modifier 0.
    assert_eq!(report.result.modifier, 0);
    assert_eq!(report.result.total, 10);
}

#[tokio::test]
async fn removing_a_condition_deletes_its_row() {
    let arena = arena(&[20, 10]).await;

    let applied = arena
        .engine
        .use_cases
        .actions
        .apply_condition
        .execute(
            arena.world.id,
            arena.defender.id.to_uuid(),
            ConditionKind::Prone,
            None,
        )
        .await
        .unwrap();

    arena
        .engine
        .use_cases
        .actions
        .remove_condition
        .execute(applied.id)
        .await
        .unwrap();

    let conditions = arena
        .engine
        .store
        .conditions_on(arena.defender.id.to_uuid())
        .await
        .unwrap();
    assert!(conditions.is_empty());

    // Both the apply and the removal are on the ledger.
    let events = arena.engine.ledger.for_world(arena.world.id).await.unwrap();
    assert!(events
        .iter()
        .any(|e| e.event_type().as_str() == "CONDITION_REMOVED"));
}

#[tokio::test]
async fn skill_check_records_without_mutating() {
    let engine = engine_with(Arc::new(SequenceRandom::new(&[13]))).await;
    let world = seed_world(&engine, "Arton").await;
    let campaign = seed_campaign(&engine, world.id, "Saga").await;
    let character = seed_character(&engine, &world, &campaign, "Korvo", 16, 24, 10).await;

    let report = engine
        .use_cases
        .actions
        .skill
        .execute(SkillCommand {
            world_id: world.id,
            campaign_id: Some(campaign.id),
            character_id: character.id,
            skill: SkillSpec::new("Acrobatics", "DEX").with_bonus(2).against_dc(15),
        })
        .await
        .unwrap();

    // DEX 16 -> +3, bonus +2: 13 + 5 = 18 vs DC 15.
    assert_eq!(report.result.total, 18);
    assert_eq!(report.result.success, Some(true));

    let after = engine.store.character(character.id).await.unwrap().unwrap();
    assert_eq!(after, character, "skill checks mutate nothing");

    let events = engine.ledger.for_world(world.id).await.unwrap();
    assert!(events
        .iter()
        .any(|e| e.event_type().as_str() == "SKILL_RESOLVED"));
}

#[tokio::test]
async fn unknown_combatant_is_not_found() {
    let arena = arena(&[20, 10]).await;

    let result = arena
        .engine
        .use_cases
        .actions
        .attack
        .execute(AttackCommand {
            combat_id: arena.combat.id,
            attacker_id: tomekeeper_domain::CombatantId::new(),
            target_id: arena.defender.id,
            attack: AttackSpec::new("Longsword", "STR", "1d8"),
            target_defense: None,
        })
        .await;
    assert!(matches!(result, Err(ActionError::NotFound { .. })));
}

#[tokio::test]
async fn system_random_attack_stays_in_range() {
    let engine = engine_with(Arc::new(SystemRandom::new())).await;
    let world = seed_world(&engine, "Arton").await;
    let campaign = seed_campaign(&engine, world.id, "Saga").await;
    seed_character(&engine, &world, &campaign, "Korvo", 10, 24, 10).await;
    seed_character(&engine, &world, &campaign, "Lissa", 10, 18, 16).await;

    let combat = engine
        .use_cases
        .combat
        .start
        .execute(world.id, campaign.id)
        .await
        .unwrap();
    let combatants = engine
        .use_cases
        .combat
        .roll_initiative
        .execute(combat.id)
        .await
        .unwrap();

    let report = engine
        .use_cases
        .actions
        .attack
        .execute(AttackCommand {
            combat_id: combat.id,
            attacker_id: combatants[0].id,
            target_id: combatants[1].id,
            attack: AttackSpec::new("Dagger", "DEX", "1d4"),
            target_defense: None,
        })
        .await
        .unwrap();

    assert!((1..=20).contains(&report.result.d20));
}
