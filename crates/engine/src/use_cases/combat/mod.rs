//! Combat use cases - the turn/round state machine.
//!
//! Combat moves INACTIVE -> ACTIVE -> INACTIVE, and a campaign's combat can
//! restart. Every transition is recorded as an event; the projection applies
//! it inside the dispatch transaction.

use std::sync::Arc;

use thiserror::Error;

use tomekeeper_domain::{
    sort_by_initiative, CampaignId, Combat, CombatId, Combatant, CombatantId, DomainError,
    EventDraft, EventPayload, InitiativeRecord, RulesetRegistry, WorldId,
};

use crate::dispatcher::{DispatchError, Dispatcher};
use crate::infrastructure::persistence::ProjectionStore;
use crate::infrastructure::ports::{RandomPort, RepoError};

#[derive(Debug, Error)]
pub enum CombatError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("combat is not active")]
    NotActive,

    #[error("combat has no combatants")]
    NoCombatants,

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl CombatError {
    fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Container for combat use cases.
pub struct CombatUseCases {
    pub start: Arc<StartCombat>,
    pub roll_initiative: Arc<RollInitiative>,
    pub next_turn: Arc<NextTurn>,
    pub end: Arc<EndCombat>,
}

/// The combat state after a turn advance.
#[derive(Debug, Clone)]
pub struct TurnState {
    pub combat: Combat,
    pub active: Combatant,
}

/// Start an encounter, or return the one already running.
pub struct StartCombat {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
}

impl StartCombat {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<ProjectionStore>) -> Self {
        Self { dispatcher, store }
    }

    pub async fn execute(
        &self,
        world_id: WorldId,
        campaign_id: CampaignId,
    ) -> Result<Combat, CombatError> {
        if self.store.campaign(campaign_id).await?.is_none() {
            return Err(CombatError::not_found("Campaign", campaign_id));
        }

        // Idempotent start: an already-active combat is returned unchanged.
        if let Some(existing) = self.store.active_combat_in_campaign(campaign_id).await? {
            tracing::debug!(combat_id = %existing.id, "combat already active");
            return Ok(existing);
        }

        let combat_id = CombatId::new();
        self.dispatcher
            .dispatch(
                EventDraft::new(
                    world_id,
                    EventPayload::CombatStarted {
                        combat_id,
                        campaign_id,
                        round: 1,
                    },
                )
                .in_campaign(campaign_id)
                .in_combat(combat_id),
            )
            .await?;

        self.store
            .combat(combat_id)
            .await?
            .ok_or_else(|| CombatError::not_found("Combat", combat_id))
    }
}

/// Re-roll initiative for everyone in the campaign roster.
pub struct RollInitiative {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
    random: Arc<dyn RandomPort>,
    rulesets: Arc<RulesetRegistry>,
}

impl RollInitiative {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        store: Arc<ProjectionStore>,
        random: Arc<dyn RandomPort>,
        rulesets: Arc<RulesetRegistry>,
    ) -> Self {
        Self {
            dispatcher,
            store,
            random,
            rulesets,
        }
    }

    /// Clears the roster, rolls `1d20 + DEX modifier` per eligible
    /// character, and returns the fresh combatants sorted by initiative
    /// descending; ties keep roll order.
    pub async fn execute(&self, combat_id: CombatId) -> Result<Vec<Combatant>, CombatError> {
        let combat = self
            .store
            .combat(combat_id)
            .await?
            .ok_or_else(|| CombatError::not_found("Combat", combat_id))?;
        if !combat.is_active {
            return Err(CombatError::NotActive);
        }

        let world = self
            .store
            .world(combat.world_id)
            .await?
            .ok_or_else(|| CombatError::not_found("World", combat.world_id))?;
        let ruleset = self.rulesets.resolve(world.ruleset_id.as_deref());

        let characters = self.store.characters_in_campaign(combat.campaign_id).await?;

        // Live-path clear; the roll_order 0 projection repeats it so replay
        // converges on the same roster.
        self.store.clear_combatants(combat_id).await?;

        let mut combatants = Vec::with_capacity(characters.len());
        for (roll_order, character) in characters.iter().enumerate() {
            let d20 = self.random.gen_range(1, 20);
            let modifier = ruleset.ability_modifier(character.stats.get("DEX"));
            let combatant = Combatant::from_character(
                CombatantId::new(),
                combat_id,
                character,
                d20 + modifier,
                roll_order as u32,
            );

            self.dispatcher
                .dispatch(
                    EventDraft::new(
                        combat.world_id,
                        EventPayload::Initiative(InitiativeRecord {
                            combat_id,
                            combatant: combatant.clone(),
                            d20,
                            modifier,
                        }),
                    )
                    .in_campaign(combat.campaign_id)
                    .in_combat(combat_id)
                    .by_actor(character.id.to_uuid()),
                )
                .await?;

            combatants.push(combatant);
        }

        sort_by_initiative(&mut combatants);
        Ok(combatants)
    }
}

/// Advance the turn pointer, wrapping into a new round.
pub struct NextTurn {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
}

impl NextTurn {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<ProjectionStore>) -> Self {
        Self { dispatcher, store }
    }

    pub async fn execute(&self, combat_id: CombatId) -> Result<TurnState, CombatError> {
        let combat = self
            .store
            .combat(combat_id)
            .await?
            .ok_or_else(|| CombatError::not_found("Combat", combat_id))?;

        let combatants = self.store.combatants(combat_id).await?;

        let advance = combat
            .advance_turn(combatants.len() as u32)
            .map_err(|e| match e {
                DomainError::Constraint(_) => CombatError::NoCombatants,
                _ => CombatError::NotActive,
            })?;

        let active = combatants
            .get(advance.turn_index as usize)
            .cloned()
            .ok_or(CombatError::NoCombatants)?;

        self.dispatcher
            .dispatch(
                EventDraft::new(
                    combat.world_id,
                    EventPayload::Turn {
                        combat_id,
                        round: advance.round,
                        turn_index: advance.turn_index,
                        active_combatant_id: active.id,
                        active_name: active.name.clone(),
                    },
                )
                .in_campaign(combat.campaign_id)
                .in_combat(combat_id),
            )
            .await?;

        let combat = self
            .store
            .combat(combat_id)
            .await?
            .ok_or_else(|| CombatError::not_found("Combat", combat_id))?;

        tracing::debug!(
            combat_id = %combat_id,
            round = combat.round,
            turn_index = combat.turn_index,
            active = %active.name,
            "turn advanced"
        );

        Ok(TurnState { combat, active })
    }
}

/// End the campaign's active encounter.
pub struct EndCombat {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
}

impl EndCombat {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<ProjectionStore>) -> Self {
        Self { dispatcher, store }
    }

    /// Idempotent: no active combat means nothing to do.
    pub async fn execute(&self, campaign_id: CampaignId) -> Result<Option<Combat>, CombatError> {
        let Some(combat) = self.store.active_combat_in_campaign(campaign_id).await? else {
            return Ok(None);
        };

        self.dispatcher
            .dispatch(
                EventDraft::new(
                    combat.world_id,
                    EventPayload::CombatEnded {
                        combat_id: combat.id,
                        rounds: combat.round,
                    },
                )
                .in_campaign(campaign_id)
                .in_combat(combat.id),
            )
            .await?;

        Ok(self.store.combat(combat.id).await?)
    }
}
