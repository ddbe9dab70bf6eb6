//! Action resolution use cases - attacks, spells, skill checks, conditions.
//!
//! The flow for damaging actions: load the combatants, fold active
//! conditions into a context, compute through the world's ruleset, apply
//! the clamped HP/MP change directly to the combatant row, then dispatch
//! the narrative resolution event with before/after pools. The direct
//! write is a live-game fast path outside the dispatch transaction;
//! concurrent actions against one combatant can race on it, which is the
//! documented trade-off of keeping numeric combat state out of the ledger.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use tomekeeper_domain::{
    AppliedCondition, AttackRecord, AttackResult, AttackSpec, CampaignId, CharacterId, CheckResult,
    Combat, CombatId, Combatant, CombatantId, ConditionContext, ConditionId, ConditionKind,
    DamageResult, DiceParseError, Event, EventDraft, EventPayload, RulesetRegistry, SkillRecord,
    SkillSpec, SpellRecord, SpellResult, SpellSpec, StatBlock, WorldId,
};

use crate::dispatcher::{DispatchError, Dispatcher};
use crate::infrastructure::persistence::ProjectionStore;
use crate::infrastructure::ports::{RandomPort, RepoError};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("combat is not active")]
    NotActive,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error(transparent)]
    Dice(#[from] DiceParseError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ActionError {
    fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Container for action use cases.
pub struct ActionUseCases {
    pub attack: Arc<ResolveAttack>,
    pub spell: Arc<ResolveSpell>,
    pub skill: Arc<ResolveSkillCheck>,
    pub apply_condition: Arc<ApplyCondition>,
    pub remove_condition: Arc<RemoveCondition>,
}

/// Shared plumbing for the resolution use cases.
struct ResolutionDeps {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
    random: Arc<dyn RandomPort>,
    rulesets: Arc<RulesetRegistry>,
}

impl ResolutionDeps {
    async fn active_combat(&self, combat_id: CombatId) -> Result<Combat, ActionError> {
        let combat = self
            .store
            .combat(combat_id)
            .await?
            .ok_or_else(|| ActionError::not_found("Combat", combat_id))?;
        if !combat.is_active {
            return Err(ActionError::NotActive);
        }
        Ok(combat)
    }

    async fn combatant_in(
        &self,
        combat_id: CombatId,
        id: CombatantId,
    ) -> Result<Combatant, ActionError> {
        let combatant = self
            .store
            .combatant(id)
            .await?
            .ok_or_else(|| ActionError::not_found("Combatant", id))?;
        if combatant.combat_id != combat_id {
            return Err(ActionError::not_found("Combatant", id));
        }
        Ok(combatant)
    }

    /// The combatant's sheet, or an empty fallback for ad-hoc monsters.
    async fn sheet_for(&self, combatant: &Combatant) -> Result<StatBlock, ActionError> {
        match combatant.ref_id {
            Some(character_id) => Ok(self
                .store
                .character(character_id)
                .await?
                .map(|c| c.stats)
                .unwrap_or_default()),
            None => Ok(StatBlock::new()),
        }
    }

    async fn conditions_on(&self, target: Uuid) -> Result<Vec<ConditionKind>, ActionError> {
        Ok(self
            .store
            .conditions_on(target)
            .await?
            .into_iter()
            .map(|c| c.condition)
            .collect())
    }

    async fn ruleset_for(
        &self,
        world_id: WorldId,
    ) -> Result<Arc<dyn tomekeeper_domain::Ruleset>, ActionError> {
        let world = self
            .store
            .world(world_id)
            .await?
            .ok_or_else(|| ActionError::not_found("World", world_id))?;
        Ok(self.rulesets.resolve(world.ruleset_id.as_deref()))
    }
}

#[derive(Debug, Clone)]
pub struct AttackCommand {
    pub combat_id: CombatId,
    pub attacker_id: CombatantId,
    pub target_id: CombatantId,
    pub attack: AttackSpec,
    /// Known target defense; a total at or above it hits. With no defense
    /// the attack lands unless it is a natural 1.
    pub target_defense: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct AttackReport {
    pub result: AttackResult,
    pub hit: bool,
    pub is_crit: bool,
    pub damage: Option<DamageResult>,
    pub target_hp_before: i32,
    pub target_hp_after: i32,
    pub event: Event,
}

pub struct ResolveAttack {
    deps: ResolutionDeps,
}

impl ResolveAttack {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        store: Arc<ProjectionStore>,
        random: Arc<dyn RandomPort>,
        rulesets: Arc<RulesetRegistry>,
    ) -> Self {
        Self {
            deps: ResolutionDeps {
                dispatcher,
                store,
                random,
                rulesets,
            },
        }
    }

    pub async fn execute(&self, cmd: AttackCommand) -> Result<AttackReport, ActionError> {
        let combat = self.deps.active_combat(cmd.combat_id).await?;
        let attacker = self.deps.combatant_in(cmd.combat_id, cmd.attacker_id).await?;
        let target = self.deps.combatant_in(cmd.combat_id, cmd.target_id).await?;

        let sheet = self.deps.sheet_for(&attacker).await?;
        let ctx = ConditionContext::new(
            self.deps.conditions_on(attacker.id.to_uuid()).await?,
            self.deps.conditions_on(target.id.to_uuid()).await?,
        );
        let ruleset = self.deps.ruleset_for(combat.world_id).await?;

        let random = Arc::clone(&self.deps.random);
        let mut roller = move |size: u8| random.gen_range(1, size as i32);

        let result = ruleset.compute_attack(&sheet, &cmd.attack, &ctx, &mut roller);

        let hit = !result.is_nat1
            && cmd
                .target_defense
                .map_or(true, |defense| result.total >= defense || result.is_nat20);
        let is_crit = hit && result.is_crit_threat;

        let damage = if hit {
            Some(ruleset.compute_damage(&sheet, &cmd.attack, is_crit, &ctx, &mut roller)?)
        } else {
            None
        };

        let hp_before = target.hp_current;
        let hp_after = match &damage {
            Some(damage) => target.hp_after_damage(damage.total),
            None => hp_before,
        };
        if hp_after != hp_before {
            self.deps.store.set_combatant_hp(target.id, hp_after).await?;
        }

        let event = self
            .deps
            .dispatcher
            .dispatch(
                EventDraft::new(
                    combat.world_id,
                    EventPayload::AttackResolved(AttackRecord {
                        combat_id: cmd.combat_id,
                        attacker_id: attacker.id,
                        target_id: target.id,
                        attack_name: cmd.attack.name.clone(),
                        d20: result.d20,
                        modifier: result.modifier,
                        total: result.total,
                        is_nat20: result.is_nat20,
                        is_nat1: result.is_nat1,
                        is_crit_threat: result.is_crit_threat,
                        is_crit,
                        hit,
                        damage: damage.as_ref().map(|d| d.total),
                        damage_detail: damage.as_ref().map(|d| d.detail.clone()),
                        target_hp_before: hp_before,
                        target_hp_after: hp_after,
                    }),
                )
                .in_campaign(combat.campaign_id)
                .in_combat(cmd.combat_id)
                .by_actor(attacker.id.to_uuid())
                .against(target.id.to_uuid()),
            )
            .await?;

        Ok(AttackReport {
            result,
            hit,
            is_crit,
            damage,
            target_hp_before: hp_before,
            target_hp_after: hp_after,
            event,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SpellCommand {
    pub combat_id: CombatId,
    pub caster_id: CombatantId,
    pub target_id: Option<CombatantId>,
    pub spell: SpellSpec,
}

#[derive(Debug, Clone)]
pub struct SpellReport {
    pub result: SpellResult,
    pub caster_mp_before: i32,
    pub caster_mp_after: i32,
    pub target_hp_before: Option<i32>,
    pub target_hp_after: Option<i32>,
    pub conditions_applied: Vec<AppliedCondition>,
    pub event: Event,
}

pub struct ResolveSpell {
    deps: ResolutionDeps,
}

impl ResolveSpell {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        store: Arc<ProjectionStore>,
        random: Arc<dyn RandomPort>,
        rulesets: Arc<RulesetRegistry>,
    ) -> Self {
        Self {
            deps: ResolutionDeps {
                dispatcher,
                store,
                random,
                rulesets,
            },
        }
    }

    pub async fn execute(&self, cmd: SpellCommand) -> Result<SpellReport, ActionError> {
        let combat = self.deps.active_combat(cmd.combat_id).await?;
        let caster = self.deps.combatant_in(cmd.combat_id, cmd.caster_id).await?;
        let target = match cmd.target_id {
            Some(id) => Some(self.deps.combatant_in(cmd.combat_id, id).await?),
            None => None,
        };

        let sheet = self.deps.sheet_for(&caster).await?;
        let target_conditions = match &target {
            Some(target) => self.deps.conditions_on(target.id.to_uuid()).await?,
            None => Vec::new(),
        };
        let ctx = ConditionContext::new(
            self.deps.conditions_on(caster.id.to_uuid()).await?,
            target_conditions,
        );
        let ruleset = self.deps.ruleset_for(combat.world_id).await?;

        let random = Arc::clone(&self.deps.random);
        let mut roller = move |size: u8| random.gen_range(1, size as i32);

        let result = ruleset.compute_spell(&sheet, &cmd.spell, &ctx, &mut roller)?;

        if !caster.can_pay_mp(result.mp_cost) {
            return Err(ActionError::Constraint(format!(
                "insufficient MP: {} needed, {} available",
                result.mp_cost, caster.mp_current
            )));
        }

        let mp_before = caster.mp_current;
        let mp_after = caster.mp_after_cost(result.mp_cost);
        if mp_after != mp_before {
            self.deps.store.set_combatant_mp(caster.id, mp_after).await?;
        }

        let (hp_before, hp_after) = match (&target, &result.damage) {
            (Some(target), Some(damage)) => {
                let before = target.hp_current;
                let after = target.hp_after_damage(damage.total);
                if after != before {
                    self.deps.store.set_combatant_hp(target.id, after).await?;
                }
                (Some(before), Some(after))
            }
            (Some(target), None) => (Some(target.hp_current), Some(target.hp_current)),
            (None, _) => (None, None),
        };

        let applied_kinds: Vec<ConditionKind> = match &target {
            Some(_) => result.applies.clone(),
            None => Vec::new(),
        };

        let mut draft = EventDraft::new(
            combat.world_id,
            EventPayload::SpellResolved(SpellRecord {
                combat_id: cmd.combat_id,
                caster_id: caster.id,
                target_id: target.as_ref().map(|t| t.id),
                spell_name: cmd.spell.name.clone(),
                d20: result.d20,
                modifier: result.modifier,
                total: result.total,
                mp_cost: result.mp_cost,
                caster_mp_before: mp_before,
                caster_mp_after: mp_after,
                damage: result.damage.as_ref().map(|d| d.total),
                damage_detail: result.damage.as_ref().map(|d| d.detail.clone()),
                target_hp_before: hp_before,
                target_hp_after: hp_after,
                conditions_applied: applied_kinds.clone(),
            }),
        )
        .in_campaign(combat.campaign_id)
        .in_combat(cmd.combat_id)
        .by_actor(caster.id.to_uuid());
        if let Some(target) = &target {
            draft = draft.against(target.id.to_uuid());
        }
        let event = self.deps.dispatcher.dispatch(draft).await?;

        // Each applied status is its own auditable event; the projector
        // materializes the condition row.
        let mut conditions_applied = Vec::with_capacity(applied_kinds.len());
        if let Some(target) = &target {
            for kind in &applied_kinds {
                let condition_id = ConditionId::new();
                self.deps
                    .dispatcher
                    .dispatch(
                        EventDraft::new(
                            combat.world_id,
                            EventPayload::ConditionApplied {
                                condition_id,
                                target_id: target.id.to_uuid(),
                                condition: *kind,
                                source: Some(cmd.spell.name.clone()),
                            },
                        )
                        .in_campaign(combat.campaign_id)
                        .in_combat(cmd.combat_id)
                        .by_actor(caster.id.to_uuid())
                        .against(target.id.to_uuid()),
                    )
                    .await?;
                if let Some(row) = self.deps.store.condition(condition_id).await? {
                    conditions_applied.push(row);
                }
            }
        }

        Ok(SpellReport {
            result,
            caster_mp_before: mp_before,
            caster_mp_after: mp_after,
            target_hp_before: hp_before,
            target_hp_after: hp_after,
            conditions_applied,
            event,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SkillCommand {
    pub world_id: WorldId,
    pub campaign_id: Option<CampaignId>,
    pub character_id: CharacterId,
    pub skill: SkillSpec,
}

#[derive(Debug, Clone)]
pub struct SkillReport {
    pub result: CheckResult,
    pub event: Event,
}

pub struct ResolveSkillCheck {
    deps: ResolutionDeps,
}

impl ResolveSkillCheck {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        store: Arc<ProjectionStore>,
        random: Arc<dyn RandomPort>,
        rulesets: Arc<RulesetRegistry>,
    ) -> Self {
        Self {
            deps: ResolutionDeps {
                dispatcher,
                store,
                random,
                rulesets,
            },
        }
    }

    /// Skill checks mutate nothing; they only roll and record.
    pub async fn execute(&self, cmd: SkillCommand) -> Result<SkillReport, ActionError> {
        let character = self
            .deps
            .store
            .character(cmd.character_id)
            .await?
            .ok_or_else(|| ActionError::not_found("Character", cmd.character_id))?;

        let ctx = ConditionContext::actor_only(
            self.deps.conditions_on(character.id.to_uuid()).await?,
        );
        let ruleset = self.deps.ruleset_for(cmd.world_id).await?;

        let random = Arc::clone(&self.deps.random);
        let mut roller = move |size: u8| random.gen_range(1, size as i32);

        let result = ruleset.compute_skill_check(&character.stats, &cmd.skill, &ctx, &mut roller);

        let mut draft = EventDraft::new(
            cmd.world_id,
            EventPayload::SkillResolved(SkillRecord {
                character_id: character.id,
                skill: cmd.skill.skill.clone(),
                d20: result.d20,
                modifier: result.modifier,
                total: result.total,
                dc: result.dc,
                success: result.success,
            }),
        )
        .by_actor(character.id.to_uuid());
        if let Some(campaign_id) = cmd.campaign_id {
            draft = draft.in_campaign(campaign_id);
        }
        let event = self.deps.dispatcher.dispatch(draft).await?;

        Ok(SkillReport { result, event })
    }
}

pub struct ApplyCondition {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
}

impl ApplyCondition {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<ProjectionStore>) -> Self {
        Self { dispatcher, store }
    }

    pub async fn execute(
        &self,
        world_id: WorldId,
        target_id: Uuid,
        condition: ConditionKind,
        source: Option<String>,
    ) -> Result<AppliedCondition, ActionError> {
        let condition_id = ConditionId::new();
        self.dispatcher
            .dispatch(
                EventDraft::new(
                    world_id,
                    EventPayload::ConditionApplied {
                        condition_id,
                        target_id,
                        condition,
                        source,
                    },
                )
                .against(target_id),
            )
            .await?;

        self.store
            .condition(condition_id)
            .await?
            .ok_or_else(|| ActionError::not_found("Condition", condition_id))
    }
}

pub struct RemoveCondition {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
}

impl RemoveCondition {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<ProjectionStore>) -> Self {
        Self { dispatcher, store }
    }

    pub async fn execute(&self, condition_id: ConditionId) -> Result<(), ActionError> {
        let row = self
            .store
            .condition(condition_id)
            .await?
            .ok_or_else(|| ActionError::not_found("Condition", condition_id))?;

        self.dispatcher
            .dispatch(
                EventDraft::new(
                    row.world_id,
                    EventPayload::ConditionRemoved {
                        condition_id,
                        target_id: row.target_id,
                        condition: row.condition,
                    },
                )
                .against(row.target_id),
            )
            .await?;

        Ok(())
    }
}
