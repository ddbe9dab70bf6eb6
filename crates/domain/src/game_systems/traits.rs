//! Ruleset traits - the pluggable game-system interface
//!
//! A ruleset owns the math of action resolution: ability modifiers, attack
//! and damage computation, skill checks, spells, and how active conditions
//! fold into a roll. The engine is parameterized over this trait instead of
//! hard-coding one game's rules.

use crate::value_objects::{DiceParseError, StatBlock};

use super::actions::{Action, AttackSpec, SkillSpec, SpellSpec};
use super::conditions::{ConditionContext, ConditionKind, ConditionModifiers};

/// A die roller: receives a die size, returns a value in `1..=size`.
///
/// Rulesets are pure apart from this injected seam; the engine backs it
/// with its `RandomPort`, tests pin it.
pub type DieRoller<'a> = &'a mut dyn FnMut(u8) -> i32;

/// An ability a ruleset tracks ("STR", "DEX", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityDef {
    pub key: &'static str,
    pub label: &'static str,
    pub order: u8,
}

/// A depletable resource pool a ruleset tracks ("HP", "MP").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDef {
    pub key: &'static str,
    pub label: &'static str,
    pub order: u8,
}

/// Result of an attack roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackResult {
    /// The raw d20.
    pub d20: i32,
    /// Everything added to the d20: ability + attack bonus + condition deltas.
    pub modifier: i32,
    pub total: i32,
    pub is_nat20: bool,
    pub is_nat1: bool,
    /// d20 at or above the attack's crit range.
    pub is_crit_threat: bool,
}

/// Result of a damage roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageResult {
    /// Final damage, after condition deltas and crit multiplication; never negative.
    pub total: i32,
    /// Human-readable breakdown ("1d6(4) + 2 = 6 x2 (crit) = 12").
    pub detail: String,
}

/// Result of a skill check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub d20: i32,
    pub modifier: i32,
    pub total: i32,
    pub dc: Option<i32>,
    /// Only reported when a DC was given.
    pub success: Option<bool>,
    pub is_nat20: bool,
    pub is_nat1: bool,
}

/// Outcome of resolving an `Action`, one variant per action kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Attack(AttackResult),
    Spell(SpellResult),
    Skill(CheckResult),
}

/// Result of casting a spell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellResult {
    /// Present for rolling spells, absent for automatic effects.
    pub d20: Option<i32>,
    pub modifier: i32,
    pub total: Option<i32>,
    /// MP cost after condition adjustments, never below 0.
    pub mp_cost: i32,
    pub damage: Option<DamageResult>,
    /// Status effects the spell applies.
    pub applies: Vec<ConditionKind>,
}

/// Game-system-specific resolution logic.
pub trait Ruleset: Send + Sync {
    /// Unique identifier ("d20").
    fn ruleset_id(&self) -> &str;

    /// Human-readable display name.
    fn display_name(&self) -> &str;

    /// Abilities this system tracks, in display order.
    fn abilities(&self) -> &[AbilityDef];

    /// Resource pools this system tracks, in display order.
    fn resources(&self) -> &[ResourceDef];

    /// Modifier derived from an ability score.
    fn ability_modifier(&self, score: i32) -> i32;

    /// Roll an attack: d20 + ability modifier + attack bonus + condition deltas.
    fn compute_attack(
        &self,
        sheet: &StatBlock,
        attack: &AttackSpec,
        ctx: &ConditionContext,
        roll: DieRoller,
    ) -> AttackResult;

    /// Roll damage for an attack that hit.
    fn compute_damage(
        &self,
        sheet: &StatBlock,
        attack: &AttackSpec,
        is_crit: bool,
        ctx: &ConditionContext,
        roll: DieRoller,
    ) -> Result<DamageResult, DiceParseError>;

    /// Roll a skill check, reporting success when a DC is known.
    fn compute_skill_check(
        &self,
        sheet: &StatBlock,
        skill: &SkillSpec,
        ctx: &ConditionContext,
        roll: DieRoller,
    ) -> CheckResult;

    /// Resolve a spell: optional roll, adjusted MP cost, optional damage,
    /// applied status effects.
    fn compute_spell(
        &self,
        sheet: &StatBlock,
        spell: &SpellSpec,
        ctx: &ConditionContext,
        roll: DieRoller,
    ) -> Result<SpellResult, DiceParseError>;

    /// Fold active conditions into one delta set.
    fn apply_conditions_modifiers(&self, ctx: &ConditionContext) -> ConditionModifiers;

    /// Resolve any action through exhaustive matching on its kind.
    fn resolve_action(
        &self,
        sheet: &StatBlock,
        action: &Action,
        ctx: &ConditionContext,
        roll: DieRoller,
    ) -> Result<ActionOutcome, DiceParseError> {
        match action {
            Action::Attack(spec) => Ok(ActionOutcome::Attack(
                self.compute_attack(sheet, spec, ctx, roll),
            )),
            Action::Spell(spec) => Ok(ActionOutcome::Spell(
                self.compute_spell(sheet, spec, ctx, roll)?,
            )),
            Action::Skill(spec) => Ok(ActionOutcome::Skill(
                self.compute_skill_check(sheet, spec, ctx, roll),
            )),
        }
    }
}
