//! Use cases - the operations callers invoke.
//!
//! Auditable state changes go through the dispatcher; pure computation goes
//! through the world's ruleset and gets recorded as an event payload.

pub mod actions;
pub mod combat;
pub mod management;

pub use actions::{
    ActionError, ActionUseCases, ApplyCondition, AttackCommand, AttackReport, RemoveCondition,
    ResolveAttack, ResolveSkillCheck, ResolveSpell, SkillCommand, SkillReport, SpellCommand,
    SpellReport,
};
pub use combat::{
    CombatError, CombatUseCases, EndCombat, NextTurn, RollInitiative, StartCombat, TurnState,
};
pub use management::{
    CreateCampaign, CreateCampaignInput, CreateCharacter, CreateCharacterInput, CreateWorld,
    CreateWorldInput, ManagementError, ManagementUseCases,
};
