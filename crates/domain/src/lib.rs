extern crate self as tomekeeper_domain;

pub mod entities;
pub mod error;
pub mod events;
pub mod game_systems;
pub mod ids;
pub mod value_objects;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    sort_by_initiative, AppliedCondition, Campaign, Character, CharacterKind, Combat, Combatant,
    CombatantKind, TurnAdvance, World,
};

pub use error::DomainError;

// Re-export the event model
pub use events::{
    AttackRecord, Event, EventDraft, EventPayload, EventScope, EventType, EventVisibility,
    InitiativeRecord, SkillRecord, SpellRecord,
};

// Re-export game system traits and types
pub use game_systems::{
    resolve_condition_modifiers, AbilityDef, Action, ActionOutcome, AttackResult, AttackSpec,
    CheckResult, ConditionContext, ConditionKind, ConditionModifiers, DamageResult, DieRoller,
    ResourceDef, Ruleset, RulesetRegistry, SkillSpec, SpellResult, SpellSpec, StandardD20,
    DEFAULT_CRIT_MULTIPLIER, DEFAULT_CRIT_RANGE,
};

// Re-export ID types
pub use ids::{
    CampaignId, CharacterId, CombatId, CombatantId, ConditionId, EventId, SessionId, UserId,
    WorldId,
};

// Re-export value objects
pub use value_objects::{
    DiceFormula, DiceParseError, DiceRollInput, DiceRollResult, DiceTerm, StatBlock,
};
