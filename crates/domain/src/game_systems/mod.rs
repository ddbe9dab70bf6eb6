//! Game system (ruleset) implementations and registry.
//!
//! A ruleset implements the `Ruleset` trait from `traits.rs`; the registry
//! maps string ids to implementations and falls back to the default system
//! for unknown ids, so worlds never lose the ability to resolve actions.

mod actions;
mod conditions;
mod d20;
mod traits;

pub use actions::{
    Action, AttackSpec, SkillSpec, SpellSpec, DEFAULT_CRIT_MULTIPLIER, DEFAULT_CRIT_RANGE,
};
pub use conditions::{
    resolve_condition_modifiers, ConditionContext, ConditionKind, ConditionModifiers,
};
pub use d20::StandardD20;
pub use traits::{
    AbilityDef, ActionOutcome, AttackResult, CheckResult, DamageResult, DieRoller, ResourceDef,
    Ruleset, SpellResult,
};

use std::sync::Arc;

/// Registry of available rulesets.
///
/// Built once at startup and shared; no global mutable state.
pub struct RulesetRegistry {
    systems: Vec<Arc<dyn Ruleset>>,
    default_id: String,
}

impl Default for RulesetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesetRegistry {
    /// Create a registry with the built-in systems, defaulting to d20.
    pub fn new() -> Self {
        let mut registry = Self {
            systems: Vec::new(),
            default_id: "d20".to_string(),
        };
        registry.register(Arc::new(StandardD20::new()));
        registry
    }

    /// Register a ruleset. Re-registering an id replaces the previous entry.
    pub fn register(&mut self, system: Arc<dyn Ruleset>) {
        self.systems
            .retain(|s| s.ruleset_id() != system.ruleset_id());
        self.systems.push(system);
    }

    /// Look up a ruleset by id; unknown ids resolve to the default.
    pub fn get(&self, id: &str) -> Arc<dyn Ruleset> {
        self.systems
            .iter()
            .find(|s| s.ruleset_id() == id)
            .cloned()
            .unwrap_or_else(|| self.default())
    }

    /// Resolve an optional id (a world with no ruleset plays the default).
    pub fn resolve(&self, id: Option<&str>) -> Arc<dyn Ruleset> {
        match id {
            Some(id) => self.get(id),
            None => self.default(),
        }
    }

    /// The default ruleset.
    pub fn default_system(&self) -> Arc<dyn Ruleset> {
        self.default()
    }

    fn default(&self) -> Arc<dyn Ruleset> {
        self.systems
            .iter()
            .find(|s| s.ruleset_id() == self.default_id)
            .cloned()
            .unwrap_or_else(|| Arc::new(StandardD20::new()))
    }

    /// Ids of all registered systems.
    pub fn ids(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.ruleset_id()).collect()
    }
}
