//! Condition catalog and modifier resolution
//!
//! Given the status effects active on an actor and its target, derive the
//! numeric deltas folded into a roll before it is finalized. The resolver
//! never mutates roll inputs; it only returns deltas the caller adds in.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Closed set of status effects the default catalog knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionKind {
    Blinded,
    Prone,
    Stunned,
    Poisoned,
    Frightened,
    Weakened,
    Exhausted,
    Inspired,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blinded => "blinded",
            Self::Prone => "prone",
            Self::Stunned => "stunned",
            Self::Poisoned => "poisoned",
            Self::Frightened => "frightened",
            Self::Weakened => "weakened",
            Self::Exhausted => "exhausted",
            Self::Inspired => "inspired",
        }
    }

    /// Deltas applied to the bearer's own actions.
    pub fn self_modifiers(&self) -> ConditionModifiers {
        match self {
            Self::Blinded => ConditionModifiers {
                attack: -2,
                skill: -2,
                ..Default::default()
            },
            Self::Prone => ConditionModifiers {
                attack: -2,
                ..Default::default()
            },
            Self::Stunned => ConditionModifiers {
                attack: -2,
                skill: -2,
                spell: -2,
                ..Default::default()
            },
            Self::Poisoned => ConditionModifiers {
                attack: -1,
                skill: -1,
                damage: -1,
                ..Default::default()
            },
            Self::Frightened => ConditionModifiers {
                attack: -2,
                skill: -2,
                ..Default::default()
            },
            Self::Weakened => ConditionModifiers {
                damage: -2,
                ..Default::default()
            },
            Self::Exhausted => ConditionModifiers {
                skill: -2,
                mp_cost: 1,
                ..Default::default()
            },
            Self::Inspired => ConditionModifiers {
                attack: 1,
                skill: 1,
                spell: 1,
                ..Default::default()
            },
        }
    }

    /// Deltas granted to whoever acts against the bearer.
    pub fn granted_modifiers(&self) -> ConditionModifiers {
        match self {
            Self::Blinded | Self::Prone | Self::Stunned => ConditionModifiers {
                attack: 2,
                ..Default::default()
            },
            _ => ConditionModifiers::default(),
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blinded" => Ok(Self::Blinded),
            "prone" => Ok(Self::Prone),
            "stunned" => Ok(Self::Stunned),
            "poisoned" => Ok(Self::Poisoned),
            "frightened" => Ok(Self::Frightened),
            "weakened" => Ok(Self::Weakened),
            "exhausted" => Ok(Self::Exhausted),
            "inspired" => Ok(Self::Inspired),
            other => Err(DomainError::parse(format!("Unknown condition: {}", other))),
        }
    }
}

/// Numeric deltas a set of conditions contributes to a roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionModifiers {
    pub attack: i32,
    pub damage: i32,
    pub skill: i32,
    pub spell: i32,
    pub mp_cost: i32,
}

impl Add for ConditionModifiers {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            attack: self.attack + rhs.attack,
            damage: self.damage + rhs.damage,
            skill: self.skill + rhs.skill,
            spell: self.spell + rhs.spell,
            mp_cost: self.mp_cost + rhs.mp_cost,
        }
    }
}

/// Active conditions on the two sides of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionContext {
    /// Conditions on whoever is acting.
    pub actor: Vec<ConditionKind>,
    /// Conditions on whoever is being acted against.
    pub target: Vec<ConditionKind>,
}

impl ConditionContext {
    pub fn new(actor: Vec<ConditionKind>, target: Vec<ConditionKind>) -> Self {
        Self { actor, target }
    }

    pub fn actor_only(actor: Vec<ConditionKind>) -> Self {
        Self {
            actor,
            target: Vec::new(),
        }
    }
}

/// Fold a condition context into one delta set: the actor's own penalties
/// and bonuses, plus whatever the target's conditions grant the actor.
pub fn resolve_condition_modifiers(ctx: &ConditionContext) -> ConditionModifiers {
    let own = ctx
        .actor
        .iter()
        .map(|c| c.self_modifiers())
        .fold(ConditionModifiers::default(), Add::add);
    let granted = ctx
        .target
        .iter()
        .map(|c| c.granted_modifiers())
        .fold(ConditionModifiers::default(), Add::add);
    own + granted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            ConditionKind::Blinded,
            ConditionKind::Prone,
            ConditionKind::Stunned,
            ConditionKind::Poisoned,
            ConditionKind::Frightened,
            ConditionKind::Weakened,
            ConditionKind::Exhausted,
            ConditionKind::Inspired,
        ] {
            assert_eq!(kind.as_str().parse::<ConditionKind>().unwrap(), kind);
        }
        assert!("dazed".parse::<ConditionKind>().is_err());
    }

    #[test]
    fn blinded_actor_takes_attack_penalty() {
        let ctx = ConditionContext::actor_only(vec![ConditionKind::Blinded]);
        let mods = resolve_condition_modifiers(&ctx);
        assert_eq!(mods.attack, -2);
        assert_eq!(mods.skill, -2);
        assert_eq!(mods.damage, 0);
    }

    #[test]
    fn prone_target_grants_attack_bonus() {
        let ctx = ConditionContext::new(vec![], vec![ConditionKind::Prone]);
        let mods = resolve_condition_modifiers(&ctx);
        assert_eq!(mods.attack, 2);
    }

    #[test]
    fn modifiers_stack_across_conditions() {
        let ctx = ConditionContext::new(
            vec![ConditionKind::Poisoned, ConditionKind::Inspired],
            vec![ConditionKind::Stunned],
        );
        let mods = resolve_condition_modifiers(&ctx);
        // -1 (poisoned) + 1 (inspired) + 2 (stunned target) = 2
        assert_eq!(mods.attack, 2);
        assert_eq!(mods.damage, -1);
    }

    #[test]
    fn exhausted_raises_mp_cost() {
        let ctx = ConditionContext::actor_only(vec![ConditionKind::Exhausted]);
        assert_eq!(resolve_condition_modifiers(&ctx).mp_cost, 1);
    }
}
