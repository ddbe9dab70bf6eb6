//! Action definitions - what a combatant is attempting
//!
//! Each variant carries only the fields its resolution needs; the engine
//! matches exhaustively instead of probing optional fields.

use serde::{Deserialize, Serialize};

use super::ConditionKind;

/// Default d20 value at or above which an attack threatens a critical.
pub const DEFAULT_CRIT_RANGE: u8 = 20;
/// Default damage multiplier on a confirmed critical.
pub const DEFAULT_CRIT_MULTIPLIER: u8 = 2;

/// A weapon or natural attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackSpec {
    pub name: String,
    /// Ability key the attack rolls with ("STR", "DEX", ...).
    pub ability: String,
    /// Flat attack bonus on top of the ability modifier.
    pub bonus: i32,
    /// Damage formula, e.g. "1d8+2".
    pub damage: String,
    /// d20 value at or above which the attack threatens a critical.
    pub crit_range: u8,
    /// Damage multiplier applied on a critical.
    pub crit_multiplier: u8,
}

impl AttackSpec {
    pub fn new(name: impl Into<String>, ability: impl Into<String>, damage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ability: ability.into(),
            bonus: 0,
            damage: damage.into(),
            crit_range: DEFAULT_CRIT_RANGE,
            crit_multiplier: DEFAULT_CRIT_MULTIPLIER,
        }
    }

    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn with_crit(mut self, crit_range: u8, crit_multiplier: u8) -> Self {
        self.crit_range = crit_range;
        self.crit_multiplier = crit_multiplier;
        self
    }
}

/// A spell being cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellSpec {
    pub name: String,
    /// Ability key the spell rolls with, if it rolls at all.
    pub ability: String,
    pub bonus: i32,
    /// Base MP cost before condition adjustments.
    pub mp_cost: i32,
    /// Damage formula, for damaging spells.
    pub damage: Option<String>,
    /// Whether the spell makes a d20 roll (attack-like spells do,
    /// automatic effects don't).
    pub rolls: bool,
    /// Status effects the spell applies to its target on success.
    pub applies: Vec<ConditionKind>,
}

impl SpellSpec {
    pub fn new(name: impl Into<String>, ability: impl Into<String>, mp_cost: i32) -> Self {
        Self {
            name: name.into(),
            ability: ability.into(),
            bonus: 0,
            mp_cost,
            damage: None,
            rolls: true,
            applies: Vec::new(),
        }
    }

    pub fn with_damage(mut self, formula: impl Into<String>) -> Self {
        self.damage = Some(formula.into());
        self
    }

    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn without_roll(mut self) -> Self {
        self.rolls = false;
        self
    }

    pub fn applying(mut self, condition: ConditionKind) -> Self {
        self.applies.push(condition);
        self
    }
}

/// A skill check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSpec {
    /// Skill name ("Stealth", "Acrobatics").
    pub skill: String,
    /// Ability key the skill rolls with.
    pub ability: String,
    /// Trained bonus on top of the ability modifier.
    pub bonus: i32,
    /// Difficulty class, when known; success is reported against it.
    pub dc: Option<i32>,
}

impl SkillSpec {
    pub fn new(skill: impl Into<String>, ability: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            ability: ability.into(),
            bonus: 0,
            dc: None,
        }
    }

    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn against_dc(mut self, dc: i32) -> Self {
        self.dc = Some(dc);
        self
    }
}

/// The sum of everything a combatant can attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Attack(AttackSpec),
    Spell(SpellSpec),
    Skill(SkillSpec),
}
