//! Combat and Combatant entities - the live encounter state
//!
//! Both are projections: Combat of `COMBAT_STARTED`/`TURN`/`COMBAT_ENDED`,
//! Combatant of `INITIATIVE`. HP/MP on a combatant is additionally mutated
//! directly by the action handlers (the live-game fast path).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::{CampaignId, CharacterId, CombatId, CombatantId, WorldId};

use super::CharacterKind;

/// An active or finished encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combat {
    pub id: CombatId,
    pub world_id: WorldId,
    pub campaign_id: CampaignId,
    /// 1-based round counter.
    pub round: u32,
    /// 0-based index into the initiative order; wraps modulo combatant count.
    pub turn_index: u32,
    pub is_active: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Result of advancing a combat by one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAdvance {
    pub round: u32,
    pub turn_index: u32,
    /// True when the turn pointer wrapped and a new round began.
    pub wrapped: bool,
}

impl Combat {
    pub fn new(
        id: CombatId,
        world_id: WorldId,
        campaign_id: CampaignId,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            world_id,
            campaign_id,
            round: 1,
            turn_index: 0,
            is_active: true,
            started_at,
            ended_at: None,
        }
    }

    /// Compute the next turn position for the given combatant count.
    ///
    /// Does not mutate; the projection applies the result when the TURN
    /// event lands.
    pub fn advance_turn(&self, combatant_count: u32) -> Result<TurnAdvance, DomainError> {
        if !self.is_active {
            return Err(DomainError::invalid_state_transition(
                "cannot advance turn: combat is not active",
            ));
        }
        if combatant_count == 0 {
            return Err(DomainError::constraint(
                "cannot advance turn: combat has no combatants",
            ));
        }
        let next = self.turn_index + 1;
        if next >= combatant_count {
            Ok(TurnAdvance {
                round: self.round + 1,
                turn_index: 0,
                wrapped: true,
            })
        } else {
            Ok(TurnAdvance {
                round: self.round,
                turn_index: next,
                wrapped: false,
            })
        }
    }
}

/// What a combatant represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatantKind {
    Character,
    Npc,
    Monster,
}

impl CombatantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Npc => "npc",
            Self::Monster => "monster",
        }
    }
}

impl fmt::Display for CombatantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CombatantKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "character" => Ok(Self::Character),
            "npc" => Ok(Self::Npc),
            "monster" => Ok(Self::Monster),
            other => Err(DomainError::parse(format!(
                "Unknown combatant kind: {}",
                other
            ))),
        }
    }
}

impl From<CharacterKind> for CombatantKind {
    fn from(kind: CharacterKind) -> Self {
        match kind {
            CharacterKind::Player => Self::Character,
            CharacterKind::Npc => Self::Npc,
            CharacterKind::Monster => Self::Monster,
        }
    }
}

/// A participant row in an encounter, independent of its source character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: CombatantId,
    pub combat_id: CombatId,
    pub name: String,
    pub kind: CombatantKind,
    /// Non-owning back-reference to the source character sheet, if any.
    pub ref_id: Option<CharacterId>,
    pub initiative: i32,
    /// Position within the initiative roll sequence; the stable tie-break
    /// for equal initiative totals.
    pub roll_order: u32,
    pub hp_current: i32,
    pub hp_max: i32,
    pub mp_current: i32,
    pub mp_max: i32,
}

impl Combatant {
    /// Spin a combatant up from a character sheet.
    pub fn from_character(
        id: CombatantId,
        combat_id: CombatId,
        character: &super::Character,
        initiative: i32,
        roll_order: u32,
    ) -> Self {
        Self {
            id,
            combat_id,
            name: character.name.clone(),
            kind: character.kind.into(),
            ref_id: Some(character.id),
            initiative,
            roll_order,
            hp_current: character.hp_current,
            hp_max: character.hp_max,
            mp_current: character.mp_current,
            mp_max: character.mp_max,
        }
    }

    /// HP after taking damage, clamped to `[0, hp_max]`.
    pub fn hp_after_damage(&self, damage: i32) -> i32 {
        (self.hp_current - damage).clamp(0, self.hp_max)
    }

    /// MP after paying a cost, clamped to `[0, mp_max]`.
    pub fn mp_after_cost(&self, cost: i32) -> i32 {
        (self.mp_current - cost).clamp(0, self.mp_max)
    }

    /// Whether the combatant can pay an MP cost.
    pub fn can_pay_mp(&self, cost: i32) -> bool {
        self.mp_current >= cost
    }
}

/// Sort combatants into turn order: initiative descending, ties broken by
/// roll order (the order initiative was rolled in).
pub fn sort_by_initiative(combatants: &mut [Combatant]) {
    combatants.sort_by(|a, b| {
        b.initiative
            .cmp(&a.initiative)
            .then(a.roll_order.cmp(&b.roll_order))
    });
}
