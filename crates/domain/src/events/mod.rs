//! Ledger events
//!
//! An `Event` is an immutable entry in a world's append-only ledger. The
//! envelope carries identity, ordering, and scoping; the payload is a closed
//! tagged union with one variant per event type, so the dispatcher and
//! projectors pattern-match instead of probing optional fields.
//!
//! `(ts asc, id asc)` defines total order within a world. Events are never
//! updated or deleted; projections are rebuilt from them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{CharacterKind, Combatant};
use crate::error::DomainError;
use crate::game_systems::ConditionKind;
use crate::value_objects::StatBlock;
use crate::{
    CampaignId, CharacterId, CombatId, CombatantId, ConditionId, EventId, SessionId, UserId,
    WorldId,
};

/// Closed enumeration of event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    WorldCreated,
    CampaignCreated,
    CharacterCreated,
    AttackResolved,
    SpellResolved,
    SkillResolved,
    ConditionApplied,
    ConditionRemoved,
    Initiative,
    Turn,
    CombatStarted,
    CombatEnded,
    Note,
    /// Catch-all for event types written by newer builds.
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorldCreated => "WORLD_CREATED",
            Self::CampaignCreated => "CAMPAIGN_CREATED",
            Self::CharacterCreated => "CHARACTER_CREATED",
            Self::AttackResolved => "ATTACK_RESOLVED",
            Self::SpellResolved => "SPELL_RESOLVED",
            Self::SkillResolved => "SKILL_RESOLVED",
            Self::ConditionApplied => "CONDITION_APPLIED",
            Self::ConditionRemoved => "CONDITION_REMOVED",
            Self::Initiative => "INITIATIVE",
            Self::Turn => "TURN",
            Self::CombatStarted => "COMBAT_STARTED",
            Self::CombatEnded => "COMBAT_ENDED",
            Self::Note => "NOTE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Event types whose dispatch requires a non-empty creation payload.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Self::WorldCreated | Self::CampaignCreated | Self::CharacterCreated
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WORLD_CREATED" => Ok(Self::WorldCreated),
            "CAMPAIGN_CREATED" => Ok(Self::CampaignCreated),
            "CHARACTER_CREATED" => Ok(Self::CharacterCreated),
            "ATTACK_RESOLVED" => Ok(Self::AttackResolved),
            "SPELL_RESOLVED" => Ok(Self::SpellResolved),
            "SKILL_RESOLVED" => Ok(Self::SkillResolved),
            "CONDITION_APPLIED" => Ok(Self::ConditionApplied),
            "CONDITION_REMOVED" => Ok(Self::ConditionRemoved),
            "INITIATIVE" => Ok(Self::Initiative),
            "TURN" => Ok(Self::Turn),
            "COMBAT_STARTED" => Ok(Self::CombatStarted),
            "COMBAT_ENDED" => Ok(Self::CombatEnded),
            "NOTE" => Ok(Self::Note),
            "UNKNOWN" => Ok(Self::Unknown),
            other => Err(DomainError::parse(format!("Unknown event type: {}", other))),
        }
    }
}

/// Narrative granularity of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventScope {
    /// Moment-to-moment play (rolls, turns).
    #[default]
    Micro,
    /// Campaign-shaping milestones (world/campaign creation).
    Macro,
}

impl EventScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Micro => "MICRO",
            Self::Macro => "MACRO",
        }
    }
}

impl FromStr for EventScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MICRO" => Ok(Self::Micro),
            "MACRO" => Ok(Self::Macro),
            other => Err(DomainError::parse(format!("Unknown scope: {}", other))),
        }
    }
}

/// Who may see an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventVisibility {
    /// Visible to everyone at the table.
    #[default]
    Players,
    /// Game-master only.
    Master,
}

impl EventVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Players => "PLAYERS",
            Self::Master => "MASTER",
        }
    }
}

impl FromStr for EventVisibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLAYERS" => Ok(Self::Players),
            "MASTER" => Ok(Self::Master),
            other => Err(DomainError::parse(format!("Unknown visibility: {}", other))),
        }
    }
}

/// Record of a resolved attack, embedded in `ATTACK_RESOLVED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackRecord {
    pub combat_id: CombatId,
    pub attacker_id: CombatantId,
    pub target_id: CombatantId,
    pub attack_name: String,
    pub d20: i32,
    pub modifier: i32,
    pub total: i32,
    pub is_nat20: bool,
    pub is_nat1: bool,
    pub is_crit_threat: bool,
    pub is_crit: bool,
    pub hit: bool,
    pub damage: Option<i32>,
    pub damage_detail: Option<String>,
    pub target_hp_before: i32,
    pub target_hp_after: i32,
}

/// Record of a resolved spell, embedded in `SPELL_RESOLVED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellRecord {
    pub combat_id: CombatId,
    pub caster_id: CombatantId,
    pub target_id: Option<CombatantId>,
    pub spell_name: String,
    pub d20: Option<i32>,
    pub modifier: i32,
    pub total: Option<i32>,
    pub mp_cost: i32,
    pub caster_mp_before: i32,
    pub caster_mp_after: i32,
    pub damage: Option<i32>,
    pub damage_detail: Option<String>,
    pub target_hp_before: Option<i32>,
    pub target_hp_after: Option<i32>,
    pub conditions_applied: Vec<ConditionKind>,
}

/// Record of a resolved skill check, embedded in `SKILL_RESOLVED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub character_id: CharacterId,
    pub skill: String,
    pub d20: i32,
    pub modifier: i32,
    pub total: i32,
    pub dc: Option<i32>,
    pub success: Option<bool>,
}

/// One initiative roll, embedded in `INITIATIVE`. Carries the full combatant
/// snapshot so replay can reconstruct the roster without a side channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeRecord {
    pub combat_id: CombatId,
    pub combatant: Combatant,
    pub d20: i32,
    pub modifier: i32,
}

/// Event payload - a closed tagged union, one variant per `EventType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    #[serde(rename_all = "camelCase")]
    WorldCreated {
        world_id: WorldId,
        title: String,
        description: Option<String>,
        ruleset_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    CampaignCreated {
        campaign_id: CampaignId,
        name: String,
        description: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    CharacterCreated {
        character_id: CharacterId,
        name: String,
        kind: CharacterKind,
        owner_id: Option<UserId>,
        stats: StatBlock,
        hp_max: i32,
        mp_max: i32,
    },
    AttackResolved(AttackRecord),
    SpellResolved(SpellRecord),
    SkillResolved(SkillRecord),
    #[serde(rename_all = "camelCase")]
    ConditionApplied {
        condition_id: ConditionId,
        target_id: Uuid,
        condition: ConditionKind,
        source: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ConditionRemoved {
        condition_id: ConditionId,
        target_id: Uuid,
        condition: ConditionKind,
    },
    Initiative(InitiativeRecord),
    #[serde(rename_all = "camelCase")]
    Turn {
        combat_id: CombatId,
        round: u32,
        turn_index: u32,
        active_combatant_id: CombatantId,
        active_name: String,
    },
    #[serde(rename_all = "camelCase")]
    CombatStarted {
        combat_id: CombatId,
        campaign_id: CampaignId,
        round: u32,
    },
    #[serde(rename_all = "camelCase")]
    CombatEnded { combat_id: CombatId, rounds: u32 },
    #[serde(rename_all = "camelCase")]
    Note { text: String },
    /// Event types this build does not know decode here and project
    /// nothing. They stay on the ledger untouched.
    #[serde(other)]
    Unknown,
}

impl EventPayload {
    /// The event type this payload belongs to.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::WorldCreated { .. } => EventType::WorldCreated,
            Self::CampaignCreated { .. } => EventType::CampaignCreated,
            Self::CharacterCreated { .. } => EventType::CharacterCreated,
            Self::AttackResolved(_) => EventType::AttackResolved,
            Self::SpellResolved(_) => EventType::SpellResolved,
            Self::SkillResolved(_) => EventType::SkillResolved,
            Self::ConditionApplied { .. } => EventType::ConditionApplied,
            Self::ConditionRemoved { .. } => EventType::ConditionRemoved,
            Self::Initiative(_) => EventType::Initiative,
            Self::Turn { .. } => EventType::Turn,
            Self::CombatStarted { .. } => EventType::CombatStarted,
            Self::CombatEnded { .. } => EventType::CombatEnded,
            Self::Note { .. } => EventType::Note,
            Self::Unknown => EventType::Unknown,
        }
    }

    /// Validate creation-class payloads before dispatch.
    ///
    /// The type system already guarantees required fields exist; what is
    /// left to check is that the human-entered ones are not blank.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::WorldCreated { title, .. } => {
                if title.trim().is_empty() {
                    return Err(DomainError::validation("world title cannot be empty"));
                }
            }
            Self::CampaignCreated { name, .. } => {
                if name.trim().is_empty() {
                    return Err(DomainError::validation("campaign name cannot be empty"));
                }
            }
            Self::CharacterCreated { name, .. } => {
                if name.trim().is_empty() {
                    return Err(DomainError::validation("character name cannot be empty"));
                }
            }
            Self::Note { text } => {
                if text.trim().is_empty() {
                    return Err(DomainError::validation("note text cannot be empty"));
                }
            }
            Self::Unknown => {
                return Err(DomainError::validation(
                    "unknown event type cannot be dispatched",
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

/// A persisted ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub world_id: WorldId,
    pub campaign_id: Option<CampaignId>,
    pub combat_id: Option<CombatId>,
    pub session_id: Option<SessionId>,
    pub scope: EventScope,
    pub visibility: EventVisibility,
    pub ts: DateTime<Utc>,
    /// Whoever performed the action, when attributable.
    pub actor_id: Option<Uuid>,
    /// Whoever the action was aimed at, when attributable.
    pub target_id: Option<Uuid>,
    pub payload: EventPayload,
}

impl Event {
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

/// An event being assembled for dispatch. The dispatcher stamps identity
/// and timestamp; everything else comes from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub world_id: WorldId,
    pub campaign_id: Option<CampaignId>,
    pub combat_id: Option<CombatId>,
    pub session_id: Option<SessionId>,
    pub scope: EventScope,
    pub visibility: EventVisibility,
    pub actor_id: Option<Uuid>,
    pub target_id: Option<Uuid>,
    pub payload: EventPayload,
}

impl EventDraft {
    pub fn new(world_id: WorldId, payload: EventPayload) -> Self {
        let scope = match payload.event_type() {
            EventType::WorldCreated | EventType::CampaignCreated | EventType::CharacterCreated => {
                EventScope::Macro
            }
            _ => EventScope::Micro,
        };
        Self {
            world_id,
            campaign_id: None,
            combat_id: None,
            session_id: None,
            scope,
            visibility: EventVisibility::default(),
            actor_id: None,
            target_id: None,
            payload,
        }
    }

    pub fn in_campaign(mut self, campaign_id: CampaignId) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    pub fn in_combat(mut self, combat_id: CombatId) -> Self {
        self.combat_id = Some(combat_id);
        self
    }

    pub fn in_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn by_actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn against(mut self, target_id: Uuid) -> Self {
        self.target_id = Some(target_id);
        self
    }

    pub fn with_scope(mut self, scope: EventScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_visibility(mut self, visibility: EventVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Promote to a persisted event with identity and timestamp.
    pub fn into_event(self, id: EventId, ts: DateTime<Utc>) -> Event {
        Event {
            id,
            world_id: self.world_id,
            campaign_id: self.campaign_id,
            combat_id: self.combat_id,
            session_id: self.session_id,
            scope: self.scope,
            visibility: self.visibility,
            ts,
            actor_id: self.actor_id,
            target_id: self.target_id,
            payload: self.payload,
        }
    }
}
