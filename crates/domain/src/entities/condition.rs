//! AppliedCondition entity - a status effect attached to a target
//!
//! Projection of `CONDITION_APPLIED`; removed by `CONDITION_REMOVED`.
//! Targets are referenced by bare UUID so conditions can stick to either
//! combatants or characters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game_systems::ConditionKind;
use crate::{ConditionId, WorldId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCondition {
    pub id: ConditionId,
    pub world_id: WorldId,
    pub target_id: Uuid,
    pub condition: ConditionKind,
    /// Free-text origin ("Blindness spell", "pit trap").
    pub source: Option<String>,
    pub applied_at: DateTime<Utc>,
}

impl AppliedCondition {
    pub fn new(
        id: ConditionId,
        world_id: WorldId,
        target_id: Uuid,
        condition: ConditionKind,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            world_id,
            target_id,
            condition,
            source: None,
            applied_at,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
