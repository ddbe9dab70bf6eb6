//! World entity - The top-level container for a campaign setting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::WorldId;

/// A campaign world. Projection of `WORLD_CREATED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    pub id: WorldId,
    pub title: String,
    pub description: Option<String>,
    /// Ruleset this world plays under; resolved through the registry,
    /// unknown ids fall back to the default ruleset.
    pub ruleset_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl World {
    pub fn new(id: WorldId, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            ruleset_id: None,
            created_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_ruleset(mut self, ruleset_id: impl Into<String>) -> Self {
        self.ruleset_id = Some(ruleset_id.into());
        self
    }
}
