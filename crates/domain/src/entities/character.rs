//! Character entity - player characters, NPCs, and monsters
//!
//! A character is the durable sheet a combatant is spun up from. HP/MP pools
//! live on both: the character carries campaign-persistent values, the
//! combatant carries the live-combat copy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::StatBlock;
use crate::{CampaignId, CharacterId, UserId, WorldId};

/// Who a character is controlled by / what it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CharacterKind {
    Player,
    Npc,
    Monster,
}

impl CharacterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Npc => "npc",
            Self::Monster => "monster",
        }
    }
}

impl fmt::Display for CharacterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CharacterKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Self::Player),
            "npc" => Ok(Self::Npc),
            "monster" => Ok(Self::Monster),
            other => Err(DomainError::parse(format!(
                "Unknown character kind: {}",
                other
            ))),
        }
    }
}

/// A character sheet. Projection of `CHARACTER_CREATED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub world_id: WorldId,
    pub campaign_id: Option<CampaignId>,
    pub owner_id: Option<UserId>,
    pub name: String,
    pub kind: CharacterKind,
    pub stats: StatBlock,
    pub hp_current: i32,
    pub hp_max: i32,
    pub mp_current: i32,
    pub mp_max: i32,
}

impl Character {
    pub fn new(
        id: CharacterId,
        world_id: WorldId,
        name: impl Into<String>,
        kind: CharacterKind,
    ) -> Self {
        Self {
            id,
            world_id,
            campaign_id: None,
            owner_id: None,
            name: name.into(),
            kind,
            stats: StatBlock::new(),
            hp_current: 0,
            hp_max: 0,
            mp_current: 0,
            mp_max: 0,
        }
    }

    pub fn with_campaign(mut self, campaign_id: CampaignId) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    pub fn with_owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self
    }

    /// Set both pools to full at the given maxima.
    pub fn with_pools(mut self, hp_max: i32, mp_max: i32) -> Self {
        self.hp_max = hp_max;
        self.hp_current = hp_max;
        self.mp_max = mp_max;
        self.mp_current = mp_max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            CharacterKind::Player,
            CharacterKind::Npc,
            CharacterKind::Monster,
        ] {
            assert_eq!(kind.as_str().parse::<CharacterKind>().unwrap(), kind);
        }
        assert!("paladin".parse::<CharacterKind>().is_err());
    }

    #[test]
    fn with_pools_fills_both() {
        let c = Character::new(
            CharacterId::new(),
            WorldId::new(),
            "Vectorius",
            CharacterKind::Player,
        )
        .with_pools(24, 10);
        assert_eq!(c.hp_current, 24);
        assert_eq!(c.mp_current, 10);
    }
}
