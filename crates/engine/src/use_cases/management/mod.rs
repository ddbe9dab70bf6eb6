//! Worldbuilding use cases - world, campaign, and character creation.
//!
//! Each creation is a dispatch: the event carries the new entity's id, the
//! projector materializes the row, and the use case reads the projection
//! back so callers get exactly what queries will see.

use std::sync::Arc;

use thiserror::Error;

use tomekeeper_domain::{
    Campaign, CampaignId, Character, CharacterId, CharacterKind, EventDraft, EventPayload,
    StatBlock, UserId, World, WorldId,
};

use crate::dispatcher::{DispatchError, Dispatcher};
use crate::infrastructure::persistence::ProjectionStore;
use crate::infrastructure::ports::RepoError;

#[derive(Debug, Error)]
pub enum ManagementError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Container for worldbuilding use cases.
pub struct ManagementUseCases {
    pub create_world: Arc<CreateWorld>,
    pub create_campaign: Arc<CreateCampaign>,
    pub create_character: Arc<CreateCharacter>,
}

pub struct CreateWorldInput {
    pub title: String,
    pub description: Option<String>,
    pub ruleset_id: Option<String>,
}

pub struct CreateWorld {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
}

impl CreateWorld {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<ProjectionStore>) -> Self {
        Self { dispatcher, store }
    }

    pub async fn execute(&self, input: CreateWorldInput) -> Result<World, ManagementError> {
        let world_id = WorldId::new();
        self.dispatcher
            .dispatch(EventDraft::new(
                world_id,
                EventPayload::WorldCreated {
                    world_id,
                    title: input.title,
                    description: input.description,
                    ruleset_id: input.ruleset_id,
                },
            ))
            .await?;

        self.store
            .world(world_id)
            .await?
            .ok_or(ManagementError::NotFound {
                entity: "World",
                id: world_id.to_string(),
            })
    }
}

pub struct CreateCampaignInput {
    pub name: String,
    pub description: Option<String>,
}

pub struct CreateCampaign {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
}

impl CreateCampaign {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<ProjectionStore>) -> Self {
        Self { dispatcher, store }
    }

    pub async fn execute(
        &self,
        world_id: WorldId,
        input: CreateCampaignInput,
    ) -> Result<Campaign, ManagementError> {
        if self.store.world(world_id).await?.is_none() {
            return Err(ManagementError::NotFound {
                entity: "World",
                id: world_id.to_string(),
            });
        }

        let campaign_id = CampaignId::new();
        self.dispatcher
            .dispatch(
                EventDraft::new(
                    world_id,
                    EventPayload::CampaignCreated {
                        campaign_id,
                        name: input.name,
                        description: input.description,
                    },
                )
                .in_campaign(campaign_id),
            )
            .await?;

        self.store
            .campaign(campaign_id)
            .await?
            .ok_or(ManagementError::NotFound {
                entity: "Campaign",
                id: campaign_id.to_string(),
            })
    }
}

pub struct CreateCharacterInput {
    pub name: String,
    pub kind: CharacterKind,
    pub campaign_id: Option<CampaignId>,
    pub owner_id: Option<UserId>,
    pub stats: StatBlock,
    pub hp_max: i32,
    pub mp_max: i32,
}

pub struct CreateCharacter {
    dispatcher: Arc<Dispatcher>,
    store: Arc<ProjectionStore>,
}

impl CreateCharacter {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<ProjectionStore>) -> Self {
        Self { dispatcher, store }
    }

    pub async fn execute(
        &self,
        world_id: WorldId,
        input: CreateCharacterInput,
    ) -> Result<Character, ManagementError> {
        if self.store.world(world_id).await?.is_none() {
            return Err(ManagementError::NotFound {
                entity: "World",
                id: world_id.to_string(),
            });
        }
        if let Some(campaign_id) = input.campaign_id {
            if self.store.campaign(campaign_id).await?.is_none() {
                return Err(ManagementError::NotFound {
                    entity: "Campaign",
                    id: campaign_id.to_string(),
                });
            }
        }

        let character_id = CharacterId::new();
        let mut draft = EventDraft::new(
            world_id,
            EventPayload::CharacterCreated {
                character_id,
                name: input.name,
                kind: input.kind,
                owner_id: input.owner_id,
                stats: input.stats,
                hp_max: input.hp_max,
                mp_max: input.mp_max,
            },
        );
        if let Some(campaign_id) = input.campaign_id {
            draft = draft.in_campaign(campaign_id);
        }
        self.dispatcher.dispatch(draft).await?;

        self.store
            .character(character_id)
            .await?
            .ok_or(ManagementError::NotFound {
                entity: "Character",
                id: character_id.to_string(),
            })
    }
}
