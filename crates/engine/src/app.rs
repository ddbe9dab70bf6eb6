//! Engine composition.
//!
//! Wires the pool, ports, ruleset registry, and use cases into one value a
//! host (HTTP handlers, a REPL, tests) can hold.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use tomekeeper_domain::RulesetRegistry;

use crate::dispatcher::Dispatcher;
use crate::infrastructure::clock::{SystemClock, SystemRandom};
use crate::infrastructure::persistence::{init_schema, EventLedger, ProjectionStore};
use crate::infrastructure::ports::{ClockPort, RandomPort, RepoError};
use crate::use_cases::{
    ActionUseCases, ApplyCondition, CombatUseCases, CreateCampaign, CreateCharacter, CreateWorld,
    EndCombat, ManagementUseCases, NextTurn, RemoveCondition, ResolveAttack, ResolveSkillCheck,
    ResolveSpell, RollInitiative, StartCombat,
};

/// Container for all use-case modules.
pub struct UseCases {
    pub management: ManagementUseCases,
    pub combat: CombatUseCases,
    pub actions: ActionUseCases,
}

/// The assembled engine.
pub struct Engine {
    pub pool: SqlitePool,
    pub store: Arc<ProjectionStore>,
    pub ledger: Arc<EventLedger>,
    pub dispatcher: Arc<Dispatcher>,
    pub rulesets: Arc<RulesetRegistry>,
    pub use_cases: UseCases,
}

impl Engine {
    /// Open (creating if missing) a database and assemble the engine with
    /// system clock and randomness.
    pub async fn connect(url: &str) -> Result<Self, RepoError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| RepoError::database("parse database url", e))?
            .create_if_missing(true)
            .foreign_keys(true);

        // In-memory databases exist per-connection; a single connection
        // keeps every handle on the same database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| RepoError::database("connect", e))?;

        init_schema(&pool)
            .await
            .map_err(|e| RepoError::database("init schema", e))?;

        Ok(Self::with_ports(
            pool,
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
            Arc::new(RulesetRegistry::new()),
        ))
    }

    /// Assemble with explicit ports; the seam tests use to pin time and dice.
    pub fn with_ports(
        pool: SqlitePool,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        rulesets: Arc<RulesetRegistry>,
    ) -> Self {
        let store = Arc::new(ProjectionStore::new(pool.clone()));
        let ledger = Arc::new(EventLedger::new(pool.clone()));
        let dispatcher = Arc::new(Dispatcher::new(pool.clone(), clock));

        let management = ManagementUseCases {
            create_world: Arc::new(CreateWorld::new(Arc::clone(&dispatcher), Arc::clone(&store))),
            create_campaign: Arc::new(CreateCampaign::new(
                Arc::clone(&dispatcher),
                Arc::clone(&store),
            )),
            create_character: Arc::new(CreateCharacter::new(
                Arc::clone(&dispatcher),
                Arc::clone(&store),
            )),
        };

        let combat = CombatUseCases {
            start: Arc::new(StartCombat::new(Arc::clone(&dispatcher), Arc::clone(&store))),
            roll_initiative: Arc::new(RollInitiative::new(
                Arc::clone(&dispatcher),
                Arc::clone(&store),
                Arc::clone(&random),
                Arc::clone(&rulesets),
            )),
            next_turn: Arc::new(NextTurn::new(Arc::clone(&dispatcher), Arc::clone(&store))),
            end: Arc::new(EndCombat::new(Arc::clone(&dispatcher), Arc::clone(&store))),
        };

        let actions = ActionUseCases {
            attack: Arc::new(ResolveAttack::new(
                Arc::clone(&dispatcher),
                Arc::clone(&store),
                Arc::clone(&random),
                Arc::clone(&rulesets),
            )),
            spell: Arc::new(ResolveSpell::new(
                Arc::clone(&dispatcher),
                Arc::clone(&store),
                Arc::clone(&random),
                Arc::clone(&rulesets),
            )),
            skill: Arc::new(ResolveSkillCheck::new(
                Arc::clone(&dispatcher),
                Arc::clone(&store),
                Arc::clone(&random),
                Arc::clone(&rulesets),
            )),
            apply_condition: Arc::new(ApplyCondition::new(
                Arc::clone(&dispatcher),
                Arc::clone(&store),
            )),
            remove_condition: Arc::new(RemoveCondition::new(
                Arc::clone(&dispatcher),
                Arc::clone(&store),
            )),
        };

        Self {
            pool,
            store,
            ledger,
            dispatcher,
            rulesets,
            use_cases: UseCases {
                management,
                combat,
                actions,
            },
        }
    }
}
