//! Tomekeeper rebuild tool - replay a world's ledger over its projections.
//!
//! Usage: tomekeeper-rebuild <world-id> [db-path]
//!
//! The database path defaults to $TOMEKEEPER_DB, then "tomekeeper.db".

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tomekeeper_domain::WorldId;
use tomekeeper_engine::{replay, Engine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tomekeeper_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let world_arg = args.next().ok_or_else(|| {
        anyhow::anyhow!("usage: tomekeeper-rebuild <world-id> [db-path]")
    })?;
    let world_id = WorldId::from_uuid(
        Uuid::parse_str(&world_arg)
            .map_err(|e| anyhow::anyhow!("invalid world id '{}': {}", world_arg, e))?,
    );

    let db_path = args
        .next()
        .or_else(|| std::env::var("TOMEKEEPER_DB").ok())
        .unwrap_or_else(|| "tomekeeper.db".to_string());

    tracing::info!(world_id = %world_id, db = %db_path, "starting rebuild");

    let engine = Engine::connect(&format!("sqlite:{}?mode=rwc", db_path)).await?;
    let report = replay::rebuild(&engine.pool, world_id).await?;

    tracing::info!(
        world_id = %report.world_id,
        events_applied = report.events_applied,
        "rebuild complete"
    );

    Ok(())
}
