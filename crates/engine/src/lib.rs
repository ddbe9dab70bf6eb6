//! Tomekeeper Engine
//!
//! Campaign state as the replayable result of an append-only event ledger:
//! the dispatcher is the sole write path, projectors derive queryable rows,
//! and `replay::rebuild` reconstructs a world's projections from its ledger.

pub mod app;
pub mod dispatcher;
pub mod infrastructure;
pub mod projectors;
pub mod replay;
pub mod use_cases;

#[cfg(test)]
mod e2e_tests;

pub use app::{Engine, UseCases};
pub use dispatcher::{DispatchError, Dispatcher};
pub use infrastructure::persistence::{EventLedger, ProjectionStore};
pub use infrastructure::ports::{ClockPort, RandomPort, RepoError};
pub use projectors::ProjectionError;
pub use replay::{rebuild, RebuildReport, ReplayError};
